use super::stmt::Stmt;

#[derive(Debug, Clone, PartialEq)]
pub struct ProgramKind {
    pub statements: Vec<Stmt>,
}

pub type Program = Box<ProgramKind>;
