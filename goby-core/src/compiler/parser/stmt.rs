use super::expr::Expr;
use std::fmt;

// 语句类型别名
pub type Stmt = Box<StmtKind>;

/// 解析器语句枚举
#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    // 表达式语句
    Expr(ExprStmt),
    // If条件语句
    If(IfStmt),
    // While循环语句
    While(WhileStmt),
    // 方法定义语句（实例方法或 def self. 类方法）
    Def(DefStmt),
    // 类/模块定义语句
    ClassDef(ClassDefStmt),
    // include语句（复制模块方法表）
    Include(IncludeStmt),
    // Return返回语句
    Return(ReturnStmt),
    // begin/rescue语句
    Begin(BeginStmt),
}

// 表达式语句结构体（包装一个表达式）
#[derive(Debug, Clone, PartialEq)]
pub struct ExprStmt {
    pub expression: Expr,
    pub line: u32,
}

// If语句结构体
#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub condition: Expr,
    pub then_body: Vec<Stmt>,
    /// elsif分支列表（条件 + 代码块）
    pub elsif_branches: Vec<(Expr, Vec<Stmt>)>,
    pub else_body: Option<Vec<Stmt>>,
    pub line: u32,
}

// While循环语句结构体
#[derive(Debug, Clone, PartialEq)]
pub struct WhileStmt {
    pub condition: Expr,
    pub body: Vec<Stmt>,
    pub line: u32,
}

/// 方法参数种类
#[derive(Debug, Clone, PartialEq)]
pub enum ParamKind {
    /// 必选参数
    Required,
    /// 可选参数（带默认值表达式）
    Optional(Expr),
    /// splat参数（多余实参收集为数组）
    Splat,
}

// 方法参数声明
#[derive(Debug, Clone, PartialEq)]
pub struct ParamDecl {
    pub name: String,
    pub kind: ParamKind,
}

// 方法定义语句结构体
#[derive(Debug, Clone, PartialEq)]
pub struct DefStmt {
    pub name: String,
    /// true表示 def self.name（类方法）
    pub receiver_is_self: bool,
    pub params: Vec<ParamDecl>,
    pub body: Vec<Stmt>,
    pub line: u32,
}

// 类/模块定义语句结构体
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDefStmt {
    pub name: String,
    /// 可选的父类名（模块不允许）
    pub superclass: Option<String>,
    pub body: Vec<Stmt>,
    pub is_module: bool,
    pub line: u32,
}

// include语句结构体
#[derive(Debug, Clone, PartialEq)]
pub struct IncludeStmt {
    pub module_name: String,
    pub line: u32,
}

// Return返回语句结构体
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
    pub line: u32,
}

// begin/rescue语句结构体
#[derive(Debug, Clone, PartialEq)]
pub struct BeginStmt {
    pub body: Vec<Stmt>,
    /// rescue => name 绑定的变量名
    pub rescue_var: Option<String>,
    pub rescue_body: Vec<Stmt>,
    pub line: u32,
}

fn write_body(f: &mut fmt::Formatter<'_>, body: &[Stmt]) -> fmt::Result {
    for stmt in body {
        writeln!(f, "  {}", stmt)?;
    }
    Ok(())
}

// 实现Display trait（调试输出用）
impl fmt::Display for StmtKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StmtKind::Expr(expr_stmt) => write!(f, "{}", expr_stmt.expression),
            StmtKind::If(if_stmt) => {
                writeln!(f, "if {}", if_stmt.condition)?;
                write_body(f, &if_stmt.then_body)?;
                for (cond, body) in &if_stmt.elsif_branches {
                    writeln!(f, "elsif {}", cond)?;
                    write_body(f, body)?;
                }
                if let Some(else_body) = &if_stmt.else_body {
                    writeln!(f, "else")?;
                    write_body(f, else_body)?;
                }
                write!(f, "end")
            }
            StmtKind::While(while_stmt) => {
                writeln!(f, "while {}", while_stmt.condition)?;
                write_body(f, &while_stmt.body)?;
                write!(f, "end")
            }
            StmtKind::Def(def) => {
                let params = def
                    .params
                    .iter()
                    .map(|p| match &p.kind {
                        ParamKind::Required => p.name.clone(),
                        ParamKind::Optional(default) => format!("{} = {}", p.name, default),
                        ParamKind::Splat => format!("*{}", p.name),
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                let receiver = if def.receiver_is_self { "self." } else { "" };
                writeln!(f, "def {}{}({})", receiver, def.name, params)?;
                write_body(f, &def.body)?;
                write!(f, "end")
            }
            StmtKind::ClassDef(class_def) => {
                let keyword = if class_def.is_module { "module" } else { "class" };
                match &class_def.superclass {
                    Some(superclass) => writeln!(f, "{} {} < {}", keyword, class_def.name, superclass)?,
                    None => writeln!(f, "{} {}", keyword, class_def.name)?,
                }
                write_body(f, &class_def.body)?;
                write!(f, "end")
            }
            StmtKind::Include(include) => write!(f, "include {}", include.module_name),
            StmtKind::Return(ret) => match &ret.value {
                Some(value) => write!(f, "return {}", value),
                None => write!(f, "return"),
            },
            StmtKind::Begin(begin) => {
                writeln!(f, "begin")?;
                write_body(f, &begin.body)?;
                match &begin.rescue_var {
                    Some(var) => writeln!(f, "rescue => {}", var)?,
                    None => writeln!(f, "rescue")?,
                }
                write_body(f, &begin.rescue_body)?;
                write!(f, "end")
            }
        }
    }
}
