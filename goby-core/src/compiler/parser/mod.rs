pub mod error;
pub mod expr;
pub mod parser;
mod program;
pub mod stmt;
mod utils;

// 重新导出常用类型
pub use error::{ErrorLocation, ParseError, ParseErrorKind, ParseResult};
pub use expr::{
    AssignTarget, Assignment, Binary, BlockLiteral, Expr, ExprKind, Logical, MethodCall, Unary,
};
pub use parser::Parser;
pub use program::{Program, ProgramKind};
pub use stmt::{ParamDecl, ParamKind, Stmt, StmtKind};
pub use utils::binary_method_name;
