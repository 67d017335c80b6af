//! 编译错误

use std::fmt;

/// AST 降级为字节码时的错误。都是规模超限一类的硬性约束，
/// 语法问题在解析阶段已经拦截。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    TooManyLocals,
    TooManyParameters,
    TooManyArguments,
    TooManyElements,
    InvalidOperator,
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::TooManyLocals => write!(f, "Too many local variables in one scope"),
            CompileError::TooManyParameters => write!(f, "Too many parameters in one method"),
            CompileError::TooManyArguments => write!(f, "Too many arguments in one call"),
            CompileError::TooManyElements => write!(f, "Too many elements in one literal"),
            CompileError::InvalidOperator => write!(f, "Invalid operator"),
        }
    }
}

impl std::error::Error for CompileError {}
