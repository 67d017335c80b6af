//! 通用工具层
//!
//! 与 Goby 语言本身无关的可复用基础设施。

pub mod lexer;
