//! Goby 词法分析器
//!
//! 基于 `kit::lexer` 的字符流与通用 Token 构建。
//! 换行是有意义的 token（语句终结符），由 parser 统一处理。

pub mod scanner;
pub mod token_kind;

pub use scanner::{tokenize, tokenize_with_logger, GobyScanner};
pub use token_kind::GobyTokenKind;
