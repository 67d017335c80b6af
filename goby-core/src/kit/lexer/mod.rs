//! 通用词法分析基础设施
//!
//! 设计目标：
//! - 精准位置追踪：行/列/字节偏移三坐标
//! - Unicode 友好：按码点扫描，不按字节
//! - 语言无关：`Token<K>` 对 token 种类泛型，具体语言只提供 `K`

pub mod core;
pub mod scanner;

pub use core::{CharStream, SourcePosition, SourceSpan};
pub use scanner::{is_identifier_continue, is_identifier_start, ErrorKind, LexError, Token};
