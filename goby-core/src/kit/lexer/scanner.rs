//! 通用 Token 与词法错误定义
//!
//! 具体语言的扫描器产出 `Token<K>`，`K` 为该语言的 token 种类枚举。

use super::core::{SourcePosition, SourceSpan};

/// Token 结构
#[derive(Debug, Clone, PartialEq)]
pub struct Token<K> {
    pub kind: K,
    pub span: SourceSpan,
    /// 原始文本（标识符/字面量保留，符号类省略）
    pub text: Option<String>,
}

impl<K> Token<K> {
    /// 创建新 token（不保存文本）
    pub fn new(kind: K, span: SourceSpan) -> Self {
        Self {
            kind,
            span,
            text: None,
        }
    }

    /// 创建新 token（保存文本）
    pub fn with_text(kind: K, span: SourceSpan, text: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            text: Some(text.into()),
        }
    }

    /// 获取 token 的起始位置
    pub fn start(&self) -> SourcePosition {
        self.span.start
    }

    /// 获取 token 的结束位置
    pub fn end(&self) -> SourcePosition {
        self.span.end
    }
}

/// 词法错误
#[derive(Debug, Clone, PartialEq)]
pub struct LexError {
    pub kind: ErrorKind,
    pub position: SourcePosition,
    pub message: String,
}

impl std::fmt::Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}:{}] {}",
            self.position.line, self.position.column, self.message
        )
    }
}

impl std::error::Error for LexError {}

/// 错误类型
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorKind {
    /// 非法字符
    InvalidChar(char),
    /// 未终止的字符串
    UnterminatedString,
    /// 非法转义序列
    InvalidEscape(String),
}

/// 辅助函数：检查字符是否为标识符起始字符
pub fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

/// 辅助函数：检查字符是否为标识符延续字符
pub fn is_identifier_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
