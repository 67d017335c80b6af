use crate::kit::lexer::core::SourcePosition;

/// 语法错误，包含位置信息
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    /// 错误类型
    pub kind: ParseErrorKind,
    /// 错误发生的位置
    pub location: ErrorLocation,
}

/// 错误位置信息
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ErrorLocation {
    /// 特定位置
    At(SourcePosition),
    /// 文件末尾
    Eof,
}

/// 语法错误类型
#[derive(Debug, Clone, PartialEq)]
pub enum ParseErrorKind {
    /// 意外的token
    UnexpectedToken {
        found: String,
        expected: Vec<String>,
    },
    /// 期望标识符
    ExpectedIdentifier { found: String },
    /// 期望常量（大写开头）
    ExpectedConstant { found: String },
    /// 无效的赋值目标
    InvalidAssignmentTarget,
    /// 无效的数字格式
    InvalidNumberFormat(String),
    /// 意外的输入结束
    UnexpectedEndOfInput,
    /// splat 参数后不能再有参数
    SplatNotLast,
    /// 可选参数后不能再有必选参数
    RequiredAfterOptional,
    /// 自定义错误消息
    Custom(String),
}

impl ParseError {
    /// 在指定位置创建错误
    pub fn at(kind: ParseErrorKind, position: SourcePosition) -> Self {
        Self {
            kind,
            location: ErrorLocation::At(position),
        }
    }

    /// 在文件末尾创建错误
    pub fn at_eof(kind: ParseErrorKind) -> Self {
        Self {
            kind,
            location: ErrorLocation::Eof,
        }
    }

    /// 获取行号（如果可用）
    pub fn line(&self) -> Option<usize> {
        match &self.location {
            ErrorLocation::At(pos) => Some(pos.line),
            ErrorLocation::Eof => None,
        }
    }

    /// 获取列号（如果可用）
    pub fn column(&self) -> Option<usize> {
        match &self.location {
            ErrorLocation::At(pos) => Some(pos.column),
            ErrorLocation::Eof => None,
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // 位置前缀
        let location_prefix = match &self.location {
            ErrorLocation::At(pos) => format!("{}:{}", pos.line, pos.column),
            ErrorLocation::Eof => "EOF".to_string(),
        };

        // 错误消息
        let message = match &self.kind {
            ParseErrorKind::UnexpectedToken { found, expected } => {
                if expected.is_empty() {
                    format!("Unexpected token '{found}'")
                } else {
                    format!(
                        "Unexpected token '{}', expected: {}",
                        found,
                        expected.join(", ")
                    )
                }
            }
            ParseErrorKind::ExpectedIdentifier { found } => {
                format!("Expected identifier, found: '{found}'")
            }
            ParseErrorKind::ExpectedConstant { found } => {
                format!("Expected constant, found: '{found}'")
            }
            ParseErrorKind::InvalidAssignmentTarget => "Invalid assignment target".to_string(),
            ParseErrorKind::InvalidNumberFormat(s) => {
                format!("Invalid number format: '{s}'")
            }
            ParseErrorKind::UnexpectedEndOfInput => "Unexpected end of input".to_string(),
            ParseErrorKind::SplatNotLast => {
                "Splat parameter must be the last parameter".to_string()
            }
            ParseErrorKind::RequiredAfterOptional => {
                "Required parameter cannot follow an optional parameter".to_string()
            }
            ParseErrorKind::Custom(msg) => msg.clone(),
        };

        write!(f, "[{location_prefix}] {message}")
    }
}

impl std::error::Error for ParseError {}

/// 解析结果类型
pub type ParseResult<T> = Result<T, ParseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_at_location() {
        let err = ParseError::at(
            ParseErrorKind::InvalidAssignmentTarget,
            SourcePosition::new(10, 5, 42),
        );
        assert_eq!(err.line(), Some(10));
        assert_eq!(err.column(), Some(5));
    }

    #[test]
    fn test_error_at_eof() {
        let err = ParseError::at_eof(ParseErrorKind::UnexpectedEndOfInput);
        assert_eq!(err.line(), None);
        assert_eq!(err.column(), None);
        assert!(matches!(err.location, ErrorLocation::Eof));
    }

    #[test]
    fn test_error_display_with_location() {
        let err = ParseError::at(
            ParseErrorKind::UnexpectedToken {
                found: "end".to_string(),
                expected: vec!["identifier".to_string()],
            },
            SourcePosition::new(5, 10, 0),
        );
        let display = format!("{err}");
        assert!(display.contains("5:10"));
        assert!(display.contains("Unexpected token"));
    }

    #[test]
    fn test_error_display_eof() {
        let err = ParseError::at_eof(ParseErrorKind::UnexpectedEndOfInput);
        let display = format!("{err}");
        assert!(display.contains("EOF"));
    }

    #[test]
    fn test_error_clone() {
        let err = ParseError::at(ParseErrorKind::SplatNotLast, SourcePosition::start());
        let cloned = err.clone();
        assert_eq!(err, cloned);
    }
}
