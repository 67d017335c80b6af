//! API 错误类型
//!
//! 提供统一的错误类型和结构化错误报告。

use thiserror::Error;

/// 词法错误（结构化）
pub use goby_core::kit::lexer::LexError;

/// ErrorLocation 重新导出
use goby_core::compiler::parser::ErrorLocation;

/// 语法错误（结构化）
pub use goby_core::compiler::parser::{ParseError, ParseErrorKind};

/// 编译错误（结构化）
pub use goby_core::runtime::CompileError;

/// 运行时错误（未被 rescue 捕获，带错误类名）
pub use goby_core::runtime::RuntimeError;

/// 字节码文件错误
pub use goby_core::binary::{EncodeError, LoadError};

/// Goby 错误类型
#[derive(Error, Debug, Clone)]
pub enum GobyError {
    /// 词法分析错误（结构化）
    #[error("{0}")]
    Lexer(#[from] LexError),

    /// 语法分析错误（结构化）
    #[error("{0}")]
    Parser(#[from] ParseError),

    /// 编译错误
    #[error("Compiler error: {0}")]
    Compiler(#[from] CompileError),

    /// 运行时错误（类名: 消息）
    #[error("{0}")]
    Runtime(#[from] RuntimeError),

    /// 字节码序列化错误
    #[error("Bytecode error: {0}")]
    Encode(#[from] EncodeError),

    /// 字节码加载错误
    #[error("Bytecode error: {0}")]
    Load(#[from] LoadError),

    /// 宿主 IO 错误（文件读写）
    #[error("IO error: {0}")]
    Io(String),
}

// std::io::Error 不可 Clone，这里降级为消息字符串
impl From<std::io::Error> for GobyError {
    fn from(e: std::io::Error) -> Self {
        GobyError::Io(e.to_string())
    }
}

/// 辅助函数：ParseErrorKind 的稳定名称（供程序化处理）
fn parse_kind_name(kind: &ParseErrorKind) -> &'static str {
    match kind {
        ParseErrorKind::UnexpectedToken { .. } => "UnexpectedToken",
        ParseErrorKind::ExpectedIdentifier { .. } => "ExpectedIdentifier",
        ParseErrorKind::ExpectedConstant { .. } => "ExpectedConstant",
        ParseErrorKind::InvalidAssignmentTarget => "InvalidAssignmentTarget",
        ParseErrorKind::InvalidNumberFormat(_) => "InvalidNumberFormat",
        ParseErrorKind::UnexpectedEndOfInput => "UnexpectedEndOfInput",
        ParseErrorKind::SplatNotLast => "SplatNotLast",
        ParseErrorKind::RequiredAfterOptional => "RequiredAfterOptional",
        ParseErrorKind::Custom(_) => "Custom",
    }
}

impl GobyError {
    /// 获取错误行号（如果有）
    pub fn line(&self) -> Option<usize> {
        match self {
            GobyError::Lexer(e) => Some(e.position.line),
            GobyError::Parser(e) => e.line(),
            _ => None,
        }
    }

    /// 获取错误列号（如果有）
    pub fn column(&self) -> Option<usize> {
        match self {
            GobyError::Lexer(e) => Some(e.position.column),
            GobyError::Parser(e) => e.column(),
            _ => None,
        }
    }

    /// 获取错误阶段名称
    pub fn phase(&self) -> &'static str {
        match self {
            GobyError::Lexer(_) => "lexer",
            GobyError::Parser(_) => "parser",
            GobyError::Compiler(_) => "compiler",
            GobyError::Runtime(_) => "runtime",
            GobyError::Encode(_) | GobyError::Load(_) => "bytecode",
            GobyError::Io(_) => "io",
        }
    }

    /// 转换为结构化错误报告
    ///
    /// 适用于 Web API、LSP 等需要结构化数据的场景。
    /// CLI 可以直接打印，上层应用可以序列化为 JSON。
    ///
    /// # Example
    /// ```ignore
    /// match compile_and_run(source) {
    ///     Err(e) => {
    ///         let report = e.to_report();
    ///         // CLI: 直接打印
    ///         println!("{}", report);
    ///         // Web: 输出 JSON
    ///         let json = report.to_json();
    ///     }
    /// }
    /// ```
    pub fn to_report(&self) -> ErrorReport {
        match self {
            GobyError::Lexer(e) => ErrorReport {
                phase: "lexer",
                line: Some(e.position.line),
                column: Some(e.position.column),
                error_kind: format!("{:?}", e.kind),
                message: e.message.clone(),
            },
            GobyError::Parser(e) => {
                let (line, column) = match &e.location {
                    ErrorLocation::At(pos) => (Some(pos.line), Some(pos.column)),
                    ErrorLocation::Eof => (None, None),
                };
                ErrorReport {
                    phase: "parser",
                    line,
                    column,
                    error_kind: parse_kind_name(&e.kind).to_string(),
                    message: e.to_string(),
                }
            }
            GobyError::Compiler(e) => ErrorReport {
                phase: "compiler",
                line: None,
                column: None,
                error_kind: format!("{:?}", e),
                message: e.to_string(),
            },
            GobyError::Runtime(e) => ErrorReport {
                phase: "runtime",
                line: None,
                column: None,
                error_kind: e.class_name.clone(),
                message: e.message.clone(),
            },
            GobyError::Encode(e) => ErrorReport {
                phase: "bytecode",
                line: None,
                column: None,
                error_kind: "EncodeError".to_string(),
                message: e.to_string(),
            },
            GobyError::Load(e) => ErrorReport {
                phase: "bytecode",
                line: None,
                column: None,
                error_kind: format!("{:?}", e),
                message: e.to_string(),
            },
            GobyError::Io(msg) => ErrorReport {
                phase: "io",
                line: None,
                column: None,
                error_kind: "IoError".to_string(),
                message: msg.clone(),
            },
        }
    }
}

/// 结构化错误报告
///
/// 上层应用（CLI、Web、LSP）可以根据自己的需求格式化。
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorReport {
    /// 错误阶段: lexer, parser, compiler, runtime, bytecode, io
    pub phase: &'static str,
    /// 错误行号（1-based，如果有）
    pub line: Option<usize>,
    /// 错误列号（1-based，如果有）
    pub column: Option<usize>,
    /// 错误类型（可用于程序化处理）
    pub error_kind: String,
    /// 人类可读的错误消息
    pub message: String,
}

impl std::fmt::Display for ErrorReport {
    /// 默认的 CLI 友好格式
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.line, self.column) {
            (Some(line), Some(col)) => {
                write!(
                    f,
                    "[{}:{}] {} error: {}",
                    line, col, self.phase, self.message
                )
            }
            _ => write!(f, "[{}] {} error: {}", self.phase, self.phase, self.message),
        }
    }
}

impl ErrorReport {
    /// 转换为 JSON 格式（Web API 使用）
    ///
    /// 不依赖 serde，手动构建 JSON 字符串。
    pub fn to_json(&self) -> String {
        let line = self
            .line
            .map(|l| l.to_string())
            .unwrap_or_else(|| "null".to_string());
        let col = self
            .column
            .map(|c| c.to_string())
            .unwrap_or_else(|| "null".to_string());

        format!(
            r#"{{"phase":"{}","line":{},"column":{},"error_kind":"{}","message":"{}"}}"#,
            self.phase,
            line,
            col,
            escape_json(&self.error_kind),
            escape_json(&self.message)
        )
    }

    /// 简洁格式（适合终端）
    pub fn to_short(&self) -> String {
        format!("{}: {}", self.phase, self.message)
    }
}

/// 简单的 JSON 字符串转义
fn escape_json(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

#[cfg(test)]
mod tests {
    use super::*;
    use goby_core::kit::lexer::{ErrorKind, SourcePosition};

    fn lex_error_at(line: usize, column: usize) -> LexError {
        LexError {
            kind: ErrorKind::InvalidChar('@'),
            position: SourcePosition::new(line, column, 0),
            message: "Invalid character '@'".to_string(),
        }
    }

    #[test]
    fn test_lexer_error_line_column() {
        let err = GobyError::Lexer(lex_error_at(10, 5));

        assert_eq!(err.line(), Some(10));
        assert_eq!(err.column(), Some(5));
        assert_eq!(err.phase(), "lexer");
    }

    #[test]
    fn test_parser_error_line_column() {
        let parse_err = ParseError::at(
            ParseErrorKind::InvalidAssignmentTarget,
            SourcePosition::new(3, 7, 20),
        );
        let err = GobyError::Parser(parse_err);

        assert_eq!(err.line(), Some(3));
        assert_eq!(err.column(), Some(7));
        assert_eq!(err.phase(), "parser");
    }

    #[test]
    fn test_parser_error_at_eof() {
        let parse_err = ParseError::at_eof(ParseErrorKind::UnexpectedEndOfInput);
        let err = GobyError::Parser(parse_err);

        assert_eq!(err.line(), None);
        assert_eq!(err.column(), None);
    }

    #[test]
    fn test_compiler_error() {
        let err = GobyError::Compiler(CompileError::TooManyLocals);
        assert_eq!(err.line(), None);
        assert_eq!(err.column(), None);
        assert_eq!(err.phase(), "compiler");
    }

    #[test]
    fn test_runtime_error() {
        let err = GobyError::Runtime(RuntimeError {
            class_name: "ZeroDivisionError".to_string(),
            message: "divided by 0".to_string(),
        });
        assert_eq!(err.line(), None);
        assert_eq!(err.column(), None);
        assert_eq!(err.phase(), "runtime");
        assert_eq!(err.to_string(), "ZeroDivisionError: divided by 0");
    }

    #[test]
    fn test_load_error_phase() {
        let err = GobyError::Load(LoadError::BadMagic);
        assert_eq!(err.phase(), "bytecode");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = GobyError::from(io);
        assert_eq!(err.phase(), "io");
        assert!(err.to_string().contains("no such file"));
    }

    #[test]
    fn test_error_report_display_with_location() {
        let report = ErrorReport {
            phase: "parser",
            line: Some(10),
            column: Some(5),
            error_kind: "UnexpectedToken".to_string(),
            message: "Unexpected token 'end'".to_string(),
        };

        let display = format!("{}", report);
        assert!(display.contains("[10:5]"));
        assert!(display.contains("parser"));
        assert!(display.contains("Unexpected token 'end'"));
    }

    #[test]
    fn test_error_report_display_without_location() {
        let report = ErrorReport {
            phase: "compiler",
            line: None,
            column: None,
            error_kind: "TooManyLocals".to_string(),
            message: "Too many local variables in one scope".to_string(),
        };

        let display = format!("{}", report);
        assert!(display.contains("[compiler]"));
        assert!(display.contains("compiler error"));
    }

    #[test]
    fn test_error_report_to_json() {
        let report = ErrorReport {
            phase: "lexer",
            line: Some(1),
            column: Some(2),
            error_kind: "InvalidChar('@')".to_string(),
            message: "Invalid character '@'".to_string(),
        };

        let json = report.to_json();
        assert!(json.contains("\"phase\":\"lexer\""));
        assert!(json.contains("\"line\":1"));
        assert!(json.contains("\"column\":2"));
        assert!(json.contains("\"error_kind\":\"InvalidChar('@')\""));
        assert!(json.contains("\"message\":\"Invalid character '@'\""));
    }

    #[test]
    fn test_error_report_to_json_null_values() {
        let report = ErrorReport {
            phase: "runtime",
            line: None,
            column: None,
            error_kind: "InternalError".to_string(),
            message: "no block given".to_string(),
        };

        let json = report.to_json();
        assert!(json.contains("\"line\":null"));
        assert!(json.contains("\"column\":null"));
    }

    #[test]
    fn test_error_report_to_short() {
        let report = ErrorReport {
            phase: "runtime",
            line: None,
            column: None,
            error_kind: "TypeError".to_string(),
            message: "expected Integer, got String".to_string(),
        };

        assert_eq!(report.to_short(), "runtime: expected Integer, got String");
    }

    #[test]
    fn test_lexer_error_to_report() {
        let err = GobyError::Lexer(lex_error_at(3, 8));
        let report = err.to_report();

        assert_eq!(report.phase, "lexer");
        assert_eq!(report.line, Some(3));
        assert_eq!(report.column, Some(8));
        assert_eq!(report.error_kind, "InvalidChar('@')");
    }

    #[test]
    fn test_parser_error_to_report() {
        let parse_err = ParseError::at(
            ParseErrorKind::UnexpectedToken {
                found: "end".to_string(),
                expected: vec!["identifier".to_string()],
            },
            SourcePosition::new(5, 10, 40),
        );
        let err = GobyError::Parser(parse_err);
        let report = err.to_report();

        assert_eq!(report.phase, "parser");
        assert_eq!(report.line, Some(5));
        assert_eq!(report.column, Some(10));
        assert_eq!(report.error_kind, "UnexpectedToken");
    }

    #[test]
    fn test_runtime_error_to_report() {
        let err = GobyError::Runtime(RuntimeError {
            class_name: "NoMethodError".to_string(),
            message: "undefined method 'missing' for Array".to_string(),
        });
        let report = err.to_report();

        assert_eq!(report.phase, "runtime");
        assert_eq!(report.error_kind, "NoMethodError");
        assert_eq!(report.message, "undefined method 'missing' for Array");
    }

    #[test]
    fn test_compiler_error_to_report() {
        let err = GobyError::Compiler(CompileError::TooManyLocals);
        let report = err.to_report();

        assert_eq!(report.phase, "compiler");
        assert_eq!(report.line, None);
        assert_eq!(report.column, None);
        assert_eq!(report.error_kind, "TooManyLocals");
        assert_eq!(report.message, "Too many local variables in one scope");
    }

    #[test]
    fn test_load_error_to_report() {
        let err = GobyError::Load(LoadError::UnsupportedVersion(9));
        let report = err.to_report();

        assert_eq!(report.phase, "bytecode");
        assert_eq!(report.error_kind, "UnsupportedVersion(9)");
        assert_eq!(report.message, "Unsupported format version: 9");
    }

    #[test]
    fn test_escape_json() {
        assert_eq!(escape_json("hello"), "hello");
        assert_eq!(escape_json("hello\"world"), "hello\\\"world");
        assert_eq!(escape_json("hello\\world"), "hello\\\\world");
        assert_eq!(escape_json("hello\nworld"), "hello\\nworld");
        assert_eq!(escape_json("hello\tworld"), "hello\\tworld");
        assert_eq!(escape_json("hello\rworld"), "hello\\rworld");
    }

    #[test]
    fn test_error_report_to_json_with_special_chars() {
        let report = ErrorReport {
            phase: "parser",
            line: Some(1),
            column: Some(1),
            error_kind: "Custom".to_string(),
            message: "line1\nline2\ttab \"quoted\"".to_string(),
        };

        let json = report.to_json();
        assert!(json.contains("\\\"")); // 引号被转义
        assert!(json.contains("\\n")); // 换行被转义
        assert!(json.contains("\\t")); // tab被转义
    }

    #[test]
    fn test_error_report_clone_and_equality() {
        let report1 = ErrorReport {
            phase: "lexer",
            line: Some(1),
            column: Some(2),
            error_kind: "Test".to_string(),
            message: "test".to_string(),
        };
        let report2 = report1.clone();
        let report3 = ErrorReport {
            phase: "parser",
            ..report1.clone()
        };
        assert_eq!(report1, report2);
        assert_ne!(report1, report3);
    }

    #[test]
    fn test_goby_error_clone() {
        let err = GobyError::Runtime(RuntimeError {
            class_name: "ArgumentError".to_string(),
            message: "wrong number of arguments (given 2, expected 1)".to_string(),
        });
        let cloned = err.clone();
        assert_eq!(err.to_string(), cloned.to_string());
    }
}
