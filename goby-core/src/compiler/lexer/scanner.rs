//! Goby 语言 Scanner 实现
//!
//! 完整的 Goby 词法分析器，支持：
//! - 关键字、标识符（小写开头）、常量（大写开头）、实例变量（@name）
//! - 运算符（单字符和多字符，含 `<=>`、`&&`、`||`、`..`、`=>`）
//! - 整数、双引号字符串（转义）、单引号字符串（原样）
//! - `#` 注释；换行作为语句终结符单独成 token

use crate::kit::lexer::core::{CharStream, SourcePosition, SourceSpan};
use crate::kit::lexer::scanner::{
    is_identifier_continue, is_identifier_start, ErrorKind, LexError, Token,
};

use super::token_kind::GobyTokenKind;

use goby_log::{trace, Logger};
use std::sync::Arc;

/// 关键字查找表
const KEYWORD_TABLE: [(&str, GobyTokenKind); 18] = [
    ("def", GobyTokenKind::Def),
    ("end", GobyTokenKind::End),
    ("class", GobyTokenKind::Class),
    ("module", GobyTokenKind::Module),
    ("self", GobyTokenKind::SelfKw),
    ("if", GobyTokenKind::If),
    ("elsif", GobyTokenKind::Elsif),
    ("else", GobyTokenKind::Else),
    ("while", GobyTokenKind::While),
    ("do", GobyTokenKind::Do),
    ("return", GobyTokenKind::Return),
    ("true", GobyTokenKind::True),
    ("false", GobyTokenKind::False),
    ("nil", GobyTokenKind::Nil),
    ("yield", GobyTokenKind::Yield),
    ("begin", GobyTokenKind::Begin),
    ("rescue", GobyTokenKind::Rescue),
    ("include", GobyTokenKind::Include),
];

/// Goby 扫描器
pub struct GobyScanner {
    /// 当前 token 的起始位置（用于构建 span）
    token_start: SourcePosition,
    /// 关键字查找表
    keywords: &'static [(&'static str, GobyTokenKind)],
    logger: Arc<Logger>,
}

impl GobyScanner {
    pub fn new() -> Self {
        Self::with_logger(Logger::noop())
    }

    pub fn with_logger(logger: Arc<Logger>) -> Self {
        Self {
            token_start: SourcePosition::start(),
            keywords: &KEYWORD_TABLE,
            logger,
        }
    }

    /// 扫描下一个 token，`Ok(None)` 表示输入结束
    pub fn next_token(
        &mut self,
        stream: &mut CharStream,
    ) -> Result<Option<Token<GobyTokenKind>>, LexError> {
        // 跳过行内空白和注释（不含换行）
        self.skip_inline_whitespace(stream);

        self.token_start = stream.position();

        let c = match stream.peek(0) {
            Some(c) => c,
            None => return Ok(None),
        };

        trace!(
            self.logger,
            "scan token at {}:{} starting with {:?}",
            self.token_start.line,
            self.token_start.column,
            c
        );

        // 根据首字符分发
        let token = match c {
            '\n' => self.make_single_char(stream, GobyTokenKind::Newline),
            ';' => self.make_single_char(stream, GobyTokenKind::Semicolon),

            // 单字符运算符/分隔符
            '/' => self.make_single_char(stream, GobyTokenKind::Slash),
            '%' => self.make_single_char(stream, GobyTokenKind::Percent),
            '(' => self.make_single_char(stream, GobyTokenKind::LeftParenthesis),
            ')' => self.make_single_char(stream, GobyTokenKind::RightParenthesis),
            '{' => self.make_single_char(stream, GobyTokenKind::LeftCurlyBrace),
            '}' => self.make_single_char(stream, GobyTokenKind::RightCurlyBrace),
            '[' => self.make_single_char(stream, GobyTokenKind::LeftSquareBracket),
            ']' => self.make_single_char(stream, GobyTokenKind::RightSquareBracket),
            ',' => self.make_single_char(stream, GobyTokenKind::Comma),
            ':' => self.make_single_char(stream, GobyTokenKind::Colon),

            // 多字符运算符起始
            '+' => self.scan_plus(stream),
            '-' => self.scan_minus(stream),
            '*' => self.scan_asterisk(stream),
            '=' => self.scan_eq(stream),
            '!' => self.scan_bang(stream),
            '<' => self.scan_lt(stream),
            '>' => self.scan_gt(stream),
            '&' => self.scan_ampersand(stream)?,
            '|' => self.scan_pipe(stream),
            '.' => self.scan_dot(stream),

            // 字符串
            '"' | '\'' => self.scan_string(stream, c)?,

            // 数字
            '0'..='9' => self.scan_number(stream),

            // 实例变量
            '@' => self.scan_instance_variable(stream)?,

            // 标识符/常量/关键字
            c if is_identifier_start(c) => self.scan_name(stream),

            // 非法字符
            _ => {
                stream.advance();
                return Err(LexError {
                    kind: ErrorKind::InvalidChar(c),
                    position: self.token_start,
                    message: format!("Unexpected character '{}'", c),
                });
            }
        };

        Ok(Some(token))
    }

    /// 跳过空格、制表符、回车和 `#` 注释；换行保留
    fn skip_inline_whitespace(&mut self, stream: &mut CharStream) {
        loop {
            match stream.peek(0) {
                Some(' ') | Some('\t') | Some('\r') => {
                    stream.advance();
                }
                Some('#') => {
                    // 注释持续到行尾，换行本身留给下一个 token
                    while let Some(c) = stream.peek(0) {
                        if c == '\n' {
                            break;
                        }
                        stream.advance();
                    }
                }
                _ => break,
            }
        }
    }

    /// 创建单字符 token
    fn make_single_char(
        &mut self,
        stream: &mut CharStream,
        kind: GobyTokenKind,
    ) -> Token<GobyTokenKind> {
        stream.advance();
        let end = stream.position();
        Token::new(kind, SourceSpan::range(self.token_start, end))
    }

    fn finish(&self, stream: &CharStream, kind: GobyTokenKind) -> Token<GobyTokenKind> {
        Token::new(kind, SourceSpan::range(self.token_start, stream.position()))
    }

    /// 扫描 '+' 系列（+, +=）
    fn scan_plus(&mut self, stream: &mut CharStream) -> Token<GobyTokenKind> {
        stream.advance();
        if stream.match_char('=') {
            self.finish(stream, GobyTokenKind::PlusEqual)
        } else {
            self.finish(stream, GobyTokenKind::Plus)
        }
    }

    /// 扫描 '-' 系列（-, -=）
    fn scan_minus(&mut self, stream: &mut CharStream) -> Token<GobyTokenKind> {
        stream.advance();
        if stream.match_char('=') {
            self.finish(stream, GobyTokenKind::MinusEqual)
        } else {
            self.finish(stream, GobyTokenKind::Minus)
        }
    }

    /// 扫描 '*' 系列（*, *=）
    fn scan_asterisk(&mut self, stream: &mut CharStream) -> Token<GobyTokenKind> {
        stream.advance();
        if stream.match_char('=') {
            self.finish(stream, GobyTokenKind::AsteriskEqual)
        } else {
            self.finish(stream, GobyTokenKind::Asterisk)
        }
    }

    /// 扫描 '=' 系列（=, ==, =>）
    fn scan_eq(&mut self, stream: &mut CharStream) -> Token<GobyTokenKind> {
        stream.advance();
        if stream.match_char('=') {
            self.finish(stream, GobyTokenKind::DoubleEqual)
        } else if stream.match_char('>') {
            self.finish(stream, GobyTokenKind::HashRocket)
        } else {
            self.finish(stream, GobyTokenKind::Equal)
        }
    }

    /// 扫描 '!' 系列（!, !=）
    fn scan_bang(&mut self, stream: &mut CharStream) -> Token<GobyTokenKind> {
        stream.advance();
        if stream.match_char('=') {
            self.finish(stream, GobyTokenKind::BangEqual)
        } else {
            self.finish(stream, GobyTokenKind::Bang)
        }
    }

    /// 扫描 '<' 系列（<, <=, <=>）
    fn scan_lt(&mut self, stream: &mut CharStream) -> Token<GobyTokenKind> {
        stream.advance();
        if stream.match_char('=') {
            if stream.match_char('>') {
                self.finish(stream, GobyTokenKind::Spaceship)
            } else {
                self.finish(stream, GobyTokenKind::LessThanEqual)
            }
        } else {
            self.finish(stream, GobyTokenKind::LessThan)
        }
    }

    /// 扫描 '>' 系列（>, >=）
    fn scan_gt(&mut self, stream: &mut CharStream) -> Token<GobyTokenKind> {
        stream.advance();
        if stream.match_char('=') {
            self.finish(stream, GobyTokenKind::GreaterThanEqual)
        } else {
            self.finish(stream, GobyTokenKind::GreaterThan)
        }
    }

    /// 扫描 '&' 系列（&&；单独的 '&' 不是 Goby 运算符）
    fn scan_ampersand(
        &mut self,
        stream: &mut CharStream,
    ) -> Result<Token<GobyTokenKind>, LexError> {
        stream.advance();
        if stream.match_char('&') {
            Ok(self.finish(stream, GobyTokenKind::AndAnd))
        } else {
            Err(LexError {
                kind: ErrorKind::InvalidChar('&'),
                position: self.token_start,
                message: "Unexpected character '&', did you mean '&&'?".to_string(),
            })
        }
    }

    /// 扫描 '|' 系列（|, ||）
    fn scan_pipe(&mut self, stream: &mut CharStream) -> Token<GobyTokenKind> {
        stream.advance();
        if stream.match_char('|') {
            self.finish(stream, GobyTokenKind::OrOr)
        } else {
            self.finish(stream, GobyTokenKind::Pipe)
        }
    }

    /// 扫描 '.' 系列（., ..）
    fn scan_dot(&mut self, stream: &mut CharStream) -> Token<GobyTokenKind> {
        stream.advance();
        if stream.match_char('.') {
            self.finish(stream, GobyTokenKind::DotDot)
        } else {
            self.finish(stream, GobyTokenKind::Dot)
        }
    }

    /// 扫描字符串字面量
    ///
    /// 双引号支持转义序列，单引号原样保留
    fn scan_string(
        &mut self,
        stream: &mut CharStream,
        quote: char,
    ) -> Result<Token<GobyTokenKind>, LexError> {
        stream.advance(); // 消费开头引号
        let mut value = String::new();

        loop {
            match stream.peek(0) {
                Some(c) if c == quote => {
                    stream.advance();
                    return Ok(Token::with_text(
                        GobyTokenKind::LiteralString,
                        SourceSpan::range(self.token_start, stream.position()),
                        value,
                    ));
                }
                Some('\\') if quote == '"' => {
                    stream.advance();
                    match stream.peek(0) {
                        Some(c) => {
                            value.push(self.unescape(c)?);
                            stream.advance();
                        }
                        None => {
                            return Err(self.unterminated_string());
                        }
                    }
                }
                Some(c) => {
                    value.push(c);
                    stream.advance();
                }
                None => {
                    return Err(self.unterminated_string());
                }
            }
        }
    }

    fn unescape(&self, c: char) -> Result<char, LexError> {
        match c {
            'n' => Ok('\n'),
            't' => Ok('\t'),
            'r' => Ok('\r'),
            '\\' => Ok('\\'),
            '"' => Ok('"'),
            _ => Err(LexError {
                kind: ErrorKind::InvalidEscape(format!("\\{}", c)),
                position: self.token_start,
                message: format!("Invalid escape sequence '\\{}'", c),
            }),
        }
    }

    fn unterminated_string(&self) -> LexError {
        LexError {
            kind: ErrorKind::UnterminatedString,
            position: self.token_start,
            message: "Unterminated string literal".to_string(),
        }
    }

    /// 扫描整数字面量（数值解析推迟到 parser）
    fn scan_number(&mut self, stream: &mut CharStream) -> Token<GobyTokenKind> {
        let mut text = String::new();
        while let Some(c) = stream.peek(0) {
            if !c.is_ascii_digit() {
                break;
            }
            text.push(c);
            stream.advance();
        }
        Token::with_text(
            GobyTokenKind::LiteralInteger,
            SourceSpan::range(self.token_start, stream.position()),
            text,
        )
    }

    /// 扫描实例变量（@name）
    fn scan_instance_variable(
        &mut self,
        stream: &mut CharStream,
    ) -> Result<Token<GobyTokenKind>, LexError> {
        stream.advance(); // 消费 '@'
        match stream.peek(0) {
            Some(c) if is_identifier_start(c) => {
                let mut text = String::from("@");
                while let Some(c) = stream.peek(0) {
                    if !is_identifier_continue(c) {
                        break;
                    }
                    text.push(c);
                    stream.advance();
                }
                Ok(Token::with_text(
                    GobyTokenKind::InstanceVariable,
                    SourceSpan::range(self.token_start, stream.position()),
                    text,
                ))
            }
            _ => Err(LexError {
                kind: ErrorKind::InvalidChar('@'),
                position: self.token_start,
                message: "Expected identifier after '@'".to_string(),
            }),
        }
    }

    /// 扫描标识符、常量或关键字
    fn scan_name(&mut self, stream: &mut CharStream) -> Token<GobyTokenKind> {
        let mut text = String::new();
        while let Some(c) = stream.peek(0) {
            if !is_identifier_continue(c) {
                break;
            }
            text.push(c);
            stream.advance();
        }
        let span = SourceSpan::range(self.token_start, stream.position());

        // 关键字优先于标识符
        for (keyword, kind) in self.keywords {
            if *keyword == text {
                return Token::new(*kind, span);
            }
        }

        // 大写开头为常量
        let kind = if text.chars().next().is_some_and(|c| c.is_ascii_uppercase()) {
            GobyTokenKind::Constant
        } else {
            GobyTokenKind::Identifier
        };
        Token::with_text(kind, span, text)
    }
}

impl Default for GobyScanner {
    fn default() -> Self {
        Self::new()
    }
}

/// 一次性扫描整段源码
pub fn tokenize(source: &str) -> Result<Vec<Token<GobyTokenKind>>, LexError> {
    tokenize_with_logger(source, Logger::noop())
}

/// 一次性扫描整段源码（带 logger）
pub fn tokenize_with_logger(
    source: &str,
    logger: Arc<Logger>,
) -> Result<Vec<Token<GobyTokenKind>>, LexError> {
    let mut stream = CharStream::new(source);
    let mut scanner = GobyScanner::with_logger(logger);
    let mut tokens = Vec::new();
    while let Some(token) = scanner.next_token(&mut stream)? {
        tokens.push(token);
    }
    Ok(tokens)
}
