//! 字符流抽象
//!
//! 将整段源码转换为带位置追踪的 Unicode 字符流，
//! 支持任意深度预读、逐字符消费和条件匹配。

use super::position::SourcePosition;

/// 字符流
///
/// 源码在构造时一次性解码为码点序列，扫描器只与字符打交道。
pub struct CharStream {
    /// 解码后的码点序列
    chars: Vec<char>,
    /// 下一个待读字符的下标
    index: usize,
    /// 当前位置
    position: SourcePosition,
}

impl CharStream {
    /// 从源码文本创建字符流
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            index: 0,
            position: SourcePosition::start(),
        }
    }

    /// 获取当前位置
    pub fn position(&self) -> SourcePosition {
        self.position
    }

    /// 是否已到达末尾
    pub fn is_eof(&self) -> bool {
        self.index >= self.chars.len()
    }

    /// 预读第 offset 个字符（不消费），offset=0 为当前字符
    pub fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.index + offset).copied()
    }

    /// 读取并消费一个字符
    pub fn advance(&mut self) -> Option<char> {
        let c = self.chars.get(self.index).copied()?;
        self.index += 1;
        self.position.advance(c);
        Some(c)
    }

    /// 检查当前字符是否匹配（不消费）
    pub fn check(&self, expected: char) -> bool {
        self.peek(0) == Some(expected)
    }

    /// 消费当前字符如果匹配
    ///
    /// Returns true if matched and consumed
    pub fn match_char(&mut self, expected: char) -> bool {
        if self.check(expected) {
            self.advance();
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_ascii() {
        let mut stream = CharStream::new("abc");

        assert!(stream.check('a'));
        assert_eq!(stream.advance(), Some('a'));
        assert_eq!(stream.advance(), Some('b'));
        assert_eq!(stream.advance(), Some('c'));
        assert_eq!(stream.advance(), None);
        assert!(stream.is_eof());
    }

    #[test]
    fn test_stream_cjk() {
        let mut stream = CharStream::new("哈囉世界");

        assert_eq!(stream.advance(), Some('哈'));
        assert_eq!(stream.advance(), Some('囉'));
        assert_eq!(stream.peek(1), Some('界'));
        assert_eq!(stream.advance(), Some('世'));
    }

    #[test]
    fn test_stream_position_tracking() {
        let mut stream = CharStream::new("a\nb");

        let start = stream.position();
        assert_eq!(start.line, 1);
        assert_eq!(start.column, 1);

        stream.advance(); // 'a'
        let pos1 = stream.position();
        assert_eq!(pos1.line, 1);
        assert_eq!(pos1.column, 2);

        stream.advance(); // '\n'
        let pos2 = stream.position();
        assert_eq!(pos2.line, 2);
        assert_eq!(pos2.column, 1);
    }

    #[test]
    fn test_stream_match_char() {
        let mut stream = CharStream::new("ab");

        assert!(stream.match_char('a'));
        assert!(!stream.match_char('a')); // 已经消费了
        assert!(stream.match_char('b'));
    }

    #[test]
    fn test_stream_peek_beyond_eof() {
        let stream = CharStream::new("x");
        assert_eq!(stream.peek(0), Some('x'));
        assert_eq!(stream.peek(1), None);
        assert_eq!(stream.peek(100), None);
    }
}
