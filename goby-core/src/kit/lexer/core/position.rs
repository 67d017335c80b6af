//! 源代码位置追踪
//!
//! 多坐标系统，满足不同场景需求：
//! - line/column: 人类可读的错误显示（1-based）
//! - byte_offset: 文件跳转和 I/O 操作（0-based）

/// 源代码位置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourcePosition {
    /// 行号，1-based，用于错误显示
    pub line: usize,
    /// 列号，1-based，Unicode 码点计数，用于错误显示
    pub column: usize,
    /// 字节偏移，0-based，UTF-8 编码，用于文件 seek
    pub byte_offset: usize,
}

impl SourcePosition {
    /// 创建新位置
    pub fn new(line: usize, column: usize, byte_offset: usize) -> Self {
        Self {
            line,
            column,
            byte_offset,
        }
    }

    /// 文件起始位置
    pub fn start() -> Self {
        Self {
            line: 1,
            column: 1,
            byte_offset: 0,
        }
    }

    /// 前进一个字符
    pub fn advance(&mut self, c: char) {
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        self.byte_offset += c.len_utf8();
    }
}

/// 源代码区间（Span）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceSpan {
    pub start: SourcePosition,
    pub end: SourcePosition,
}

impl SourceSpan {
    /// 从起始位置创建区间（结束位置相同）
    pub fn at(pos: SourcePosition) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    /// 合并两个位置为区间
    pub fn range(start: SourcePosition, end: SourcePosition) -> Self {
        Self { start, end }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_start() {
        let pos = SourcePosition::start();
        assert_eq!(pos.line, 1);
        assert_eq!(pos.column, 1);
        assert_eq!(pos.byte_offset, 0);
    }

    #[test]
    fn test_position_advance_ascii() {
        let mut pos = SourcePosition::start();

        pos.advance('a');
        assert_eq!(pos.column, 2);
        assert_eq!(pos.byte_offset, 1);

        pos.advance('b');
        assert_eq!(pos.column, 3);
        assert_eq!(pos.byte_offset, 2);
    }

    #[test]
    fn test_position_advance_newline() {
        let mut pos = SourcePosition::start();

        pos.advance('a');
        pos.advance('\n');

        assert_eq!(pos.line, 2);
        assert_eq!(pos.column, 1);
        assert_eq!(pos.byte_offset, 2);
    }

    #[test]
    fn test_position_advance_cjk() {
        let mut pos = SourcePosition::start();

        // CJK 字符：3 字节 UTF-8，1 列
        pos.advance('哈');
        assert_eq!(pos.column, 2);
        assert_eq!(pos.byte_offset, 3);
    }

    #[test]
    fn test_span_range() {
        let start = SourcePosition::start();
        let mut end = start;
        end.advance('a');
        let span = SourceSpan::range(start, end);
        assert_eq!(span.start.column, 1);
        assert_eq!(span.end.column, 2);
    }
}
