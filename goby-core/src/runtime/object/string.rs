//! 字符串表示
//!
//! 字符串按 Unicode 码点存储，所有下标运算都以码点为单位，
//! 多字节文本的切片与求长因此不会落在字节边界中间。

use std::fmt;

// ==================== RString ====================

/// 不可变字符串值。字符串方法一律返回新串。
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct RString {
    chars: Vec<char>,
}

impl RString {
    pub fn new(source: &str) -> Self {
        RString { chars: source.chars().collect() }
    }

    pub fn from_chars(chars: Vec<char>) -> Self {
        RString { chars }
    }

    /// 码点数，不是字节数。
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    pub fn char_at(&self, index: usize) -> Option<char> {
        self.chars.get(index).copied()
    }

    /// 在码点序列中查找子串，返回首个匹配的起点。
    pub fn find(&self, needle: &RString, from: usize) -> Option<usize> {
        let n = needle.len();
        if n == 0 {
            return if from <= self.len() { Some(from) } else { None };
        }
        if self.len() < n {
            return None;
        }
        (from..=self.len() - n).find(|&start| self.chars[start..start + n] == *needle.chars())
    }

    pub fn contains(&self, needle: &RString) -> bool {
        self.find(needle, 0).is_some()
    }

    pub fn starts_with(&self, prefix: &RString) -> bool {
        self.len() >= prefix.len() && self.chars[..prefix.len()] == *prefix.chars()
    }

    pub fn ends_with(&self, suffix: &RString) -> bool {
        self.len() >= suffix.len() && self.chars[self.len() - suffix.len()..] == *suffix.chars()
    }
}

impl From<&str> for RString {
    fn from(source: &str) -> Self {
        RString::new(source)
    }
}

impl From<String> for RString {
    fn from(source: String) -> Self {
        RString::new(&source)
    }
}

impl fmt::Display for RString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in &self.chars {
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

// ==================== 测试 ====================
