//! 日志记录定义

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// 日志级别
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Level {
    /// 最详细的跟踪信息
    Trace = 0,
    /// 调试信息
    Debug = 1,
    /// 一般信息
    Info = 2,
    /// 警告
    Warn = 3,
    /// 错误
    Error = 4,
}

impl Level {
    /// 将级别转换为字符串
    pub const fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "TRACE",
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
        }
    }

    /// 从 u8 解析级别
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Level::Trace),
            1 => Some(Level::Debug),
            2 => Some(Level::Info),
            3 => Some(Level::Warn),
            4 => Some(Level::Error),
            _ => None,
        }
    }

    /// 从环境变量风格的名字解析级别（大小写不敏感）
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "trace" => Some(Level::Trace),
            "debug" => Some(Level::Debug),
            "info" => Some(Level::Info),
            "warn" => Some(Level::Warn),
            "error" => Some(Level::Error),
            _ => None,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 单条日志记录
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    /// Unix 时间戳（毫秒）
    pub timestamp_ms: u64,
    /// 日志级别
    pub level: Level,
    /// 模块路径（编译期确定）
    pub target: &'static str,
    /// 格式化后的消息
    pub message: String,
}

impl Record {
    /// 创建新记录
    pub fn new(level: Level, target: &'static str, message: impl Into<String>) -> Self {
        Self {
            timestamp_ms: current_timestamp_ms(),
            level,
            target,
            message: message.into(),
        }
    }

    /// 格式化记录为字符串
    pub fn format(&self) -> String {
        format!(
            "[{}] {} {}: {}",
            format_timestamp(self.timestamp_ms),
            self.level,
            self.target,
            self.message
        )
    }
}

/// 获取当前时间戳（毫秒）
fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// 格式化时间戳为可读字符串
fn format_timestamp(timestamp_ms: u64) -> String {
    let secs = timestamp_ms / 1000;
    let millis = timestamp_ms % 1000;

    let hours = (secs / 3600) % 24;
    let minutes = (secs / 60) % 60;
    let seconds = secs % 60;

    format!("{hours:02}:{minutes:02}:{seconds:02}.{millis:03}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(Level::Trace < Level::Debug);
        assert!(Level::Debug < Level::Info);
        assert!(Level::Info < Level::Warn);
        assert!(Level::Warn < Level::Error);
    }

    #[test]
    fn test_level_from_u8() {
        assert_eq!(Level::from_u8(0), Some(Level::Trace));
        assert_eq!(Level::from_u8(4), Some(Level::Error));
        assert_eq!(Level::from_u8(5), None);
    }

    #[test]
    fn test_level_from_name() {
        assert_eq!(Level::from_name("trace"), Some(Level::Trace));
        assert_eq!(Level::from_name("WARN"), Some(Level::Warn));
        assert_eq!(Level::from_name("verbose"), None);
    }

    #[test]
    fn test_record_creation() {
        let record = Record::new(Level::Info, "test::module", "test message");
        assert_eq!(record.level, Level::Info);
        assert_eq!(record.target, "test::module");
        assert_eq!(record.message, "test message");
    }

    #[test]
    fn test_record_format() {
        let record = Record {
            timestamp_ms: 3600000 + 120000 + 3000 + 456,
            level: Level::Info,
            target: "goby::lexer",
            message: String::from("token found"),
        };

        let formatted = record.format();
        assert!(formatted.contains("INFO"));
        assert!(formatted.contains("goby::lexer"));
        assert!(formatted.contains("token found"));
        assert!(formatted.contains("01:02:03.456"));
    }
}
