//! 日志器实现

use crate::record::{Level, Record};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex};

/// 日志输出目标 trait
pub trait LogSink: Send + Sync {
    /// 写入日志记录
    fn write(&self, record: &Record);
}

/// 日志器配置和状态
pub struct Logger {
    /// 当前日志级别（原子存储）
    level: AtomicU8,
    /// 输出目标列表
    sinks: Mutex<Vec<Box<dyn LogSink>>>,
}

impl Logger {
    /// 创建新的日志器
    pub fn new(level: Level) -> Arc<Self> {
        Arc::new(Logger {
            level: AtomicU8::new(level as u8),
            sinks: Mutex::new(Vec::new()),
        })
    }

    /// 添加输出目标（链式）
    pub fn with_sink<S: LogSink + 'static>(self: Arc<Self>, sink: S) -> Arc<Self> {
        self.add_sink(sink);
        self
    }

    /// 添加输出目标
    pub fn add_sink<S: LogSink + 'static>(&self, sink: S) {
        if let Ok(mut sinks) = self.sinks.lock() {
            sinks.push(Box::new(sink));
        }
    }

    /// 动态设置日志级别
    pub fn set_level(&self, level: Level) {
        self.level.store(level as u8, Ordering::Relaxed);
    }

    /// 获取当前日志级别
    pub fn level(&self) -> Level {
        Level::from_u8(self.level.load(Ordering::Relaxed)).unwrap_or(Level::Info)
    }

    /// 检查指定级别是否启用
    pub fn is_enabled(&self, level: Level) -> bool {
        level >= self.level()
    }

    /// 记录日志（宏的落点）
    #[inline(never)]
    pub fn log(&self, level: Level, target: &'static str, message: impl Into<String>) {
        if !self.is_enabled(level) {
            return;
        }

        let record = Record::new(level, target, message);

        if let Ok(sinks) = self.sinks.lock() {
            for sink in sinks.iter() {
                sink.write(&record);
            }
        }
    }

    /// 创建禁用日志的 no-op 日志器（测试或纯库场景）
    pub fn noop() -> Arc<Self> {
        // Error 级别且没有任何 sink
        Self::new(Level::Error)
    }
}

// 为 Arc<Logger> 实现 LogSink，支持链式日志器
impl LogSink for Arc<Logger> {
    fn write(&self, record: &Record) {
        self.log(record.level, record.target, record.message.clone());
    }
}

/// 内存 sink，保留全部记录，测试用
#[derive(Clone, Default)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<Record>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// 取出已记录日志的副本
    pub fn records(&self) -> Vec<Record> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LogSink for MemorySink {
    fn write(&self, record: &Record) {
        if let Ok(mut records) = self.records.lock() {
            records.push(record.clone());
        }
    }
}

#[cfg(feature = "stdout")]
/// 标准输出 sink
pub struct StdoutSink;

#[cfg(feature = "stdout")]
impl LogSink for StdoutSink {
    fn write(&self, record: &Record) {
        println!("{}", record.format());
    }
}

#[cfg(feature = "stderr")]
/// 标准错误 sink
pub struct StderrSink;

#[cfg(feature = "stderr")]
impl LogSink for StderrSink {
    fn write(&self, record: &Record) {
        eprintln!("{}", record.format());
    }
}

#[cfg(feature = "file")]
/// 文件 sink（追加模式）
pub struct FileSink {
    file: Mutex<std::fs::File>,
}

#[cfg(feature = "file")]
impl FileSink {
    pub fn new(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;

        Ok(FileSink {
            file: Mutex::new(file),
        })
    }
}

#[cfg(feature = "file")]
impl LogSink for FileSink {
    #[inline(never)]
    fn write(&self, record: &Record) {
        use std::io::Write;
        if let Ok(mut file) = self.file.lock() {
            let _ = writeln!(file, "{}", record.format());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logger_creation() {
        let logger = Logger::new(Level::Debug);
        assert_eq!(logger.level(), Level::Debug);
        assert!(logger.is_enabled(Level::Debug));
        assert!(!logger.is_enabled(Level::Trace));
    }

    #[test]
    fn test_level_change() {
        let logger = Logger::new(Level::Info);
        assert!(!logger.is_enabled(Level::Debug));

        logger.set_level(Level::Debug);
        assert!(logger.is_enabled(Level::Debug));
    }

    #[test]
    fn test_log_with_memory_sink() {
        let sink = MemorySink::new();
        let logger = Logger::new(Level::Debug).with_sink(sink.clone());

        logger.log(Level::Info, "test", "hello world");

        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].message, "hello world");
    }

    #[test]
    fn test_log_disabled_level() {
        let sink = MemorySink::new();
        let logger = Logger::new(Level::Warn).with_sink(sink.clone());

        // Debug 级别被禁用，不应该写入
        logger.log(Level::Debug, "test", "should not appear");
        assert_eq!(sink.len(), 0);

        // Warn 级别启用，应该写入
        logger.log(Level::Warn, "test", "should appear");
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_log_sink_for_arc_logger() {
        let sink = MemorySink::new();
        let inner = Logger::new(Level::Debug).with_sink(sink.clone());

        // 创建一个链式 logger
        let outer = Logger::new(Level::Debug);
        outer.add_sink(inner.clone());

        // 写入 outer，应该通过 inner 最终写入 sink
        outer.log(Level::Info, "chain", "chained log");

        assert!(!sink.is_empty());
    }

    #[cfg(feature = "stdout")]
    #[test]
    fn test_stdout_sink() {
        let sink = StdoutSink;
        let record = Record::new(Level::Info, "test", "stdout test");
        // 只测试不 panic，不验证输出
        sink.write(&record);
    }

    #[cfg(feature = "file")]
    #[test]
    fn test_file_sink_append() {
        let temp_path = std::env::temp_dir().join("goby_log_append_test.tmp");

        {
            let sink = FileSink::new(&temp_path).unwrap();
            sink.write(&Record::new(Level::Info, "test", "first line"));
        }
        {
            let sink = FileSink::new(&temp_path).unwrap();
            sink.write(&Record::new(Level::Info, "test", "second line"));
        }

        let content = std::fs::read_to_string(&temp_path).unwrap();
        assert!(content.contains("first line"));
        assert!(content.contains("second line"));

        std::fs::remove_file(&temp_path).ok();
    }

    #[test]
    fn test_noop_logger() {
        let logger = Logger::noop();
        // noop 是 Error 级别且无 sink，任何日志都不应该 panic
        logger.log(Level::Error, "test", "should not appear");
    }
}
