//! goby-log - 结构化日志系统
//!
//! 为 Goby 编译器和虚拟机设计的结构化日志系统，特点：
//! - **显式传递**：无全局 logger，组件持有 `Arc<Logger>` 句柄
//! - **惰性求值**：宏先检查级别，启用时才格式化消息
//! - **可插拔输出**：`LogSink` trait，stdout/stderr/file 按 feature 选择
//!
//! # 快速开始
//!
//! ```toml
//! [dependencies]
//! goby-log = { version = "0.1", features = ["stdout"] }
//! ```
//!
//! ```
//! use goby_log::{Logger, Level, StdoutSink, debug};
//!
//! let logger = Logger::new(Level::Debug).with_sink(StdoutSink);
//! debug!(logger, "pipeline started: {} phases", 4);
//! ```
//!
//! 测试或库内嵌场景用 `Logger::noop()` 静默，或挂 `MemorySink` 断言日志内容。

mod macros;
mod record;
mod logger;

pub use record::{Level, Record};
pub use logger::{LogSink, Logger, MemorySink};

#[cfg(feature = "stdout")]
pub use logger::StdoutSink;

#[cfg(feature = "stderr")]
pub use logger::StderrSink;

#[cfg(feature = "file")]
pub use logger::FileSink;

// 宏通过 #[macro_export] 自动导出到 crate 根：
// trace!, debug!, info!, warn!, error!, log!

/// goby-log 统一结果类型
pub type Result<T> = std::result::Result<T, Error>;

/// sink 错误类型
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
