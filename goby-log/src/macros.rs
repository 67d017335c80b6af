//! 日志宏实现

/// 记录 Trace 级别日志
#[macro_export]
macro_rules! trace {
    ($logger:expr, $($arg:tt)*) => {
        $crate::log!($logger, $crate::Level::Trace, $($arg)*)
    };
}

/// 记录 Debug 级别日志
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)*) => {
        $crate::log!($logger, $crate::Level::Debug, $($arg)*)
    };
}

/// 记录 Info 级别日志
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)*) => {
        $crate::log!($logger, $crate::Level::Info, $($arg)*)
    };
}

/// 记录 Warn 级别日志
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)*) => {
        $crate::log!($logger, $crate::Level::Warn, $($arg)*)
    };
}

/// 记录 Error 级别日志
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)*) => {
        $crate::log!($logger, $crate::Level::Error, $($arg)*)
    };
}

/// 内部使用的通用日志宏
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:tt)*) => {{
        // 惰性求值：先检查级别，只有启用时才格式化消息
        if $logger.is_enabled($level) {
            let message = format!($($arg)*);
            $logger.log($level, module_path!(), message);
        }
    }};
}

#[cfg(test)]
mod tests {
    use crate::{Level, Logger, MemorySink};

    #[test]
    fn test_trace_macro() {
        let sink = MemorySink::new();
        let logger = Logger::new(Level::Trace).with_sink(sink.clone());

        trace!(logger, "test trace");
        trace!(logger, "formatted {}", "value");

        let records = sink.records();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.level == Level::Trace));
    }

    #[test]
    fn test_debug_macro() {
        let sink = MemorySink::new();
        let logger = Logger::new(Level::Debug).with_sink(sink.clone());

        debug!(logger, "test debug");
        debug!(logger, "value = {}", 42);

        let records = sink.records();
        assert_eq!(records.len(), 2);
        assert!(records[1].message.contains("42"));
    }

    #[test]
    fn test_level_filtering_in_macros() {
        let sink = MemorySink::new();
        let logger = Logger::new(Level::Warn).with_sink(sink.clone());

        // 这些应该被过滤掉
        trace!(logger, "trace msg");
        debug!(logger, "debug msg");
        info!(logger, "info msg");

        // 这些应该被记录
        warn!(logger, "warn msg");
        error!(logger, "error msg");

        let records = sink.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].level, Level::Warn);
        assert_eq!(records[1].level, Level::Error);
    }

    #[test]
    fn test_formatting() {
        let sink = MemorySink::new();
        let logger = Logger::new(Level::Debug).with_sink(sink.clone());

        let name = "tokenize";
        let count = 42;
        debug!(logger, "phase {}: {} tokens", name, count);

        let records = sink.records();
        assert!(records[0].message.contains("phase tokenize: 42 tokens"));
    }
}
