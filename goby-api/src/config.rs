//! API 层配置
//!
//! 包含执行配置 RunConfig 和全局单例（供 CLI 使用）

use goby_config::{CompilerConfig, LimitConfig};
use goby_log::Logger;
use once_cell::sync::OnceCell;
use std::sync::Arc;

/// Execution configuration
#[derive(Clone)]
pub struct RunConfig {
    /// Whether to stop after compilation without executing
    pub compile_only: bool,
    /// Whether to dump disassembled bytecode after compilation
    pub dump_bytecode: bool,
    /// Whether to report instruction count and duration after execution
    pub profile: bool,
    /// Compiler configuration
    pub compiler: CompilerConfig,
    /// Execution limits
    pub limits: LimitConfig,
    /// Program argument vector, exposed to the program as ARGV
    pub argv: Vec<String>,
    /// Logger
    pub logger: Arc<Logger>,
}

impl std::fmt::Debug for RunConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunConfig")
            .field("compile_only", &self.compile_only)
            .field("dump_bytecode", &self.dump_bytecode)
            .field("profile", &self.profile)
            .field("compiler", &self.compiler)
            .field("limits", &self.limits)
            .field("argv", &self.argv)
            .finish()
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            compile_only: false,
            dump_bytecode: false,
            profile: false,
            compiler: CompilerConfig::default(),
            limits: LimitConfig::default(),
            argv: Vec::new(),
            logger: Logger::noop(),
        }
    }
}

// Global config singleton for CLI convenience
static GLOBAL_CONFIG: OnceCell<RunConfig> = OnceCell::new();

/// Initialize global configuration (must be called once before any operation)
///
/// # Panics
/// If config is already initialized
pub fn init(config: RunConfig) {
    GLOBAL_CONFIG
        .set(config)
        .expect("Config already initialized");
}

/// Get global config reference
///
/// # Panics
/// If config is not initialized
pub fn config() -> &'static RunConfig {
    GLOBAL_CONFIG.get().expect("Config not initialized")
}

/// Check if config is initialized
pub fn is_initialized() -> bool {
    GLOBAL_CONFIG.get().is_some()
}
