//! Goby Config - Pure configuration data structures
//!
//! This crate contains only data structures, no logic or global state.
//! It serves as the shared configuration vocabulary across all Goby crates.

use serde::{Deserialize, Serialize};

/// Configuration for compiler behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompilerConfig {
    /// Whether to emit debug information (line tables) into compiled output
    pub emit_debug_info: bool,
}

/// Configuration for execution limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitConfig {
    /// Maximum operand stack depth
    pub max_stack_size: usize,
    /// Maximum call frame depth
    pub max_recursion_depth: usize,
}

/// Pipeline phase enum for phase-specific configuration and log targets
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Lexer,
    Parser,
    Compiler,
    Vm,
}

impl Phase {
    /// Get the string name of the phase
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Lexer => "lexer",
            Phase::Parser => "parser",
            Phase::Compiler => "compiler",
            Phase::Vm => "vm",
        }
    }

    /// Get the log target name for this phase
    pub fn target(&self) -> String {
        format!("goby::{}", self.as_str())
    }
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            emit_debug_info: true,
        }
    }
}

impl Default for LimitConfig {
    fn default() -> Self {
        Self {
            max_stack_size: 1024,
            max_recursion_depth: 256,
        }
    }
}
