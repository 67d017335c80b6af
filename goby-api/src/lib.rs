//! Goby API - Execution orchestration layer
//!
//! Provides unified execution interface, including:
//! - Execution flow orchestration (lex -> parse -> compile -> run)
//! - Configuration abstraction (RunConfig)
//! - Unified error handling (GobyError)
//! - A persistent REPL session (Session)
//!
//! For CLI convenience, this crate provides a global singleton API.
//! For library use, prefer the explicit `run(source, &config)` API.

use std::rc::Rc;
use std::time::Instant;

use goby_log::{debug, info};

use goby_core::compiler::lexer::tokenize_with_logger;
use goby_core::compiler::parser::Parser;
use goby_core::runtime::Compiler;
use goby_core::{CompiledSequence, Vm};

// Re-export config
pub mod config;
pub use config::{config as get_config, init as init_config, is_initialized, RunConfig};

// Re-export config types from goby_config
pub use goby_config::{CompilerConfig, LimitConfig, Phase};

// Re-export error, types, and the REPL session
pub mod error;
pub mod session;
pub mod types;
pub use error::{
    CompileError, EncodeError, ErrorReport, GobyError, LexError, LoadError, ParseError,
    RuntimeError,
};
pub use session::Session;
pub use types::{CompileOutput, ExecuteOutput};

// Re-export core types
pub use goby_config;
pub use goby_core::binary::{detect_file_kind, load_program, serialize_program, FileKind};
pub use goby_core::Value;

/// Execute with explicit configuration
///
/// This is the recommended API for library users.
pub fn run(source: &str, config: &RunConfig) -> Result<ExecuteOutput, GobyError> {
    info!(config.logger, "Starting execution");

    // Compile
    let compiled = compile_with_config(source, config)?;

    // Optional: dump bytecode
    if config.dump_bytecode {
        println!("{}", compiled.sequence.disassemble());
    }

    // Execute
    let result = execute_with_config(compiled.sequence, config)?;

    info!(config.logger, "Execution completed");
    Ok(result)
}

/// Compile with explicit configuration
pub fn compile_with_config(source: &str, config: &RunConfig) -> Result<CompileOutput, GobyError> {
    let tokens = tokenize_with_logger(source, config.logger.clone())?;
    let program = Parser::new(tokens).parse()?;
    let sequence = Compiler::with_logger(config.logger.clone()).compile_program(&program)?;

    debug!(
        config.logger,
        "compilation completed: constants={}, instructions={}",
        sequence.constants.len(),
        sequence.instructions.len(),
    );

    Ok(CompileOutput { sequence })
}

/// Execute a compiled program with explicit configuration
///
/// Also the entry point for sequences loaded from a `.gbbc` file.
pub fn execute_with_config(
    sequence: Rc<CompiledSequence>,
    config: &RunConfig,
) -> Result<ExecuteOutput, GobyError> {
    let mut vm = Vm::with_config_and_logger(config.limits.clone(), config.logger.clone());
    vm.set_argv(&config.argv);

    let start = Instant::now();
    let value = vm.run(sequence)?;
    let elapsed = start.elapsed();

    let inspect = vm.inspect(&value);
    Ok(ExecuteOutput {
        value,
        inspect,
        instructions_executed: vm.instructions_executed(),
        elapsed,
    })
}

// ==================== Legacy API (using global config) ====================

/// Compile source code (uses global config)
///
/// # Panics
/// If global config is not initialized
pub fn compile(source: &str) -> Result<CompileOutput, GobyError> {
    let config = get_config();
    compile_with_config(source, config)
}

/// Execute a compiled program (uses global config)
///
/// # Panics
/// If global config is not initialized
pub fn execute(sequence: Rc<CompiledSequence>) -> Result<ExecuteOutput, GobyError> {
    let config = get_config();
    execute_with_config(sequence, config)
}

/// Compile and run (uses global config)
///
/// # Panics
/// If global config is not initialized
pub fn compile_and_run(source: &str) -> Result<ExecuteOutput, GobyError> {
    let config = get_config();
    run(source, config)
}

/// Quick run with default config (auto-initializes if needed)
pub fn quick_run(source: &str) -> Result<ExecuteOutput, GobyError> {
    if !is_initialized() {
        init_config(RunConfig::default());
    }
    compile_and_run(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_with_explicit_config() {
        let config = RunConfig::default();
        let result = run("40 + 2", &config).unwrap();
        assert_eq!(result.inspect, "42");
        assert!(result.instructions_executed > 0);
    }

    #[test]
    fn test_compile_with_explicit_config() {
        let config = RunConfig::default();
        let output = compile_with_config("1 + 2", &config).unwrap();
        assert!(!output.sequence.instructions.is_empty());
    }

    #[test]
    fn test_run_reports_runtime_error() {
        let config = RunConfig::default();
        let err = run("1 / 0", &config).unwrap_err();
        assert_eq!(err.phase(), "runtime");
        assert_eq!(err.to_string(), "ZeroDivisionError: divided by 0");
    }

    #[test]
    fn test_run_reports_parse_error_with_position() {
        let config = RunConfig::default();
        let err = run("def\n", &config).unwrap_err();
        assert_eq!(err.phase(), "parser");
        assert!(err.line().is_some());
    }

    #[test]
    fn test_argv_reaches_the_program() {
        let config = RunConfig {
            argv: vec!["alpha".to_string(), "beta".to_string()],
            ..RunConfig::default()
        };
        let result = run("ARGV[1]", &config).unwrap();
        assert_eq!(result.inspect, "\"beta\"");
    }

    #[test]
    fn test_serialized_program_executes_identically() {
        let config = RunConfig::default();
        let compiled = compile_with_config("6 * 7", &config).unwrap();

        let bytes = serialize_program(&compiled.sequence, &config.compiler).unwrap();
        let loaded = load_program(&bytes).unwrap();

        let direct = execute_with_config(compiled.sequence, &config).unwrap();
        let roundtrip = execute_with_config(loaded, &config).unwrap();
        assert_eq!(direct.inspect, roundtrip.inspect);
    }

    #[test]
    fn test_quick_run() {
        let result = quick_run("\"ok\"").unwrap();
        assert_eq!(result.inspect, "\"ok\"");
    }
}
