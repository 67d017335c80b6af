//! Goby CLI - Command line interface
//!
//! Flag parsing, file-extension dispatch, bytecode file writing, and the
//! interactive mode entry.

use clap::Parser;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

mod platform;
mod repl;

use crate::platform::print_error_with_source;
use goby_api::{
    compile_with_config, execute_with_config, init_config, run, ExecuteOutput, GobyError,
    RunConfig,
};
use goby_core::binary::{self, detect_file_kind, load_program, serialize_program, FileKind};
use goby_log::{Level, Logger, StdoutSink};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "goby", about = "Goby programming language")]
struct Cli {
    /// Compile to bytecode (<dir>/<basename>.gbbc) without executing
    #[arg(short = 'c')]
    compile_only: bool,

    /// Report instruction count and duration after execution
    #[arg(short = 'p')]
    profile: bool,

    /// Show current Goby version
    #[arg(short = 'v')]
    show_version: bool,

    /// Run interactive Goby
    #[arg(short = 'i')]
    interactive: bool,

    /// Source file (.gb / .rb) or bytecode file (.gbbc)
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Arguments passed to the program as ARGV
    #[arg(value_name = "ARGS", trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

fn main() {
    let cli = Cli::parse();

    if cli.show_version {
        println!("{}", VERSION);
        return;
    }

    let config = RunConfig {
        compile_only: cli.compile_only,
        profile: cli.profile,
        argv: cli.args.clone(),
        logger: build_logger(),
        ..RunConfig::default()
    };

    // Initialize API config (global singleton for convenience)
    init_config(config.clone());

    // Interactive mode ignores the positional argument
    if cli.interactive {
        repl::start(&config);
        return;
    }

    let file = match cli.file {
        Some(file) => file,
        None => {
            let mut command = <Cli as clap::CommandFactory>::command();
            let _ = command.print_help();
            return;
        }
    };

    match detect_file_kind(&file) {
        Some(FileKind::Source) => {
            let source = match std::fs::read_to_string(&file) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("Error: Cannot read file '{}': {}", file.display(), e);
                    process::exit(1);
                }
            };

            if config.compile_only {
                handle_compile_only(&file, &source, &config);
            } else {
                handle_run(&source, &config);
            }
        }
        Some(FileKind::Bytecode) => handle_bytecode(&file, &config),
        None => {
            let ext = file.extension().and_then(|e| e.to_str()).unwrap_or("");
            println!("Unknown file extension: {}", ext);
        }
    }
}

/// 根据 GOBY_LOG 环境变量构建 logger，未设置或无法识别时静默。
fn build_logger() -> Arc<Logger> {
    match std::env::var("GOBY_LOG") {
        Ok(value) => match Level::from_name(&value) {
            Some(level) => Logger::new(level).with_sink(StdoutSink),
            None => Logger::noop(),
        },
        Err(_) => Logger::noop(),
    }
}

/// 编译产物的落盘路径：与源文件同目录，扩展名换成 .gbbc
fn bytecode_path(source: &Path) -> PathBuf {
    source.with_extension(binary::ext::BYTECODE)
}

fn handle_compile_only(path: &Path, source: &str, config: &RunConfig) {
    let compiled = match compile_with_config(source, config) {
        Ok(output) => output,
        Err(e) => {
            print_error_with_source(&e, source);
            process::exit(1);
        }
    };

    let bytes = match serialize_program(&compiled.sequence, &config.compiler) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("❌ {}", GobyError::from(e));
            process::exit(1);
        }
    };

    let target = bytecode_path(path);
    if let Err(e) = std::fs::write(&target, &bytes) {
        eprintln!("Error: Cannot write '{}': {}", target.display(), e);
        process::exit(1);
    }
}

fn handle_run(source: &str, config: &RunConfig) {
    match run(source, config) {
        Ok(output) => report_profile(config, &output),
        Err(e) => {
            print_error_with_source(&e, source);
            process::exit(1);
        }
    }
}

fn handle_bytecode(path: &Path, config: &RunConfig) {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Error: Cannot read file '{}': {}", path.display(), e);
            process::exit(1);
        }
    };

    let sequence = match load_program(&bytes) {
        Ok(sequence) => sequence,
        Err(e) => {
            eprintln!("❌ {}", GobyError::from(e));
            process::exit(1);
        }
    };

    match execute_with_config(sequence, config) {
        Ok(output) => report_profile(config, &output),
        Err(e) => {
            eprintln!("❌ {}", e);
            process::exit(1);
        }
    }
}

/// -p 剖析输出：指令条数与墙钟耗时
fn report_profile(config: &RunConfig, output: &ExecuteOutput) {
    if config.profile {
        println!(
            "Executed {} instructions in {:?}",
            output.instructions_executed, output.elapsed
        );
    }
}
