//! Goby Core - Language core (pure logic, no terminal IO)
//!
//! Contains lexer, parser, bytecode compiler, object model, virtual machine,
//! the built-in method library, and the `.gbbc` binary codec.
//! Output produced by the running program goes through the VM's output sink;
//! nothing here touches stdout/stderr directly.
//!
//! Configuration is passed explicitly via parameters, not via global state.

pub mod binary;
pub mod compiler;
pub mod kit;
pub mod runtime;

// Re-export common types
pub use runtime::bytecode::CompiledSequence;
pub use runtime::object::Value;
pub use runtime::vm::Vm;

// Re-export config types from goby-config
pub use goby_config::{CompilerConfig, LimitConfig, Phase};
