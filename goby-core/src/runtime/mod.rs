//! Goby 运行时
//!
//! 字节码虚拟机实现。
//!
//! 本模块包含：
//! - 指令集与已编译序列（bytecode）
//! - AST 到指令序列的编译器（compiler）
//! - 值表示、堆与类对象（object）
//! - 栈式虚拟机（vm）
//! - 各原始类型的内建方法库（stdlib）

// ==================== 指令与序列 ====================

pub mod bytecode;

// ==================== 字节码编译器 ====================

pub mod compiler;

// ==================== 对象模型 ====================

pub mod object;

// ==================== 内建方法库 ====================

pub mod stdlib;

// ==================== 虚拟机 ====================

pub mod vm;

// ==================== 常用类型导出 ====================

pub use bytecode::{CompiledSequence, Instruction, Literal};
pub use compiler::{compile, compile_with_locals, CompileError, Compiler};
pub use object::{ErrorObject, Value};
pub use vm::{RuntimeError, Vm};
