//! 字节码层
//!
//! 结构化指令集与编译产物（指令序列）。
//! 磁盘编码（.gbbc）在 crate::binary 中实现。

mod instruction;
mod sequence;

pub use instruction::Instruction;
pub use sequence::{CompiledSequence, Literal, Param, ParamInfo};
