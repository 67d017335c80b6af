//! 调用帧与补救点

use std::rc::Rc;

use crate::runtime::bytecode::CompiledSequence;
use crate::runtime::object::{BlockId, ScopeId, Value};

// ==================== 帧 ====================

/// 帧的种类决定返回值的取舍：类体帧固定返回 nil。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Main,
    Method,
    Block,
    ClassBody,
}

#[derive(Debug, Clone)]
pub struct CallFrame {
    pub sequence: Rc<CompiledSequence>,
    pub ip: usize,
    pub scope: ScopeId,
    pub self_value: Value,
    /// 随调用传入的块，yield 的目标。
    pub block: Option<BlockId>,
    /// 进入帧时的操作数栈深度，返回时截回这里。
    pub stack_base: usize,
    /// 直接绑定的实参个数，缺省值序言按它判断跳过。
    pub given_args: usize,
    pub kind: FrameKind,
}

// ==================== 补救点 ====================

/// 一个活动的 begin 区。出错时栈截回 `stack_len`、压入错误值、
/// 跳到 `target` 继续执行。
#[derive(Debug, Clone, Copy)]
pub struct RescueHandler {
    pub frame_index: usize,
    pub stack_len: usize,
    pub target: u32,
}
