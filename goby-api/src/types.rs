//! API 类型定义
//!
//! 编译和执行的输入输出类型。

use std::rc::Rc;
use std::time::Duration;

use goby_core::{CompiledSequence, Value};

/// 编译输出
#[derive(Debug)]
pub struct CompileOutput {
    /// 主指令序列（方法体、块体与类体挂在常量池里）
    pub sequence: Rc<CompiledSequence>,
}

/// 执行输出
#[derive(Debug)]
pub struct ExecuteOutput {
    /// 程序最后一条表达式的值
    pub value: Value,
    /// 值的程序员可读形式（REPL 回显用）
    pub inspect: String,
    /// 执行的指令条数
    pub instructions_executed: u64,
    /// 墙钟执行耗时
    pub elapsed: Duration,
}
