//! 虚拟机实现
//!
//! 基于操作数栈的解释器。对象放在每个虚拟机私有的堆里，
//! 运行期错误是值，沿补救点链向外传播。

use std::collections::HashMap;
use std::fmt;
use std::io::Write;
use std::rc::Rc;
use std::sync::Arc;

use goby_config::LimitConfig;
use goby_log::Logger;

use crate::runtime::bytecode::CompiledSequence;
use crate::runtime::object::{
    ArrayObject, BlockId, ErrorObject, Heap, InstanceObject, ScopeId, ScopeObject, Value,
};
use crate::runtime::stdlib::{self, CoreClasses};

mod call;
mod execution;
mod frame;

pub use frame::{CallFrame, FrameKind, RescueHandler};

pub(crate) use call::{
    call_block, call_method, class_name_of, class_of, display_value, inspect_value,
    resolve_method, values_equal,
};

// ==================== 运行期错误 ====================

/// 未被 rescue 捕获、传播到宿主的错误。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeError {
    pub class_name: String,
    pub message: String,
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.class_name, self.message)
    }
}

impl std::error::Error for RuntimeError {}

impl From<ErrorObject> for RuntimeError {
    fn from(error: ErrorObject) -> Self {
        RuntimeError { class_name: error.class_name, message: error.message }
    }
}

// ==================== 虚拟机 ====================

pub struct Vm {
    pub(crate) stack: Vec<Value>,
    pub(crate) frames: Vec<CallFrame>,
    pub(crate) heap: Heap,
    /// 顶层常量表，类名也登记在这里。
    pub(crate) constants: HashMap<String, Value>,
    pub(crate) core: CoreClasses,
    pub(crate) handlers: Vec<RescueHandler>,
    pub(crate) limits: LimitConfig,
    pub(crate) logger: Arc<Logger>,
    pub(crate) output: Box<dyn Write>,
    pub(crate) instructions_executed: u64,
    pub(crate) main_object: Value,
    /// REPL 跨行共享的主作用域。
    repl_scope: Option<ScopeId>,
}

impl Vm {
    pub fn new() -> Self {
        Self::with_config(LimitConfig::default())
    }

    pub fn with_config(limits: LimitConfig) -> Self {
        Self::with_config_and_logger(limits, Logger::noop())
    }

    pub fn with_config_and_logger(limits: LimitConfig, logger: Arc<Logger>) -> Self {
        let mut heap = Heap::new();
        let mut constants = HashMap::new();
        let core = stdlib::bootstrap(&mut heap, &mut constants);
        let main_object = Value::Instance(heap.alloc_instance(InstanceObject::new(core.object)));
        Vm {
            stack: Vec::new(),
            frames: Vec::new(),
            heap,
            constants,
            core,
            handlers: Vec::new(),
            limits,
            logger,
            output: Box::new(std::io::stdout()),
            instructions_executed: 0,
            main_object,
            repl_scope: None,
        }
    }

    /// 重定向 puts/print 的输出。
    pub fn set_output(&mut self, sink: Box<dyn Write>) {
        self.output = sink;
    }

    /// 把宿主命令行参数暴露为顶层常量 ARGV。
    pub fn set_argv(&mut self, args: &[String]) {
        let elements = args.iter().map(|arg| Value::string(arg.clone())).collect();
        let id = self.heap.alloc_array(ArrayObject { elements });
        self.constants.insert("ARGV".to_string(), Value::Array(id));
    }

    /// 自启动以来执行的指令条数，供 -p 剖析输出。
    pub fn instructions_executed(&self) -> u64 {
        self.instructions_executed
    }

    /// 值的程序员可读形式，REPL 回显用。
    pub fn inspect(&self, value: &Value) -> String {
        call::inspect_value(self, value)
    }

    /// 当前帧携带的块，内建方法 block_given 使用。
    pub(crate) fn current_block(&self) -> Option<BlockId> {
        self.frames.last().and_then(|frame| frame.block)
    }

    /// 执行主序列，返回最后一条表达式的值。
    pub fn run(&mut self, sequence: Rc<CompiledSequence>) -> Result<Value, RuntimeError> {
        let scope = self.heap.alloc_scope(ScopeObject {
            locals: vec![Value::Nil; sequence.locals_count],
            parent: None,
        });
        self.execute_main(sequence, scope)
    }

    /// REPL 入口：在跨行共享的作用域里执行，先前的局部变量
    /// 保持可见。出错后虚拟机状态已复位，可以继续喂下一行。
    pub fn run_repl(&mut self, sequence: Rc<CompiledSequence>) -> Result<Value, RuntimeError> {
        let scope = match self.repl_scope {
            Some(scope) => scope,
            None => {
                let scope = self.heap.alloc_scope(ScopeObject { locals: Vec::new(), parent: None });
                self.repl_scope = Some(scope);
                scope
            }
        };
        let locals = &mut self.heap.scope_mut(scope).locals;
        while locals.len() < sequence.locals_count {
            locals.push(Value::Nil);
        }
        self.execute_main(sequence, scope)
    }

    fn execute_main(
        &mut self,
        sequence: Rc<CompiledSequence>,
        scope: ScopeId,
    ) -> Result<Value, RuntimeError> {
        let base = self.frames.len();
        let stack_base = self.stack.len();
        self.frames.push(CallFrame {
            sequence,
            ip: 0,
            scope,
            self_value: self.main_object.clone(),
            block: None,
            stack_base,
            given_args: 0,
            kind: FrameKind::Main,
        });
        match execution::run_to_depth(self, base) {
            Ok(()) => Ok(self.pop()),
            Err(error) => {
                self.frames.truncate(base);
                self.stack.truncate(stack_base);
                self.handlers.clear();
                Err(RuntimeError::from(error))
            }
        }
    }

    // ==================== 操作数栈 ====================

    pub(crate) fn push(&mut self, value: Value) -> Result<(), ErrorObject> {
        if self.stack.len() >= self.limits.max_stack_size {
            return Err(ErrorObject::stack_overflow());
        }
        self.stack.push(value);
        Ok(())
    }

    /// 编译器保证栈平衡；空栈弹出按 nil 兜底。
    pub(crate) fn pop(&mut self) -> Value {
        self.stack.pop().unwrap_or(Value::Nil)
    }

    pub(crate) fn peek(&self) -> Value {
        self.stack.last().cloned().unwrap_or(Value::Nil)
    }

    /// 按入栈顺序取走栈顶 count 个值。
    pub(crate) fn drain_top(&mut self, count: usize) -> Vec<Value> {
        let start = self.stack.len().saturating_sub(count);
        self.stack.split_off(start)
    }
}

impl Default for Vm {
    fn default() -> Self {
        Vm::new()
    }
}
