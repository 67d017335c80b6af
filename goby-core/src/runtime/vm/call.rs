//! 方法解析与调用
//!
//! 实例接收者沿类的父类链查找实例方法；类接收者先沿链查找
//! 类方法，再落到 Class 类的实例方法（new、name、superclass）。

use std::rc::Rc;

use crate::runtime::bytecode::CompiledSequence;
use crate::runtime::object::{
    ArrayId, ArrayObject, BlockId, ClassId, ErrorObject, HashId, Method, RString, ScopeObject,
    Value,
};

use super::execution::{self, make_block};
use super::frame::{CallFrame, FrameKind};
use super::Vm;

// ==================== 帧访问 ====================

/// 当前帧。执行循环保证调用时帧栈非空。
pub(crate) fn frame(vm: &Vm) -> &CallFrame {
    match vm.frames.last() {
        Some(frame) => frame,
        None => panic!("no active call frame"),
    }
}

pub(crate) fn frame_mut(vm: &mut Vm) -> &mut CallFrame {
    match vm.frames.last_mut() {
        Some(frame) => frame,
        None => panic!("no active call frame"),
    }
}

// ==================== 派发 ====================

pub(crate) fn execute_send(
    vm: &mut Vm,
    name_index: u16,
    argc: u8,
    block_index: Option<u16>,
) -> Result<(), ErrorObject> {
    let name = execution::constant_str(vm, name_index)?;
    let block = match block_index {
        Some(index) => {
            let sequence = execution::constant_sequence(vm, index)?;
            Some(make_block(vm, sequence))
        }
        None => None,
    };
    let args = vm.drain_top(argc as usize);
    let receiver = vm.pop();
    invoke(vm, receiver, &name, args, block)
}

/// 派发一次调用。内建方法的返回值直接压栈；
/// 字节码方法压入新帧，由主循环继续执行。
fn invoke(
    vm: &mut Vm,
    receiver: Value,
    name: &str,
    args: Vec<Value>,
    block: Option<BlockId>,
) -> Result<(), ErrorObject> {
    match resolve_method(vm, &receiver, name) {
        Some(Method::Native(native)) => {
            let result = (native.func)(vm, receiver, &args, block)?;
            vm.push(result)
        }
        Some(Method::Bytecode(sequence)) => {
            push_method_frame(vm, sequence, receiver, args, block, FrameKind::Method)
        }
        None => {
            let class_name = class_name_of(vm, &receiver);
            Err(ErrorObject::no_method(name, &class_name))
        }
    }
}

pub(crate) fn resolve_method(vm: &Vm, receiver: &Value, name: &str) -> Option<Method> {
    match receiver {
        Value::Class(class_id) => {
            // 类方法沿父类链继承
            let mut current = Some(*class_id);
            while let Some(id) = current {
                let class = vm.heap.class(id);
                if let Some(method) = class.class_methods.get(name) {
                    return Some(method.clone());
                }
                current = class.superclass;
            }
            lookup_chain(vm, vm.core.class, name)
        }
        _ => lookup_chain(vm, class_of(vm, receiver), name),
    }
}

fn lookup_chain(vm: &Vm, start: ClassId, name: &str) -> Option<Method> {
    let mut current = Some(start);
    while let Some(id) = current {
        let class = vm.heap.class(id);
        if let Some(method) = class.methods.get(name) {
            return Some(method.clone());
        }
        current = class.superclass;
    }
    None
}

pub(crate) fn class_of(vm: &Vm, value: &Value) -> ClassId {
    match value {
        Value::Nil => vm.core.nil,
        Value::Boolean(_) => vm.core.boolean,
        Value::Integer(_) => vm.core.integer,
        Value::Str(_) => vm.core.string,
        Value::Range { .. } => vm.core.range,
        Value::Array(_) => vm.core.array,
        Value::Hash(_) => vm.core.hash,
        Value::Class(_) => vm.core.class,
        Value::Instance(id) => vm.heap.instance(*id).class,
        Value::Block(_) => vm.core.block,
        Value::Error(_) => vm.core.error,
    }
}

pub(crate) fn class_name_of(vm: &Vm, value: &Value) -> String {
    vm.heap.class(class_of(vm, value)).name.clone()
}

// ==================== 帧的进出 ====================

/// 压入方法帧：检查元数、绑定形参、建立新作用域。
pub(crate) fn push_method_frame(
    vm: &mut Vm,
    sequence: Rc<CompiledSequence>,
    self_value: Value,
    args: Vec<Value>,
    block: Option<BlockId>,
    kind: FrameKind,
) -> Result<(), ErrorObject> {
    if vm.frames.len() >= vm.limits.max_recursion_depth {
        return Err(ErrorObject::stack_overflow());
    }

    let required = sequence.required_count();
    let optional = sequence.optional_count();
    let splat = sequence.has_splat();
    let given = args.len();
    if given < required || (!splat && given > required + optional) {
        return Err(ErrorObject::wrong_arguments(given, &arity_label(required, optional, splat)));
    }

    let mut locals = vec![Value::Nil; sequence.locals_count];
    let direct = given.min(required + optional);
    let mut args = args.into_iter();
    for slot in locals.iter_mut().take(direct) {
        *slot = args.next().unwrap_or(Value::Nil);
    }
    if splat {
        let rest: Vec<Value> = args.collect();
        let id = vm.heap.alloc_array(ArrayObject { elements: rest });
        locals[required + optional] = Value::Array(id);
    }

    let scope = vm.heap.alloc_scope(ScopeObject { locals, parent: None });
    let stack_base = vm.stack.len();
    vm.frames.push(CallFrame {
        sequence,
        ip: 0,
        scope,
        self_value,
        block,
        stack_base,
        given_args: direct,
        kind,
    });
    Ok(())
}

fn arity_label(required: usize, optional: usize, splat: bool) -> String {
    if splat {
        format!("{}+", required)
    } else if optional > 0 {
        format!("{}..{}", required, required + optional)
    } else {
        required.to_string()
    }
}

pub(crate) fn execute_invoke_block(vm: &mut Vm, argc: u8) -> Result<(), ErrorObject> {
    let args = vm.drain_top(argc as usize);
    let block_id = match frame(vm).block {
        Some(id) => id,
        None => return Err(ErrorObject::internal("no block given (yield)")),
    };
    push_block_frame(vm, block_id, args)
}

/// 压入块帧。块的实参宽松绑定：缺的补 nil，多的忽略。
/// 新作用域的 parent 指向块的定义处，外层局部变量按引用可见。
pub(crate) fn push_block_frame(
    vm: &mut Vm,
    block_id: BlockId,
    args: Vec<Value>,
) -> Result<(), ErrorObject> {
    if vm.frames.len() >= vm.limits.max_recursion_depth {
        return Err(ErrorObject::stack_overflow());
    }
    let block = vm.heap.block(block_id).clone();
    let mut locals = vec![Value::Nil; block.sequence.locals_count];
    let param_count = block.sequence.params.len();
    for slot in 0..param_count.min(locals.len()) {
        locals[slot] = args.get(slot).cloned().unwrap_or(Value::Nil);
    }
    let scope = vm.heap.alloc_scope(ScopeObject { locals, parent: Some(block.scope) });
    let stack_base = vm.stack.len();
    vm.frames.push(CallFrame {
        sequence: block.sequence,
        ip: 0,
        scope,
        self_value: block.self_value,
        block: block.block,
        stack_base,
        given_args: param_count.min(args.len()),
        kind: FrameKind::Block,
    });
    Ok(())
}

/// 弹出当前帧并把返回值交给调用方。类体帧的返回值固定为 nil。
pub(crate) fn finish_frame(vm: &mut Vm, value: Value) -> Result<(), ErrorObject> {
    let frame = match vm.frames.pop() {
        Some(frame) => frame,
        None => return Err(ErrorObject::internal("return outside of any frame")),
    };
    // 帧里残留的补救点一并失效
    while let Some(handler) = vm.handlers.last() {
        if handler.frame_index >= vm.frames.len() {
            vm.handlers.pop();
        } else {
            break;
        }
    }
    vm.stack.truncate(frame.stack_base);
    let result = match frame.kind {
        FrameKind::ClassBody => Value::Nil,
        _ => value,
    };
    vm.push(result)
}

// ==================== 内建方法的重入 ====================

/// 从内建方法调用一个方法并取回返回值。字节码方法在嵌套的
/// 执行段里跑完，错误原样抛给内建方法的调用方。
pub(crate) fn call_method(
    vm: &mut Vm,
    receiver: Value,
    name: &str,
    args: Vec<Value>,
    block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    match resolve_method(vm, &receiver, name) {
        Some(Method::Native(native)) => (native.func)(vm, receiver, &args, block),
        Some(Method::Bytecode(sequence)) => {
            let depth = vm.frames.len();
            push_method_frame(vm, sequence, receiver, args, block, FrameKind::Method)?;
            execution::run_to_depth(vm, depth)?;
            Ok(vm.pop())
        }
        None => {
            let class_name = class_name_of(vm, &receiver);
            Err(ErrorObject::no_method(name, &class_name))
        }
    }
}

/// 从内建方法调用一个块并取回返回值。
pub(crate) fn call_block(
    vm: &mut Vm,
    block_id: BlockId,
    args: Vec<Value>,
) -> Result<Value, ErrorObject> {
    let depth = vm.frames.len();
    push_block_frame(vm, block_id, args)?;
    execution::run_to_depth(vm, depth)?;
    Ok(vm.pop())
}

// ==================== 相等与文本化 ====================

const MAX_COMPARE_DEPTH: usize = 64;

/// 语言层 `==` 的结构比较。数组与哈希逐元素递归，
/// 实例按同一性比较。
pub(crate) fn values_equal(vm: &Vm, a: &Value, b: &Value) -> bool {
    values_equal_at(vm, a, b, 0)
}

fn values_equal_at(vm: &Vm, a: &Value, b: &Value, depth: usize) -> bool {
    if depth > MAX_COMPARE_DEPTH {
        // 自引用结构按不相等处理
        return false;
    }
    match (a, b) {
        (Value::Nil, Value::Nil) => true,
        (Value::Boolean(x), Value::Boolean(y)) => x == y,
        (Value::Integer(x), Value::Integer(y)) => x == y,
        (Value::Str(x), Value::Str(y)) => x == y,
        (Value::Range { start: a_start, end: a_end }, Value::Range { start: b_start, end: b_end }) => {
            a_start == b_start && a_end == b_end
        }
        (Value::Array(x), Value::Array(y)) => {
            if x == y {
                return true;
            }
            let left = vm.heap.array(*x);
            let right = vm.heap.array(*y);
            left.elements.len() == right.elements.len()
                && left
                    .elements
                    .iter()
                    .zip(&right.elements)
                    .all(|(l, r)| values_equal_at(vm, l, r, depth + 1))
        }
        (Value::Hash(x), Value::Hash(y)) => {
            if x == y {
                return true;
            }
            let left = vm.heap.hash(*x);
            let right = vm.heap.hash(*y);
            left.pairs.len() == right.pairs.len()
                && left.pairs.iter().all(|(key, l)| match right.pairs.get(key) {
                    Some(r) => values_equal_at(vm, l, r, depth + 1),
                    None => false,
                })
        }
        (Value::Class(x), Value::Class(y)) => x == y,
        (Value::Instance(x), Value::Instance(y)) => x == y,
        (Value::Block(x), Value::Block(y)) => x == y,
        (Value::Error(x), Value::Error(y)) => x == y,
        _ => false,
    }
}

/// puts/print 使用的文本形式：字符串原样、nil 为空串，
/// 实例走 to_s 派发（可被用户覆盖），其余同 inspect。
pub(crate) fn display_value(vm: &mut Vm, value: &Value) -> Result<String, ErrorObject> {
    match value {
        Value::Str(s) => Ok(s.to_string()),
        Value::Nil => Ok(String::new()),
        Value::Instance(_) => {
            match call_method(vm, value.clone(), "to_s", Vec::new(), None)? {
                Value::Str(s) => Ok(s.to_string()),
                _ => Ok(format!("#<{}>", class_name_of(vm, value))),
            }
        }
        other => Ok(inspect_value(vm, other)),
    }
}

/// REPL 与集合内部使用的调试形式：字符串带引号与转义。
pub(crate) fn inspect_value(vm: &Vm, value: &Value) -> String {
    let mut visited = Vec::new();
    inspect_with(vm, value, &mut visited)
}

#[derive(PartialEq, Eq)]
enum VisitMark {
    Array(ArrayId),
    Hash(HashId),
}

fn inspect_with(vm: &Vm, value: &Value, visited: &mut Vec<VisitMark>) -> String {
    match value {
        Value::Nil => "nil".to_string(),
        Value::Boolean(b) => b.to_string(),
        Value::Integer(i) => i.to_string(),
        Value::Str(s) => format!("\"{}\"", escape_string(s)),
        Value::Range { start, end } => format!("({}..{})", start, end),
        Value::Array(id) => {
            if visited.contains(&VisitMark::Array(*id)) {
                return "[...]".to_string();
            }
            visited.push(VisitMark::Array(*id));
            let parts: Vec<String> = vm
                .heap
                .array(*id)
                .elements
                .iter()
                .map(|element| inspect_with(vm, element, visited))
                .collect();
            visited.pop();
            format!("[{}]", parts.join(", "))
        }
        Value::Hash(id) => {
            if visited.contains(&VisitMark::Hash(*id)) {
                return "{...}".to_string();
            }
            visited.push(VisitMark::Hash(*id));
            let hash = vm.heap.hash(*id);
            let parts: Vec<String> = hash
                .sorted_keys()
                .into_iter()
                .map(|key| {
                    let rendered = match hash.pairs.get(key) {
                        Some(value) => inspect_with(vm, value, visited),
                        None => "nil".to_string(),
                    };
                    format!("{}: {}", key, rendered)
                })
                .collect();
            visited.pop();
            if parts.is_empty() {
                "{}".to_string()
            } else {
                format!("{{ {} }}", parts.join(", "))
            }
        }
        Value::Class(id) => vm.heap.class(*id).name.clone(),
        Value::Instance(_) => format!("#<{}>", class_name_of(vm, value)),
        Value::Block(_) => "#<Block>".to_string(),
        Value::Error(error) => format!("#<{}: {}>", error.class_name, error.message),
    }
}

fn escape_string(s: &RString) -> String {
    let mut out = String::new();
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            other => out.push(*other),
        }
    }
    out
}
