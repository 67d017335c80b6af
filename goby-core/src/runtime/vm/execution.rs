//! 主执行循环
//!
//! run_to_depth 把帧栈跑回指定深度。内建方法回调用户码时
//! 以当前深度为基线重入同一个循环，错误只在基线之上被
//! 补救点消化，否则原样抛给调用方。

use std::rc::Rc;

use crate::runtime::bytecode::{Instruction, Literal};
use crate::runtime::object::{
    ArrayObject, BlockObject, ClassObject, ErrorObject, HashObject, Method, ScopeObject, Value,
};

use super::frame::{CallFrame, FrameKind, RescueHandler};
use super::{call, Vm};

/// 执行到帧栈深度回到 base 为止。
pub(crate) fn run_to_depth(vm: &mut Vm, base: usize) -> Result<(), ErrorObject> {
    loop {
        if vm.frames.len() <= base {
            return Ok(());
        }
        let fetched = {
            let Some(frame) = vm.frames.last_mut() else {
                return Ok(());
            };
            match frame.sequence.instructions.get(frame.ip).copied() {
                Some(instruction) => {
                    frame.ip += 1;
                    Some(instruction)
                }
                None => None,
            }
        };
        let result = match fetched {
            Some(instruction) => {
                vm.instructions_executed += 1;
                execute(vm, instruction)
            }
            // 序列尾部兜底：视作返回 nil
            None => call::finish_frame(vm, Value::Nil),
        };
        if let Err(error) = result {
            handle_error(vm, error, base)?;
        }
    }
}

/// 把错误交给最近的补救点；基线之下没有可用补救点时向外抛。
fn handle_error(vm: &mut Vm, error: ErrorObject, base: usize) -> Result<(), ErrorObject> {
    let handler = match vm.handlers.last() {
        Some(handler) if handler.frame_index >= base => *handler,
        _ => return Err(error),
    };
    vm.handlers.pop();
    vm.frames.truncate(handler.frame_index + 1);
    if let Some(frame) = vm.frames.last_mut() {
        frame.ip = handler.target as usize;
    }
    vm.stack.truncate(handler.stack_len);
    vm.push(Value::Error(Rc::new(error)))?;
    // 被丢弃的帧里注册的补救点一并失效
    while let Some(stale) = vm.handlers.last() {
        if stale.frame_index >= vm.frames.len() {
            vm.handlers.pop();
        } else {
            break;
        }
    }
    Ok(())
}

/// 执行单条指令。
fn execute(vm: &mut Vm, instruction: Instruction) -> Result<(), ErrorObject> {
    match instruction {
        // ==================== 常量与字面值 ====================
        Instruction::PushConstant(index) => {
            let value = constant_value(vm, index)?;
            vm.push(value)?;
        }
        Instruction::PushNil => vm.push(Value::Nil)?,
        Instruction::PushTrue => vm.push(Value::Boolean(true))?,
        Instruction::PushFalse => vm.push(Value::Boolean(false))?,
        Instruction::PushSelf => {
            let value = call::frame(vm).self_value.clone();
            vm.push(value)?;
        }

        // ==================== 栈操作 ====================
        Instruction::Pop => {
            vm.pop();
        }
        Instruction::Dup => {
            let top = vm.peek();
            vm.push(top)?;
        }

        // ==================== 局部变量 ====================
        Instruction::GetLocal { depth, index } => {
            let scope = call::frame(vm).scope;
            let target = vm.heap.scope_at_depth(scope, depth as usize);
            let value = vm
                .heap
                .scope(target)
                .locals
                .get(index as usize)
                .cloned()
                .unwrap_or(Value::Nil);
            vm.push(value)?;
        }
        Instruction::SetLocal { depth, index } => {
            let value = vm.peek();
            let scope = call::frame(vm).scope;
            let target = vm.heap.scope_at_depth(scope, depth as usize);
            let locals = &mut vm.heap.scope_mut(target).locals;
            let slot = index as usize;
            if slot >= locals.len() {
                locals.resize(slot + 1, Value::Nil);
            }
            locals[slot] = value;
        }

        // ==================== 实例变量 ====================
        Instruction::GetInstanceVariable(index) => {
            let name = constant_str(vm, index)?;
            let value = match call::frame(vm).self_value {
                Value::Instance(id) => {
                    vm.heap.instance(id).ivars.get(&name).cloned().unwrap_or(Value::Nil)
                }
                _ => Value::Nil,
            };
            vm.push(value)?;
        }
        Instruction::SetInstanceVariable(index) => {
            let name = constant_str(vm, index)?;
            let value = vm.peek();
            let receiver = call::frame(vm).self_value.clone();
            match receiver {
                Value::Instance(id) => {
                    vm.heap.instance_mut(id).ivars.insert(name, value);
                }
                _ => {
                    return Err(ErrorObject::type_error(
                        "instance variables are only available on instances",
                    ))
                }
            }
        }

        // ==================== 常量表 ====================
        Instruction::GetConstant(index) => {
            let name = constant_str(vm, index)?;
            let value = match vm.constants.get(&name) {
                Some(value) => value.clone(),
                None => return Err(ErrorObject::undefined_constant(&name)),
            };
            vm.push(value)?;
        }
        Instruction::SetConstant(index) => {
            let name = constant_str(vm, index)?;
            let value = vm.peek();
            vm.constants.insert(name, value);
        }

        // ==================== 复合字面量 ====================
        Instruction::NewArray(count) => {
            let elements = vm.drain_top(count as usize);
            let id = vm.heap.alloc_array(ArrayObject { elements });
            vm.push(Value::Array(id))?;
        }
        Instruction::NewHash(count) => {
            let mut flat = vm.drain_top(count as usize * 2);
            let mut hash = HashObject::default();
            // 后写的键覆盖先写的
            while flat.len() >= 2 {
                let value = flat.pop().unwrap_or(Value::Nil);
                let key = flat.pop().unwrap_or(Value::Nil);
                match key {
                    Value::Str(s) => {
                        hash.pairs.entry(s.to_string()).or_insert(value);
                    }
                    other => {
                        return Err(ErrorObject::type_mismatch("String", other.type_name()))
                    }
                }
            }
            let id = vm.heap.alloc_hash(hash);
            vm.push(Value::Hash(id))?;
        }
        Instruction::NewRange => {
            let end = vm.pop();
            let start = vm.pop();
            match (start, end) {
                (Value::Integer(start), Value::Integer(end)) => {
                    vm.push(Value::Range { start, end })?;
                }
                (start, end) => {
                    let bad = if matches!(start, Value::Integer(_)) { end } else { start };
                    return Err(ErrorObject::type_mismatch("Integer", bad.type_name()));
                }
            }
        }

        // ==================== 跳转 ====================
        Instruction::Jump(target) => {
            call::frame_mut(vm).ip = target as usize;
        }
        Instruction::JumpIfFalse(target) => {
            let condition = vm.pop();
            if !condition.is_truthy() {
                call::frame_mut(vm).ip = target as usize;
            }
        }
        Instruction::JumpIfTrue(target) => {
            let condition = vm.pop();
            if condition.is_truthy() {
                call::frame_mut(vm).ip = target as usize;
            }
        }
        Instruction::JumpIfBound { index, target } => {
            if (index as usize) < call::frame(vm).given_args {
                call::frame_mut(vm).ip = target as usize;
            }
        }

        // ==================== 调用 ====================
        Instruction::Send { name, argc, block } => {
            call::execute_send(vm, name, argc, block)?;
        }
        Instruction::InvokeBlock { argc } => {
            call::execute_invoke_block(vm, argc)?;
        }
        Instruction::Return => {
            let value = vm.pop();
            call::finish_frame(vm, value)?;
        }

        // ==================== 定义 ====================
        Instruction::DefineMethod { name, body } => {
            let name = constant_str(vm, name)?;
            let sequence = constant_sequence(vm, body)?;
            let target = method_target(vm);
            vm.heap.class_mut(target).methods.insert(name, Method::Bytecode(sequence));
        }
        Instruction::DefineClassMethod { name, body } => {
            let name = constant_str(vm, name)?;
            let sequence = constant_sequence(vm, body)?;
            let receiver = call::frame(vm).self_value.clone();
            match receiver {
                Value::Class(class_id) => {
                    vm.heap
                        .class_mut(class_id)
                        .class_methods
                        .insert(name, Method::Bytecode(sequence));
                }
                _ => {
                    // 类体之外的 def self.x 等价于普通 def
                    let target = method_target(vm);
                    vm.heap.class_mut(target).methods.insert(name, Method::Bytecode(sequence));
                }
            }
        }
        Instruction::DefineClass { name, body, is_module, has_superclass } => {
            execute_define_class(vm, name, body, is_module, has_superclass)?;
        }
        Instruction::Include => {
            execute_include(vm)?;
        }

        // ==================== 补救点 ====================
        Instruction::PushRescue(target) => {
            vm.handlers.push(RescueHandler {
                frame_index: vm.frames.len().saturating_sub(1),
                stack_len: vm.stack.len(),
                target,
            });
        }
        Instruction::PopRescue => {
            vm.handlers.pop();
        }
    }
    Ok(())
}

// ==================== 指令辅助 ====================

/// 当前帧常量池里的字面量转为值。
fn constant_value(vm: &Vm, index: u16) -> Result<Value, ErrorObject> {
    match call::frame(vm).sequence.constants.get(index as usize) {
        Some(Literal::Integer(value)) => Ok(Value::Integer(*value)),
        Some(Literal::Str(value)) => Ok(Value::string(value.clone())),
        Some(Literal::Sequence(_)) => {
            Err(ErrorObject::internal("sequence literal cannot be pushed"))
        }
        None => Err(ErrorObject::internal("constant index out of range")),
    }
}

pub(crate) fn constant_str(vm: &Vm, index: u16) -> Result<String, ErrorObject> {
    match call::frame(vm).sequence.constants.get(index as usize) {
        Some(Literal::Str(value)) => Ok(value.clone()),
        _ => Err(ErrorObject::internal("expected string constant")),
    }
}

pub(crate) fn constant_sequence(
    vm: &Vm,
    index: u16,
) -> Result<Rc<crate::runtime::bytecode::CompiledSequence>, ErrorObject> {
    match call::frame(vm).sequence.constants.get(index as usize) {
        Some(Literal::Sequence(sequence)) => Ok(sequence.clone()),
        _ => Err(ErrorObject::internal("expected sequence constant")),
    }
}

/// def 注册方法的目标类：self 是类时定义实例方法，
/// 否则落到 self 所属的类（顶层就是 Object）。
fn method_target(vm: &Vm) -> crate::runtime::object::ClassId {
    match call::frame(vm).self_value {
        Value::Class(class_id) => class_id,
        ref other => call::class_of(vm, other),
    }
}

fn execute_define_class(
    vm: &mut Vm,
    name: u16,
    body: u16,
    is_module: bool,
    has_superclass: bool,
) -> Result<(), ErrorObject> {
    let superclass = if has_superclass {
        match vm.pop() {
            Value::Class(class_id) => {
                if vm.heap.class(class_id).is_module {
                    return Err(ErrorObject::type_error("superclass must be a Class, got a module"));
                }
                Some(class_id)
            }
            other => {
                return Err(ErrorObject::type_mismatch("Class", other.type_name()));
            }
        }
    } else {
        None
    };

    let name = constant_str(vm, name)?;
    let sequence = constant_sequence(vm, body)?;

    let existing = match vm.constants.get(&name) {
        Some(Value::Class(id)) => Some(*id),
        _ => None,
    };
    let class_id = match existing {
        // 重新打开已有定义，方法表合并
        Some(existing) => {
            let class = vm.heap.class(existing);
            if class.is_module != is_module {
                let wanted = if is_module { "module" } else { "class" };
                return Err(ErrorObject::type_error(format!("{} is not a {}", name, wanted)));
            }
            if let Some(wanted) = superclass {
                if class.superclass != Some(wanted) {
                    return Err(ErrorObject::type_error(format!(
                        "superclass mismatch for class {}",
                        name
                    )));
                }
            }
            existing
        }
        None => {
            let class = if is_module {
                ClassObject::new_module(&name)
            } else {
                ClassObject::new(&name, superclass.or(Some(vm.core.object)))
            };
            let id = vm.heap.alloc_class(class);
            vm.constants.insert(name, Value::Class(id));
            id
        }
    };

    // 类体在类对象为 self 的帧里执行
    if vm.frames.len() >= vm.limits.max_recursion_depth {
        return Err(ErrorObject::stack_overflow());
    }
    let scope = vm.heap.alloc_scope(ScopeObject {
        locals: vec![Value::Nil; sequence.locals_count],
        parent: None,
    });
    let stack_base = vm.stack.len();
    vm.frames.push(CallFrame {
        sequence,
        ip: 0,
        scope,
        self_value: Value::Class(class_id),
        block: None,
        stack_base,
        given_args: 0,
        kind: FrameKind::ClassBody,
    });
    Ok(())
}

/// include：把模块的实例方法拷贝进目标类。快照语义，
/// 此后模块再添方法不会追溯生效。
fn execute_include(vm: &mut Vm) -> Result<(), ErrorObject> {
    let module = vm.pop();
    let module_id = match module {
        Value::Class(class_id) if vm.heap.class(class_id).is_module => class_id,
        Value::Class(class_id) => {
            let name = vm.heap.class(class_id).name.clone();
            return Err(ErrorObject::type_error(format!("{} is not a module", name)));
        }
        other => return Err(ErrorObject::type_mismatch("Module", other.type_name())),
    };
    let target = method_target(vm);
    let methods: Vec<(String, Method)> = vm
        .heap
        .class(module_id)
        .methods
        .iter()
        .map(|(name, method)| (name.clone(), method.clone()))
        .collect();
    for (name, method) in methods {
        vm.heap.class_mut(target).methods.insert(name, method);
    }
    Ok(())
}

/// 创建块对象，捕获当前帧的环境。供 Send 的块操作数使用。
pub(crate) fn make_block(
    vm: &mut Vm,
    sequence: Rc<crate::runtime::bytecode::CompiledSequence>,
) -> crate::runtime::object::BlockId {
    let (scope, self_value, outer_block) = {
        let frame = call::frame(vm);
        (frame.scope, frame.self_value.clone(), frame.block)
    };
    vm.heap.alloc_block(BlockObject { sequence, scope, self_value, block: outer_block })
}
