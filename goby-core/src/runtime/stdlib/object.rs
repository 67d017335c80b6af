//! Object 类的内建方法，所有值都继承这里。

use std::io::Write;

use crate::runtime::object::{BlockId, ErrorObject, Heap, Value};
use crate::runtime::vm::{call_method, class_name_of, class_of, display_value, inspect_value, values_equal, Vm};

use super::{define_native, expect_argc, CoreClasses};

pub(super) fn install(heap: &mut Heap, core: &CoreClasses) {
    define_native(heap, core.object, "puts", object_puts);
    define_native(heap, core.object, "print", object_print);
    define_native(heap, core.object, "class", object_class);
    define_native(heap, core.object, "to_s", object_to_s);
    define_native(heap, core.object, "inspect", object_inspect);
    define_native(heap, core.object, "==", object_eq);
    define_native(heap, core.object, "!=", object_neq);
    define_native(heap, core.object, "!", object_not);
    define_native(heap, core.object, "block_given", object_block_given);
}

/// puts(*values) -> nil，每个实参一行；无实参输出空行。
fn object_puts(
    vm: &mut Vm,
    _receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    if args.is_empty() {
        write_out(vm, "\n")?;
        return Ok(Value::Nil);
    }
    for arg in args {
        let text = display_value(vm, arg)?;
        write_out(vm, &text)?;
        write_out(vm, "\n")?;
    }
    Ok(Value::Nil)
}

/// print(*values) -> nil，不追加换行。
fn object_print(
    vm: &mut Vm,
    _receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    for arg in args {
        let text = display_value(vm, arg)?;
        write_out(vm, &text)?;
    }
    Ok(Value::Nil)
}

fn write_out(vm: &mut Vm, text: &str) -> Result<(), ErrorObject> {
    vm.output
        .write_all(text.as_bytes())
        .map_err(|e| ErrorObject::internal(format!("output write failed: {}", e)))
}

fn object_class(
    vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 0)?;
    Ok(Value::Class(class_of(vm, &receiver)))
}

/// 默认文本形式 `#<类名>`，用户类可覆盖。
fn object_to_s(
    vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 0)?;
    Ok(Value::string(format!("#<{}>", class_name_of(vm, &receiver))))
}

fn object_inspect(
    vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 0)?;
    Ok(Value::string(inspect_value(vm, &receiver)))
}

/// 原始值按结构比较，实例按同一性比较。
fn object_eq(
    vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 1)?;
    Ok(Value::Boolean(values_equal(vm, &receiver, &args[0])))
}

/// != 走 == 的派发再取反，用户覆盖的 == 因此一并生效。
fn object_neq(
    vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 1)?;
    let equal = call_method(vm, receiver, "==", vec![args[0].clone()], None)?;
    Ok(Value::Boolean(!equal.is_truthy()))
}

fn object_not(
    _vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 0)?;
    Ok(Value::Boolean(!receiver.is_truthy()))
}

/// 调用方所在的方法是否带着块。
fn object_block_given(
    vm: &mut Vm,
    _receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 0)?;
    Ok(Value::Boolean(vm.current_block().is_some()))
}
