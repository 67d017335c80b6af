//! Range 类的内建方法。区间两端都是整数且包含端点，
//! start 大于 end 的区间为空。

use crate::runtime::object::{ArrayObject, BlockId, ErrorObject, Heap, Value};
use crate::runtime::vm::{call_block, values_equal, Vm};

use super::{define_native, expect_argc, CoreClasses};

pub(super) fn install(heap: &mut Heap, core: &CoreClasses) {
    define_native(heap, core.range, "first", range_first);
    define_native(heap, core.range, "last", range_last);
    define_native(heap, core.range, "size", range_size);
    define_native(heap, core.range, "count", range_size);
    define_native(heap, core.range, "length", range_size);
    define_native(heap, core.range, "to_a", range_to_a);
    define_native(heap, core.range, "each", range_each);
    define_native(heap, core.range, "map", range_map);
    define_native(heap, core.range, "include", range_include);
    define_native(heap, core.range, "to_s", range_to_s);
    define_native(heap, core.range, "==", range_eq);
}

fn receiver_range(receiver: &Value) -> Result<(i64, i64), ErrorObject> {
    match receiver {
        Value::Range { start, end } => Ok((*start, *end)),
        other => Err(ErrorObject::type_mismatch("Range", other.type_name())),
    }
}

fn range_first(
    _vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 0)?;
    let (start, _) = receiver_range(&receiver)?;
    Ok(Value::Integer(start))
}

fn range_last(
    _vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 0)?;
    let (_, end) = receiver_range(&receiver)?;
    Ok(Value::Integer(end))
}

/// size -> Integer，空区间为 0。
fn range_size(
    _vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 0)?;
    let (start, end) = receiver_range(&receiver)?;
    if start > end {
        return Ok(Value::Integer(0));
    }
    Ok(Value::Integer(end.saturating_sub(start).saturating_add(1)))
}

fn range_to_a(
    vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 0)?;
    let (start, end) = receiver_range(&receiver)?;
    let elements: Vec<Value> = (start..=end).map(Value::Integer).collect();
    let id = vm.heap.alloc_array(ArrayObject { elements });
    Ok(Value::Array(id))
}

/// each { |i| ... } -> self，升序产出每个端点间的整数。
fn range_each(
    vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 0)?;
    let (start, end) = receiver_range(&receiver)?;
    let block = block.ok_or_else(|| ErrorObject::internal("no block given"))?;
    for i in start..=end {
        call_block(vm, block, vec![Value::Integer(i)])?;
    }
    Ok(receiver)
}

fn range_map(
    vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 0)?;
    let (start, end) = receiver_range(&receiver)?;
    let block = block.ok_or_else(|| ErrorObject::internal("no block given"))?;
    let mut mapped = Vec::new();
    for i in start..=end {
        mapped.push(call_block(vm, block, vec![Value::Integer(i)])?);
    }
    let id = vm.heap.alloc_array(ArrayObject { elements: mapped });
    Ok(Value::Array(id))
}

/// include(v) -> Boolean，非整数一律不在区间里。
fn range_include(
    _vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 1)?;
    let (start, end) = receiver_range(&receiver)?;
    let member = match &args[0] {
        Value::Integer(v) => start <= *v && *v <= end,
        _ => false,
    };
    Ok(Value::Boolean(member))
}

fn range_to_s(
    _vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 0)?;
    let (start, end) = receiver_range(&receiver)?;
    Ok(Value::string(format!("({}..{})", start, end)))
}

fn range_eq(
    vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 1)?;
    Ok(Value::Boolean(values_equal(vm, &receiver, &args[0])))
}
