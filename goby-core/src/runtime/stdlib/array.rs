//! Array 类的内建方法。写入方法就地改动堆上的数组对象，
//! each/map 按下标迭代，块在迭代中改动数组也不会越界。

use crate::runtime::object::{ArrayId, ArrayObject, BlockId, ErrorObject, Heap, Value};
use crate::runtime::vm::{call_block, inspect_value, values_equal, Vm};

use super::{define_native, expect_argc, int_arg, CoreClasses};

pub(super) fn install(heap: &mut Heap, core: &CoreClasses) {
    define_native(heap, core.array, "[]", array_index);
    define_native(heap, core.array, "[]=", array_index_set);
    define_native(heap, core.array, "length", array_length);
    define_native(heap, core.array, "count", array_length);
    define_native(heap, core.array, "size", array_length);
    define_native(heap, core.array, "push", array_push);
    define_native(heap, core.array, "<<", array_append);
    define_native(heap, core.array, "pop", array_pop);
    define_native(heap, core.array, "shift", array_shift);
    define_native(heap, core.array, "unshift", array_unshift);
    define_native(heap, core.array, "first", array_first);
    define_native(heap, core.array, "last", array_last);
    define_native(heap, core.array, "reverse", array_reverse);
    define_native(heap, core.array, "include", array_include);
    define_native(heap, core.array, "empty", array_empty);
    define_native(heap, core.array, "each", array_each);
    define_native(heap, core.array, "map", array_map);
    define_native(heap, core.array, "+", array_add);
    define_native(heap, core.array, "to_s", array_to_s);
    define_native(heap, core.array, "==", array_eq);
}

fn receiver_array(receiver: &Value) -> Result<ArrayId, ErrorObject> {
    match receiver {
        Value::Array(id) => Ok(*id),
        other => Err(ErrorObject::type_mismatch("Array", other.type_name())),
    }
}

/// a[i] -> Value | nil，负下标加长度，越界得 nil。
fn array_index(
    vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 1)?;
    let id = receiver_array(&receiver)?;
    let index = int_arg(&args[0])?;
    let elements = &vm.heap.array(id).elements;
    let len = elements.len() as i64;
    let resolved = if index < 0 { index + len } else { index };
    if resolved < 0 || resolved >= len {
        return Ok(Value::Nil);
    }
    Ok(elements[resolved as usize].clone())
}

/// a[i] = v -> v，越过末尾的赋值先用 nil 补齐。
fn array_index_set(
    vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 2)?;
    let id = receiver_array(&receiver)?;
    let index = int_arg(&args[0])?;
    let value = args[1].clone();

    let len = vm.heap.array(id).elements.len() as i64;
    let resolved = if index < 0 { index + len } else { index };
    if resolved < 0 {
        return Err(ErrorObject::argument_error(format!("index {} out of range", index)));
    }
    let at = resolved as usize;
    let elements = &mut vm.heap.array_mut(id).elements;
    if at >= elements.len() {
        elements.resize(at + 1, Value::Nil);
    }
    elements[at] = value.clone();
    Ok(value)
}

fn array_length(
    vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 0)?;
    let id = receiver_array(&receiver)?;
    Ok(Value::Integer(vm.heap.array(id).elements.len() as i64))
}

/// push(*values) -> self。
fn array_push(
    vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    let id = receiver_array(&receiver)?;
    vm.heap.array_mut(id).elements.extend(args.iter().cloned());
    Ok(receiver)
}

/// a << v -> self。
fn array_append(
    vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 1)?;
    let id = receiver_array(&receiver)?;
    vm.heap.array_mut(id).elements.push(args[0].clone());
    Ok(receiver)
}

fn array_pop(
    vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 0)?;
    let id = receiver_array(&receiver)?;
    Ok(vm.heap.array_mut(id).elements.pop().unwrap_or(Value::Nil))
}

fn array_shift(
    vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 0)?;
    let id = receiver_array(&receiver)?;
    let elements = &mut vm.heap.array_mut(id).elements;
    if elements.is_empty() {
        return Ok(Value::Nil);
    }
    Ok(elements.remove(0))
}

/// unshift(*values) -> self，实参按原顺序插到队首。
fn array_unshift(
    vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    let id = receiver_array(&receiver)?;
    let elements = &mut vm.heap.array_mut(id).elements;
    elements.splice(0..0, args.iter().cloned());
    Ok(receiver)
}

fn array_first(
    vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 0)?;
    let id = receiver_array(&receiver)?;
    Ok(vm.heap.array(id).elements.first().cloned().unwrap_or(Value::Nil))
}

fn array_last(
    vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 0)?;
    let id = receiver_array(&receiver)?;
    Ok(vm.heap.array(id).elements.last().cloned().unwrap_or(Value::Nil))
}

/// reverse -> Array，新数组。
fn array_reverse(
    vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 0)?;
    let id = receiver_array(&receiver)?;
    let reversed: Vec<Value> = vm.heap.array(id).elements.iter().rev().cloned().collect();
    let new_id = vm.heap.alloc_array(ArrayObject { elements: reversed });
    Ok(Value::Array(new_id))
}

fn array_include(
    vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 1)?;
    let id = receiver_array(&receiver)?;
    let len = vm.heap.array(id).elements.len();
    for i in 0..len {
        let element = match vm.heap.array(id).elements.get(i) {
            Some(element) => element.clone(),
            None => break,
        };
        if values_equal(vm, &element, &args[0]) {
            return Ok(Value::Boolean(true));
        }
    }
    Ok(Value::Boolean(false))
}

fn array_empty(
    vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 0)?;
    let id = receiver_array(&receiver)?;
    Ok(Value::Boolean(vm.heap.array(id).elements.is_empty()))
}

/// each { |v| ... } -> self。
fn array_each(
    vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 0)?;
    let id = receiver_array(&receiver)?;
    let block = block.ok_or_else(|| ErrorObject::internal("no block given"))?;
    let mut i = 0;
    loop {
        let element = match vm.heap.array(id).elements.get(i) {
            Some(element) => element.clone(),
            None => break,
        };
        call_block(vm, block, vec![element])?;
        i += 1;
    }
    Ok(receiver)
}

/// map { |v| ... } -> Array，收集每次块调用的返回值。
fn array_map(
    vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 0)?;
    let id = receiver_array(&receiver)?;
    let block = block.ok_or_else(|| ErrorObject::internal("no block given"))?;
    let mut mapped = Vec::new();
    let mut i = 0;
    loop {
        let element = match vm.heap.array(id).elements.get(i) {
            Some(element) => element.clone(),
            None => break,
        };
        mapped.push(call_block(vm, block, vec![element])?);
        i += 1;
    }
    let new_id = vm.heap.alloc_array(ArrayObject { elements: mapped });
    Ok(Value::Array(new_id))
}

/// a + b -> Array，拼接成新数组。
fn array_add(
    vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 1)?;
    let left = receiver_array(&receiver)?;
    let right = match &args[0] {
        Value::Array(id) => *id,
        other => return Err(ErrorObject::type_mismatch("Array", other.type_name())),
    };
    let mut elements = vm.heap.array(left).elements.clone();
    elements.extend(vm.heap.array(right).elements.iter().cloned());
    let new_id = vm.heap.alloc_array(ArrayObject { elements });
    Ok(Value::Array(new_id))
}

fn array_to_s(
    vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 0)?;
    receiver_array(&receiver)?;
    Ok(Value::string(inspect_value(vm, &receiver)))
}

fn array_eq(
    vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 1)?;
    Ok(Value::Boolean(values_equal(vm, &receiver, &args[0])))
}
