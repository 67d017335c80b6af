//! Hash 类的内建方法。键只能是字符串，keys/values/to_s 按键排序
//! 输出，迭代顺序因此是确定的。

use crate::runtime::object::{ArrayObject, BlockId, ErrorObject, HashId, Heap, Value};
use crate::runtime::vm::{inspect_value, values_equal, Vm};

use super::{define_native, expect_argc, str_arg, CoreClasses};

pub(super) fn install(heap: &mut Heap, core: &CoreClasses) {
    define_native(heap, core.hash, "[]", hash_index);
    define_native(heap, core.hash, "[]=", hash_index_set);
    define_native(heap, core.hash, "length", hash_length);
    define_native(heap, core.hash, "count", hash_length);
    define_native(heap, core.hash, "size", hash_length);
    define_native(heap, core.hash, "keys", hash_keys);
    define_native(heap, core.hash, "values", hash_values);
    define_native(heap, core.hash, "has_key", hash_has_key);
    define_native(heap, core.hash, "delete", hash_delete);
    define_native(heap, core.hash, "empty", hash_empty);
    define_native(heap, core.hash, "to_s", hash_to_s);
    define_native(heap, core.hash, "==", hash_eq);
}

fn receiver_hash(receiver: &Value) -> Result<HashId, ErrorObject> {
    match receiver {
        Value::Hash(id) => Ok(*id),
        other => Err(ErrorObject::type_mismatch("Hash", other.type_name())),
    }
}

/// h[key] -> Value | nil。
fn hash_index(
    vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 1)?;
    let id = receiver_hash(&receiver)?;
    let key = str_arg(&args[0])?;
    Ok(vm.heap.hash(id).pairs.get(&key.to_string()).cloned().unwrap_or(Value::Nil))
}

/// h[key] = v -> v。
fn hash_index_set(
    vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 2)?;
    let id = receiver_hash(&receiver)?;
    let key = str_arg(&args[0])?;
    let value = args[1].clone();
    vm.heap.hash_mut(id).pairs.insert(key.to_string(), value.clone());
    Ok(value)
}

fn hash_length(
    vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 0)?;
    let id = receiver_hash(&receiver)?;
    Ok(Value::Integer(vm.heap.hash(id).pairs.len() as i64))
}

/// keys -> Array，键按字典序。
fn hash_keys(
    vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 0)?;
    let id = receiver_hash(&receiver)?;
    let keys: Vec<Value> = vm
        .heap
        .hash(id)
        .sorted_keys()
        .into_iter()
        .map(|key| Value::string(key.clone()))
        .collect();
    let new_id = vm.heap.alloc_array(ArrayObject { elements: keys });
    Ok(Value::Array(new_id))
}

/// values -> Array，按键的字典序取值。
fn hash_values(
    vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 0)?;
    let id = receiver_hash(&receiver)?;
    let hash = vm.heap.hash(id);
    let values: Vec<Value> = hash
        .sorted_keys()
        .into_iter()
        .map(|key| hash.pairs.get(key).cloned().unwrap_or(Value::Nil))
        .collect();
    let new_id = vm.heap.alloc_array(ArrayObject { elements: values });
    Ok(Value::Array(new_id))
}

fn hash_has_key(
    vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 1)?;
    let id = receiver_hash(&receiver)?;
    let key = str_arg(&args[0])?;
    Ok(Value::Boolean(vm.heap.hash(id).pairs.contains_key(&key.to_string())))
}

/// delete(key) -> 被移除的值 | nil。
fn hash_delete(
    vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 1)?;
    let id = receiver_hash(&receiver)?;
    let key = str_arg(&args[0])?;
    Ok(vm.heap.hash_mut(id).pairs.remove(&key.to_string()).unwrap_or(Value::Nil))
}

fn hash_empty(
    vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 0)?;
    let id = receiver_hash(&receiver)?;
    Ok(Value::Boolean(vm.heap.hash(id).pairs.is_empty()))
}

fn hash_to_s(
    vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 0)?;
    receiver_hash(&receiver)?;
    Ok(Value::string(inspect_value(vm, &receiver)))
}

fn hash_eq(
    vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 1)?;
    Ok(Value::Boolean(values_equal(vm, &receiver, &args[0])))
}
