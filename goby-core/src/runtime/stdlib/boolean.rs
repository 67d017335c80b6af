//! Boolean 与 NilClass 的内建方法。

use crate::runtime::object::{BlockId, ErrorObject, Heap, Value};
use crate::runtime::vm::{values_equal, Vm};

use super::{define_native, expect_argc, CoreClasses};

pub(super) fn install(heap: &mut Heap, core: &CoreClasses) {
    define_native(heap, core.boolean, "==", boolean_eq);
    define_native(heap, core.boolean, "!=", boolean_neq);
    define_native(heap, core.boolean, "!", boolean_not);
    define_native(heap, core.boolean, "to_s", boolean_to_s);

    define_native(heap, core.nil, "!", nil_not);
    define_native(heap, core.nil, "to_s", nil_to_s);
}

fn receiver_bool(receiver: &Value) -> Result<bool, ErrorObject> {
    match receiver {
        Value::Boolean(b) => Ok(*b),
        other => Err(ErrorObject::type_mismatch("Boolean", other.type_name())),
    }
}

fn boolean_eq(
    vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 1)?;
    Ok(Value::Boolean(values_equal(vm, &receiver, &args[0])))
}

fn boolean_neq(
    vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 1)?;
    Ok(Value::Boolean(!values_equal(vm, &receiver, &args[0])))
}

fn boolean_not(
    _vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 0)?;
    Ok(Value::Boolean(!receiver_bool(&receiver)?))
}

fn boolean_to_s(
    _vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 0)?;
    Ok(Value::string(receiver_bool(&receiver)?.to_string()))
}

/// !nil -> true。
fn nil_not(
    _vm: &mut Vm,
    _receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 0)?;
    Ok(Value::Boolean(true))
}

/// nil.to_s -> ""。
fn nil_to_s(
    _vm: &mut Vm,
    _receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 0)?;
    Ok(Value::string(""))
}
