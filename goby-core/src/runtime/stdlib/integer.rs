//! Integer 类的内建方法。算术按 64 位回绕，除零是可捕获的错误。

use crate::runtime::object::{BlockId, ErrorObject, Heap, Value};
use crate::runtime::vm::{call_block, values_equal, Vm};

use super::{define_native, expect_argc, int_arg, CoreClasses};

pub(super) fn install(heap: &mut Heap, core: &CoreClasses) {
    define_native(heap, core.integer, "+", integer_add);
    define_native(heap, core.integer, "-", integer_sub);
    define_native(heap, core.integer, "*", integer_mul);
    define_native(heap, core.integer, "/", integer_div);
    define_native(heap, core.integer, "%", integer_rem);
    define_native(heap, core.integer, "-@", integer_neg);
    define_native(heap, core.integer, "==", integer_eq);
    define_native(heap, core.integer, "!=", integer_neq);
    define_native(heap, core.integer, "<", integer_lt);
    define_native(heap, core.integer, "<=", integer_le);
    define_native(heap, core.integer, ">", integer_gt);
    define_native(heap, core.integer, ">=", integer_ge);
    define_native(heap, core.integer, "<=>", integer_cmp);
    define_native(heap, core.integer, "to_s", integer_to_s);
    define_native(heap, core.integer, "to_i", integer_to_i);
    define_native(heap, core.integer, "times", integer_times);
    define_native(heap, core.integer, "even", integer_even);
    define_native(heap, core.integer, "odd", integer_odd);
    define_native(heap, core.integer, "next", integer_next);
    define_native(heap, core.integer, "pred", integer_pred);
    define_native(heap, core.integer, "abs", integer_abs);
}

fn receiver_int(receiver: &Value) -> Result<i64, ErrorObject> {
    int_arg(receiver)
}

fn binary_operands(receiver: &Value, args: &[Value]) -> Result<(i64, i64), ErrorObject> {
    expect_argc(args, 1)?;
    Ok((receiver_int(receiver)?, int_arg(&args[0])?))
}

fn integer_add(
    _vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    let (a, b) = binary_operands(&receiver, args)?;
    Ok(Value::Integer(a.wrapping_add(b)))
}

fn integer_sub(
    _vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    let (a, b) = binary_operands(&receiver, args)?;
    Ok(Value::Integer(a.wrapping_sub(b)))
}

fn integer_mul(
    _vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    let (a, b) = binary_operands(&receiver, args)?;
    Ok(Value::Integer(a.wrapping_mul(b)))
}

/// 向零截断的整除。
fn integer_div(
    _vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    let (a, b) = binary_operands(&receiver, args)?;
    if b == 0 {
        return Err(ErrorObject::zero_division());
    }
    Ok(Value::Integer(a.wrapping_div(b)))
}

fn integer_rem(
    _vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    let (a, b) = binary_operands(&receiver, args)?;
    if b == 0 {
        return Err(ErrorObject::zero_division());
    }
    Ok(Value::Integer(a.wrapping_rem(b)))
}

fn integer_neg(
    _vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 0)?;
    Ok(Value::Integer(receiver_int(&receiver)?.wrapping_neg()))
}

/// 与任意类型可比，不同类型即不等。
fn integer_eq(
    vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 1)?;
    Ok(Value::Boolean(values_equal(vm, &receiver, &args[0])))
}

fn integer_neq(
    vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 1)?;
    Ok(Value::Boolean(!values_equal(vm, &receiver, &args[0])))
}

fn integer_lt(
    _vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    let (a, b) = binary_operands(&receiver, args)?;
    Ok(Value::Boolean(a < b))
}

fn integer_le(
    _vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    let (a, b) = binary_operands(&receiver, args)?;
    Ok(Value::Boolean(a <= b))
}

fn integer_gt(
    _vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    let (a, b) = binary_operands(&receiver, args)?;
    Ok(Value::Boolean(a > b))
}

fn integer_ge(
    _vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    let (a, b) = binary_operands(&receiver, args)?;
    Ok(Value::Boolean(a >= b))
}

/// <=> -> -1 | 0 | 1。
fn integer_cmp(
    _vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    let (a, b) = binary_operands(&receiver, args)?;
    Ok(Value::Integer(match a.cmp(&b) {
        std::cmp::Ordering::Less => -1,
        std::cmp::Ordering::Equal => 0,
        std::cmp::Ordering::Greater => 1,
    }))
}

fn integer_to_s(
    _vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 0)?;
    Ok(Value::string(receiver_int(&receiver)?.to_string()))
}

fn integer_to_i(
    _vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 0)?;
    receiver_int(&receiver)?;
    Ok(receiver)
}

/// times { |i| ... } -> self，依次产出 0..n-1；非正数不迭代。
fn integer_times(
    vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 0)?;
    let n = receiver_int(&receiver)?;
    let block = block.ok_or_else(|| ErrorObject::internal("no block given"))?;
    let mut i = 0;
    while i < n {
        call_block(vm, block, vec![Value::Integer(i)])?;
        i += 1;
    }
    Ok(receiver)
}

fn integer_even(
    _vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 0)?;
    Ok(Value::Boolean(receiver_int(&receiver)? % 2 == 0))
}

fn integer_odd(
    _vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 0)?;
    Ok(Value::Boolean(receiver_int(&receiver)? % 2 != 0))
}

fn integer_next(
    _vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 0)?;
    Ok(Value::Integer(receiver_int(&receiver)?.wrapping_add(1)))
}

fn integer_pred(
    _vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 0)?;
    Ok(Value::Integer(receiver_int(&receiver)?.wrapping_sub(1)))
}

fn integer_abs(
    _vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 0)?;
    Ok(Value::Integer(receiver_int(&receiver)?.wrapping_abs()))
}
