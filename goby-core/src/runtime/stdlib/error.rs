//! Error 类的内建方法。错误值由虚拟机和内建方法构造，
//! rescue 捕获后用这两个方法检视。

use std::rc::Rc;

use crate::runtime::object::{BlockId, ErrorObject, Heap, Value};
use crate::runtime::vm::Vm;

use super::{define_native, expect_argc, CoreClasses};

pub(super) fn install(heap: &mut Heap, core: &CoreClasses) {
    define_native(heap, core.error, "message", error_message);
    define_native(heap, core.error, "error_type", error_type);
}

fn receiver_error(receiver: &Value) -> Result<Rc<ErrorObject>, ErrorObject> {
    match receiver {
        Value::Error(error) => Ok(error.clone()),
        other => Err(ErrorObject::type_mismatch("Error", other.type_name())),
    }
}

fn error_message(
    _vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 0)?;
    Ok(Value::string(receiver_error(&receiver)?.message.clone()))
}

/// error_type -> String，错误类别标签（"TypeError" 等）。
fn error_type(
    _vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 0)?;
    Ok(Value::string(receiver_error(&receiver)?.class_name.clone()))
}
