//! Class 类的内建方法。类接收者找不到类方法时会落到这里。

use crate::runtime::object::{BlockId, ClassId, ErrorObject, Heap, InstanceObject, Value};
use crate::runtime::vm::{call_method, resolve_method, Vm};

use super::{define_native, expect_argc, CoreClasses};

pub(super) fn install(heap: &mut Heap, core: &CoreClasses) {
    define_native(heap, core.class, "new", class_new);
    define_native(heap, core.class, "name", class_name);
    define_native(heap, core.class, "superclass", class_superclass);
}

fn class_receiver(receiver: &Value) -> Result<ClassId, ErrorObject> {
    match receiver {
        Value::Class(id) => Ok(*id),
        other => Err(ErrorObject::type_mismatch("Class", other.type_name())),
    }
}

/// new(*args) -> instance，有 initialize 就带着实参和块调用它。
fn class_new(
    vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    let class_id = class_receiver(&receiver)?;
    let class = vm.heap.class(class_id);
    if class.is_module {
        return Err(ErrorObject::type_error(format!(
            "cannot create an instance of module {}",
            class.name
        )));
    }

    let instance = Value::Instance(vm.heap.alloc_instance(InstanceObject::new(class_id)));
    match resolve_method(vm, &instance, "initialize") {
        Some(_) => {
            call_method(vm, instance.clone(), "initialize", args.to_vec(), block)?;
        }
        None => {
            if !args.is_empty() {
                return Err(ErrorObject::wrong_arguments(args.len(), "0"));
            }
        }
    }
    Ok(instance)
}

fn class_name(
    vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 0)?;
    let class_id = class_receiver(&receiver)?;
    Ok(Value::string(vm.heap.class(class_id).name.clone()))
}

/// superclass -> Class | nil，Object 与模块没有父类。
fn class_superclass(
    vm: &mut Vm,
    receiver: Value,
    args: &[Value],
    _block: Option<BlockId>,
) -> Result<Value, ErrorObject> {
    expect_argc(args, 0)?;
    let class_id = class_receiver(&receiver)?;
    match vm.heap.class(class_id).superclass {
        Some(id) => Ok(Value::Class(id)),
        None => Ok(Value::Nil),
    }
}
