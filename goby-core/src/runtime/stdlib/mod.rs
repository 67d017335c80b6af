//! 内建方法库
//!
//! 原始类型的方法用 Rust 原生实现，通过 NativeFn 包装挂到对应的
//! 类上。设计原则：
//! - 启动时 bootstrap 建出核心类层级，类名登记为顶层常量
//! - 核心类是普通的类对象，脚本可以重开它们追加方法
//! - 除了显式的变更方法（Array/Hash 的写入），内建方法一律返回新值

mod array;
mod boolean;
mod class;
mod error;
mod hash;
mod integer;
mod object;
mod range;
mod string;

use std::collections::HashMap;

use crate::runtime::object::{
    ClassId, ClassObject, ErrorObject, Heap, Method, NativeFn, NativeMethod, Value,
};

// ==================== 核心类 ====================

/// 核心类的句柄集合，虚拟机启动后一直持有。
#[derive(Debug, Clone, Copy)]
pub struct CoreClasses {
    pub object: ClassId,
    pub class: ClassId,
    pub integer: ClassId,
    pub string: ClassId,
    pub array: ClassId,
    pub hash: ClassId,
    pub range: ClassId,
    pub boolean: ClassId,
    pub nil: ClassId,
    pub error: ClassId,
    pub block: ClassId,
}

/// 建出核心类层级并注册内建方法。除 Object 外都以 Object 为父类，
/// 类名同时写进顶层常量表。
pub fn bootstrap(heap: &mut Heap, constants: &mut HashMap<String, Value>) -> CoreClasses {
    let object = heap.alloc_class(ClassObject::new("Object", None));
    let class = heap.alloc_class(ClassObject::new("Class", Some(object)));
    let integer = heap.alloc_class(ClassObject::new("Integer", Some(object)));
    let string = heap.alloc_class(ClassObject::new("String", Some(object)));
    let array = heap.alloc_class(ClassObject::new("Array", Some(object)));
    let hash = heap.alloc_class(ClassObject::new("Hash", Some(object)));
    let range = heap.alloc_class(ClassObject::new("Range", Some(object)));
    let boolean = heap.alloc_class(ClassObject::new("Boolean", Some(object)));
    let nil = heap.alloc_class(ClassObject::new("NilClass", Some(object)));
    let error = heap.alloc_class(ClassObject::new("Error", Some(object)));
    let block = heap.alloc_class(ClassObject::new("Block", Some(object)));

    let core = CoreClasses {
        object,
        class,
        integer,
        string,
        array,
        hash,
        range,
        boolean,
        nil,
        error,
        block,
    };

    object::install(heap, &core);
    class::install(heap, &core);
    integer::install(heap, &core);
    string::install(heap, &core);
    array::install(heap, &core);
    hash::install(heap, &core);
    range::install(heap, &core);
    boolean::install(heap, &core);
    error::install(heap, &core);

    for id in [object, class, integer, string, array, hash, range, boolean, nil, error, block] {
        let name = heap.class(id).name.clone();
        constants.insert(name, Value::Class(id));
    }

    core
}

// ==================== 注册与校验辅助 ====================

/// 辅助函数：往类上挂一个内建实例方法。
pub(crate) fn define_native(heap: &mut Heap, class: ClassId, name: &'static str, func: NativeFn) {
    heap.class_mut(class)
        .methods
        .insert(name.to_string(), Method::Native(NativeMethod { name, func }));
}

/// 辅助函数：要求实参个数恰好为 expected。
pub(crate) fn expect_argc(args: &[Value], expected: usize) -> Result<(), ErrorObject> {
    if args.len() != expected {
        return Err(ErrorObject::wrong_arguments(args.len(), &expected.to_string()));
    }
    Ok(())
}

/// 辅助函数：要求实参个数落在 [min, max] 内。
pub(crate) fn expect_argc_range(
    args: &[Value],
    min: usize,
    max: usize,
) -> Result<(), ErrorObject> {
    if args.len() < min || args.len() > max {
        return Err(ErrorObject::wrong_arguments(args.len(), &format!("{}..{}", min, max)));
    }
    Ok(())
}

/// 辅助函数：取整数实参。
pub(crate) fn int_arg(value: &Value) -> Result<i64, ErrorObject> {
    match value {
        Value::Integer(n) => Ok(*n),
        other => Err(ErrorObject::type_mismatch("Integer", other.type_name())),
    }
}

/// 辅助函数：取字符串实参。
pub(crate) fn str_arg(value: &Value) -> Result<std::rc::Rc<crate::runtime::object::RString>, ErrorObject> {
    match value {
        Value::Str(s) => Ok(s.clone()),
        other => Err(ErrorObject::type_mismatch("String", other.type_name())),
    }
}
