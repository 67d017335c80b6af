//! 类、方法与实例

use std::collections::HashMap;
use std::rc::Rc;

use crate::runtime::bytecode::CompiledSequence;
use crate::runtime::vm::Vm;

use super::error::ErrorObject;
use super::heap::{BlockId, ClassId};
use super::value::Value;

// ==================== 方法 ====================

/// 内建方法签名：接收虚拟机（内建可以回调用户码）、接收者、
/// 实参切片与随调用传入的块。
pub type NativeFn = fn(&mut Vm, Value, &[Value], Option<BlockId>) -> Result<Value, ErrorObject>;

#[derive(Clone, Copy)]
pub struct NativeMethod {
    pub name: &'static str,
    pub func: NativeFn,
}

impl std::fmt::Debug for NativeMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NativeMethod({})", self.name)
    }
}

#[derive(Debug, Clone)]
pub enum Method {
    Bytecode(Rc<CompiledSequence>),
    Native(NativeMethod),
}

// ==================== 类 ====================

/// 类对象。模块也用它表示，`is_module` 置位后不能实例化、
/// 不能被继承，只能被 include。
#[derive(Debug, Clone)]
pub struct ClassObject {
    pub name: String,
    pub superclass: Option<ClassId>,
    pub methods: HashMap<String, Method>,
    pub class_methods: HashMap<String, Method>,
    pub is_module: bool,
}

impl ClassObject {
    pub fn new(name: impl Into<String>, superclass: Option<ClassId>) -> Self {
        ClassObject {
            name: name.into(),
            superclass,
            methods: HashMap::new(),
            class_methods: HashMap::new(),
            is_module: false,
        }
    }

    pub fn new_module(name: impl Into<String>) -> Self {
        ClassObject {
            name: name.into(),
            superclass: None,
            methods: HashMap::new(),
            class_methods: HashMap::new(),
            is_module: true,
        }
    }
}

// ==================== 实例 ====================

#[derive(Debug, Clone)]
pub struct InstanceObject {
    pub class: ClassId,
    pub ivars: HashMap<String, Value>,
}

impl InstanceObject {
    pub fn new(class: ClassId) -> Self {
        InstanceObject { class, ivars: HashMap::new() }
    }
}

// ==================== 测试 ====================
