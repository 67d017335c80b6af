//! 对象堆
//!
//! 可变对象（数组、哈希、实例、类、块、作用域）集中存放在
//! 每个虚拟机私有的竞技场里，值层只持有句柄。程序结束时整体
//! 释放，运行期间不做回收。

use std::rc::Rc;

use crate::runtime::bytecode::CompiledSequence;

use super::class::{ClassObject, InstanceObject};
use super::value::{ArrayObject, HashObject, Value};

// ==================== 句柄 ====================

macro_rules! define_handle {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(pub u32);
    };
}

define_handle!(
    /// 类句柄。
    ClassId
);
define_handle!(
    /// 实例句柄。
    InstanceId
);
define_handle!(
    /// 数组句柄。
    ArrayId
);
define_handle!(
    /// 哈希句柄。
    HashId
);
define_handle!(
    /// 块句柄。
    BlockId
);
define_handle!(
    /// 作用域句柄。
    ScopeId
);

// ==================== 作用域与块 ====================

/// 一帧的局部变量。块通过 parent 链按引用看到定义处的局部。
#[derive(Debug, Clone)]
pub struct ScopeObject {
    pub locals: Vec<Value>,
    pub parent: Option<ScopeId>,
}

/// 闭包：块体加上定义时刻的环境。
#[derive(Debug, Clone)]
pub struct BlockObject {
    pub sequence: Rc<CompiledSequence>,
    pub scope: ScopeId,
    pub self_value: Value,
    /// 定义处方法自己携带的块，让块体内的 yield 继续生效。
    pub block: Option<BlockId>,
}

// ==================== 堆 ====================

#[derive(Debug, Default)]
pub struct Heap {
    classes: Vec<ClassObject>,
    instances: Vec<InstanceObject>,
    arrays: Vec<ArrayObject>,
    hashes: Vec<HashObject>,
    blocks: Vec<BlockObject>,
    scopes: Vec<ScopeObject>,
}

impl Heap {
    pub fn new() -> Self {
        Heap::default()
    }

    pub fn alloc_class(&mut self, class: ClassObject) -> ClassId {
        self.classes.push(class);
        ClassId(self.classes.len() as u32 - 1)
    }

    pub fn class(&self, id: ClassId) -> &ClassObject {
        &self.classes[id.0 as usize]
    }

    pub fn class_mut(&mut self, id: ClassId) -> &mut ClassObject {
        &mut self.classes[id.0 as usize]
    }

    pub fn alloc_instance(&mut self, instance: InstanceObject) -> InstanceId {
        self.instances.push(instance);
        InstanceId(self.instances.len() as u32 - 1)
    }

    pub fn instance(&self, id: InstanceId) -> &InstanceObject {
        &self.instances[id.0 as usize]
    }

    pub fn instance_mut(&mut self, id: InstanceId) -> &mut InstanceObject {
        &mut self.instances[id.0 as usize]
    }

    pub fn alloc_array(&mut self, array: ArrayObject) -> ArrayId {
        self.arrays.push(array);
        ArrayId(self.arrays.len() as u32 - 1)
    }

    pub fn array(&self, id: ArrayId) -> &ArrayObject {
        &self.arrays[id.0 as usize]
    }

    pub fn array_mut(&mut self, id: ArrayId) -> &mut ArrayObject {
        &mut self.arrays[id.0 as usize]
    }

    pub fn alloc_hash(&mut self, hash: HashObject) -> HashId {
        self.hashes.push(hash);
        HashId(self.hashes.len() as u32 - 1)
    }

    pub fn hash(&self, id: HashId) -> &HashObject {
        &self.hashes[id.0 as usize]
    }

    pub fn hash_mut(&mut self, id: HashId) -> &mut HashObject {
        &mut self.hashes[id.0 as usize]
    }

    pub fn alloc_block(&mut self, block: BlockObject) -> BlockId {
        self.blocks.push(block);
        BlockId(self.blocks.len() as u32 - 1)
    }

    pub fn block(&self, id: BlockId) -> &BlockObject {
        &self.blocks[id.0 as usize]
    }

    pub fn alloc_scope(&mut self, scope: ScopeObject) -> ScopeId {
        self.scopes.push(scope);
        ScopeId(self.scopes.len() as u32 - 1)
    }

    pub fn scope(&self, id: ScopeId) -> &ScopeObject {
        &self.scopes[id.0 as usize]
    }

    pub fn scope_mut(&mut self, id: ScopeId) -> &mut ScopeObject {
        &mut self.scopes[id.0 as usize]
    }

    /// 沿 parent 链向外走 depth 层。
    pub fn scope_at_depth(&self, start: ScopeId, depth: usize) -> ScopeId {
        let mut current = start;
        for _ in 0..depth {
            match self.scope(current).parent {
                Some(parent) => current = parent,
                None => break,
            }
        }
        current
    }
}

// ==================== 测试 ====================
