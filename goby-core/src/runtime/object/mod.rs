//! 对象模型
//!
//! 值表示、类与方法表、实例、以及承载可变对象的堆。

mod class;
mod error;
mod heap;
mod string;
mod value;

pub use class::{ClassObject, InstanceObject, Method, NativeFn, NativeMethod};
pub use error::ErrorObject;
pub use heap::{
    ArrayId, BlockId, BlockObject, ClassId, Heap, HashId, InstanceId, ScopeId, ScopeObject,
};
pub use string::RString;
pub use value::{ArrayObject, HashObject, Value};
