//! 值表示
//!
//! 不可变的标量直接内联在 Value 里，可变对象只持有堆句柄。
//! Value 的 PartialEq 是浅比较（句柄同一性）；语言层的 `==`
//! 在虚拟机里做结构比较。

use std::collections::HashMap;
use std::rc::Rc;

use super::error::ErrorObject;
use super::heap::{ArrayId, BlockId, ClassId, HashId, InstanceId};
use super::string::RString;

// ==================== Value ====================

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Nil,
    Boolean(bool),
    Integer(i64),
    Str(Rc<RString>),
    /// 整数闭区间。
    Range { start: i64, end: i64 },
    Array(ArrayId),
    Hash(HashId),
    Class(ClassId),
    Instance(InstanceId),
    Block(BlockId),
    Error(Rc<ErrorObject>),
}

impl Value {
    pub fn string(source: impl Into<String>) -> Value {
        Value::Str(Rc::new(RString::from(source.into())))
    }

    pub fn from_rstring(s: RString) -> Value {
        Value::Str(Rc::new(s))
    }

    /// nil 与 false 为假，其余一切为真。
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Boolean(false))
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// 错误消息里使用的类型名。实例的真实类名由虚拟机补充。
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "NilClass",
            Value::Boolean(_) => "Boolean",
            Value::Integer(_) => "Integer",
            Value::Str(_) => "String",
            Value::Range { .. } => "Range",
            Value::Array(_) => "Array",
            Value::Hash(_) => "Hash",
            Value::Class(_) => "Class",
            Value::Instance(_) => "Object",
            Value::Block(_) => "Block",
            Value::Error(_) => "Error",
        }
    }
}

// ==================== 集合负载 ====================

#[derive(Debug, Clone, Default)]
pub struct ArrayObject {
    pub elements: Vec<Value>,
}

/// 键固定为字符串的哈希。遍历顺序由调用方按键排序保证。
#[derive(Debug, Clone, Default)]
pub struct HashObject {
    pub pairs: HashMap<String, Value>,
}

impl HashObject {
    /// 键的有序视图，keys/values/to_s 共用。
    pub fn sorted_keys(&self) -> Vec<&String> {
        let mut keys: Vec<&String> = self.pairs.keys().collect();
        keys.sort();
        keys
    }
}

// ==================== 测试 ====================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthiness() {
        assert!(!Value::Nil.is_truthy());
        assert!(!Value::Boolean(false).is_truthy());
        assert!(Value::Boolean(true).is_truthy());
        assert!(Value::Integer(0).is_truthy());
        assert!(Value::string("").is_truthy());
    }

    #[test]
    fn test_shallow_equality() {
        assert_eq!(Value::Integer(3), Value::Integer(3));
        assert_eq!(Value::string("a"), Value::string("a"));
        assert_ne!(Value::Array(ArrayId(0)), Value::Array(ArrayId(1)));
        assert_eq!(Value::Range { start: 1, end: 5 }, Value::Range { start: 1, end: 5 });
    }

    #[test]
    fn test_sorted_keys() {
        let mut hash = HashObject::default();
        hash.pairs.insert("b".to_string(), Value::Integer(2));
        hash.pairs.insert("a".to_string(), Value::Integer(1));
        hash.pairs.insert("c".to_string(), Value::Integer(3));
        let keys: Vec<&str> = hash.sorted_keys().into_iter().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }
}
