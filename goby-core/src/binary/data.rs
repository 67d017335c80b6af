//! Section 数据结构定义
//!
//! StringPool 去重存放全部名字与字符串字面量，
//! 其余 section 以下标引用这里。

use std::collections::HashMap;

use super::reader::{BinaryReader, ReadError};
use super::writer::BinaryWriter;

// ==================== String Pool ====================

/// 字符串池
#[derive(Debug, Clone, Default)]
pub struct StringPool {
    strings: Vec<String>,
    /// 内容到下标的反查表，add 去重用
    index: HashMap<String, u32>,
}

impl StringPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加字符串，返回索引；重复内容返回已有索引。
    pub fn add(&mut self, s: &str) -> u32 {
        if let Some(&idx) = self.index.get(s) {
            return idx;
        }
        let idx = self.strings.len() as u32;
        self.strings.push(s.to_string());
        self.index.insert(s.to_string(), idx);
        idx
    }

    pub fn get(&self, idx: u32) -> Option<&str> {
        self.strings.get(idx as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// 格式：count (u32) + count 个长度前缀字符串。
    pub fn serialize(&self) -> Vec<u8> {
        let mut writer = BinaryWriter::new();
        writer.write_u32(self.strings.len() as u32);
        for s in &self.strings {
            writer.write_str(s);
        }
        writer.finish()
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Self, ReadError> {
        let mut reader = BinaryReader::new(bytes);
        let count = reader.read_u32()?;
        let mut pool = StringPool::new();
        for _ in 0..count {
            let s = reader.read_str()?;
            let idx = pool.strings.len() as u32;
            pool.index.insert(s.clone(), idx);
            pool.strings.push(s);
        }
        Ok(pool)
    }
}
