//! Goby 二进制格式支持
//!
//! 提供 .gbbc 文件的读写支持。
//!
//! # 文件格式
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      File Header (8 bytes)                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │                     Section Directory                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  String Pool Section  │  全局字符串池（去重）                  │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Sequences Section    │  后序排列的序列表                     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Main Section         │  主序列下标                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Debug Info Section   │  行号表（可选剥离）                    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # 示例
//!
//! ```rust,ignore
//! use goby_core::binary::{serialize_program, load_program};
//!
//! // 写入
//! let bytes = serialize_program(&main_sequence, &config)?;
//! std::fs::write("app.gbbc", &bytes)?;
//!
//! // 读取
//! let main_sequence = load_program(&std::fs::read("app.gbbc")?)?;
//! ```

mod codec;
mod data;
mod loader;
mod reader;
mod section;
mod writer;

// 公开导出
pub use codec::{
    collect_sequences, decode_sequence, encode_sequence, DecodeContext, DecodeError,
    EncodeContext, EncodeError,
};
pub use data::StringPool;
pub use loader::{load_program, serialize_program, LoadError, FORMAT_VERSION, HEADER_SIZE, MAGIC};
pub use reader::{BinaryReader, ReadError};
pub use section::{SectionDirectory, SectionEntry, SectionError, SectionKind};
pub use writer::BinaryWriter;

/// 文件扩展名常量
pub mod ext {
    /// 源码文件
    pub const SOURCE: &str = "gb";
    /// 源码文件（Ruby 兼容拼写）
    pub const SOURCE_ALT: &str = "rb";
    /// 编译产物
    pub const BYTECODE: &str = "gbbc";
}

/// 输入文件种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Source,
    Bytecode,
}

/// 从文件扩展名识别输入种类
pub fn detect_file_kind(path: impl AsRef<std::path::Path>) -> Option<FileKind> {
    let path = path.as_ref();
    let ext = path.extension()?.to_str()?;

    match ext {
        "gb" | "rb" => Some(FileKind::Source),
        "gbbc" => Some(FileKind::Bytecode),
        _ => None,
    }
}
