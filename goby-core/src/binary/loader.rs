//! 程序级持久化入口
//!
//! serialize_program 把编译产物写成 .gbbc 字节流，load_program
//! 校验文件头并重建序列树。任何畸形输入都以结构化 LoadError
//! 报告，绝不執行到一半才发现。

use std::rc::Rc;

use goby_config::CompilerConfig;

use crate::runtime::bytecode::CompiledSequence;

use super::codec::{
    collect_sequences, decode_sequence, encode_sequence, DecodeContext, DecodeError,
    EncodeContext, EncodeError,
};
use super::data::StringPool;
use super::reader::{BinaryReader, ReadError};
use super::section::{SectionDirectory, SectionEntry, SectionError, SectionKind};
use super::writer::BinaryWriter;

/// 文件魔数
pub const MAGIC: &[u8; 4] = b"GBBC";
/// 当前格式版本
pub const FORMAT_VERSION: u16 = 1;
/// 文件头大小：魔数 (4) + 版本 (2) + section 数 (2)
pub const HEADER_SIZE: usize = 8;

// ==================== LoadError ====================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// 魔数不是 GBBC
    BadMagic,
    /// 格式版本不受支持
    UnsupportedVersion(u16),
    Section(SectionError),
    /// 必需的 section 缺失
    MissingSection(SectionKind),
    /// section 的偏移或长度越出文件
    SectionBounds(SectionKind),
    Read(ReadError),
    Decode(DecodeError),
    /// 主序列下标越界
    BadMainIndex(u32),
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::BadMagic => write!(f, "Not a Goby bytecode file (bad magic)"),
            LoadError::UnsupportedVersion(v) => write!(f, "Unsupported format version: {}", v),
            LoadError::Section(e) => write!(f, "Section error: {}", e),
            LoadError::MissingSection(kind) => write!(f, "Missing section: {:?}", kind),
            LoadError::SectionBounds(kind) => {
                write!(f, "Section {:?} exceeds file bounds", kind)
            }
            LoadError::Read(e) => write!(f, "Read error: {}", e),
            LoadError::Decode(e) => write!(f, "Decode error: {}", e),
            LoadError::BadMainIndex(idx) => write!(f, "Main sequence index {} out of range", idx),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Section(e) => Some(e),
            LoadError::Read(e) => Some(e),
            LoadError::Decode(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SectionError> for LoadError {
    fn from(e: SectionError) -> Self {
        LoadError::Section(e)
    }
}

impl From<ReadError> for LoadError {
    fn from(e: ReadError) -> Self {
        LoadError::Read(e)
    }
}

impl From<DecodeError> for LoadError {
    fn from(e: DecodeError) -> Self {
        LoadError::Decode(e)
    }
}

// ==================== 序列化 ====================

/// 把编译好的程序写成 .gbbc 字节流。
/// `emit_debug_info` 决定是否带 DebugInfo section（行号表）。
pub fn serialize_program(
    main: &Rc<CompiledSequence>,
    config: &CompilerConfig,
) -> Result<Vec<u8>, EncodeError> {
    let (ordered, index) = collect_sequences(main);

    let mut pool = StringPool::new();
    let mut sequences = BinaryWriter::new();
    sequences.write_u32(ordered.len() as u32);
    {
        let mut ctx = EncodeContext { pool: &mut pool, sequence_index: &index };
        for sequence in &ordered {
            encode_sequence(sequence, &mut ctx, &mut sequences)?;
        }
    }
    let sequences_bytes = sequences.finish();

    // 后序收集保证主序列排在最后
    let mut main_section = BinaryWriter::new();
    main_section.write_u32(ordered.len() as u32 - 1);
    let main_bytes = main_section.finish();

    let debug_bytes = if config.emit_debug_info {
        let mut debug = BinaryWriter::new();
        debug.write_u32(ordered.len() as u32);
        for sequence in &ordered {
            debug.write_u32(sequence.lines.len() as u32);
            for line in &sequence.lines {
                debug.write_u32(*line);
            }
        }
        Some(debug.finish())
    } else {
        None
    };

    let pool_bytes = pool.serialize();

    let mut payloads: Vec<(SectionKind, Vec<u8>)> = vec![
        (SectionKind::StringPool, pool_bytes),
        (SectionKind::Sequences, sequences_bytes),
        (SectionKind::Main, main_bytes),
    ];
    if let Some(debug_bytes) = debug_bytes {
        payloads.push((SectionKind::DebugInfo, debug_bytes));
    }

    let mut directory = SectionDirectory::new();
    let mut offset = (HEADER_SIZE + payloads.len() * SectionEntry::ENTRY_SIZE) as u32;
    for (kind, payload) in &payloads {
        directory.add(SectionEntry::new(*kind, offset, payload.len() as u32));
        offset += payload.len() as u32;
    }

    let mut file = BinaryWriter::new();
    file.write_bytes(MAGIC);
    file.write_u16(FORMAT_VERSION);
    file.write_u16(payloads.len() as u16);
    file.write_bytes(&directory.to_bytes());
    for (_, payload) in &payloads {
        file.write_bytes(payload);
    }
    Ok(file.finish())
}

// ==================== 加载 ====================

/// 从 .gbbc 字节流重建主序列。
pub fn load_program(bytes: &[u8]) -> Result<Rc<CompiledSequence>, LoadError> {
    let mut header = BinaryReader::new(bytes);
    let magic = header.read_bytes(4)?;
    if magic != MAGIC {
        return Err(LoadError::BadMagic);
    }
    let version = header.read_u16()?;
    if version != FORMAT_VERSION {
        return Err(LoadError::UnsupportedVersion(version));
    }
    let section_count = header.read_u16()? as usize;

    let directory_bytes = header.read_bytes(section_count * SectionEntry::ENTRY_SIZE)?;
    let directory = SectionDirectory::from_bytes(directory_bytes)?;

    let pool_bytes = section_payload(bytes, &directory, SectionKind::StringPool)?;
    let pool = StringPool::deserialize(pool_bytes)?;

    // 行号表可选；缺失时序列的行号表为空，错误定位退化为行 0
    let lines_table = match find_payload(bytes, &directory, SectionKind::DebugInfo)? {
        Some(debug_bytes) => Some(decode_lines(debug_bytes)?),
        None => None,
    };

    let sequences_bytes = section_payload(bytes, &directory, SectionKind::Sequences)?;
    let mut reader = BinaryReader::new(sequences_bytes);
    let count = reader.read_u32()?;
    let mut sequences: Vec<Rc<CompiledSequence>> = Vec::with_capacity(count as usize);
    for i in 0..count {
        let mut sequence = {
            let ctx = DecodeContext { pool: &pool, sequences: &sequences };
            decode_sequence(&mut reader, &ctx)?
        };
        if let Some(table) = &lines_table {
            if let Some(lines) = table.get(i as usize) {
                sequence.lines = lines.clone();
            }
        }
        sequences.push(Rc::new(sequence));
    }

    let main_bytes = section_payload(bytes, &directory, SectionKind::Main)?;
    let main_index = BinaryReader::new(main_bytes).read_u32()?;
    sequences
        .get(main_index as usize)
        .cloned()
        .ok_or(LoadError::BadMainIndex(main_index))
}

fn section_payload<'a>(
    bytes: &'a [u8],
    directory: &SectionDirectory,
    kind: SectionKind,
) -> Result<&'a [u8], LoadError> {
    match find_payload(bytes, directory, kind)? {
        Some(payload) => Ok(payload),
        None => Err(LoadError::MissingSection(kind)),
    }
}

fn find_payload<'a>(
    bytes: &'a [u8],
    directory: &SectionDirectory,
    kind: SectionKind,
) -> Result<Option<&'a [u8]>, LoadError> {
    let entry = match directory.find(kind) {
        Some(entry) => entry,
        None => return Ok(None),
    };
    let start = entry.offset as usize;
    let end = start + entry.length as usize;
    if end > bytes.len() || start > end {
        return Err(LoadError::SectionBounds(kind));
    }
    Ok(Some(&bytes[start..end]))
}

fn decode_lines(bytes: &[u8]) -> Result<Vec<Vec<u32>>, LoadError> {
    let mut reader = BinaryReader::new(bytes);
    let sequence_count = reader.read_u32()?;
    let mut table = Vec::with_capacity(sequence_count as usize);
    for _ in 0..sequence_count {
        let line_count = reader.read_u32()?;
        let mut lines = Vec::with_capacity(line_count as usize);
        for _ in 0..line_count {
            lines.push(reader.read_u32()?);
        }
        table.push(lines);
    }
    Ok(table)
}
