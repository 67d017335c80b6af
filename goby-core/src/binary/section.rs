//! Section 定义和管理
//!
//! 目录条目记录每个 section 在文件中的偏移与长度。

// ==================== SectionKind ====================

/// Section 类型
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    /// 字符串池
    StringPool = 0x01,
    /// 序列表
    Sequences = 0x02,
    /// 主序列下标
    Main = 0x03,
    /// 行号表（可选）
    DebugInfo = 0x04,
}

impl SectionKind {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x01 => Some(SectionKind::StringPool),
            0x02 => Some(SectionKind::Sequences),
            0x03 => Some(SectionKind::Main),
            0x04 => Some(SectionKind::DebugInfo),
            _ => None,
        }
    }
}

// ==================== SectionEntry ====================

/// 目录条目 (12 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionEntry {
    /// Section 类型 (1 byte)
    pub kind: SectionKind,
    /// 对齐填充 (3 bytes)
    pub padding: [u8; 3],
    /// 在文件中的偏移 (4 bytes)
    pub offset: u32,
    /// 数据长度 (4 bytes)
    pub length: u32,
}

impl SectionEntry {
    /// 条目大小: 12 bytes
    pub const ENTRY_SIZE: usize = 12;

    pub fn new(kind: SectionKind, offset: u32, length: u32) -> Self {
        Self { kind, padding: [0; 3], offset, length }
    }

    pub fn to_bytes(&self) -> [u8; 12] {
        let mut bytes = [0u8; 12];
        bytes[0] = self.kind as u8;
        bytes[1..4].copy_from_slice(&self.padding);
        bytes[4..8].copy_from_slice(&self.offset.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.length.to_le_bytes());
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SectionError> {
        if bytes.len() < Self::ENTRY_SIZE {
            return Err(SectionError::TooShort);
        }
        let kind = SectionKind::from_u8(bytes[0]).ok_or(SectionError::InvalidKind(bytes[0]))?;
        let offset = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        let length = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
        Ok(Self { kind, padding: [bytes[1], bytes[2], bytes[3]], offset, length })
    }
}

// ==================== SectionDirectory ====================

#[derive(Debug, Clone, Default)]
pub struct SectionDirectory {
    pub entries: Vec<SectionEntry>,
}

impl SectionDirectory {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn add(&mut self, entry: SectionEntry) {
        self.entries.push(entry);
    }

    pub fn find(&self, kind: SectionKind) -> Option<&SectionEntry> {
        self.entries.iter().find(|e| e.kind == kind)
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn serialized_size(&self) -> usize {
        self.entries.len() * SectionEntry::ENTRY_SIZE
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.serialized_size());
        for entry in &self.entries {
            bytes.extend_from_slice(&entry.to_bytes());
        }
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SectionError> {
        if bytes.len() % SectionEntry::ENTRY_SIZE != 0 {
            return Err(SectionError::InvalidSize);
        }
        let count = bytes.len() / SectionEntry::ENTRY_SIZE;
        let mut entries = Vec::with_capacity(count);
        for i in 0..count {
            let start = i * SectionEntry::ENTRY_SIZE;
            entries.push(SectionEntry::from_bytes(&bytes[start..start + SectionEntry::ENTRY_SIZE])?);
        }
        Ok(Self { entries })
    }
}

// ==================== SectionError ====================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionError {
    /// 数据太短
    TooShort,
    /// 无效的 section 类型
    InvalidKind(u8),
    /// 无效的数据大小
    InvalidSize,
}

impl std::fmt::Display for SectionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SectionError::TooShort => write!(f, "Section data too short"),
            SectionError::InvalidKind(k) => write!(f, "Invalid section kind: {}", k),
            SectionError::InvalidSize => write!(f, "Invalid section data size"),
        }
    }
}

impl std::error::Error for SectionError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_entry_roundtrip() {
        let entry = SectionEntry::new(SectionKind::StringPool, 128, 1024);
        let bytes = entry.to_bytes();
        assert_eq!(bytes.len(), 12);

        let parsed = SectionEntry::from_bytes(&bytes).unwrap();
        assert_eq!(parsed.kind, SectionKind::StringPool);
        assert_eq!(parsed.offset, 128);
        assert_eq!(parsed.length, 1024);
    }

    #[test]
    fn test_invalid_kind_is_rejected() {
        let mut bytes = SectionEntry::new(SectionKind::Main, 0, 4).to_bytes();
        bytes[0] = 0xEE;
        assert_eq!(SectionEntry::from_bytes(&bytes), Err(SectionError::InvalidKind(0xEE)));
    }

    #[test]
    fn test_section_directory() {
        let mut dir = SectionDirectory::new();
        dir.add(SectionEntry::new(SectionKind::StringPool, 20, 256));
        dir.add(SectionEntry::new(SectionKind::Sequences, 276, 1024));
        dir.add(SectionEntry::new(SectionKind::Main, 1300, 4));

        assert_eq!(dir.count(), 3);
        assert_eq!(dir.find(SectionKind::Sequences).map(|e| e.offset), Some(276));
        assert!(dir.find(SectionKind::DebugInfo).is_none());

        let bytes = dir.to_bytes();
        assert_eq!(bytes.len(), 3 * 12);
        let parsed = SectionDirectory::from_bytes(&bytes).unwrap();
        assert_eq!(parsed.count(), 3);
        assert_eq!(parsed.find(SectionKind::Main).map(|e| e.length), Some(4));
    }

    #[test]
    fn test_directory_rejects_ragged_data() {
        let err = SectionDirectory::from_bytes(&[0u8; 13]).unwrap_err();
        assert_eq!(err, SectionError::InvalidSize);
    }
}
