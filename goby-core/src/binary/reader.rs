//! 二进制读取游标
//!
//! 小端序原语解码。所有越界读取都报告出错位置，绝不 panic。

// ==================== ReadError ====================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadError {
    /// 读越界：offset 处需要 needed 字节，只剩 available
    UnexpectedEof { offset: usize, needed: usize, available: usize },
    /// 字符串不是合法 UTF-8
    InvalidUtf8 { offset: usize },
}

impl std::fmt::Display for ReadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReadError::UnexpectedEof { offset, needed, available } => write!(
                f,
                "Unexpected end of data at offset {}: needed {} bytes, {} available",
                offset, needed, available
            ),
            ReadError::InvalidUtf8 { offset } => {
                write!(f, "Invalid UTF-8 string at offset {}", offset)
            }
        }
    }
}

impl std::error::Error for ReadError {}

// ==================== BinaryReader ====================

/// 顺序读取游标。
pub struct BinaryReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> BinaryReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.data.len()
    }

    fn take(&mut self, count: usize) -> Result<&'a [u8], ReadError> {
        if self.remaining() < count {
            return Err(ReadError::UnexpectedEof {
                offset: self.pos,
                needed: count,
                available: self.remaining(),
            });
        }
        let slice = &self.data[self.pos..self.pos + count];
        self.pos += count;
        Ok(slice)
    }

    pub fn read_u8(&mut self) -> Result<u8, ReadError> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, ReadError> {
        let bytes = self.take(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    pub fn read_u32(&mut self) -> Result<u32, ReadError> {
        let bytes = self.take(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn read_i64(&mut self) -> Result<i64, ReadError> {
        let bytes = self.take(8)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(bytes);
        Ok(i64::from_le_bytes(raw))
    }

    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8], ReadError> {
        self.take(count)
    }

    /// 长度前缀 (u32) + UTF-8 内容。
    pub fn read_str(&mut self) -> Result<String, ReadError> {
        let len = self.read_u32()? as usize;
        let offset = self.pos;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| ReadError::InvalidUtf8 { offset })
    }
}
