//! 二进制写入缓冲
//!
//! 小端序原语编码，与 BinaryReader 成对。

/// 顺序写入缓冲。
#[derive(Debug, Default)]
pub struct BinaryWriter {
    buf: Vec<u8>,
}

impl BinaryWriter {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_i64(&mut self, value: i64) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// 长度前缀 (u32) + UTF-8 内容。
    pub fn write_str(&mut self, value: &str) {
        self.write_u32(value.len() as u32);
        self.buf.extend_from_slice(value.as_bytes());
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_little_endian_layout() {
        let mut writer = BinaryWriter::new();
        writer.write_u16(0x0102);
        writer.write_u32(0x03040506);
        let bytes = writer.finish();
        assert_eq!(bytes, vec![0x02, 0x01, 0x06, 0x05, 0x04, 0x03]);
    }

    #[test]
    fn test_str_is_length_prefixed() {
        let mut writer = BinaryWriter::new();
        writer.write_str("ab");
        let bytes = writer.finish();
        assert_eq!(bytes, vec![2, 0, 0, 0, b'a', b'b']);
    }
}
