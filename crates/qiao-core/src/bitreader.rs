//! 比特流读取器.
//!
//! 按大端位序 (MSB first) 从字节缓冲区读取任意宽度的字段, 供 ASC / PCE 等
//! 非字节对齐的配置结构解析使用.
//!
//! 读取严格单向: 字段一旦读出便无法回退, 仅 `peek_bits` 可以预览而不消耗.

use crate::{QiaoError, QiaoResult};

/// 比特流读取器
///
/// # 示例
/// ```
/// use qiao_core::bitreader::BitReader;
///
/// let data = [0x12, 0x10];
/// let mut br = BitReader::new(&data);
/// assert_eq!(br.read_bits(5).unwrap(), 2); // AAC-LC
/// assert_eq!(br.read_bits(4).unwrap(), 4); // 44100 Hz
/// assert_eq!(br.read_bits(4).unwrap(), 2); // 立体声
/// ```
pub struct BitReader<'a> {
    /// 源数据
    data: &'a [u8],
    /// 当前字节索引
    byte_pos: usize,
    /// 当前字节中的位位置 (0-7, 0 表示最高位)
    bit_pos: u8,
}

impl<'a> BitReader<'a> {
    /// 创建新的比特流读取器
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            byte_pos: 0,
            bit_pos: 0,
        }
    }

    /// 获取已读取的总位数
    pub fn bits_read(&self) -> usize {
        self.byte_pos * 8 + self.bit_pos as usize
    }

    /// 获取剩余可读位数
    pub fn bits_left(&self) -> usize {
        if self.byte_pos >= self.data.len() {
            return 0;
        }
        (self.data.len() - self.byte_pos) * 8 - self.bit_pos as usize
    }

    /// 是否已到达末尾
    pub fn is_eof(&self) -> bool {
        self.bits_left() == 0
    }

    /// 读取 1 个位
    pub fn read_bit(&mut self) -> QiaoResult<u32> {
        if self.byte_pos >= self.data.len() {
            return Err(QiaoError::Eof);
        }

        let bit = (self.data[self.byte_pos] >> (7 - self.bit_pos)) & 1;
        self.bit_pos += 1;
        if self.bit_pos >= 8 {
            self.bit_pos = 0;
            self.byte_pos += 1;
        }

        Ok(u32::from(bit))
    }

    /// 读取 1 个位并作为布尔值返回
    pub fn read_flag(&mut self) -> QiaoResult<bool> {
        Ok(self.read_bit()? != 0)
    }

    /// 读取 N 个位 (最多 32 位)
    ///
    /// 返回值的低 N 位有效. 剩余位数不足时返回 `Eof`, 且读取位置不变.
    pub fn read_bits(&mut self, n: u32) -> QiaoResult<u32> {
        if n == 0 {
            return Ok(0);
        }
        if n > 32 {
            return Err(QiaoError::InvalidArgument(format!(
                "read_bits: n={} 超过 32 位",
                n,
            )));
        }
        if (n as usize) > self.bits_left() {
            return Err(QiaoError::Eof);
        }

        let mut result: u32 = 0;
        let mut remaining = n;

        while remaining > 0 {
            let available = 8 - self.bit_pos as u32;
            let to_read = remaining.min(available);

            let shift = available - to_read;
            let mask = ((1u32 << to_read) - 1) as u8;
            let bits = (self.data[self.byte_pos] >> shift) & mask;

            result = (result << to_read) | u32::from(bits);

            self.bit_pos += to_read as u8;
            if self.bit_pos >= 8 {
                self.bit_pos = 0;
                self.byte_pos += 1;
            }
            remaining -= to_read;
        }

        Ok(result)
    }

    /// 窥视 N 个位 (不移动位置)
    pub fn peek_bits(&mut self, n: u32) -> QiaoResult<u32> {
        let saved_byte = self.byte_pos;
        let saved_bit = self.bit_pos;
        let result = self.read_bits(n);
        self.byte_pos = saved_byte;
        self.bit_pos = saved_bit;
        result
    }

    /// 跳过 N 个位
    pub fn skip_bits(&mut self, n: usize) -> QiaoResult<()> {
        if n > self.bits_left() {
            return Err(QiaoError::Eof);
        }

        let total_bits = self.bit_pos as usize + n;
        self.byte_pos += total_bits / 8;
        self.bit_pos = (total_bits % 8) as u8;

        Ok(())
    }

    /// 对齐到下一个字节边界 (相对缓冲区起点)
    ///
    /// 如果当前已在字节边界, 则不做任何事.
    pub fn align_to_byte(&mut self) {
        if self.bit_pos > 0 {
            self.bit_pos = 0;
            self.byte_pos += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_bits_basic() {
        let data = [0b10110001, 0b01010101];
        let mut br = BitReader::new(&data);

        assert_eq!(br.read_bits(1).unwrap(), 1);
        assert_eq!(br.read_bits(1).unwrap(), 0);
        assert_eq!(br.read_bits(2).unwrap(), 0b11);
        assert_eq!(br.read_bits(4).unwrap(), 0b0001);
        assert_eq!(br.read_bits(8).unwrap(), 0b01010101);

        assert!(br.is_eof());
    }

    #[test]
    fn test_read_bits_32_bit_unaligned() {
        let data = [0x0F, 0xF0, 0x0F, 0xF0, 0x0F];
        let mut br = BitReader::new(&data);
        br.read_bits(4).unwrap();
        assert_eq!(br.read_bits(32).unwrap(), 0xFF00FF00);
        assert_eq!(br.bits_left(), 4);
    }

    #[test]
    fn test_read_bits_32_bit_aligned() {
        let data = [0xFF, 0x00, 0xFF, 0x00];
        let mut br = BitReader::new(&data);
        assert_eq!(br.read_bits(32).unwrap(), 0xFF00FF00);
    }

    #[test]
    fn test_peek_bits() {
        let data = [0b10110001];
        let mut br = BitReader::new(&data);

        assert_eq!(br.peek_bits(4).unwrap(), 0b1011);
        assert_eq!(br.peek_bits(4).unwrap(), 0b1011);
        assert_eq!(br.read_bits(4).unwrap(), 0b1011);
        assert_eq!(br.peek_bits(4).unwrap(), 0b0001);
    }

    #[test]
    fn test_skip_and_align() {
        let data = [0b10110001, 0b01010101, 0xAA];
        let mut br = BitReader::new(&data);

        br.skip_bits(4).unwrap();
        assert_eq!(br.read_bits(4).unwrap(), 0b0001);
        br.read_bits(3).unwrap();
        br.align_to_byte();
        assert_eq!(br.bits_read(), 16);
        assert_eq!(br.read_bits(8).unwrap(), 0xAA);
    }

    #[test]
    fn test_eof_error_keeps_position() {
        let data = [0x00];
        let mut br = BitReader::new(&data);

        br.read_bits(6).unwrap();
        assert!(matches!(br.read_bits(3), Err(QiaoError::Eof)));
        assert_eq!(br.bits_left(), 2);
        assert!(matches!(br.skip_bits(3), Err(QiaoError::Eof)));
    }
}
