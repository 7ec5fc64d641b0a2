//! 比特流写入器.
//!
//! 按大端位序 (MSB first) 向字节缓冲区写入任意宽度字段, 与 `BitReader` 对应.
//! 另提供 `copy_bits` / `copy_bit`, 在读取器与写入器之间逐位搬运原始码流.

use crate::QiaoResult;
use crate::bitreader::BitReader;

/// 比特流写入器
///
/// # 示例
/// ```
/// use qiao_core::bitwriter::BitWriter;
///
/// let mut bw = BitWriter::new();
/// bw.write_bits(0b1011, 4);
/// bw.write_bits(0b0001, 4);
/// bw.write_bits(0b01010101, 8);
/// assert_eq!(bw.finish(), vec![0b10110001, 0b01010101]);
/// ```
pub struct BitWriter {
    /// 输出缓冲区
    data: Vec<u8>,
    /// 当前字节 (正在填充)
    current_byte: u8,
    /// 当前字节中已填充的位数 (0-7)
    bit_count: u8,
}

impl BitWriter {
    /// 创建新的比特流写入器
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// 以指定容量创建比特流写入器
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            current_byte: 0,
            bit_count: 0,
        }
    }

    /// 获取已写入的总位数
    pub fn bits_written(&self) -> usize {
        self.data.len() * 8 + self.bit_count as usize
    }

    /// 写入 1 个位
    pub fn write_bit(&mut self, bit: u32) {
        self.current_byte = (self.current_byte << 1) | (bit & 1) as u8;
        self.bit_count += 1;
        if self.bit_count >= 8 {
            self.data.push(self.current_byte);
            self.current_byte = 0;
            self.bit_count = 0;
        }
    }

    /// 写入 N 个位 (最多 32 位)
    ///
    /// 值的低 N 位被写入, 高位在前.
    pub fn write_bits(&mut self, value: u32, n: u32) {
        debug_assert!(n <= 32, "write_bits: n={} 超过 32 位", n);

        let mut remaining = n;
        while remaining > 0 {
            let available = 8 - self.bit_count as u32;
            let to_write = remaining.min(available);

            let shift = remaining - to_write;
            let mask = (1u32 << to_write) - 1;
            let bits = ((value >> shift) & mask) as u8;

            if to_write == 8 {
                // 整字节写入 (bit_count 必定为 0)
                self.current_byte = bits;
            } else {
                self.current_byte = (self.current_byte << to_write) | bits;
            }
            self.bit_count += to_write as u8;

            if self.bit_count >= 8 {
                self.data.push(self.current_byte);
                self.current_byte = 0;
                self.bit_count = 0;
            }

            remaining -= to_write;
        }
    }

    /// 对齐到字节边界 (用 0 填充)
    pub fn align_to_byte(&mut self) {
        if self.bit_count > 0 {
            let pad = 8 - self.bit_count;
            self.current_byte <<= pad;
            self.data.push(self.current_byte);
            self.current_byte = 0;
            self.bit_count = 0;
        }
    }

    /// 完成写入, 返回字节数据
    ///
    /// 如果当前不在字节边界, 自动用 0 填充.
    pub fn finish(mut self) -> Vec<u8> {
        self.align_to_byte();
        self.data
    }
}

impl Default for BitWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// 从读取器搬运 1 个位到写入器, 并返回该位
pub fn copy_bit(bw: &mut BitWriter, br: &mut BitReader<'_>) -> QiaoResult<u32> {
    let bit = br.read_bit()?;
    bw.write_bit(bit);
    Ok(bit)
}

/// 从读取器搬运 `n` 个位到写入器
///
/// 以 32 位为单位分块搬运, 内容逐位保持不变.
pub fn copy_bits(bw: &mut BitWriter, br: &mut BitReader<'_>, n: usize) -> QiaoResult<()> {
    let mut remaining = n;
    while remaining >= 32 {
        bw.write_bits(br.read_bits(32)?, 32);
        remaining -= 32;
    }
    if remaining > 0 {
        let tail = remaining as u32;
        bw.write_bits(br.read_bits(tail)?, tail);
    }
    Ok(())
}
