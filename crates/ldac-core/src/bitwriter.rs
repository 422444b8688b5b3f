//! 比特流写入器.
//!
//! 按大端位序 (MSB first) 向字节缓冲区写入定长字段, 与 [`BitReader`](crate::bitreader::BitReader) 对应.
//! 打包器用它写帧头、块数据、块对齐填充与帧尾填充码.

/// 比特流写入器
///
/// # 示例
/// ```
/// use ldac_core::bitwriter::BitWriter;
///
/// let mut bw = BitWriter::new();
/// bw.write_bits(0b1011, 4);
/// bw.write_bits(0b0001, 4);
/// bw.write_signed(-1, 3);
/// let data = bw.finish();
/// assert_eq!(data, vec![0b1011_0001, 0b1110_0000]);
/// ```
#[derive(Debug, Default)]
pub struct BitWriter {
    /// 已完成的字节
    data: Vec<u8>,
    /// 正在填充的字节
    current_byte: u8,
    /// 当前字节中已填充的位数 (0-7)
    bit_count: u8,
}

impl BitWriter {
    /// 创建新的比特流写入器
    pub fn new() -> Self {
        Self::default()
    }

    /// 以指定字节容量创建写入器
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            current_byte: 0,
            bit_count: 0,
        }
    }

    /// 已写入的总位数
    pub fn bits_written(&self) -> usize {
        self.data.len() * 8 + self.bit_count as usize
    }

    /// 写入 N 个位 (最多 32 位), 值的低 N 位有效
    pub fn write_bits(&mut self, value: u32, n: u32) {
        debug_assert!(n <= 32, "write_bits: n={} 超过 32 位", n);

        let mut remaining = n.min(32);
        while remaining > 0 {
            let available = 8 - u32::from(self.bit_count);
            let to_write = remaining.min(available);
            let shift = remaining - to_write;
            let bits = ((u64::from(value) >> shift) & ((1u64 << to_write) - 1)) as u8;

            self.current_byte = if to_write >= 8 {
                bits
            } else {
                (self.current_byte << to_write) | bits
            };
            self.bit_count += to_write as u8;

            if self.bit_count >= 8 {
                self.data.push(self.current_byte);
                self.current_byte = 0;
                self.bit_count = 0;
            }
            remaining -= to_write;
        }
    }

    /// 写入 N 位二进制补码有符号数
    pub fn write_signed(&mut self, value: i32, n: u32) {
        let mask = ((1u64 << n.min(32)) - 1) as u32;
        self.write_bits((value as u32) & mask, n);
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

    /// 对齐后用 `fill` 字节填充到 `nbytes` 字节
    pub fn fill_to(&mut self, nbytes: usize, fill: u8) {
        self.align_to_byte();
        while self.data.len() < nbytes {
            self.data.push(fill);
        }
    }

    /// 完成写入, 返回字节数据 (不在字节边界时自动补 0)
    pub fn finish(mut self) -> Vec<u8> {
        self.align_to_byte();
        self.data
    }
}
