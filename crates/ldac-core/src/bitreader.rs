//! 比特流读取器.
//!
//! 按大端位序 (MSB first) 从字节缓冲区读取定长字段.
//!
//! 与常见的读取器不同, 越过缓冲区末尾的读取返回 0 比特而不是错误:
//! 解包器在每个块结束后统一用位游标与帧长比较来判定越界,
//! 因此游标需要能够越过数据末尾继续前进, 也允许回退 (霍夫曼查表后修正码长).

use crate::fixed::sign_extend;

/// 比特流读取器
///
/// # 示例
/// ```
/// use ldac_core::bitreader::BitReader;
///
/// let data = [0b1011_0001, 0b0101_0101];
/// let mut br = BitReader::new(&data);
/// assert_eq!(br.read_bits(4), 0b1011);
/// assert_eq!(br.read_bits(4), 0b0001);
/// assert_eq!(br.read_bits(8), 0b0101_0101);
/// assert_eq!(br.read_bits(8), 0, "越过末尾读到 0");
/// assert_eq!(br.position(), 24);
/// ```
pub struct BitReader<'a> {
    /// 源数据
    data: &'a [u8],
    /// 当前位位置
    pos: usize,
}

impl<'a> BitReader<'a> {
    /// 创建新的比特流读取器
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// 当前位位置
    pub fn position(&self) -> usize {
        self.pos
    }

    /// 设置位位置
    pub fn set_position(&mut self, pos: usize) {
        self.pos = pos;
    }

    /// 源数据总位数
    pub fn total_bits(&self) -> usize {
        self.data.len() * 8
    }

    /// 读取 1 个位
    fn bit_at(&self, pos: usize) -> u32 {
        match self.data.get(pos >> 3) {
            Some(byte) => u32::from((byte >> (7 - (pos & 7))) & 1),
            None => 0,
        }
    }

    /// 读取 N 个位 (最多 32 位), 越过末尾的位读作 0
    pub fn read_bits(&mut self, n: u32) -> u32 {
        debug_assert!(n <= 32, "read_bits: n={} 超过 32 位", n);
        let value = self.peek_bits(n);
        self.pos += n as usize;
        value
    }

    /// 窥视 N 个位 (不移动位置)
    pub fn peek_bits(&self, n: u32) -> u32 {
        let mut result: u64 = 0;
        let mut pos = self.pos;
        let mut remaining = n.min(32);

        // 按字节批量提取, 末尾外补 0
        while remaining > 0 {
            let bit_idx = (pos & 7) as u32;
            let available = 8 - bit_idx;
            let to_read = remaining.min(available);
            let byte = match self.data.get(pos >> 3) {
                Some(byte) => u32::from(*byte),
                None => 0,
            };
            let bits = (byte >> (available - to_read)) & ((1 << to_read) - 1);
            result = (result << to_read) | u64::from(bits);
            pos += to_read as usize;
            remaining -= to_read;
        }

        result as u32
    }

    /// 读取 N 位二进制补码有符号数
    pub fn read_signed(&mut self, n: u32) -> i32 {
        let raw = self.read_bits(n);
        sign_extend(raw, n)
    }

    /// 读取 1 个位
    pub fn read_bit(&mut self) -> bool {
        let bit = self.bit_at(self.pos);
        self.pos += 1;
        bit != 0
    }

    /// 跳过 N 个位
    pub fn skip_bits(&mut self, n: usize) {
        self.pos += n;
    }

    /// 回退 N 个位
    pub fn rewind(&mut self, n: usize) {
        self.pos = self.pos.saturating_sub(n);
    }

    /// 读取到下一个字节边界的填充位, 返回填充值
    ///
    /// 已在字节边界时返回 0 且不移动位置.
    pub fn read_alignment_padding(&mut self) -> u32 {
        let padding = (8 - (self.pos & 7)) & 7;
        if padding == 0 {
            return 0;
        }
        self.read_bits(padding as u32)
    }
}
