//! 比例因子差分的规范 Huffman 码表.
//!
//! 每张表只由码长列表描述, 码字按 (码长, 符号) 升序依次分配.
//! 解码查找表一次窥视 `max_len` 位, 按码字前缀区间填充, 查表后只前进实际码长.
//!
//! - `sf0`: 声道 0 / 单声道差分 (模式 0), 位长 3..=6
//! - `sf1`: 立体声第二声道相对声道 0 的差值 (模式 2), 位长 2..=5

use std::sync::OnceLock;

use ldac_core::bitreader::BitReader;
use ldac_core::bitwriter::BitWriter;

/// 规范 Huffman 码表
#[derive(Debug)]
pub struct HuffmanTable {
    /// 按符号索引的 (码字, 码长)
    codes: Vec<(u32, u32)>,
    /// 按 `max_len` 位前缀索引的 (符号, 码长)
    lookup: Vec<(u32, u32)>,
    max_len: u32,
}

impl HuffmanTable {
    /// 由码长列表构造, 码长必须满足 Kraft 等式
    pub fn from_lengths(lengths: &[u32]) -> Self {
        let max_len = lengths.iter().copied().max().unwrap_or(0);
        let mut order: Vec<usize> = (0..lengths.len()).collect();
        order.sort_by_key(|&sym| (lengths[sym], sym));

        let mut codes = vec![(0u32, 0u32); lengths.len()];
        let mut lookup = vec![(0u32, max_len); 1usize << max_len];
        let mut code = 0u32;
        let mut prev_len = 0u32;
        for sym in order {
            let len = lengths[sym];
            code <<= len - prev_len;
            prev_len = len;
            codes[sym] = (code, len);

            let span = 1usize << (max_len - len);
            let start = (code as usize) << (max_len - len);
            for slot in &mut lookup[start..start + span] {
                *slot = (sym as u32, len);
            }
            code += 1;
        }

        Self {
            codes,
            lookup,
            max_len,
        }
    }

    /// 符号数量
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// 是否为空表
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// 最长码长
    pub fn max_len(&self) -> u32 {
        self.max_len
    }

    /// 符号取值掩码
    pub fn mask(&self) -> i32 {
        self.codes.len() as i32 - 1
    }

    /// 符号的码长
    pub fn code_length(&self, symbol: u32) -> u32 {
        self.codes[symbol as usize].1
    }

    /// 写入一个符号
    pub fn encode(&self, bw: &mut BitWriter, symbol: u32) {
        let (code, len) = self.codes[symbol as usize];
        bw.write_bits(code, len);
    }

    /// 读取一个符号
    pub fn decode(&self, br: &mut BitReader<'_>) -> u32 {
        let prefix = br.peek_bits(self.max_len) as usize;
        let (symbol, len) = self.lookup[prefix];
        br.skip_bits(len as usize);
        symbol
    }
}

const SF0_LEN3: [u32; 8] = [1, 3, 4, 4, 5, 5, 4, 3];
const SF0_LEN4: [u32; 16] = [1, 3, 4, 5, 6, 7, 8, 8, 9, 9, 8, 7, 6, 5, 4, 3];
const SF0_LEN5: [u32; 32] = [
    1, 3, 4, 5, 6, 7, 8, 9, 11, 11, 12, 12, 12, 12, 12, 12, 12, 12, 12, 12, 12, 12, 12, 12, 11, 10,
    8, 7, 6, 5, 4, 3,
];
const SF0_LEN6: [u32; 64] = [
    1, 3, 4, 5, 6, 7, 8, 10, 11, 12, 13, 13, 13, 13, 13, 13, 13, 13, 13, 13, 13, 13, 13, 13, 13,
    13, 13, 13, 13, 13, 13, 13, 13, 13, 13, 13, 13, 13, 13, 13, 13, 13, 13, 13, 13, 13, 13, 13, 12,
    12, 12, 12, 12, 12, 12, 12, 11, 10, 9, 7, 6, 5, 4, 3,
];

const SF1_LEN2: [u32; 4] = [1, 2, 3, 3];
const SF1_LEN3: [u32; 8] = [1, 3, 3, 5, 6, 6, 4, 3];
const SF1_LEN4: [u32; 16] = [1, 3, 4, 5, 6, 7, 7, 9, 10, 10, 8, 7, 6, 5, 4, 3];
const SF1_LEN5: [u32; 32] = [
    1, 3, 4, 5, 6, 7, 8, 10, 11, 12, 12, 11, 11, 11, 11, 11, 11, 11, 11, 11, 11, 11, 11, 11, 11, 10,
    9, 7, 6, 5, 4, 3,
];

fn build(cell: &'static OnceLock<HuffmanTable>, lengths: &[u32]) -> &'static HuffmanTable {
    cell.get_or_init(|| HuffmanTable::from_lengths(lengths))
}

/// 模式 0 差分码表
pub fn sf0(bitlen: u32) -> Option<&'static HuffmanTable> {
    static T3: OnceLock<HuffmanTable> = OnceLock::new();
    static T4: OnceLock<HuffmanTable> = OnceLock::new();
    static T5: OnceLock<HuffmanTable> = OnceLock::new();
    static T6: OnceLock<HuffmanTable> = OnceLock::new();
    match bitlen {
        3 => Some(build(&T3, &SF0_LEN3)),
        4 => Some(build(&T4, &SF0_LEN4)),
        5 => Some(build(&T5, &SF0_LEN5)),
        6 => Some(build(&T6, &SF0_LEN6)),
        _ => None,
    }
}

/// 模式 2 相对差值码表
pub fn sf1(bitlen: u32) -> Option<&'static HuffmanTable> {
    static T2: OnceLock<HuffmanTable> = OnceLock::new();
    static T3: OnceLock<HuffmanTable> = OnceLock::new();
    static T4: OnceLock<HuffmanTable> = OnceLock::new();
    static T5: OnceLock<HuffmanTable> = OnceLock::new();
    match bitlen {
        2 => Some(build(&T2, &SF1_LEN2)),
        3 => Some(build(&T3, &SF1_LEN3)),
        4 => Some(build(&T4, &SF1_LEN4)),
        5 => Some(build(&T5, &SF1_LEN5)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_tables() -> Vec<&'static HuffmanTable> {
        (3..=6)
            .filter_map(sf0)
            .chain((2..=5).filter_map(sf1))
            .collect()
    }

    #[test]
    fn test_kraft_complete() {
        for table in all_tables() {
            let sum: u64 = (0..table.len() as u32)
                .map(|s| 1u64 << (table.max_len() - table.code_length(s)))
                .sum();
            assert_eq!(sum, 1u64 << table.max_len(), "码表未满足 Kraft 等式");
        }
    }

    #[test]
    fn test_table_sizes() {
        assert_eq!(sf0(3).map(HuffmanTable::len), Some(8));
        assert_eq!(sf0(6).map(HuffmanTable::len), Some(64));
        assert_eq!(sf1(2).map(HuffmanTable::len), Some(4));
        assert_eq!(sf1(5).map(HuffmanTable::len), Some(32));
        assert!(sf0(2).is_none());
        assert!(sf1(6).is_none());
        assert_eq!(sf0(5).map(HuffmanTable::mask), Some(31));
    }

    #[test]
    fn test_zero_difference_is_shortest() {
        for table in all_tables() {
            assert_eq!(table.code_length(0), 1, "差值 0 应使用 1 位码字");
        }
    }

    #[test]
    fn test_decode_every_symbol() {
        for table in all_tables() {
            let mut bw = BitWriter::new();
            for sym in 0..table.len() as u32 {
                table.encode(&mut bw, sym);
            }
            let total: u32 = (0..table.len() as u32).map(|s| table.code_length(s)).sum();
            assert_eq!(bw.bits_written(), total as usize);
            let data = bw.finish();
            let mut br = BitReader::new(&data);
            for sym in 0..table.len() as u32 {
                assert_eq!(table.decode(&mut br), sym, "符号解码错误");
            }
            assert_eq!(br.position(), total as usize);
        }
    }
}
