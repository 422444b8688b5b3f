//! 码流布局常量表.
//!
//! 量化单元划分、band 到量化单元的映射、比例因子加权表、梯度重采样表与矢量量化码表.
//! 可由公式生成的表在编译期用 `const fn` 构造.

pub mod sigproc;

use crate::consts::{MAXGRADQU, MAXNBANDS, MAXNQUS, NSFCWTBL};

/// 每个量化单元的频谱系数个数
pub const NSPS: [usize; MAXNQUS] = [
    2, 2, 2, 2, 4, 4, 4, 4, 4, 4, 4, 4, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 16, 16,
    16, 16, 16,
];

/// 每个量化单元的首个频谱系数位置 (NSPS 的前缀和)
pub const ISP: [usize; MAXNQUS + 1] = build_isp();

/// band 数量对应的量化单元数量
pub const NQUS: [usize; MAXNBANDS + 1] = [
    0, 4, 8, 10, 12, 14, 16, 18, 20, 22, 23, 25, 27, 29, 31, 33, 34,
];

/// 各采样率索引允许的最大 band 数量
pub const MAX_NBANDS: [usize; 4] = [10, 10, 16, 16];

/// 比例因子加权表, `SFCWGT[k][q] = (3kq + 16) / 33`
pub const SFCWGT: [[i32; MAXNQUS]; NSFCWTBL] = build_sfcwgt();

/// 梯度重采样表, 第 `L - 1` 行有 `L` 个有效值
pub const RESAMP: [[i32; MAXGRADQU]; MAXGRADQU] = build_resamp();

/// 模式 0 比例因子位长, 按取值跨度的一半索引
pub const SFC_BITLEN_0: [u32; 32] = [
    3, 3, 3, 3, 4, 4, 4, 4, 5, 5, 5, 5, 5, 5, 5, 5, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6,
];

/// 模式 1 比例因子位长, 按取值跨度的一半索引
pub const SFC_BITLEN_1: [u32; 32] = [
    2, 2, 3, 3, 4, 4, 4, 4, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5,
];

/// 模式 2 比例因子位长, 按与声道 0 最大差值的一半索引
pub const SFC_BITLEN_2: [u32; 16] = [2, 3, 4, 4, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5];

/// 2 维矢量码解码表
pub const SPEC_2DIM_DEC: [[i32; 2]; 8] = build_2dim_dec();

/// 4 维矢量码解码表
pub const SPEC_4DIM_DEC: [[i32; 4]; 81] = build_4dim_dec();

const fn build_isp() -> [usize; MAXNQUS + 1] {
    let mut isp = [0usize; MAXNQUS + 1];
    let mut iqu = 0;
    while iqu < MAXNQUS {
        isp[iqu + 1] = isp[iqu] + NSPS[iqu];
        iqu += 1;
    }
    isp
}

const fn build_sfcwgt() -> [[i32; MAXNQUS]; NSFCWTBL] {
    let mut tbl = [[0i32; MAXNQUS]; NSFCWTBL];
    let mut k = 0;
    while k < NSFCWTBL {
        let mut q = 0;
        while q < MAXNQUS {
            tbl[k][q] = ((3 * k * q + 16) / 33) as i32;
            q += 1;
        }
        k += 1;
    }
    tbl
}

const fn build_resamp() -> [[i32; MAXGRADQU]; MAXGRADQU] {
    let mut tbl = [[0i32; MAXGRADQU]; MAXGRADQU];
    let mut row = 0;
    while row < MAXGRADQU {
        let len = row + 1;
        let mut i = 0;
        while i < len {
            let v = ((2 * i + 1) * 256) / (2 * len);
            tbl[row][i] = if v > 255 { 255 } else { v as i32 };
            i += 1;
        }
        row += 1;
    }
    tbl
}

const fn build_2dim_dec() -> [[i32; 2]; 8] {
    let mut tbl = [[0i32; 2]; 8];
    let mut v = 0;
    while v < 8 {
        let code = v as i32 + 1;
        tbl[v] = [code / 3 - 1, code % 3 - 1];
        v += 1;
    }
    tbl
}

const fn build_4dim_dec() -> [[i32; 4]; 81] {
    let mut tbl = [[0i32; 4]; 81];
    let mut v = 0;
    while v < 81 {
        let code = v as i32;
        tbl[v] = [
            code / 27 - 1,
            (code / 9) % 3 - 1,
            (code / 3) % 3 - 1,
            code % 3 - 1,
        ];
        v += 1;
    }
    tbl
}

/// 编码 2 维矢量, `(-1, -1)` 无法表示返回 `None`
pub fn encode_2dim(q0: i32, q1: i32) -> Option<u32> {
    let code = 3 * (q0 + 1) + (q1 + 1) - 1;
    if (0..8).contains(&code) {
        Some(code as u32)
    } else {
        None
    }
}

/// 编码 4 维矢量, 各分量取值须在 [-1, 1]
pub fn encode_4dim(q: [i32; 4]) -> u32 {
    (27 * (q[0] + 1) + 9 * (q[1] + 1) + 3 * (q[2] + 1) + (q[3] + 1)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_isp_prefix_sum() {
        assert_eq!(ISP[0], 0);
        assert_eq!(ISP[12], 40);
        assert_eq!(ISP[23], 128);
        assert_eq!(ISP[MAXNQUS], 256);
    }

    #[test]
    fn test_nqus_fits_transform() {
        // 1fs 最大 band 对应的系数不超过 128 点变换
        assert!(ISP[NQUS[MAX_NBANDS[0]]] <= 128);
        assert_eq!(ISP[NQUS[MAX_NBANDS[3]]], 256);
    }

    #[test]
    fn test_sfcwgt_values() {
        assert!(SFCWGT[0].iter().all(|&v| v == 0));
        assert_eq!(SFCWGT[1][33], (3 * 33 + 16) / 33);
        assert_eq!(SFCWGT[7][33], 21);
    }

    #[test]
    fn test_resamp_rows() {
        assert_eq!(RESAMP[0][0], 128);
        assert_eq!(RESAMP[1][..2], [64, 192]);
        assert!(RESAMP[49][..50].iter().all(|&v| v < 256));
        assert_eq!(RESAMP[49][49], 253);
    }

    #[test]
    fn test_2dim_codes() {
        for (code, pair) in SPEC_2DIM_DEC.iter().enumerate() {
            assert_eq!(encode_2dim(pair[0], pair[1]), Some(code as u32));
        }
        assert_eq!(encode_2dim(-1, -1), None, "(-1, -1) 不可编码");
        assert_eq!(SPEC_2DIM_DEC[0], [-1, 0]);
        assert_eq!(SPEC_2DIM_DEC[7], [1, 1]);
    }

    #[test]
    fn test_4dim_codes() {
        for (code, quad) in SPEC_4DIM_DEC.iter().enumerate() {
            assert_eq!(encode_4dim(*quad), code as u32);
        }
        assert_eq!(encode_4dim([0, 0, 0, 0]), 40);
    }
}
