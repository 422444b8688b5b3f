//! 信号通路: PCM 转换、MDCT/IMDCT、归一化与量化.
//!
//! 编码器与解码器对采样类型泛型, 由 [`SignalPath`] 决定数值表示:
//! - [`FixedPath`]: 32 位定点, 块浮点变换, 码流逐位确定
//! - [`FloatPath`]: 32 位浮点, 与定点通路共用同一蝶形网络与常量表
//!
//! 两条通路的量化单元划分、比例因子索引与字长完全一致, 码流互通.

pub mod fixed;
pub mod float;

use ldac_core::SampleFormat;

pub use fixed::FixedPath;
pub use float::FloatPath;

use crate::tables::sigproc::{
    BWIN_1FS, BWIN_2FS, FWIN_1FS, FWIN_2FS, PERM_1FS, PERM_2FS, WCOS_1FS, WCOS_2FS, WSIN_1FS,
    WSIN_2FS,
};

/// 信号通路
///
/// 时域缓冲长度为 `2n`, 频谱长度为 `n`, `n = 1 << nlnn`.
pub trait SignalPath: Send + Sync + 'static {
    /// 采样数值类型
    type Sample: Copy + Default + Send + Sync + std::fmt::Debug + 'static;

    /// 通路名称
    const NAME: &'static str;

    /// 读取一个 PCM 采样
    fn pcm_to_time(format: SampleFormat, bytes: &[u8]) -> Self::Sample;

    /// 写出一个 PCM 采样
    fn time_to_pcm(format: SampleFormat, sample: Self::Sample, out: &mut [u8]);

    /// 正变换: `time[..2n]` -> `spec[..n]`
    fn mdct(time: &[Self::Sample], spec: &mut [Self::Sample], nlnn: u32);

    /// 逆变换并重叠相加
    ///
    /// `time[..n]` 为本帧输出, `time[n..2n]` 保存到下一帧的重叠部分.
    fn imdct(spec: &[Self::Sample], time: &mut [Self::Sample], nlnn: u32);

    /// 量化单元的比例因子索引: 满足 `2^(idsf-15) >= max|x|` 的最小值
    fn scale_factor_index(values: &[Self::Sample]) -> i32;

    /// 量化一个量化单元的频谱与残差
    fn quantize(
        values: &[Self::Sample],
        idsf: i32,
        idwl1: i32,
        idwl2: i32,
        qspec: &mut [i32],
        rspec: &mut [i32],
    );

    /// 反量化一个量化单元
    fn dequantize(
        qspec: &[i32],
        rspec: &[i32],
        idsf: i32,
        idwl1: i32,
        idwl2: i32,
        out: &mut [Self::Sample],
    );

    /// 采样幅度, 用于比较
    fn magnitude(sample: Self::Sample) -> f64;
}

/// 一种变换长度的窗函数与旋转因子
pub(crate) struct TransformTables {
    pub fwin: &'static [i32],
    pub bwin: &'static [i32],
    pub wcos: &'static [i32],
    pub wsin: &'static [i32],
    pub perm: &'static [u16],
}

/// 按变换长度选择常量表
pub(crate) fn transform_tables(nlnn: u32) -> TransformTables {
    if nlnn >= 8 {
        TransformTables {
            fwin: &FWIN_2FS,
            bwin: &BWIN_2FS,
            wcos: &WCOS_2FS,
            wsin: &WSIN_2FS,
            perm: &PERM_2FS,
        }
    } else {
        TransformTables {
            fwin: &FWIN_1FS,
            bwin: &BWIN_1FS,
            wcos: &WCOS_1FS,
            wsin: &WSIN_1FS,
            perm: &PERM_1FS,
        }
    }
}

/// 字长对应的量化上限 `2^idwl - 1`
#[inline]
pub(crate) fn quant_limit(idwl: i32) -> i32 {
    (1 << idwl) - 1
}
