//! 音频块与声道状态.
//!
//! 一帧由若干音频块组成, 每个块含 1 或 2 个声道. 块级参数 (band 数量、梯度、调整量化单元数)
//! 由块内声道共享, 比例因子、字长与量化频谱按声道保存.

use ldac_core::{LdacError, LdacResult};

use crate::config::BlockType;
use crate::consts::{DEFGRADOSH, DEFGRADQUH, MAXGRADOS, MAXGRADQU, MAXLSU, MAXNQUS};
use crate::tables::NQUS;

/// 梯度模式 1-3 的字长压缩形状
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WordLengthShape {
    /// 正值减半
    Half,
    /// 正值乘 3/8
    ThreeEighths,
    /// 正值取 1/4
    Quarter,
}

impl WordLengthShape {
    /// 梯度模式号
    pub const fn mode(self) -> u32 {
        match self {
            Self::Half => 1,
            Self::ThreeEighths => 2,
            Self::Quarter => 3,
        }
    }

    /// 从梯度模式号解析, 模式 0 返回 `None`
    pub const fn from_mode(mode: u32) -> Option<Self> {
        match mode {
            1 => Some(Self::Half),
            2 => Some(Self::ThreeEighths),
            3 => Some(Self::Quarter),
            _ => None,
        }
    }

    /// 压缩一个字长初值, 非正值不变
    #[inline]
    pub const fn apply(self, value: i32) -> i32 {
        if value <= 0 {
            return value;
        }
        match self {
            Self::Half => value >> 1,
            Self::ThreeEighths => (value * 3) >> 3,
            Self::Quarter => value >> 2,
        }
    }
}

/// 字长梯度
///
/// 模式 0 显式给出上下边界与偏移; 模式 1-3 只给下边界与下偏移,
/// 上边界固定为 26, 上偏移固定为 31.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gradient {
    /// 模式 0
    Explicit {
        /// 下边界量化单元
        qu_l: u32,
        /// 上边界量化单元
        qu_h: u32,
        /// 下偏移
        os_l: u32,
        /// 上偏移
        os_h: u32,
    },
    /// 模式 1-3
    Shaped {
        /// 字长压缩形状
        shape: WordLengthShape,
        /// 下边界量化单元
        qu_l: u32,
        /// 下偏移
        os_l: u32,
    },
}

impl Default for Gradient {
    fn default() -> Self {
        Self::Explicit {
            qu_l: 0,
            qu_h: 28,
            os_l: 0,
            os_h: 10,
        }
    }
}

impl Gradient {
    /// 构造模式 1-3 梯度
    pub const fn shaped(shape: WordLengthShape, qu_l: u32, os_l: u32) -> Self {
        Self::Shaped { shape, qu_l, os_l }
    }

    /// 梯度模式号
    pub const fn mode(&self) -> u32 {
        match self {
            Self::Explicit { .. } => 0,
            Self::Shaped { shape, .. } => shape.mode(),
        }
    }

    /// 字长压缩形状, 模式 0 返回 `None`
    pub const fn shape(&self) -> Option<WordLengthShape> {
        match self {
            Self::Explicit { .. } => None,
            Self::Shaped { shape, .. } => Some(*shape),
        }
    }

    /// 下边界量化单元
    pub const fn qu_l(&self) -> u32 {
        match self {
            Self::Explicit { qu_l, .. } | Self::Shaped { qu_l, .. } => *qu_l,
        }
    }

    /// 上边界量化单元
    pub const fn qu_h(&self) -> u32 {
        match self {
            Self::Explicit { qu_h, .. } => *qu_h,
            Self::Shaped { .. } => DEFGRADQUH,
        }
    }

    /// 下偏移
    pub const fn os_l(&self) -> u32 {
        match self {
            Self::Explicit { os_l, .. } | Self::Shaped { os_l, .. } => *os_l,
        }
    }

    /// 上偏移
    pub const fn os_h(&self) -> u32 {
        match self {
            Self::Explicit { os_h, .. } => *os_h,
            Self::Shaped { .. } => DEFGRADOSH,
        }
    }

    /// 两个偏移同时加 `delta`, 上限 31
    pub fn with_offset(&self, delta: u32) -> Self {
        let bump = |os: u32| (os + delta).min(MAXGRADOS);
        match *self {
            Self::Explicit {
                qu_l,
                qu_h,
                os_l,
                os_h,
            } => Self::Explicit {
                qu_l,
                qu_h,
                os_l: bump(os_l),
                os_h: bump(os_h),
            },
            Self::Shaped { shape, qu_l, os_l } => Self::Shaped {
                shape,
                qu_l,
                os_l: bump(os_l),
            },
        }
    }
}

/// 比例因子编码方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScaleFactorCoding {
    /// 模式 0: 加权后首值定长, 其余差分 Huffman 编码
    Differential {
        /// 位长 (3..=6)
        bitlen: u32,
        /// 加权后最小值
        offset: i32,
        /// 加权表索引
        weight: usize,
    },
    /// 模式 1 (仅声道 0): 定长编码
    ///
    /// 位长不超过 4 时携带偏移与加权表, 否则直接写 5 位原值.
    Fixed {
        /// 位长 (2..=5)
        bitlen: u32,
        /// (偏移, 加权表索引)
        weighting: Option<(i32, usize)>,
    },
    /// 模式 1 (声道 1): 相对声道 0 的差值 Huffman 编码
    Relative {
        /// 位长 (2..=5)
        bitlen: u32,
    },
}

impl Default for ScaleFactorCoding {
    fn default() -> Self {
        Self::Fixed {
            bitlen: 5,
            weighting: None,
        }
    }
}

impl ScaleFactorCoding {
    /// 模式位
    pub const fn mode_bit(&self) -> u32 {
        match self {
            Self::Differential { .. } => 0,
            Self::Fixed { .. } | Self::Relative { .. } => 1,
        }
    }
}

/// 比特分配结果中各部分的位数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlockBits {
    /// band 信息
    pub band: usize,
    /// 梯度
    pub gradient: usize,
    /// 比例因子 (所有声道)
    pub scale_factor: usize,
    /// 频谱与残差 (所有声道)
    pub spectrum: usize,
    /// 按字节取整后的块总位数
    pub total: usize,
}

/// 按固定长度分配缓冲, 分配失败映射为 `OutOfMemory`
pub(crate) fn alloc_buffer<T: Clone>(len: usize, value: T, what: &str) -> LdacResult<Vec<T>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|e| LdacError::OutOfMemory(format!("{}: {}", what, e)))?;
    buf.resize(len, value);
    Ok(buf)
}

/// 声道状态
#[derive(Debug, Clone)]
pub struct AudioChannel<S> {
    /// 比例因子索引
    pub idsf: [i32; MAXNQUS],
    /// 附加字长
    pub addwl: [i32; MAXNQUS],
    /// 主字长
    pub idwl1: [i32; MAXNQUS],
    /// 残差字长
    pub idwl2: [i32; MAXNQUS],
    /// 比例因子编码方式
    pub sfc: ScaleFactorCoding,
    /// 扩展数据位数
    pub ext_size: u32,
    /// 量化频谱
    pub qspec: Vec<i32>,
    /// 量化残差
    pub rspec: Vec<i32>,
    /// 时域缓冲 (两帧)
    pub time: Vec<S>,
    /// 频谱
    pub spec: Vec<S>,
}

impl<S: Copy + Default> AudioChannel<S> {
    /// 分配声道缓冲
    pub fn new() -> LdacResult<Self> {
        Ok(Self {
            idsf: [0; MAXNQUS],
            addwl: [0; MAXNQUS],
            idwl1: [0; MAXNQUS],
            idwl2: [0; MAXNQUS],
            sfc: ScaleFactorCoding::default(),
            ext_size: 0,
            qspec: alloc_buffer(MAXLSU, 0, "qspec")?,
            rspec: alloc_buffer(MAXLSU, 0, "rspec")?,
            time: alloc_buffer(2 * MAXLSU, S::default(), "time")?,
            spec: alloc_buffer(MAXLSU, S::default(), "spec")?,
        })
    }
}

impl<S> AudioChannel<S> {
    /// 清零量化频谱与残差
    pub fn clear_quantized(&mut self) {
        self.qspec.fill(0);
        self.rspec.fill(0);
    }
}

/// 音频块
#[derive(Debug, Clone)]
pub struct AudioBlock<S> {
    /// 块类型
    pub block_type: BlockType,
    /// 块内声道
    pub channels: Vec<AudioChannel<S>>,
    /// band 数量
    pub nbands: usize,
    /// 量化单元数量
    pub nqus: usize,
    /// 扩展标志
    pub ext_flag: bool,
    /// 扩展模式
    pub ext_mode: u32,
    /// 字长梯度参数
    pub gradient: Gradient,
    /// 重建后的梯度曲线
    pub grad: [i32; MAXGRADQU],
    /// 主字长加 1 的低端量化单元数
    pub nadjqus: usize,
    /// 比特分配统计
    pub bits: BlockBits,
}

impl<S: Copy + Default> AudioBlock<S> {
    /// 创建音频块并分配声道
    pub fn new(block_type: BlockType) -> LdacResult<Self> {
        let mut channels = Vec::new();
        channels
            .try_reserve_exact(block_type.channels())
            .map_err(|e| LdacError::OutOfMemory(format!("channels: {}", e)))?;
        for _ in 0..block_type.channels() {
            channels.push(AudioChannel::new()?);
        }
        Ok(Self {
            block_type,
            channels,
            nbands: 0,
            nqus: 0,
            ext_flag: false,
            ext_mode: 0,
            gradient: Gradient::default(),
            grad: [0; MAXGRADQU],
            nadjqus: 0,
            bits: BlockBits::default(),
        })
    }
}

impl<S> AudioBlock<S> {
    /// 设置 band 数量并同步量化单元数量
    pub fn set_nbands(&mut self, nbands: usize) {
        self.nbands = nbands;
        self.nqus = NQUS[nbands];
    }
}

/// 按声道配置创建整帧的音频块
pub fn build_blocks<S: Copy + Default>(
    block_types: &[BlockType],
) -> LdacResult<Vec<AudioBlock<S>>> {
    block_types.iter().map(|&bt| AudioBlock::new(bt)).collect()
}
