//! 码流格式常量.
//!
//! 字段位宽、取值范围与定点 Q 格式. 解包器的合法性检查与比特分配的代价计算都以这些常量为准.

// ========================
// 帧头
// ========================

/// 帧头同步字
pub const SYNCWORD: u32 = 0xAA;
/// 同步字位宽
pub const SYNCWORD_BITS: u32 = 8;
/// 采样率索引位宽
pub const SMPLRATE_BITS: u32 = 3;
/// 声道配置索引位宽
pub const CHCONFIG_BITS: u32 = 2;
/// 帧长位宽 (存储 frame_length - 1)
pub const FRAMELEN_BITS: u32 = 9;
/// 帧状态位宽
pub const FRAMESTAT_BITS: u32 = 2;
/// 帧头字节数
pub const FRAME_HEADER_BYTES: usize = 3;
/// 帧长上限 (字节, 不含帧头)
pub const MAX_FRAME_LENGTH: usize = 1 << FRAMELEN_BITS;

// ========================
// 块头
// ========================

/// band 数量位宽
pub const NBAND_BITS: u32 = 4;
/// band 数量存储偏移
pub const BAND_OFFSET: usize = 2;
/// 扩展标志位宽
pub const FLAG_BITS: u32 = 1;
/// 扩展模式位宽
pub const EXTMODE_BITS: u32 = 2;
/// 扩展数据长度位宽
pub const EXTSIZE_BITS: u32 = 12;
/// 携带扩展数据的扩展模式
pub const EXTMODE_PAYLOAD: u32 = 3;

// ========================
// 梯度
// ========================

/// 梯度模式位宽
pub const GRADMODE_BITS: u32 = 2;
/// 模式 0 梯度边界位宽
pub const GRADQU0_BITS: u32 = 6;
/// 模式 1-3 梯度下边界位宽
pub const GRADQU1_BITS: u32 = 5;
/// 梯度偏移位宽
pub const GRADOS_BITS: u32 = 5;
/// 调整量化单元数位宽
pub const NADJQU_BITS: u32 = 5;
/// 梯度数组长度
pub const MAXGRADQU: usize = 50;
/// 模式 1-3 隐含的梯度上边界
pub const DEFGRADQUH: u32 = 26;
/// 模式 1-3 隐含的梯度上偏移
pub const DEFGRADOSH: u32 = 31;
/// 梯度偏移上限
pub const MAXGRADOS: u32 = 31;

// ========================
// 比例因子
// ========================

/// 比例因子编码模式位宽
pub const SFCMODE_BITS: u32 = 1;
/// 比例因子位长字段位宽
pub const SFCBLEN_BITS: u32 = 2;
/// 比例因子索引位宽
pub const IDSF_BITS: u32 = 5;
/// 加权表索引位宽
pub const SFCWTBL_BITS: u32 = 3;
/// 加权表数量
pub const NSFCWTBL: usize = 8;
/// 模式 0 最小位长
pub const MINSFCBLEN_0: u32 = 3;
/// 模式 1 最小位长
pub const MINSFCBLEN_1: u32 = 2;
/// 模式 2 最小位长
pub const MINSFCBLEN_2: u32 = 2;
/// 模式 1 中超过此位长时直接写 5 位原值
pub const MAXSFCBLEN_1_WEIGHTED: u32 = 4;
/// 比例因子索引数量
pub const NIDSF: i32 = 32;
/// 模式 2 差分掩码
pub const SFC_MASK: i32 = 31;

// ========================
// 字长与频谱
// ========================

/// 字长索引数量
pub const NIDWL: usize = 16;
/// 主字长下限
pub const MINIDWL1: i32 = 1;
/// 主字长上限
pub const MAXIDWL1: i32 = 15;
/// 残差字长上限
pub const MAXIDWL2: i32 = 15;
/// 2 维矢量码位宽
pub const SPEC_2DIM_BITS: u32 = 3;
/// 4 维矢量码位宽
pub const SPEC_4DIM_BITS: u32 = 7;
/// 4 维矢量码有效取值数量
pub const N4DIMSPECDECTBL: u32 = 81;

// ========================
// 尺寸
// ========================

/// 量化单元上限
pub const MAXNQUS: usize = 34;
/// band 数量上限
pub const MAXNBANDS: usize = 16;
/// 每声道频谱系数上限
pub const MAXLSU: usize = 256;
/// 帧尾填充码
pub const FILLCODE: u8 = 0x01;
/// 字节位数
pub const BYTE_BITS: usize = 8;

// ========================
// 定点 Q 格式
// ========================

/// 输入 PCM 的 Q 格式 (16 位满幅)
pub const Q_SETPCM: u32 = 15;
/// 窗函数 Q 格式
pub const Q_MDCT_WIN: i32 = 30;
/// 旋转因子 Q 格式
pub const Q_MDCT_COS: i32 = 31;
/// 块浮点目标位宽
pub const C_BLKFLT: i32 = 28;
/// 归一化 Q 格式
pub const Q_NORM: i32 = 15;
/// 频谱反量化 Q 格式
pub const Q_DEQUANT1: i32 = 16;
/// 残差反量化中间 Q 格式
pub const Q_DEQUANT2: i32 = 0;
/// 残差反量化 Q 格式
pub const Q_DEQUANT3: i32 = 47;
