//! 统一错误类型定义.
//!
//! 编码器、解码器、会话层与码率控制共用的错误类型, 支持跨 crate 传播.
//! 每个错误都对应一个数值错误码, 会话层按 `api << 20 | handle << 10 | block`
//! 打包后对外暴露.

use thiserror::Error;

/// 无错误
pub const ERR_NONE: u32 = 0;
/// 非致命错误下限
pub const ERR_NON_FATAL: u32 = 1;
/// 比特分配失败 (降级为空帧)
pub const ERR_BIT_ALLOCATION: u32 = 5;
/// 质量模式已到达调整极限
pub const ERR_ALTER_EQMID_LIMITED: u32 = 21;
/// 解码配置已更新
pub const ERR_DEC_CONFIG_UPDATED: u32 = 22;
/// 致命错误下限
pub const ERR_FATAL: u32 = 256;
/// 内存分配失败
pub const ERR_ALLOC_MEMORY: u32 = 300;
/// 同步字错误
pub const ERR_ILL_SYNCWORD: u32 = 302;
/// 采样格式非法
pub const ERR_ILL_SMPL_FORMAT: u32 = 303;
/// 参数非法
pub const ERR_ILL_PARAM: u32 = 304;
/// 采样率不支持
pub const ERR_ASSERT_SAMPLING_FREQ: u32 = 305;
/// 声道配置不支持
pub const ERR_ASSERT_CHANNEL_CONFIG: u32 = 308;
/// 帧长越界
pub const ERR_ASSERT_FRAME_LENGTH: u32 = 310;
/// 声道模式非法
pub const ERR_ASSERT_CHANNEL_MODE: u32 = 314;
/// 输入缓冲区过小
pub const ERR_INPUT_BUFFER_SIZE: u32 = 501;
/// 句柄未初始化
pub const ERR_HANDLE_NOT_INIT: u32 = 1000;

/// 错误码单字段位宽
const CODE_FIELD_BITS: u32 = 10;
/// 错误码单字段掩码
const CODE_FIELD_MASK: u32 = (1 << CODE_FIELD_BITS) - 1;

/// 将三级错误码打包为一个 u32
pub const fn pack_error_code(api: u32, handle: u32, block: u32) -> u32 {
    ((api & CODE_FIELD_MASK) << (2 * CODE_FIELD_BITS))
        | ((handle & CODE_FIELD_MASK) << CODE_FIELD_BITS)
        | (block & CODE_FIELD_MASK)
}

/// 拆分打包错误码, 返回 (api, handle, block)
pub const fn unpack_error_code(code: u32) -> (u32, u32, u32) {
    (
        (code >> (2 * CODE_FIELD_BITS)) & CODE_FIELD_MASK,
        (code >> CODE_FIELD_BITS) & CODE_FIELD_MASK,
        code & CODE_FIELD_MASK,
    )
}

/// 打包错误码中任一字段为致命错误
pub const fn is_fatal_code(code: u32) -> bool {
    let (api, handle, block) = unpack_error_code(code);
    api >= ERR_FATAL || handle >= ERR_FATAL || block >= ERR_FATAL
}

/// 码流语法错误 (块级)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum SyntaxError {
    /// band 数量超过当前采样率允许的上限
    #[error("band 数量越界")]
    Band,
    /// grad_qu_l 越界
    #[error("梯度下边界越界")]
    GradA,
    /// grad_qu_h 越界
    #[error("梯度上边界越界")]
    GradB,
    /// grad_qu_l > grad_qu_h
    #[error("梯度边界倒置")]
    GradC,
    /// 非 0 梯度模式下 grad_qu_l 越界
    #[error("非 0 梯度模式下边界越界")]
    GradD,
    /// nadjqus > nqus
    #[error("调整量化单元数越界")]
    GradE,
    /// 比例因子索引越界
    #[error("比例因子索引越界")]
    Idsf,
    /// 4 维频谱码字越界
    #[error("频谱码字越界")]
    Spec,
}

impl SyntaxError {
    /// 数值错误码
    pub const fn code(self) -> u32 {
        match self {
            Self::Band => 260,
            Self::GradA => 261,
            Self::GradB => 262,
            Self::GradC => 263,
            Self::GradD => 264,
            Self::GradE => 265,
            Self::Idsf => 266,
            Self::Spec => 267,
        }
    }
}

/// 帧解包错误 (句柄级)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum UnpackError {
    /// 音频块语法校验失败
    #[error("音频块解包失败: {0}")]
    BlockFailed(SyntaxError),
    /// 块尾字节对齐填充非零
    #[error("块对齐填充非零")]
    BlockAlign,
    /// 帧尾填充字节不是填充码
    #[error("帧对齐填充错误")]
    FrameAlign,
    /// 块数据超出帧长
    #[error("块数据超出帧长")]
    FrameLengthOver,
    /// 帧对齐后超出帧长
    #[error("帧对齐后超出帧长")]
    FrameAlignOver,
}

impl UnpackError {
    /// 数值错误码
    pub const fn code(self) -> u32 {
        match self {
            Self::BlockFailed(_) => 502,
            Self::BlockAlign => 503,
            Self::FrameAlign => 504,
            Self::FrameLengthOver => 505,
            Self::FrameAlignOver => 506,
        }
    }

    /// 块级语法错误 (若有)
    pub const fn syntax(self) -> Option<SyntaxError> {
        match self {
            Self::BlockFailed(err) => Some(err),
            _ => None,
        }
    }
}

/// LDAC 统一错误类型
#[derive(Debug, Error)]
pub enum LdacError {
    /// 无效参数
    #[error("无效参数: {0}")]
    InvalidArgument(String),

    /// 不支持的配置
    #[error("不支持的配置: {0}")]
    Unsupported(String),

    /// 无效数据 (损坏的码流等)
    #[error("无效数据: {0}")]
    InvalidData(String),

    /// 帧头同步字错误
    #[error("同步字错误: 0x{0:02X}")]
    IllegalSyncword(u32),

    /// 采样格式非法
    #[error("采样格式非法: {0}")]
    IllegalSampleFormat(u32),

    /// 采样率不支持
    #[error("采样率不支持: {0}")]
    SamplingRate(u32),

    /// 声道配置不支持
    #[error("声道配置不支持: {0}")]
    ChannelConfig(u32),

    /// 声道模式非法
    #[error("声道模式非法: 0x{0:02X}")]
    ChannelMode(u32),

    /// 帧长越界
    #[error("帧长越界: {0}")]
    FrameLength(usize),

    /// 帧解包失败
    #[error("帧解包失败: {0}")]
    Unpack(#[from] UnpackError),

    /// 比特分配失败
    #[error("比特分配失败: {0}")]
    BitAllocation(String),

    /// 内存分配失败
    #[error("内存分配失败: {0}")]
    OutOfMemory(String),

    /// 句柄未初始化或模式不匹配
    #[error("句柄未初始化")]
    HandleNotInit,

    /// 质量模式已到达调整极限
    #[error("质量模式已到达调整极限")]
    AlterEqmidLimited,

    /// 输入缓冲区过小
    #[error("输入缓冲区过小: {0} 字节")]
    InputBufferSize(usize),
}

impl LdacError {
    /// 数值错误码 (API 级)
    pub fn code(&self) -> u32 {
        match self {
            Self::InvalidArgument(_) | Self::Unsupported(_) => ERR_ILL_PARAM,
            Self::InvalidData(_) => ERR_FATAL,
            Self::IllegalSyncword(_) => ERR_ILL_SYNCWORD,
            Self::IllegalSampleFormat(_) => ERR_ILL_SMPL_FORMAT,
            Self::SamplingRate(_) => ERR_ASSERT_SAMPLING_FREQ,
            Self::ChannelConfig(_) => ERR_ASSERT_CHANNEL_CONFIG,
            Self::ChannelMode(_) => ERR_ASSERT_CHANNEL_MODE,
            Self::FrameLength(_) => ERR_ASSERT_FRAME_LENGTH,
            Self::Unpack(err) => err.code(),
            Self::BitAllocation(_) => ERR_BIT_ALLOCATION,
            Self::OutOfMemory(_) => ERR_ALLOC_MEMORY,
            Self::HandleNotInit => ERR_HANDLE_NOT_INIT,
            Self::AlterEqmidLimited => ERR_ALTER_EQMID_LIMITED,
            Self::InputBufferSize(_) => ERR_INPUT_BUFFER_SIZE,
        }
    }

    /// 按三级布局打包的错误码
    pub fn packed_code(&self) -> u32 {
        match self {
            Self::Unpack(err) => pack_error_code(
                err.code(),
                err.code(),
                err.syntax().map_or(ERR_NONE, SyntaxError::code),
            ),
            Self::BitAllocation(_) | Self::OutOfMemory(_) => {
                pack_error_code(self.code(), self.code(), ERR_NONE)
            }
            _ => pack_error_code(self.code(), ERR_NONE, ERR_NONE),
        }
    }

    /// 是否为致命错误
    pub fn is_fatal(&self) -> bool {
        is_fatal_code(self.packed_code())
    }
}

/// LDAC 统一 Result 类型
pub type LdacResult<T> = Result<T, LdacError>;
