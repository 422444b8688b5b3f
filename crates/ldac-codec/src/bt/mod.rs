//! 蓝牙传输会话层.
//!
//! 在帧编解码器之上提供 A2DP 传输所需的会话接口:
//! - [`BtEncoder`]: 按 128 采样块接收交错 PCM, 攒满一帧后编码, 把多个带帧头的帧打成传输包,
//!   并按质量模式 (eqmid) 在帧与帧之间切换帧长
//! - [`BtDecoder`]: 逐帧解析帧头并解码为交错 PCM, 流配置变化时自动重建
//!
//! 两者都记录最近一次调用的打包错误码 (`api << 20 | handle << 10 | block`).

pub mod decoder;
pub mod encoder;
pub mod eqmid;
pub mod ring;

pub use decoder::{BtDecodeOutput, BtDecoder};
pub use encoder::{AlterState, BtEncodeOutput, BtEncoder, BtEncoderConfig};
pub use eqmid::{AlterPriority, Eqmid};

use crate::consts::FRAME_HEADER_BYTES;

/// 会话要求的最小 MTU (2-DH5 包)
pub const MTU_REQUIRED: usize = 679;
/// 传输包头大小
pub const TX_HEADER_SIZE: usize = 18;
/// 传输包负载大小
pub const TX_SIZE: usize = MTU_REQUIRED - TX_HEADER_SIZE;
/// 每包最多帧数
pub const NFRM_TX_MAX: usize = 15;
/// 编码端 PCM 环形缓冲字节数
pub const PCM_RING_BYTES: usize = 6144;
/// 编码端传输帧缓冲字节数
pub const STREAM_BUF_BYTES: usize = 1024;
/// 每次输入的采样数 (每声道)
pub const ENC_LSU: usize = 128;
/// 解码输入的最小字节数
pub const MIN_DECODE_BYTES: usize = FRAME_HEADER_BYTES + 2;

/// 会话版本号 2.0.72
const VERSION_MAJOR: u32 = 2;
const VERSION_MINOR: u32 = 0;
const VERSION_BRANCH: u32 = 72;

/// 打包后的版本号 `major << 16 | minor << 8 | branch`
pub const fn version() -> u32 {
    (VERSION_MAJOR << 16) | (VERSION_MINOR << 8) | VERSION_BRANCH
}

/// 帧长对应的码率 (kbps)
pub const fn frame_length_to_bitrate(frame_length: usize, sampling_rate: u32, frame_samples: usize) -> u32 {
    ((frame_length + FRAME_HEADER_BYTES) * sampling_rate as usize / frame_samples * 8 / 1000) as u32
}
