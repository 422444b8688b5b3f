//! # ldac-codec
//!
//! LDAC 风格的 MDCT 音频编解码器.
//!
//! 一帧由若干音频块 (单声道块或立体声块) 组成, 每个声道的处理流程:
//! - 编码: PCM -> 加窗 MDCT -> 缩放因子 -> 比特分配 -> 量化 -> 打包
//! - 解码: 严格解包 -> 反量化 -> IMDCT 重叠相加 -> PCM
//!
//! 信号通路有定点 ([`FixedPath`]) 与浮点 ([`FloatPath`]) 两种实现, 码流格式相同.
//!
//! [`bt`] 模块在帧编解码器之上提供蓝牙传输会话: 输入缓冲, 打包, 质量模式切换.

pub mod bitalloc;
pub mod block;
pub mod bt;
pub mod config;
pub mod consts;
pub mod decoder;
pub mod dsp;
pub mod encoder;
pub mod frame;
pub mod huffman;
pub mod pack;
pub mod packet;
pub mod tables;
pub mod unpack;

pub use config::{BlockType, ChannelConfig, EncodeSetting, FrameHeader, SamplingRate, StreamConfig};
pub use decoder::LdacDecoder;
pub use dsp::{FixedPath, FloatPath, SignalPath};
pub use encoder::{EncodeWarnings, EncodedFrame, LdacEncoder};
pub use frame::AudioFrame;
pub use packet::Packet;
