//! # ldac
//!
//! 纯 Rust 实现的 LDAC 风格蓝牙音频编解码器与自适应码率控制.
//!
//! # 快速开始
//!
//! ```rust,no_run
//! use ldac::codec::bt::{BtEncoder, BtEncoderConfig, Eqmid};
//!
//! let config = BtEncoderConfig { eqmid: Eqmid::Hq, ..BtEncoderConfig::default() };
//! let mut encoder: BtEncoder = BtEncoder::new(config)?;
//! let pcm = vec![0u8; encoder.input_chunk_bytes()];
//! if let Some(packet) = encoder.encode(Some(&pcm))?.packet {
//!     println!("{} 帧, {} 字节", packet.frame_count, packet.size());
//! }
//! # Ok::<(), ldac::core::LdacError>(())
//! ```
//!
//! # Crate 结构
//!
//! | Crate | 功能 |
//! |-------|------|
//! | `ldac-core` | 错误类型, 比特读写, 定点工具 |
//! | `ldac-codec` | 帧编解码器与蓝牙传输会话 |
//! | `ldac-abr` | 自适应码率控制器 |

pub mod config;
pub mod logging;

/// 核心类型与工具
pub use ldac_core as core;

/// 帧编解码器与蓝牙传输会话
pub use ldac_codec as codec;

/// 自适应码率控制器
pub use ldac_abr as abr;

pub use config::LdacConfig;

/// 会话版本号 `major << 16 | minor << 8 | branch`
pub fn version() -> u32 {
    ldac_codec::bt::version()
}

/// crate 版本号
pub fn crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
