//! # ldac-core
//!
//! LDAC 编解码器核心库, 提供错误类型、定点数值内核、比特流读写与采样格式定义.
//!
//! 编码器、解码器与码率控制共用本 crate 的基础设施.

pub mod bitreader;
pub mod bitwriter;
pub mod channel_mode;
pub mod error;
pub mod fixed;
pub mod sample_format;

// 重导出常用类型
pub use channel_mode::ChannelMode;
pub use error::{LdacError, LdacResult, SyntaxError, UnpackError};
pub use sample_format::SampleFormat;
