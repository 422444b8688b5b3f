//! PCM 采样格式定义.
//!
//! 会话层接受交错的小端 PCM 字节流, 编解码核心按声道平面处理.
//! 本模块负责单个采样在字节与整数/浮点值之间的转换.

use std::fmt;

use byteorder::{ByteOrder, LittleEndian};
use serde::{Deserialize, Serialize};

use crate::{LdacError, LdacResult};

/// PCM 采样格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleFormat {
    /// 有符号 16 位整数
    S16,
    /// 有符号 24 位整数 (3 字节紧凑存储)
    S24,
    /// 有符号 32 位整数
    S32,
    /// 32 位浮点, 满幅为 [-1.0, 1.0)
    F32,
}

impl SampleFormat {
    /// 格式数值标识
    pub const fn id(self) -> u32 {
        match self {
            Self::S16 => 2,
            Self::S24 => 3,
            Self::S32 => 4,
            Self::F32 => 5,
        }
    }

    /// 从数值标识解析格式
    pub fn from_id(id: u32) -> LdacResult<Self> {
        match id {
            2 => Ok(Self::S16),
            3 => Ok(Self::S24),
            4 => Ok(Self::S32),
            5 => Ok(Self::F32),
            other => Err(LdacError::IllegalSampleFormat(other)),
        }
    }

    /// 每个采样点占用的字节数
    pub const fn bytes_per_sample(self) -> usize {
        match self {
            Self::S16 => 2,
            Self::S24 => 3,
            Self::S32 | Self::F32 => 4,
        }
    }

    /// 是否为浮点格式
    pub const fn is_float(self) -> bool {
        matches!(self, Self::F32)
    }

    /// 读取整数格式采样的原始值 (S24 做符号扩展)
    ///
    /// 浮点格式按 Q31 返回 (饱和).
    pub fn read_int(self, bytes: &[u8]) -> i32 {
        match self {
            Self::S16 => i32::from(LittleEndian::read_i16(bytes)),
            Self::S24 => LittleEndian::read_i24(bytes),
            Self::S32 => LittleEndian::read_i32(bytes),
            Self::F32 => {
                let v = f64::from(LittleEndian::read_f32(bytes)) * 2_147_483_648.0;
                v.clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32
            }
        }
    }

    /// 读取浮点采样, 整数格式按满幅归一化到 [-1.0, 1.0)
    pub fn read_f32(self, bytes: &[u8]) -> f32 {
        match self {
            Self::S16 => f32::from(LittleEndian::read_i16(bytes)) / 32_768.0,
            Self::S24 => LittleEndian::read_i24(bytes) as f32 / 8_388_608.0,
            Self::S32 => LittleEndian::read_i32(bytes) as f32 / 2_147_483_648.0,
            Self::F32 => LittleEndian::read_f32(bytes),
        }
    }

    /// 写入整数值, 超出格式范围时饱和
    ///
    /// 浮点格式把输入视为 Q31.
    pub fn write_int(self, value: i32, out: &mut [u8]) {
        match self {
            Self::S16 => {
                LittleEndian::write_i16(out, value.clamp(-0x8000, 0x7fff) as i16);
            }
            Self::S24 => LittleEndian::write_i24(out, value.clamp(-0x80_0000, 0x7f_ffff)),
            Self::S32 => LittleEndian::write_i32(out, value),
            Self::F32 => LittleEndian::write_f32(out, (f64::from(value) / 2_147_483_648.0) as f32),
        }
    }

    /// 写入归一化浮点值, 整数格式四舍五入并饱和
    pub fn write_f32(self, value: f32, out: &mut [u8]) {
        let scaled = |full: f64| (f64::from(value) * full).round();
        match self {
            Self::S16 => {
                let v = scaled(32_768.0).clamp(-32_768.0, 32_767.0);
                LittleEndian::write_i16(out, v as i16);
            }
            Self::S24 => {
                let v = scaled(8_388_608.0).clamp(-8_388_608.0, 8_388_607.0);
                LittleEndian::write_i24(out, v as i32);
            }
            Self::S32 => {
                let v = scaled(2_147_483_648.0).clamp(-2_147_483_648.0, 2_147_483_647.0);
                LittleEndian::write_i32(out, v as i32);
            }
            Self::F32 => LittleEndian::write_f32(out, value),
        }
    }
}

impl fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::S16 => "s16",
            Self::S24 => "s24",
            Self::S32 => "s32",
            Self::F32 => "f32",
        };
        write!(f, "{name}")
    }
}
