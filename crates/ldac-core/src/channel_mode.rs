//! 声道模式定义.
//!
//! 会话接口以位掩码表示声道模式, 码流帧头中记录的是声道配置索引 (cci).
//! 单声道对应 cci 0, 双单声道对应 cci 1, 立体声对应 cci 2.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::{LdacError, LdacResult};

bitflags! {
    /// 声道模式位掩码, 有效取值只能置位其中一个
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct ChannelMode: u32 {
        /// 立体声 (一个双声道块)
        const STEREO       = 0x01;
        /// 双单声道 (两个单声道块)
        const DUAL_CHANNEL = 0x02;
        /// 单声道
        const MONO         = 0x04;
    }
}

impl ChannelMode {
    /// 校验恰好置位一个已知模式
    pub fn validate(self) -> LdacResult<Self> {
        if self == Self::STEREO || self == Self::DUAL_CHANNEL || self == Self::MONO {
            Ok(self)
        } else {
            Err(LdacError::ChannelMode(self.bits()))
        }
    }

    /// 对应的声道配置索引
    pub fn channel_config_id(self) -> LdacResult<u32> {
        let mode = self.validate()?;
        if mode == Self::MONO {
            Ok(0)
        } else if mode == Self::DUAL_CHANNEL {
            Ok(1)
        } else {
            Ok(2)
        }
    }

    /// 由声道配置索引还原声道模式
    pub fn from_channel_config_id(cci: u32) -> LdacResult<Self> {
        match cci {
            0 => Ok(Self::MONO),
            1 => Ok(Self::DUAL_CHANNEL),
            2 => Ok(Self::STEREO),
            other => Err(LdacError::ChannelConfig(other)),
        }
    }

    /// PCM 声道数
    pub fn channels(self) -> LdacResult<usize> {
        let mode = self.validate()?;
        Ok(if mode == Self::MONO { 1 } else { 2 })
    }
}
