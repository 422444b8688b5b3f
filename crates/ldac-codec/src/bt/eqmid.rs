//! 编码质量模式 (eqmid).
//!
//! 每个质量模式对应一个单声道帧长 (含帧头), 会话帧长为 `声道数 * frmlen_1ch - 3`.
//! 按码率从高到低的调整顺序为 HQ, SQ, Q0, Q1, MQ.

use serde::{Deserialize, Serialize};

use ldac_core::{LdacError, LdacResult};

/// 编码质量模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Eqmid {
    /// 高音质 (96 kHz 立体声 990 kbps)
    #[default]
    Hq,
    /// 标准 (660 kbps)
    Sq,
    /// 连接优先 (330 kbps)
    Mq,
    /// 492 kbps
    Q0,
    /// 396 kbps
    Q1,
}

/// 质量调整方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlterPriority {
    /// 提高音质 (码率升高)
    IncQuality,
    /// 提高连接稳定性 (码率降低)
    IncConnection,
}

impl Eqmid {
    /// 所有质量模式, 按数值标识排列
    pub const ALL: [Self; 5] = [Self::Hq, Self::Sq, Self::Mq, Self::Q0, Self::Q1];

    /// 按码率从高到低的调整顺序
    pub const ALTER_ORDER: [Self; 5] = [Self::Hq, Self::Sq, Self::Q0, Self::Q1, Self::Mq];

    /// 数值标识
    pub const fn id(self) -> u32 {
        match self {
            Self::Hq => 0,
            Self::Sq => 1,
            Self::Mq => 2,
            Self::Q0 => 3,
            Self::Q1 => 4,
        }
    }

    /// 从数值标识解析
    pub fn from_id(id: u32) -> LdacResult<Self> {
        Self::ALL
            .get(id as usize)
            .copied()
            .ok_or_else(|| LdacError::InvalidArgument(format!("未知质量模式 {}", id)))
    }

    /// 单声道帧长 (含帧头)
    pub const fn frmlen_1ch(self) -> usize {
        match self {
            Self::Hq => 165,
            Self::Sq => 110,
            Self::Mq => 55,
            Self::Q0 => 82,
            Self::Q1 => 66,
        }
    }

    /// 码率排名, 0 为最高
    pub const fn rank(self) -> usize {
        match self {
            Self::Hq => 0,
            Self::Sq => 1,
            Self::Q0 => 2,
            Self::Q1 => 3,
            Self::Mq => 4,
        }
    }

    /// 按排名查找
    pub fn from_rank(rank: usize) -> Option<Self> {
        Self::ALTER_ORDER.get(rank).copied()
    }

    /// 每个传输包的目标帧数
    pub const fn nfrm_in_pkt(self) -> usize {
        match self {
            Self::Hq => 2,
            Self::Sq => 3,
            Self::Mq => 6,
            Self::Q0 => 4,
            Self::Q1 => 5,
        }
    }

    /// 给定声道数下的帧长 (不含帧头)
    pub const fn frame_length(self, channels: usize) -> usize {
        channels * self.frmlen_1ch() - crate::consts::FRAME_HEADER_BYTES
    }

    /// 向指定方向调整一级, 已在端点时返回 `None`
    pub fn altered(self, priority: AlterPriority) -> Option<Self> {
        let rank = self.rank();
        match priority {
            AlterPriority::IncQuality => rank.checked_sub(1).and_then(Self::from_rank),
            AlterPriority::IncConnection => Self::from_rank(rank + 1),
        }
    }
}
