//! 压缩数据包.
//!
//! 会话层一次输出的传输单元, 由一个或多个完整 LDAC 帧首尾相接组成.

use bytes::Bytes;

/// 压缩数据包
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Packet {
    /// 压缩数据
    pub data: Bytes,
    /// 包含的 LDAC 帧数
    pub frame_count: usize,
}

impl Packet {
    /// 从数据创建数据包
    pub fn from_data(data: impl Into<Bytes>, frame_count: usize) -> Self {
        Self {
            data: data.into(),
            frame_count,
        }
    }

    /// 数据大小 (字节)
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// 是否为空包
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
