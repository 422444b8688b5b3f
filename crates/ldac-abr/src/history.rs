//! 发送队列深度历史.

use ldac_core::{LdacError, LdacResult};

/// 环形历史记录, 维护窗口内深度之和
#[derive(Debug)]
pub(crate) struct DepthHistory {
    hist: Vec<u8>,
    sum: u32,
    cnt: usize,
    idx: usize,
}

impl DepthHistory {
    pub(crate) fn new(size: usize) -> LdacResult<Self> {
        let mut hist = Vec::new();
        hist.try_reserve_exact(size)
            .map_err(|e| LdacError::OutOfMemory(format!("abr history: {}", e)))?;
        hist.resize(size, 0);
        Ok(Self {
            hist,
            sum: 0,
            cnt: 0,
            idx: 0,
        })
    }

    /// 写入一个深度 (饱和到 u8), 返回上一次写入的深度
    pub(crate) fn push(&mut self, depth: u32) -> u32 {
        let len = self.hist.len();
        let prev = self.hist[(self.idx + len - 1) % len];
        let stored = u8::try_from(depth).unwrap_or(u8::MAX);
        self.sum = self.sum.saturating_sub(u32::from(self.hist[self.idx]));
        self.hist[self.idx] = stored;
        self.idx = (self.idx + 1) % len;
        self.sum = self.sum.saturating_add(u32::from(stored));
        self.cnt = self.cnt.saturating_add(1);
        u32::from(prev)
    }

    pub(crate) fn sum(&self) -> u32 {
        self.sum
    }

    pub(crate) fn count(&self) -> usize {
        self.cnt
    }

    pub(crate) fn set_count(&mut self, cnt: usize) {
        self.cnt = cnt;
    }
}
