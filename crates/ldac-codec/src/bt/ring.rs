//! 编码端交错 PCM 环形缓冲.

use ldac_core::LdacResult;

use crate::block::alloc_buffer;

/// 交错 PCM 环形缓冲
///
/// 以"采样帧" (所有声道的一个采样) 为单位计数.
#[derive(Debug)]
pub struct PcmRing {
    buf: Vec<u8>,
    rp: usize,
    wp: usize,
    nsmpl: usize,
    stride: usize,
}

impl PcmRing {
    /// 创建缓冲, `stride` 为一个采样帧的字节数
    pub fn new(capacity: usize, stride: usize) -> LdacResult<Self> {
        Ok(Self {
            buf: alloc_buffer(capacity, 0u8, "pcm ring")?,
            rp: 0,
            wp: 0,
            nsmpl: 0,
            stride,
        })
    }

    /// 缓冲中的采样帧数
    pub fn samples(&self) -> usize {
        self.nsmpl
    }

    /// 已占用字节数
    pub fn used_bytes(&self) -> usize {
        self.nsmpl * self.stride
    }

    /// 写入一块数据, 写入后占用须严格小于容量, 否则不写入并返回 0
    pub fn push(&mut self, chunk: &[u8]) -> usize {
        if self.used_bytes() + chunk.len() >= self.buf.len() {
            return 0;
        }
        let cap = self.buf.len();
        let first = chunk.len().min(cap - self.wp);
        self.buf[self.wp..self.wp + first].copy_from_slice(&chunk[..first]);
        let rest = chunk.len() - first;
        self.buf[..rest].copy_from_slice(&chunk[first..]);
        self.wp = (self.wp + chunk.len()) % cap;
        self.nsmpl += chunk.len() / self.stride;
        chunk.len()
    }

    /// 读出 `nsmpl` 个采样帧到 `out` (不移动读指针), 不足部分补零
    pub fn peek_frame(&self, nsmpl: usize, out: &mut Vec<u8>) {
        let cap = self.buf.len();
        let avail = self.nsmpl.min(nsmpl) * self.stride;
        out.clear();
        out.reserve(nsmpl * self.stride);
        let first = avail.min(cap - self.rp);
        out.extend_from_slice(&self.buf[self.rp..self.rp + first]);
        out.extend_from_slice(&self.buf[..avail - first]);
        out.resize(nsmpl * self.stride, 0);
    }

    /// 丢弃 `nsmpl` 个采样帧
    pub fn consume(&mut self, nsmpl: usize) {
        let n = nsmpl.min(self.nsmpl);
        self.rp = (self.rp + n * self.stride) % self.buf.len();
        self.nsmpl -= n;
        if self.nsmpl == 0 {
            self.rp = self.wp;
        }
    }
}
