//! 蓝牙解码会话.
//!
//! 每次输入从一个帧头开始的码流, 解码其中第一帧并输出交错 PCM.
//! 帧头中的采样率或声道配置与当前不同时自动重建解码器, 并以
//! `DEC_CONFIG_UPDATED` 错误码提示调用方, 但本帧照常解码.

use log::{debug, warn};

use ldac_core::error::{ERR_DEC_CONFIG_UPDATED, ERR_NONE, pack_error_code};
use ldac_core::{ChannelMode, LdacError, LdacResult, SampleFormat};

use super::{MIN_DECODE_BYTES, frame_length_to_bitrate};
use crate::config::{ChannelConfig, FrameHeader, SamplingRate, StreamConfig};
use crate::consts::FRAME_HEADER_BYTES;
use crate::decoder::LdacDecoder;
use crate::dsp::{FixedPath, SignalPath};
use crate::frame::interleave_into;

/// 一次解码调用的结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BtDecodeOutput<'a> {
    /// 消耗的码流字节数 (含帧头)
    pub used_bytes: usize,
    /// 交错 PCM, 指向会话内部缓冲, 下一次解码前有效
    pub pcm: &'a [u8],
    /// 本帧触发了解码器重建
    pub config_updated: bool,
}

/// 蓝牙解码会话
pub struct BtDecoder<P: SignalPath = FixedPath> {
    decoder: LdacDecoder<P>,
    planes: Vec<Vec<u8>>,
    pcm: Vec<u8>,
    bitrate: u32,
    error_code: u32,
}

impl<P: SignalPath> BtDecoder<P> {
    /// 创建解码会话, 帧长在收到第一个帧头前按 HQ 暂定
    pub fn new(channel_mode: ChannelMode, sampling_rate: u32) -> LdacResult<Self> {
        let channel_config = ChannelConfig::from_mode(channel_mode)?;
        let sampling_rate = SamplingRate::from_hz(sampling_rate)?;
        let channels = channel_config.channels();
        let frame_length = 330 * channels / 2 - FRAME_HEADER_BYTES;
        let config = StreamConfig::new(sampling_rate, channel_config, frame_length)?;
        Ok(Self {
            decoder: LdacDecoder::new(config)?,
            planes: vec![Vec::new(); channels],
            pcm: Vec::new(),
            bitrate: 0,
            error_code: ERR_NONE,
        })
    }

    /// 当前流配置
    pub fn config(&self) -> &StreamConfig {
        self.decoder.config()
    }

    /// 最近一帧的码率 (kbps)
    pub fn bitrate(&self) -> u32 {
        self.bitrate
    }

    /// 最近一次调用的打包错误码
    pub fn error_code(&self) -> u32 {
        self.error_code
    }

    /// 解码码流开头的一帧
    pub fn decode(
        &mut self,
        stream: &[u8],
        format: SampleFormat,
    ) -> LdacResult<BtDecodeOutput<'_>> {
        self.error_code = ERR_NONE;
        match self.decode_inner(stream, format) {
            Ok((used_bytes, config_updated)) => Ok(BtDecodeOutput {
                used_bytes,
                pcm: &self.pcm,
                config_updated,
            }),
            Err(err) => {
                self.pcm.clear();
                self.error_code = err.packed_code();
                Err(err)
            }
        }
    }

    /// 返回 (消耗字节数, 是否重建)
    fn decode_inner(&mut self, stream: &[u8], format: SampleFormat) -> LdacResult<(usize, bool)> {
        if stream.len() < MIN_DECODE_BYTES {
            return Err(LdacError::InputBufferSize(stream.len()));
        }
        let header = FrameHeader::parse(stream)?;

        let current = *self.decoder.config();
        let config_updated = header.sampling_rate != current.sampling_rate
            || header.channel_config != current.channel_config;
        if config_updated {
            debug!(
                "流配置变化: {} Hz {:?} -> {} Hz {:?}",
                current.sampling_rate.hz(),
                current.channel_config,
                header.sampling_rate.hz(),
                header.channel_config
            );
            self.decoder = LdacDecoder::new(StreamConfig::from_header(&header)?)?;
            self.planes = vec![Vec::new(); header.channel_config.channels()];
            self.error_code = pack_error_code(ERR_DEC_CONFIG_UPDATED, ERR_NONE, ERR_NONE);
        }
        self.decoder.set_frame_length(header.frame_length)?;
        self.decoder.set_frame_status(header.frame_status);

        if stream.len() < header.frame_bytes() {
            warn!(
                "码流不足一帧: {} < {} 字节",
                stream.len(),
                header.frame_bytes()
            );
            return Err(LdacError::InputBufferSize(stream.len()));
        }
        let used = self
            .decoder
            .decode(&stream[FRAME_HEADER_BYTES..], format, &mut self.planes)?
            + FRAME_HEADER_BYTES;

        self.bitrate = frame_length_to_bitrate(
            used - FRAME_HEADER_BYTES,
            header.sampling_rate.hz(),
            header.sampling_rate.frame_samples(),
        );
        interleave_into(&self.planes, format.bytes_per_sample(), &mut self.pcm);
        Ok((used, config_updated))
    }
}
