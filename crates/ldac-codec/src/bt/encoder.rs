//! 蓝牙编码会话.
//!
//! 输入每次 128 个交错采样 (每声道), 内部环形缓冲攒满一帧后编码.
//! 编码出的帧 (含 3 字节帧头) 依次写入传输缓冲, 满足出包条件时整体作为一个 [`Packet`] 输出.
//!
//! 质量模式切换只设置目标帧长, 实际帧长在下一次编码前按以下状态机生效:
//! - 传输缓冲为空: 立即生效
//! - 新模式每包帧数更多: 尽量缩短当前包剩余帧的帧长使其装得下 (ACTIVE), 否则立即出包 (FLASH)
//! - 其他情况: 等当前包输出后再生效 (STANDBY)

use std::mem;

use bytes::Bytes;
use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};

use ldac_core::error::{ERR_BIT_ALLOCATION, ERR_NONE, pack_error_code};
use ldac_core::{ChannelMode, LdacError, LdacResult, SampleFormat};

use super::eqmid::{AlterPriority, Eqmid};
use super::ring::PcmRing;
use super::{
    ENC_LSU, MTU_REQUIRED, NFRM_TX_MAX, PCM_RING_BYTES, STREAM_BUF_BYTES, TX_HEADER_SIZE,
    frame_length_to_bitrate,
};
use crate::config::{ChannelConfig, EncodeSetting, SamplingRate, StreamConfig};
use crate::consts::FRAME_HEADER_BYTES;
use crate::dsp::{FixedPath, SignalPath};
use crate::encoder::{EncodeWarnings, LdacEncoder};
use crate::frame::deinterleave_into;
use crate::packet::Packet;

/// 质量切换状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AlterState {
    /// 无待生效切换
    #[default]
    Non,
    /// 已缩短当前包剩余帧的帧长
    Active,
    /// 等待当前包输出
    Standby,
    /// 需要立即输出当前包
    Flash,
}

/// 编码会话配置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BtEncoderConfig {
    /// 链路 MTU
    pub mtu: usize,
    /// 初始质量模式
    pub eqmid: Eqmid,
    /// 声道模式
    pub channel_mode: ChannelMode,
    /// 输入采样格式
    pub sample_format: SampleFormat,
    /// 采样率 (Hz)
    pub sampling_rate: u32,
}

impl Default for BtEncoderConfig {
    fn default() -> Self {
        Self {
            mtu: MTU_REQUIRED,
            eqmid: Eqmid::Sq,
            channel_mode: ChannelMode::STEREO,
            sample_format: SampleFormat::S16,
            sampling_rate: 48_000,
        }
    }
}

/// 一次编码调用的结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BtEncodeOutput {
    /// 本次消耗的 PCM 字节数
    pub pcm_used: usize,
    /// 输出的传输包
    pub packet: Option<Packet>,
    /// 本次编码帧的告警
    pub warnings: EncodeWarnings,
}

/// 传输帧缓冲
#[derive(Debug, Default)]
struct TransportBuffer {
    buf: Vec<u8>,
    nfrm_in: usize,
}

/// 蓝牙编码会话
pub struct BtEncoder<P: SignalPath = FixedPath> {
    encoder: LdacEncoder<P>,
    sample_format: SampleFormat,
    channels: usize,
    ring: PcmRing,
    tx: TransportBuffer,
    tx_size: usize,
    nfrm_in_pkt: usize,
    eqmid: Eqmid,
    tgt_eqmid: Eqmid,
    tgt_frame_length: usize,
    tgt_nfrm_in_pkt: usize,
    alter_state: AlterState,
    flushed: bool,
    bitrate: u32,
    error_code: u32,
    scratch: Vec<u8>,
    planes: Vec<Vec<u8>>,
}

impl<P: SignalPath> BtEncoder<P> {
    /// 创建编码会话
    pub fn new(config: BtEncoderConfig) -> LdacResult<Self> {
        if config.mtu < MTU_REQUIRED {
            return Err(LdacError::InvalidArgument(format!(
                "MTU {} 小于 {}",
                config.mtu, MTU_REQUIRED
            )));
        }
        let channel_config = ChannelConfig::from_mode(config.channel_mode)?;
        let sampling_rate = SamplingRate::from_hz(config.sampling_rate)?;
        let channels = channel_config.channels();

        let tx_size = (MTU_REQUIRED - TX_HEADER_SIZE).min(config.mtu - TX_HEADER_SIZE);
        let frame_length = config.eqmid.frame_length(channels);
        let setting = EncodeSetting::for_frame_length(config.eqmid.frmlen_1ch(), sampling_rate);
        let stream = StreamConfig::new(sampling_rate, channel_config, frame_length)?;
        let encoder = LdacEncoder::new(stream, setting)?;

        let stride = channels * config.sample_format.bytes_per_sample();
        let ring = PcmRing::new(PCM_RING_BYTES, stride)?;
        let mut buf = Vec::new();
        buf.try_reserve_exact(STREAM_BUF_BYTES)
            .map_err(|e| LdacError::OutOfMemory(format!("transport buffer: {}", e)))?;

        let nfrm_in_pkt = tx_size / (frame_length + FRAME_HEADER_BYTES);
        let bitrate = frame_length_to_bitrate(
            frame_length,
            sampling_rate.hz(),
            sampling_rate.frame_samples(),
        );
        debug!(
            "打开蓝牙编码会话: mtu {}, {:?}, {} Hz, {}, {} kbps",
            config.mtu, config.eqmid, config.sampling_rate, config.sample_format, bitrate
        );
        Ok(Self {
            encoder,
            sample_format: config.sample_format,
            channels,
            ring,
            tx: TransportBuffer { buf, nfrm_in: 0 },
            tx_size,
            nfrm_in_pkt,
            eqmid: config.eqmid,
            tgt_eqmid: config.eqmid,
            tgt_frame_length: frame_length,
            tgt_nfrm_in_pkt: nfrm_in_pkt,
            alter_state: AlterState::Non,
            flushed: false,
            bitrate,
            error_code: ERR_NONE,
            scratch: Vec::new(),
            planes: vec![Vec::new(); channels],
        })
    }

    /// 目标质量模式
    pub fn eqmid(&self) -> Eqmid {
        self.tgt_eqmid
    }

    /// 当前生效的质量模式
    pub fn current_eqmid(&self) -> Eqmid {
        self.eqmid
    }

    /// 当前帧长 (不含帧头)
    pub fn frame_length(&self) -> usize {
        self.encoder.config().frame_length()
    }

    /// 当前码率 (kbps)
    pub fn bitrate(&self) -> u32 {
        self.bitrate
    }

    /// 采样率 (Hz)
    pub fn sampling_rate(&self) -> u32 {
        self.encoder.config().sampling_rate.hz()
    }

    /// 质量切换状态
    pub fn alter_state(&self) -> AlterState {
        self.alter_state
    }

    /// 最近一次调用的打包错误码
    pub fn error_code(&self) -> u32 {
        self.error_code
    }

    /// 每次输入所需的交错 PCM 字节数
    pub fn input_chunk_bytes(&self) -> usize {
        ENC_LSU * self.channels * self.sample_format.bytes_per_sample()
    }

    fn record<T>(&mut self, result: LdacResult<T>) -> LdacResult<T> {
        if let Err(err) = &result {
            self.error_code = err.packed_code();
        }
        result
    }

    fn set_target(&mut self, eqmid: Eqmid) {
        self.tgt_eqmid = eqmid;
        self.tgt_frame_length = eqmid.frame_length(self.channels);
        self.tgt_nfrm_in_pkt = eqmid.nfrm_in_pkt();
        debug!(
            "目标质量模式 {:?}, 目标帧长 {}",
            eqmid, self.tgt_frame_length
        );
    }

    /// 设置目标质量模式
    pub fn set_eqmid(&mut self, eqmid: Eqmid) {
        self.error_code = ERR_NONE;
        self.set_target(eqmid);
    }

    /// 按方向调整一级质量模式, 已到端点时返回 `AlterEqmidLimited`
    pub fn alter_eqmid_priority(&mut self, priority: AlterPriority) -> LdacResult<()> {
        self.error_code = ERR_NONE;
        let result = self
            .tgt_eqmid
            .altered(priority)
            .ok_or(LdacError::AlterEqmidLimited);
        let target = self.record(result)?;
        self.set_target(target);
        Ok(())
    }

    /// 实际修改编码帧长, 同步编码参数、每包帧数与码率
    fn update_frame_length(&mut self, frame_length: usize) -> LdacResult<()> {
        let config = *self.encoder.config();
        let frmlen_1ch = (frame_length + FRAME_HEADER_BYTES) / self.channels;
        let setting = EncodeSetting::for_frame_length(frmlen_1ch, config.sampling_rate);
        self.encoder.set_frame_length(frame_length)?;
        self.encoder.set_setting(setting)?;
        self.nfrm_in_pkt = self.tx_size / (frame_length + FRAME_HEADER_BYTES);
        self.bitrate = frame_length_to_bitrate(
            frame_length,
            config.sampling_rate.hz(),
            config.sampling_rate.frame_samples(),
        );
        if frame_length == self.tgt_frame_length {
            self.eqmid = self.tgt_eqmid;
        }
        Ok(())
    }

    /// 尝试缩短当前包剩余帧的帧长, 成功返回 true
    fn shrink_remaining(&mut self, check_minimum: bool) -> bool {
        let mut remaining = self.tgt_nfrm_in_pkt.saturating_sub(self.tx.nfrm_in);
        let min_frame_length = Eqmid::Mq.frame_length(self.channels);
        while remaining > 0 {
            let room = self.tx_size.saturating_sub(self.tx.buf.len()) / remaining;
            let mut adj = room.min(self.tgt_frame_length);
            if check_minimum {
                adj = adj.saturating_sub(FRAME_HEADER_BYTES);
                if adj >= min_frame_length && self.update_frame_length(adj).is_ok() {
                    return true;
                }
            } else {
                return self.update_frame_length(adj).is_ok();
            }
            remaining -= 1;
        }
        false
    }

    /// 在编码前按切换状态机应用目标帧长
    fn apply_pending_alteration(&mut self) -> LdacResult<()> {
        let pending_eqmid = self.tgt_eqmid != self.eqmid;
        if !pending_eqmid && self.tgt_frame_length == self.frame_length() {
            return Ok(());
        }
        if self.tx.nfrm_in == 0
            || (!pending_eqmid && self.tgt_nfrm_in_pkt == self.nfrm_in_pkt)
        {
            self.update_frame_length(self.tgt_frame_length)?;
            self.alter_state = AlterState::Non;
        } else if self.tgt_nfrm_in_pkt > self.nfrm_in_pkt {
            if self.alter_state == AlterState::Non
                && self.tgt_nfrm_in_pkt > self.tx.nfrm_in
            {
                self.alter_state = if self.shrink_remaining(pending_eqmid) {
                    AlterState::Active
                } else {
                    AlterState::Flash
                };
                debug!(
                    "质量切换: {:?}, 帧长 {}",
                    self.alter_state,
                    self.frame_length()
                );
            }
        } else {
            self.alter_state = AlterState::Standby;
        }
        Ok(())
    }

    /// 取出传输缓冲中的所有帧, 有待生效切换时应用目标帧长
    fn take_packet(&mut self) -> LdacResult<Option<Packet>> {
        let packet = if self.tx.buf.is_empty() {
            None
        } else {
            let data = mem::replace(&mut self.tx.buf, Vec::with_capacity(STREAM_BUF_BYTES));
            Some(Packet::from_data(Bytes::from(data), self.tx.nfrm_in))
        };
        self.tx.nfrm_in = 0;
        if self.alter_state != AlterState::Non {
            self.update_frame_length(self.tgt_frame_length)?;
            self.alter_state = AlterState::Non;
        }
        Ok(packet)
    }

    /// 编码
    ///
    /// `pcm` 为 `Some` 时须恰好含 128 个交错采样 (每声道); 为 `None` 时冲刷:
    /// 缓冲中剩余的采样补零编码, 然后输出已积累的所有帧.
    pub fn encode(&mut self, pcm: Option<&[u8]>) -> LdacResult<BtEncodeOutput> {
        self.error_code = ERR_NONE;
        let result = self.encode_inner(pcm);
        self.record(result)
    }

    fn encode_inner(&mut self, pcm: Option<&[u8]>) -> LdacResult<BtEncodeOutput> {
        let frame_samples = self.encoder.frame_samples();
        let mut output = BtEncodeOutput::default();

        let do_encode = match pcm {
            Some(chunk) => {
                if chunk.len() != self.input_chunk_bytes() {
                    return Err(LdacError::InputBufferSize(chunk.len()));
                }
                output.pcm_used = self.ring.push(chunk);
                if output.pcm_used == 0 {
                    warn!("PCM 缓冲已满, 本次输入未被接收");
                }
                self.ring.samples() >= frame_samples
            }
            None if self.flushed => {
                // 冲刷完成后再次调用时输出残留的帧
                output.packet = self.take_packet()?;
                return Ok(output);
            }
            None => true,
        };
        if !do_encode {
            return Ok(output);
        }

        self.apply_pending_alteration()?;

        let next = self.tx.buf.len() + self.frame_length() + FRAME_HEADER_BYTES;
        if next > self.tx_size
            || self.alter_state == AlterState::Flash
            || next >= STREAM_BUF_BYTES
        {
            output.packet = self.take_packet()?;
        }

        let bps = self.sample_format.bytes_per_sample();
        let from_ring = self.ring.samples() > 0;
        if from_ring {
            self.ring.peek_frame(frame_samples, &mut self.scratch);
        } else {
            self.scratch.clear();
            self.scratch
                .resize(frame_samples * self.channels * bps, 0);
        }
        deinterleave_into(&self.scratch, bps, &mut self.planes)?;
        let frame = self.encoder.encode(&self.planes, self.sample_format)?;
        if from_ring {
            self.ring.consume(frame_samples);
        } else {
            self.flushed = true;
        }

        if frame.warnings.contains(EncodeWarnings::NULL_FRAME) {
            self.error_code = pack_error_code(ERR_BIT_ALLOCATION, ERR_BIT_ALLOCATION, ERR_NONE);
        }
        output.warnings = frame.warnings;
        let wrote = frame.data.len();
        self.tx.buf.extend_from_slice(&frame.data);
        self.tx.nfrm_in += 1;
        trace!(
            "传输缓冲: {} 帧, {} 字节",
            self.tx.nfrm_in,
            self.tx.buf.len()
        );

        if output.packet.is_none() {
            let next = self.tx.buf.len() + wrote;
            if next > self.tx_size
                || self.tx.nfrm_in >= NFRM_TX_MAX
                || next >= STREAM_BUF_BYTES
                || pcm.is_none()
            {
                output.packet = self.take_packet()?;
            }
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FrameHeader;
    use crate::dsp::test_util::test_signal;
    use ldac_core::error::{ERR_ALTER_EQMID_LIMITED, unpack_error_code};

    fn session(eqmid: Eqmid, channel_mode: ChannelMode) -> BtEncoder {
        let config = BtEncoderConfig {
            eqmid,
            channel_mode,
            ..BtEncoderConfig::default()
        };
        BtEncoder::new(config).expect("创建编码会话失败")
    }

    fn stereo_chunk(index: usize) -> Vec<u8> {
        let left = test_signal(128, index as u32 * 2);
        let right = test_signal(128, index as u32 * 2 + 1);
        left.iter()
            .zip(&right)
            .flat_map(|(l, r)| l.to_le_bytes().into_iter().chain(r.to_le_bytes()))
            .collect()
    }

    /// 检查包内每个帧头与帧长一致, 返回各帧帧长
    fn split_frames(packet: &Packet) -> Vec<usize> {
        let mut lengths = Vec::new();
        let mut pos = 0;
        while pos < packet.size() {
            let header = FrameHeader::parse(&packet.data[pos..]).expect("包内帧头错误");
            lengths.push(header.frame_length);
            pos += header.frame_bytes();
        }
        assert_eq!(pos, packet.size(), "帧应恰好填满包");
        lengths
    }

    #[test]
    fn test_config_validation() {
        let bad_mtu = BtEncoderConfig {
            mtu: 600,
            ..BtEncoderConfig::default()
        };
        assert!(BtEncoder::<FixedPath>::new(bad_mtu).is_err());
        let bad_mode = BtEncoderConfig {
            channel_mode: ChannelMode::STEREO | ChannelMode::MONO,
            ..BtEncoderConfig::default()
        };
        assert!(matches!(
            BtEncoder::<FixedPath>::new(bad_mode),
            Err(LdacError::ChannelMode(_))
        ));
        let bad_rate = BtEncoderConfig {
            sampling_rate: 32_000,
            ..BtEncoderConfig::default()
        };
        assert!(matches!(
            BtEncoder::<FixedPath>::new(bad_rate),
            Err(LdacError::SamplingRate(32_000))
        ));
    }

    #[test]
    fn test_packets_carry_whole_frames() {
        let mut enc = session(Eqmid::Sq, ChannelMode::STEREO);
        assert_eq!(enc.bitrate(), 660);
        let mut packets = Vec::new();
        for i in 0..12 {
            let out = enc.encode(Some(&stereo_chunk(i))).expect("编码失败");
            assert_eq!(out.pcm_used, 512);
            packets.extend(out.packet);
        }
        assert!(!packets.is_empty());
        for packet in &packets {
            assert!(packet.size() <= 661);
            assert_eq!(packet.frame_count, 3, "SQ 每包 3 帧");
            assert_eq!(split_frames(packet), vec![217; 3]);
        }
    }

    #[test]
    fn test_rejects_wrong_chunk_size() {
        let mut enc = session(Eqmid::Hq, ChannelMode::STEREO);
        let result = enc.encode(Some(&[0u8; 100]));
        assert!(matches!(result, Err(LdacError::InputBufferSize(100))));
        assert!(enc.error_code() != 0);
        assert!(ldac_core::error::is_fatal_code(enc.error_code()));
    }

    #[test]
    fn test_alter_limits_report_error() {
        let mut enc = session(Eqmid::Hq, ChannelMode::STEREO);
        assert!(matches!(
            enc.alter_eqmid_priority(AlterPriority::IncQuality),
            Err(LdacError::AlterEqmidLimited)
        ));
        assert_eq!(unpack_error_code(enc.error_code()).0, ERR_ALTER_EQMID_LIMITED);
        assert!(enc.alter_eqmid_priority(AlterPriority::IncConnection).is_ok());
        assert_eq!(enc.eqmid(), Eqmid::Sq);
        assert_eq!(enc.error_code(), 0);

        let mut low = session(Eqmid::Mq, ChannelMode::STEREO);
        assert!(low.alter_eqmid_priority(AlterPriority::IncConnection).is_err());
    }

    #[test]
    fn test_flush_emits_pending_frames() {
        // 96 kHz 每帧 256 采样, 一次输入只攒半帧
        let config = BtEncoderConfig {
            eqmid: Eqmid::Hq,
            sampling_rate: 96_000,
            ..BtEncoderConfig::default()
        };
        let mut enc: BtEncoder = BtEncoder::new(config).expect("创建编码会话失败");
        assert_eq!(enc.bitrate(), 990);
        let out = enc.encode(Some(&stereo_chunk(0))).expect("编码失败");
        assert_eq!(out.pcm_used, 512);
        assert!(out.packet.is_none(), "不足一帧时不应编码");

        // 第一次冲刷: 剩余半帧补零编码
        let first = enc.encode(None).ok().and_then(|o| o.packet);
        assert_eq!(first.map(|p| p.frame_count), Some(1));
        // 第二次冲刷: 缓冲已空, 编码一帧静音
        let second = enc.encode(None).ok().and_then(|o| o.packet);
        assert_eq!(second.map(|p| (p.frame_count, p.size())), Some((1, 330)));
        // 之后不再输出
        let third = enc.encode(None);
        assert_eq!(third.map(|o| o.packet.is_none()).ok(), Some(true));
    }

    #[test]
    fn test_alteration_applies_between_frames() {
        let mut enc = session(Eqmid::Hq, ChannelMode::STEREO);
        let mut lengths = Vec::new();
        for i in 0..40 {
            if i == 9 {
                enc.set_eqmid(Eqmid::Mq);
            }
            if let Ok(out) = enc.encode(Some(&stereo_chunk(i))) {
                if let Some(packet) = out.packet {
                    assert!(packet.size() <= 661);
                    lengths.extend(split_frames(&packet));
                }
            }
        }
        assert_eq!(lengths.first(), Some(&327));
        assert_eq!(lengths.last(), Some(&107));
        assert_eq!(enc.current_eqmid(), Eqmid::Mq);
        assert_eq!(enc.bitrate(), 330);
    }

    #[test]
    fn test_config_serde_defaults() {
        let config: Result<BtEncoderConfig, _> = serde_json::from_str(r#"{"eqmid":"HQ"}"#);
        let config = config.expect("解析配置失败");
        assert_eq!(config.eqmid, Eqmid::Hq);
        assert_eq!(config.mtu, MTU_REQUIRED);
        assert_eq!(config.sample_format, SampleFormat::S16);
    }
}
