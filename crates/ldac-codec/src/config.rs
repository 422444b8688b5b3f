//! 流配置与帧头.
//!
//! 采样率决定变换长度 (1fs 为 128 点, 2fs 为 256 点), 声道配置决定帧内音频块的排列.
//! 帧头共 3 字节: 同步字、采样率索引、声道配置索引、帧长与帧状态.

use ldac_core::bitreader::BitReader;
use ldac_core::bitwriter::BitWriter;
use ldac_core::{ChannelMode, LdacError, LdacResult};

use crate::block::{Gradient, WordLengthShape};
use crate::consts::{
    BYTE_BITS, CHCONFIG_BITS, FRAME_HEADER_BYTES, FRAMELEN_BITS, FRAMESTAT_BITS, MAX_FRAME_LENGTH,
    SMPLRATE_BITS, SYNCWORD, SYNCWORD_BITS,
};
use crate::tables::MAX_NBANDS;

/// 采样率
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SamplingRate {
    /// 44.1 kHz
    Hz44100,
    /// 48 kHz
    Hz48000,
    /// 88.2 kHz
    Hz88200,
    /// 96 kHz
    Hz96000,
}

impl SamplingRate {
    /// 所有支持的采样率
    pub const ALL: [Self; 4] = [Self::Hz44100, Self::Hz48000, Self::Hz88200, Self::Hz96000];

    /// 采样率索引
    pub const fn id(self) -> u32 {
        match self {
            Self::Hz44100 => 0,
            Self::Hz48000 => 1,
            Self::Hz88200 => 2,
            Self::Hz96000 => 3,
        }
    }

    /// 从采样率索引解析
    pub fn from_id(id: u32) -> LdacResult<Self> {
        Self::ALL
            .get(id as usize)
            .copied()
            .ok_or(LdacError::SamplingRate(id))
    }

    /// 从赫兹值解析
    pub fn from_hz(hz: u32) -> LdacResult<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|sr| sr.hz() == hz)
            .ok_or(LdacError::SamplingRate(hz))
    }

    /// 赫兹值
    pub const fn hz(self) -> u32 {
        match self {
            Self::Hz44100 => 44_100,
            Self::Hz48000 => 48_000,
            Self::Hz88200 => 88_200,
            Self::Hz96000 => 96_000,
        }
    }

    /// 是否为 2fs (88.2/96 kHz)
    pub const fn is_double_rate(self) -> bool {
        matches!(self, Self::Hz88200 | Self::Hz96000)
    }

    /// 变换长度的以 2 为底对数
    pub const fn nlnn(self) -> u32 {
        if self.is_double_rate() { 8 } else { 7 }
    }

    /// 每帧每声道采样数
    pub const fn frame_samples(self) -> usize {
        1 << self.nlnn()
    }

    /// 允许的最大 band 数量
    pub const fn max_nbands(self) -> usize {
        MAX_NBANDS[self.id() as usize]
    }
}

/// 音频块类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockType {
    /// 单声道块
    Mono,
    /// 立体声块
    Stereo,
}

impl BlockType {
    /// 块内声道数
    pub const fn channels(self) -> usize {
        match self {
            Self::Mono => 1,
            Self::Stereo => 2,
        }
    }
}

/// 声道配置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelConfig {
    /// 单声道: 一个单声道块
    Mono,
    /// 双单声道: 两个单声道块
    DualMono,
    /// 立体声: 一个立体声块
    Stereo,
}

impl ChannelConfig {
    /// 声道配置索引
    pub const fn id(self) -> u32 {
        match self {
            Self::Mono => 0,
            Self::DualMono => 1,
            Self::Stereo => 2,
        }
    }

    /// 从声道配置索引解析
    pub fn from_id(id: u32) -> LdacResult<Self> {
        match id {
            0 => Ok(Self::Mono),
            1 => Ok(Self::DualMono),
            2 => Ok(Self::Stereo),
            other => Err(LdacError::ChannelConfig(other)),
        }
    }

    /// 从会话声道模式转换
    pub fn from_mode(mode: ChannelMode) -> LdacResult<Self> {
        Self::from_id(mode.channel_config_id()?)
    }

    /// 对应的会话声道模式
    pub fn mode(self) -> ChannelMode {
        match self {
            Self::Mono => ChannelMode::MONO,
            Self::DualMono => ChannelMode::DUAL_CHANNEL,
            Self::Stereo => ChannelMode::STEREO,
        }
    }

    /// 帧内音频块排列
    pub const fn blocks(self) -> &'static [BlockType] {
        match self {
            Self::Mono => &[BlockType::Mono],
            Self::DualMono => &[BlockType::Mono, BlockType::Mono],
            Self::Stereo => &[BlockType::Stereo],
        }
    }

    /// PCM 声道数
    pub const fn channels(self) -> usize {
        match self {
            Self::Mono => 1,
            Self::DualMono | Self::Stereo => 2,
        }
    }
}

/// 帧头
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// 采样率
    pub sampling_rate: SamplingRate,
    /// 声道配置
    pub channel_config: ChannelConfig,
    /// 帧长 (字节, 不含帧头)
    pub frame_length: usize,
    /// 帧状态
    pub frame_status: u32,
}

impl FrameHeader {
    /// 序列化为 3 字节帧头
    pub fn write(&self) -> LdacResult<[u8; FRAME_HEADER_BYTES]> {
        check_frame_length(self.frame_length)?;
        let mut bw = BitWriter::with_capacity(FRAME_HEADER_BYTES);
        bw.write_bits(SYNCWORD, SYNCWORD_BITS);
        bw.write_bits(self.sampling_rate.id(), SMPLRATE_BITS);
        bw.write_bits(self.channel_config.id(), CHCONFIG_BITS);
        bw.write_bits((self.frame_length - 1) as u32, FRAMELEN_BITS);
        bw.write_bits(self.frame_status, FRAMESTAT_BITS);
        let data = bw.finish();
        let mut header = [0u8; FRAME_HEADER_BYTES];
        header.copy_from_slice(&data[..FRAME_HEADER_BYTES]);
        Ok(header)
    }

    /// 解析帧头
    pub fn parse(bytes: &[u8]) -> LdacResult<Self> {
        if bytes.len() < FRAME_HEADER_BYTES {
            return Err(LdacError::InputBufferSize(bytes.len()));
        }
        let mut br = BitReader::new(bytes);
        let sync = br.read_bits(SYNCWORD_BITS);
        if sync != SYNCWORD {
            return Err(LdacError::IllegalSyncword(sync));
        }
        let sampling_rate = SamplingRate::from_id(br.read_bits(SMPLRATE_BITS))?;
        let channel_config = ChannelConfig::from_id(br.read_bits(CHCONFIG_BITS))?;
        let frame_length = br.read_bits(FRAMELEN_BITS) as usize + 1;
        let frame_status = br.read_bits(FRAMESTAT_BITS);
        Ok(Self {
            sampling_rate,
            channel_config,
            frame_length,
            frame_status,
        })
    }

    /// 含帧头的整帧字节数
    pub const fn frame_bytes(&self) -> usize {
        self.frame_length + FRAME_HEADER_BYTES
    }
}

fn check_frame_length(frame_length: usize) -> LdacResult<()> {
    if frame_length == 0 || frame_length > MAX_FRAME_LENGTH {
        return Err(LdacError::FrameLength(frame_length));
    }
    Ok(())
}

/// 流配置
///
/// 会话初始化时确定; 之后只有帧长可以在帧与帧之间变化.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConfig {
    /// 采样率
    pub sampling_rate: SamplingRate,
    /// 声道配置
    pub channel_config: ChannelConfig,
    /// 帧长 (字节, 不含帧头)
    frame_length: usize,
    /// 帧状态
    pub frame_status: u32,
}

impl StreamConfig {
    /// 创建流配置, 校验帧长
    pub fn new(
        sampling_rate: SamplingRate,
        channel_config: ChannelConfig,
        frame_length: usize,
    ) -> LdacResult<Self> {
        check_frame_length(frame_length)?;
        Ok(Self {
            sampling_rate,
            channel_config,
            frame_length,
            frame_status: 0,
        })
    }

    /// 由帧头构造
    pub fn from_header(header: &FrameHeader) -> LdacResult<Self> {
        let mut config = Self::new(
            header.sampling_rate,
            header.channel_config,
            header.frame_length,
        )?;
        config.frame_status = header.frame_status;
        Ok(config)
    }

    /// 帧长 (字节, 不含帧头)
    pub const fn frame_length(&self) -> usize {
        self.frame_length
    }

    /// 修改帧长
    pub fn set_frame_length(&mut self, frame_length: usize) -> LdacResult<()> {
        check_frame_length(frame_length)?;
        self.frame_length = frame_length;
        Ok(())
    }

    /// 对应的帧头
    pub fn header(&self) -> FrameHeader {
        FrameHeader {
            sampling_rate: self.sampling_rate,
            channel_config: self.channel_config,
            frame_length: self.frame_length,
            frame_status: self.frame_status,
        }
    }

    /// 帧内音频块数量
    pub const fn nblocks(&self) -> usize {
        self.channel_config.blocks().len()
    }

    /// 每个音频块的比特预算
    pub const fn block_budget_bits(&self) -> usize {
        (self.frame_length / self.nblocks()) * BYTE_BITS
    }
}

/// 编码参数: 初始 band 数量与梯度
///
/// 比特分配从这里出发搜索偏移量, 空间不足时可自动减少 band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeSetting {
    /// 初始 band 数量
    pub nbands: usize,
    /// 初始梯度
    pub gradient: Gradient,
    /// 是否允许自动减少 band
    pub band_control: bool,
}

impl EncodeSetting {
    /// 按单声道帧长选择编码参数
    pub fn for_frame_length(frmlen_1ch: usize, sampling_rate: SamplingRate) -> Self {
        let double = sampling_rate.is_double_rate();
        let pick = |one_fs: usize, two_fs: usize| if double { two_fs } else { one_fs };
        let (nbands, gradient) = if frmlen_1ch >= 110 {
            (
                pick(10, 16),
                Gradient::Explicit {
                    qu_l: 0,
                    qu_h: 28,
                    os_l: 0,
                    os_h: 10,
                },
            )
        } else if frmlen_1ch >= 82 {
            (pick(10, 14), Gradient::shaped(WordLengthShape::Half, 0, 0))
        } else if frmlen_1ch >= 66 {
            (pick(9, 12), Gradient::shaped(WordLengthShape::Half, 0, 0))
        } else {
            (
                pick(8, 10),
                Gradient::shaped(WordLengthShape::ThreeEighths, 0, 0),
            )
        };
        Self {
            nbands: nbands.min(sampling_rate.max_nbands()),
            gradient,
            band_control: true,
        }
    }
}
