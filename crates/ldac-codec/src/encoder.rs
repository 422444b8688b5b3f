//! LDAC 帧编码器.
//!
//! 每次输入一帧平面 PCM (每声道 `frame_samples` 个采样), 输出一个含帧头的完整帧.
//! 流程: 时域缓冲移位, MDCT, 计算比例因子索引, 逐块比特分配, 量化, 打包.
//! 比特分配在最少 band 下仍无解时输出空帧.

use bitflags::bitflags;
use log::{debug, trace, warn};

use ldac_core::{LdacError, LdacResult, SampleFormat};

use crate::bitalloc::{
    MIN_NBANDS, allocate_block, choose_scale_factor_coding, reconst_block_word_lengths,
    reconst_gradient,
};
use crate::block::{AudioBlock, Gradient, WordLengthShape, build_blocks};
use crate::config::{EncodeSetting, StreamConfig};
use crate::consts::{FRAME_HEADER_BYTES, MAXGRADOS, MAXNQUS};
use crate::dsp::{FixedPath, SignalPath};
use crate::pack::pack_frame;
use crate::tables::{ISP, NSPS};

bitflags! {
    /// 编码告警 (非致命)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct EncodeWarnings: u32 {
        /// 比特预算不足, 自动减少了 band
        const BAND_REDUCED = 0x01;
        /// 比特分配失败, 输出空帧
        const NULL_FRAME   = 0x02;
    }
}

/// 编码输出的一帧
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedFrame {
    /// 含 3 字节帧头的整帧数据
    pub data: Vec<u8>,
    /// 编码告警
    pub warnings: EncodeWarnings,
}

impl EncodedFrame {
    /// 帧头之后的帧数据
    pub fn payload(&self) -> &[u8] {
        &self.data[FRAME_HEADER_BYTES..]
    }
}

/// 校验编码参数与采样率匹配
fn check_setting(config: &StreamConfig, setting: &EncodeSetting) -> LdacResult<()> {
    let max = config.sampling_rate.max_nbands();
    if setting.nbands < MIN_NBANDS || setting.nbands > max {
        return Err(LdacError::InvalidArgument(format!(
            "band 数量 {} 超出范围 [{}, {}]",
            setting.nbands, MIN_NBANDS, max
        )));
    }
    Ok(())
}

/// 校验平面 PCM 输入, 返回每声道所需字节数
pub(crate) fn check_planes(
    planes_len: usize,
    plane_sizes: impl Iterator<Item = usize>,
    channels: usize,
    frame_samples: usize,
    format: SampleFormat,
) -> LdacResult<usize> {
    if planes_len != channels {
        return Err(LdacError::InvalidArgument(format!(
            "PCM 声道数 {} 与配置声道数 {} 不符",
            planes_len, channels
        )));
    }
    let need = frame_samples * format.bytes_per_sample();
    for size in plane_sizes {
        if size < need {
            return Err(LdacError::InputBufferSize(size));
        }
    }
    Ok(need)
}

/// 空块: 2 个 band, 比例因子与频谱全零
fn make_null_block<S>(block: &mut AudioBlock<S>) {
    block.set_nbands(MIN_NBANDS);
    block.ext_flag = false;
    block.gradient = Gradient::shaped(WordLengthShape::Half, 0, MAXGRADOS);
    block.nadjqus = 0;
    let nqus = block.nqus;
    reconst_gradient(&block.gradient, 0, nqus, &mut block.grad);

    let reference = [0i32; MAXNQUS];
    for (ich, ch) in block.channels.iter_mut().enumerate() {
        ch.idsf = [0; MAXNQUS];
        ch.sfc = choose_scale_factor_coding(ich, &ch.idsf[..nqus], &reference[..nqus]).1;
        ch.clear_quantized();
    }
    reconst_block_word_lengths(block);
}

/// 按已分配的字长量化块内各声道
fn quantize_block<P: SignalPath>(block: &mut AudioBlock<P::Sample>) {
    let nqus = block.nqus;
    for ch in &mut block.channels {
        ch.clear_quantized();
        for iqu in 0..nqus {
            let (lsp, hsp) = (ISP[iqu], ISP[iqu + 1]);
            P::quantize(
                &ch.spec[lsp..hsp],
                ch.idsf[iqu],
                ch.idwl1[iqu],
                ch.idwl2[iqu],
                &mut ch.qspec[lsp..hsp],
                &mut ch.rspec[lsp..hsp],
            );
            // 2 维码表没有 (-1, -1), 把幅度较小的一个置零
            if ch.idwl1[iqu] == 1
                && NSPS[iqu] == 2
                && ch.qspec[lsp] == -1
                && ch.qspec[lsp + 1] == -1
            {
                if P::magnitude(ch.spec[lsp]) < P::magnitude(ch.spec[lsp + 1]) {
                    ch.qspec[lsp] = 0;
                } else {
                    ch.qspec[lsp + 1] = 0;
                }
            }
        }
    }
}

/// LDAC 帧编码器
///
/// `P` 选择数值通路, 默认使用定点通路.
pub struct LdacEncoder<P: SignalPath = FixedPath> {
    config: StreamConfig,
    setting: EncodeSetting,
    blocks: Vec<AudioBlock<P::Sample>>,
    frame_count: u64,
}

impl<P: SignalPath> LdacEncoder<P> {
    /// 创建编码器
    pub fn new(config: StreamConfig, setting: EncodeSetting) -> LdacResult<Self> {
        check_setting(&config, &setting)?;
        let blocks = build_blocks(config.channel_config.blocks())?;
        debug!(
            "打开 LDAC 编码器 ({}): {} Hz, {:?}, 帧长 {}, nbands {}",
            P::NAME,
            config.sampling_rate.hz(),
            config.channel_config,
            config.frame_length(),
            setting.nbands
        );
        Ok(Self {
            config,
            setting,
            blocks,
            frame_count: 0,
        })
    }

    /// 流配置
    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// 编码参数
    pub fn setting(&self) -> &EncodeSetting {
        &self.setting
    }

    /// 每帧每声道采样数
    pub fn frame_samples(&self) -> usize {
        self.config.sampling_rate.frame_samples()
    }

    /// 已编码帧数
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// 修改帧长, 从下一帧生效
    pub fn set_frame_length(&mut self, frame_length: usize) -> LdacResult<()> {
        self.config.set_frame_length(frame_length)?;
        debug!("编码帧长更新为 {}", frame_length);
        Ok(())
    }

    /// 修改编码参数, 从下一帧生效
    pub fn set_setting(&mut self, setting: EncodeSetting) -> LdacResult<()> {
        check_setting(&self.config, &setting)?;
        self.setting = setting;
        Ok(())
    }

    /// 编码一帧
    ///
    /// `planes` 每声道一个缓冲, 至少含 `frame_samples` 个 `format` 格式的采样.
    pub fn encode<T: AsRef<[u8]>>(
        &mut self,
        planes: &[T],
        format: SampleFormat,
    ) -> LdacResult<EncodedFrame> {
        let sampling_rate = self.config.sampling_rate;
        let nlnn = sampling_rate.nlnn();
        let n = sampling_rate.frame_samples();
        let need = check_planes(
            planes.len(),
            planes.iter().map(|p| p.as_ref().len()),
            self.config.channel_config.channels(),
            n,
            format,
        )?;
        let bps = format.bytes_per_sample();

        let channels = self.blocks.iter_mut().flat_map(|b| b.channels.iter_mut());
        for (ch, plane) in channels.zip(planes) {
            ch.time.copy_within(n..2 * n, 0);
            for (dst, bytes) in ch.time[n..2 * n]
                .iter_mut()
                .zip(plane.as_ref()[..need].chunks_exact(bps))
            {
                *dst = P::pcm_to_time(format, bytes);
            }
            P::mdct(&ch.time[..2 * n], &mut ch.spec[..n], nlnn);
            for iqu in 0..MAXNQUS {
                let (lsp, hsp) = (ISP[iqu], ISP[iqu + 1]);
                ch.idsf[iqu] = if hsp <= n {
                    P::scale_factor_index(&ch.spec[lsp..hsp])
                } else {
                    0
                };
            }
        }

        let budget = self.config.block_budget_bits();
        let mut warnings = EncodeWarnings::empty();
        let mut failure = None;
        for (iblk, block) in self.blocks.iter_mut().enumerate() {
            match allocate_block(block, &self.setting, budget) {
                Ok(alloc) => {
                    if alloc.band_reduced {
                        debug!(
                            "块 {} band 数量 {} -> {}",
                            iblk, self.setting.nbands, alloc.nbands
                        );
                        warnings |= EncodeWarnings::BAND_REDUCED;
                    }
                }
                Err(err) => {
                    failure = Some(err);
                    break;
                }
            }
        }

        if let Some(err) = failure {
            warn!("第 {} 帧输出空帧: {}", self.frame_count, err);
            for block in &mut self.blocks {
                make_null_block(block);
            }
            warnings = EncodeWarnings::NULL_FRAME;
        } else {
            for block in &mut self.blocks {
                quantize_block::<P>(block);
            }
        }

        let data = pack_frame(&self.config.header(), &self.blocks)?;
        trace!(
            "编码第 {} 帧: {} 字节, 告警 {:?}",
            self.frame_count,
            data.len(),
            warnings
        );
        self.frame_count += 1;
        Ok(EncodedFrame { data, warnings })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ChannelConfig, FrameHeader, SamplingRate};
    use crate::dsp::FloatPath;
    use crate::dsp::test_util::test_signal;

    fn s16_planes(channels: usize, n: usize, seed: u32) -> Vec<Vec<u8>> {
        (0..channels)
            .map(|c| {
                test_signal(n, seed + c as u32)
                    .iter()
                    .flat_map(|s| s.to_le_bytes())
                    .collect()
            })
            .collect()
    }

    fn encoder<P: SignalPath>(cc: ChannelConfig, frame_length: usize) -> LdacEncoder<P> {
        let sr = SamplingRate::Hz48000;
        let config = StreamConfig::new(sr, cc, frame_length).expect("创建流配置失败");
        let setting = EncodeSetting::for_frame_length((frame_length + 3) / cc.channels(), sr);
        LdacEncoder::new(config, setting).expect("创建编码器失败")
    }

    #[test]
    fn test_encode_frame_layout() {
        let mut enc = encoder::<FixedPath>(ChannelConfig::Stereo, 327);
        let planes = s16_planes(2, 128, 3);
        let refs: Vec<&[u8]> = planes.iter().map(Vec::as_slice).collect();
        for _ in 0..3 {
            let frame = enc.encode(&refs, SampleFormat::S16).expect("编码失败");
            assert_eq!(frame.data.len(), 330);
            assert_eq!(frame.payload().len(), 327);
            let header = FrameHeader::parse(&frame.data);
            assert_eq!(header.map(|h| h.frame_length).ok(), Some(327));
            assert!(!frame.warnings.contains(EncodeWarnings::NULL_FRAME));
        }
        assert_eq!(enc.frame_count(), 3);
    }

    #[test]
    fn test_encode_deterministic() {
        let planes = s16_planes(2, 128 * 4, 9);
        let run = || {
            let mut enc = encoder::<FixedPath>(ChannelConfig::DualMono, 217);
            let mut out = Vec::new();
            for i in 0..4 {
                let chunk: Vec<&[u8]> = planes
                    .iter()
                    .map(|p| &p[i * 256..(i + 1) * 256])
                    .collect();
                let frame = enc.encode(&chunk, SampleFormat::S16).expect("编码失败");
                out.extend(frame.data);
            }
            out
        };
        assert_eq!(run(), run(), "相同输入应得到相同码流");
    }

    #[test]
    fn test_encode_rejects_bad_input() {
        let mut enc = encoder::<FixedPath>(ChannelConfig::Stereo, 327);
        let plane = vec![0u8; 256];
        assert!(matches!(
            enc.encode(&[&plane], SampleFormat::S16),
            Err(LdacError::InvalidArgument(_))
        ));
        let short = vec![0u8; 100];
        assert!(matches!(
            enc.encode(&[&plane, &short], SampleFormat::S16),
            Err(LdacError::InputBufferSize(100))
        ));
    }

    #[test]
    fn test_encode_null_frame_fallback() {
        let sr = SamplingRate::Hz48000;
        let config = StreamConfig::new(sr, ChannelConfig::Mono, 12).expect("创建流配置失败");
        let setting = EncodeSetting {
            nbands: 10,
            gradient: Gradient::default(),
            band_control: false,
        };
        let mut enc = LdacEncoder::<FixedPath>::new(config, setting).expect("创建编码器失败");
        let planes = s16_planes(1, 128, 5);
        let frame = enc.encode(&[&planes[0]], SampleFormat::S16).expect("空帧编码失败");
        assert_eq!(frame.warnings, EncodeWarnings::NULL_FRAME);
        assert_eq!(frame.data.len(), 15);
    }

    #[test]
    fn test_encode_band_reduction_warning() {
        // 8 个 band 仅频谱就需要 180 位
        let mut enc = encoder::<FixedPath>(ChannelConfig::Mono, 24);
        let planes = s16_planes(1, 128 * 3, 11);
        let mut seen = EncodeWarnings::empty();
        for i in 0..3 {
            let frame = enc
                .encode(&[&planes[0][i * 256..(i + 1) * 256]], SampleFormat::S16)
                .expect("编码失败");
            seen |= frame.warnings;
        }
        assert!(!seen.is_empty(), "预算很小时应产生告警");
    }

    #[test]
    fn test_float_path_encoder() {
        let mut enc = encoder::<FloatPath>(ChannelConfig::Stereo, 217);
        let planes = s16_planes(2, 128, 21);
        let refs: Vec<&[u8]> = planes.iter().map(Vec::as_slice).collect();
        let frame = enc.encode(&refs, SampleFormat::S16);
        assert_eq!(frame.map(|f| f.data.len()).ok(), Some(220));
    }

    #[test]
    fn test_setting_validation() {
        let config = StreamConfig::new(SamplingRate::Hz44100, ChannelConfig::Mono, 100)
            .expect("创建流配置失败");
        let mut setting = EncodeSetting::for_frame_length(103, SamplingRate::Hz44100);
        setting.nbands = 16;
        assert!(LdacEncoder::<FixedPath>::new(config, setting).is_err());
        setting.nbands = 1;
        assert!(LdacEncoder::<FixedPath>::new(config, setting).is_err());
    }
}
