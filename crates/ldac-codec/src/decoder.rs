//! LDAC 帧解码器.
//!
//! 输入帧头之后的帧数据, 严格解包后反量化、IMDCT, 输出平面 PCM.
//! 解包失败时不写出任何 PCM, 时域重叠缓冲也保持不变.

use log::{debug, trace, warn};

use ldac_core::{LdacError, LdacResult, SampleFormat};

use crate::block::{AudioBlock, build_blocks};
use crate::config::StreamConfig;
use crate::dsp::{FixedPath, SignalPath};
use crate::encoder::check_planes;
use crate::tables::ISP;
use crate::unpack::unpack_frame;

/// LDAC 帧解码器
pub struct LdacDecoder<P: SignalPath = FixedPath> {
    config: StreamConfig,
    blocks: Vec<AudioBlock<P::Sample>>,
    frame_count: u64,
}

impl<P: SignalPath> LdacDecoder<P> {
    /// 创建解码器
    pub fn new(config: StreamConfig) -> LdacResult<Self> {
        let blocks = build_blocks(config.channel_config.blocks())?;
        debug!(
            "打开 LDAC 解码器 ({}): {} Hz, {:?}",
            P::NAME,
            config.sampling_rate.hz(),
            config.channel_config
        );
        Ok(Self {
            config,
            blocks,
            frame_count: 0,
        })
    }

    /// 流配置
    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// 每帧每声道采样数
    pub fn frame_samples(&self) -> usize {
        self.config.sampling_rate.frame_samples()
    }

    /// 修改帧长 (通常来自帧头)
    pub fn set_frame_length(&mut self, frame_length: usize) -> LdacResult<()> {
        self.config.set_frame_length(frame_length)
    }

    /// 修改帧状态
    pub fn set_frame_status(&mut self, frame_status: u32) {
        self.config.frame_status = frame_status;
    }

    /// 解码一帧, 返回消耗的帧数据字节数 (不含帧头)
    ///
    /// `planes` 每声道一个缓冲, 成功时被调整为 `frame_samples` 个采样.
    pub fn decode(
        &mut self,
        payload: &[u8],
        format: SampleFormat,
        planes: &mut [Vec<u8>],
    ) -> LdacResult<usize> {
        let sampling_rate = self.config.sampling_rate;
        let frame_length = self.config.frame_length();
        let nlnn = sampling_rate.nlnn();
        let n = sampling_rate.frame_samples();
        let need = check_planes(
            planes.len(),
            std::iter::empty::<usize>(),
            self.config.channel_config.channels(),
            n,
            format,
        )?;
        if payload.len() < frame_length {
            return Err(LdacError::InputBufferSize(payload.len()));
        }

        let used = match unpack_frame(
            &payload[..frame_length],
            frame_length,
            sampling_rate,
            &mut self.blocks,
        ) {
            Ok(used) => used,
            Err(err) => {
                warn!("第 {} 帧解包失败: {}", self.frame_count, err);
                return Err(err.into());
            }
        };

        let bps = format.bytes_per_sample();
        let channels = self.blocks.iter_mut().flat_map(|b| {
            let nqus = b.nqus;
            b.channels.iter_mut().map(move |ch| (nqus, ch))
        });
        for ((nqus, ch), plane) in channels.zip(planes.iter_mut()) {
            ch.spec[..n].fill(P::Sample::default());
            for iqu in 0..nqus {
                let (lsp, hsp) = (ISP[iqu], ISP[iqu + 1]);
                P::dequantize(
                    &ch.qspec[lsp..hsp],
                    &ch.rspec[lsp..hsp],
                    ch.idsf[iqu],
                    ch.idwl1[iqu],
                    ch.idwl2[iqu],
                    &mut ch.spec[lsp..hsp],
                );
            }
            P::imdct(&ch.spec[..n], &mut ch.time[..2 * n], nlnn);

            plane.clear();
            plane.resize(need, 0);
            for (&sample, out) in ch.time[..n].iter().zip(plane.chunks_exact_mut(bps)) {
                P::time_to_pcm(format, sample, out);
            }
        }

        trace!("解码第 {} 帧: {} 字节", self.frame_count, used);
        self.frame_count += 1;
        Ok(used)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ChannelConfig, EncodeSetting, SamplingRate};
    use crate::dsp::FloatPath;
    use crate::dsp::test_util::test_signal;
    use crate::encoder::LdacEncoder;
    use crate::frame::AudioFrame;
    use ldac_core::UnpackError;

    const SR: SamplingRate = SamplingRate::Hz48000;

    fn pair<P: SignalPath>(frame_length: usize) -> (LdacEncoder<P>, LdacDecoder<P>) {
        let config =
            StreamConfig::new(SR, ChannelConfig::Stereo, frame_length).expect("创建流配置失败");
        let setting = EncodeSetting::for_frame_length((frame_length + 3) / 2, SR);
        let enc = LdacEncoder::new(config, setting).expect("创建编码器失败");
        let dec = LdacDecoder::new(config).expect("创建解码器失败");
        (enc, dec)
    }

    /// 编码再解码, 返回信噪比 (dB), 去掉一帧变换延迟
    fn roundtrip_snr<P: SignalPath>(frame_length: usize) -> f64 {
        let (mut enc, mut dec) = pair::<P>(frame_length);
        let frames = 12;
        let left = test_signal(128 * frames, 7);
        let right = test_signal(128 * frames, 8);
        let mut decoded = [Vec::new(), Vec::new()];
        let mut planes = vec![Vec::new(), Vec::new()];
        for i in 0..frames {
            let frame = AudioFrame {
                data: [&left, &right]
                    .iter()
                    .map(|s| {
                        s[i * 128..(i + 1) * 128]
                            .iter()
                            .flat_map(|v| v.to_le_bytes())
                            .collect()
                    })
                    .collect(),
                nb_samples: 128,
                sample_format: SampleFormat::S16,
            };
            let encoded = enc.encode(&frame.planes(), SampleFormat::S16).expect("编码失败");
            let used = dec.decode(encoded.payload(), SampleFormat::S16, &mut planes);
            assert_eq!(used.ok(), Some(frame_length));
            for (out, plane) in decoded.iter_mut().zip(&planes) {
                out.extend(
                    plane
                        .chunks_exact(2)
                        .map(|b| i16::from_le_bytes([b[0], b[1]])),
                );
            }
        }
        let mut signal = 0f64;
        let mut noise = 0f64;
        for (src, out) in [&left, &right].iter().zip(&decoded) {
            for (&a, &b) in src[..128 * (frames - 1)].iter().zip(&out[128..]) {
                signal += f64::from(a).powi(2);
                noise += (f64::from(a) - f64::from(b)).powi(2);
            }
        }
        10.0 * (signal / noise.max(1.0)).log10()
    }

    #[test]
    fn test_roundtrip_high_quality_fixed() {
        let snr = roundtrip_snr::<FixedPath>(327);
        assert!(snr >= 40.0, "定点通路 330 字节帧信噪比过低: {:.1} dB", snr);
    }

    #[test]
    fn test_roundtrip_high_quality_float() {
        let snr = roundtrip_snr::<FloatPath>(327);
        assert!(snr >= 40.0, "浮点通路 330 字节帧信噪比过低: {:.1} dB", snr);
    }

    #[test]
    fn test_roundtrip_low_rate() {
        let snr = roundtrip_snr::<FixedPath>(107);
        assert!(snr >= 20.0, "110 字节帧信噪比过低: {:.1} dB", snr);
    }

    #[test]
    fn test_decode_failure_writes_no_pcm() {
        let (mut enc, mut dec) = pair::<FixedPath>(217);
        let plane = vec![0u8; 256];
        let encoded = enc.encode(&[&plane, &plane], SampleFormat::S16).expect("编码失败");
        let mut corrupt = encoded.payload().to_vec();
        let last = corrupt.len() - 1;
        corrupt[last] = 0x00;
        let mut planes = vec![vec![0xEEu8; 4], vec![0xEEu8; 4]];
        let result = dec.decode(&corrupt, SampleFormat::S16, &mut planes);
        assert!(matches!(
            result,
            Err(LdacError::Unpack(UnpackError::FrameAlign))
        ));
        assert_eq!(planes[0], vec![0xEE; 4], "解包失败时不应写出 PCM");
    }

    #[test]
    fn test_decode_rejects_short_payload() {
        let (_, mut dec) = pair::<FixedPath>(217);
        let mut planes = vec![Vec::new(), Vec::new()];
        assert!(matches!(
            dec.decode(&[0u8; 100], SampleFormat::S16, &mut planes),
            Err(LdacError::InputBufferSize(100))
        ));
        let mut one = vec![Vec::new()];
        assert!(dec.decode(&[0u8; 217], SampleFormat::S16, &mut one).is_err());
    }
}
