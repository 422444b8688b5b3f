//! PCM 音频帧与交错/平面布局转换.
//!
//! 编解码核心按平面格式处理 (每声道一个缓冲), 会话层接口使用交错格式.

use ldac_core::{LdacError, LdacResult, SampleFormat};

/// 平面格式的 PCM 音频帧
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioFrame {
    /// 每声道一个缓冲
    pub data: Vec<Vec<u8>>,
    /// 每声道采样数
    pub nb_samples: usize,
    /// 采样格式
    pub sample_format: SampleFormat,
}

impl AudioFrame {
    /// 创建静音帧
    pub fn silence(channels: usize, nb_samples: usize, sample_format: SampleFormat) -> Self {
        let plane = vec![0u8; nb_samples * sample_format.bytes_per_sample()];
        Self {
            data: vec![plane; channels],
            nb_samples,
            sample_format,
        }
    }

    /// 由交错数据构造
    pub fn from_interleaved(
        data: &[u8],
        channels: usize,
        sample_format: SampleFormat,
    ) -> LdacResult<Self> {
        let planes = deinterleave(data, channels, sample_format.bytes_per_sample())?;
        let nb_samples = planes
            .first()
            .map_or(0, |p| p.len() / sample_format.bytes_per_sample());
        Ok(Self {
            data: planes,
            nb_samples,
            sample_format,
        })
    }

    /// 声道数
    pub fn channels(&self) -> usize {
        self.data.len()
    }

    /// 各声道缓冲的切片视图
    pub fn planes(&self) -> Vec<&[u8]> {
        self.data.iter().map(Vec::as_slice).collect()
    }

    /// 转为交错数据
    pub fn to_interleaved(&self) -> Vec<u8> {
        interleave(&self.data, self.sample_format.bytes_per_sample())
    }
}

/// 平面数据交错排列
pub fn interleave<T: AsRef<[u8]>>(planes: &[T], bytes_per_sample: usize) -> Vec<u8> {
    let mut out = Vec::new();
    interleave_into(planes, bytes_per_sample, &mut out);
    out
}

/// 平面数据交错排列到 `out`, 复用其容量
pub fn interleave_into<T: AsRef<[u8]>>(
    planes: &[T],
    bytes_per_sample: usize,
    out: &mut Vec<u8>,
) {
    out.clear();
    if bytes_per_sample == 0 {
        return;
    }
    let nb_samples = planes
        .iter()
        .map(|p| p.as_ref().len() / bytes_per_sample)
        .min()
        .unwrap_or(0);
    out.reserve(nb_samples * bytes_per_sample * planes.len());
    for i in 0..nb_samples {
        let range = i * bytes_per_sample..(i + 1) * bytes_per_sample;
        for plane in planes {
            out.extend_from_slice(&plane.as_ref()[range.clone()]);
        }
    }
}

/// 交错数据拆分为平面
pub fn deinterleave(
    data: &[u8],
    channels: usize,
    bytes_per_sample: usize,
) -> LdacResult<Vec<Vec<u8>>> {
    let mut planes = vec![Vec::new(); channels];
    deinterleave_into(data, bytes_per_sample, &mut planes)?;
    Ok(planes)
}

/// 交错数据拆分到已有的平面缓冲, 声道数取 `planes.len()`
pub fn deinterleave_into(
    data: &[u8],
    bytes_per_sample: usize,
    planes: &mut [Vec<u8>],
) -> LdacResult<()> {
    let channels = planes.len();
    if channels == 0 || bytes_per_sample == 0 {
        return Err(LdacError::InvalidArgument(format!(
            "声道数 {} 或采样字节数 {} 非法",
            channels, bytes_per_sample
        )));
    }
    let stride = channels * bytes_per_sample;
    if data.len() % stride != 0 {
        return Err(LdacError::InputBufferSize(data.len()));
    }
    let nb_samples = data.len() / stride;
    for plane in planes.iter_mut() {
        plane.clear();
        plane.reserve(nb_samples * bytes_per_sample);
    }
    for sample in data.chunks_exact(stride) {
        for (plane, bytes) in planes.iter_mut().zip(sample.chunks_exact(bytes_per_sample)) {
            plane.extend_from_slice(bytes);
        }
    }
    Ok(())
}
