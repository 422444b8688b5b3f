//! LDAC 编解码性能基准测试.
//!
//! 覆盖帧编码、帧解码、MDCT 变换与蓝牙会话打包等核心路径.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use ldac::codec::bt::{BtEncoder, BtEncoderConfig, Eqmid};
use ldac::codec::{
    ChannelConfig, EncodeSetting, FixedPath, FloatPath, LdacDecoder, LdacEncoder, SamplingRate,
    SignalPath, StreamConfig,
};
use ldac::core::SampleFormat;

/// 创建 S16 单声道平面, 128 个采样
fn make_s16_plane(seed: i32) -> Vec<u8> {
    let mut data = Vec::with_capacity(256);
    for i in 0..128i32 {
        let v = (((i * 37 + seed) % 256) as i16).wrapping_mul(100);
        data.extend_from_slice(&v.to_le_bytes());
    }
    data
}

/// 48 kHz 立体声 HQ 流配置
fn hq_stereo() -> (StreamConfig, EncodeSetting) {
    let config = StreamConfig::new(SamplingRate::Hz48000, ChannelConfig::Stereo, 327).unwrap();
    let setting = EncodeSetting::for_frame_length(165, SamplingRate::Hz48000);
    (config, setting)
}

fn bench_frame_encode<P: SignalPath>(c: &mut Criterion) {
    c.bench_function(&format!("frame_encode_hq_stereo_{}", P::NAME), |b| {
        let (config, setting) = hq_stereo();
        let mut enc: LdacEncoder<P> = LdacEncoder::new(config, setting).unwrap();
        let left = make_s16_plane(0);
        let right = make_s16_plane(91);
        let planes = [left.as_slice(), right.as_slice()];
        b.iter(|| {
            let frame = enc.encode(black_box(&planes), SampleFormat::S16).unwrap();
            black_box(frame);
        });
    });
}

fn bench_frame_decode<P: SignalPath>(c: &mut Criterion) {
    c.bench_function(&format!("frame_decode_hq_stereo_{}", P::NAME), |b| {
        let (config, setting) = hq_stereo();
        let mut enc: LdacEncoder<P> = LdacEncoder::new(config, setting).unwrap();
        let left = make_s16_plane(0);
        let right = make_s16_plane(91);
        let frame = enc
            .encode(&[left.as_slice(), right.as_slice()], SampleFormat::S16)
            .unwrap();
        let mut dec: LdacDecoder<P> = LdacDecoder::new(config).unwrap();
        let mut planes = vec![Vec::new(); 2];
        b.iter(|| {
            let used = dec
                .decode(black_box(frame.payload()), SampleFormat::S16, &mut planes)
                .unwrap();
            black_box(used);
        });
    });
}

fn bench_mdct<P: SignalPath>(c: &mut Criterion) {
    c.bench_function(&format!("mdct_256_{}", P::NAME), |b| {
        let pcm: Vec<u8> = make_s16_plane(5).repeat(4);
        let time: Vec<P::Sample> = pcm
            .chunks_exact(2)
            .map(|s| P::pcm_to_time(SampleFormat::S16, s))
            .collect();
        let mut spec = vec![P::Sample::default(); 256];
        b.iter(|| {
            P::mdct(black_box(&time), &mut spec, 8);
            black_box(&spec);
        });
    });
}

fn bench_bt_session(c: &mut Criterion) {
    c.bench_function("bt_session_sq_stereo_chunk", |b| {
        let config = BtEncoderConfig {
            eqmid: Eqmid::Sq,
            ..BtEncoderConfig::default()
        };
        let mut enc: BtEncoder = BtEncoder::new(config).unwrap();
        let chunk: Vec<u8> = make_s16_plane(3)
            .chunks_exact(2)
            .flat_map(|s| [s[0], s[1], s[0], s[1]])
            .collect();
        b.iter(|| {
            let out = enc.encode(Some(black_box(&chunk))).unwrap();
            black_box(out.packet);
        });
    });
}

fn bench_fixed_path(c: &mut Criterion) {
    bench_frame_encode::<FixedPath>(c);
    bench_frame_decode::<FixedPath>(c);
    bench_mdct::<FixedPath>(c);
}

fn bench_float_path(c: &mut Criterion) {
    bench_frame_encode::<FloatPath>(c);
    bench_frame_decode::<FloatPath>(c);
    bench_mdct::<FloatPath>(c);
}

criterion_group!(benches, bench_fixed_path, bench_float_path, bench_bt_session);
criterion_main!(benches);
