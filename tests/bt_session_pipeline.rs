//! 蓝牙会话端到端测试: 分块输入, 打包, 质量切换, 逐帧解码.

use ldac::codec::bt::{BtDecoder, BtEncoder, BtEncoderConfig, Eqmid, TX_SIZE};
use ldac::codec::{FrameHeader, Packet};
use ldac::core::{ChannelMode, SampleFormat};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// 交错立体声 S16 块, 128 个采样
fn chunk(index: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(512);
    for i in 0..128 {
        let t = (index * 128 + i) as f64;
        let l = (8_000.0 * (t * 0.03).sin()) as i16;
        let r = (6_000.0 * (t * 0.011).cos()) as i16;
        out.extend_from_slice(&l.to_le_bytes());
        out.extend_from_slice(&r.to_le_bytes());
    }
    out
}

fn encoder(eqmid: Eqmid, sampling_rate: u32) -> BtEncoder {
    let config = BtEncoderConfig {
        eqmid,
        sampling_rate,
        ..BtEncoderConfig::default()
    };
    BtEncoder::new(config).expect("创建编码会话失败")
}

/// 解析包内帧长序列, 同时检查包的结构
fn frame_lengths(packet: &Packet) -> Vec<usize> {
    assert!(packet.size() <= TX_SIZE, "包超出传输负载: {}", packet.size());
    let mut pos = 0;
    let mut lengths = Vec::new();
    while pos < packet.size() {
        let header = FrameHeader::parse(&packet.data[pos..]).expect("帧头错误");
        lengths.push(header.frame_length);
        pos += header.frame_bytes();
    }
    assert_eq!(pos, packet.size());
    assert_eq!(lengths.len(), packet.frame_count);
    lengths
}

#[test]
fn test_streaming_with_quality_changes() {
    init_logger();
    let mut enc = encoder(Eqmid::Hq, 96_000);
    let mut dec: BtDecoder = BtDecoder::new(ChannelMode::STEREO, 96_000).expect("创建解码会话失败");

    let schedule = [(40, Eqmid::Sq), (80, Eqmid::Mq), (120, Eqmid::Q0), (160, Eqmid::Hq)];
    let mut packets = Vec::new();
    let mut consumed = 0;
    for i in 0..200 {
        if let Some(&(_, eqmid)) = schedule.iter().find(|(at, _)| *at == i) {
            enc.set_eqmid(eqmid);
            assert_eq!(enc.eqmid(), eqmid);
        }
        let out = enc
            .encode(Some(&chunk(i)))
            .unwrap_or_else(|err| panic!("第 {} 块编码失败: {}", i, err));
        consumed += out.pcm_used;
        packets.extend(out.packet);
    }
    while let Some(packet) = enc.encode(None).expect("冲刷失败").packet {
        packets.push(packet);
    }
    assert_eq!(consumed, 200 * 512);
    assert_eq!(enc.current_eqmid(), Eqmid::Hq);
    assert_eq!(enc.bitrate(), 990);

    let mut seen = Vec::new();
    let mut decoded_samples = 0;
    for packet in &packets {
        for len in frame_lengths(packet) {
            if seen.last() != Some(&len) {
                seen.push(len);
            }
        }
        let mut pos = 0;
        while pos < packet.size() {
            let out = dec.decode(&packet.data[pos..], SampleFormat::S16).expect("解码失败");
            decoded_samples += out.pcm.len() / 4;
            pos += out.used_bytes;
        }
    }
    // 每种质量模式的帧长都出现过, 顺序与切换顺序一致
    for len in [327, 217, 107, 161] {
        assert!(seen.contains(&len), "缺少帧长 {}: {:?}", len, seen);
    }
    let pos = |len: usize| seen.iter().position(|&l| l == len).unwrap_or(usize::MAX);
    assert!(pos(327) < pos(217) && pos(217) < pos(107) && pos(107) < pos(161));
    // 200 块 = 100 帧, 加上冲刷时的一帧静音
    assert_eq!(decoded_samples, 101 * 256);
}

#[test]
fn test_packet_frame_counts_per_mode() {
    for (eqmid, expected) in [(Eqmid::Hq, 2), (Eqmid::Sq, 3), (Eqmid::Q0, 4), (Eqmid::Q1, 5), (Eqmid::Mq, 6)] {
        let mut enc = encoder(eqmid, 48_000);
        let mut counts = Vec::new();
        for i in 0..60 {
            if let Ok(out) = enc.encode(Some(&chunk(i))) {
                if let Some(packet) = out.packet {
                    frame_lengths(&packet);
                    counts.push(packet.frame_count);
                }
            }
        }
        assert!(!counts.is_empty());
        assert!(
            counts.iter().all(|&c| c == expected),
            "{:?} 每包帧数应为 {}: {:?}",
            eqmid,
            expected,
            counts
        );
    }
}

#[test]
fn test_larger_mtu_keeps_packet_limit() {
    let config = BtEncoderConfig {
        mtu: 1_000,
        eqmid: Eqmid::Mq,
        ..BtEncoderConfig::default()
    };
    let mut enc: BtEncoder = BtEncoder::new(config).expect("创建编码会话失败");
    for i in 0..40 {
        if let Ok(out) = enc.encode(Some(&chunk(i))) {
            if let Some(packet) = out.packet {
                assert!(packet.size() <= TX_SIZE);
            }
        }
    }
}
