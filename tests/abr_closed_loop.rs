//! ABR 闭环测试: 控制器直接驱动真实的蓝牙编码会话.

use ldac::abr::{AbrConfig, AbrController, QualityControl};
use ldac::codec::bt::{BtEncoder, BtEncoderConfig, Eqmid};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn session() -> BtEncoder {
    let config = BtEncoderConfig {
        eqmid: Eqmid::Hq,
        ..BtEncoderConfig::default()
    };
    BtEncoder::new(config).expect("创建编码会话失败")
}

fn controller() -> AbrController {
    AbrController::from_config(&AbrConfig::default()).expect("创建 ABR 失败")
}

/// 每次 ABR 调用之间编码两块静音
fn feed(enc: &mut BtEncoder) {
    let silence = vec![0u8; enc.input_chunk_bytes()];
    for _ in 0..2 {
        enc.encode(Some(&silence)).expect("编码失败");
    }
}

#[test]
fn test_congestion_then_recovery() {
    init_logger();
    let mut enc = session();
    let mut abr = controller();

    // 拥塞: 三次临界深度后降到最低档
    for _ in 0..3 {
        abr.process(&mut enc, 8, true);
        feed(&mut enc);
    }
    assert_eq!(enc.eqmid(), Eqmid::Mq);
    feed(&mut enc);
    assert_eq!(enc.current_eqmid(), Eqmid::Mq);
    assert_eq!(enc.frame_length(), 107);

    // 恢复: 队列清空后逐级回升
    let mut history = vec![enc.eqmid()];
    for _ in 0..600 {
        abr.process(&mut enc, 0, true);
        feed(&mut enc);
        if history.last() != Some(&enc.eqmid()) {
            history.push(enc.eqmid());
        }
    }
    assert_eq!(
        history,
        vec![Eqmid::Mq, Eqmid::Q1, Eqmid::Q0, Eqmid::Sq, Eqmid::Hq],
        "应逐级回升到 HQ"
    );
    assert!(abr.countdown() >= 1);
    for _ in 0..4 {
        feed(&mut enc);
    }
    assert_eq!(enc.current_eqmid(), Eqmid::Hq);
    assert_eq!(enc.bitrate(), 990);
}

#[test]
fn test_disabled_controller_never_alters() {
    let mut enc = session();
    let mut abr = controller();
    for depth in [8, 9, 10, 0, 0, 0, 0, 0, 7] {
        abr.process(&mut enc, depth, false);
        feed(&mut enc);
    }
    assert_eq!(enc.eqmid(), Eqmid::Hq);
    assert_eq!(enc.frame_length(), 327);
}

#[test]
fn test_limit_reached_keeps_running() {
    let mut enc = session();
    let mut abr = controller();
    for _ in 0..10 {
        abr.process(&mut enc, 20, true);
    }
    assert_eq!(enc.eqmid(), Eqmid::Mq);
    // 最低档继续降级失败, 会话报告受限错误
    assert_ne!(QualityControl::error_code(&enc), 0);
    assert_eq!(abr.penalty(), 4);
    let eqmid = abr.process(&mut enc, 0, true);
    assert_eq!(eqmid, Eqmid::Mq.id() as i32);
}
