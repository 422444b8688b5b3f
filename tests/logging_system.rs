use ldac::codec::bt::{BtEncoder, BtEncoderConfig};
use ldac::logging::{LoggingConfig, init, log_file_path, run_maintenance};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

// 注意: 由于 tracing 的全局订阅器只能初始化一次,
// 涉及 init() 的测试必须单独运行或使用 #[ignore] 标记

fn temp_dir() -> TempDir {
    TempDir::new().expect("创建临时目录失败")
}

fn test_config(dir: &Path, level: &str, prefix: &str) -> LoggingConfig {
    LoggingConfig {
        level: level.to_string(),
        console_level: String::new(),
        directory: dir.to_string_lossy().to_string(),
        file_prefix: prefix.to_string(),
        compress_history: false,
        ..LoggingConfig::default()
    }
}

fn read_today(dir: &Path, prefix: &str) -> String {
    let path = log_file_path(dir, prefix, chrono::Local::now().date_naive());
    fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("读取日志文件失败: {:?}, 错误: {}", path, e))
}

#[tokio::test]
#[ignore] // 需要单独运行: cargo test --test logging_system test_logging_levels_and_codec_records -- --ignored
async fn test_logging_levels_and_codec_records() {
    let dir = temp_dir();
    let log_dir = dir.path().join("nested").join("logs");
    let config = test_config(&log_dir, "info,ldac_codec=debug", "level-test");

    init(config.clone()).expect("日志初始化失败");
    assert!(log_dir.exists(), "嵌套日志目录应该被创建");
    // 订阅器只能安装一次
    assert!(init(config).is_err());

    tracing::warn!("警告日志_WARN_MSG");
    tracing::info!("信息日志_INFO_MSG");
    tracing::debug!("调试日志_DEBUG_MSG");
    // 编解码 crate 经 log 门面输出的记录
    let session: Result<BtEncoder, _> = BtEncoder::new(BtEncoderConfig::default());
    assert!(session.is_ok());

    std::thread::sleep(std::time::Duration::from_millis(200));

    let content = read_today(&log_dir, "level-test");
    assert!(content.contains("警告日志_WARN_MSG"), "应该包含警告日志");
    assert!(content.contains("信息日志_INFO_MSG"), "应该包含信息日志");
    assert!(content.contains("INFO"), "日志应该包含 INFO 级别标记");
    assert!(
        !content.contains("调试日志_DEBUG_MSG"),
        "debug 日志应该被过滤掉"
    );
    assert!(
        content.contains("打开蓝牙编码会话"),
        "应该包含编码会话的 debug 记录, 文件内容:\n{}",
        content
    );
}

#[test]
fn test_logging_file_naming_format() {
    let dir = temp_dir();
    let date = chrono::NaiveDate::from_ymd_opt(2026, 10, 18).expect("测试日期初始化失败");
    for prefix in ["ldac", "ldac-enc", "ldac-abr"] {
        let path = log_file_path(dir.path(), prefix, date);
        assert_eq!(path.parent(), Some(dir.path()));
        assert_eq!(
            path.file_name().and_then(|n| n.to_str()),
            Some(format!("{}.2026-10-18.log", prefix).as_str())
        );
    }
}

#[test]
fn test_logging_config_defaults() {
    let config = LoggingConfig::default();
    assert_eq!(config.level, "info");
    assert_eq!(config.console_level, "warn");
    assert_eq!(config.file_prefix, "ldac");
    assert_eq!(config.retention_days, 7, "默认保留天数应该是 7");
    assert!(config.compress_history, "默认应该开启压缩");
    assert_eq!(config.cleanup_interval_seconds, 3600, "默认清理间隔应该是 3600 秒");
}

#[test]
fn test_maintenance_without_compression() {
    let dir = temp_dir();
    let config = LoggingConfig {
        retention_days: 2,
        ..test_config(dir.path(), "info", "ldac")
    };
    let today = chrono::NaiveDate::from_ymd_opt(2026, 10, 18).expect("测试日期初始化失败");
    let recent = log_file_path(dir.path(), "ldac", today.pred_opt().unwrap_or(today));
    let stale = log_file_path(dir.path(), "ldac", today - chrono::Duration::days(10));
    let foreign = dir.path().join("notes.txt");
    for path in [&recent, &stale, &foreign] {
        fs::write(path, "x").expect("写入测试文件失败");
    }

    let report = run_maintenance(&config, today).expect("日志维护失败");
    assert!(report.compressed.is_empty(), "关闭压缩时不应压缩");
    assert_eq!(report.removed, vec![stale.clone()]);
    assert!(recent.exists());
    assert!(!stale.exists());
    assert!(foreign.exists(), "非日志文件不应被删除");
}
