use super::LoggingConfig;
use anyhow::{Context, Result};
use chrono::{DateTime, Duration as ChronoDuration, Local, NaiveDate, TimeZone, Utc};
use flate2::Compression;
use flate2::write::GzEncoder;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, SystemTime};
use tracing::{debug, error};

/// 一次维护的结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaintenanceReport {
    /// 新压缩的日志
    pub compressed: Vec<PathBuf>,
    /// 删除的日志
    pub removed: Vec<PathBuf>,
}

/// 有 tokio 运行时时启动周期维护任务, 否则只执行一次
pub(super) fn start_maintenance(config: LoggingConfig, reopen_requested: Arc<AtomicBool>) {
    let handle = match tokio::runtime::Handle::try_current() {
        Ok(handle) => handle,
        Err(_) => {
            if let Err(err) = run_maintenance(&config, Local::now().date_naive()) {
                error!("日志维护失败: {}", err);
            }
            return;
        }
    };

    handle.spawn(async move {
        let mut interval =
            tokio::time::interval(Duration::from_secs(config.cleanup_interval_seconds.max(1)));
        let mut next_midnight = next_midnight_instant(Local::now());
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(err) = run_maintenance(&config, Local::now().date_naive()) {
                        error!("日志维护失败: {}", err);
                    }
                }
                _ = tokio::time::sleep_until(next_midnight) => {
                    reopen_requested.store(true, Ordering::Release);
                    if let Err(err) = run_maintenance(&config, Local::now().date_naive()) {
                        error!("跨日日志维护失败: {}", err);
                    }
                    next_midnight = next_midnight_instant(Local::now());
                }
            }
        }
    });
}

/// 以 `today` 为当前日期执行一次维护
///
/// 早于 `today - retention_days` 的日志被删除; 其余早于 `today` 的未压缩日志按配置压缩.
pub fn run_maintenance(config: &LoggingConfig, today: NaiveDate) -> Result<MaintenanceReport> {
    let mut report = MaintenanceReport::default();
    let directory = Path::new(&config.directory);
    if !directory.exists() {
        return Ok(report);
    }
    let cutoff = today - ChronoDuration::days(config.retention_days);

    for entry in fs::read_dir(directory)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some((date, compressed)) = parse_log_name(name, &config.file_prefix) else {
            continue;
        };
        if date < cutoff {
            fs::remove_file(&path)
                .with_context(|| format!("删除过期日志失败, path={}", path.display()))?;
            report.removed.push(path);
        } else if config.compress_history && !compressed && date < today {
            report.compressed.push(compress_log(&path)?);
        }
    }
    if !report.compressed.is_empty() || !report.removed.is_empty() {
        debug!(
            "日志维护: 压缩 {} 个, 删除 {} 个",
            report.compressed.len(),
            report.removed.len()
        );
    }
    Ok(report)
}

fn compress_log(path: &Path) -> Result<PathBuf> {
    let gz_path = PathBuf::from(format!("{}.gz", path.display()));
    let mut input =
        File::open(path).with_context(|| format!("打开待压缩日志失败, path={}", path.display()))?;
    let output = File::create(&gz_path)
        .with_context(|| format!("创建压缩日志失败, path={}", gz_path.display()))?;
    let mut encoder = GzEncoder::new(output, Compression::default());
    io::copy(&mut input, &mut encoder)?;
    encoder.finish()?;
    fs::remove_file(path)
        .with_context(|| format!("删除已压缩日志失败, path={}", path.display()))?;
    Ok(gz_path)
}

/// 解析 `<prefix>.<YYYY-MM-DD>.log[.gz]`
fn parse_log_name(name: &str, prefix: &str) -> Option<(NaiveDate, bool)> {
    let rest = name.strip_prefix(prefix)?.strip_prefix('.')?;
    let (date, compressed) = match rest.strip_suffix(".log.gz") {
        Some(date) => (date, true),
        None => (rest.strip_suffix(".log")?, false),
    };
    if date.len() != 10 {
        return None;
    }
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
    Some((date, compressed))
}

fn next_midnight_instant(now: DateTime<Local>) -> tokio::time::Instant {
    let wait = (now.date_naive() + ChronoDuration::days(1))
        .and_hms_opt(0, 0, 0)
        .and_then(|midnight| Local.from_local_datetime(&midnight).earliest())
        .and_then(|next| {
            SystemTime::from(next.with_timezone(&Utc))
                .duration_since(SystemTime::now())
                .ok()
        })
        .unwrap_or(Duration::from_secs(1));
    tokio::time::Instant::now() + wait
}
