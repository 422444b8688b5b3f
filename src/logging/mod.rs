//! 日志系统.
//!
//! 编解码 crate 通过 `log` 门面输出, 这里安装 `tracing-subscriber`:
//! - 彩色控制台输出
//! - 按日期命名的日志文件, 经 `tracing-appender` 非阻塞写入
//! - 历史日志维护: 压缩前一天及更早的日志, 删除超过保留天数的日志
//!
//! 全局订阅器只能安装一次, 重复调用 [`init`] 返回错误.

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use tracing_subscriber::{
    EnvFilter, Registry,
    fmt::{self, FormatEvent, FormatFields, format::Writer},
    layer::{Layer, SubscriberExt},
    registry::LookupSpan,
    util::SubscriberInitExt,
};

mod task;

pub use task::{MaintenanceReport, run_maintenance};

/// 日志配置
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 文件日志级别 (EnvFilter 语法)
    pub level: String,
    /// 控制台日志级别, 为空时关闭控制台输出
    pub console_level: String,
    /// 日志目录
    pub directory: String,
    /// 日志文件名前缀
    pub file_prefix: String,
    /// 保留天数
    pub retention_days: i64,
    /// 是否压缩历史日志
    pub compress_history: bool,
    /// 维护间隔 (秒)
    pub cleanup_interval_seconds: u64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            console_level: "warn".to_string(),
            directory: "logs".to_string(),
            file_prefix: "ldac".to_string(),
            retention_days: 7,
            compress_history: true,
            cleanup_interval_seconds: 3600,
        }
    }
}

static LOG_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

/// 安装全局日志订阅器并启动日志维护
pub fn init(config: LoggingConfig) -> Result<()> {
    std::fs::create_dir_all(&config.directory)
        .with_context(|| format!("创建日志目录失败, path={}", config.directory))?;

    let reopen_requested = Arc::new(AtomicBool::new(false));
    let file_writer = DailyFileWriter::new(
        Path::new(&config.directory),
        &config.file_prefix,
        Arc::clone(&reopen_requested),
    )?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file_writer);

    let file_layer = fmt::Layer::default()
        .with_writer(non_blocking)
        .with_ansi(false)
        .event_format(FileFormatter)
        .with_filter(EnvFilter::new(&config.level));

    let console_layer = if config.console_level.is_empty() {
        None
    } else {
        Some(
            fmt::Layer::default()
                .with_writer(std::io::stderr)
                .with_ansi(true)
                .event_format(ConsoleFormatter)
                .with_filter(EnvFilter::new(&config.console_level)),
        )
    };

    Registry::default()
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .context("安装日志订阅器失败")?;
    LOG_GUARD.set(guard).ok();

    task::start_maintenance(config, reopen_requested);
    Ok(())
}

/// 按日期写入当前日志文件, 收到跨日通知后重新打开
struct DailyFileWriter {
    directory: PathBuf,
    prefix: String,
    reopen_requested: Arc<AtomicBool>,
    file: File,
}

impl DailyFileWriter {
    fn new(directory: &Path, prefix: &str, reopen_requested: Arc<AtomicBool>) -> Result<Self> {
        let path = log_file_path(directory, prefix, Local::now().date_naive());
        Ok(Self {
            directory: directory.to_path_buf(),
            prefix: prefix.to_string(),
            reopen_requested,
            file: open_append(&path)?,
        })
    }
}

impl Write for DailyFileWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if self.reopen_requested.swap(false, Ordering::AcqRel) {
            let path = log_file_path(&self.directory, &self.prefix, Local::now().date_naive());
            self.file = open_append(&path).map_err(std::io::Error::other)?;
        }
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.file.flush()
    }
}

fn open_append(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("打开日志文件失败, path={}", path.display()))
}

/// 指定日期的日志文件路径: `<prefix>.<YYYY-MM-DD>.log`
pub fn log_file_path(directory: &Path, prefix: &str, date: NaiveDate) -> PathBuf {
    directory.join(format!("{}.{}.log", prefix, date.format("%Y-%m-%d")))
}

struct ConsoleFormatter;

impl<S, N> FormatEvent<S, N> for ConsoleFormatter
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &fmt::FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();
        let color = match *meta.level() {
            tracing::Level::ERROR => "\x1b[31m",
            tracing::Level::WARN => "\x1b[33m",
            tracing::Level::INFO => "\x1b[32m",
            tracing::Level::DEBUG => "\x1b[34m",
            tracing::Level::TRACE => "\x1b[90m",
        };
        write!(
            writer,
            "{} {}{:5}\x1b[0m {} > ",
            Local::now().format("%H:%M:%S%.3f"),
            color,
            meta.level().as_str(),
            meta.target()
        )?;
        ctx.format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

struct FileFormatter;

impl<S, N> FormatEvent<S, N> for FileFormatter
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &fmt::FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();
        write!(
            writer,
            "[{}] {:5} {}",
            Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            meta.level().as_str(),
            meta.target()
        )?;
        if let (Some(file), Some(line)) = (meta.file(), meta.line()) {
            write!(writer, " ({}:{})", file, line)?;
        }
        write!(writer, " > ")?;
        ctx.format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_file_path() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 18).expect("测试日期初始化失败");
        let path = log_file_path(Path::new("logs"), "ldac", date);
        assert_eq!(path, PathBuf::from("logs/ldac.2026-10-18.log"));
    }

    #[test]
    fn test_config_partial_json() {
        let parsed: Result<LoggingConfig, _> =
            serde_json::from_str(r#"{"level": "debug", "retention_days": 3}"#);
        let config = parsed.expect("解析日志配置失败");
        assert_eq!(config.level, "debug");
        assert_eq!(config.retention_days, 3);
        assert_eq!(config.file_prefix, "ldac");
        assert!(config.compress_history);
    }
}
