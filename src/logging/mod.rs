//! 日志系统.
//!
//! 库 crate 通过 `log` 门面输出日志, 这里安装 `tracing-subscriber` 全局订阅器,
//! `log` 记录经 tracing-log 桥接进入同一套过滤与输出:
//! - 控制台层: 带颜色的级别与源码位置
//! - 文件层: 按本地日期切分 `<prefix>.<YYYY-MM-DD>.log`, 经非阻塞工作线程写出
//!
//! 过滤指令取自 `LoggingConfig.level`, 设置了 `QIAO_LOG` 环境变量时以其为准.
//! 初始化与跨日切换文件时整理历史日志 (压缩 / 按保留天数删除), 见 [`history`].

use anyhow::{Context, Result};
use chrono::{Datelike, Local, NaiveDate, Timelike};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing_subscriber::{
    EnvFilter, Registry,
    fmt::{self, FormatEvent, FormatFields, format::Writer},
    layer::{Layer, SubscriberExt},
    registry::LookupSpan,
    util::SubscriberInitExt,
};

mod history;

pub use history::cleanup_logs;

/// 覆盖过滤指令的环境变量
pub const LOG_ENV: &str = "QIAO_LOG";

/// 日志配置
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// 过滤指令, 如 `info` 或 `qiao_codec=trace,info`
    #[serde(default = "default_level")]
    pub level: String,
    /// 日志目录
    #[serde(default = "default_directory")]
    pub directory: String,
    /// 日志文件名前缀
    #[serde(default = "default_prefix")]
    pub file_prefix: String,
    #[serde(default = "default_retention_days")]
    pub retention_days: i64,
    #[serde(default = "default_true")]
    pub compress_history: bool,
}

fn default_level() -> String {
    "info".to_string()
}

fn default_directory() -> String {
    "logs".to_string()
}

fn default_prefix() -> String {
    "qiao".to_string()
}

fn default_true() -> bool {
    true
}

fn default_retention_days() -> i64 {
    30
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            directory: default_directory(),
            file_prefix: default_prefix(),
            retention_days: default_retention_days(),
            compress_history: default_true(),
        }
    }
}

static LOG_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

/// 安装全局日志订阅器
///
/// 每个进程只能成功调用一次, 重复调用返回错误.
pub fn init(config: LoggingConfig) -> Result<()> {
    std::fs::create_dir_all(&config.directory)
        .with_context(|| format!("创建日志目录失败, path={}", config.directory))?;

    let directive = resolve_directive(&config.level, std::env::var(LOG_ENV).ok());
    let console_filter = build_filter(&directive)?;
    let file_filter = build_filter(&directive)?;

    let history_result = cleanup_logs(&config, Local::now().date_naive());
    let file_appender = CurrentFileWriter::new(config)?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let console_layer = fmt::Layer::default()
        .with_writer(std::io::stdout)
        .with_ansi(true)
        .event_format(ConsoleFormatter)
        .with_filter(console_filter);

    let file_layer = fmt::Layer::default()
        .with_writer(non_blocking)
        .with_ansi(false)
        .event_format(FileFormatter)
        .with_filter(file_filter);

    Registry::default()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("安装全局日志订阅器失败")?;
    LOG_GUARD.set(guard).ok();

    if let Err(err) = history_result {
        tracing::warn!("整理历史日志失败: {:#}", err);
    }
    tracing::debug!("日志系统已初始化, 过滤指令: {}", directive);
    Ok(())
}

/// 环境变量非空时优先于配置中的级别
fn resolve_directive(level: &str, env: Option<String>) -> String {
    match env {
        Some(value) if !value.trim().is_empty() => value,
        _ => level.to_string(),
    }
}

fn build_filter(directive: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(directive).with_context(|| format!("无效的日志过滤指令: {}", directive))
}

/// 按本地日期写入当前日志文件, 跨日时切换到新文件并整理历史日志
struct CurrentFileWriter {
    config: LoggingConfig,
    date: NaiveDate,
    file: File,
}

impl CurrentFileWriter {
    fn new(config: LoggingConfig) -> Result<Self> {
        let today = Local::now().date_naive();
        let file_path = build_current_log_path(Path::new(&config.directory), &config.file_prefix, today);
        let file = open_append_file(&file_path)?;
        Ok(Self {
            config,
            date: today,
            file,
        })
    }

    fn rollover(&mut self, today: NaiveDate) -> std::io::Result<()> {
        let file_path =
            build_current_log_path(Path::new(&self.config.directory), &self.config.file_prefix, today);
        self.file = open_append_file(&file_path).map_err(std::io::Error::other)?;
        self.date = today;
        // 工作线程内同步整理, 失败不影响写日志
        let _ = cleanup_logs(&self.config, today);
        Ok(())
    }
}

impl Write for CurrentFileWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let today = Local::now().date_naive();
        if today != self.date {
            self.rollover(today)?;
        }
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.file.flush()
    }
}

fn open_append_file(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("打开日志文件失败, path={}", path.display()))
}

/// 当日日志文件路径: `<directory>/<prefix>.<YYYY-MM-DD>.log`
pub fn build_current_log_path(directory: &Path, prefix: &str, date: NaiveDate) -> PathBuf {
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
        let now = Local::now();
        let meta = event.metadata();
        write!(
            writer,
            "[{:02}-{:02} {:02}:{:02}:{:02}.{:03}] ",
            now.month(),
            now.day(),
            now.hour(),
            now.minute(),
            now.second(),
            now.timestamp_subsec_millis()
        )?;
        let color = match *meta.level() {
            tracing::Level::ERROR => "\x1b[31m",
            tracing::Level::WARN => "\x1b[33m",
            tracing::Level::INFO => "\x1b[32m",
            _ => "\x1b[34m",
        };
        write!(
            writer,
            "{}{:5}\x1b[0m {}:{} > ",
            color,
            meta.level().to_string(),
            meta.file().unwrap_or("unknown"),
            meta.line().unwrap_or(0)
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
        let now = Local::now();
        let meta = event.metadata();
        write!(
            writer,
            "[{:04}-{:02}-{:02} {:02}:{:02}:{:02}.{:03}] {:5} {} > ",
            now.year(),
            now.month(),
            now.day(),
            now.hour(),
            now.minute(),
            now.second(),
            now.timestamp_subsec_millis(),
            meta.level().to_string(),
            meta.target(),
        )?;
        ctx.format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}
