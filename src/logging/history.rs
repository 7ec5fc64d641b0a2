//! 历史日志整理: 压缩早于今天的日志, 删除超出保留天数的日志.

use super::LoggingConfig;
use anyhow::{Context, Result};
use chrono::{Duration as ChronoDuration, NaiveDate};
use flate2::Compression;
use flate2::write::GzEncoder;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tracing::warn;

/// 整理日志目录, `today` 为当前本地日期
///
/// 只处理 `<prefix>.<YYYY-MM-DD>.log[.gz]` 形式的文件, 其他文件保持不动.
pub fn cleanup_logs(config: &LoggingConfig, today: NaiveDate) -> Result<()> {
    let directory = Path::new(&config.directory);
    if !directory.exists() {
        return Ok(());
    }

    let cutoff = today - ChronoDuration::days(config.retention_days);

    let entries = fs::read_dir(directory)
        .with_context(|| format!("读取日志目录失败, path={}", directory.display()))?;
    for entry in entries {
        let entry = entry?;
        let file_name = entry.file_name().to_string_lossy().to_string();
        let file_path = entry.path();

        let (date, compressed) = match parse_rotated_log_name(&file_name, &config.file_prefix) {
            Some(value) => value,
            None => continue,
        };

        if date < cutoff {
            if let Err(err) = fs::remove_file(&file_path) {
                warn!("删除过期日志失败, path={}: {}", file_path.display(), err);
            }
            continue;
        }

        if config.compress_history && !compressed && date < today {
            if let Err(err) = compress_to_gz(&file_path) {
                warn!("压缩历史日志失败: {:#}", err);
            }
        }
    }

    Ok(())
}

fn compress_to_gz(path: &Path) -> Result<()> {
    let gz_path = PathBuf::from(format!("{}.gz", path.display()));
    if gz_path.exists() {
        return Ok(());
    }

    let mut input =
        File::open(path).with_context(|| format!("打开待压缩日志失败, path={}", path.display()))?;
    let output = File::create(&gz_path)
        .with_context(|| format!("创建压缩日志失败, path={}", gz_path.display()))?;
    let mut encoder = GzEncoder::new(output, Compression::default());
    io::copy(&mut input, &mut encoder)?;
    encoder.finish()?;

    fs::remove_file(path)
        .with_context(|| format!("删除已压缩日志失败, path={}", path.display()))?;
    Ok(())
}

fn parse_rotated_log_name(file_name: &str, prefix: &str) -> Option<(NaiveDate, bool)> {
    let with_prefix = file_name.strip_prefix(prefix)?;
    let with_dot = with_prefix.strip_prefix('.')?;

    if let Some(date_part) = with_dot.strip_suffix(".log") {
        return parse_date(date_part).map(|date| (date, false));
    }
    if let Some(date_part) = with_dot.strip_suffix(".log.gz") {
        return parse_date(date_part).map(|date| (date, true));
    }
    None
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    if value.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}
