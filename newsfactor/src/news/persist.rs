//! CSV snapshots of news and factor records.
//!
//! Each save overwrites its target. Failures are reported through the
//! returned status string so a run can continue.

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::record::{ImpactRecord, NewsRecord};
use crate::error::Result;

/// Which header row a CSV file gets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderStyle {
    /// The record's field names.
    Raw,
    /// Full Chinese column titles.
    #[default]
    Chinese,
    /// Short Chinese column titles.
    ChineseShort,
}

impl FromStr for HeaderStyle {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "raw" => Ok(Self::Raw),
            "chinese" => Ok(Self::Chinese),
            "chinese_short" | "short" => Ok(Self::ChineseShort),
            other => Err(format!("unknown header style: {other}")),
        }
    }
}

/// A record that can be written as one CSV row.
pub trait CsvRow {
    /// Header row for `style`.
    fn headers(style: HeaderStyle) -> &'static [&'static str];

    /// Cell values in header order.
    fn row(&self) -> Vec<String>;
}

impl CsvRow for NewsRecord {
    fn headers(style: HeaderStyle) -> &'static [&'static str] {
        match style {
            HeaderStyle::Raw => &Self::FIELDS,
            HeaderStyle::Chinese => &["发布时间", "新闻标题", "新闻内容", "相关公司", "股票代码", "股票简称"],
            HeaderStyle::ChineseShort => &["时间", "标题", "正文", "涉及公司", "股票代码", "股票简称"],
        }
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.news_time.clone(),
            self.news_title.clone(),
            self.news_text.clone(),
            self.company_involved.clone(),
            self.stock_code.clone(),
            self.stock_short_name.clone(),
        ]
    }
}

impl CsvRow for ImpactRecord {
    fn headers(style: HeaderStyle) -> &'static [&'static str] {
        match style {
            HeaderStyle::Raw => &Self::FIELDS,
            HeaderStyle::Chinese => &[
                "公司名称", "股票代码", "股票简称", "新闻时间", "新闻标题", "影响方向", "新闻摘要",
            ],
            HeaderStyle::ChineseShort => &[
                "公司名", "股票代码", "股票简称", "新闻时间", "新闻标题", "影响方向", "新闻摘要",
            ],
        }
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.company_name.clone(),
            self.stock_code.clone(),
            self.stock_short_name.clone(),
            self.news_time.clone(),
            self.news_title.clone(),
            self.impact_direction.to_string(),
            self.news_summary.clone(),
        ]
    }
}

/// Write `records` to `path` with a header row, replacing any existing file.
///
/// # Errors
///
/// Returns CSV or I/O errors from creating or writing the file.
pub fn write_records<T: CsvRow>(path: &Path, records: &[T], style: HeaderStyle) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(T::headers(style))?;
    for record in records {
        writer.write_record(record.row())?;
    }
    writer.flush()?;
    Ok(())
}

/// Save `records` and describe the outcome.
///
/// Returns `"No data to save"` for empty input (the file is left untouched),
/// `"Successfully saved {n} records to {path}"` on success, or
/// `"Error saving to CSV: {error}"`.
pub fn save_records<T: CsvRow>(records: &[T], path: &Path, style: HeaderStyle) -> String {
    if records.is_empty() {
        return "No data to save".to_owned();
    }

    match write_records(path, records, style) {
        Ok(()) => {
            info!(path = %path.display(), records = records.len(), "Saved CSV");
            format!(
                "Successfully saved {} records to {}",
                records.len(),
                path.display()
            )
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to save CSV");
            format!("Error saving to CSV: {e}")
        }
    }
}
