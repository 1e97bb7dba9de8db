//! ローカル履歴ログ
//!
//! 保存に成功した論文を1件ずつ追記するJSON配列ファイル。
//! 追記のたびに全体を読み込み→追加→書き戻しする。

use crate::error::{CaptureError, Result};
use std::path::{Path, PathBuf};
use thesis_capture_common::{HistoryEntry, HistoryLog, HISTORY_KEY};

#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// 既定の保存先（データディレクトリ/thesis-capture/ocr_scans.json）
    pub fn default_path() -> Result<PathBuf> {
        let data = dirs::data_dir()
            .ok_or_else(|| CaptureError::Config("データディレクトリが見つかりません".into()))?;
        Ok(data
            .join("thesis-capture")
            .join(format!("{}.json", HISTORY_KEY)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 履歴を読み込み（ファイルがなければ空）
    pub fn load(&self) -> Result<HistoryLog> {
        if !self.path.exists() {
            return Ok(HistoryLog::default());
        }
        let content = std::fs::read_to_string(&self.path)?;
        Ok(HistoryLog::from_json(&content)?)
    }

    pub fn append(&self, entry: HistoryEntry) -> Result<usize> {
        let mut log = self.load()?;
        log.append(entry);

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, log.to_json()?)?;
        tracing::debug!(path = %self.path.display(), entries = log.len(), "history appended");
        Ok(log.len())
    }

    /// 履歴ファイルを削除（存在しなければ `false`）
    pub fn clear(&self) -> Result<bool> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }
}
