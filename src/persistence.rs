//! フォーム保存（論文登録API + ローカル履歴）

use crate::api::ThesisBackend;
use crate::error::Result;
use crate::history::HistoryStore;
use thesis_capture_common::{HistoryEntry, ThesisForm, ThesisRecord};

/// 保存日の表示（例: "October 15, 2026"）
pub fn today_label() -> String {
    chrono::Local::now().format("%B %-d, %Y").to_string()
}

/// フォームを登録APIに送り、履歴に残す1件を返す
pub async fn register<B: ThesisBackend>(
    backend: &B,
    form: &ThesisForm,
    accuracy: &[Option<f64>],
    scanned_at: String,
) -> Result<HistoryEntry> {
    let record = ThesisRecord::from_form(form);
    let created = backend.create(&record).await?;
    tracing::info!(id = %created.id, "thesis saved");

    Ok(HistoryEntry::new(created.id, form, accuracy, scanned_at))
}

/// フォームを登録し、成功したら履歴に追記
///
/// 登録に失敗した場合はローカルには何も書かない。
pub async fn persist<B: ThesisBackend>(
    backend: &B,
    history: &HistoryStore,
    form: &ThesisForm,
    accuracy: &[Option<f64>],
    scanned_at: String,
) -> Result<HistoryEntry> {
    let entry = register(backend, form, accuracy, scanned_at).await?;
    history.append(entry.clone())?;
    Ok(entry)
}
