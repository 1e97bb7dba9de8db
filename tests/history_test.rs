//! 履歴ログテスト
//!
//! ローカル履歴ファイルの追記・読み込み・削除を検証

use serde_json::json;
use thesis_capture::history::HistoryStore;
use thesis_capture_common::{HistoryEntry, ThesisForm};
use tempfile::tempdir;

fn entry(id: serde_json::Value, title: &str) -> HistoryEntry {
    let form = ThesisForm {
        title: title.to_string(),
        authors: "M. Santos".to_string(),
        date_published: "March 2021".to_string(),
        ..Default::default()
    };
    HistoryEntry::new(id, &form, &[Some(90.0), None, None, Some(77.0)], "October 15, 2026".into())
}

/// ファイルがなければ空の履歴
#[test]
fn test_load_missing_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let store = HistoryStore::new(dir.path().join("ocr_scans.json"));

    let log = store.load().expect("読み込み失敗");
    assert!(log.is_empty());
}

/// 追記は既存の履歴を保持する
#[test]
fn test_append_preserves_existing() {
    let dir = tempdir().expect("Failed to create temp dir");
    let store = HistoryStore::new(dir.path().join("nested").join("ocr_scans.json"));

    assert_eq!(store.append(entry(json!(1), "First")).unwrap(), 1);
    assert_eq!(store.append(entry(json!("b2"), "Second")).unwrap(), 2);

    let log = store.load().unwrap();
    assert_eq!(log.len(), 2);
    assert_eq!(log.entries()[0].title, "First");
    assert_eq!(log.entries()[1].thesis_id, json!("b2"));
    // 日付は入力値のまま
    assert_eq!(log.entries()[1].date, "March 2021");
}

/// 保存形式はJSON配列（精度なしは "N/A"）
#[test]
fn test_file_format() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("ocr_scans.json");
    let store = HistoryStore::new(&path);
    store.append(entry(json!(5), "Format")).unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert!(raw.is_array());
    assert_eq!(raw[0]["accuracy"], json!([90.0, "N/A", "N/A", 77.0]));
    assert_eq!(raw[0]["author"], "M. Santos");
    assert_eq!(raw[0]["scanned_at"], "October 15, 2026");
}

/// 削除
#[test]
fn test_clear() {
    let dir = tempdir().expect("Failed to create temp dir");
    let store = HistoryStore::new(dir.path().join("ocr_scans.json"));

    assert!(!store.clear().unwrap());
    store.append(entry(json!(1), "x")).unwrap();
    assert!(store.clear().unwrap());
    assert!(store.load().unwrap().is_empty());
}

/// 壊れたファイルはエラー
#[test]
fn test_corrupt_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("ocr_scans.json");
    std::fs::write(&path, "{not json").unwrap();

    let store = HistoryStore::new(&path);
    assert!(store.load().is_err());
    assert!(store.append(entry(json!(1), "x")).is_err());
}

/// IDのない旧形式の記録も追記後に残る
#[test]
fn test_append_keeps_legacy_entries() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("ocr_scans.json");
    std::fs::write(
        &path,
        r#"[{"title":"Old","author":"R. Diaz","accuracy":[92,"N/A","N/A","N/A"],"scanned_at":"May 2, 2024","device":"tablet"}]"#,
    )
    .unwrap();

    let store = HistoryStore::new(&path);
    assert_eq!(store.append(entry(json!(7), "New")).unwrap(), 2);

    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(saved[0]["title"], "Old");
    assert_eq!(saved[0]["device"], "tablet");
    assert_eq!(saved[1]["thesis_id"], 7);
}
