//! フォーム・登録レコード・ローカル履歴の型定義
//!
//! - ThesisForm: 入力中のフォーム値
//! - ThesisRecord: 論文登録APIへ送るJSON
//! - HistoryEntry: ローカル履歴（追記のみ）の1件

use crate::date::convert_month_year_to_date;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 版の既定値
pub const DEFAULT_EDITION: &str = "1st";

/// 履歴ログのストレージキー / ファイル名の基底
pub const HISTORY_KEY: &str = "ocr_scans";

/// フォーム項目ID
pub const FIELD_IDS: [&str; 7] = [
    "title",
    "authors",
    "program_course",
    "date_published",
    "edition_version",
    "abstract",
    "keywords",
];

/// 入力中のフォーム
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThesisForm {
    pub title: String,
    pub authors: String,
    pub program_course: String,
    pub date_published: String,
    pub edition_version: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub keywords: String,
}

impl ThesisForm {
    pub fn get(&self, field: &str) -> Option<&str> {
        let value = match field {
            "title" => &self.title,
            "authors" => &self.authors,
            "program_course" => &self.program_course,
            "date_published" => &self.date_published,
            "edition_version" => &self.edition_version,
            "abstract" => &self.abstract_text,
            "keywords" => &self.keywords,
            _ => return None,
        };
        Some(value.as_str())
    }

    /// 項目を更新。未知の項目IDなら `false`
    pub fn set(&mut self, field: &str, value: String) -> bool {
        let slot = match field {
            "title" => &mut self.title,
            "authors" => &mut self.authors,
            "program_course" => &mut self.program_course,
            "date_published" => &mut self.date_published,
            "edition_version" => &mut self.edition_version,
            "abstract" => &mut self.abstract_text,
            "keywords" => &mut self.keywords,
            _ => return false,
        };
        *slot = value;
        true
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// 論文登録APIのリクエストボディ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThesisRecord {
    pub title: String,
    pub authors: String,
    pub program_course: String,
    pub date_published: Option<String>,
    pub edition_version: String,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    pub keywords: Option<String>,
}

impl ThesisRecord {
    pub fn from_form(form: &ThesisForm) -> Self {
        Self {
            title: form.title.clone(),
            authors: form.authors.clone(),
            program_course: form.program_course.clone(),
            date_published: convert_month_year_to_date(Some(&form.date_published)),
            edition_version: non_empty(&form.edition_version)
                .unwrap_or_else(|| DEFAULT_EDITION.to_string()),
            abstract_text: non_empty(&form.abstract_text),
            keywords: non_empty(&form.keywords),
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// 登録APIのレスポンス（IDは数値・文字列どちらもあり得る）
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedThesis {
    pub id: Value,
}

/// ステップごとの精度（なしは "N/A"）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Accuracy {
    Score(f64),
    NotAvailable(String),
}

impl Accuracy {
    pub fn from_option(value: Option<f64>) -> Self {
        match value {
            Some(score) => Accuracy::Score(score),
            None => Accuracy::NotAvailable("N/A".to_string()),
        }
    }

    pub fn score(&self) -> Option<f64> {
        match self {
            Accuracy::Score(s) => Some(*s),
            Accuracy::NotAvailable(_) => None,
        }
    }
}

/// ローカル履歴の1件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// 登録APIが返したID（旧形式の記録では欠落していることがある）
    #[serde(default)]
    pub thesis_id: Value,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub program: String,
    /// 正規化前の入力値
    #[serde(default)]
    pub date: String,
    #[serde(default, rename = "abstract")]
    pub abstract_text: String,
    #[serde(default)]
    pub keywords: String,
    #[serde(default)]
    pub accuracy: Vec<Accuracy>,
    #[serde(default)]
    pub scanned_at: String,
    /// 知らない項目は書き戻し時にそのまま残す
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl HistoryEntry {
    pub fn new(
        thesis_id: Value,
        form: &ThesisForm,
        accuracy: &[Option<f64>],
        scanned_at: String,
    ) -> Self {
        Self {
            thesis_id,
            title: form.title.clone(),
            author: form.authors.clone(),
            program: form.program_course.clone(),
            date: form.date_published.clone(),
            abstract_text: form.abstract_text.clone(),
            keywords: form.keywords.clone(),
            accuracy: accuracy.iter().copied().map(Accuracy::from_option).collect(),
            scanned_at,
            extra: Map::new(),
        }
    }
}

/// 追記専用の履歴ログ
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryLog {
    entries: Vec<HistoryEntry>,
}

impl HistoryLog {
    /// 保存済みJSONを読み込み（空文字は空ログ）
    pub fn from_json(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn append(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
