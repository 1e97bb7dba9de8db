//! 撮影ステップ定義
//!
//! 各ステップは1つ以上のフォーム項目に対応し、
//! ステップ番号ごとにOCRエンドポイントが決まる。

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// 撮影ステップ（起動時に固定、以後不変）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub name: String,
    /// 反映先のフォーム項目ID（順序付き）
    pub fields: Vec<String>,
    /// 複数ページの撮影を許可（Abstractなど）
    #[serde(default)]
    pub multiple: bool,
}

impl Step {
    pub fn new(name: &str, fields: &[&str], multiple: bool) -> Self {
        Self {
            name: name.to_string(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
            multiple,
        }
    }
}

/// ステップ列とOCRエンドポイント列の組
///
/// 2つの列は常に同じ長さ。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepPlan {
    steps: Vec<Step>,
    endpoints: Vec<String>,
}

impl StepPlan {
    pub fn new(steps: Vec<Step>, endpoints: Vec<String>) -> Result<Self> {
        if steps.is_empty() {
            return Err(Error::Config("step plan has no steps".into()));
        }
        if steps.len() != endpoints.len() {
            return Err(Error::Config(format!(
                "step/endpoint count mismatch: {} steps, {} endpoints",
                steps.len(),
                endpoints.len()
            )));
        }
        Ok(Self { steps, endpoints })
    }

    /// 論文登録用の標準4ステップ
    pub fn thesis() -> Self {
        Self {
            steps: vec![
                Step::new("Title & Authors", &["title", "authors"], false),
                Step::new(
                    "Program/Course & Date Published",
                    &["program_course", "date_published"],
                    false,
                ),
                Step::new("Abstract", &["abstract"], true),
                Step::new("Keywords", &["keywords"], false),
            ],
            endpoints: vec![
                "/ocr/title-authors/".into(),
                "/ocr/program-date/".into(),
                "/ocr/abstract/".into(),
                "/ocr/keywords/".into(),
            ],
        }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn step(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    pub fn endpoint(&self, index: usize) -> Option<&str> {
        self.endpoints.get(index).map(|s| s.as_str())
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// 範囲チェック付きでステップを取得
    pub fn checked(&self, index: usize) -> Result<&Step> {
        self.steps.get(index).ok_or(Error::InvalidStep {
            index,
            len: self.steps.len(),
        })
    }
}

impl Default for StepPlan {
    fn default() -> Self {
        Self::thesis()
    }
}

/// 撮影ガイド文
pub fn instruction(step: &Step) -> String {
    format!(
        "Capture {} and click Extract. You can Retake if wrong.",
        step.name
    )
}
