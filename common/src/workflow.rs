//! ステップ撮影ワークフロー
//!
//! 撮影 → 確認 → 抽出 → 次ステップ の状態遷移を純粋なロジックとして持つ。
//! 各操作は画面・カメラへの指示（`Effect`）を返し、描画はフロントエンド側
//! （CLI / Web）が行う。ネットワーク呼び出しは `begin_extract` と
//! `finish_extract` の間でフロントエンドが実行する。
//!
//! 画像型 `T` はフロントエンドごとに異なる（CLIはJPEGバイト列、WebはData URL）。

use crate::crop::{CropSelector, Rect};
use crate::error::Result;
use crate::ocr::{format_accuracy, OcrResult};
use crate::record::ThesisForm;
use crate::steps::{Step, StepPlan};
use serde::{Deserialize, Serialize};

/// 抽出失敗時の扱い
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvancePolicy {
    /// 失敗しても次へ進み、ステップに失敗フラグを付ける
    #[default]
    AdvanceAndFlag,
    /// 同じステップに留まり、撮り直し・再抽出を待つ
    RetryInPlace,
}

impl std::str::FromStr for AdvancePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "advance" | "advance_and_flag" => Ok(AdvancePolicy::AdvanceAndFlag),
            "retry" | "retry_in_place" => Ok(AdvancePolicy::RetryInPlace),
            _ => Err(format!("Unknown policy: {}. Use advance or retry", s)),
        }
    }
}

impl std::fmt::Display for AdvancePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdvancePolicy::AdvanceAndFlag => write!(f, "advance"),
            AdvancePolicy::RetryInPlace => write!(f, "retry"),
        }
    }
}

/// 抽出に使う画像の取り方
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionStrategy {
    /// ステップの撮影画像をすべて送る
    #[default]
    FullFrame,
    /// 最新の撮影画像1枚を、選択範囲があれば切り抜いて送る
    Cropped,
}

impl std::str::FromStr for RegionStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "full" | "full_frame" => Ok(RegionStrategy::FullFrame),
            "crop" | "cropped" => Ok(RegionStrategy::Cropped),
            _ => Err(format!("Unknown strategy: {}. Use full or crop", s)),
        }
    }
}

impl std::fmt::Display for RegionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegionStrategy::FullFrame => write!(f, "full"),
            RegionStrategy::Cropped => write!(f, "crop"),
        }
    }
}

/// 1ステップ分の撮影画像
#[derive(Debug, Clone)]
pub struct StepCaptures<T> {
    images: Vec<T>,
    accuracy: Option<f64>,
    failed: bool,
}

impl<T> Default for StepCaptures<T> {
    fn default() -> Self {
        Self {
            images: Vec::new(),
            accuracy: None,
            failed: false,
        }
    }
}

impl<T> StepCaptures<T> {
    pub fn images(&self) -> &[T] {
        &self.images
    }

    pub fn latest(&self) -> Option<&T> {
        self.images.last()
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn accuracy(&self) -> Option<f64> {
        self.accuracy
    }

    /// 直近の抽出が失敗したか
    pub fn failed(&self) -> bool {
        self.failed
    }
}

/// ステップ番号 → 撮影画像
#[derive(Debug, Clone)]
pub struct CaptureSet<T> {
    entries: Vec<StepCaptures<T>>,
}

impl<T> CaptureSet<T> {
    pub fn new(steps: usize) -> Self {
        Self {
            entries: (0..steps).map(|_| StepCaptures::default()).collect(),
        }
    }

    pub fn get(&self, index: usize) -> Option<&StepCaptures<T>> {
        self.entries.get(index)
    }

    fn push(&mut self, index: usize, image: T) {
        if let Some(entry) = self.entries.get_mut(index) {
            entry.images.push(image);
        }
    }

    fn pop(&mut self, index: usize) -> Option<T> {
        self.entries.get_mut(index)?.images.pop()
    }

    fn clear(&mut self) {
        for entry in &mut self.entries {
            *entry = StepCaptures::default();
        }
    }

    /// ステップ順の精度一覧
    pub fn accuracy_vector(&self) -> Vec<Option<f64>> {
        self.entries.iter().map(|e| e.accuracy).collect()
    }
}

/// 通知の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// 利用者への一時通知
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Success, message: message.into() }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Info, message: message.into() }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Warning, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, message: message.into() }
    }
}

/// 登録成功時の通知
///
/// 論文の登録自体は済んでいるため、履歴に書けなかった場合も成功扱いで警告を添える。
pub fn saved_notices(history_updated: bool) -> Vec<Notice> {
    let mut notices = vec![Notice::success("Book information saved successfully!")];
    if !history_updated {
        notices.push(Notice::warning(
            "Saved, but the local scan history could not be updated.",
        ));
    }
    notices
}

/// フロントエンドへの指示
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Notify(Notice),
    /// カメラを（再）取得する
    StartCamera,
    /// ライブ映像を表示し、撮影画像を隠す
    ShowLiveFeed,
    /// 撮影画像を表示し、ライブ映像を隠す
    ShowPreview,
    /// フォーム項目が更新された
    FieldUpdated { field: String, value: String },
    /// フォームを空にした
    FormCleared,
    /// 全ステップ完了
    Completed,
}

/// ステップ内のサブモード
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Capture,
    Review,
    Complete,
}

/// 表示状態（モードから導出）
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub step_index: usize,
    pub mode: Mode,
    pub live_feed_visible: bool,
    pub preview_visible: bool,
    pub capture_visible: bool,
    pub retake_visible: bool,
    pub extract_visible: bool,
    pub extract_enabled: bool,
    pub captured_indicator: bool,
}

/// 抽出リクエスト（送信はフロントエンドが行う）
#[derive(Debug, Clone)]
pub struct ExtractRequest<T> {
    pub step_index: usize,
    pub step_name: String,
    pub endpoint: String,
    pub images: Vec<T>,
    /// `Cropped` 戦略で範囲選択がある場合のみ
    pub crop: Option<Rect>,
}

/// ワークフロー状態
///
/// 1セッションにつき1つ生成し、コントローラが所有する。
#[derive(Debug, Clone)]
pub struct Workflow<T> {
    plan: StepPlan,
    step_index: usize,
    mode: Mode,
    captures: CaptureSet<T>,
    crop: CropSelector,
    form: ThesisForm,
    policy: AdvancePolicy,
    strategy: RegionStrategy,
    in_flight: Option<usize>,
    camera_live: bool,
}

impl<T: Clone> Workflow<T> {
    pub fn new(plan: StepPlan, policy: AdvancePolicy, strategy: RegionStrategy) -> Self {
        let captures = CaptureSet::new(plan.len());
        Self {
            plan,
            step_index: 0,
            mode: Mode::Capture,
            captures,
            crop: CropSelector::new(),
            form: ThesisForm::default(),
            policy,
            strategy,
            in_flight: None,
            camera_live: false,
        }
    }

    // ----- アクセサ -----

    pub fn plan(&self) -> &StepPlan {
        &self.plan
    }

    pub fn step_index(&self) -> usize {
        self.step_index
    }

    pub fn current_step(&self) -> Option<&Step> {
        self.plan.step(self.step_index)
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_complete(&self) -> bool {
        self.step_index >= self.plan.len()
    }

    pub fn captures(&self) -> &CaptureSet<T> {
        &self.captures
    }

    pub fn current_captures(&self) -> Option<&StepCaptures<T>> {
        self.captures.get(self.step_index)
    }

    pub fn form(&self) -> &ThesisForm {
        &self.form
    }

    /// 手入力による修正用
    pub fn form_mut(&mut self) -> &mut ThesisForm {
        &mut self.form
    }

    pub fn crop(&self) -> &CropSelector {
        &self.crop
    }

    pub fn crop_mut(&mut self) -> &mut CropSelector {
        &mut self.crop
    }

    pub fn policy(&self) -> AdvancePolicy {
        self.policy
    }

    pub fn strategy(&self) -> RegionStrategy {
        self.strategy
    }

    /// 範囲の取り方を切り替え（選択中の範囲は破棄）
    pub fn set_strategy(&mut self, strategy: RegionStrategy) {
        self.strategy = strategy;
        self.crop.clear();
    }

    pub fn is_extracting(&self) -> bool {
        self.in_flight.is_some()
    }

    /// カメラの状態をフロントエンドから通知
    pub fn set_camera_live(&mut self, live: bool) {
        self.camera_live = live;
    }

    pub fn camera_live(&self) -> bool {
        self.camera_live
    }

    pub fn view(&self) -> ViewState {
        let has_images = self
            .current_captures()
            .map(|c| !c.is_empty())
            .unwrap_or(false);
        let multiple = self.current_step().map(|s| s.multiple).unwrap_or(false);
        let extracting = self.is_extracting();

        match self.mode {
            Mode::Complete => ViewState {
                step_index: self.step_index,
                mode: self.mode,
                live_feed_visible: false,
                preview_visible: false,
                capture_visible: false,
                retake_visible: false,
                extract_visible: false,
                extract_enabled: false,
                captured_indicator: false,
            },
            Mode::Capture => ViewState {
                step_index: self.step_index,
                mode: self.mode,
                live_feed_visible: true,
                preview_visible: false,
                capture_visible: true,
                retake_visible: false,
                // ジャンプで戻ったステップは既存の撮影画像で再抽出できる
                extract_visible: has_images,
                extract_enabled: has_images && !extracting,
                captured_indicator: false,
            },
            Mode::Review => ViewState {
                step_index: self.step_index,
                mode: self.mode,
                live_feed_visible: false,
                preview_visible: true,
                capture_visible: multiple && !extracting,
                retake_visible: !extracting,
                extract_visible: true,
                extract_enabled: has_images && !extracting,
                captured_indicator: true,
            },
        }
    }

    // ----- 遷移 -----

    /// 撮影画像を現在ステップに追加
    pub fn capture(&mut self, image: T) -> Vec<Effect> {
        if self.is_complete() {
            return vec![Effect::Notify(Notice::warning(
                "All steps are complete. Select a step to capture again.",
            ))];
        }
        if self.is_extracting() {
            return Vec::new();
        }

        let multiple = self.current_step().map(|s| s.multiple).unwrap_or(false);
        if self.mode == Mode::Review && !multiple {
            return vec![Effect::Notify(Notice::warning(
                "Retake to replace the current capture.",
            ))];
        }

        self.captures.push(self.step_index, image);
        self.crop.clear();
        self.mode = Mode::Review;
        vec![Effect::ShowPreview]
    }

    /// 直近の撮影画像を1枚破棄して撮影モードに戻る
    pub fn retake(&mut self) -> Vec<Effect> {
        if self.is_complete() || self.is_extracting() {
            return Vec::new();
        }

        self.captures.pop(self.step_index);
        self.crop.clear();
        self.mode = Mode::Capture;
        self.live_feed_effects()
    }

    /// 抽出を開始
    ///
    /// 撮影画像がない場合は警告通知を返し、状態は変えない。
    pub fn begin_extract(&mut self) -> std::result::Result<ExtractRequest<T>, Notice> {
        if self.is_extracting() {
            return Err(Notice::info("Extraction already in progress."));
        }
        let Some(step) = self.current_step() else {
            return Err(Notice::warning("All steps are already complete."));
        };
        let step_name = step.name.clone();
        let endpoint = self
            .plan
            .endpoint(self.step_index)
            .unwrap_or_default()
            .to_string();

        let captures = match self.captures.get(self.step_index) {
            Some(c) if !c.is_empty() => c,
            _ => {
                return Err(Notice::warning(format!(
                    "Capture {} before extracting.",
                    step_name
                )))
            }
        };

        let (images, crop) = match self.strategy {
            RegionStrategy::FullFrame => (captures.images().to_vec(), None),
            RegionStrategy::Cropped => (
                captures.latest().cloned().into_iter().collect(),
                self.crop.rectangle(),
            ),
        };

        self.in_flight = Some(self.step_index);
        Ok(ExtractRequest {
            step_index: self.step_index,
            step_name,
            endpoint,
            images,
            crop,
        })
    }

    /// 抽出結果を反映し、ポリシーに従って次へ進む
    ///
    /// `Err` はエラー詳細（通知に使う）。抽出中でなければ何もしない。
    pub fn finish_extract(&mut self, outcome: std::result::Result<OcrResult, String>) -> Vec<Effect> {
        let Some(index) = self.in_flight.take() else {
            return Vec::new();
        };
        let Some(step) = self.plan.step(index).cloned() else {
            return Vec::new();
        };

        let mut effects = Vec::new();
        let succeeded = match outcome {
            Ok(result) => {
                for field in &step.fields {
                    if let Some(value) = result.field(field) {
                        if self.form.set(field, value.clone()) {
                            effects.push(Effect::FieldUpdated {
                                field: field.clone(),
                                value,
                            });
                        }
                    }
                }
                if let Some(entry) = self.captures.entries.get_mut(index) {
                    entry.accuracy = result.accuracy();
                    entry.failed = false;
                }
                effects.push(Effect::Notify(Notice::success(format!(
                    "{} OCR complete. Accuracy: {}",
                    step.name,
                    format_accuracy(result.accuracy())
                ))));
                true
            }
            Err(detail) => {
                if let Some(entry) = self.captures.entries.get_mut(index) {
                    entry.failed = true;
                }
                effects.push(Effect::Notify(Notice::error(format!(
                    "OCR failed. Please try again. ({})",
                    detail
                ))));
                false
            }
        };

        // 抽出中に別ステップへジャンプした場合は進めない
        if self.step_index != index {
            return effects;
        }

        if succeeded || self.policy == AdvancePolicy::AdvanceAndFlag {
            effects.extend(self.advance());
        } else {
            self.mode = Mode::Review;
        }
        effects
    }

    /// 次のステップへ（最終ステップの後は完了状態、それ以上は進まない）
    pub fn advance(&mut self) -> Vec<Effect> {
        if self.is_complete() {
            return Vec::new();
        }

        self.step_index += 1;
        self.crop.clear();

        if self.is_complete() {
            self.mode = Mode::Complete;
            return vec![
                Effect::Completed,
                Effect::Notify(Notice::success(
                    "All steps completed. You can now save the book information.",
                )),
            ];
        }

        self.mode = Mode::Capture;
        self.live_feed_effects()
    }

    /// 任意のステップへ移動（手動修正用）
    pub fn jump_to(&mut self, index: usize) -> Result<Vec<Effect>> {
        self.plan.checked(index)?;
        self.step_index = index;
        self.crop.clear();
        self.mode = Mode::Capture;
        Ok(self.live_feed_effects())
    }

    /// 全撮影画像とフォームを破棄して最初から
    pub fn reset(&mut self) -> Vec<Effect> {
        self.captures.clear();
        self.form.clear();
        self.crop.clear();
        self.step_index = 0;
        self.mode = Mode::Capture;
        self.in_flight = None;
        vec![Effect::FormCleared, Effect::StartCamera, Effect::ShowLiveFeed]
    }

    fn live_feed_effects(&self) -> Vec<Effect> {
        if self.camera_live {
            vec![Effect::ShowLiveFeed]
        } else {
            vec![Effect::StartCamera, Effect::ShowLiveFeed]
        }
    }
}
