//! 撮影セッション
//!
//! ワークフロー状態・撮影ソース・APIクライアントを1つにまとめたコントローラ。
//! ワークフローが返す `Effect` をここで実行し、利用者向けの通知だけを返す。

use crate::api::{OcrService, ThesisBackend};
use crate::camera::FrameSource;
use crate::config::Config;
use crate::error::Result;
use crate::history::HistoryStore;
use crate::imaging;
use crate::persistence;
use std::path::{Path, PathBuf};
use thesis_capture_common::{
    saved_notices, CameraConstraints, Effect, Error, ExtractRequest, Mode, Notice, Point, Size,
    Workflow,
};

/// 撮影画像の処理設定
#[derive(Debug, Clone)]
pub struct CaptureSettings {
    pub max_width: u32,
    pub jpeg_quality: u8,
    pub preview_width: u32,
    /// 範囲選択用プレビューの書き出し先（なしなら書き出さない）
    pub preview_path: Option<PathBuf>,
    pub constraints: CameraConstraints,
}

impl CaptureSettings {
    pub fn from_config(config: &Config, preview_path: Option<PathBuf>) -> Self {
        Self {
            max_width: config.max_image_width,
            jpeg_quality: config.jpeg_quality,
            preview_width: config.preview_width,
            preview_path,
            constraints: config.camera.clone(),
        }
    }
}

pub struct Session<C, O, B> {
    workflow: Workflow<Vec<u8>>,
    camera: C,
    ocr: O,
    backend: B,
    history: HistoryStore,
    settings: CaptureSettings,
    /// 現在のプレビューの表示サイズ
    preview_size: Option<Size>,
}

impl<C: FrameSource, O: OcrService, B: ThesisBackend> Session<C, O, B> {
    pub fn new(
        workflow: Workflow<Vec<u8>>,
        camera: C,
        ocr: O,
        backend: B,
        history: HistoryStore,
        settings: CaptureSettings,
    ) -> Self {
        Self {
            workflow,
            camera,
            ocr,
            backend,
            history,
            settings,
            preview_size: None,
        }
    }

    pub fn workflow(&self) -> &Workflow<Vec<u8>> {
        &self.workflow
    }

    pub fn ocr(&self) -> &O {
        &self.ocr
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn preview_path(&self) -> Option<&Path> {
        self.settings.preview_path.as_deref()
    }

    pub fn preview_size(&self) -> Option<Size> {
        self.preview_size
    }

    /// カメラを取得して最初のステップを開始
    pub fn start(&mut self) -> Vec<Notice> {
        self.apply(vec![Effect::StartCamera, Effect::ShowLiveFeed])
    }

    pub fn stop(&mut self) {
        self.camera.release();
        self.workflow.set_camera_live(false);
    }

    pub fn capture(&mut self) -> Vec<Notice> {
        if !self.workflow.view().capture_visible {
            return vec![Notice::warning(
                "Capture is not available now. Retake or select a step first.",
            )];
        }
        if !self.camera.is_active() {
            let mut notices = self.apply(vec![Effect::StartCamera]);
            if !self.camera.is_active() {
                return notices;
            }
            notices.extend(self.capture());
            return notices;
        }

        let frame = match self.camera.snapshot() {
            Ok(frame) => frame,
            Err(e) => return vec![Notice::error(e.to_string())],
        };
        let bytes = match imaging::prepare_capture(
            &frame,
            self.settings.max_width,
            self.settings.jpeg_quality,
        ) {
            Ok(bytes) => bytes,
            Err(e) => return vec![Notice::error(e.to_string())],
        };

        tracing::info!(
            step = self.workflow.step_index() + 1,
            bytes = bytes.len(),
            "captured"
        );
        let effects = self.workflow.capture(bytes);
        self.apply(effects)
    }

    pub fn retake(&mut self) -> Vec<Notice> {
        let effects = self.workflow.retake();
        self.apply(effects)
    }

    /// プレビュー座標で範囲を選択（2点、順不同）
    pub fn select_crop(&mut self, from: Point, to: Point) -> Vec<Notice> {
        if self.workflow.mode() != Mode::Review {
            return vec![Notice::warning("Capture an image before selecting a region.")];
        }

        let crop = self.workflow.crop_mut();
        crop.begin_selection(from);
        crop.update_selection(to);
        crop.end_selection();

        match self.workflow.crop().rectangle() {
            Some(rect) => vec![Notice::info(format!(
                "Selected {:.0}x{:.0} at ({:.0}, {:.0}).",
                rect.width, rect.height, rect.x, rect.y
            ))],
            None => vec![Notice::warning(
                "Selection is empty; the full capture will be used.",
            )],
        }
    }

    pub fn clear_crop(&mut self) {
        self.workflow.crop_mut().clear();
    }

    /// 現在ステップの画像をOCRに送り、結果を反映して次へ進む
    pub async fn extract(&mut self) -> Vec<Notice> {
        let request = match self.workflow.begin_extract() {
            Ok(request) => request,
            Err(notice) => return vec![notice],
        };

        let outcome = match self.region_images(&request) {
            Ok(images) => self
                .ocr
                .submit(request.step_index, &request.endpoint, &images)
                .await
                .map_err(failure_detail),
            Err(e) => Err(e.to_string()),
        };

        if let Err(detail) = &outcome {
            tracing::warn!(step = request.step_index + 1, %detail, "extraction failed");
        }
        let effects = self.workflow.finish_extract(outcome);
        self.apply(effects)
    }

    pub fn jump_to(&mut self, index: usize) -> Vec<Notice> {
        match self.workflow.jump_to(index) {
            Ok(effects) => self.apply(effects),
            Err(e) => vec![Notice::error(e.to_string())],
        }
    }

    /// フォーム項目の手入力修正
    pub fn set_field(&mut self, field: &str, value: String) -> Vec<Notice> {
        if self.workflow.form_mut().set(field, value) {
            vec![Notice::info(format!("Updated {}.", field))]
        } else {
            vec![Notice::warning(format!("Unknown field: {}", field))]
        }
    }

    /// フォームを保存。登録に成功した場合のみワークフローを初期化する
    pub async fn save(&mut self, scanned_at: String) -> Vec<Notice> {
        let accuracy = self.workflow.captures().accuracy_vector();
        let registered =
            persistence::register(&self.backend, self.workflow.form(), &accuracy, scanned_at).await;

        match registered {
            Ok(entry) => {
                let history_updated = match self.history.append(entry) {
                    Ok(_) => true,
                    Err(e) => {
                        tracing::warn!(error = %e, path = %self.history.path().display(), "history not updated");
                        false
                    }
                };
                let mut notices = saved_notices(history_updated);
                let effects = self.workflow.reset();
                notices.extend(self.apply(effects));
                notices
            }
            Err(e) => {
                tracing::error!(error = %e, "save failed");
                vec![Notice::error("Error saving. Please try again.")]
            }
        }
    }

    fn region_images(&self, request: &ExtractRequest<Vec<u8>>) -> Result<Vec<Vec<u8>>> {
        let Some(selection) = request.crop else {
            return Ok(request.images.clone());
        };

        let mut images = Vec::with_capacity(request.images.len());
        for bytes in &request.images {
            let rendered = match self.preview_size {
                Some(size) => size,
                None => {
                    let image = imaging::decode(bytes)?;
                    Size::new(image.width() as f64, image.height() as f64)
                }
            };
            images.push(imaging::crop_capture(
                bytes,
                selection,
                rendered,
                self.settings.jpeg_quality,
            )?);
        }
        Ok(images)
    }

    fn apply(&mut self, effects: Vec<Effect>) -> Vec<Notice> {
        let mut notices = Vec::new();

        for effect in effects {
            match effect {
                Effect::Notify(notice) => notices.push(notice),
                Effect::StartCamera => match self.camera.acquire(&self.settings.constraints) {
                    Ok(()) => self.workflow.set_camera_live(true),
                    Err(e) => {
                        self.workflow.set_camera_live(false);
                        notices.push(Notice::error(e.to_string()));
                    }
                },
                Effect::ShowLiveFeed => {
                    self.preview_size = None;
                }
                Effect::ShowPreview => {
                    self.preview_size = None;
                    let latest = self.workflow.current_captures().and_then(|c| c.latest());
                    if let (Some(bytes), Some(path)) = (latest, &self.settings.preview_path) {
                        match imaging::write_preview(bytes, self.settings.preview_width, path) {
                            Ok(size) => self.preview_size = Some(size),
                            Err(e) => notices.push(Notice::warning(format!(
                                "Preview could not be written: {}",
                                e
                            ))),
                        }
                    }
                }
                Effect::FieldUpdated { field, value } => {
                    tracing::debug!(%field, chars = value.chars().count(), "field updated");
                }
                Effect::FormCleared => tracing::debug!("form cleared"),
                Effect::Completed => tracing::info!("all steps complete"),
            }
        }

        notices
    }
}

/// 通知用のエラー詳細
fn failure_detail(error: Error) -> String {
    match error {
        Error::OcrRequestFailed(detail) => detail,
        other => other.to_string(),
    }
}
