//! メインアプリケーションコンポーネント
//!
//! ワークフロー状態はシグナル1つに持ち、操作が返す指示（`FlowEffect`）を
//! `Controller::apply` でDOM・カメラ・通知に反映する。

use crate::components::{
    capture_panel::CapturePanel, header::Header, step_indicator::StepIndicator,
    thesis_form::ThesisFormPanel, toasts::Toasts,
};
use crate::{api, camera, crop, storage};
use gloo::timers::callback::Timeout;
use leptos::html;
use leptos::prelude::*;
use leptos::task::spawn_local;
use thesis_capture_common::workflow::Effect as FlowEffect;
use thesis_capture_common::{
    saved_notices, AdvancePolicy, CameraConstraints, ExtractRequest, HistoryEntry, Notice,
    RegionStrategy, StepPlan, ThesisRecord, ViewState, Workflow, DEFAULT_API_BASE_URL,
};

/// 通知の表示時間（ms）
const TOAST_DURATION_MS: u32 = 3000;

/// 表示中の通知
#[derive(Clone, PartialEq)]
pub struct Toast {
    pub id: u64,
    pub notice: Notice,
}

/// 画面全体の操作
#[derive(Clone, Copy)]
pub struct Controller {
    pub workflow: RwSignal<Workflow<String>>,
    pub toasts: RwSignal<Vec<Toast>>,
    pub saving: RwSignal<bool>,
    pub video: NodeRef<html::Video>,
    pub preview: NodeRef<html::Img>,
    next_toast: StoredValue<u64>,
}

impl Controller {
    fn new() -> Self {
        Self {
            workflow: RwSignal::new(Workflow::new(
                StepPlan::thesis(),
                AdvancePolicy::AdvanceAndFlag,
                RegionStrategy::FullFrame,
            )),
            toasts: RwSignal::new(Vec::new()),
            saving: RwSignal::new(false),
            video: NodeRef::new(),
            preview: NodeRef::new(),
            next_toast: StoredValue::new(0),
        }
    }

    pub fn view_state(&self) -> ViewState {
        self.workflow.with(|w| w.view())
    }

    pub fn notify(&self, notice: Notice) {
        let id = self.next_toast.get_value();
        self.next_toast.set_value(id + 1);
        self.toasts.update(|t| t.push(Toast { id, notice }));

        let toasts = self.toasts;
        Timeout::new(TOAST_DURATION_MS, move || {
            toasts.update(|t| t.retain(|toast| toast.id != id));
        })
        .forget();
    }

    pub fn apply(&self, effects: Vec<FlowEffect>) {
        for effect in effects {
            match effect {
                FlowEffect::Notify(notice) => self.notify(notice),
                FlowEffect::StartCamera => self.start_camera(),
                FlowEffect::Completed => self.stop_camera(),
                // 表示はワークフロー状態から導出される
                FlowEffect::ShowLiveFeed
                | FlowEffect::ShowPreview
                | FlowEffect::FieldUpdated { .. }
                | FlowEffect::FormCleared => {}
            }
        }
    }

    pub fn start(&self) {
        self.apply(vec![FlowEffect::StartCamera, FlowEffect::ShowLiveFeed]);
    }

    fn start_camera(&self) {
        let Some(video) = self.video.get_untracked() else {
            return;
        };
        camera::stop(&video);

        let this = *self;
        spawn_local(async move {
            match camera::start(&video, &CameraConstraints::default()).await {
                Ok(()) => this.workflow.update(|w| w.set_camera_live(true)),
                Err(e) => {
                    this.workflow.update(|w| w.set_camera_live(false));
                    this.notify(Notice::error(format!("Cannot access camera: {}", e)));
                }
            }
        });
    }

    pub fn stop_camera(&self) {
        if let Some(video) = self.video.get_untracked() {
            camera::stop(&video);
        }
        self.workflow.update(|w| w.set_camera_live(false));
    }

    pub fn capture(&self) {
        if !self.workflow.with_untracked(|w| w.view().capture_visible) {
            return;
        }
        let Some(video) = self.video.get_untracked() else {
            return;
        };

        match camera::snapshot(&video) {
            Ok(data_url) => {
                let effects = self
                    .workflow
                    .try_update(|w| w.capture(data_url))
                    .unwrap_or_default();
                self.apply(effects);
            }
            Err(e) => self.notify(Notice::error(e)),
        }
    }

    pub fn retake(&self) {
        let effects = self.workflow.try_update(|w| w.retake()).unwrap_or_default();
        self.apply(effects);
    }

    pub fn extract(&self) {
        let Some(begun) = self.workflow.try_update(|w| w.begin_extract()) else {
            return;
        };
        let request = match begun {
            Ok(request) => request,
            Err(notice) => {
                self.notify(notice);
                return;
            }
        };
        let images = self.region_images(&request);

        let this = *self;
        spawn_local(async move {
            let outcome = match images {
                Ok(images) => {
                    api::ocr::submit_step(
                        DEFAULT_API_BASE_URL,
                        request.step_index,
                        &request.endpoint,
                        &images,
                    )
                    .await
                }
                Err(e) => Err(e),
            };
            if let Err(detail) = &outcome {
                web_sys::console::error_1(&format!("OCR error: {}", detail).into());
            }
            let effects = this
                .workflow
                .try_update(|w| w.finish_extract(outcome))
                .unwrap_or_default();
            this.apply(effects);
        });
    }

    /// 範囲選択があれば表示中のプレビューから切り抜く
    fn region_images(&self, request: &ExtractRequest<String>) -> Result<Vec<String>, String> {
        let (Some(selection), Some(img)) = (request.crop, self.preview.get_untracked()) else {
            return Ok(request.images.clone());
        };
        match crop::crop_data_url(&img, selection)? {
            Some(data_url) => Ok(vec![data_url]),
            None => Ok(request.images.clone()),
        }
    }

    pub fn jump_to(&self, index: usize) {
        match self.workflow.try_update(|w| w.jump_to(index)) {
            Some(Ok(effects)) => self.apply(effects),
            Some(Err(e)) => self.notify(Notice::error(e.to_string())),
            None => {}
        }
    }

    pub fn set_field(&self, field: &str, value: String) {
        self.workflow.update(|w| {
            w.form_mut().set(field, value);
        });
    }

    pub fn set_cropping(&self, enabled: bool) {
        let strategy = if enabled {
            RegionStrategy::Cropped
        } else {
            RegionStrategy::FullFrame
        };
        self.workflow.update(|w| w.set_strategy(strategy));
    }

    /// 論文を登録し、成功したら履歴に追記して最初から
    pub fn save(&self) {
        if self.saving.get_untracked() {
            return;
        }
        self.saving.set(true);

        let (form, accuracy) = self
            .workflow
            .with_untracked(|w| (w.form().clone(), w.captures().accuracy_vector()));
        let record = ThesisRecord::from_form(&form);

        let this = *self;
        spawn_local(async move {
            match api::theses::create_thesis(DEFAULT_API_BASE_URL, &record).await {
                Ok(created) => {
                    let entry =
                        HistoryEntry::new(created.id, &form, &accuracy, storage::today_label());
                    let history_updated = match storage::append_history(entry) {
                        Ok(_) => true,
                        Err(e) => {
                            web_sys::console::error_1(&format!("history: {}", e).into());
                            false
                        }
                    };
                    for notice in saved_notices(history_updated) {
                        this.notify(notice);
                    }
                    let effects = this.workflow.try_update(|w| w.reset()).unwrap_or_default();
                    this.apply(effects);
                }
                Err(e) => {
                    web_sys::console::error_1(&format!("save: {}", e).into());
                    this.notify(Notice::error("Error saving. Please try again."));
                }
            }
            this.saving.set(false);
        });
    }

    pub fn logout(&self) {
        self.stop_camera();
        storage::logout();
    }
}

/// メインアプリケーションコンポーネント
#[component]
pub fn App() -> impl IntoView {
    let controller = Controller::new();
    provide_context(controller);

    // 映像要素がマウントされたらカメラを起動
    let started = StoredValue::new(false);
    Effect::new(move |_| {
        if controller.video.get().is_some() && !started.get_value() {
            started.set_value(true);
            controller.start();
        }
    });

    view! {
        <div class="container">
            <Header />
            <StepIndicator />
            <CapturePanel />
            <ThesisFormPanel />
            <Toasts />
        </div>
    }
}
