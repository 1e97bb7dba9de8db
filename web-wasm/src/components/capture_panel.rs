//! 撮影パネル（ライブ映像・プレビュー・操作ボタン）

use crate::app::Controller;
use crate::components::crop_overlay::CropOverlay;
use leptos::prelude::*;
use thesis_capture_common::RegionStrategy;

#[component]
pub fn CapturePanel() -> impl IntoView {
    let controller = expect_context::<Controller>();
    let workflow = controller.workflow;
    let view_state = Memo::new(move |_| controller.view_state());

    let display = |visible: bool| if visible { "block" } else { "none" };
    let inline = |visible: bool| if visible { "inline-block" } else { "none" };

    let page_count = move || {
        workflow.with(|w| w.current_captures().map(|c| c.len()).unwrap_or(0))
    };
    let capture_label = move || {
        if page_count() > 0 && view_state.get().preview_visible {
            "Capture another page"
        } else {
            "Capture"
        }
    };
    let cropping = move || workflow.with(|w| w.strategy() == RegionStrategy::Cropped);

    view! {
        <div class="capture-panel">
            <div class="camera-area">
                <video
                    node_ref=controller.video
                    class="live-feed"
                    autoplay=true
                    style:display=move || display(view_state.get().live_feed_visible)
                />
                <div style:display=move || display(view_state.get().preview_visible)>
                    <CropOverlay />
                </div>
                <span
                    class="capture-indicator"
                    style:display=move || inline(view_state.get().captured_indicator)
                >
                    "✔"
                </span>
            </div>

            <div class="capture-controls">
                <button
                    class="btn btn-primary"
                    style:display=move || inline(view_state.get().capture_visible)
                    on:click=move |_| controller.capture()
                >
                    {capture_label}
                </button>
                <button
                    class="btn btn-secondary"
                    style:display=move || inline(view_state.get().retake_visible)
                    on:click=move |_| controller.retake()
                >
                    "Retake"
                </button>
                <button
                    class="btn btn-primary"
                    style:display=move || inline(view_state.get().extract_visible)
                    disabled=move || !view_state.get().extract_enabled
                    on:click=move |_| controller.extract()
                >
                    {move || if workflow.with(|w| w.is_extracting()) { "Extracting..." } else { "Extract" }}
                </button>
                <label class="crop-toggle">
                    <input
                        type="checkbox"
                        prop:checked=cropping
                        on:change=move |ev| controller.set_cropping(event_target_checked(&ev))
                    />
                    "Select region"
                </label>
                <span class="page-count">{move || format!("{} page(s)", page_count())}</span>
            </div>
        </div>
    }
}
