//! プレビュー画像と範囲選択オーバーレイ

use crate::app::Controller;
use crate::crop::relative_point;
use leptos::prelude::*;
use thesis_capture_common::RegionStrategy;
use web_sys::MouseEvent;

#[component]
pub fn CropOverlay() -> impl IntoView {
    let controller = expect_context::<Controller>();
    let workflow = controller.workflow;
    let preview = controller.preview;

    let enabled = move || workflow.with(|w| w.strategy() == RegionStrategy::Cropped);
    let latest = move || {
        workflow.with(|w| {
            w.current_captures()
                .and_then(|c| c.latest().cloned())
                .unwrap_or_default()
        })
    };

    let point_of = move |ev: &MouseEvent| preview.get_untracked().map(|img| relative_point(ev, &img));

    let on_mousedown = move |ev: MouseEvent| {
        if !enabled() {
            return;
        }
        ev.prevent_default();
        if let Some(p) = point_of(&ev) {
            workflow.update(|w| w.crop_mut().begin_selection(p));
        }
    };
    let on_mousemove = move |ev: MouseEvent| {
        if !workflow.with_untracked(|w| w.crop().is_dragging()) {
            return;
        }
        if let Some(p) = point_of(&ev) {
            workflow.update(|w| w.crop_mut().update_selection(p));
        }
    };
    let on_mouseup = move |_: MouseEvent| {
        if workflow.with_untracked(|w| w.crop().is_dragging()) {
            workflow.update(|w| w.crop_mut().end_selection());
        }
    };

    let selection_style = move || {
        workflow
            .with(|w| w.crop().rectangle())
            .map(|r| {
                format!(
                    "display: block; left: {}px; top: {}px; width: {}px; height: {}px",
                    r.x, r.y, r.width, r.height
                )
            })
            .unwrap_or_else(|| "display: none".to_string())
    };

    view! {
        <div
            class="preview-wrapper"
            class:cropping=enabled
            on:mousedown=on_mousedown
            on:mousemove=on_mousemove
            on:mouseup=on_mouseup
            on:mouseleave=on_mouseup
        >
            <img node_ref=preview class="captured-image" src=latest draggable="false" />
            <div class="crop-selection" style=selection_style />
        </div>
    }
}
