//! 一時通知

use crate::app::Controller;
use leptos::prelude::*;
use thesis_capture_common::NoticeLevel;

fn level_class(level: NoticeLevel) -> &'static str {
    match level {
        NoticeLevel::Success => "toast toast-success",
        NoticeLevel::Info => "toast toast-info",
        NoticeLevel::Warning => "toast toast-warning",
        NoticeLevel::Error => "toast toast-error",
    }
}

#[component]
pub fn Toasts() -> impl IntoView {
    let controller = expect_context::<Controller>();

    view! {
        <div class="toasts">
            <For
                each=move || controller.toasts.get()
                key=|toast| toast.id
                children=move |toast| {
                    view! {
                        <div class=level_class(toast.notice.level)>{toast.notice.message}</div>
                    }
                }
            />
        </div>
    }
}
