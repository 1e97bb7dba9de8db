//! ヘッダーコンポーネント

use crate::app::Controller;
use leptos::prelude::*;

#[component]
pub fn Header() -> impl IntoView {
    let controller = expect_context::<Controller>();

    view! {
        <header class="header">
            <h1>"Thesis Capture"</h1>
            <button class="btn btn-tertiary btn-small" on:click=move |_| controller.logout()>
                "Logout"
            </button>
        </header>
    }
}
