//! Thesis Capture Web App (Leptos + WASM)

mod api;
mod app;
mod camera;
mod components;
mod crop;
mod storage;

use leptos::prelude::*;
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();

    // トークンがなければログイン画面へ戻す
    if storage::token().is_none() {
        storage::redirect(storage::LOGIN_PAGE);
        return;
    }

    leptos::mount::mount_to_body(app::App);
}
