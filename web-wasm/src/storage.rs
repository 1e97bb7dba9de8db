//! localStorage（トークン・履歴ログ）

use gloo::storage::{LocalStorage, Storage};
use thesis_capture_common::{format_long_date, HistoryEntry, HistoryLog, HISTORY_KEY};

const TOKEN_KEY: &str = "token";
const LIBRARIAN_KEY: &str = "librarianId";

/// トークンがないときの遷移先
pub const LOGIN_PAGE: &str = "./";

/// ログアウト後の遷移先（ロール選択）
pub const ROLE_SELECT_PAGE: &str = "index.html";

/// 保存済みトークン（空文字は未ログイン扱い）
pub fn token() -> Option<String> {
    LocalStorage::raw()
        .get_item(TOKEN_KEY)
        .ok()
        .flatten()
        .filter(|t| !t.trim().is_empty())
}

pub fn logout() {
    let storage = LocalStorage::raw();
    let _ = storage.remove_item(TOKEN_KEY);
    let _ = storage.remove_item(LIBRARIAN_KEY);
    redirect(ROLE_SELECT_PAGE);
}

pub fn redirect(href: &str) {
    if let Err(e) = gloo::utils::window().location().set_href(href) {
        web_sys::console::error_1(&e);
    }
}

/// 履歴ログを読み込み（未保存なら空）
///
/// 読めない内容が保存されている場合はエラー。
pub fn load_history() -> Result<HistoryLog, String> {
    let text = LocalStorage::raw()
        .get_item(HISTORY_KEY)
        .map_err(|e| format!("{:?}", e))?
        .unwrap_or_default();
    HistoryLog::from_json(&text).map_err(|e| e.to_string())
}

/// 履歴に1件追記
///
/// 既存の履歴が読めないときは上書きしない。
pub fn append_history(entry: HistoryEntry) -> Result<usize, String> {
    let mut log = load_history()?;
    log.append(entry);
    let json = log.to_json().map_err(|e| e.to_string())?;
    LocalStorage::raw()
        .set_item(HISTORY_KEY, &json)
        .map_err(|e| format!("{:?}", e))?;
    Ok(log.len())
}

/// 今日の日付（例: "October 15, 2026"）
pub fn today_label() -> String {
    let now = js_sys::Date::new_0();
    format_long_date(now.get_full_year() as i32, now.get_month() + 1, now.get_date())
        .unwrap_or_default()
}
