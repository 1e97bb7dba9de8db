//! 発行年月の正規化
//!
//! OCRが返す "January 2025" 形式を "2025-01-01" に変換する。
//! 変換できない入力はそのまま返す（保存は止めない）。

use crate::error::{Error, Result};

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// 月名から月番号（1-12）を取得（大文字小文字を区別しない）
pub fn month_number(name: &str) -> Option<u32> {
    let lower = name.to_lowercase();
    MONTHS
        .iter()
        .position(|m| *m == lower)
        .map(|i| i as u32 + 1)
}

/// "Month Year" を "YYYY-MM-01" に変換
///
/// 語数が2でない、月名が不正、年が数字でない場合は `MalformedDateInput`。
pub fn parse_month_year(input: &str) -> Result<String> {
    let parts: Vec<&str> = input.split_whitespace().collect();
    let [month, year] = parts.as_slice() else {
        return Err(Error::MalformedDateInput(input.to_string()));
    };

    let month = month_number(month).ok_or_else(|| Error::MalformedDateInput(input.to_string()))?;

    if year.is_empty() || !year.chars().all(|c| c.is_ascii_digit()) {
        return Err(Error::MalformedDateInput(input.to_string()));
    }

    Ok(format!("{}-{:02}-01", year, month))
}

/// フォーム値の日付変換
///
/// - `None` / 空文字 → `None`
/// - 変換成功 → ISO日付
/// - 変換失敗 → 入力をそのまま返す
pub fn convert_month_year_to_date(input: Option<&str>) -> Option<String> {
    let input = input.filter(|s| !s.is_empty())?;
    Some(parse_month_year(input).unwrap_or_else(|_| input.to_string()))
}

/// 保存日の表示形式（例: "October 15, 2026"）
pub fn format_long_date(year: i32, month: u32, day: u32) -> Option<String> {
    let name = MONTHS.get(month.checked_sub(1)? as usize)?;
    let mut chars = name.chars();
    let first = chars.next()?.to_ascii_uppercase();
    Some(format!("{}{} {}, {}", first, chars.as_str(), day, year))
}
