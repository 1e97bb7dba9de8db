//! thesis-capture ライブラリ
//!
//! 論文の表紙・抄録をステップごとに撮影し、OCRで項目を抽出して登録する。

pub mod api;
pub mod camera;
pub mod cli;
pub mod config;
pub mod error;
pub mod history;
pub mod imaging;
pub mod interactive;
pub mod logging;
pub mod persistence;
pub mod session;
