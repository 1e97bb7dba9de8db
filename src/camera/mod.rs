//! 撮影ソース
//!
//! ライブ映像の取得・静止画の切り出し・解放を `FrameSource` として抽象化する。
//! CLIではフォルダに置かれた撮影画像（スマホ・スキャナの転送先）を順に取り込む。

mod folder;

pub use folder::FolderCamera;

use crate::error::Result;
use image::DynamicImage;
use thesis_capture_common::CameraConstraints;

pub trait FrameSource {
    /// 映像ソースを取得（失敗時は `CameraUnavailable`）
    fn acquire(&mut self, constraints: &CameraConstraints) -> Result<()>;

    /// 静止画を元解像度で取得
    fn snapshot(&mut self) -> Result<DynamicImage>;

    /// 映像ソースを解放
    fn release(&mut self);

    fn is_active(&self) -> bool;
}
