use super::FrameSource;
use crate::error::Result;
use image::DynamicImage;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thesis_capture_common::{CameraConstraints, Error};
use walkdir::WalkDir;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "JPG", "JPEG", "PNG"];

/// フォルダ監視型の撮影ソース
///
/// 撮影のたびに、まだ取り込んでいない画像をファイル名順で1枚取り出す。
#[derive(Debug)]
pub struct FolderCamera {
    folder: PathBuf,
    consumed: HashSet<PathBuf>,
    active: bool,
}

impl FolderCamera {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
            consumed: HashSet::new(),
            active: false,
        }
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// 未取り込みの画像（ファイル名順）
    pub fn pending_frames(&self) -> Vec<PathBuf> {
        let mut frames: Vec<PathBuf> = WalkDir::new(&self.folder)
            .max_depth(1) // 直下のみ
            .into_iter()
            .filter_map(|e| e.ok())
            .map(|e| e.into_path())
            .filter(|p| p.is_file() && is_image_path(p))
            .filter(|p| !self.consumed.contains(p))
            .collect();

        frames.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        frames
    }
}

impl FrameSource for FolderCamera {
    fn acquire(&mut self, constraints: &CameraConstraints) -> Result<()> {
        if !self.folder.is_dir() {
            return Err(Error::CameraUnavailable(format!(
                "capture folder not found: {}",
                self.folder.display()
            ))
            .into());
        }

        tracing::info!(
            folder = %self.folder.display(),
            ideal_width = constraints.ideal_width,
            ideal_height = constraints.ideal_height,
            "camera acquired"
        );
        self.active = true;
        Ok(())
    }

    fn snapshot(&mut self) -> Result<DynamicImage> {
        if !self.active {
            return Err(Error::CameraUnavailable("camera is not started".into()).into());
        }

        let Some(path) = self.pending_frames().into_iter().next() else {
            return Err(Error::CameraUnavailable(format!(
                "no new image in {}",
                self.folder.display()
            ))
            .into());
        };

        let image = image::open(&path)?;
        tracing::debug!(frame = %path.display(), width = image.width(), height = image.height(), "snapshot");
        self.consumed.insert(path);
        Ok(image)
    }

    fn release(&mut self) {
        if self.active {
            tracing::info!("camera released");
        }
        self.active = false;
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

fn is_image_path(path: &Path) -> bool {
    path.extension()
        .map(|ext| IMAGE_EXTENSIONS.iter().any(|&e| e == ext.to_string_lossy()))
        .unwrap_or(false)
}
