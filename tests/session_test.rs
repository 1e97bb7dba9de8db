//! 撮影セッションテスト
//!
//! フォルダカメラ + 偽のOCR/登録APIで、撮影→抽出→保存の一連の流れを検証

use image::{DynamicImage, Rgb, RgbImage};
use serde_json::json;
use std::path::Path;
use std::sync::Mutex;
use tempfile::tempdir;
use thesis_capture::api::{OcrService, ThesisBackend};
use thesis_capture::camera::FolderCamera;
use thesis_capture::history::HistoryStore;
use thesis_capture::session::{CaptureSettings, Session};
use thesis_capture_common::{
    AdvancePolicy, CameraConstraints, CreatedThesis, Error, Mode, Notice, NoticeLevel, OcrResult,
    Point, RegionStrategy, Result, StepPlan, ThesisRecord, Workflow,
};

/// 送信内容を記録する偽OCR
#[derive(Default)]
struct FakeOcr {
    fail_steps: Vec<usize>,
    calls: Mutex<Vec<(String, Vec<(u32, u32)>)>>,
}

impl OcrService for FakeOcr {
    async fn submit(&self, step_index: usize, endpoint: &str, images: &[Vec<u8>]) -> Result<OcrResult> {
        let sizes = images
            .iter()
            .map(|bytes| {
                let img = image::load_from_memory(bytes).expect("JPEGでない");
                (img.width(), img.height())
            })
            .collect();
        self.calls.lock().unwrap().push((endpoint.to_string(), sizes));

        if self.fail_steps.contains(&step_index) {
            return Err(Error::OcrRequestFailed("503 Service Unavailable".into()));
        }

        let result = match step_index {
            0 => OcrResult::default()
                .with_field("title", "Rice Yield Under Drought")
                .with_field("authors", "J. Dela Cruz")
                .with_accuracy(92.0),
            1 => OcrResult::default()
                .with_field("program_course", "BS Agriculture")
                .with_field("date_published", "June 2023")
                .with_accuracy(88.0),
            2 => OcrResult::default()
                .with_field("abstract", "We study rice.")
                .with_accuracy(81.0),
            _ => OcrResult::default()
                .with_field("keywords", "rice, drought")
                .with_accuracy(95.5),
        };
        Ok(result)
    }
}

/// 登録内容を記録する偽API
#[derive(Default)]
struct FakeBackend {
    reject: bool,
    records: Mutex<Vec<ThesisRecord>>,
}

impl ThesisBackend for FakeBackend {
    async fn create(&self, record: &ThesisRecord) -> Result<CreatedThesis> {
        if self.reject {
            return Err(Error::PersistenceFailed("500 Internal Server Error".into()));
        }
        let mut records = self.records.lock().unwrap();
        records.push(record.clone());
        Ok(CreatedThesis {
            id: json!(records.len() as u64 + 40),
        })
    }
}

fn write_frames(dir: &Path, count: usize, width: u32, height: u32) {
    for i in 0..count {
        let img = RgbImage::from_fn(width, height, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, i as u8]));
        DynamicImage::ImageRgb8(img)
            .save(dir.join(format!("frame{:02}.png", i)))
            .expect("画像の書き出し失敗");
    }
}

fn settings(preview: Option<&Path>) -> CaptureSettings {
    CaptureSettings {
        max_width: 800,
        jpeg_quality: 80,
        preview_width: 200,
        preview_path: preview.map(|p| p.to_path_buf()),
        constraints: CameraConstraints::default(),
    }
}

fn session(
    frames: &Path,
    history: &Path,
    strategy: RegionStrategy,
    ocr: FakeOcr,
    backend: FakeBackend,
    preview: Option<&Path>,
) -> Session<FolderCamera, FakeOcr, FakeBackend> {
    Session::new(
        Workflow::new(StepPlan::thesis(), AdvancePolicy::AdvanceAndFlag, strategy),
        FolderCamera::new(frames),
        ocr,
        backend,
        HistoryStore::new(history),
        settings(preview),
    )
}

fn has(notices: &[Notice], level: NoticeLevel, text: &str) -> bool {
    notices
        .iter()
        .any(|n| n.level == level && n.message.contains(text))
}

/// 4ステップを撮影・抽出して保存すると履歴に追記され、初期状態に戻る
#[tokio::test]
async fn test_full_session_save() {
    let frames = tempdir().expect("Failed to create temp dir");
    let data = tempdir().expect("Failed to create temp dir");
    write_frames(frames.path(), 5, 1000, 700);
    let history_path = data.path().join("ocr_scans.json");

    let mut s = session(
        frames.path(),
        &history_path,
        RegionStrategy::FullFrame,
        FakeOcr::default(),
        FakeBackend::default(),
        None,
    );
    assert!(s.start().is_empty());

    // ステップ1・2
    for _ in 0..2 {
        s.capture();
        let notices = s.extract().await;
        assert!(has(&notices, NoticeLevel::Success, "OCR complete"));
    }
    assert_eq!(s.workflow().step_index(), 2);

    // ステップ3は2ページ
    s.capture();
    assert_eq!(s.workflow().mode(), Mode::Review);
    s.capture();
    assert_eq!(s.workflow().current_captures().unwrap().len(), 2);
    s.extract().await;

    s.capture();
    let notices = s.extract().await;
    assert!(has(&notices, NoticeLevel::Success, "Keywords OCR complete. Accuracy: 95.5%"));
    assert!(has(&notices, NoticeLevel::Success, "All steps completed"));
    assert!(s.workflow().is_complete());

    let form = s.workflow().form().clone();
    assert_eq!(form.title, "Rice Yield Under Drought");
    assert_eq!(form.date_published, "June 2023");

    let notices = s.save("October 15, 2026".into()).await;
    assert!(has(&notices, NoticeLevel::Success, "Book information saved successfully!"));

    // 初期状態に戻る
    assert_eq!(s.workflow().step_index(), 0);
    assert_eq!(s.workflow().mode(), Mode::Capture);
    assert!(s.workflow().form().title.is_empty());

    // 登録時は日付を正規化、履歴は入力値のまま
    let records = s.backend().records.lock().unwrap().clone();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].date_published.as_deref(), Some("2023-06-01"));
    assert_eq!(records[0].edition_version, "1st");

    let log = HistoryStore::new(&history_path).load().unwrap();
    assert_eq!(log.len(), 1);
    let entry = &log.entries()[0];
    assert_eq!(entry.thesis_id, json!(41));
    assert_eq!(entry.date, "June 2023");
    assert_eq!(
        serde_json::to_value(&entry.accuracy).unwrap(),
        json!([92.0, 88.0, 81.0, 95.5])
    );
}

/// 送信画像は最大幅800pxに縮小され、複数ページはまとめて送られる
#[tokio::test]
async fn test_submitted_images_resized() {
    let frames = tempdir().expect("Failed to create temp dir");
    let data = tempdir().expect("Failed to create temp dir");
    write_frames(frames.path(), 3, 1000, 700);

    let mut s = session(
        frames.path(),
        &data.path().join("h.json"),
        RegionStrategy::FullFrame,
        FakeOcr::default(),
        FakeBackend::default(),
        None,
    );
    s.start();
    s.jump_to(2);
    s.capture();
    s.capture();
    s.extract().await;

    let calls = ocr_calls(&s);
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "/ocr/abstract/");
    assert_eq!(calls[0].1, vec![(800, 560), (800, 560)]);
}

fn ocr_calls(
    s: &Session<FolderCamera, FakeOcr, FakeBackend>,
) -> Vec<(String, Vec<(u32, u32)>)> {
    s.ocr().calls.lock().unwrap().clone()
}

/// 抽出失敗でも既定ポリシーでは次へ進み、失敗が記録される
#[tokio::test]
async fn test_failed_extract_advances() {
    let frames = tempdir().expect("Failed to create temp dir");
    let data = tempdir().expect("Failed to create temp dir");
    write_frames(frames.path(), 2, 320, 240);

    let ocr = FakeOcr {
        fail_steps: vec![0],
        ..Default::default()
    };
    let mut s = session(
        frames.path(),
        &data.path().join("h.json"),
        RegionStrategy::FullFrame,
        ocr,
        FakeBackend::default(),
        None,
    );
    s.start();
    s.capture();
    let notices = s.extract().await;

    assert!(has(
        &notices,
        NoticeLevel::Error,
        "OCR failed. Please try again. (503 Service Unavailable)"
    ));
    assert_eq!(s.workflow().step_index(), 1);
    assert!(s.workflow().captures().get(0).unwrap().failed());
    assert_eq!(s.workflow().form().title, "");
}

/// 保存失敗時はフォームも履歴も変わらない
#[tokio::test]
async fn test_save_failure_keeps_state() {
    let frames = tempdir().expect("Failed to create temp dir");
    let data = tempdir().expect("Failed to create temp dir");
    write_frames(frames.path(), 1, 320, 240);
    let history_path = data.path().join("ocr_scans.json");

    let backend = FakeBackend {
        reject: true,
        ..Default::default()
    };
    let mut s = session(
        frames.path(),
        &history_path,
        RegionStrategy::FullFrame,
        FakeOcr::default(),
        backend,
        None,
    );
    s.start();
    s.capture();
    s.extract().await;
    s.set_field("edition_version", "2nd".into());

    let notices = s.save("October 15, 2026".into()).await;
    assert!(has(&notices, NoticeLevel::Error, "Error saving. Please try again."));
    assert_eq!(s.workflow().form().title, "Rice Yield Under Drought");
    assert_eq!(s.workflow().form().edition_version, "2nd");
    assert_eq!(s.workflow().step_index(), 1);
    assert!(!history_path.exists());
}

/// 登録後に履歴へ書けなくても成功扱いで警告し、履歴ファイルは壊さない
#[tokio::test]
async fn test_save_warns_when_history_unreadable() {
    let frames = tempdir().expect("Failed to create temp dir");
    let data = tempdir().expect("Failed to create temp dir");
    write_frames(frames.path(), 1, 320, 240);
    let history_path = data.path().join("ocr_scans.json");
    std::fs::write(&history_path, "{broken").unwrap();

    let mut s = session(
        frames.path(),
        &history_path,
        RegionStrategy::FullFrame,
        FakeOcr::default(),
        FakeBackend::default(),
        None,
    );
    s.start();
    s.capture();
    s.extract().await;

    let notices = s.save("October 15, 2026".into()).await;
    assert!(has(&notices, NoticeLevel::Success, "Book information saved successfully!"));
    assert!(has(&notices, NoticeLevel::Warning, "history could not be updated"));
    assert_eq!(s.backend().records.lock().unwrap().len(), 1);
    assert_eq!(s.workflow().step_index(), 0);
    assert_eq!(s.workflow().form().title, "");
    assert_eq!(std::fs::read_to_string(&history_path).unwrap(), "{broken");
}

/// 範囲指定はプレビュー座標から元画像座標に変換して切り抜く
#[tokio::test]
async fn test_cropped_region_mapped_from_preview() {
    let frames = tempdir().expect("Failed to create temp dir");
    let data = tempdir().expect("Failed to create temp dir");
    write_frames(frames.path(), 1, 400, 300);
    let preview = data.path().join("preview.jpg");

    let mut s = session(
        frames.path(),
        &data.path().join("h.json"),
        RegionStrategy::Cropped,
        FakeOcr::default(),
        FakeBackend::default(),
        Some(&preview),
    );
    s.start();
    s.capture();

    assert!(preview.exists());
    let size = s.preview_size().expect("プレビューなし");
    assert_eq!((size.width, size.height), (200.0, 150.0));

    // 右下から左上へのドラッグでも同じ範囲
    let notices = s.select_crop(Point::new(100.0, 75.0), Point::new(0.0, 0.0));
    assert!(has(&notices, NoticeLevel::Info, "Selected 100x75"));
    s.extract().await;

    let calls = ocr_calls(&s);
    assert_eq!(calls[0].1, vec![(200, 150)]);
}

/// 撮影前の範囲選択・抽出は警告のみ
#[tokio::test]
async fn test_guards_before_capture() {
    let frames = tempdir().expect("Failed to create temp dir");
    let data = tempdir().expect("Failed to create temp dir");
    write_frames(frames.path(), 1, 320, 240);

    let mut s = session(
        frames.path(),
        &data.path().join("h.json"),
        RegionStrategy::Cropped,
        FakeOcr::default(),
        FakeBackend::default(),
        None,
    );
    s.start();

    let notices = s.select_crop(Point::new(0.0, 0.0), Point::new(10.0, 10.0));
    assert!(has(&notices, NoticeLevel::Warning, "Capture an image"));
    let notices = s.extract().await;
    assert!(has(&notices, NoticeLevel::Warning, "before extracting"));
    assert!(ocr_calls(&s).is_empty());
}

/// 取り込み画像がなくなればカメラエラー通知
#[tokio::test]
async fn test_camera_exhausted() {
    let frames = tempdir().expect("Failed to create temp dir");
    let data = tempdir().expect("Failed to create temp dir");
    write_frames(frames.path(), 1, 320, 240);

    let mut s = session(
        frames.path(),
        &data.path().join("h.json"),
        RegionStrategy::FullFrame,
        FakeOcr::default(),
        FakeBackend::default(),
        None,
    );
    s.start();
    s.capture();
    s.retake();
    assert_eq!(s.workflow().mode(), Mode::Capture);

    let notices = s.capture();
    assert!(has(&notices, NoticeLevel::Error, "Cannot access camera"));
    assert_eq!(s.workflow().mode(), Mode::Capture);
}
