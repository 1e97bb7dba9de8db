use crate::error::CaptureError;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use thesis_capture_common::{AdvancePolicy, Point, Rect, RegionStrategy, Size};

#[derive(Parser)]
#[command(name = "thesis-capture")]
#[command(about = "論文表紙・抄録の撮影OCR登録ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// アクセストークンを保存
    Login {
        /// アクセストークン
        #[arg(long, required = true)]
        token: String,

        /// 司書ID
        #[arg(long)]
        librarian_id: Option<String>,
    },

    /// アクセストークンを削除
    Logout,

    /// 設定を表示/編集
    Config {
        /// 設定を表示
        #[arg(long)]
        show: bool,

        /// APIのベースURLを設定
        #[arg(long)]
        set_base_url: Option<String>,

        /// 抽出失敗時の扱い (advance/retry)
        #[arg(long)]
        set_policy: Option<AdvancePolicy>,

        /// 抽出画像の取り方 (full/crop)
        #[arg(long)]
        set_strategy: Option<RegionStrategy>,

        /// 撮影画像の取り込み元フォルダ
        #[arg(long)]
        set_camera: Option<PathBuf>,
    },

    /// 対話的にステップ撮影→抽出→保存
    Scan {
        /// 撮影画像の取り込み元フォルダ（省略時は設定値）
        #[arg(short, long)]
        camera: Option<PathBuf>,

        /// 抽出画像の取り方 (full/crop)
        #[arg(long)]
        strategy: Option<RegionStrategy>,

        /// 抽出失敗時の扱い (advance/retry)
        #[arg(long)]
        policy: Option<AdvancePolicy>,
    },

    /// 1ステップ分の画像をOCRしてJSONを出力
    Extract {
        /// ステップ番号（0から）
        #[arg(short, long, required = true)]
        step: usize,

        /// 画像ファイル
        #[arg(required = true)]
        images: Vec<PathBuf>,

        /// 切り抜き範囲 x0,y0,x1,y1（--rendered の座標系）
        #[arg(long)]
        crop: Option<CropArg>,

        /// 範囲指定時の表示サイズ WxH（省略時は縮小前の元画像サイズ）
        #[arg(long)]
        rendered: Option<SizeArg>,
    },

    /// フォームJSONを登録して履歴に追記
    Save {
        /// フォームJSONファイル
        #[arg(short, long, required = true)]
        input: PathBuf,
    },

    /// 保存履歴を表示/削除
    History {
        /// 履歴を削除
        #[arg(long)]
        clear: bool,
    },
}

/// `--crop` と `--rendered` の組み合わせを検証
///
/// 範囲なしで表示サイズだけ指定された場合はエラー。
pub fn crop_selection(
    crop: Option<CropArg>,
    rendered: Option<SizeArg>,
) -> Result<Option<(Rect, Option<Size>)>, CaptureError> {
    match (crop, rendered) {
        (Some(crop), rendered) => Ok(Some((crop.rect(), rendered.map(|size| size.0)))),
        (None, Some(_)) => Err(CaptureError::InvalidArgument(
            "--rendered は --crop と併用してください".to_string(),
        )),
        (None, None) => Ok(None),
    }
}

/// 切り抜き範囲（2点指定、順不同）
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CropArg {
    pub from: Point,
    pub to: Point,
}

impl CropArg {
    pub fn rect(&self) -> Rect {
        Rect::from_corners(self.from, self.to)
    }
}

impl std::str::FromStr for CropArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values: Vec<f64> = s
            .split(',')
            .map(|v| v.trim().parse::<f64>())
            .collect::<Result<_, _>>()
            .map_err(|_| format!("Invalid crop: {}. Use x0,y0,x1,y1", s))?;

        match values.as_slice() {
            [x0, y0, x1, y1] => Ok(CropArg {
                from: Point::new(*x0, *y0),
                to: Point::new(*x1, *y1),
            }),
            _ => Err(format!("Invalid crop: {}. Use x0,y0,x1,y1", s)),
        }
    }
}

/// 表示サイズ WxH
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SizeArg(pub Size);

impl std::str::FromStr for SizeArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || format!("Invalid size: {}. Use WIDTHxHEIGHT", s);
        let lower = s.to_lowercase();
        let (w, h) = lower.split_once('x').ok_or_else(invalid)?;
        let width: f64 = w.trim().parse().map_err(|_| invalid())?;
        let height: f64 = h.trim().parse().map_err(|_| invalid())?;
        if width <= 0.0 || height <= 0.0 {
            return Err(invalid());
        }
        Ok(SizeArg(Size::new(width, height)))
    }
}
