use crate::error::{CaptureError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thesis_capture_common::{
    AdvancePolicy, CameraConstraints, RegionStrategy, CAPTURE_JPEG_QUALITY, CAPTURE_MAX_WIDTH,
    DEFAULT_API_BASE_URL,
};

const TOKEN_ENV: &str = "THESIS_CAPTURE_TOKEN";
const BASE_URL_ENV: &str = "THESIS_CAPTURE_BASE_URL";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub token: Option<String>,
    pub librarian_id: Option<String>,
    pub max_image_width: u32,
    pub jpeg_quality: u8,
    /// 範囲選択用プレビューの表示幅
    pub preview_width: u32,
    pub timeout_seconds: u64,
    pub advance_policy: AdvancePolicy,
    pub region_strategy: RegionStrategy,
    /// 撮影画像の取り込み元フォルダ
    pub camera_folder: Option<PathBuf>,
    pub camera: CameraConstraints,
    /// 履歴ファイルの保存先（省略時はデータディレクトリ）
    pub history_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default_config())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CaptureError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("thesis-capture").join("config.json"))
    }

    fn default_config() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            token: None,
            librarian_id: None,
            max_image_width: CAPTURE_MAX_WIDTH,
            jpeg_quality: CAPTURE_JPEG_QUALITY,
            preview_width: 480,
            timeout_seconds: 120,
            advance_policy: AdvancePolicy::default(),
            region_strategy: RegionStrategy::default(),
            camera_folder: None,
            camera: CameraConstraints::default(),
            history_path: None,
        }
    }

    /// APIのベースURL（環境変数を優先）
    pub fn base_url(&self) -> String {
        match std::env::var(BASE_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => url,
            _ => self.api_base_url.clone(),
        }
    }

    /// アクセストークン（環境変数を優先）
    ///
    /// 未設定ならワークフローを開始しない。
    pub fn get_token(&self) -> Result<String> {
        if let Ok(token) = std::env::var(TOKEN_ENV) {
            if !token.trim().is_empty() {
                return Ok(token);
            }
        }

        self.token
            .clone()
            .filter(|t| !t.trim().is_empty())
            .ok_or(CaptureError::Workflow(thesis_capture_common::Error::MissingToken))
    }

    pub fn set_token(&mut self, token: String, librarian_id: Option<String>) -> Result<()> {
        self.token = Some(token);
        if librarian_id.is_some() {
            self.librarian_id = librarian_id;
        }
        self.save()
    }

    pub fn clear_token(&mut self) -> Result<()> {
        self.token = None;
        self.librarian_id = None;
        self.save()
    }

    /// HTTPクライアント（タイムアウト付き）
    pub fn http_client(&self) -> Result<reqwest::Client> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(self.timeout_seconds))
            .build()?;
        Ok(client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = Config::default();
        assert_eq!(config.max_image_width, 800);
        assert_eq!(config.jpeg_quality, 80);
        assert_eq!(config.advance_policy, AdvancePolicy::AdvanceAndFlag);
        assert!(config.token.is_none());
    }

    #[test]
    fn test_partial_config_file() {
        let json = r#"{"api_base_url": "http://localhost:8000", "advance_policy": "retry_in_place"}"#;
        let config: Config = serde_json::from_str(json).expect("デシリアライズ失敗");
        assert_eq!(config.api_base_url, "http://localhost:8000");
        assert_eq!(config.advance_policy, AdvancePolicy::RetryInPlace);
        assert_eq!(config.timeout_seconds, 120);
        assert_eq!(config.region_strategy, RegionStrategy::FullFrame);
    }

    #[test]
    fn test_blank_token_is_missing() {
        let config = Config {
            token: Some("   ".into()),
            ..Config::default()
        };
        if std::env::var(TOKEN_ENV).is_err() {
            assert!(config.get_token().is_err());
        }
    }
}
