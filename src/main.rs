use clap::Parser;
use thesis_capture::api::{OcrClient, OcrService, ThesisClient};
use thesis_capture::camera::FolderCamera;
use thesis_capture::session::{CaptureSettings, Session};
use thesis_capture::{cli, config, error, history, imaging, interactive, logging, persistence};
use cli::{Cli, Commands};
use config::Config;
use error::{CaptureError, Result};
use history::HistoryStore;
use thesis_capture_common::{StepPlan, ThesisForm, Workflow};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    let config = Config::load()?;

    match cli.command {
        Commands::Login { token, librarian_id } => {
            let mut config = config;
            config.set_token(token, librarian_id)?;
            println!("✔ トークンを保存しました");
        }

        Commands::Logout => {
            let mut config = config;
            config.clear_token()?;
            println!("✔ ログアウトしました");
        }

        Commands::Config { show, set_base_url, set_policy, set_strategy, set_camera } => {
            let mut config = config;
            let mut changed = false;

            if let Some(url) = set_base_url {
                config.api_base_url = url;
                changed = true;
            }
            if let Some(policy) = set_policy {
                config.advance_policy = policy;
                changed = true;
            }
            if let Some(strategy) = set_strategy {
                config.region_strategy = strategy;
                changed = true;
            }
            if let Some(folder) = set_camera {
                config.camera_folder = Some(folder);
                changed = true;
            }
            if changed {
                config.save()?;
                println!("✔ 設定を保存しました");
            }

            if show || !changed {
                println!("設定:");
                println!("  API: {}", config.base_url());
                println!("  トークン: {}", if config.token.is_some() { "設定済み" } else { "未設定" });
                println!("  司書ID: {}", config.librarian_id.as_deref().unwrap_or("-"));
                println!("  最大画像幅: {}px (JPEG品質 {})", config.max_image_width, config.jpeg_quality);
                println!("  タイムアウト: {}秒", config.timeout_seconds);
                println!("  抽出失敗時: {}", config.advance_policy);
                println!("  抽出範囲: {}", config.region_strategy);
                println!(
                    "  取り込みフォルダ: {}",
                    config
                        .camera_folder
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "未設定".to_string())
                );
            }
        }

        Commands::Scan { camera, strategy, policy } => {
            config.get_token()?;
            println!("📷 thesis-capture - 撮影\n");

            let folder = camera
                .or_else(|| config.camera_folder.clone())
                .ok_or_else(|| {
                    CaptureError::Config(
                        "取り込みフォルダが未設定です（--camera または config --set-camera）".into(),
                    )
                })?;
            if !folder.is_dir() {
                return Err(CaptureError::FolderNotFound(folder.display().to_string()));
            }

            let workflow = Workflow::new(
                StepPlan::thesis(),
                policy.unwrap_or(config.advance_policy),
                strategy.unwrap_or(config.region_strategy),
            );
            let http = config.http_client()?;
            let base_url = config.base_url();
            let preview = std::env::temp_dir().join("thesis-capture-preview.jpg");

            let mut session = Session::new(
                workflow,
                FolderCamera::new(&folder),
                OcrClient::new(http.clone(), base_url.clone()),
                ThesisClient::new(http, base_url),
                history_store(&config)?,
                CaptureSettings::from_config(&config, Some(preview)),
            );

            println!("✔ 取り込みフォルダ: {}", folder.display());
            interactive::run(&mut session).await?;
            println!("\n✅ 終了");
        }

        Commands::Extract { step, images, crop, rendered } => {
            config.get_token()?;

            let plan = StepPlan::thesis();
            let step_info = plan.checked(step)?;
            let endpoint = plan.endpoint(step).unwrap_or_default().to_string();
            println!("🔍 {} を抽出中... ({}枚)", step_info.name, images.len());

            let selection = cli::crop_selection(crop, rendered)?;
            let mut payload = Vec::with_capacity(images.len());
            for path in &images {
                if !path.exists() {
                    return Err(CaptureError::FileNotFound(path.display().to_string()));
                }
                let frame = imaging::decode(&std::fs::read(path)?)?;
                payload.push(imaging::prepare_extract(
                    &frame,
                    selection,
                    config.max_image_width,
                    config.jpeg_quality,
                )?);
            }

            let client = OcrClient::new(config.http_client()?, config.base_url());
            let result = client.submit(step, &endpoint, &payload).await?;
            println!("{}", serde_json::to_string_pretty(&result.to_value())?);
        }

        Commands::Save { input } => {
            config.get_token()?;
            if !input.exists() {
                return Err(CaptureError::FileNotFound(input.display().to_string()));
            }

            let content = std::fs::read_to_string(&input)?;
            let form: ThesisForm = serde_json::from_str(&content)?;
            let client = ThesisClient::new(config.http_client()?, config.base_url());
            let history = history_store(&config)?;

            let accuracy = vec![None; StepPlan::thesis().len()];
            let entry =
                persistence::persist(&client, &history, &form, &accuracy, persistence::today_label())
                    .await?;
            println!("✔ Book information saved successfully! (ID: {})", entry.thesis_id);
            println!("✔ 履歴に追記: {}", history.path().display());
        }

        Commands::History { clear } => {
            let history = history_store(&config)?;

            if clear {
                if history.clear()? {
                    println!("✔ 履歴を削除しました");
                } else {
                    println!("履歴ファイルが存在しません: {}", history.path().display());
                }
                return Ok(());
            }

            let log = history.load()?;
            println!("履歴: {}件 ({})", log.len(), history.path().display());
            for entry in log.entries() {
                let accuracy: Vec<String> = entry
                    .accuracy
                    .iter()
                    .map(|a| thesis_capture_common::format_accuracy(a.score()))
                    .collect();
                println!(
                    "  [{}] {} / {} ({}) 精度: {} - {}",
                    entry.thesis_id,
                    entry.title,
                    entry.author,
                    entry.program,
                    accuracy.join(", "),
                    entry.scanned_at
                );
            }
        }
    }

    Ok(())
}

fn history_store(config: &Config) -> Result<HistoryStore> {
    let path = match &config.history_path {
        Some(path) => path.clone(),
        None => HistoryStore::default_path()?,
    };
    Ok(HistoryStore::new(path))
}
