//! 対話式撮影ループ

use crate::api::{OcrService, ThesisBackend};
use crate::camera::FrameSource;
use crate::cli::CropArg;
use crate::error::Result;
use crate::persistence::today_label;
use crate::session::Session;
use dialoguer::{Confirm, Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use thesis_capture_common::record::FIELD_IDS;
use thesis_capture_common::{instruction, Mode, Notice, NoticeLevel, RegionStrategy};

/// メニュー操作
#[derive(Debug, Clone, Copy, PartialEq)]
enum Action {
    Capture,
    AddPage,
    Retake,
    SelectRegion,
    Extract,
    JumpTo,
    EditField,
    ShowForm,
    Save,
    Quit,
}

impl Action {
    fn label(&self) -> &'static str {
        match self {
            Action::Capture => "Capture",
            Action::AddPage => "Capture another page",
            Action::Retake => "Retake",
            Action::SelectRegion => "Select region",
            Action::Extract => "Extract",
            Action::JumpTo => "Go to step...",
            Action::EditField => "Edit field...",
            Action::ShowForm => "Show form",
            Action::Save => "Save book information",
            Action::Quit => "Quit",
        }
    }
}

pub fn print_notices(notices: &[Notice]) {
    for notice in notices {
        let mark = match notice.level {
            NoticeLevel::Success => "✔",
            NoticeLevel::Info => "ℹ",
            NoticeLevel::Warning => "⚠",
            NoticeLevel::Error => "✖",
        };
        println!("{} {}", mark, notice.message);
    }
}

/// 現在の状態で選べる操作
fn available_actions<C, O, B>(session: &Session<C, O, B>) -> Vec<Action>
where
    C: FrameSource,
    O: OcrService,
    B: ThesisBackend,
{
    let workflow = session.workflow();
    let view = workflow.view();
    let mut actions = Vec::new();

    if view.capture_visible {
        actions.push(if view.mode == Mode::Review {
            Action::AddPage
        } else {
            Action::Capture
        });
    }
    if view.retake_visible {
        actions.push(Action::Retake);
    }
    if view.preview_visible && workflow.strategy() == RegionStrategy::Cropped {
        actions.push(Action::SelectRegion);
    }
    if view.extract_visible && view.extract_enabled {
        actions.push(Action::Extract);
    }
    actions.extend([
        Action::JumpTo,
        Action::EditField,
        Action::ShowForm,
        Action::Save,
        Action::Quit,
    ]);
    actions
}

fn print_status<C, O, B>(session: &Session<C, O, B>)
where
    C: FrameSource,
    O: OcrService,
    B: ThesisBackend,
{
    let workflow = session.workflow();
    let total = workflow.plan().len();

    println!();
    for (i, step) in workflow.plan().steps().iter().enumerate() {
        let marker = if i == workflow.step_index() { "▶" } else { " " };
        let captures = workflow.captures().get(i);
        let pages = captures.map(|c| c.len()).unwrap_or(0);
        let status = match captures {
            Some(c) if c.failed() => " (failed)".to_string(),
            Some(c) => c
                .accuracy()
                .map(|a| format!(" ({}%)", a))
                .unwrap_or_default(),
            None => String::new(),
        };
        println!("{} [{}/{}] {} - {}枚{}", marker, i + 1, total, step.name, pages, status);
    }

    match workflow.current_step() {
        Some(step) => println!("{}", instruction(step)),
        None => println!("All steps completed. You can now save the book information."),
    }
}

fn print_form<C, O, B>(session: &Session<C, O, B>)
where
    C: FrameSource,
    O: OcrService,
    B: ThesisBackend,
{
    let form = session.workflow().form();
    for field in FIELD_IDS {
        println!("  {:<16} {}", field, form.get(field).unwrap_or_default());
    }
}

pub async fn run<C, O, B>(session: &mut Session<C, O, B>) -> Result<()>
where
    C: FrameSource,
    O: OcrService,
    B: ThesisBackend,
{
    print_notices(&session.start());

    loop {
        print_status(session);
        let actions = available_actions(session);
        let labels: Vec<&str> = actions.iter().map(|a| a.label()).collect();

        let choice = Select::new()
            .with_prompt("操作を選択")
            .items(&labels)
            .default(0)
            .interact()?;

        let notices = match actions[choice] {
            Action::Capture | Action::AddPage => {
                let notices = session.capture();
                if let (Some(path), Some(size)) = (session.preview_path(), session.preview_size()) {
                    println!("プレビュー: {} ({:.0}x{:.0})", path.display(), size.width, size.height);
                }
                notices
            }
            Action::Retake => session.retake(),
            Action::SelectRegion => {
                let text: String = Input::new()
                    .with_prompt("範囲 x0,y0,x1,y1（プレビュー座標、空欄で解除）")
                    .allow_empty(true)
                    .interact_text()?;
                if text.trim().is_empty() {
                    session.clear_crop();
                    vec![Notice::info("Selection cleared; the full capture will be used.")]
                } else {
                    match text.parse::<CropArg>() {
                        Ok(crop) => session.select_crop(crop.from, crop.to),
                        Err(e) => vec![Notice::warning(e)],
                    }
                }
            }
            Action::Extract => {
                let name = session
                    .workflow()
                    .current_step()
                    .map(|s| s.name.clone())
                    .unwrap_or_default();
                let spinner = ProgressBar::new_spinner();
                spinner.set_style(
                    ProgressStyle::with_template("{spinner} {msg}")
                        .unwrap_or_else(|_| ProgressStyle::default_spinner()),
                );
                spinner.set_message(format!("Extracting {}...", name));
                spinner.enable_steady_tick(Duration::from_millis(120));
                let notices = session.extract().await;
                spinner.finish_and_clear();
                notices
            }
            Action::JumpTo => {
                let names: Vec<String> = session
                    .workflow()
                    .plan()
                    .steps()
                    .iter()
                    .map(|s| s.name.clone())
                    .collect();
                let index = Select::new()
                    .with_prompt("ステップを選択")
                    .items(&names)
                    .default(session.workflow().step_index().min(names.len().saturating_sub(1)))
                    .interact()?;
                session.jump_to(index)
            }
            Action::EditField => {
                let field = FIELD_IDS[Select::new()
                    .with_prompt("項目を選択")
                    .items(&FIELD_IDS)
                    .default(0)
                    .interact()?];
                let current = session.workflow().form().get(field).unwrap_or_default().to_string();
                let value: String = Input::new()
                    .with_prompt(field)
                    .with_initial_text(current)
                    .allow_empty(true)
                    .interact_text()?;
                session.set_field(field, value)
            }
            Action::ShowForm => {
                print_form(session);
                Vec::new()
            }
            Action::Save => {
                print_form(session);
                if Confirm::new()
                    .with_prompt("この内容で保存しますか？")
                    .default(true)
                    .interact()?
                {
                    session.save(today_label()).await
                } else {
                    Vec::new()
                }
            }
            Action::Quit => break,
        };

        print_notices(&notices);
    }

    session.stop();
    Ok(())
}
