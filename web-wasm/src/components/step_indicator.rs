//! ステップ表示（クリックで任意のステップへ移動）

use crate::app::Controller;
use leptos::prelude::*;
use thesis_capture_common::instruction;

#[component]
pub fn StepIndicator() -> impl IntoView {
    let controller = expect_context::<Controller>();
    let workflow = controller.workflow;

    let steps = move || {
        workflow.with(|w| {
            w.plan()
                .steps()
                .iter()
                .enumerate()
                .map(|(i, step)| {
                    let captures = w.captures().get(i);
                    let badge = match captures {
                        Some(c) if c.failed() => "⚠",
                        Some(c) if c.accuracy().is_some() => "✓",
                        _ => "",
                    };
                    (i, step.name.clone(), i == w.step_index(), badge)
                })
                .collect::<Vec<_>>()
        })
    };

    let instruction_text = move || {
        workflow.with(|w| match w.current_step() {
            Some(step) => instruction(step),
            None => "All steps completed. You can now save the book information.".to_string(),
        })
    };

    view! {
        <div class="step-indicator">
            {move || {
                steps()
                    .into_iter()
                    .map(|(index, name, active, badge)| {
                        view! {
                            <button
                                class="step-btn"
                                class:active=active
                                on:click=move |_| controller.jump_to(index)
                            >
                                {name}
                                <span class="step-badge">{badge}</span>
                            </button>
                        }
                    })
                    .collect_view()
            }}
        </div>
        <p class="instruction">{instruction_text}</p>
    }
}
