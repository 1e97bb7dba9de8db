//! 論文情報フォーム（OCR結果の確認・修正と保存）

use crate::app::Controller;
use leptos::prelude::*;
use web_sys::{Event, SubmitEvent};

/// (項目ID, ラベル, 複数行)
const FIELDS: [(&str, &str, bool); 7] = [
    ("title", "Title", false),
    ("authors", "Authors", false),
    ("program_course", "Program/Course", false),
    ("date_published", "Date Published (e.g. June 2023)", false),
    ("edition_version", "Edition/Version", false),
    ("abstract", "Abstract", true),
    ("keywords", "Keywords", false),
];

#[component]
pub fn ThesisFormPanel() -> impl IntoView {
    let controller = expect_context::<Controller>();
    let workflow = controller.workflow;
    let saving = controller.saving;

    let on_submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        controller.save();
    };

    let fields = FIELDS
        .into_iter()
        .map(|(id, label, multiline)| {
            let value = move || {
                workflow.with(|w| w.form().get(id).unwrap_or_default().to_string())
            };
            let on_input = move |ev: Event| controller.set_field(id, event_target_value(&ev));

            let input = if multiline {
                view! { <textarea id=id name=id rows="6" prop:value=value on:input=on_input /> }
                    .into_any()
            } else {
                view! { <input type="text" id=id name=id prop:value=value on:input=on_input /> }
                    .into_any()
            };
            view! {
                <div class="form-group">
                    <label for=id>{label}</label>
                    {input}
                </div>
            }
        })
        .collect_view();

    view! {
        <form class="thesis-form" on:submit=on_submit>
            {fields}
            <button type="submit" class="btn btn-primary" disabled=move || saving.get()>
                {move || if saving.get() { "Saving..." } else { "Save Book Information" }}
            </button>
        </form>
    }
}
