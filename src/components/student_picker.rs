//! Student Picker Component
//!
//! Search box + select. Typing is debounced before the backend is queried.

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api;
use crate::context::{use_services, Services};
use crate::debounce::{Debounce, SEARCH_DEBOUNCE_MS};
use crate::models::Student;

/// Which search endpoint backs the picker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudentSource {
    /// `/api/v1/students/?search=`; lists the first page before any typing
    Ops,
    /// `/api/students/?search=` by nickname; nothing until a keyword is typed
    Legacy,
}

async fn fetch_options(
    services: Services,
    source: StudentSource,
    keyword: String,
    options: RwSignal<Vec<Student>>,
    error: RwSignal<Option<String>>,
) {
    let client = services.api();
    let result = match source {
        StudentSource::Ops => api::search_students(&client, &keyword).await,
        StudentSource::Legacy => api::search_students_by_nickname(&client, &keyword).await,
    };
    match result {
        Ok(found) => {
            error.set(None);
            options.set(found);
        }
        Err(e) => {
            log::warn!("[PICKER] student search failed: {}", e);
            options.set(Vec::new());
            error.set(Some(e.to_string()));
        }
    }
}

#[component]
pub fn StudentPicker(
    /// Selected student id, empty for none
    selected: RwSignal<String>,
    source: StudentSource,
    #[prop(optional, into)] placeholder: Option<String>,
) -> impl IntoView {
    let services = use_services();
    let options = RwSignal::new(Vec::<Student>::new());
    let error = RwSignal::new(None::<String>);
    let keyword = RwSignal::new(String::new());
    let debounce = Debounce::new(SEARCH_DEBOUNCE_MS);
    let looked_up = StoredValue::new(None::<String>);
    let placeholder = placeholder.unwrap_or_else(|| "请选择学员".to_string());

    if source == StudentSource::Ops {
        spawn_local(fetch_options(services, source, String::new(), options, error));
    }

    // Keep a preselected student visible even when it isn't in the result page
    Effect::new(move |_| {
        let id = selected.get();
        if id.is_empty() || source != StudentSource::Ops {
            return;
        }
        let known = options.with_untracked(|o| o.iter().any(|s| s.id.as_str() == id));
        if known || looked_up.get_value().as_deref() == Some(id.as_str()) {
            return;
        }
        looked_up.set_value(Some(id.clone()));
        spawn_local(async move {
            match api::get_student(&services.api(), &id).await {
                Ok(student) => options.update(|o| {
                    if !o.iter().any(|s| s.id == student.id) {
                        o.insert(0, student);
                    }
                }),
                Err(e) => log::warn!("[PICKER] preselected student {} not loaded: {}", id, e),
            }
        });
    });

    let on_search = move |ev: web_sys::Event| {
        let text = event_target_value(&ev);
        keyword.set(text.clone());
        debounce.run(move || fetch_options(services, source, text, options, error));
    };

    view! {
        <div class="student-picker">
            <input
                type="text"
                class="form-control"
                placeholder="输入昵称搜索学员"
                prop:value=move || keyword.get()
                on:input=on_search
            />
            <select
                class="form-control"
                prop:value=move || {
                    options.track();
                    selected.get()
                }
                on:change=move |ev| selected.set(event_target_value(&ev))
            >
                <option value="">{placeholder}</option>
                <For
                    each=move || options.get()
                    key=|s| s.id.clone()
                    children=move |student| {
                        view! { <option value=student.id.to_string()>{student.option_label()}</option> }
                    }
                />
            </select>
            {move || error.get().map(|e| view! { <div class="form-error">"搜索失败：" {e}</div> })}
        </div>
    }
}
