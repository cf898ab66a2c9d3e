//! Student detail: profile plus the newest feedbacks.

use leptos::prelude::*;
use leptos::task::spawn_local;

use super::feedbacks::piece_summary;
use crate::api;
use crate::components::{EmptyState, Modal};
use crate::context::use_services;
use crate::labels;
use crate::models::{Feedback, Student};

type Loaded<T> = Option<Result<T, String>>;

fn or_dash(value: Option<&str>) -> String {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("-")
        .to_string()
}

#[component]
pub(super) fn StudentInfoModal(open: RwSignal<bool>, student: RwSignal<Option<String>>) -> impl IntoView {
    let services = use_services();
    let profile = RwSignal::new(None::<Result<Student, String>>);
    let recent = RwSignal::new(None::<Result<Vec<Feedback>, String>>);

    Effect::new(move |_| {
        let Some(id) = student.get() else {
            return;
        };
        profile.set(None);
        recent.set(None);
        let profile_id = id.clone();
        spawn_local(async move {
            let loaded = api::get_student(&services.api(), &profile_id).await.map_err(|e| {
                log::error!("[OPS] student {} not loaded: {}", profile_id, e);
                e.to_string()
            });
            // Ignore a late response for a student no longer shown
            if student.get_untracked().as_deref() == Some(profile_id.as_str()) {
                profile.set(Some(loaded));
            }
        });
        spawn_local(async move {
            let loaded = api::recent_student_feedbacks(&services.api(), &id)
                .await
                .map_err(|e| e.to_string());
            if student.get_untracked().as_deref() == Some(id.as_str()) {
                recent.set(Some(loaded));
            }
        });
    });

    view! {
        <Modal open=open title="学员详情" class="modal-wide">
            {move || render_profile(profile.get())}
            <h4 class="subsection-title">"最近点评"</h4>
            {move || render_recent(recent.get())}
        </Modal>
    }
}

fn render_profile(profile: Loaded<Student>) -> AnyView {
    match profile {
        None => view! { <div class="loading">"加载中..."</div> }.into_any(),
        Some(Err(msg)) => view! { <div class="form-error">"加载失败：" {msg}</div> }.into_any(),
        Some(Ok(s)) => {
            let tags = if s.tag_names.is_empty() { "-".to_string() } else { s.tag_names.join("、") };
            view! {
                <div class="student-profile">
                    <div><strong>"昵称："</strong>{or_dash(s.nickname.as_deref())}</div>
                    <div><strong>"ID："</strong>{s.id.to_string()}</div>
                    <div><strong>"备注名："</strong>{or_dash(s.remark_name.as_deref())}</div>
                    <div><strong>"标签："</strong>{tags}</div>
                    <div><strong>"运营备注："</strong>{or_dash(s.op_note.as_deref())}</div>
                </div>
            }
            .into_any()
        }
    }
}

fn render_recent(recent: Loaded<Vec<Feedback>>) -> AnyView {
    match recent {
        None => view! { <div class="loading">"加载中..."</div> }.into_any(),
        Some(Err(msg)) => view! { <div class="form-error">"加载失败：" {msg}</div> }.into_any(),
        Some(Ok(list)) if list.is_empty() => {
            view! { <EmptyState title="暂无最近点评" hint="该学员还没有点评记录" /> }.into_any()
        }
        Some(Ok(list)) => list
            .into_iter()
            .map(|f| {
                let pieces = piece_summary(&f);
                let content = or_dash(f.teacher_text());
                view! {
                    <div class="card">
                        <div class="card-header">
                            <strong>{labels::format_seconds(f.created_at.as_deref())}</strong>
                            <span>"教师：" {f.teacher_label()}</span>
                        </div>
                        <div class="card-body">
                            <div>{content}</div>
                            {(!pieces.is_empty()).then(|| view! { <div class="muted">{pieces}</div> })}
                        </div>
                    </div>
                }
            })
            .collect_view()
            .into_any(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_or_dash_blank_values() {
        assert_eq!(or_dash(None), "-");
        assert_eq!(or_dash(Some("  ")), "-");
        assert_eq!(or_dash(Some(" VIP ")), "VIP");
    }
}
