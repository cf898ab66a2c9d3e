//! Board Lists
//!
//! Announcement and reminder rows shared by the teacher and researcher
//! views.

use leptos::prelude::*;

use crate::components::{ListStatus, Pager};
use crate::labels;
use crate::list_state::ListState;
use crate::markdown::preview_line;
use crate::models::{Announcement, Reminder};

#[component]
fn AnnouncementRow(announcement: Announcement) -> impl IntoView {
    let created = labels::format_minutes(announcement.created_at.as_deref());
    // Untitled announcements show their first line instead
    let title = match announcement.title.as_deref().filter(|t| !t.is_empty()) {
        Some(_) => announcement.display_title(),
        None => Some(preview_line(announcement.content.as_deref().unwrap_or_default(), 40))
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| announcement.display_title()),
    };
    view! {
        <div class="list-row">
            <div class="list-title">{title}</div>
            <div class="list-meta">
                <span>"发布时间：" {if created.is_empty() { "-".to_string() } else { created }}</span>
            </div>
        </div>
    }
}

#[component]
fn ReminderRow(reminder: Reminder) -> impl IntoView {
    let (urgency, badge) = labels::board_urgency(reminder.urgency.as_deref());
    let category = labels::board_category(reminder.category.as_deref());
    let created = labels::format_minutes(reminder.created_at.as_deref());
    let student = reminder
        .student_label()
        .or_else(|| reminder.student.as_ref().and_then(|s| s.id()).map(|id| id.to_string()));
    let course = reminder.course_name.clone().filter(|c| !c.is_empty());
    let content = reminder.content.clone().filter(|c| !c.is_empty());

    view! {
        <div class="list-row">
            <div class="list-title">
                <span class=format!("badge {}", badge)>{urgency}</span>
                {if category == "-" { "提醒".to_string() } else { category }}
            </div>
            <div class="list-meta">
                <span>"创建时间：" {if created.is_empty() { "-".to_string() } else { created }}</span>
                <span>"发送人：" {reminder.sender_label()}</span>
                {student.map(|s| view! { <span>"学员：" {s}</span> })}
                {course.map(|c| view! { <span>"课程：" {c}</span> })}
            </div>
            {content.map(|c| view! { <div class="list-content">{c}</div> })}
        </div>
    }
}

#[component]
pub fn AnnouncementBoard(
    state: RwSignal<ListState<Announcement>>,
    #[prop(into)] on_page: Callback<u32>,
) -> impl IntoView {
    view! {
        <div class="board-list">
            <ListStatus
                loading=Signal::derive(move || state.with(|s| s.is_loading()))
                error=Signal::derive(move || state.with(|s| s.error().map(str::to_string)))
                empty=Signal::derive(move || state.with(|s| s.is_empty()))
                empty_title="暂无公告"
            />
            <For
                each=move || state.with(|s| s.items.clone())
                key=|a| a.id.clone()
                children=move |a| view! { <AnnouncementRow announcement=a /> }
            />
            <Pager state=Signal::derive(move || state.with(|s| s.page)) on_page=on_page />
        </div>
    }
}

#[component]
pub fn ReminderBoard(
    state: RwSignal<ListState<Reminder>>,
    #[prop(into)] on_page: Callback<u32>,
) -> impl IntoView {
    view! {
        <div class="board-list">
            <ListStatus
                loading=Signal::derive(move || state.with(|s| s.is_loading()))
                error=Signal::derive(move || state.with(|s| s.error().map(str::to_string)))
                empty=Signal::derive(move || state.with(|s| s.is_empty()))
                empty_title="暂无提醒"
            />
            <For
                each=move || state.with(|s| s.items.clone())
                key=|r| r.id.clone()
                children=move |r| view! { <ReminderRow reminder=r /> }
            />
            <Pager state=Signal::derive(move || state.with(|s| s.page)) on_page=on_page />
        </div>
    }
}
