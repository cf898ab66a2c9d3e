use leptos::prelude::*;

#[component]
pub fn EmptyState(
    #[prop(into)] title: String,
    #[prop(optional, into)] hint: Option<String>,
) -> impl IntoView {
    view! {
        <div class="empty-state">
            <h3>{title}</h3>
            {hint.map(|h| view! { <p>{h}</p> })}
        </div>
    }
}

/// Loading / error / empty states in front of a list body
#[component]
pub fn ListStatus(
    #[prop(into)] loading: Signal<bool>,
    #[prop(into)] error: Signal<Option<String>>,
    #[prop(into)] empty: Signal<bool>,
    #[prop(into)] empty_title: String,
    #[prop(optional, into)] empty_hint: Option<String>,
) -> impl IntoView {
    view! {
        <Show when=move || loading.get()>
            <div class="loading">"加载中..."</div>
        </Show>
        {move || error.get().map(|msg| view! { <div class="list-row error">"加载失败：" {msg}</div> })}
        <Show when=move || empty.get()>
            <div class="empty-state">
                <h3>{empty_title.clone()}</h3>
                {empty_hint.clone().map(|h| view! { <p>{h}</p> })}
            </div>
        </Show>
    }
}
