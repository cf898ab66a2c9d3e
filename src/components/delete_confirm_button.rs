//! Delete Confirm Button Component
//!
//! Two-step delete: the first click arms the button, the second one fires.

use leptos::prelude::*;

/// Inline delete confirmation
///
/// Shows `label` initially. When clicked, shows "确认删除?" with 确认/取消
/// buttons; `on_confirm` runs only after 确认.
#[component]
pub fn DeleteConfirmButton(
    #[prop(optional, into)] label: Option<String>,
    #[prop(into)] on_confirm: Callback<()>,
) -> impl IntoView {
    let (armed, set_armed) = signal(false);
    let label = label.unwrap_or_else(|| "删除".to_string());

    view! {
        <Show
            when=move || armed.get()
            fallback=move || {
                let label = label.clone();
                view! {
                    <button
                        class="btn btn-danger btn-small"
                        on:click=move |ev| {
                            ev.stop_propagation();
                            set_armed.set(true);
                        }
                    >
                        {label}
                    </button>
                }
            }
        >
            <span class="delete-confirm">
                <span class="delete-confirm-text">"确认删除?"</span>
                <button
                    class="btn btn-danger btn-small"
                    on:click=move |ev| {
                        ev.stop_propagation();
                        set_armed.set(false);
                        on_confirm.run(());
                    }
                >
                    "确认"
                </button>
                <button
                    class="btn btn-secondary btn-small"
                    on:click=move |ev| {
                        ev.stop_propagation();
                        set_armed.set(false);
                    }
                >
                    "取消"
                </button>
            </span>
        </Show>
    }
}
