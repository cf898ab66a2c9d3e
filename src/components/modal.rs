//! Modal Component
//!
//! The body is mounted the first time the modal opens and then only hidden,
//! so form state survives closing and reopening.

use leptos::prelude::*;

#[component]
pub fn Modal(
    /// Visibility; set to `false` to close
    open: RwSignal<bool>,
    #[prop(into)] title: Signal<String>,
    #[prop(optional, into)] class: String,
    children: ChildrenFn,
) -> impl IntoView {
    let mounted = RwSignal::new(false);
    Effect::new(move |_| {
        if open.get() && !mounted.get_untracked() {
            mounted.set(true);
        }
    });

    let close = move |_| open.set(false);
    let class = format!("modal {}", class);

    view! {
        <Show when=move || mounted.get()>
            <div class=class.clone() style:display=move || if open.get() { "block" } else { "none" }>
                <div class="modal-backdrop" on:click=close></div>
                <div class="modal-content">
                    <div class="modal-header">
                        <h3>{move || title.get()}</h3>
                        <button type="button" class="modal-close" on:click=close>"×"</button>
                    </div>
                    <div class="modal-body">{children()}</div>
                </div>
            </div>
        </Show>
    }
}
