//! Pager Components

use leptos::prelude::*;

use crate::pagination::PageState;

/// Prev / info / next
#[component]
pub fn Pager(
    #[prop(into)] state: Signal<PageState>,
    #[prop(into)] on_page: Callback<u32>,
) -> impl IntoView {
    view! {
        <div class="pagination">
            <button
                class="btn btn-small"
                disabled=move || !state.get().has_prev()
                on:click=move |_| {
                    let s = state.get_untracked();
                    if s.has_prev() {
                        on_page.run(s.page - 1);
                    }
                }
            >
                "上一页"
            </button>
            <span class="page-info">{move || state.get().page_info()}</span>
            <button
                class="btn btn-small"
                disabled=move || !state.get().has_next()
                on:click=move |_| {
                    let s = state.get_untracked();
                    if s.has_next() {
                        on_page.run(s.page + 1);
                    }
                }
            >
                "下一页"
            </button>
        </div>
    }
}

/// First / prev / page numbers around the current page / next / last
#[component]
pub fn NumberedPager(
    #[prop(into)] state: Signal<PageState>,
    #[prop(into)] on_page: Callback<u32>,
) -> impl IntoView {
    let go = move |page: u32| {
        let s = state.get_untracked();
        let page = page.clamp(1, s.total_pages());
        if page != s.page {
            on_page.run(page);
        }
    };

    view! {
        <div class="pagination numbered">
            <button class="btn btn-small" disabled=move || !state.get().has_prev() on:click=move |_| go(1)>
                "首页"
            </button>
            <button
                class="btn btn-small"
                disabled=move || !state.get().has_prev()
                on:click=move |_| go(state.get_untracked().page.saturating_sub(1))
            >
                "上一页"
            </button>
            {move || {
                let s = state.get();
                s.page_window(2)
                    .into_iter()
                    .map(|n| {
                        let class = if n == s.page { "btn btn-small page-num active" } else { "btn btn-small page-num" };
                        view! { <button class=class on:click=move |_| go(n)>{n}</button> }
                    })
                    .collect_view()
            }}
            <button
                class="btn btn-small"
                disabled=move || !state.get().has_next()
                on:click=move |_| go(state.get_untracked().page + 1)
            >
                "下一页"
            </button>
            <button
                class="btn btn-small"
                disabled=move || !state.get().has_next()
                on:click=move |_| go(state.get_untracked().total_pages())
            >
                "末页"
            </button>
            <span class="page-info">{move || state.get().page_info()}</span>
        </div>
    }
}
