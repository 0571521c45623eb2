//! 解析結果パネル
//!
//! 表示モデルのHTML断片はcommon側でエスケープ済み

use leptos::prelude::*;
use rx_lens_common::{to_html, DisplayModel};

#[component]
pub fn ResultsPanel(result: Signal<Option<DisplayModel>>, is_submitting: Signal<bool>) -> impl IntoView {
    view! {
        <section class="results">
            <Show when=move || is_submitting.get()>
                <div class="loading">
                    <div class="spinner" />
                    <p>"Analyzing your prescription..."</p>
                </div>
            </Show>
            <Show when=move || !is_submitting.get()>
                <div
                    class="results-content"
                    inner_html=move || result.get().map(|model| to_html(&model)).unwrap_or_default()
                />
            </Show>
        </section>
    }
}
