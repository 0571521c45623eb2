//! ヘッダーコンポーネント

use leptos::prelude::*;

#[component]
pub fn Header() -> impl IntoView {
    view! {
        <header class="header">
            <h1>"rx-lens"</h1>
            <p class="text-muted">"Upload a prescription image to identify the medications on it."</p>
        </header>
    }
}
