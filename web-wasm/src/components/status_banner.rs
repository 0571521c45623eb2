//! ステータスバナーコンポーネント

use leptos::prelude::*;
use rx_lens_common::Banner;

#[component]
pub fn StatusBanner(banner: Signal<Option<Banner>>) -> impl IntoView {
    move || {
        banner.get().map(|banner| {
            let class = match &banner {
                Banner::Error(_) => "alert alert-danger",
                Banner::Warning(_) => "alert alert-warning",
                Banner::Info(_) => "alert alert-info",
            };
            view! { <div class=class role="alert">{banner.message().to_string()}</div> }
        })
    }
}
