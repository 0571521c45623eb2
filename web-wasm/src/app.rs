//! メインアプリケーションコンポーネント
//!
//! 選択ファイル・状態・結果は `UploadSession` に一元管理させる。
//! 送信はチケット単位で、リセット後に届いた応答は破棄される。

use crate::api::analyze;
use crate::components::{
    header::Header, results_panel::ResultsPanel, status_banner::StatusBanner,
    upload_area::UploadArea,
};
use leptos::prelude::*;
use leptos::task::spawn_local;
use rx_lens_common::{SelectedFile, UploadSession};
use wasm_bindgen::prelude::*;
use web_sys::{File, FileReader};

#[component]
pub fn App() -> impl IntoView {
    let session = RwSignal::new_local(UploadSession::<File>::new());
    let (preview, set_preview) = signal(None::<String>);
    let endpoint = analyze::endpoint();

    // 起動時の疎通確認（失敗しても送信は可能）
    {
        let endpoint = endpoint.clone();
        spawn_local(async move {
            let ready = analyze::probe(&endpoint).await;
            session.update(|s| s.record_probe(ready));
        });
    }

    let on_select = move |file: File| {
        let selected = SelectedFile::new(file.name(), file.type_(), file.size() as u64, file.clone());
        let accepted = session
            .try_update(|s| s.select(selected).map(|staged| !staged.is_heic()))
            .and_then(Result::ok);

        match accepted {
            // HEICはブラウザで表示できないためプレビューしない
            Some(true) => {
                set_preview.set(None);
                read_preview(file, session, set_preview);
            }
            Some(false) => set_preview.set(None),
            None => {}
        }
    };

    let on_submit = {
        let endpoint = endpoint.clone();
        move |_| {
            let started = session
                .try_update(|s| {
                    let file = s.file()?.content.clone();
                    let needs_probe = s.needs_probe();
                    let ticket = s.begin_submit()?;
                    Some((file, needs_probe, ticket))
                })
                .flatten();
            let Some((file, needs_probe, ticket)) = started else {
                return;
            };

            let endpoint = endpoint.clone();
            spawn_local(async move {
                if needs_probe {
                    let ready = analyze::probe(&endpoint).await;
                    session.update(|s| s.record_probe(ready));
                }
                let outcome = analyze::submit(&endpoint, &file).await;
                session.update(|s| {
                    s.finish(ticket, outcome);
                });
            });
        }
    };

    let on_reset = move |_| {
        session.update(|s| s.reset());
        set_preview.set(None);
    };

    let is_submitting = Signal::derive(move || session.with(|s| s.is_submitting()));

    view! {
        <div class="container">
            <Header />

            <StatusBanner banner=Signal::derive(move || session.with(|s| s.banner().cloned())) />

            <UploadArea
                on_select=on_select
                preview=preview
                file_name=Signal::derive(move || session.with(|s| s.file().map(|f| f.name.clone())))
                is_heic=Signal::derive(move || session.with(|s| s.is_heic()))
                disabled=is_submitting
            />

            <div class="actions">
                <button
                    class="btn btn-primary"
                    disabled=move || !session.with(|s| s.can_submit())
                    on:click=on_submit
                >
                    {move || if is_submitting.get() { "Analyzing..." } else { "Analyze Prescription" }}
                </button>
                <button class="btn btn-secondary" on:click=on_reset>"Reset"</button>
            </div>

            <ResultsPanel
                result=Signal::derive(move || session.with(|s| s.result().cloned()))
                is_submitting=is_submitting
            />
        </div>
    }
}

/// FileReaderでData URLを読み、選択中のファイルが変わっていなければプレビューに反映
fn read_preview(
    file: File,
    session: RwSignal<UploadSession<File>, LocalStorage>,
    set_preview: WriteSignal<Option<String>>,
) {
    let Ok(reader) = FileReader::new() else {
        return;
    };

    let reader_clone = reader.clone();
    let file_clone = file.clone();
    let closure = Closure::wrap(Box::new(move |_: web_sys::ProgressEvent| {
        let still_selected = session.with_untracked(|s| s.file().is_some_and(|f| f.content == file_clone));
        if !still_selected {
            return;
        }
        if let Some(data_url) = reader_clone.result().ok().and_then(|r| r.as_string()) {
            set_preview.set(Some(data_url));
        }
    }) as Box<dyn FnMut(_)>);

    reader.set_onload(Some(closure.as_ref().unchecked_ref()));
    closure.forget();

    if reader.read_as_data_url(&file).is_err() {
        gloo::console::warn!(format!("failed to read preview: {}", file.name()));
    }
}
