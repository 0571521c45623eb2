//! アップロードエリアコンポーネント
//!
//! ドラッグ&ドロップ・クリック選択を受け付け、1ファイルずつ `on_select` へ渡す

use leptos::html::Input;
use leptos::prelude::*;
use rx_lens_common::upload::HEIC_TIP;
use web_sys::{DragEvent, File, FileList, HtmlInputElement};

/// ファイル選択ダイアログで表示する形式（HEICは拡張子で指定）
const ACCEPT: &str = "image/jpeg,image/png,.heic,.heif";

#[component]
pub fn UploadArea<F>(
    on_select: F,
    preview: ReadSignal<Option<String>>,
    file_name: Signal<Option<String>>,
    is_heic: Signal<bool>,
    disabled: Signal<bool>,
) -> impl IntoView
where
    F: Fn(File) + 'static + Clone,
{
    let (is_dragover, set_is_dragover) = signal(false);
    let input_ref = NodeRef::<Input>::new();

    // 複数渡されても先頭の1枚だけ扱う
    let handle_files = {
        let on_select = on_select.clone();
        move |files: FileList| {
            if let Some(file) = files.get(0) {
                on_select(file);
            }
        }
    };

    let on_drop = {
        let handle_files = handle_files.clone();
        move |ev: DragEvent| {
            ev.prevent_default();
            set_is_dragover.set(false);

            if disabled.get_untracked() {
                return;
            }

            if let Some(files) = ev.data_transfer().and_then(|dt| dt.files()) {
                handle_files(files);
            }
        }
    };

    let on_dragover = move |ev: DragEvent| {
        ev.prevent_default();
        if !disabled.get_untracked() {
            set_is_dragover.set(true);
        }
    };

    let on_dragleave = move |_: DragEvent| {
        set_is_dragover.set(false);
    };

    let on_click = move |_| {
        if disabled.get_untracked() {
            return;
        }
        if let Some(input) = input_ref.get() {
            input.click();
        }
    };

    let on_change = move |ev: web_sys::Event| {
        let input: HtmlInputElement = event_target(&ev);
        if let Some(files) = input.files() {
            handle_files(files);
        }
        // 同じファイルを選び直しても change が発火するように
        input.set_value("");
    };

    view! {
        <div
            class=move || {
                let mut classes = vec!["upload-area"];
                if is_dragover.get() {
                    classes.push("dragover");
                }
                if disabled.get() {
                    classes.push("disabled");
                }
                classes.join(" ")
            }
            on:drop=on_drop
            on:dragover=on_dragover
            on:dragleave=on_dragleave
            on:click=on_click
        >
            <input
                type="file"
                accept=ACCEPT
                style="display: none"
                node_ref=input_ref
                on:change=on_change
            />
            <Show
                when=move || file_name.get().is_some()
                fallback=|| view! {
                    <div class="upload-icon">"📷"</div>
                    <p>"Drag & drop a prescription image or click to choose"</p>
                    <p class="text-muted">"JPG, PNG or HEIC (iPhone), up to 10MB"</p>
                }
            >
                <Show
                    when=move || is_heic.get()
                    fallback=move || view! {
                        <img class="preview" src=move || preview.get().unwrap_or_default() alt="Prescription preview" />
                    }
                >
                    <div class="upload-icon">"📱"</div>
                    <p class="heic-tip">{HEIC_TIP}</p>
                </Show>
                <p class="file-name">{move || file_name.get().unwrap_or_default()}</p>
            </Show>
        </div>
    }
}
