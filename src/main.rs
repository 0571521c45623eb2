use clap::Parser;
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};
use rx_lens::client::AnalysisClient;
use rx_lens::controller::Controller;
use rx_lens::error::{Result, RxLensError};
use rx_lens::report::{self, SavedReport};
use rx_lens::{cli, config, scanner};
use rx_lens_common::{render_response, to_html, AnalysisResponse, Completion, SessionState};
use cli::{Cli, Commands};
use config::Config;
use std::path::Path;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = Config::load()?;
    // --endpoint > 環境変数 > 設定ファイル
    let endpoint = cli
        .endpoint
        .clone()
        .unwrap_or_else(|| config.endpoint());

    match cli.command {
        Commands::Analyze { path, json, html, output, interactive, no_probe } => {
            println!("💊 rx-lens - 処方箋解析\n");

            // 1. 対象ファイル
            let files = if path.is_dir() {
                let files = scanner::scan_folder(&path)?;
                if files.is_empty() {
                    return Err(RxLensError::NoImagesFound(path.display().to_string()));
                }
                println!("✔ {}枚の画像を検出\n", files.len());
                files
            } else {
                vec![path]
            };

            let client = AnalysisClient::new(&endpoint, config.timeout())?;
            println!("解析サービス: {}\n", client.endpoint());
            let mut controller = Controller::new(client, config.probe_before_submit && !no_probe);

            let mut reports = Vec::new();
            for (i, file_path) in files.iter().enumerate() {
                println!("[{}/{}] {}", i + 1, files.len(), file_path.display());
                if let Some(report) = analyze_one(&mut controller, file_path, json, interactive).await? {
                    reports.push(report);
                }
                println!();
            }

            if let Some(html_path) = html {
                let fragments: String = reports.iter().map(|r| to_html(&r.result)).collect();
                std::fs::write(&html_path, fragments)?;
                println!("✔ HTMLを保存: {}", html_path.display());
            }

            if let Some(output_path) = output {
                std::fs::write(&output_path, serde_json::to_string_pretty(&reports)?)?;
                println!("✔ 結果を保存: {}", output_path.display());
            }

            let failed = reports.iter().filter(|r| r.result.is_failure()).count();
            if failed == 0 {
                println!("\n✅ 解析完了");
            } else {
                println!("\n⚠ 解析完了（失敗 {}件）", failed);
            }
        }

        Commands::Health => {
            let client = AnalysisClient::new(&endpoint, config.timeout())?;
            println!("解析サービス: {}", client.endpoint());
            if client.probe().await {
                println!("✔ 解析サービスは正常です");
            } else {
                println!("⚠ 解析サービスに接続できません（解析は試行可能です）");
            }
        }

        Commands::Render { input, heic, json, html } => {
            let content = std::fs::read_to_string(&input)?;
            let response = AnalysisResponse::from_json(&content)?;
            let model = render_response(response, heic);

            if json {
                println!("{}", serde_json::to_string_pretty(&model)?);
            } else {
                report::print_model(&model);
            }

            if let Some(html_path) = html {
                std::fs::write(&html_path, to_html(&model))?;
                println!("✔ HTMLを保存: {}", html_path.display());
            }
        }

        Commands::Config { set_endpoint, set_timeout, show } => {
            if let Some(endpoint) = set_endpoint {
                config.set_endpoint(endpoint)?;
                println!("✔ エンドポイントを設定しました");
            }

            if let Some(seconds) = set_timeout {
                config.set_timeout(seconds)?;
                println!("✔ タイムアウトを設定しました");
            }

            if show {
                println!("設定:");
                println!("  エンドポイント: {}", config.endpoint());
                println!("  タイムアウト: {}秒", config.timeout_seconds);
                println!("  送信前の疎通確認: {}", if config.probe_before_submit { "有効" } else { "無効" });
                println!("  設定ファイル: {}", Config::config_path()?.display());
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "rx_lens=debug" } else { "rx_lens=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// 1ファイルを選択 → プレビュー → 送信 → 表示
///
/// 検証で弾かれた場合は `None`
async fn analyze_one(
    controller: &mut Controller,
    path: &Path,
    json: bool,
    interactive: bool,
) -> Result<Option<SavedReport>> {
    controller.reset();

    let file = scanner::load_file(path)?;
    let file_name = file.name.clone();

    if let Err(err) = controller.select(file) {
        match err {
            RxLensError::Validation(_) => {
                if let Some(banner) = controller.session().banner() {
                    report::print_banner(banner);
                }
                return Ok(None);
            }
            other => return Err(other),
        }
    }

    if let Some(banner) = controller.session().banner() {
        report::print_banner(banner);
    }

    match controller.take_preview().await {
        Some(Ok(preview)) => report::print_preview(&preview, controller.session().is_heic()),
        Some(Err(e)) => println!("ℹ プレビューなし: {}", e),
        None => {}
    }

    loop {
        let spinner = spinner();
        let completion = controller.submit().await;
        spinner.finish_and_clear();

        let model = match completion {
            Some(Completion::Applied(model)) => model,
            Some(Completion::Discarded) | None => return Ok(None),
        };

        if let Some(banner) = controller.session().banner() {
            report::print_banner(banner);
        }

        if json {
            println!("{}", serde_json::to_string_pretty(&model)?);
        } else {
            report::print_model(&model);
        }

        if interactive && controller.session().state() == SessionState::Failed && confirm_retry()? {
            continue;
        }

        return Ok(Some(SavedReport::new(&file_name, controller.session().state(), model)));
    }
}

fn spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}").unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message("Analyzing your prescription...");
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}

fn confirm_retry() -> Result<bool> {
    Confirm::new()
        .with_prompt("Retry analysis?")
        .default(false)
        .interact()
        .map_err(|e| RxLensError::Prompt(e.to_string()))
}
