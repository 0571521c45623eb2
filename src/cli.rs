use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rx-lens")]
#[command(about = "処方箋画像AI解析クライアント", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 解析サービスのURL（設定ファイルより優先）
    #[arg(long, global = true)]
    pub endpoint: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 処方箋画像を解析（フォルダ指定時は直下の画像を1枚ずつ解析）
    Analyze {
        /// 画像ファイルまたはフォルダのパス
        #[arg(required = true)]
        path: PathBuf,

        /// 表示モデルをJSONで出力
        #[arg(long)]
        json: bool,

        /// HTML断片の出力先
        #[arg(long)]
        html: Option<PathBuf>,

        /// 解析結果レポート(JSON)の出力先
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 失敗時に再試行するか確認する
        #[arg(short, long)]
        interactive: bool,

        /// 送信前の疎通確認をしない
        #[arg(long)]
        no_probe: bool,
    },

    /// 解析サービスの疎通確認
    Health,

    /// 保存済みのAPIレスポンス(JSON)を表示
    Render {
        /// レスポンスJSONファイル
        #[arg(required = true)]
        input: PathBuf,

        /// HEIC画像のレスポンスとして扱う
        #[arg(long)]
        heic: bool,

        /// 表示モデルをJSONで出力
        #[arg(long)]
        json: bool,

        /// HTML断片の出力先
        #[arg(long)]
        html: Option<PathBuf>,
    },

    /// 設定を表示/編集
    Config {
        /// 解析サービスのURLを設定
        #[arg(long)]
        set_endpoint: Option<String>,

        /// タイムアウト(秒)を設定
        #[arg(long)]
        set_timeout: Option<u64>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}
