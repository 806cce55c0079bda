mod commands;
mod utils;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cobblerflow")]
#[command(about = "宣言した通りに、Cobbler の system を揃える。", long_about = None)]
struct Cli {
    /// 宣言ファイル（省略時は systems.kdl を探索）
    #[arg(short, long, global = true, env = "COBBLERFLOW_CONFIG_PATH")]
    file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Cobbler 上の system 一覧を表示
    List {
        /// JSON で出力
        #[arg(long)]
        json: bool,
    },
    /// 宣言ファイルを検証（Cobbler には接続しない）
    Validate,
    /// 適用した場合の変更内容を表示
    Plan {
        /// JSON で出力
        #[arg(long)]
        json: bool,
    },
    /// 宣言を Cobbler に適用
    Apply {
        /// JSON で出力
        #[arg(long)]
        json: bool,
    },
    /// バージョン情報を表示
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // ログは stderr に出力（stdout は --json 用）
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Version => {
            println!("cobblerflow {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::Validate => commands::validate::handle(cli.file.as_deref()),
        Commands::List { json } => commands::list::handle(json).await,
        Commands::Plan { json } => commands::plan::handle(cli.file.as_deref(), json).await,
        Commands::Apply { json } => commands::apply::handle(cli.file.as_deref(), json).await,
    }
}
