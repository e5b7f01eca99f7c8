use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "snapgeo")]
#[command(about = "GPSオーバーレイ画像から座標を抽出するツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 画像1枚から座標を抽出してJSONを出力
    Extract {
        /// 画像ファイルのパス
        #[arg(required = true)]
        image: PathBuf,

        /// 最初から追加処理（ultra）のバリアントも使う
        #[arg(short, long)]
        aggressive: bool,

        /// JSONを整形して出力
        #[arg(long)]
        pretty: bool,

        /// タイムアウト秒数（デフォルト: 設定値）
        #[arg(short, long)]
        timeout: Option<u64>,
    },

    /// フォルダ内の画像をまとめて処理
    Batch {
        /// 画像フォルダのパス
        #[arg(required = true)]
        folder: PathBuf,

        /// 出力JSONファイル（デフォルト: 標準出力）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 最初から追加処理（ultra）のバリアントも使う
        #[arg(short, long)]
        aggressive: bool,

        /// サブフォルダも再帰的にスキャン
        #[arg(short = 'r', long)]
        recursive: bool,
    },

    /// 設定を表示・変更
    Config {
        /// 現在の設定を表示
        #[arg(long)]
        show: bool,

        /// Tesseract の実行ファイルを設定
        #[arg(long)]
        set_tesseract: Option<PathBuf>,

        /// 認識の並列数を設定
        #[arg(long)]
        set_workers: Option<usize>,
    },

    /// 認識設定の一覧を表示
    Catalog,
}
