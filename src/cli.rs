use clap::{Parser, Subcommand};
use std::path::PathBuf;

const PATTERN_HELP: &str = "命名パターン（%f=フォルダ名(番号除去) %F=フォルダ名 %p=ファイル名((N)除去) %P=ファイル名）";

#[derive(Parser)]
#[command(name = "photo-report")]
#[command(about = "写真フォルダからWord写真報告書を生成するツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 写真を2枚ずつ配置した報告書をテンプレートに追加して保存
    Generate {
        /// 写真ファイルまたはフォルダ（フォルダは配下の写真をすべて対象）
        #[arg(required = true, num_args = 1..)]
        inputs: Vec<PathBuf>,

        /// テンプレートdocx（省略時は設定値）
        #[arg(short, long)]
        template: Option<PathBuf>,

        /// 出力docx（フォルダ指定時は report.docx）
        #[arg(short, long)]
        output: PathBuf,

        #[arg(short, long, help = PATTERN_HELP)]
        pattern: Option<String>,

        /// サブフォルダを再帰的にスキャンしない
        #[arg(long)]
        no_recursive: bool,

        /// 画像幅（インチ、省略時は設定値）
        #[arg(short, long)]
        width: Option<f64>,
    },

    /// パターン適用後のキャプションを一覧表示
    Preview {
        /// 写真ファイルまたはフォルダ
        #[arg(required = true, num_args = 1..)]
        inputs: Vec<PathBuf>,

        #[arg(short, long, help = PATTERN_HELP)]
        pattern: Option<String>,

        /// サブフォルダを再帰的にスキャンしない
        #[arg(long)]
        no_recursive: bool,

        /// JSONで出力
        #[arg(long)]
        json: bool,
    },

    /// 空のテンプレートdocxを作成
    NewTemplate {
        /// 出力先
        #[arg(required = true)]
        output: PathBuf,
    },

    /// 設定を表示/編集
    Config {
        /// 既定の命名パターンを設定
        #[arg(long)]
        set_pattern: Option<String>,

        /// 既定のテンプレートを設定
        #[arg(long)]
        set_template: Option<PathBuf>,

        /// 既定の画像幅（インチ）を設定
        #[arg(long)]
        set_width: Option<f64>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}
