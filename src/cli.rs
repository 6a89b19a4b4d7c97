use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "barcode-inventory")]
#[command(about = "バーコード棚卸しスキャン支援ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// セッション保存ファイル（設定より優先）
    #[arg(long, global = true)]
    pub session: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 対話的にバーコードをスキャン
    Scan {
        /// デモ用バーコード（カンマ区切り、`:s` で1件ずつスキャン）
        #[arg(long, value_delimiter = ',')]
        demo: Vec<String>,
    },

    /// バーコードを一括追加して処理
    Add {
        /// バーコード
        barcodes: Vec<String>,

        /// バーコード一覧ファイル（テキスト1行1件 / xlsxのA列）
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// 保存済みセッションを確認なしで復元して続ける
        #[arg(long, conflicts_with = "fresh")]
        resume: bool,

        /// 保存済みセッションを破棄して新規に始める
        #[arg(long)]
        fresh: bool,
    },

    /// 保存済みセッションをエクスポート
    Export {
        /// 出力形式 (sheet/excel/csv)
        #[arg(short, long, default_value = "excel")]
        format: ExportFormat,

        /// 出力ファイル/ディレクトリ
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 出力後に確認の上でセッションを消去
        #[arg(long)]
        clear: bool,
    },

    /// セッション管理
    Session {
        /// 内容を表示
        #[arg(long)]
        show: bool,

        /// セッションを削除
        #[arg(long)]
        clear: bool,
    },

    /// バーコード形式を検証
    Validate {
        /// バーコード
        barcode: String,
    },

    /// 設定を表示/編集
    Config {
        /// ルックアップサービスURLを設定
        #[arg(long)]
        set_lookup_url: Option<String>,

        /// エクスポートサービスURLを設定
        #[arg(long)]
        set_export_url: Option<String>,

        /// エクスポート先フォルダIDを設定
        #[arg(long)]
        set_folder_id: Option<String>,

        /// 処理順 (newest-first/oldest-first)
        #[arg(long)]
        set_queue_order: Option<barcode_inventory_common::QueueOrder>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ExportFormat {
    /// スプレッドシート変換サービス
    Sheet,
    #[default]
    Excel,
    Csv,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sheet" | "gsheet" => Ok(ExportFormat::Sheet),
            "excel" | "xlsx" => Ok(ExportFormat::Excel),
            "csv" => Ok(ExportFormat::Csv),
            _ => Err(format!("Unknown format: {}. Use sheet, excel, or csv", s)),
        }
    }
}
