use thiserror::Error;

#[derive(Error, Debug)]
pub enum InventoryError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ルックアップURLが設定されていません。`barcode-inventory config --set-lookup-url URL` で設定してください")]
    MissingLookupUrl,

    #[error("エクスポートURLが設定されていません。`barcode-inventory config --set-export-url URL` で設定してください")]
    MissingExportUrl,

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("ルックアップ失敗: {0}")]
    Lookup(String),

    #[error("エクスポートサービスエラー: {0}")]
    ExportService(String),

    #[error("Excel生成エラー: {0}")]
    ExcelGeneration(String),

    #[error("Excel読み込みエラー: {0}")]
    ExcelRead(String),

    #[error("エクスポートするデータがありません")]
    NoData,

    #[error("入力エラー: {0}")]
    Prompt(String),

    #[error("HTTPエラー: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] barcode_inventory_common::Error),
}

pub type Result<T> = std::result::Result<T, InventoryError>;
