use crate::error::{InventoryError, Result};
use barcode_inventory_common::QueueOrder;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const LOOKUP_URL_ENV: &str = "BARCODE_LOOKUP_URL";
const EXPORT_URL_ENV: &str = "BARCODE_EXPORT_URL";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// バーコード → 書誌情報のWebサービス
    pub lookup_url: Option<String>,
    /// CSV → スプレッドシート変換のWebサービス
    pub export_url: Option<String>,
    /// エクスポート先フォルダID
    pub folder_id: Option<String>,
    pub timeout_seconds: u64,
    /// セッション保存先（省略時はデータディレクトリ）
    pub session_path: Option<PathBuf>,
    pub queue_order: QueueOrder,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lookup_url: None,
            export_url: None,
            folder_id: None,
            timeout_seconds: 30,
            session_path: None,
            queue_order: QueueOrder::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let dir = dirs::config_dir()
            .ok_or_else(|| InventoryError::Config("設定ディレクトリが見つかりません".into()))?;
        Ok(dir.join("barcode-inventory").join("config.json"))
    }

    /// セッションファイルのパス
    pub fn session_file(&self) -> Result<PathBuf> {
        if let Some(path) = &self.session_path {
            return Ok(path.clone());
        }
        let dir = dirs::data_local_dir()
            .ok_or_else(|| InventoryError::Config("データディレクトリが見つかりません".into()))?;
        Ok(dir.join("barcode-inventory").join("session.txt"))
    }

    pub fn get_lookup_url(&self) -> Result<String> {
        // 環境変数を優先
        if let Ok(url) = std::env::var(LOOKUP_URL_ENV) {
            if !url.trim().is_empty() {
                return Ok(url);
            }
        }
        self.lookup_url.clone().ok_or(InventoryError::MissingLookupUrl)
    }

    pub fn get_export_url(&self) -> Result<String> {
        if let Ok(url) = std::env::var(EXPORT_URL_ENV) {
            if !url.trim().is_empty() {
                return Ok(url);
            }
        }
        self.export_url.clone().ok_or(InventoryError::MissingExportUrl)
    }

    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_seconds.max(1))
    }
}
