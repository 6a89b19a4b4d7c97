//! スプレッドシート変換サービスへの送信
//!
//! CSVテキストをフォームで POST し、サービス側でシートを作成させる。
//! 応答内容は見ない（HTTPステータスのみ確認）。

use crate::error::{InventoryError, Result};
use barcode_inventory_common::{sheet_name, to_csv, ItemRecord};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// 送信内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetUpload {
    pub name: String,
    pub folder_id: String,
    pub csv: String,
}

impl SheetUpload {
    pub fn from_records(records: &[&ItemRecord], folder_id: &str) -> Self {
        Self {
            name: sheet_name(records.iter().copied()),
            folder_id: folder_id.to_string(),
            csv: to_csv(records.iter().copied()),
        }
    }

    fn form(&self) -> [(&str, &str); 3] {
        [
            ("name", self.name.as_str()),
            ("folderid", self.folder_id.as_str()),
            ("data", self.csv.as_str()),
        ]
    }
}

pub async fn upload(endpoint: &str, upload: &SheetUpload, timeout: Duration) -> Result<()> {
    let client = Client::builder().timeout(timeout).build()?;
    debug!(endpoint, name = %upload.name, bytes = upload.csv.len(), "sheet upload");

    let response = client.post(endpoint).form(&upload.form()).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(InventoryError::ExportService(format!("HTTP {}", status)));
    }
    Ok(())
}
