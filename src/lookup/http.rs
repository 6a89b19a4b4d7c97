//! reqwestによるルックアップクライアント
//!
//! `GET <lookup_url>?barcode=<barcode>&sheetrow=<sequence_id>`

use super::LookupService;
use crate::error::{InventoryError, Result};
use async_trait::async_trait;
use barcode_inventory_common::LookupResponse;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

pub struct HttpLookupClient {
    client: Client,
    endpoint: String,
}

impl HttpLookupClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl LookupService for HttpLookupClient {
    async fn lookup(&self, barcode: &str, sequence_id: u64) -> Result<LookupResponse> {
        debug!(barcode, sequence_id, endpoint = %self.endpoint, "lookup request");

        let sheetrow = sequence_id.to_string();
        let response = self
            .client
            .get(&self.endpoint)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&[("barcode", barcode), ("sheetrow", sheetrow.as_str())])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(InventoryError::Lookup(format!(
                "HTTP {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let parsed = LookupResponse::from_json_str(&body)?;
        debug!(barcode, sequence_id, status = parsed.field("status"), "lookup response");
        Ok(parsed)
    }
}
