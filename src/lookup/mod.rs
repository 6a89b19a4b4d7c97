//! ルックアップサービス連携
//!
//! バーコードと相関トークン（sequence_id）を送り、書誌・所在情報と
//! 判定済みステータスを受け取る。

mod http;

pub use http::HttpLookupClient;

use crate::error::Result;
use async_trait::async_trait;
use barcode_inventory_common::LookupResponse;

/// ルックアップの呼び出し口
///
/// 失敗（通信エラー・非2xx・不正なJSON）はすべてErrで返し、
/// 呼び出し側で "Connection Error" として扱う。
#[async_trait]
pub trait LookupService: Send + Sync {
    async fn lookup(&self, barcode: &str, sequence_id: u64) -> Result<LookupResponse>;
}
