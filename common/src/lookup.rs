//! ルックアップサービスのレスポンス
//!
//! サービスはバーコード（エコー）と12項目を返す。値は文字列以外
//! （数値・真偽値・null）の場合もあるので、ここで文字列に揃える。

use crate::error::{Error, Result};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// 行に書き戻すキー（メタデータ9項目 + status, status_msg, timestamp）
pub const RESPONSE_KEYS: [&str; 12] = [
    "location_code",
    "call_number",
    "volume",
    "title",
    "status_code",
    "due_date",
    "icode2",
    "is_suppressed",
    "record_num",
    "status",
    "status_msg",
    "timestamp",
];

/// 1件分のルックアップ結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupResponse {
    /// エコーされたバーコード
    pub barcode: Option<String>,
    fields: HashMap<String, String>,
}

impl LookupResponse {
    /// テストや手組み用
    pub fn from_pairs<I, K, V>(barcode: Option<&str>, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            barcode: barcode.map(str::to_string),
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn from_json_str(body: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(body)?;
        Self::from_json(value)
    }

    pub fn from_json(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self::from_map(map)),
            other => Err(Error::Parse(format!(
                "ルックアップ結果がJSONオブジェクトではありません: {}",
                other
            ))),
        }
    }

    fn from_map(map: Map<String, Value>) -> Self {
        let mut fields = HashMap::new();
        let mut barcode = None;
        for (key, value) in map {
            let text = value_to_text(value);
            if key == "barcode" {
                barcode = Some(text);
            } else {
                fields.insert(key, text);
            }
        }
        Self { barcode, fields }
    }

    /// 値（無ければ空文字列）
    pub fn field(&self, key: &str) -> &str {
        self.fields.get(key).map(String::as_str).unwrap_or("")
    }
}

fn value_to_text(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    }
}
