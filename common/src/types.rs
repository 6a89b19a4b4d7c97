//! スキャン記録の型定義
//!
//! CLIとテストで共有される型:
//! - ItemStatus: 判定結果（PULL/PASS/FAIL/META-*）
//! - LifecycleState: 行の処理状態
//! - ItemMetadata: ルックアップで取得する書誌・所在情報
//! - ItemRecord: 1件のスキャン

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 判定結果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemStatus {
    #[serde(rename = "PULL")]
    Pull,
    #[serde(rename = "PASS")]
    Pass,
    #[serde(rename = "FAIL")]
    Fail,
    #[serde(rename = "META-TTL")]
    MetaTitle,
    #[serde(rename = "META-VOL")]
    MetaVolume,
    #[serde(rename = "META-CALL")]
    MetaCall,
}

impl ItemStatus {
    pub const ALL: [ItemStatus; 6] = [
        ItemStatus::Pull,
        ItemStatus::Pass,
        ItemStatus::Fail,
        ItemStatus::MetaTitle,
        ItemStatus::MetaVolume,
        ItemStatus::MetaCall,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Pull => "PULL",
            ItemStatus::Pass => "PASS",
            ItemStatus::Fail => "FAIL",
            ItemStatus::MetaTitle => "META-TTL",
            ItemStatus::MetaVolume => "META-VOL",
            ItemStatus::MetaCall => "META-CALL",
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        ItemStatus::ALL
            .iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| format!("Unknown status: {}", s))
    }
}

/// 行の処理状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecycleState {
    /// 追加直後・再スキャン要求後
    New,
    /// ルックアップ中（同時に1件まで）
    Processing,
    /// 判定済み
    Settled,
}

/// ルックアップで埋まるメタデータ
///
/// 未取得の項目は空文字列（Noneにはしない）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemMetadata {
    pub location_code: String,
    pub call_number: String,
    pub volume: String,
    pub title: String,
    pub status_code: String,
    pub due_date: String,
    pub icode2: String,
    pub is_suppressed: String,
    pub record_num: String,
}

impl ItemMetadata {
    /// フィールド名 → 値の書き込み先
    ///
    /// 未知のキーはNone
    pub fn field_mut(&mut self, key: &str) -> Option<&mut String> {
        match key {
            "location_code" => Some(&mut self.location_code),
            "call_number" => Some(&mut self.call_number),
            "volume" => Some(&mut self.volume),
            "title" => Some(&mut self.title),
            "status_code" => Some(&mut self.status_code),
            "due_date" => Some(&mut self.due_date),
            "icode2" => Some(&mut self.icode2),
            "is_suppressed" => Some(&mut self.is_suppressed),
            "record_num" => Some(&mut self.record_num),
            _ => None,
        }
    }

    /// 保存・出力順の値
    pub fn values(&self) -> [&str; 9] {
        [
            self.location_code.as_str(),
            self.call_number.as_str(),
            self.volume.as_str(),
            self.title.as_str(),
            self.status_code.as_str(),
            self.due_date.as_str(),
            self.icode2.as_str(),
            self.is_suppressed.as_str(),
            self.record_num.as_str(),
        ]
    }
}

/// メタデータのキー（保存順）
pub const METADATA_KEYS: [&str; 9] = [
    "location_code",
    "call_number",
    "volume",
    "title",
    "status_code",
    "due_date",
    "icode2",
    "is_suppressed",
    "record_num",
];

/// 1件のスキャン
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub barcode: String,
    pub sequence_id: u64,
    pub lifecycle: LifecycleState,
    pub status: Option<ItemStatus>,
    pub status_message: String,
    pub metadata: ItemMetadata,
    pub timestamp: String,

    /// New → Processing の遷移回数（古い応答の破棄に使う）
    #[serde(skip)]
    pub(crate) attempt: u32,
}

impl ItemRecord {
    pub fn new(barcode: impl Into<String>, sequence_id: u64) -> Self {
        Self {
            barcode: barcode.into(),
            sequence_id,
            lifecycle: LifecycleState::New,
            status: None,
            status_message: String::new(),
            metadata: ItemMetadata::default(),
            timestamp: String::new(),
            attempt: 0,
        }
    }

    /// ステータス文字列（未判定は空）
    pub fn status_text(&self) -> &str {
        self.status.map(|s| s.as_str()).unwrap_or("")
    }

    pub fn is_settled(&self) -> bool {
        self.lifecycle == LifecycleState::Settled
    }
}
