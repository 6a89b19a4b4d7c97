//! 行キュー（スキャンセッションの状態）
//!
//! セッション内の全行・連番カウンタ・カレント行を所有する。
//! I/Oは持たず、処理ループ（CLI側）が以下を繰り返す:
//!
//! 1. `begin_next()` で次の New 行を Processing にする
//! 2. ルックアップ結果を `complete_lookup()` で書き戻す
//! 3. 保存して 1 に戻る
//!
//! Processing の行は常に0件か1件。発行済みのルックアップも常に0件か1件で、
//! 行を再スキャン・削除しても、その応答が `complete_lookup()` に戻るまでは
//! 次のルックアップを発行しない。

use crate::barcode::is_valid_barcode;
use crate::codec::RestoredRow;
use crate::lookup::LookupResponse;
use crate::types::{ItemRecord, ItemStatus, LifecycleState, METADATA_KEYS};
use serde::{Deserialize, Serialize};

pub const INVALID_BARCODE_MESSAGE: &str = "Invalid item barcode";
pub const CONNECTION_ERROR_MESSAGE: &str = "Connection Error";

/// New 行を選ぶ順序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QueueOrder {
    /// 最後に追加された New 行から
    #[default]
    NewestFirst,
    /// 最初に追加された New 行から（表の一番下から）
    OldestFirst,
}

impl std::str::FromStr for QueueOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "newest-first" | "newest" | "lifo" => Ok(QueueOrder::NewestFirst),
            "oldest-first" | "oldest" | "fifo" => Ok(QueueOrder::OldestFirst),
            _ => Err(format!(
                "Unknown queue order: {}. Use newest-first or oldest-first",
                s
            )),
        }
    }
}

impl std::fmt::Display for QueueOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueueOrder::NewestFirst => write!(f, "newest-first"),
            QueueOrder::OldestFirst => write!(f, "oldest-first"),
        }
    }
}

/// 発行するルックアップ
///
/// 応答はこのキーで行を探す（表の位置には頼らない）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRequest {
    pub barcode: String,
    pub sequence_id: u64,
    attempt: u32,
}

/// `begin_next()` の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextStep {
    /// ルックアップ中の行がある
    Busy,
    /// New 行なし
    Drained,
    /// ネットワーク呼び出しが必要
    Lookup(LookupRequest),
    /// 形式不正でその場で FAIL にした
    SettledLocally { sequence_id: u64 },
}

/// ルックアップの結果
#[derive(Debug, Clone)]
pub enum LookupOutcome {
    Found(LookupResponse),
    TransportFailure(String),
}

/// スキャンセッション
#[derive(Debug, Clone, Default)]
pub struct RowQueue {
    /// 追加順（古い順）。表示は逆順
    records: Vec<ItemRecord>,
    last_sequence: u64,
    current: Option<u64>,
    order: QueueOrder,
    /// 応答待ちのルックアップ
    outstanding: Option<LookupRequest>,
}

impl RowQueue {
    pub fn new(order: QueueOrder) -> Self {
        Self {
            order,
            ..Default::default()
        }
    }

    pub fn order(&self) -> QueueOrder {
        self.order
    }

    fn next_sequence(&mut self) -> u64 {
        self.last_sequence += 1;
        self.last_sequence
    }

    /// 1件追加（New・カレント）
    ///
    /// 空文字列は無視する。形式チェックはここではしない
    pub fn add(&mut self, barcode: &str) -> Option<u64> {
        if barcode.is_empty() {
            return None;
        }
        let sequence_id = self.next_sequence();
        self.records.push(ItemRecord::new(barcode, sequence_id));
        self.current = Some(sequence_id);
        Some(sequence_id)
    }

    /// 一括追加（空行は無視、重複チェックなし）
    pub fn add_bulk<'a, I>(&mut self, lines: I) -> Vec<u64>
    where
        I: IntoIterator<Item = &'a str>,
    {
        lines
            .into_iter()
            .filter_map(|line| self.add(line.trim()))
            .collect()
    }

    /// 保存データから復元（Settled・非カレント）
    pub fn restore(&mut self, rows: Vec<RestoredRow>) -> usize {
        let count = rows.len();
        for row in rows {
            let sequence_id = self.next_sequence();
            let mut record = ItemRecord::new(row.barcode, sequence_id);
            record.metadata = row.metadata;
            record.status = row.status;
            record.status_message = row.status_message;
            record.timestamp = row.timestamp;
            record.lifecycle = LifecycleState::Settled;
            self.records.push(record);
        }
        count
    }

    /// 再スキャン要求: どの状態からでも New に戻す
    pub fn rescan(&mut self, sequence_id: u64) -> bool {
        let Some(record) = self.get_mut(sequence_id) else {
            return false;
        };
        record.lifecycle = LifecycleState::New;
        record.status = None;
        record.status_message.clear();
        self.current = Some(sequence_id);
        true
    }

    /// 行削除
    pub fn delete(&mut self, sequence_id: u64) -> Option<ItemRecord> {
        let idx = self
            .records
            .iter()
            .position(|r| r.sequence_id == sequence_id)?;
        if self.current == Some(sequence_id) {
            self.current = None;
        }
        Some(self.records.remove(idx))
    }

    /// 全削除（エクスポート確認後）
    pub fn clear(&mut self) {
        self.records.clear();
        self.current = None;
    }

    /// カレント行の判定を手動で上書き
    ///
    /// カレント行が未確定（New / Processing）の場合は何もしない（None）
    pub fn override_current_status(
        &mut self,
        status: ItemStatus,
        message: &str,
    ) -> Option<u64> {
        let sequence_id = self.current()?.sequence_id;
        let record = self.get_mut(sequence_id)?;
        if !record.is_settled() {
            return None;
        }
        record.status = Some(status);
        record.status_message = message.to_string();
        Some(sequence_id)
    }

    /// 次の New 行を Processing にする
    pub fn begin_next(&mut self) -> NextStep {
        if self.outstanding.is_some() || self.processing_count() > 0 {
            return NextStep::Busy;
        }

        let candidates = self
            .records
            .iter_mut()
            .filter(|r| r.lifecycle == LifecycleState::New);
        let selected = match self.order {
            QueueOrder::NewestFirst => candidates.max_by_key(|r| r.sequence_id),
            QueueOrder::OldestFirst => candidates.min_by_key(|r| r.sequence_id),
        };
        let Some(record) = selected else {
            return NextStep::Drained;
        };

        record.lifecycle = LifecycleState::Processing;
        record.attempt += 1;

        if !is_valid_barcode(&record.barcode) {
            settle(record, ItemStatus::Fail, Some(INVALID_BARCODE_MESSAGE));
            return NextStep::SettledLocally {
                sequence_id: record.sequence_id,
            };
        }

        let request = LookupRequest {
            barcode: record.barcode.clone(),
            sequence_id: record.sequence_id,
            attempt: record.attempt,
        };
        self.outstanding = Some(request.clone());
        NextStep::Lookup(request)
    }

    /// ルックアップ結果を書き戻して Settled にする
    ///
    /// 行が削除済み・再スキャン済みの場合は何もしない（None）。
    /// どちらの場合も応答待ちは解除される
    pub fn complete_lookup(
        &mut self,
        request: &LookupRequest,
        outcome: LookupOutcome,
    ) -> Option<u64> {
        if self.outstanding.as_ref() == Some(request) {
            self.outstanding = None;
        }

        let record = self.records.iter_mut().find(|r| {
            r.sequence_id == request.sequence_id
                && r.barcode == request.barcode
                && r.attempt == request.attempt
                && r.lifecycle == LifecycleState::Processing
        })?;

        match outcome {
            LookupOutcome::Found(response) => {
                for key in METADATA_KEYS {
                    if let Some(slot) = record.metadata.field_mut(key) {
                        *slot = response.field(key).to_string();
                    }
                }
                record.status_message = response.field("status_msg").to_string();
                record.timestamp = response.field("timestamp").to_string();

                let raw_status = response.field("status");
                match raw_status.parse::<ItemStatus>() {
                    Ok(status) => settle(record, status, None),
                    Err(_) => {
                        let message = if raw_status.trim().is_empty() {
                            "Missing status".to_string()
                        } else {
                            format!("Unrecognized status: {}", raw_status)
                        };
                        settle(record, ItemStatus::Fail, Some(&message));
                    }
                }
            }
            LookupOutcome::TransportFailure(_) => {
                settle(record, ItemStatus::Fail, Some(CONNECTION_ERROR_MESSAGE));
            }
        }

        Some(request.sequence_id)
    }

    pub fn get(&self, sequence_id: u64) -> Option<&ItemRecord> {
        self.records.iter().find(|r| r.sequence_id == sequence_id)
    }

    fn get_mut(&mut self, sequence_id: u64) -> Option<&mut ItemRecord> {
        self.records.iter_mut().find(|r| r.sequence_id == sequence_id)
    }

    /// カレント行（未設定なら表示順の先頭）
    pub fn current(&self) -> Option<&ItemRecord> {
        self.current
            .and_then(|seq| self.get(seq))
            .or_else(|| self.records.last())
    }

    pub fn is_current(&self, sequence_id: u64) -> bool {
        self.current().map(|r| r.sequence_id) == Some(sequence_id)
    }

    /// 表示順（新しい順）
    pub fn records(&self) -> impl DoubleEndedIterator<Item = &ItemRecord> + '_ {
        self.records.iter().rev()
    }

    /// 保存順（古い順）
    pub fn records_oldest_first(&self) -> &[ItemRecord] {
        &self.records
    }

    /// 応答待ちのルックアップがあるか
    pub fn has_outstanding_lookup(&self) -> bool {
        self.outstanding.is_some()
    }

    pub fn processing_count(&self) -> usize {
        self.count_in(LifecycleState::Processing)
    }

    pub fn pending_count(&self) -> usize {
        self.count_in(LifecycleState::New)
    }

    fn count_in(&self, state: LifecycleState) -> usize {
        self.records.iter().filter(|r| r.lifecycle == state).count()
    }

    /// New も Processing も無い
    pub fn is_idle(&self) -> bool {
        self.records.iter().all(|r| r.is_settled())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// 判定を書き込む（messageがNoneなら既存メッセージのまま）
fn settle(record: &mut ItemRecord, status: ItemStatus, message: Option<&str>) {
    record.status = Some(status);
    if let Some(message) = message {
        record.status_message = message.to_string();
    }
    record.lifecycle = LifecycleState::Settled;
}
