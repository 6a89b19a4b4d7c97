//! 行キュー処理ループ
//!
//! `RowQueue` を1タスクで所有し、New 行を1件ずつルックアップに回す。
//! ルックアップは別タスクで実行し、結果はチャネル経由でこのループに戻る。
//! 行の確定・削除・全消去のたびにセッションを保存する（失敗は警告のみ）。

use crate::lookup::LookupService;
use crate::store::SessionStore;
use barcode_inventory_common::{
    ItemRecord, ItemStatus, LookupOutcome, LookupRequest, NextStep, RestoredRow, RowQueue,
};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// 完了したルックアップ
#[derive(Debug)]
pub struct LookupEvent {
    pub request: LookupRequest,
    pub outcome: LookupOutcome,
}

/// 確定通知
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settled {
    pub sequence_id: u64,
    /// 対話的に追加・再スキャンした行の確定（表示側への受け渡しのみ）
    pub show_summary: bool,
}

pub struct Processor<S: SessionStore> {
    queue: RowQueue,
    lookup: Arc<dyn LookupService>,
    store: S,
    events_tx: mpsc::UnboundedSender<LookupEvent>,
    events_rx: mpsc::UnboundedReceiver<LookupEvent>,
    /// 確定時に概要を表示する行
    summary_rows: HashSet<u64>,
    lookups_issued: usize,
}

impl<S: SessionStore> Processor<S> {
    pub fn new(queue: RowQueue, lookup: Arc<dyn LookupService>, store: S) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            queue,
            lookup,
            store,
            events_tx,
            events_rx,
            summary_rows: HashSet::new(),
            lookups_issued: 0,
        }
    }

    pub fn queue(&self) -> &RowQueue {
        &self.queue
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// 発行したルックアップ数
    pub fn lookups_issued(&self) -> usize {
        self.lookups_issued
    }

    /// 1件追加して処理開始
    ///
    /// `show_summary` はこの行が確定したときの通知にだけ付く
    pub fn add(&mut self, barcode: &str, show_summary: bool) -> (Option<u64>, Vec<Settled>) {
        let added = self.queue.add(barcode);
        if let (Some(sequence_id), true) = (added, show_summary) {
            self.summary_rows.insert(sequence_id);
        }
        (added, self.process_next())
    }

    /// 一括追加して処理開始
    pub fn add_bulk<'a, I>(&mut self, lines: I) -> (Vec<u64>, Vec<Settled>)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let added = self.queue.add_bulk(lines);
        info!(count = added.len(), "一括追加");
        (added, self.process_next())
    }

    /// 保存データを復元（確認済みであること）
    pub fn restore(&mut self, rows: Vec<RestoredRow>) -> usize {
        let count = self.queue.restore(rows);
        self.persist();
        count
    }

    /// 再スキャン
    pub fn rescan(&mut self, sequence_id: u64) -> (bool, Vec<Settled>) {
        if !self.queue.rescan(sequence_id) {
            return (false, Vec::new());
        }
        self.summary_rows.insert(sequence_id);
        (true, self.process_next())
    }

    /// 行削除
    pub fn delete(&mut self, sequence_id: u64) -> (Option<ItemRecord>, Vec<Settled>) {
        let removed = self.queue.delete(sequence_id);
        if removed.is_none() {
            return (None, Vec::new());
        }
        self.summary_rows.remove(&sequence_id);
        self.persist();
        // 処理中の行を消した場合はゲートが開く
        (removed, self.process_next())
    }

    /// 全消去（エクスポート確認後）
    pub fn clear(&mut self) {
        self.queue.clear();
        self.summary_rows.clear();
        self.persist();
    }

    /// カレント行の判定を手動で変更
    pub fn override_current_status(&mut self, status: ItemStatus, message: &str) -> Option<u64> {
        let updated = self.queue.override_current_status(status, message);
        if updated.is_some() {
            self.persist();
        }
        updated
    }

    /// 次の New 行を処理する
    ///
    /// ルックアップが必要なら発行して戻る。形式不正の行はその場で確定し、
    /// 続けて次の行を見る。応答待ちがあれば何もしない。
    pub fn process_next(&mut self) -> Vec<Settled> {
        let mut settled = Vec::new();
        loop {
            match self.queue.begin_next() {
                NextStep::Busy | NextStep::Drained => break,
                NextStep::SettledLocally { sequence_id } => {
                    debug!(sequence_id, "invalid barcode");
                    self.persist();
                    settled.push(self.notice(sequence_id));
                }
                NextStep::Lookup(request) => {
                    self.spawn_lookup(request);
                    break;
                }
            }
        }
        settled
    }

    fn spawn_lookup(&mut self, request: LookupRequest) {
        self.lookups_issued += 1;
        let lookup = Arc::clone(&self.lookup);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let outcome = match lookup.lookup(&request.barcode, request.sequence_id).await {
                Ok(response) => LookupOutcome::Found(response),
                Err(e) => {
                    warn!(barcode = %request.barcode, sequence_id = request.sequence_id, error = %e, "lookup failed");
                    LookupOutcome::TransportFailure(e.to_string())
                }
            };
            // 受信側が無い = 処理ループ終了済み
            let _ = tx.send(LookupEvent { request, outcome });
        });
    }

    /// 次のルックアップ完了を待つ
    pub async fn next_event(&mut self) -> Option<LookupEvent> {
        self.events_rx.recv().await
    }

    /// ルックアップ完了を反映して次へ進む
    pub fn handle_event(&mut self, event: LookupEvent) -> Vec<Settled> {
        let mut settled = Vec::new();
        match self.queue.complete_lookup(&event.request, event.outcome) {
            Some(sequence_id) => {
                self.persist();
                settled.push(self.notice(sequence_id));
            }
            None => {
                debug!(sequence_id = event.request.sequence_id, "stale lookup response dropped");
            }
        }
        settled.extend(self.process_next());
        settled
    }

    /// New / Processing が無くなるまで処理する
    pub async fn run_until_idle<F>(&mut self, mut on_settle: F)
    where
        F: FnMut(&ItemRecord, Settled),
    {
        let first = self.process_next();
        self.report(&first, &mut on_settle);

        while !self.queue.is_idle() || self.queue.has_outstanding_lookup() {
            let Some(event) = self.next_event().await else {
                break;
            };
            let settled = self.handle_event(event);
            self.report(&settled, &mut on_settle);
        }
    }

    fn report<F>(&self, settled: &[Settled], on_settle: &mut F)
    where
        F: FnMut(&ItemRecord, Settled),
    {
        for notice in settled {
            if let Some(record) = self.queue.get(notice.sequence_id) {
                on_settle(record, *notice);
            }
        }
    }

    fn notice(&mut self, sequence_id: u64) -> Settled {
        Settled {
            sequence_id,
            show_summary: self.summary_rows.remove(&sequence_id),
        }
    }

    /// 保存（ベストエフォート）
    fn persist(&self) {
        if let Err(e) = self.store.save(&self.queue) {
            warn!(error = %e, "セッション保存に失敗しました");
        }
    }
}
