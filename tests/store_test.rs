//! セッション保存のテスト
//!
//! ファイル保存・復元・破損データの扱いを検証

use barcode_inventory::store::{FileSessionStore, MemorySessionStore, SessionStore};
use barcode_inventory_common::{
    ItemStatus, LifecycleState, LookupOutcome, LookupResponse, NextStep, QueueOrder, RowQueue,
};
use tempfile::tempdir;

/// ブラウザ版が localStorage に保存していた形式
const BROWSER_BLOB: &str = "\
00000000000001||stk||B200||v.1||First Title||-||||0||f||i1000001||PASS||||2016-05-01 10:00:00\
!!!!\
00000000000002||stk||A100||||Second Title||-||||0||f||i1000002||META-VOL||Volume missing||2016-05-01 10:01:00";

/// ファイルが無ければ復元対象なし
#[test]
fn test_missing_file_is_none() {
    let dir = tempdir().expect("Failed to create temp dir");
    let store = FileSessionStore::new(dir.path().join("session.txt"));
    assert!(store.load().unwrap().is_none());
    assert!(!store.remove().unwrap());
}

/// 保存して読み戻す
#[test]
fn test_save_and_load() {
    let dir = tempdir().expect("Failed to create temp dir");
    let store = FileSessionStore::new(dir.path().join("nested").join("session.txt"));

    let mut queue = RowQueue::default();
    queue.add("00000000000001");
    queue.add("00000000000002");
    while let NextStep::Lookup(request) = queue.begin_next() {
        let response = LookupResponse::from_pairs(Some(request.barcode.as_str()), [("status", "PASS")]);
        queue.complete_lookup(&request, LookupOutcome::Found(response));
    }
    assert!(queue.override_current_status(ItemStatus::Pull, "要修理").is_some());

    store.save(&queue).expect("保存失敗");
    assert!(store.path().exists());

    let decoded = store.load().unwrap().expect("復元対象があるはず");
    assert_eq!(decoded.skipped, 0);
    assert_eq!(decoded.rows.len(), 2);
    // 古い順に保存される
    assert_eq!(decoded.rows[0].barcode, "00000000000001");
    assert_eq!(decoded.rows[1].barcode, "00000000000002");
    assert_eq!(decoded.rows[1].status, Some(ItemStatus::Pull));
    assert_eq!(decoded.rows[1].status_message, "要修理");
}

/// ブラウザ版の保存内容を復元できる
#[test]
fn test_restore_browser_blob() {
    let store = MemorySessionStore::with_blob(BROWSER_BLOB);
    let decoded = store.load().unwrap().unwrap();

    let mut queue = RowQueue::new(QueueOrder::NewestFirst);
    assert_eq!(queue.restore(decoded.rows), 2);

    // 表示順は新しい順（最後に保存された行が先頭）
    let display: Vec<&str> = queue.records().map(|r| r.barcode.as_str()).collect();
    assert_eq!(display, vec!["00000000000002", "00000000000001"]);

    let newest = queue.records().next().unwrap();
    assert_eq!(newest.status, Some(ItemStatus::MetaVolume));
    assert_eq!(newest.status_message, "Volume missing");
    assert_eq!(newest.metadata.volume, "");
    assert_eq!(newest.lifecycle, LifecycleState::Settled);
    assert!(queue.is_idle());

    // 再保存しても同じ内容
    let resaved = MemorySessionStore::default();
    resaved.save(&queue).unwrap();
    assert_eq!(resaved.snapshot().as_deref(), Some(BROWSER_BLOB));
}

/// 破損行だけがスキップされる
#[test]
fn test_corrupted_rows_skipped() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("session.txt");
    let blob = format!("{}!!!!garbage||row!!!!", BROWSER_BLOB);
    std::fs::write(&path, blob).unwrap();

    let store = FileSessionStore::new(&path);
    let decoded = store.load().unwrap().unwrap();
    assert_eq!(decoded.rows.len(), 2);
    // "garbage||row" と末尾の空エントリ
    assert_eq!(decoded.skipped, 2);
}

/// 空ファイルは復元対象なし
#[test]
fn test_empty_file_is_none() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("session.txt");
    std::fs::write(&path, "").unwrap();

    let store = FileSessionStore::new(&path);
    assert!(store.load().unwrap().is_none());
    assert!(store.remove().unwrap());
    assert!(!path.exists());
}
