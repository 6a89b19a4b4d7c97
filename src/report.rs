//! 端末表示
//!
//! カレント行の概要と表全体の一覧。

use barcode_inventory_common::{ItemRecord, ItemStatus, LifecycleState, RowQueue};

fn marker(record: &ItemRecord) -> &'static str {
    match (record.lifecycle, record.status) {
        (LifecycleState::New, _) => "…",
        (LifecycleState::Processing, _) => "⟳",
        (_, Some(ItemStatus::Pass)) => "✔",
        (_, Some(ItemStatus::Fail)) => "✖",
        (_, Some(ItemStatus::Pull)) => "⇧",
        (_, Some(_)) => "⚠",
        (_, None) => " ",
    }
}

/// 1行の概要
pub fn summary_line(record: &ItemRecord) -> String {
    let status = match record.lifecycle {
        LifecycleState::New => "NEW",
        LifecycleState::Processing => "PROCESSING",
        LifecycleState::Settled => record.status_text(),
    };
    let mut line = format!(
        "{} #{} {} {:<9}",
        marker(record),
        record.sequence_id,
        record.barcode,
        status
    );
    let meta = &record.metadata;
    for value in [&meta.call_number, &meta.volume, &meta.title] {
        if !value.is_empty() {
            line.push_str("  ");
            line.push_str(value);
        }
    }
    if !record.status_message.is_empty() {
        line.push_str(&format!("  ({})", record.status_message));
    }
    line
}

/// カレント行の表示
pub fn print_current(queue: &RowQueue) {
    if let Some(record) = queue.current() {
        println!("  最終スキャン: {}", summary_line(record));
    }
}

/// 表全体（新しい順）
pub fn print_table(queue: &RowQueue) {
    if queue.is_empty() {
        println!("（行がありません）");
        return;
    }
    for record in queue.records() {
        let current = if queue.is_current(record.sequence_id) { "*" } else { " " };
        println!("{}{}", current, summary_line(record));
    }
    println!(
        "計 {}件（未処理 {}件）",
        queue.len(),
        queue.pending_count() + queue.processing_count()
    );
}
