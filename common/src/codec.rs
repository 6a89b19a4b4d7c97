//! セッション保存形式
//!
//! 1行 = 13項目を `||` で連結、行同士は `!!!!` で連結。行は古い順
//! （表示の逆順）に並べる。ブラウザ版の localStorage と同じ形式なので、
//! 区切り文字と並び順は変更しないこと。

use crate::types::{ItemMetadata, ItemRecord, ItemStatus};

pub const FIELD_DELIMITER: &str = "||";
pub const RECORD_DELIMITER: &str = "!!!!";
pub const FIELD_COUNT: usize = 13;

/// 保存データから読み戻した1行
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoredRow {
    pub barcode: String,
    pub metadata: ItemMetadata,
    /// 空・未知の値はNone
    pub status: Option<ItemStatus>,
    pub status_message: String,
    pub timestamp: String,
}

/// デコード結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedSession {
    pub rows: Vec<RestoredRow>,
    /// 項目数が13でなかったため捨てた行数
    pub skipped: usize,
}

/// 1行分の13項目（保存順）
pub fn record_fields(record: &ItemRecord) -> [&str; FIELD_COUNT] {
    let m = record.metadata.values();
    [
        record.barcode.as_str(),
        m[0],
        m[1],
        m[2],
        m[3],
        m[4],
        m[5],
        m[6],
        m[7],
        m[8],
        record.status_text(),
        record.status_message.as_str(),
        record.timestamp.as_str(),
    ]
}

/// 古い順の行列をエンコード
pub fn encode_session<'a, I>(records_oldest_first: I) -> String
where
    I: IntoIterator<Item = &'a ItemRecord>,
{
    records_oldest_first
        .into_iter()
        .map(|record| record_fields(record).join(FIELD_DELIMITER))
        .collect::<Vec<_>>()
        .join(RECORD_DELIMITER)
}

/// デコード（空なら復元対象なし = None）
pub fn decode_session(blob: &str) -> Option<DecodedSession> {
    if blob.is_empty() {
        return None;
    }

    let mut decoded = DecodedSession::default();
    for entry in blob.split(RECORD_DELIMITER) {
        match decode_row(entry) {
            Some(row) => decoded.rows.push(row),
            None => decoded.skipped += 1,
        }
    }
    Some(decoded)
}

fn decode_row(entry: &str) -> Option<RestoredRow> {
    let fields: Vec<&str> = entry.split(FIELD_DELIMITER).collect();
    let [barcode, location_code, call_number, volume, title, status_code, due_date, icode2, is_suppressed, record_num, status, status_msg, timestamp] =
        fields.as_slice()
    else {
        return None;
    };

    Some(RestoredRow {
        barcode: barcode.to_string(),
        metadata: ItemMetadata {
            location_code: location_code.to_string(),
            call_number: call_number.to_string(),
            volume: volume.to_string(),
            title: title.to_string(),
            status_code: status_code.to_string(),
            due_date: due_date.to_string(),
            icode2: icode2.to_string(),
            is_suppressed: is_suppressed.to_string(),
            record_num: record_num.to_string(),
        },
        status: status.parse().ok(),
        status_message: status_msg.to_string(),
        timestamp: timestamp.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::RowQueue;

    fn row(barcode: &str, call_number: &str, status: &str) -> String {
        [
            barcode, "stk", call_number, "v.1", "Title", "-", "", "0", "f", "i123",
            status, "msg", "2016-05-01",
        ]
        .join(FIELD_DELIMITER)
    }

    #[test]
    fn test_empty_blob_is_none() {
        assert_eq!(decode_session(""), None);
    }

    #[test]
    fn test_decode_fields() {
        let blob = row("00000000000001", "QA1", "PASS");
        let decoded = decode_session(&blob).unwrap();
        assert_eq!(decoded.skipped, 0);
        let restored = &decoded.rows[0];
        assert_eq!(restored.barcode, "00000000000001");
        assert_eq!(restored.metadata.call_number, "QA1");
        assert_eq!(restored.metadata.record_num, "i123");
        assert_eq!(restored.status, Some(ItemStatus::Pass));
        assert_eq!(restored.status_message, "msg");
        assert_eq!(restored.timestamp, "2016-05-01");
    }

    #[test]
    fn test_malformed_entry_dropped_without_affecting_neighbours() {
        let blob = [
            row("00000000000001", "A", "PASS"),
            "00000000000002||only||three".to_string(),
            row("00000000000003", "C", "FAIL"),
        ]
        .join(RECORD_DELIMITER);

        let decoded = decode_session(&blob).unwrap();
        assert_eq!(decoded.skipped, 1);
        assert_eq!(decoded.rows.len(), 2);
        assert_eq!(decoded.rows[0].metadata.call_number, "A");
        assert_eq!(decoded.rows[1].barcode, "00000000000003");
        assert_eq!(decoded.rows[1].status, Some(ItemStatus::Fail));
    }

    #[test]
    fn test_too_many_fields_dropped() {
        let blob = format!("{}{}extra", row("00000000000001", "A", "PASS"), FIELD_DELIMITER);
        let decoded = decode_session(&blob).unwrap();
        assert!(decoded.rows.is_empty());
        assert_eq!(decoded.skipped, 1);
    }

    #[test]
    fn test_unknown_status_restored_as_none() {
        let decoded = decode_session(&row("00000000000001", "A", "")).unwrap();
        assert_eq!(decoded.rows[0].status, None);
    }

    #[test]
    fn test_decode_then_encode_preserves_fields() {
        let blob = [
            row("00000000000001", "B200", "PASS"),
            row("00000000000002", "A100", "META-CALL"),
        ]
        .join(RECORD_DELIMITER);

        let decoded = decode_session(&blob).unwrap();
        let mut queue = RowQueue::default();
        queue.restore(decoded.rows);

        assert_eq!(encode_session(queue.records_oldest_first()), blob);
    }

    #[test]
    fn test_encode_is_oldest_first() {
        let mut queue = RowQueue::default();
        queue.add("00000000000001");
        queue.add("00000000000002");

        let blob = encode_session(queue.records_oldest_first());
        let entries: Vec<&str> = blob.split(RECORD_DELIMITER).collect();
        assert_eq!(entries.len(), 2);
        assert!(entries[0].starts_with("00000000000001||"));
        assert_eq!(entries[1].split(FIELD_DELIMITER).count(), FIELD_COUNT);
    }

    #[test]
    fn test_encode_empty_table() {
        let queue = RowQueue::default();
        assert_eq!(encode_session(queue.records_oldest_first()), "");
    }
}
