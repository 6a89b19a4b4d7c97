//! 出力用の表レイアウト
//!
//! スプレッドシート出力（Webサービス・xlsx・CSV）で共通の列定義と
//! シート名の決め方。

use crate::codec::{record_fields, FIELD_COUNT};
use crate::types::ItemRecord;

/// 列見出し（保存形式と同じ順）
pub const COLUMN_HEADERS: [&str; FIELD_COUNT] = [
    "Barcode",
    "Location",
    "Call Number",
    "Volume",
    "Title",
    "Status Code",
    "Due Date",
    "Icode2",
    "Suppressed",
    "Record Num",
    "Status",
    "Status Msg",
    "Timestamp",
];

const MISSING_CALL_NUMBER: &str = "NA";

/// シート名: "<最後の請求記号>--<最初の請求記号>"
///
/// 表示順（新しい順）で空でない請求記号の最初と最後を使う。
/// 無ければそれぞれ "NA"。
pub fn sheet_name<'a, I>(records_display_order: I) -> String
where
    I: IntoIterator<Item = &'a ItemRecord>,
{
    let mut call_numbers = records_display_order
        .into_iter()
        .map(|r| r.metadata.call_number.as_str())
        .filter(|c| !c.is_empty());

    let first = call_numbers.next();
    let last = call_numbers.last().or(first);

    format!(
        "{}--{}",
        last.unwrap_or(MISSING_CALL_NUMBER),
        first.unwrap_or(MISSING_CALL_NUMBER)
    )
}

/// 見出し + 表示順の行
pub fn table_rows<'a, I>(records_display_order: I) -> Vec<[&'a str; FIELD_COUNT]>
where
    I: IntoIterator<Item = &'a ItemRecord>,
{
    std::iter::once(COLUMN_HEADERS)
        .chain(records_display_order.into_iter().map(record_fields))
        .collect()
}

/// CSVテキスト（RFC 4180 準拠のクォート、改行はCRLF）
pub fn to_csv<'a, I>(records_display_order: I) -> String
where
    I: IntoIterator<Item = &'a ItemRecord>,
{
    let mut out = String::new();
    for row in table_rows(records_display_order) {
        let line: Vec<String> = row.iter().map(|v| csv_escape(v)).collect();
        out.push_str(&line.join(","));
        out.push_str("\r\n");
    }
    out
}

fn csv_escape(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(barcode: &str, call_number: &str) -> ItemRecord {
        let mut r = ItemRecord::new(barcode, 1);
        r.metadata.call_number = call_number.to_string();
        r
    }

    #[test]
    fn test_sheet_name_first_and_last() {
        // 表示順: A100（新しい）→ B200（古い）
        let records = vec![record("2", "A100"), record("1", "B200")];
        assert_eq!(sheet_name(&records), "B200--A100");
    }

    #[test]
    fn test_sheet_name_skips_empty_call_numbers() {
        let records = vec![
            record("4", ""),
            record("3", "C300"),
            record("2", ""),
            record("1", "A100"),
            record("0", ""),
        ];
        assert_eq!(sheet_name(&records), "A100--C300");
    }

    #[test]
    fn test_sheet_name_single_call_number() {
        let records = vec![record("1", "QA1"), record("2", "")];
        assert_eq!(sheet_name(&records), "QA1--QA1");
    }

    #[test]
    fn test_sheet_name_without_call_numbers() {
        let records = vec![record("1", ""), record("2", "")];
        assert_eq!(sheet_name(&records), "NA--NA");
        assert_eq!(sheet_name(&Vec::<ItemRecord>::new()), "NA--NA");
    }

    #[test]
    fn test_table_rows_has_header() {
        let records = vec![record("00000000000001", "QA1")];
        let rows = table_rows(&records);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][0], "Barcode");
        assert_eq!(rows[1][0], "00000000000001");
        assert_eq!(rows[1][2], "QA1");
    }

    #[test]
    fn test_csv_quoting() {
        let mut r = record("00000000000001", "QA1, .B2");
        r.metadata.title = "The \"Best\" Book".to_string();
        let csv = to_csv(&vec![r]);
        let lines: Vec<&str> = csv.split("\r\n").collect();
        assert!(lines[0].starts_with("Barcode,Location,Call Number"));
        assert!(lines[1].contains("\"QA1, .B2\""));
        assert!(lines[1].contains("\"The \"\"Best\"\" Book\""));
    }
}
