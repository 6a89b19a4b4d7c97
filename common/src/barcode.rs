//! バーコード検証
//!
//! 14桁の数字のみを有効とする（所蔵資料バーコードの運用ルール）。
//! 重複チェックは手動1件追加のみで使う参考情報で、キュー処理側では強制しない。

use crate::types::ItemRecord;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref BARCODE_PATTERN: Regex = Regex::new(r"^[0-9]{14}$").unwrap();
}

/// 14桁の数字か
pub fn is_valid_barcode(barcode: &str) -> bool {
    BARCODE_PATTERN.is_match(barcode)
}

/// 同じバーコードの行が既にあるか（sequence_idは見ない）
pub fn is_duplicate_barcode<'a, I>(records: I, barcode: &str) -> bool
where
    I: IntoIterator<Item = &'a ItemRecord>,
{
    records.into_iter().any(|r| r.barcode == barcode)
}

/// 入力中のバーコード判定結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarcodeCheck {
    Empty,
    InvalidFormat,
    Duplicate,
    Valid,
}

impl BarcodeCheck {
    /// 手動追加を許可するか
    pub fn can_add(&self) -> bool {
        matches!(self, BarcodeCheck::Valid)
    }

    pub fn message(&self) -> &'static str {
        match self {
            BarcodeCheck::Empty => "",
            BarcodeCheck::InvalidFormat => "Enter a 14 digit barcode",
            BarcodeCheck::Duplicate => "Duplicate barcode",
            BarcodeCheck::Valid => "Barcode appears to be valid",
        }
    }
}

/// 入力フィードバック用の判定
pub fn check_barcode<'a, I>(records: I, input: &str) -> BarcodeCheck
where
    I: IntoIterator<Item = &'a ItemRecord>,
{
    if input.is_empty() {
        BarcodeCheck::Empty
    } else if !is_valid_barcode(input) {
        BarcodeCheck::InvalidFormat
    } else if is_duplicate_barcode(records, input) {
        BarcodeCheck::Duplicate
    } else {
        BarcodeCheck::Valid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_barcode() {
        assert!(is_valid_barcode("12345678901234"));
        assert!(is_valid_barcode("00000000000001"));
    }

    #[test]
    fn test_invalid_barcode() {
        assert!(!is_valid_barcode("1234567890123"));
        assert!(!is_valid_barcode("1234567890123A"));
        assert!(!is_valid_barcode("123456789012345"));
        assert!(!is_valid_barcode(""));
        assert!(!is_valid_barcode(" 12345678901234"));
        assert!(!is_valid_barcode("12345678901234\n"));
        // 全角数字は不可
        assert!(!is_valid_barcode("１２３４５６７８９０１２３４"));
    }

    #[test]
    fn test_duplicate_ignores_sequence() {
        let records = vec![
            ItemRecord::new("12345678901234", 1),
            ItemRecord::new("22222222222222", 2),
        ];
        assert!(is_duplicate_barcode(&records, "12345678901234"));
        assert!(!is_duplicate_barcode(&records, "33333333333333"));
    }

    #[test]
    fn test_check_barcode_feedback() {
        let records = vec![ItemRecord::new("12345678901234", 1)];
        assert_eq!(check_barcode(&records, ""), BarcodeCheck::Empty);
        assert_eq!(check_barcode(&records, "123"), BarcodeCheck::InvalidFormat);
        assert_eq!(check_barcode(&records, "12345678901234"), BarcodeCheck::Duplicate);
        assert_eq!(check_barcode(&records, "99999999999999"), BarcodeCheck::Valid);
        assert!(check_barcode(&records, "99999999999999").can_add());
        assert!(!check_barcode(&records, "12345678901234").can_add());
        assert_eq!(BarcodeCheck::InvalidFormat.message(), "Enter a 14 digit barcode");
    }
}
