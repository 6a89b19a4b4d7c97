//! 一括追加の入力読み込み
//!
//! - テキスト: 1行1バーコード（空行は無視）
//! - Excel/ODS: 先頭シートのA列

use crate::error::{InventoryError, Result};
use calamine::{open_workbook_auto, Data, Reader};
use std::path::Path;

const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "ods"];

/// ファイルからバーコード一覧を読む
pub fn read_barcode_file(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        return Err(InventoryError::FileNotFound(path.display().to_string()));
    }

    if is_spreadsheet(path) {
        read_spreadsheet(path)
    } else {
        let content = std::fs::read_to_string(path)?;
        Ok(split_lines(&content))
    }
}

/// 貼り付けテキストを行に分割（前後の空白を除去、空行は捨てる）
pub fn split_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn is_spreadsheet(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| SPREADSHEET_EXTENSIONS.contains(&ext.as_str()))
}

fn read_spreadsheet(path: &Path) -> Result<Vec<String>> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| InventoryError::ExcelRead(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| InventoryError::ExcelRead(format!("シートがありません: {}", path.display())))?
        .map_err(|e| InventoryError::ExcelRead(e.to_string()))?;

    Ok(range
        .rows()
        .filter_map(|row| row.first())
        .filter_map(cell_text)
        .collect())
}

fn cell_text(cell: &Data) -> Option<String> {
    let text = match cell {
        Data::Empty => return None,
        Data::String(s) => s.trim().to_string(),
        // 数値セルのバーコードは整数として読む
        Data::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        Data::Int(i) => i.to_string(),
        other => other.to_string(),
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}
