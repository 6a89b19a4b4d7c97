//! Excel生成
//!
//! 見出し行 + 表示順の行を1シートに書き出す。シート名は請求記号の範囲。

use crate::error::{InventoryError, Result};
use barcode_inventory_common::{sheet_name, table_rows, ItemRecord};
use rust_xlsxwriter::{Format, FormatBorder, Workbook};
use std::path::Path;

/// 列幅（文字数）
const COLUMN_WIDTHS: [f64; 13] = [
    16.0, 10.0, 18.0, 8.0, 40.0, 12.0, 12.0, 8.0, 10.0, 12.0, 10.0, 24.0, 20.0,
];

/// Excelのシート名に使えない文字
const INVALID_SHEET_CHARS: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];

pub fn generate_excel(records: &[&ItemRecord], output_path: &Path) -> Result<()> {
    let buffer = generate_excel_buffer(records)?;
    std::fs::write(output_path, buffer)?;
    Ok(())
}

/// Excelをバッファに生成
pub fn generate_excel_buffer(records: &[&ItemRecord]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    let name = excel_sheet_name(&sheet_name(records.iter().copied()));
    worksheet
        .set_name(&name)
        .map_err(|e| InventoryError::ExcelGeneration(format!("シート名設定エラー: {}", e)))?;

    let header_format = Format::new()
        .set_bold()
        .set_border(FormatBorder::Thin);

    for (col, width) in COLUMN_WIDTHS.iter().enumerate() {
        worksheet
            .set_column_width(col as u16, *width)
            .map_err(|e| InventoryError::ExcelGeneration(format!("列幅設定エラー: {}", e)))?;
    }

    for (row_idx, row) in table_rows(records.iter().copied()).iter().enumerate() {
        for (col, value) in row.iter().enumerate() {
            let result = if row_idx == 0 {
                worksheet.write_string_with_format(row_idx as u32, col as u16, *value, &header_format)
            } else {
                worksheet.write_string(row_idx as u32, col as u16, *value)
            };
            result.map_err(|e| InventoryError::ExcelGeneration(format!("書き込みエラー: {}", e)))?;
        }
    }

    worksheet.set_freeze_panes(1, 0)
        .map_err(|e| InventoryError::ExcelGeneration(format!("固定枠設定エラー: {}", e)))?;

    workbook
        .save_to_buffer()
        .map_err(|e| InventoryError::ExcelGeneration(format!("Excel保存エラー: {}", e)))
}

/// シート名の制約（31文字・禁止文字）に合わせる
pub fn excel_sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if INVALID_SHEET_CHARS.contains(&c) { '_' } else { c })
        .take(31)
        .collect();
    let trimmed = cleaned.trim_matches('\'');
    if trimmed.is_empty() {
        "Sheet1".to_string()
    } else {
        trimmed.to_string()
    }
}
