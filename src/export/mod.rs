pub mod excel;
pub mod sheet_service;

use crate::cli::ExportFormat;
use crate::config::Config;
use crate::error::{InventoryError, Result};
use barcode_inventory_common::{sheet_name, to_csv, ItemRecord};
use std::path::{Path, PathBuf};

fn output_path_for_format(output: &Path, title: &str, extension: &str) -> PathBuf {
    if output.is_dir() || output.extension().is_none() {
        output.join(format!("{}.{}", title, extension))
    } else {
        output.to_path_buf()
    }
}

/// ファイル名に使えない文字を置換
fn file_title(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() || "-_. ".contains(c) { c } else { '_' })
        .collect()
}

/// 表示順の行をエクスポート
///
/// 行が無い場合は `InventoryError::NoData`
pub async fn export_records(
    records: &[&ItemRecord],
    format: &ExportFormat,
    output: Option<&Path>,
    config: &Config,
) -> Result<()> {
    if records.is_empty() {
        return Err(InventoryError::NoData);
    }

    let name = sheet_name(records.iter().copied());
    // 同じ範囲を何度も書き出すので日時を付ける
    let title = format!(
        "{}_{}",
        file_title(&name),
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    );
    let output_dir = output.unwrap_or_else(|| Path::new("."));

    match format {
        ExportFormat::Sheet => {
            let endpoint = config.get_export_url()?;
            let folder_id = config.folder_id.clone().unwrap_or_default();
            let upload = sheet_service::SheetUpload::from_records(records, &folder_id);
            println!("- スプレッドシートサービスへ送信中... ({})", upload.name);
            sheet_service::upload(&endpoint, &upload, config.timeout()).await?;
            println!("✔ 送信完了: {} ({}件)", upload.name, records.len());
        }
        ExportFormat::Excel => {
            let output_path = output_path_for_format(output_dir, &title, "xlsx");
            println!("- Excelを生成中...");
            excel::generate_excel(records, &output_path)?;
            println!("✔ Excel出力: {}", output_path.display());
        }
        ExportFormat::Csv => {
            let output_path = output_path_for_format(output_dir, &title, "csv");
            std::fs::write(&output_path, to_csv(records.iter().copied()))?;
            println!("✔ CSV出力: {}", output_path.display());
        }
    }

    Ok(())
}
