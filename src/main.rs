use anyhow::Context;
use barcode_inventory::{bulk, cli, config, export, interactive, logging, lookup, processor, report, store};
use barcode_inventory_common::{check_barcode, ItemRecord, RowQueue};
use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use indicatif::{ProgressBar, ProgressStyle};
use lookup::{HttpLookupClient, LookupService};
use processor::Processor;
use std::sync::Arc;
use store::{FileSessionStore, SessionStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let mut config = Config::load().context("設定ファイルの読み込みに失敗しました")?;
    if let Some(path) = cli.session {
        config.session_path = Some(path);
    }
    let session_file = config.session_file()?;
    let store = FileSessionStore::new(&session_file);

    match cli.command {
        Commands::Scan { demo } => {
            println!("📚 barcode-inventory - スキャン\n");
            let lookup = lookup_client(&config)?;
            let processor = Processor::new(RowQueue::new(config.queue_order), lookup, store);
            interactive::run_scan(processor, config, demo).await?;
        }

        Commands::Add { barcodes, file, resume, fresh } => {
            println!("📚 barcode-inventory - 一括追加\n");

            let mut lines = barcodes;
            if let Some(path) = &file {
                let from_file = bulk::read_barcode_file(path)
                    .with_context(|| format!("読み込み失敗: {}", path.display()))?;
                lines.extend(from_file);
            }

            let lookup = lookup_client(&config)?;
            let mut processor = Processor::new(RowQueue::new(config.queue_order), lookup, store);

            // 1. 保存済みセッション
            if resume {
                if let Some(decoded) = processor.store().load()? {
                    let count = processor.restore(decoded.rows);
                    println!("✔ 前回のセッションから{}件を復元", count);
                }
            } else if !fresh {
                let restored = interactive::offer_restore(&mut processor).await?;
                if restored > 0 {
                    println!("✔ 前回のセッションから{}件を復元", restored);
                }
            }

            // 2. 追加と処理
            // 形式不正の行は追加時点で確定済み
            let (added, settled_now) = processor.add_bulk(lines.iter().map(String::as_str));
            println!("[1/2] {}件を処理中...", added.len());
            let pb = ProgressBar::new(added.len() as u64);
            pb.set_style(
                ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            pb.inc(settled_now.len() as u64);
            processor
                .run_until_idle(|record, _| {
                    pb.inc(1);
                    pb.set_message(format!("{} {}", record.barcode, record.status_text()));
                })
                .await;
            pb.finish_and_clear();
            println!("✔ 処理完了（ルックアップ {}回）\n", processor.lookups_issued());

            // 3. 結果
            println!("[2/2] 結果");
            report::print_table(processor.queue());
            println!("\n✔ セッション保存: {}", session_file.display());
        }

        Commands::Export { format, output, clear } => {
            println!("📄 barcode-inventory - エクスポート\n");

            let mut queue = RowQueue::new(config.queue_order);
            if let Some(decoded) = store.load()? {
                queue.restore(decoded.rows);
            }
            let records: Vec<&ItemRecord> = queue.records().collect();
            if records.is_empty() {
                println!("⚠ There is no data to export. Please scan some barcodes");
                return Ok(());
            }

            export::export_records(&records, &format, output.as_deref(), &config).await?;

            if clear {
                let prompt = format!(
                    "{}件のエクスポートを確認しましたか？ OKで保存済みセッションを削除します",
                    records.len()
                );
                if interactive::confirm(&prompt)? {
                    queue.clear();
                    store.save(&queue)?;
                    println!("✔ セッションを消去しました");
                }
            }

            println!("\n✅ エクスポート完了");
        }

        Commands::Session { show, clear } => {
            if show || !clear {
                match store.load()? {
                    Some(decoded) => {
                        println!("セッション情報:");
                        println!("  パス: {}", session_file.display());
                        println!("  件数: {}", decoded.rows.len());
                        if decoded.skipped > 0 {
                            println!("  破損行: {}（復元時にスキップ）", decoded.skipped);
                        }
                        if show {
                            let mut queue = RowQueue::new(config.queue_order);
                            queue.restore(decoded.rows);
                            report::print_table(&queue);
                        }
                    }
                    None => println!("保存済みセッションはありません: {}", session_file.display()),
                }
            }

            if clear {
                match store.remove() {
                    Ok(true) => println!("✔ セッションを削除しました: {}", session_file.display()),
                    Ok(false) => println!("セッションファイルが存在しません"),
                    Err(e) => println!("セッション削除エラー: {}", e),
                }
            }
        }

        Commands::Validate { barcode } => {
            let check = check_barcode(std::iter::empty(), &barcode);
            if check.can_add() {
                println!("✔ {}", check.message());
            } else if barcode.is_empty() {
                println!("⚠ Enter a 14 digit barcode");
            } else {
                println!("⚠ {}", check.message());
            }
        }

        Commands::Config { set_lookup_url, set_export_url, set_folder_id, set_queue_order, show } => {
            let mut changed = false;

            if let Some(url) = set_lookup_url {
                config.lookup_url = Some(url);
                changed = true;
                println!("✔ ルックアップURLを設定しました");
            }
            if let Some(url) = set_export_url {
                config.export_url = Some(url);
                changed = true;
                println!("✔ エクスポートURLを設定しました");
            }
            if let Some(folder) = set_folder_id {
                config.folder_id = Some(folder);
                changed = true;
                println!("✔ フォルダIDを設定しました");
            }
            if let Some(order) = set_queue_order {
                config.queue_order = order;
                changed = true;
                println!("✔ 処理順を設定しました: {}", order);
            }
            if changed {
                // --session は保存しない
                let mut saved = Config::load()?;
                saved.lookup_url = config.lookup_url.clone();
                saved.export_url = config.export_url.clone();
                saved.folder_id = config.folder_id.clone();
                saved.queue_order = config.queue_order;
                saved.save()?;
            }

            if show || !changed {
                println!("設定:");
                println!("  ルックアップURL: {}", config.lookup_url.as_deref().unwrap_or("未設定"));
                println!("  エクスポートURL: {}", config.export_url.as_deref().unwrap_or("未設定"));
                println!("  フォルダID: {}", config.folder_id.as_deref().unwrap_or("未設定"));
                println!("  タイムアウト: {}秒", config.timeout_seconds);
                println!("  処理順: {}", config.queue_order);
                println!("  セッション: {}", session_file.display());
            }
        }
    }

    Ok(())
}

fn lookup_client(config: &Config) -> anyhow::Result<Arc<dyn LookupService>> {
    let url = config.get_lookup_url()?;
    let client = HttpLookupClient::new(url, config.timeout())
        .context("HTTPクライアントの生成に失敗しました")?;
    Ok(Arc::new(client))
}
