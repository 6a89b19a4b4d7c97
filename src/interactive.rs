//! 対話式スキャン
//!
//! 入力スレッド（dialoguer）がコマンドを送り、処理ループが
//! コマンドとルックアップ完了を1か所で順に処理する。
//!
//! 入力:
//! - バーコード: 1件追加（形式・重複チェックあり）
//! - `:bulk <file>` 一括追加 / `:rescan [#]` / `:del <#>` / `:status <STATUS> [msg]`
//! - `:list` / `:export [sheet|excel|csv]` / `:help` / `:q`
//! - `:s` デモ用バーコード（`scan --demo`）を1件ずつスキャン

use crate::bulk;
use crate::cli::ExportFormat;
use crate::config::Config;
use crate::error::{InventoryError, Result};
use crate::export;
use crate::processor::{Processor, Settled};
use crate::report;
use crate::store::SessionStore;
use barcode_inventory_common::{check_barcode, ItemRecord, ItemStatus};
use dialoguer::{Confirm, Input};
use std::collections::VecDeque;
use std::path::PathBuf;
use tokio::sync::{mpsc, oneshot};

const HELP: &str = "\
操作:
  <バーコード>             1件追加
  :bulk <ファイル>          一括追加（1行1件 / xlsxのA列）
  :rescan [番号]            再スキャン（省略時は最終スキャン行）
  :del <番号>               行を削除
  :status <STATUS> [説明]   最終スキャン行の判定を変更 (PULL/PASS/FAIL/META-TTL/META-VOL/META-CALL)
  :list                     一覧表示
  :export [sheet|excel|csv] エクスポート（確認後に表を消去）
  :s                        デモ用バーコードを1件スキャン（scan --demo）
  :help                     このヘルプ
  :q                        終了";

/// 入力スレッドからのコマンド
#[derive(Debug)]
pub enum Command {
    Add(String),
    BulkFile(PathBuf),
    Rescan(Option<u64>),
    Delete(u64),
    Status(ItemStatus, String),
    List,
    Help,
    Export {
        format: ExportFormat,
        /// エクスポートした件数（失敗時は0）
        done: oneshot::Sender<usize>,
    },
    Clear,
    Quit,
}

/// 入力行の解釈（Export以外）
#[derive(Debug, PartialEq, Eq)]
pub enum ParsedInput {
    Empty,
    Barcode(String),
    BulkFile(PathBuf),
    Rescan(Option<u64>),
    Delete(u64),
    Status(ItemStatus, String),
    List,
    Help,
    Export(ExportFormat),
    DemoScan,
    Quit,
}

pub fn parse_input(line: &str) -> std::result::Result<ParsedInput, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(ParsedInput::Empty);
    }
    let Some(command) = line.strip_prefix(':') else {
        return Ok(ParsedInput::Barcode(line.to_string()));
    };

    let mut parts = command.splitn(2, char::is_whitespace);
    let name = parts.next().unwrap_or("");
    let rest = parts.next().map(str::trim).unwrap_or("");

    match name {
        "bulk" if !rest.is_empty() => Ok(ParsedInput::BulkFile(PathBuf::from(rest))),
        "bulk" => Err("ファイルを指定してください".into()),
        "rescan" if rest.is_empty() => Ok(ParsedInput::Rescan(None)),
        "rescan" => parse_sequence(rest).map(|seq| ParsedInput::Rescan(Some(seq))),
        "del" | "delete" => parse_sequence(rest).map(ParsedInput::Delete),
        "status" => {
            let mut args = rest.splitn(2, char::is_whitespace);
            let status: ItemStatus = args.next().unwrap_or("").parse()?;
            let message = args.next().map(str::trim).unwrap_or("").to_string();
            Ok(ParsedInput::Status(status, message))
        }
        "list" | "ls" => Ok(ParsedInput::List),
        "help" | "h" | "?" => Ok(ParsedInput::Help),
        "export" if rest.is_empty() => Ok(ParsedInput::Export(ExportFormat::default())),
        "export" => rest.parse().map(ParsedInput::Export),
        "s" | "demo" => Ok(ParsedInput::DemoScan),
        "q" | "quit" | "done" => Ok(ParsedInput::Quit),
        other => Err(format!("不明なコマンド: :{}", other)),
    }
}

fn parse_sequence(text: &str) -> std::result::Result<u64, String> {
    text.trim_start_matches('#')
        .parse()
        .map_err(|_| format!("行番号が不正です: {}", text))
}

/// はい/いいえの確認
pub fn confirm(prompt: &str) -> Result<bool> {
    Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| InventoryError::Prompt(e.to_string()))
}

/// 保存済みセッションの復元を確認して適用
pub async fn offer_restore<S: SessionStore>(processor: &mut Processor<S>) -> Result<usize> {
    let Some(decoded) = processor.store().load()? else {
        return Ok(0);
    };
    if decoded.rows.is_empty() {
        return Ok(0);
    }

    let prompt = format!(
        "前回のセッションに{}件のバーコードがあります。読み込みますか？（いいえ: 空の表で開始）",
        decoded.rows.len()
    );
    let accepted = tokio::task::spawn_blocking(move || confirm(&prompt))
        .await
        .map_err(|e| InventoryError::Prompt(e.to_string()))??;
    if !accepted {
        return Ok(0);
    }
    Ok(processor.restore(decoded.rows))
}

/// 対話式スキャンを実行
///
/// `demo` は `:s` で1件ずつ手入力と同じ経路に流すバーコード
pub async fn run_scan<S: SessionStore>(
    mut processor: Processor<S>,
    config: Config,
    demo: Vec<String>,
) -> Result<()> {
    let restored = offer_restore(&mut processor).await?;
    if restored > 0 {
        println!("✔ {}件を復元しました", restored);
        report::print_current(processor.queue());
    }
    println!("{}\n", HELP);

    let demo: VecDeque<String> = demo
        .into_iter()
        .map(|b| b.trim().to_string())
        .filter(|b| !b.is_empty())
        .collect();
    if !demo.is_empty() {
        println!("デモ用に{}件のバーコードが指定されています。`:s` でスキャンを再現します\n", demo.len());
    }

    let (cmd_tx, mut cmd_rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || prompt_loop(cmd_tx, demo));

    let mut quitting = false;
    loop {
        tokio::select! {
            command = cmd_rx.recv(), if !quitting => {
                match command {
                    None | Some(Command::Quit) => {
                        quitting = true;
                        if !processor.queue().is_idle() {
                            println!("- 処理中の行を待っています...");
                        }
                    }
                    Some(command) => handle_command(&mut processor, &config, command).await,
                }
            }
            Some(event) = processor.next_event() => {
                let settled = processor.handle_event(event);
                print_settled(&processor, &settled);
            }
            else => break,
        }

        if quitting && processor.queue().is_idle() {
            break;
        }
    }

    println!("\n✅ 終了（{}件）", processor.queue().len());
    Ok(())
}

async fn handle_command<S: SessionStore>(
    processor: &mut Processor<S>,
    config: &Config,
    command: Command,
) {
    match command {
        Command::Add(barcode) => {
            let check = check_barcode(processor.queue().records(), &barcode);
            if !check.can_add() {
                println!("⚠ {}", check.message());
                return;
            }
            let (_, settled) = processor.add(&barcode, true);
            println!("Barcode {} added. Scan the next barcode.", barcode);
            print_settled(processor, &settled);
        }
        Command::BulkFile(path) => match bulk::read_barcode_file(&path) {
            Ok(barcodes) => {
                let (added, settled) = processor.add_bulk(barcodes.iter().map(String::as_str));
                println!("✔ {}件を追加しました", added.len());
                print_settled(processor, &settled);
            }
            Err(e) => println!("⚠ {}", e),
        },
        Command::Rescan(target) => {
            let target = target.or_else(|| processor.queue().current().map(|r| r.sequence_id));
            let Some(sequence_id) = target else {
                println!("⚠ 行がありません");
                return;
            };
            let (found, settled) = processor.rescan(sequence_id);
            if found {
                println!("- #{} を再スキャンします", sequence_id);
                print_settled(processor, &settled);
            } else {
                println!("⚠ 行が見つかりません: #{}", sequence_id);
            }
        }
        Command::Delete(sequence_id) => {
            let (removed, settled) = processor.delete(sequence_id);
            match removed {
                Some(record) => println!("✔ #{} {} を削除しました", sequence_id, record.barcode),
                None => println!("⚠ 行が見つかりません: #{}", sequence_id),
            }
            print_settled(processor, &settled);
        }
        Command::Status(status, message) => {
            if processor.override_current_status(status, &message).is_some() {
                report::print_current(processor.queue());
                return;
            }
            match processor.queue().current() {
                Some(record) => println!(
                    "⚠ #{} はルックアップ待ちです。確定後に変更してください",
                    record.sequence_id
                ),
                None => println!("⚠ 行がありません"),
            }
        }
        Command::List => report::print_table(processor.queue()),
        Command::Help => println!("{}", HELP),
        Command::Export { format, done } => {
            let records: Vec<&ItemRecord> = processor.queue().records().collect();
            let count = match export::export_records(&records, &format, None, config).await {
                Ok(()) => records.len(),
                Err(InventoryError::NoData) => {
                    println!("⚠ There is no data to export. Please scan some barcodes");
                    0
                }
                Err(e) => {
                    println!("⚠ エクスポート失敗: {}", e);
                    0
                }
            };
            let _ = done.send(count);
        }
        Command::Clear => {
            processor.clear();
            println!("✔ 表を消去しました");
        }
        Command::Quit => {}
    }
}

fn print_settled<S: SessionStore>(processor: &Processor<S>, settled: &[Settled]) {
    for notice in settled.iter().filter(|n| n.show_summary) {
        if let Some(record) = processor.queue().get(notice.sequence_id) {
            println!("  {}", report::summary_line(record));
        }
    }
}

/// 入力スレッド
fn prompt_loop(tx: mpsc::UnboundedSender<Command>, mut demo: VecDeque<String>) {
    loop {
        let prompt = if demo.is_empty() {
            "バーコード".to_string()
        } else {
            format!("バーコード (デモ残り{})", demo.len())
        };
        let line: String = match Input::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
        {
            Ok(line) => line,
            Err(_) => {
                let _ = tx.send(Command::Quit);
                return;
            }
        };

        let command = match parse_input(&line) {
            Ok(ParsedInput::Empty) => continue,
            Ok(ParsedInput::Barcode(barcode)) => Command::Add(barcode),
            Ok(ParsedInput::BulkFile(path)) => Command::BulkFile(path),
            Ok(ParsedInput::Rescan(seq)) => Command::Rescan(seq),
            Ok(ParsedInput::Delete(seq)) => Command::Delete(seq),
            Ok(ParsedInput::Status(status, message)) => Command::Status(status, message),
            Ok(ParsedInput::List) => Command::List,
            Ok(ParsedInput::Help) => Command::Help,
            Ok(ParsedInput::DemoScan) => match demo.pop_front() {
                Some(barcode) => {
                    println!("> {}", barcode);
                    Command::Add(barcode)
                }
                None => {
                    println!("⚠ デモ用バーコードがありません");
                    continue;
                }
            },
            Ok(ParsedInput::Quit) => {
                let _ = tx.send(Command::Quit);
                return;
            }
            Ok(ParsedInput::Export(format)) => {
                let (done_tx, done_rx) = oneshot::channel();
                if tx.send(Command::Export { format, done: done_tx }).is_err() {
                    return;
                }
                let exported = done_rx.blocking_recv().unwrap_or(0);
                if exported > 0 {
                    let prompt = format!(
                        "{}件のエクスポートを確認しましたか？ OKで表から削除します",
                        exported
                    );
                    if confirm(&prompt).unwrap_or(false) {
                        let _ = tx.send(Command::Clear);
                    }
                }
                continue;
            }
            Err(message) => {
                println!("⚠ {}", message);
                continue;
            }
        };

        if tx.send(command).is_err() {
            return;
        }
    }
}
