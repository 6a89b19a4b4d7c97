//! Barcode Inventory Common Library
//!
//! スキャン処理の中核（I/Oなし）:
//! - 行キュー（ルックアップは同時に1件）
//! - セッション保存形式のエンコード/デコード
//! - バーコード検証
//! - 出力用の表レイアウト

pub mod types;
pub mod barcode;
pub mod codec;
pub mod error;
pub mod lookup;
pub mod queue;
pub mod table;

pub use types::{ItemMetadata, ItemRecord, ItemStatus, LifecycleState};
pub use barcode::{check_barcode, is_duplicate_barcode, is_valid_barcode, BarcodeCheck};
pub use codec::{decode_session, encode_session, DecodedSession, RestoredRow};
pub use error::{Error, Result};
pub use lookup::LookupResponse;
pub use queue::{LookupOutcome, LookupRequest, NextStep, QueueOrder, RowQueue};
pub use table::{sheet_name, table_rows, to_csv, COLUMN_HEADERS};
