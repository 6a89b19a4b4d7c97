//! セッション自動保存
//!
//! 表の全行を1つの文字列として1か所（ファイル）に保存し、
//! 起動時に確認の上で復元する。形式は `barcode_inventory_common::codec`。

use crate::error::Result;
use barcode_inventory_common::{decode_session, encode_session, DecodedSession, RowQueue};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

/// 保存先スロット
pub trait SessionStore: Send {
    /// 保存内容（無ければNone）
    fn read(&self) -> Result<Option<String>>;
    fn write(&self, blob: &str) -> Result<()>;
    /// 保存内容を削除（存在しなければfalse）
    fn remove(&self) -> Result<bool>;

    /// 表全体を保存（確定・削除・全消去のたびに呼ぶ）
    fn save(&self, queue: &RowQueue) -> Result<()> {
        let blob = encode_session(queue.records_oldest_first());
        debug!(records = queue.len(), bytes = blob.len(), "autosave");
        self.write(&blob)
    }

    /// 復元対象の読み込み（空ならNone）
    fn load(&self) -> Result<Option<DecodedSession>> {
        let Some(blob) = self.read()? else {
            return Ok(None);
        };
        let decoded = decode_session(&blob);
        if let Some(session) = &decoded {
            if session.skipped > 0 {
                warn!(skipped = session.skipped, "破損した保存行をスキップしました");
            }
        }
        Ok(decoded)
    }
}

/// ファイル保存
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn read(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        Ok(Some(std::fs::read_to_string(&self.path)?))
    }

    fn write(&self, blob: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, blob)?;
        Ok(())
    }

    fn remove(&self) -> Result<bool> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

/// メモリ保存（テスト用）
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    slot: Mutex<Option<String>>,
}

impl MemorySessionStore {
    pub fn with_blob(blob: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(blob.into())),
        }
    }

    pub fn snapshot(&self) -> Option<String> {
        self.slot.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl SessionStore for MemorySessionStore {
    fn read(&self) -> Result<Option<String>> {
        Ok(self.snapshot())
    }

    fn write(&self, blob: &str) -> Result<()> {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = Some(blob.to_string());
        }
        Ok(())
    }

    fn remove(&self) -> Result<bool> {
        Ok(self
            .slot
            .lock()
            .map(|mut s| s.take().is_some())
            .unwrap_or(false))
    }
}

impl<S: SessionStore + Sync> SessionStore for std::sync::Arc<S> {
    fn read(&self) -> Result<Option<String>> {
        (**self).read()
    }

    fn write(&self, blob: &str) -> Result<()> {
        (**self).write(blob)
    }

    fn remove(&self) -> Result<bool> {
        (**self).remove()
    }
}
