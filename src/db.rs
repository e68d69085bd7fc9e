use std::collections::BTreeMap;
use std::path::Path;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::Result;
use crate::models::StudyData;

pub const STUDY_DATA_KEY: &str = "philosophyStudyData";
pub const THEME_SEEN_KEY: &str = "themeFichesSeen";

/// Local key-value storage holding the persisted study state.
pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    pub fn init(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv_store (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );
            "#,
        )?;
        Ok(())
    }

    // Raw key-value operations
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn remove(&self, key: &str) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM kv_store WHERE key = ?1", params![key])?;
        Ok(rows > 0)
    }

    // Study data
    /// Absent or corrupt state yields the defaults; only storage failures error.
    pub fn load(&self) -> Result<StudyData> {
        let Some(raw) = self.get(STUDY_DATA_KEY)? else {
            log::debug!("No saved study data, starting from defaults");
            return Ok(StudyData::default());
        };

        match serde_json::from_str::<StudyData>(&raw) {
            Ok(data) => {
                log::debug!("Loaded study data ({} flashcards)", data.flashcards.len());
                Ok(data.with_default_sections())
            }
            Err(e) => {
                log::warn!("Error parsing saved study data, using defaults: {}", e);
                Ok(StudyData::default())
            }
        }
    }

    pub fn save(&self, data: &StudyData) -> Result<()> {
        let json = serde_json::to_string(data)?;
        self.set(STUDY_DATA_KEY, &json)?;
        log::debug!("Saved study data ({} bytes)", json.len());
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        self.remove(STUDY_DATA_KEY)?;
        self.remove(THEME_SEEN_KEY)?;
        Ok(())
    }

    // Theme progress, stored as a { ficheId: bool } map
    pub fn load_theme_seen(&self) -> Result<Vec<String>> {
        let Some(raw) = self.get(THEME_SEEN_KEY)? else {
            return Ok(Vec::new());
        };

        match serde_json::from_str::<BTreeMap<String, bool>>(&raw) {
            Ok(map) => Ok(map
                .into_iter()
                .filter_map(|(id, seen)| seen.then_some(id))
                .collect()),
            Err(e) => {
                log::warn!("Error parsing saved theme progress, ignoring it: {}", e);
                Ok(Vec::new())
            }
        }
    }

    pub fn save_theme_seen(&self, seen: &[String]) -> Result<()> {
        let map: BTreeMap<&str, bool> = seen.iter().map(|id| (id.as_str(), true)).collect();
        self.set(THEME_SEEN_KEY, &serde_json::to_string(&map)?)
    }

    /// Write both keys in one transaction; nothing is stored if either fails.
    pub fn save_with_themes(&self, data: &StudyData, theme_seen: &[String]) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        self.save(data)?;
        self.save_theme_seen(theme_seen)?;
        tx.commit()?;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn set_read_only(&self, read_only: bool) -> Result<()> {
        self.conn.pragma_update(None, "query_only", read_only)?;
        Ok(())
    }
}
