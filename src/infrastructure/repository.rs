//! SQLite persistence for schedule entries.
//!
//! Two tables: `schedule` holds the parsed rows of the current timetable,
//! `meta` holds run bookkeeping such as the last update timestamp. Every
//! publish run snapshots the previous fingerprints, replaces the schedule
//! wholesale, then flags rows whose fingerprint is new.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Row, SqlitePool};
use tracing::{debug, info, warn};

use crate::domain::{EntryFingerprint, ScheduleEntry, StoredEntry};

const CREATE_SCHEDULE_SQL: &str = r#"
    CREATE TABLE IF NOT EXISTS schedule (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        group_name  TEXT    NOT NULL,
        subject     TEXT    NOT NULL,
        class_type  TEXT    DEFAULT '',
        class_mode  TEXT    DEFAULT '',
        instructor  TEXT    DEFAULT '',
        room        TEXT    DEFAULT '',
        day         TEXT    DEFAULT '',
        time_start  TEXT    DEFAULT '',
        time_end    TEXT    DEFAULT '',
        dates       TEXT    DEFAULT '[]',
        is_changed  INTEGER DEFAULT 0,
        created_at  TEXT    NOT NULL
    )
"#;

const CREATE_META_SQL: &str = r#"
    CREATE TABLE IF NOT EXISTS meta (
        key    TEXT PRIMARY KEY,
        value  TEXT NOT NULL
    )
"#;

pub struct ScheduleRepository {
    pool: SqlitePool,
}

impl ScheduleRepository {
    /// Open (creating if needed) the database behind `database_url`.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let db_path = database_url
            .trim_start_matches("sqlite://")
            .trim_start_matches("sqlite:");

        if let Some(parent) = Path::new(db_path).parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("Failed to create database directory for {db_path}"))?;
            }
        }
        // sqlx refuses to open a missing SQLite file by default
        if !Path::new(db_path).exists() {
            std::fs::File::create(db_path)
                .with_context(|| format!("Failed to create database file {db_path}"))?;
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .with_context(|| format!("Failed to connect to {database_url}"))?;

        Ok(Self { pool })
    }

    /// Create tables if they do not already exist.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(CREATE_SCHEDULE_SQL).execute(&self.pool).await?;
        sqlx::query(CREATE_META_SQL).execute(&self.pool).await?;
        info!("Database initialised.");
        Ok(())
    }

    /// Fingerprints of every current row, snapshotted before a refresh so
    /// changes can be flagged after the re-insert.
    pub async fn fetch_fingerprints(&self) -> Result<HashSet<EntryFingerprint>> {
        let rows = sqlx::query(
            "SELECT group_name, subject, day, time_start, time_end, class_mode, room FROM schedule",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(fingerprint_from_row).collect())
    }

    /// Delete all schedule rows and return the count removed.
    pub async fn clear_schedule(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM schedule").execute(&self.pool).await?;
        let removed = result.rows_affected();
        info!("Cleared {} stale schedule row(s).", removed);
        Ok(removed)
    }

    /// Bulk-insert `entries`, all stamped with the same creation time.
    pub async fn insert_entries(&self, entries: &[ScheduleEntry]) -> Result<u64> {
        if entries.is_empty() {
            warn!("insert_entries called with empty list - nothing written.");
            return Ok(0);
        }

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;
        for entry in entries {
            let dates_json =
                serde_json::to_string(&entry.dates).context("Failed to encode dates")?;
            sqlx::query(
                r#"
                INSERT INTO schedule
                    (group_name, subject, class_type, class_mode, instructor, room,
                     day, time_start, time_end, dates, created_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&entry.group_name)
            .bind(&entry.subject)
            .bind(&entry.class_type)
            .bind(&entry.class_mode)
            .bind(&entry.instructor)
            .bind(&entry.room)
            .bind(&entry.day)
            .bind(&entry.time_start)
            .bind(&entry.time_end)
            .bind(dates_json)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        info!("Inserted {} schedule row(s).", entries.len());
        Ok(entries.len() as u64)
    }

    /// Flag rows whose fingerprint was absent from `previous`.
    pub async fn mark_changed_entries(
        &self,
        previous: &HashSet<EntryFingerprint>,
    ) -> Result<u64> {
        let rows = sqlx::query(
            "SELECT id, group_name, subject, day, time_start, time_end, class_mode, room \
             FROM schedule",
        )
        .fetch_all(&self.pool)
        .await?;

        let changed_ids: Vec<i64> = rows
            .iter()
            .filter(|row| !previous.contains(&fingerprint_from_row(row)))
            .map(|row| row.get("id"))
            .collect();

        if !changed_ids.is_empty() {
            let mut tx = self.pool.begin().await?;
            for id in &changed_ids {
                sqlx::query("UPDATE schedule SET is_changed = 1 WHERE id = ?")
                    .bind(id)
                    .execute(&mut *tx)
                    .await?;
            }
            tx.commit().await?;
            info!("{} entr(ies) marked as changed.", changed_ids.len());
        }

        Ok(changed_ids.len() as u64)
    }

    /// All schedule rows ordered for rendering.
    pub async fn fetch_all(&self) -> Result<Vec<StoredEntry>> {
        let rows = sqlx::query("SELECT * FROM schedule ORDER BY day, time_start, group_name")
            .fetch_all(&self.pool)
            .await?;

        let entries: Vec<StoredEntry> = rows
            .iter()
            .map(|row| {
                let dates_json: String = row.get("dates");
                StoredEntry {
                    id: row.get("id"),
                    group_name: row.get("group_name"),
                    subject: row.get("subject"),
                    class_type: row.get("class_type"),
                    class_mode: row.get("class_mode"),
                    instructor: row.get("instructor"),
                    room: row.get("room"),
                    day: row.get("day"),
                    time_start: row.get("time_start"),
                    time_end: row.get("time_end"),
                    dates: serde_json::from_str(&dates_json).unwrap_or_default(),
                    is_changed: row.get("is_changed"),
                    created_at: row.get("created_at"),
                }
            })
            .collect();

        debug!("Fetched {} row(s) from schedule.", entries.len());
        Ok(entries)
    }

    /// Upsert a key/value pair in the `meta` table.
    pub async fn set_meta(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO meta (key, value) VALUES (?, ?) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Value for `key` from `meta`, or `None` when absent.
    pub async fn get_meta(&self, key: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT value FROM meta WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.get("value")))
    }
}

fn fingerprint_from_row(row: &sqlx::sqlite::SqliteRow) -> EntryFingerprint {
    EntryFingerprint {
        group_name: row.get("group_name"),
        subject: row.get("subject"),
        day: row.get("day"),
        time_start: row.get("time_start"),
        time_end: row.get("time_end"),
        class_mode: row.get("class_mode"),
        room: row.get("room"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn temp_repository() -> (tempfile::TempDir, ScheduleRepository) {
        let dir = tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("test.db").display());
        let repo = ScheduleRepository::connect(&url).await.unwrap();
        repo.migrate().await.unwrap();
        (dir, repo)
    }

    fn entry(group: &str, subject: &str, day: &str, start: &str) -> ScheduleEntry {
        ScheduleEntry {
            group_name: group.to_string(),
            subject: subject.to_string(),
            class_type: "Ćwiczenia".to_string(),
            class_mode: "w kontakcie".to_string(),
            instructor: "Kowalski, Jan".to_string(),
            room: "512".to_string(),
            day: day.to_string(),
            time_start: start.to_string(),
            time_end: "09:30".to_string(),
            dates: vec!["4.03".to_string(), "11.03".to_string()],
        }
    }

    #[tokio::test]
    async fn insert_and_fetch_round_trip() {
        let (_dir, repo) = temp_repository().await;

        let entries = vec![entry("Zarządzanie II gr1", "Matematyka", "Poniedziałek", "08:00")];
        assert_eq!(repo.insert_entries(&entries).await.unwrap(), 1);

        let stored = repo.fetch_all().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].subject, "Matematyka");
        assert_eq!(stored[0].dates, vec!["4.03", "11.03"]);
        assert!(!stored[0].is_changed);
    }

    #[tokio::test]
    async fn fetch_all_orders_by_day_start_and_group() {
        let (_dir, repo) = temp_repository().await;

        let entries = vec![
            entry("Zarządzanie II gr2", "B", "Wtorek", "09:45"),
            entry("Zarządzanie II gr1", "A", "Poniedziałek", "09:45"),
            entry("Zarządzanie II gr1", "C", "Poniedziałek", "08:00"),
        ];
        repo.insert_entries(&entries).await.unwrap();

        let stored = repo.fetch_all().await.unwrap();
        let order: Vec<&str> = stored.iter().map(|e| e.subject.as_str()).collect();
        assert_eq!(order, vec!["C", "A", "B"]);
    }

    #[tokio::test]
    async fn empty_insert_writes_nothing() {
        let (_dir, repo) = temp_repository().await;
        assert_eq!(repo.insert_entries(&[]).await.unwrap(), 0);
        assert!(repo.fetch_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn clear_reports_the_removed_count() {
        let (_dir, repo) = temp_repository().await;
        repo.insert_entries(&[
            entry("Zarządzanie II gr1", "A", "Poniedziałek", "08:00"),
            entry("Zarządzanie II gr1", "B", "Wtorek", "08:00"),
        ])
        .await
        .unwrap();

        assert_eq!(repo.clear_schedule().await.unwrap(), 2);
        assert!(repo.fetch_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn refresh_marks_only_new_fingerprints() {
        let (_dir, repo) = temp_repository().await;

        repo.insert_entries(&[entry("Zarządzanie II gr1", "Matematyka", "Poniedziałek", "08:00")])
            .await
            .unwrap();

        let previous = repo.fetch_fingerprints().await.unwrap();
        repo.clear_schedule().await.unwrap();

        // Same class again plus one the previous run never saw
        let mut moved = entry("Zarządzanie II gr1", "Matematyka", "Poniedziałek", "08:00");
        moved.instructor = "Nowak, Anna".to_string();
        let fresh = entry("Zarządzanie II gr1", "Statystyka", "Wtorek", "09:45");
        repo.insert_entries(&[moved, fresh]).await.unwrap();

        assert_eq!(repo.mark_changed_entries(&previous).await.unwrap(), 1);

        let stored = repo.fetch_all().await.unwrap();
        let changed: Vec<&str> = stored
            .iter()
            .filter(|e| e.is_changed)
            .map(|e| e.subject.as_str())
            .collect();
        // Instructor swaps do not alter the fingerprint
        assert_eq!(changed, vec!["Statystyka"]);
    }

    #[tokio::test]
    async fn meta_upsert_overwrites_previous_value() {
        let (_dir, repo) = temp_repository().await;

        assert_eq!(repo.get_meta("last_update").await.unwrap(), None);
        repo.set_meta("last_update", "2026-03-01T10:00:00Z").await.unwrap();
        repo.set_meta("last_update", "2026-03-08T10:00:00Z").await.unwrap();
        assert_eq!(
            repo.get_meta("last_update").await.unwrap().as_deref(),
            Some("2026-03-08T10:00:00Z")
        );
    }
}
