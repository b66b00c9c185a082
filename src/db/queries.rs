use crate::db::Database;
use crate::error::Result;
use crate::models::{DataMode, Location};
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};
use tracing::warn;

pub const MAX_RECENT_LOCATIONS: usize = 5;

const DATA_MODE_KEY: &str = "data_mode";

#[derive(Debug, Clone, PartialEq)]
pub struct RecentLocation {
    pub location: Location,
    pub used_at: DateTime<Utc>,
}

// Recent Location Queries

impl Database {
    /// Record `location` as used at `used_at`, keeping only the newest few.
    pub fn remember_location(&self, location: &Location, used_at: DateTime<Utc>) -> Result<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            tx.execute(
                r#"
                INSERT INTO recent_locations (name, lat, lon, used_at)
                VALUES (?1, ?2, ?3, ?4)
                ON CONFLICT(name) DO UPDATE SET
                    lat = excluded.lat, lon = excluded.lon, used_at = excluded.used_at
                "#,
                params![location.name, location.lat, location.lon, used_at.to_rfc3339()],
            )?;
            tx.execute(
                r#"
                DELETE FROM recent_locations WHERE id NOT IN (
                    SELECT id FROM recent_locations ORDER BY used_at DESC, id DESC LIMIT ?1
                )
                "#,
                [MAX_RECENT_LOCATIONS as i64],
            )?;
            tx.commit()?;
            Ok(())
        })
    }

    /// Most recently used first.
    pub fn recent_locations(&self, limit: usize) -> Result<Vec<RecentLocation>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT name, lat, lon, used_at FROM recent_locations ORDER BY used_at DESC, id DESC LIMIT ?1",
            )?;
            let rows = stmt
                .query_map([limit as i64], row_to_recent_location)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
    }

    pub fn last_location(&self) -> Result<Option<Location>> {
        Ok(self
            .recent_locations(1)?
            .into_iter()
            .next()
            .map(|recent| recent.location))
    }

    pub fn forget_locations(&self) -> Result<usize> {
        self.with_conn(|conn| Ok(conn.execute("DELETE FROM recent_locations", [])?))
    }
}

fn row_to_recent_location(row: &Row) -> rusqlite::Result<RecentLocation> {
    let used_at_str: String = row.get("used_at")?;
    let used_at = DateTime::parse_from_rfc3339(&used_at_str)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| {
            warn!(used_at = %used_at_str, "Unparseable used_at in database");
            DateTime::<Utc>::UNIX_EPOCH
        });

    Ok(RecentLocation {
        location: Location::new(
            row.get::<_, String>("name")?,
            row.get("lat")?,
            row.get("lon")?,
        ),
        used_at,
    })
}

// Settings Queries

impl Database {
    pub fn get_setting(&self, key: &str) -> Result<Option<String>> {
        self.with_conn(|conn| {
            conn.query_row("SELECT value FROM settings WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()
            .map_err(Into::into)
        })
    }

    pub fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
                params![key, value],
            )?;
            Ok(())
        })
    }

    pub fn saved_data_mode(&self) -> Result<Option<DataMode>> {
        Ok(self.get_setting(DATA_MODE_KEY)?.and_then(|value| {
            DataMode::from_key(&value).or_else(|| {
                warn!(data_mode = %value, "Unknown data_mode in database, ignoring");
                None
            })
        }))
    }

    pub fn save_data_mode(&self, mode: DataMode) -> Result<()> {
        self.set_setting(DATA_MODE_KEY, mode.key())
    }
}
