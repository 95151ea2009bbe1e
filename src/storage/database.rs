//! SQLite database for extracted menu entries

use rusqlite::{params, Connection};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

use crate::analysis::MenuEntry;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS menu_or_services (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    category TEXT NOT NULL,
    item_or_service TEXT NOT NULL,
    price TEXT NOT NULL,
    description TEXT NOT NULL,
    vendor_id INTEGER NOT NULL,
    image_path TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_menu_or_services_vendor ON menu_or_services(vendor_id);
";

/// Database connection wrapper
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create database at path, creating the schema if needed
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let db = Self {
            conn: Connection::open(path)?,
        };
        db.init_schema()?;
        info!("Opened database at {}", path.display());
        Ok(db)
    }

    /// Open a private in-memory database
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let db = Self {
            conn: Connection::open_in_memory()?,
        };
        db.init_schema()?;
        Ok(db)
    }

    /// Initialize database schema
    pub fn init_schema(&self) -> Result<(), StorageError> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Insert entries for a vendor in one transaction; nothing is written on failure
    pub fn insert_entries(&mut self, entries: &[MenuEntry], vendor_id: i64) -> Result<usize, StorageError> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO menu_or_services
                    (category, item_or_service, price, description, vendor_id, image_path)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for entry in entries {
                stmt.execute(params![
                    entry.category,
                    entry.item,
                    entry.price,
                    entry.description,
                    vendor_id,
                    entry.image,
                ])?;
            }
        }
        tx.commit()?;

        debug!("Inserted {} entries for vendor {}", entries.len(), vendor_id);
        Ok(entries.len())
    }

    /// Read back a vendor's entries in insertion order
    pub fn entries_for_vendor(&self, vendor_id: i64) -> Result<Vec<MenuEntry>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT image_path, category, item_or_service, price, description
             FROM menu_or_services WHERE vendor_id = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![vendor_id], |row| {
            Ok(MenuEntry {
                image: row.get(0)?,
                category: row.get(1)?,
                item: row.get(2)?,
                price: row.get(3)?,
                description: row.get(4)?,
            })
        })?;

        let mut entries = Vec::new();
        for entry in rows {
            entries.push(entry?);
        }
        Ok(entries)
    }
}
