//! SQLite-backed catalog implementation.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use super::{
    CatalogError, Creator, CreatorStore, NewCreator, NewPack, NewSample, Pack, PackStore,
    PackUpdate, Sample,
};

/// SQLite-backed creator and pack store.
pub struct SqliteCatalog {
    conn: Mutex<Connection>,
}

impl SqliteCatalog {
    /// Create a new SQLite catalog, creating the database file and tables if needed.
    pub fn new(path: &Path) -> Result<Self, CatalogError> {
        let conn = Connection::open(path).map_err(|e| CatalogError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite catalog (useful for testing).
    pub fn in_memory() -> Result<Self, CatalogError> {
        let conn =
            Connection::open_in_memory().map_err(|e| CatalogError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), CatalogError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS creators (
                id TEXT PRIMARY KEY,
                display_name TEXT NOT NULL,
                username TEXT NOT NULL UNIQUE,
                connected_account_id TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS packs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                creator_id TEXT NOT NULL REFERENCES creators(id),
                slug TEXT NOT NULL,
                title TEXT NOT NULL,
                description TEXT,
                price_cents INTEGER NOT NULL,
                cover_url TEXT NOT NULL,
                archive_url TEXT NOT NULL,
                archive_key TEXT NOT NULL,
                product_id TEXT NOT NULL,
                payment_link TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                UNIQUE(creator_id, slug)
            );

            CREATE INDEX IF NOT EXISTS idx_packs_creator_id ON packs(creator_id);

            CREATE TABLE IF NOT EXISTS samples (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                pack_id INTEGER NOT NULL REFERENCES packs(id),
                url TEXT NOT NULL,
                title TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_samples_pack_id ON samples(pack_id);
            "#,
        )
        .map_err(|e| CatalogError::Database(e.to_string()))?;

        Ok(())
    }

    fn parse_timestamp(raw: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now())
    }

    fn row_to_creator(row: &rusqlite::Row) -> rusqlite::Result<Creator> {
        let created_at_str: String = row.get(4)?;
        let updated_at_str: String = row.get(5)?;

        Ok(Creator {
            id: row.get(0)?,
            display_name: row.get(1)?,
            username: row.get(2)?,
            connected_account_id: row.get(3)?,
            created_at: Self::parse_timestamp(&created_at_str),
            updated_at: Self::parse_timestamp(&updated_at_str),
        })
    }

    fn row_to_pack(row: &rusqlite::Row) -> rusqlite::Result<Pack> {
        let created_at_str: String = row.get(11)?;
        let updated_at_str: String = row.get(12)?;

        Ok(Pack {
            id: row.get(0)?,
            creator_id: row.get(1)?,
            slug: row.get(2)?,
            title: row.get(3)?,
            description: row.get(4)?,
            price_cents: row.get(5)?,
            cover_url: row.get(6)?,
            archive_url: row.get(7)?,
            archive_key: row.get(8)?,
            product_id: row.get(9)?,
            payment_link: row.get(10)?,
            created_at: Self::parse_timestamp(&created_at_str),
            updated_at: Self::parse_timestamp(&updated_at_str),
        })
    }

    fn is_unique_violation(e: &rusqlite::Error) -> bool {
        matches!(
            e,
            rusqlite::Error::SqliteFailure(err, _)
                if err.code == rusqlite::ErrorCode::ConstraintViolation
        )
    }
}

const PACK_COLUMNS: &str = "id, creator_id, slug, title, description, price_cents, cover_url, \
     archive_url, archive_key, product_id, payment_link, created_at, updated_at";

impl CreatorStore for SqliteCatalog {
    fn create_creator(&self, request: NewCreator) -> Result<Creator, CatalogError> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO creators (id, display_name, username, connected_account_id, created_at, updated_at) VALUES (?, ?, ?, NULL, ?, ?)",
            params![
                request.id,
                request.display_name,
                request.username,
                now.to_rfc3339(),
                now.to_rfc3339(),
            ],
        )
        .map_err(|e| {
            if Self::is_unique_violation(&e) {
                CatalogError::DuplicateCreator(request.id.clone())
            } else {
                CatalogError::Database(e.to_string())
            }
        })?;

        Ok(Creator {
            id: request.id,
            display_name: request.display_name,
            username: request.username,
            connected_account_id: None,
            created_at: now,
            updated_at: now,
        })
    }

    fn get_creator(&self, id: &str) -> Result<Option<Creator>, CatalogError> {
        let conn = self.conn.lock().unwrap();

        let result = conn.query_row(
            "SELECT id, display_name, username, connected_account_id, created_at, updated_at FROM creators WHERE id = ?",
            params![id],
            Self::row_to_creator,
        );

        match result {
            Ok(creator) => Ok(Some(creator)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(CatalogError::Database(e.to_string())),
        }
    }

    fn get_creator_by_username(&self, username: &str) -> Result<Option<Creator>, CatalogError> {
        let conn = self.conn.lock().unwrap();

        let result = conn.query_row(
            "SELECT id, display_name, username, connected_account_id, created_at, updated_at FROM creators WHERE username = ?",
            params![username],
            Self::row_to_creator,
        );

        match result {
            Ok(creator) => Ok(Some(creator)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(CatalogError::Database(e.to_string())),
        }
    }

    fn set_connected_account(&self, id: &str, account_id: &str) -> Result<Creator, CatalogError> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now();

        let changed = conn
            .execute(
                "UPDATE creators SET connected_account_id = ?, updated_at = ? WHERE id = ?",
                params![account_id, now.to_rfc3339(), id],
            )
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        if changed == 0 {
            return Err(CatalogError::NotFound(format!("creator {}", id)));
        }

        conn.query_row(
            "SELECT id, display_name, username, connected_account_id, created_at, updated_at FROM creators WHERE id = ?",
            params![id],
            Self::row_to_creator,
        )
        .map_err(|e| CatalogError::Database(e.to_string()))
    }
}

impl PackStore for SqliteCatalog {
    fn create_pack(&self, pack: NewPack, samples: Vec<NewSample>) -> Result<Pack, CatalogError> {
        let mut conn = self.conn.lock().unwrap();
        let now = Utc::now();

        let tx = conn
            .transaction()
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        tx.execute(
            "INSERT INTO packs (creator_id, slug, title, description, price_cents, cover_url, archive_url, archive_key, product_id, payment_link, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                pack.creator_id,
                pack.slug,
                pack.title,
                pack.description,
                pack.price_cents,
                pack.cover_url,
                pack.archive_url,
                pack.archive_key,
                pack.product_id,
                pack.payment_link,
                now.to_rfc3339(),
                now.to_rfc3339(),
            ],
        )
        .map_err(|e| {
            if Self::is_unique_violation(&e) {
                CatalogError::DuplicateSlug {
                    creator_id: pack.creator_id.clone(),
                    slug: pack.slug.clone(),
                }
            } else {
                CatalogError::Database(e.to_string())
            }
        })?;

        let pack_id = tx.last_insert_rowid();

        for sample in &samples {
            tx.execute(
                "INSERT INTO samples (pack_id, url, title) VALUES (?, ?, ?)",
                params![pack_id, sample.url, sample.title],
            )
            .map_err(|e| CatalogError::Database(e.to_string()))?;
        }

        tx.commit()
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        Ok(Pack {
            id: pack_id,
            creator_id: pack.creator_id,
            slug: pack.slug,
            title: pack.title,
            description: pack.description,
            price_cents: pack.price_cents,
            cover_url: pack.cover_url,
            archive_url: pack.archive_url,
            archive_key: pack.archive_key,
            product_id: pack.product_id,
            payment_link: pack.payment_link,
            created_at: now,
            updated_at: now,
        })
    }

    fn get_pack(&self, creator_id: &str, slug: &str) -> Result<Option<Pack>, CatalogError> {
        let conn = self.conn.lock().unwrap();

        let sql = format!(
            "SELECT {} FROM packs WHERE creator_id = ? AND slug = ?",
            PACK_COLUMNS
        );
        let result = conn.query_row(&sql, params![creator_id, slug], Self::row_to_pack);

        match result {
            Ok(pack) => Ok(Some(pack)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(CatalogError::Database(e.to_string())),
        }
    }

    fn get_pack_with_samples(
        &self,
        creator_id: &str,
        slug: &str,
    ) -> Result<Option<(Pack, Vec<Sample>)>, CatalogError> {
        let conn = self.conn.lock().unwrap();

        let sql = format!(
            "SELECT {} FROM packs WHERE creator_id = ? AND slug = ?",
            PACK_COLUMNS
        );
        let pack = match conn.query_row(&sql, params![creator_id, slug], Self::row_to_pack) {
            Ok(pack) => pack,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(CatalogError::Database(e.to_string())),
        };

        let mut stmt = conn
            .prepare("SELECT id, pack_id, url, title FROM samples WHERE pack_id = ? ORDER BY id")
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(params![pack.id], |row| {
                Ok(Sample {
                    id: row.get(0)?,
                    pack_id: row.get(1)?,
                    url: row.get(2)?,
                    title: row.get(3)?,
                })
            })
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        let mut samples = Vec::new();
        for row_result in rows {
            samples.push(row_result.map_err(|e| CatalogError::Database(e.to_string()))?);
        }

        Ok(Some((pack, samples)))
    }

    fn list_packs(&self, creator_id: &str) -> Result<Vec<Pack>, CatalogError> {
        let conn = self.conn.lock().unwrap();

        let sql = format!(
            "SELECT {} FROM packs WHERE creator_id = ? ORDER BY created_at DESC, id DESC",
            PACK_COLUMNS
        );
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(params![creator_id], Self::row_to_pack)
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        let mut packs = Vec::new();
        for row_result in rows {
            packs.push(row_result.map_err(|e| CatalogError::Database(e.to_string()))?);
        }

        Ok(packs)
    }

    fn update_pack(
        &self,
        creator_id: &str,
        slug: &str,
        update: PackUpdate,
    ) -> Result<Pack, CatalogError> {
        let conn = self.conn.lock().unwrap();

        let sql = format!(
            "SELECT {} FROM packs WHERE creator_id = ? AND slug = ?",
            PACK_COLUMNS
        );
        let current = match conn.query_row(&sql, params![creator_id, slug], Self::row_to_pack) {
            Ok(pack) => pack,
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                return Err(CatalogError::NotFound(format!(
                    "pack {}/{}",
                    creator_id, slug
                )));
            }
            Err(e) => return Err(CatalogError::Database(e.to_string())),
        };

        let now = Utc::now();
        conn.execute(
            "UPDATE packs SET slug = ?, title = ?, description = ?, price_cents = ?, payment_link = ?, updated_at = ? WHERE id = ?",
            params![
                update.slug,
                update.title,
                update.description,
                update.price_cents,
                update.payment_link,
                now.to_rfc3339(),
                current.id,
            ],
        )
        .map_err(|e| {
            if Self::is_unique_violation(&e) {
                CatalogError::DuplicateSlug {
                    creator_id: creator_id.to_string(),
                    slug: update.slug.clone(),
                }
            } else {
                CatalogError::Database(e.to_string())
            }
        })?;

        Ok(Pack {
            slug: update.slug,
            title: update.title,
            description: update.description,
            price_cents: update.price_cents,
            payment_link: update.payment_link,
            updated_at: now,
            ..current
        })
    }

    fn delete_pack(&self, creator_id: &str, slug: &str) -> Result<Pack, CatalogError> {
        let mut conn = self.conn.lock().unwrap();

        let tx = conn
            .transaction()
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        let sql = format!(
            "SELECT {} FROM packs WHERE creator_id = ? AND slug = ?",
            PACK_COLUMNS
        );
        let pack = match tx.query_row(&sql, params![creator_id, slug], Self::row_to_pack) {
            Ok(pack) => pack,
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                return Err(CatalogError::NotFound(format!(
                    "pack {}/{}",
                    creator_id, slug
                )));
            }
            Err(e) => return Err(CatalogError::Database(e.to_string())),
        };

        tx.execute("DELETE FROM samples WHERE pack_id = ?", params![pack.id])
            .map_err(|e| CatalogError::Database(e.to_string()))?;
        tx.execute("DELETE FROM packs WHERE id = ?", params![pack.id])
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        tx.commit()
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        Ok(pack)
    }

    fn count_packs(&self) -> Result<i64, CatalogError> {
        let conn = self.conn.lock().unwrap();

        conn.query_row("SELECT COUNT(*) FROM packs", [], |row| row.get(0))
            .map_err(|e| CatalogError::Database(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_store() -> SqliteCatalog {
        SqliteCatalog::in_memory().unwrap()
    }

    fn create_test_creator(store: &SqliteCatalog, id: &str, username: &str) -> Creator {
        store
            .create_creator(NewCreator {
                id: id.to_string(),
                display_name: format!("Creator {}", username),
                username: username.to_string(),
            })
            .unwrap()
    }

    fn create_test_pack(creator_id: &str, slug: &str) -> NewPack {
        NewPack {
            creator_id: creator_id.to_string(),
            slug: slug.to_string(),
            title: "Lo-Fi Drums Vol. 1".to_string(),
            description: Some("Dusty breaks".to_string()),
            price_cents: 999,
            cover_url: "https://cdn.example.com/covers/c1".to_string(),
            archive_url: "https://cdn.example.com/archives/a1".to_string(),
            archive_key: "archives/a1".to_string(),
            product_id: "prod_1".to_string(),
            payment_link: "https://buy.example.com/plink_1".to_string(),
        }
    }

    fn create_test_samples(n: usize) -> Vec<NewSample> {
        (0..n)
            .map(|i| NewSample {
                url: format!("https://cdn.example.com/samples/s{}", i),
                title: format!("Sample {}", i),
            })
            .collect()
    }

    fn sample_count(store: &SqliteCatalog) -> i64 {
        let conn = store.conn.lock().unwrap();
        conn.query_row("SELECT COUNT(*) FROM samples", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn test_create_and_get_creator() {
        let store = create_test_store();
        let creator = create_test_creator(&store, "user-1", "beatsmith");

        assert_eq!(creator.id, "user-1");
        assert!(creator.connected_account_id.is_none());

        let fetched = store.get_creator("user-1").unwrap().unwrap();
        assert_eq!(fetched.username, "beatsmith");
        assert!(!fetched.has_connected_account());
    }

    #[test]
    fn test_get_creator_by_username() {
        let store = create_test_store();
        create_test_creator(&store, "user-1", "beatsmith");

        let fetched = store.get_creator_by_username("beatsmith").unwrap();
        assert!(fetched.is_some());
        assert_eq!(fetched.unwrap().id, "user-1");

        assert!(store.get_creator_by_username("nobody").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_creator_id_fails() {
        let store = create_test_store();
        create_test_creator(&store, "user-1", "beatsmith");

        let result = store.create_creator(NewCreator {
            id: "user-1".to_string(),
            display_name: "Other".to_string(),
            username: "other".to_string(),
        });
        assert!(matches!(result, Err(CatalogError::DuplicateCreator(_))));
    }

    #[test]
    fn test_duplicate_username_fails() {
        let store = create_test_store();
        create_test_creator(&store, "user-1", "beatsmith");

        let result = store.create_creator(NewCreator {
            id: "user-2".to_string(),
            display_name: "Other".to_string(),
            username: "beatsmith".to_string(),
        });
        assert!(matches!(result, Err(CatalogError::DuplicateCreator(_))));
    }

    #[test]
    fn test_set_connected_account() {
        let store = create_test_store();
        create_test_creator(&store, "user-1", "beatsmith");

        let updated = store.set_connected_account("user-1", "acct_123").unwrap();
        assert_eq!(updated.connected_account_id.as_deref(), Some("acct_123"));
        assert!(updated.has_connected_account());
    }

    #[test]
    fn test_set_connected_account_missing_creator() {
        let store = create_test_store();
        let result = store.set_connected_account("ghost", "acct_123");
        assert!(matches!(result, Err(CatalogError::NotFound(_))));
    }

    #[test]
    fn test_create_pack_with_samples() {
        let store = create_test_store();
        create_test_creator(&store, "user-1", "beatsmith");

        let pack = store
            .create_pack(
                create_test_pack("user-1", "lo-fi-drums-vol-1"),
                create_test_samples(3),
            )
            .unwrap();

        assert!(pack.id > 0);
        assert_eq!(pack.slug, "lo-fi-drums-vol-1");

        let (fetched, samples) = store
            .get_pack_with_samples("user-1", "lo-fi-drums-vol-1")
            .unwrap()
            .unwrap();
        assert_eq!(fetched.id, pack.id);
        assert_eq!(samples.len(), 3);
        assert!(samples.iter().all(|s| s.pack_id == pack.id));
    }

    #[test]
    fn test_create_pack_without_samples() {
        let store = create_test_store();
        create_test_creator(&store, "user-1", "beatsmith");

        store
            .create_pack(create_test_pack("user-1", "no-previews"), vec![])
            .unwrap();

        let (_, samples) = store
            .get_pack_with_samples("user-1", "no-previews")
            .unwrap()
            .unwrap();
        assert!(samples.is_empty());
    }

    #[test]
    fn test_duplicate_slug_same_creator_fails() {
        let store = create_test_store();
        create_test_creator(&store, "user-1", "beatsmith");

        store
            .create_pack(create_test_pack("user-1", "lo-fi-drums-vol-1"), vec![])
            .unwrap();

        let result = store.create_pack(
            create_test_pack("user-1", "lo-fi-drums-vol-1"),
            create_test_samples(2),
        );
        assert!(matches!(result, Err(CatalogError::DuplicateSlug { .. })));
    }

    #[test]
    fn test_duplicate_slug_insert_writes_nothing() {
        let store = create_test_store();
        create_test_creator(&store, "user-1", "beatsmith");

        store
            .create_pack(
                create_test_pack("user-1", "lo-fi-drums-vol-1"),
                create_test_samples(3),
            )
            .unwrap();
        assert_eq!(sample_count(&store), 3);

        let result = store.create_pack(
            create_test_pack("user-1", "lo-fi-drums-vol-1"),
            create_test_samples(5),
        );
        assert!(result.is_err());

        // The losing attempt must not leave any sample rows behind
        assert_eq!(sample_count(&store), 3);
        assert_eq!(store.count_packs().unwrap(), 1);
    }

    #[test]
    fn test_same_slug_different_creators_ok() {
        let store = create_test_store();
        create_test_creator(&store, "user-1", "beatsmith");
        create_test_creator(&store, "user-2", "wavdealer");

        store
            .create_pack(create_test_pack("user-1", "lo-fi-drums-vol-1"), vec![])
            .unwrap();
        store
            .create_pack(create_test_pack("user-2", "lo-fi-drums-vol-1"), vec![])
            .unwrap();

        assert_eq!(store.count_packs().unwrap(), 2);
    }

    #[test]
    fn test_get_pack_missing() {
        let store = create_test_store();
        assert!(store.get_pack("user-1", "nope").unwrap().is_none());
        assert!(store
            .get_pack_with_samples("user-1", "nope")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_list_packs_newest_first() {
        let store = create_test_store();
        create_test_creator(&store, "user-1", "beatsmith");

        for slug in ["first", "second", "third"] {
            store
                .create_pack(create_test_pack("user-1", slug), vec![])
                .unwrap();
        }

        let packs = store.list_packs("user-1").unwrap();
        assert_eq!(packs.len(), 3);
        assert_eq!(packs[0].slug, "third");
        assert_eq!(packs[2].slug, "first");
    }

    #[test]
    fn test_list_packs_scoped_to_creator() {
        let store = create_test_store();
        create_test_creator(&store, "user-1", "beatsmith");
        create_test_creator(&store, "user-2", "wavdealer");

        store
            .create_pack(create_test_pack("user-1", "mine"), vec![])
            .unwrap();
        store
            .create_pack(create_test_pack("user-2", "theirs"), vec![])
            .unwrap();

        let packs = store.list_packs("user-1").unwrap();
        assert_eq!(packs.len(), 1);
        assert_eq!(packs[0].slug, "mine");
    }

    #[test]
    fn test_update_pack() {
        let store = create_test_store();
        create_test_creator(&store, "user-1", "beatsmith");
        store
            .create_pack(create_test_pack("user-1", "lo-fi-drums-vol-1"), vec![])
            .unwrap();

        let updated = store
            .update_pack(
                "user-1",
                "lo-fi-drums-vol-1",
                PackUpdate {
                    slug: "lo-fi-drums-vol-2".to_string(),
                    title: "Lo-Fi Drums Vol. 2".to_string(),
                    description: None,
                    price_cents: 1499,
                    payment_link: "https://buy.example.com/plink_2".to_string(),
                },
            )
            .unwrap();

        assert_eq!(updated.slug, "lo-fi-drums-vol-2");
        assert_eq!(updated.price_cents, 1499);
        assert_eq!(updated.payment_link, "https://buy.example.com/plink_2");
        assert!(updated.description.is_none());
        // Commerce identifiers and asset URLs are untouched
        assert_eq!(updated.product_id, "prod_1");
        assert_eq!(updated.archive_key, "archives/a1");

        // Old slug is gone, new one resolves
        assert!(store.get_pack("user-1", "lo-fi-drums-vol-1").unwrap().is_none());
        assert!(store.get_pack("user-1", "lo-fi-drums-vol-2").unwrap().is_some());
    }

    #[test]
    fn test_update_pack_missing() {
        let store = create_test_store();
        create_test_creator(&store, "user-1", "beatsmith");

        let result = store.update_pack(
            "user-1",
            "ghost",
            PackUpdate {
                slug: "ghost".to_string(),
                title: "Ghost".to_string(),
                description: None,
                price_cents: 100,
                payment_link: "https://buy.example.com/x".to_string(),
            },
        );
        assert!(matches!(result, Err(CatalogError::NotFound(_))));
    }

    #[test]
    fn test_update_pack_slug_collision_fails() {
        let store = create_test_store();
        create_test_creator(&store, "user-1", "beatsmith");
        store
            .create_pack(create_test_pack("user-1", "taken"), vec![])
            .unwrap();
        store
            .create_pack(create_test_pack("user-1", "moving"), vec![])
            .unwrap();

        let result = store.update_pack(
            "user-1",
            "moving",
            PackUpdate {
                slug: "taken".to_string(),
                title: "Taken".to_string(),
                description: None,
                price_cents: 100,
                payment_link: "https://buy.example.com/x".to_string(),
            },
        );
        assert!(matches!(result, Err(CatalogError::DuplicateSlug { .. })));
    }

    #[test]
    fn test_delete_pack_removes_samples() {
        let store = create_test_store();
        create_test_creator(&store, "user-1", "beatsmith");
        store
            .create_pack(
                create_test_pack("user-1", "lo-fi-drums-vol-1"),
                create_test_samples(3),
            )
            .unwrap();
        assert_eq!(sample_count(&store), 3);

        let deleted = store.delete_pack("user-1", "lo-fi-drums-vol-1").unwrap();
        assert_eq!(deleted.product_id, "prod_1");
        assert_eq!(deleted.archive_key, "archives/a1");

        assert!(store
            .get_pack("user-1", "lo-fi-drums-vol-1")
            .unwrap()
            .is_none());
        assert_eq!(sample_count(&store), 0);
    }

    #[test]
    fn test_delete_pack_missing() {
        let store = create_test_store();
        let result = store.delete_pack("user-1", "ghost");
        assert!(matches!(result, Err(CatalogError::NotFound(_))));
    }

    #[test]
    fn test_delete_pack_leaves_other_packs_samples() {
        let store = create_test_store();
        create_test_creator(&store, "user-1", "beatsmith");
        store
            .create_pack(create_test_pack("user-1", "keep"), create_test_samples(2))
            .unwrap();
        store
            .create_pack(create_test_pack("user-1", "drop"), create_test_samples(3))
            .unwrap();

        store.delete_pack("user-1", "drop").unwrap();

        assert_eq!(sample_count(&store), 2);
        let (_, samples) = store.get_pack_with_samples("user-1", "keep").unwrap().unwrap();
        assert_eq!(samples.len(), 2);
    }

    #[test]
    fn test_file_based_store() {
        let temp_dir = tempfile::tempdir().unwrap();
        let db_path = temp_dir.path().join("catalog.db");

        let store = SqliteCatalog::new(&db_path).unwrap();
        create_test_creator(&store, "user-1", "beatsmith");
        store
            .create_pack(create_test_pack("user-1", "on-disk"), vec![])
            .unwrap();

        assert!(db_path.exists());
        assert!(store.get_pack("user-1", "on-disk").unwrap().is_some());
    }
}
