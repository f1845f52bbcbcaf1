use anyhow::Result;
use chrono::Utc;
use rusqlite::{params, Row};

use crate::db::{
    helpers::{parse_datetime, to_quantity},
    models::InventoryItem,
    Database,
};

fn row_to_item(row: &Row) -> Result<InventoryItem> {
    let expires_at: String = row.get("expires_at")?;
    let created_at: String = row.get("created_at")?;
    let updated_at: String = row.get("updated_at")?;

    Ok(InventoryItem {
        id: row.get("id")?,
        name: row.get("name")?,
        image_url: row.get("image_url")?,
        quantity: to_quantity(row.get("quantity")?, "quantity")?,
        expires_at: parse_datetime(&expires_at, "expires_at")?,
        created_at: parse_datetime(&created_at, "created_at")?,
        updated_at: parse_datetime(&updated_at, "updated_at")?,
    })
}

impl Database {
    /// Insert a single item
    pub async fn insert_item(&self, item: &InventoryItem) -> Result<()> {
        let record = item.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO items (id, name, image_url, quantity, expires_at, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    record.id,
                    record.name,
                    record.image_url,
                    i64::from(record.quantity),
                    record.expires_at.to_rfc3339(),
                    record.created_at.to_rfc3339(),
                    record.updated_at.to_rfc3339(),
                ],
            )?;
            Ok(())
        })
        .await
    }

    /// Insert a batch of items (confirmed scan drafts) in one transaction,
    /// so a half-committed scan never shows up in the inventory
    pub async fn insert_items(&self, items: Vec<InventoryItem>) -> Result<()> {
        self.execute(move |conn| {
            let tx = conn.transaction()?;
            for record in &items {
                tx.execute(
                    "INSERT INTO items (id, name, image_url, quantity, expires_at, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    params![
                        record.id,
                        record.name,
                        record.image_url,
                        i64::from(record.quantity),
                        record.expires_at.to_rfc3339(),
                        record.created_at.to_rfc3339(),
                        record.updated_at.to_rfc3339(),
                    ],
                )?;
            }
            tx.commit()?;
            Ok(())
        })
        .await
    }

    /// Snapshot of the full inventory, earliest expiration first.
    /// RFC 3339 UTC strings sort lexicographically, so the index on
    /// expires_at serves this query directly.
    pub async fn list_items(&self) -> Result<Vec<InventoryItem>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, image_url, quantity, expires_at, created_at, updated_at
                 FROM items
                 ORDER BY expires_at ASC",
            )?;

            let mut rows = stmt.query([])?;
            let mut items = Vec::new();
            while let Some(row) = rows.next()? {
                items.push(row_to_item(row)?);
            }

            Ok(items)
        })
        .await
    }

    /// Remove an item (consumed or discarded). Returns false when the
    /// id is unknown.
    pub async fn delete_item(&self, item_id: &str) -> Result<bool> {
        let item_id = item_id.to_string();
        self.execute(move |conn| {
            let rows_affected = conn.execute("DELETE FROM items WHERE id = ?1", params![item_id])?;
            Ok(rows_affected > 0)
        })
        .await
    }

    /// Full-row replacement, the only mutation an item supports.
    /// Bumps updated_at; created_at keeps its original value. Returns
    /// false when the id is unknown.
    pub async fn replace_item(&self, item: &InventoryItem) -> Result<bool> {
        let record = item.clone();
        self.execute(move |conn| {
            let now = Utc::now();
            let rows_affected = conn.execute(
                "UPDATE items
                 SET name = ?1,
                     image_url = ?2,
                     quantity = ?3,
                     expires_at = ?4,
                     updated_at = ?5
                 WHERE id = ?6",
                params![
                    record.name,
                    record.image_url,
                    i64::from(record.quantity),
                    record.expires_at.to_rfc3339(),
                    now.to_rfc3339(),
                    record.id,
                ],
            )?;
            Ok(rows_affected > 0)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration};
    use tempfile::TempDir;

    fn test_item(name: &str, expires_at: DateTime<Utc>) -> InventoryItem {
        InventoryItem::new(
            name.to_string(),
            "https://via.placeholder.com/150".to_string(),
            2,
            expires_at,
            Utc::now(),
        )
    }

    fn open_db() -> (TempDir, Database) {
        let dir = TempDir::new().expect("failed to create temp dir");
        let db = Database::new(dir.path().join("test.sqlite3")).expect("failed to open database");
        (dir, db)
    }

    #[tokio::test]
    async fn insert_and_list_returns_items_ordered_by_expiration() {
        let (_dir, db) = open_db();
        let now = Utc::now();

        db.insert_item(&test_item("later", now + Duration::days(5)))
            .await
            .unwrap();
        db.insert_item(&test_item("sooner", now + Duration::days(1)))
            .await
            .unwrap();

        let items = db.list_items().await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].name, "sooner");
        assert_eq!(items[1].name, "later");
    }

    #[tokio::test]
    async fn insert_items_commits_whole_batch() {
        let (_dir, db) = open_db();
        let now = Utc::now();

        let batch = vec![
            test_item("a", now + Duration::days(1)),
            test_item("b", now + Duration::days(2)),
            test_item("c", now + Duration::days(3)),
        ];
        db.insert_items(batch).await.unwrap();

        let items = db.list_items().await.unwrap();
        assert_eq!(items.len(), 3);
    }

    #[tokio::test]
    async fn delete_item_removes_row() {
        let (_dir, db) = open_db();
        let item = test_item("milk", Utc::now() + Duration::days(1));
        db.insert_item(&item).await.unwrap();

        let deleted = db.delete_item(&item.id).await.unwrap();
        assert!(deleted);
        assert!(db.list_items().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_unknown_item_returns_false() {
        let (_dir, db) = open_db();
        let deleted = db.delete_item("no-such-id").await.unwrap();
        assert!(!deleted);
    }

    #[tokio::test]
    async fn replace_item_overwrites_all_fields() {
        let (_dir, db) = open_db();
        let now = Utc::now();
        let original = test_item("yogurt", now + Duration::days(2));
        db.insert_item(&original).await.unwrap();

        let mut replacement = original.clone();
        replacement.name = "greek yogurt".to_string();
        replacement.quantity = 4;
        replacement.expires_at = now + Duration::days(6);

        let replaced = db.replace_item(&replacement).await.unwrap();
        assert!(replaced);

        let items = db.list_items().await.unwrap();
        assert_eq!(items[0].name, "greek yogurt");
        assert_eq!(items[0].quantity, 4);
        assert_eq!(items[0].created_at, original.created_at);
        assert!(items[0].updated_at >= original.updated_at);
    }

    #[tokio::test]
    async fn replace_unknown_item_returns_false() {
        let (_dir, db) = open_db();
        let item = test_item("ghost", Utc::now());
        let replaced = db.replace_item(&item).await.unwrap();
        assert!(!replaced);
    }
}
