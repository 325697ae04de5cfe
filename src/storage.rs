//! String key-value storage on top of the `kv_store` table.

use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ConnectionTrait, EntityTrait, Set};
use tracing::debug;

use crate::entities::kv_entry;
use crate::error::AppError;

pub async fn get_value<C>(conn: &C, key: &str) -> Result<Option<String>, AppError>
where
    C: ConnectionTrait,
{
    let row = kv_entry::Entity::find_by_id(key.to_string())
        .one(conn)
        .await?;
    debug!(key, found = row.is_some(), "read stored value");
    Ok(row.map(|row| row.value))
}

/// Insert or overwrite `key` in a single statement.
pub async fn put_value<C>(conn: &C, key: &str, value: String) -> Result<(), AppError>
where
    C: ConnectionTrait,
{
    let bytes = value.len();
    let active = kv_entry::ActiveModel {
        key: Set(key.to_string()),
        value: Set(value),
        updated_at: Set(Utc::now()),
    };
    kv_entry::Entity::insert(active)
        .on_conflict(
            OnConflict::column(kv_entry::Column::Key)
                .update_columns([kv_entry::Column::Value, kv_entry::Column::UpdatedAt])
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;
    debug!(key, bytes, "wrote stored value");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use tempfile::TempDir;

    async fn setup_db() -> (TempDir, sea_orm::DatabaseConnection) {
        let dir = TempDir::new().expect("temp dir");
        let db_path = db::resolve_db_path(dir.path());
        db::ensure_parent_dir(&db_path).expect("ensure parent");
        let conn = db::connect(&db_path).await.expect("connect db");
        db::ensure_schema(&conn).await.expect("ensure schema");
        (dir, conn)
    }

    #[tokio::test]
    async fn missing_key_reads_as_none() {
        let (_dir, conn) = setup_db().await;
        let value = get_value(&conn, "anxietyLogs").await.expect("get");
        assert_eq!(value, None);
    }

    #[tokio::test]
    async fn put_overwrites_previous_value() {
        let (_dir, conn) = setup_db().await;
        put_value(&conn, "anxietyLogs", "[]".to_string())
            .await
            .expect("first put");
        put_value(&conn, "anxietyLogs", "[1]".to_string())
            .await
            .expect("second put");
        let value = get_value(&conn, "anxietyLogs").await.expect("get");
        assert_eq!(value.as_deref(), Some("[1]"));

        let rows = kv_entry::Entity::find().all(&conn).await.expect("rows");
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn keys_are_independent() {
        let (_dir, conn) = setup_db().await;
        put_value(&conn, "a", "1".to_string()).await.expect("put a");
        put_value(&conn, "b", "2".to_string()).await.expect("put b");
        assert_eq!(get_value(&conn, "a").await.expect("get a").as_deref(), Some("1"));
        assert_eq!(get_value(&conn, "b").await.expect("get b").as_deref(), Some("2"));
    }
}
