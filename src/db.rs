use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use tracing::debug;
use url::Url;

use crate::entities::kv_entry;
use crate::error::AppError;

pub fn resolve_db_path(home: &Path) -> PathBuf {
    home.join("anxiety-crusher.db")
}

pub fn ensure_parent_dir(path: &Path) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Lock file next to the database; holding its write lock serializes writers.
pub fn open_lock(path: &Path) -> Result<fd_lock::RwLock<File>, AppError> {
    let lock_path = path.with_extension("lock");
    let file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .read(true)
        .write(true)
        .open(lock_path)?;
    Ok(fd_lock::RwLock::new(file))
}

pub async fn connect(path: &Path) -> Result<DatabaseConnection, AppError> {
    let mut url = Url::from_file_path(path)
        .map_err(|_| AppError::InvalidInput(format!("invalid sqlite path: {}", path.display())))?;
    url.set_query(Some("mode=rwc"));
    let sqlite_url = url.as_str().replacen("file://", "sqlite://", 1);
    debug!(url = %sqlite_url, "connecting to storage");
    Ok(Database::connect(&sqlite_url).await?)
}

pub async fn ensure_schema(db: &DatabaseConnection) -> Result<(), AppError> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut kv_stmt = schema.create_table_from_entity(kv_entry::Entity);
    kv_stmt.if_not_exists();
    db.execute(builder.build(&kv_stmt)).await?;

    Ok(())
}
