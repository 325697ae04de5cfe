use chrono::{SecondsFormat, TimeZone, Utc};
use sea_orm::{ConnectionTrait, DatabaseConnection, DatabaseTransaction, TransactionTrait};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::model::{Entry, StatusScheme};
use crate::mutators;
use crate::storage;

/// Key under which the whole collection is stored as one JSON array.
pub const STORAGE_KEY: &str = "anxietyLogs";

/// A decoded snapshot. Records that do not read as entries are kept verbatim
/// and written back after the entries, so a save never drops them.
#[derive(Debug, Default)]
pub struct Snapshot {
    pub entries: Vec<Entry>,
    pub unreadable: Vec<Value>,
}

/// The single authority over the anxiety collection.
///
/// Callers never hold a long-lived copy to edit: every change goes through
/// [`LogStore::mutate`], which re-reads the snapshot, applies a pure
/// mutator and writes the complete collection back.
pub struct LogStore {
    db: DatabaseConnection,
    scheme: StatusScheme,
}

impl LogStore {
    pub fn new(db: DatabaseConnection, scheme: StatusScheme) -> Self {
        Self { db, scheme }
    }

    pub fn scheme(&self) -> StatusScheme {
        self.scheme
    }

    pub async fn load_all(&self) -> Result<Vec<Entry>, AppError> {
        Ok(load_from(&self.db).await?.entries)
    }

    /// Replace every readable entry with `entries`.
    pub async fn save_all(&self, entries: &[Entry]) -> Result<(), AppError> {
        let txn = self.db.begin().await?;
        let result: Result<(), AppError> = async {
            let snapshot = load_from(&txn).await?;
            save_to(&txn, entries, &snapshot.unreadable).await
        }
        .await;

        finalize_transaction(txn, result).await
    }

    pub async fn get(&self, id: &str) -> Result<Entry, AppError> {
        let entries = self.load_all().await?;
        find_by_id(&entries, id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("anxiety id {id}")))
    }

    pub async fn create(&self, text: &str, description: Option<&str>) -> Result<Entry, AppError> {
        let txn = self.db.begin().await?;
        let result: Result<Entry, AppError> = async {
            let Snapshot {
                entries,
                unreadable,
            } = load_from(&txn).await?;
            let entry =
                mutators::create_entry(&entries, text, description, self.scheme, Utc::now())
                    .ok_or_else(|| {
                        AppError::InvalidInput("anxiety text cannot be empty".to_string())
                    })?;
            save_to(&txn, &upsert(entries, entry.clone()), &unreadable).await?;
            info!(id = %entry.id, status = %entry.status, "logged anxiety");
            Ok(entry)
        }
        .await;

        finalize_transaction(txn, result).await
    }

    /// Apply `change` to the entry with `id` and persist the new collection.
    pub async fn mutate<F>(&self, id: &str, change: F) -> Result<Entry, AppError>
    where
        F: FnOnce(Entry) -> Entry,
    {
        let txn = self.db.begin().await?;
        let result: Result<Entry, AppError> = async {
            let Snapshot {
                entries,
                unreadable,
            } = load_from(&txn).await?;
            let current = find_by_id(&entries, id)
                .cloned()
                .ok_or_else(|| AppError::NotFound(format!("anxiety id {id}")))?;
            let updated = change(current);
            save_to(&txn, &upsert(entries, updated.clone()), &unreadable).await?;
            Ok(updated)
        }
        .await;

        finalize_transaction(txn, result).await
    }

    pub async fn delete(&self, id: &str) -> Result<Entry, AppError> {
        let txn = self.db.begin().await?;
        let result: Result<Entry, AppError> = async {
            let Snapshot {
                entries,
                unreadable,
            } = load_from(&txn).await?;
            let removed = find_by_id(&entries, id)
                .cloned()
                .ok_or_else(|| AppError::NotFound(format!("anxiety id {id}")))?;
            save_to(&txn, &remove(entries, id), &unreadable).await?;
            info!(id, "removed anxiety");
            Ok(removed)
        }
        .await;

        finalize_transaction(txn, result).await
    }
}

pub fn find_by_id<'a>(entries: &'a [Entry], id: &str) -> Option<&'a Entry> {
    entries.iter().find(|entry| entry.id == id)
}

/// Replace the entry with the same id, or put it first when it is new.
pub fn upsert(mut entries: Vec<Entry>, entry: Entry) -> Vec<Entry> {
    match entries.iter_mut().find(|existing| existing.id == entry.id) {
        Some(slot) => *slot = entry,
        None => entries.insert(0, entry),
    }
    entries
}

pub fn remove(mut entries: Vec<Entry>, id: &str) -> Vec<Entry> {
    entries.retain(|entry| entry.id != id);
    entries
}

/// Parse a stored payload. A payload that is not an array reads as empty;
/// array elements that are not entries are set aside in
/// [`Snapshot::unreadable`] with a warning.
pub fn decode_snapshot(raw: &str) -> Snapshot {
    let records: Vec<Value> = match serde_json::from_str(raw) {
        Ok(records) => records,
        Err(err) => {
            warn!(error = %err, "stored anxiety log is unreadable; treating as empty");
            return Snapshot::default();
        }
    };
    let mut snapshot = Snapshot::default();
    for (index, record) in records.into_iter().enumerate() {
        let mut candidate = record.clone();
        fill_created_at(&mut candidate);
        match serde_json::from_value::<Entry>(candidate) {
            Ok(entry) => snapshot.entries.push(entry),
            Err(err) => {
                warn!(index, error = %err, "keeping malformed anxiety record as is");
                snapshot.unreadable.push(record);
            }
        }
    }
    snapshot
}

pub fn encode_snapshot(entries: &[Entry], unreadable: &[Value]) -> Result<String, AppError> {
    let mut records = Vec::with_capacity(entries.len() + unreadable.len());
    for entry in entries {
        records.push(serde_json::to_value(entry)?);
    }
    records.extend(unreadable.iter().cloned());
    Ok(serde_json::to_string(&records)?)
}

/// Records without a usable `createdAt` take it from their millisecond id,
/// or the epoch when the id is not a timestamp.
fn fill_created_at(record: &mut Value) {
    let Some(fields) = record.as_object_mut() else {
        return;
    };
    if fields.get("createdAt").is_some_and(|value| !value.is_null()) {
        return;
    }
    let created = fields
        .get("id")
        .and_then(Value::as_str)
        .and_then(|id| id.parse::<i64>().ok())
        .and_then(|millis| Utc.timestamp_millis_opt(millis).single())
        .unwrap_or_default();
    fields.insert(
        "createdAt".to_string(),
        Value::String(created.to_rfc3339_opts(SecondsFormat::Millis, true)),
    );
}

async fn load_from<C>(conn: &C) -> Result<Snapshot, AppError>
where
    C: ConnectionTrait,
{
    let snapshot = match storage::get_value(conn, STORAGE_KEY).await? {
        Some(raw) => decode_snapshot(&raw),
        None => Snapshot::default(),
    };
    debug!(
        count = snapshot.entries.len(),
        unreadable = snapshot.unreadable.len(),
        "loaded anxiety log"
    );
    Ok(snapshot)
}

async fn save_to<C>(conn: &C, entries: &[Entry], unreadable: &[Value]) -> Result<(), AppError>
where
    C: ConnectionTrait,
{
    let raw = encode_snapshot(entries, unreadable)?;
    storage::put_value(conn, STORAGE_KEY, raw).await?;
    debug!(count = entries.len(), "saved anxiety log");
    Ok(())
}

async fn finalize_transaction<T>(
    txn: DatabaseTransaction,
    result: Result<T, AppError>,
) -> Result<T, AppError> {
    match result {
        Ok(value) => {
            txn.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = txn.rollback().await {
                return Err(rollback_err.into());
            }
            Err(err)
        }
    }
}
