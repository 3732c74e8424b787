use super::{JoinedTable, LoadError, Relation, SourceRelations};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
struct FileStamp {
    len: u64,
    modified: Option<SystemTime>,
}

type SourceFingerprint = Vec<FileStamp>;

#[derive(Debug)]
struct CacheEntry {
    fingerprint: SourceFingerprint,
    table: Arc<JoinedTable>,
}

/// Memoizes the joined table for a data directory. The entry is rebuilt only
/// when one of the four source files changes length or modification time.
#[derive(Debug)]
pub struct CachedRecordStore {
    dir: PathBuf,
    entry: Mutex<Option<CacheEntry>>,
}

impl CachedRecordStore {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self {
            dir: dir.into(),
            entry: Mutex::new(None),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn table(&self) -> Result<Arc<JoinedTable>, LoadError> {
        let fingerprint = self.fingerprint()?;
        let mut guard = self.entry.lock().expect("record cache mutex poisoned");

        if let Some(entry) = guard.as_ref() {
            if entry.fingerprint == fingerprint {
                debug!(dir = %self.dir.display(), "joined table served from cache");
                return Ok(Arc::clone(&entry.table));
            }
        }

        let table = Arc::new(SourceRelations::from_dir(&self.dir)?.join());
        *guard = Some(CacheEntry {
            fingerprint,
            table: Arc::clone(&table),
        });
        Ok(table)
    }

    fn fingerprint(&self) -> Result<SourceFingerprint, LoadError> {
        let mut stamps = Vec::with_capacity(4);
        for relation in Relation::ordered() {
            let path = relation.path_in(&self.dir);
            let metadata = fs::metadata(&path).map_err(|source| LoadError::Io {
                relation,
                path,
                source,
            })?;
            stamps.push(FileStamp {
                len: metadata.len(),
                modified: metadata.modified().ok(),
            });
        }
        Ok(stamps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OPS: &str = "ops_item_id,type,sla_due,owner,age_days,status\n\
OP-001,invoice_followup,2025-11-10,Ana,3,open\n";
    const TRANSACTIONS: &str =
        "transaction_id,ops_item_id,client_id,invoice_id,amount,due_date,status\n\
T-001,OP-001,C001,INV-1000,1200,2025-10-01,overdue\n";
    const RISK: &str = "ops_item_id,missing_fields,dup_flag,error_rate_by_client,blocks_invoicing\n\
OP-001,0,0,0.05,0\n";
    const CLIENTS: &str = "client_id,client_name,tier\nC001,Client 1,A\n";

    fn write_sources(dir: &Path) {
        fs::write(Relation::OpsItems.path_in(dir), OPS).expect("write ops");
        fs::write(Relation::Transactions.path_in(dir), TRANSACTIONS).expect("write transactions");
        fs::write(Relation::RiskFlags.path_in(dir), RISK).expect("write risk");
        fs::write(Relation::ClientTiers.path_in(dir), CLIENTS).expect("write clients");
    }

    #[test]
    fn reuses_join_until_a_source_changes() {
        let dir = tempfile::tempdir().expect("temp dir");
        write_sources(dir.path());
        let store = CachedRecordStore::new(dir.path());

        let first = store.table().expect("initial load");
        let second = store.table().expect("cached load");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.len(), 1);

        let extended = format!("{OPS}OP-002,data_fix,2025-11-12,Luis,1,open\n");
        fs::write(Relation::OpsItems.path_in(dir.path()), extended).expect("rewrite ops");

        let third = store.table().expect("reload after change");
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(third.len(), 2);
    }

    #[test]
    fn missing_source_surfaces_relation() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = CachedRecordStore::new(dir.path());

        match store.table() {
            Err(LoadError::Io { relation, .. }) => assert_eq!(relation, Relation::OpsItems),
            other => panic!("expected io error, got {other:?}"),
        }
    }
}
