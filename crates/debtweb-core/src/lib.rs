//! Debt store
//!
//! Keeps imported installments in a JSON file under persistent ids, merges
//! new imports by replacement or by appending unseen records, and layers
//! manual status overrides kept in a second JSON file on top of them.

pub mod error;
pub mod models;

use debtweb_config::{Config, ImportConfig, MergeMode};
use debtweb_importer::{DebtRecord, DebtStatus, ImportRules, ImporterRef};
use log::{debug, info, warn};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

pub use error::{CoreError, CoreResult, ErrorCode, ErrorDetails, ErrorSeverity};
pub use models::{ImportSummary, StoredDebt};

use models::{record_fingerprint, StoreFile};

/// Importer rules described by the `import` config section
pub fn import_rules(config: &ImportConfig) -> ImportRules {
    ImportRules::new(
        &config.entities,
        &config.date_header,
        &config.exclusion_marker,
        &config.paid_fills,
    )
}

/// JSON-file-backed debt store
#[derive(Debug)]
pub struct DebtBook {
    store_path: PathBuf,
    overrides_path: PathBuf,
    next_id: u64,
    debts: Vec<StoredDebt>,
    overrides: BTreeMap<String, DebtStatus>,
}

impl DebtBook {
    /// Open the store files, creating nothing until the first write
    pub fn open(store_path: PathBuf, overrides_path: PathBuf) -> CoreResult<Self> {
        let store: StoreFile = match read_json(&store_path)? {
            Some(store) => store,
            None => StoreFile::default(),
        };

        // A damaged overrides file only loses manual marks, so it does not block startup.
        let overrides = match read_json::<BTreeMap<String, DebtStatus>>(&overrides_path) {
            Ok(overrides) => overrides.unwrap_or_default(),
            Err(e) => {
                warn!("Ignoring overrides: {}", e);
                BTreeMap::new()
            }
        };

        debug!(
            "Opened debt store {} with {} debts and {} overrides",
            store_path.display(),
            store.debts.len(),
            overrides.len()
        );

        Ok(Self {
            store_path,
            overrides_path,
            next_id: store.next_id.max(1),
            debts: store.debts,
            overrides,
        })
    }

    /// Open the store named in the config, importing the configured workbook when the store is empty
    pub async fn load(config: &Config, importer: &ImporterRef) -> CoreResult<Self> {
        let mut book = Self::open(config.store_path(), config.overrides_path())?;

        let workbook = config.workbook_path();
        if book.is_empty() && workbook.exists() {
            info!("Debt store is empty, importing {}", workbook.display());
            let records = importer.import_file(workbook).await?;
            book.import(records, MergeMode::Replace)?;
        }

        Ok(book)
    }

    pub fn len(&self) -> usize {
        self.debts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.debts.is_empty()
    }

    /// All debts with overrides applied, sorted by due date
    pub fn debts(&self) -> Vec<StoredDebt> {
        let mut debts: Vec<StoredDebt> = self.debts.iter().map(|d| self.with_override(d)).collect();
        debts.sort_by(|a, b| a.date.chronological_cmp(&b.date));
        debts
    }

    /// A single debt with its override applied
    pub fn debt(&self, id: &str) -> Option<StoredDebt> {
        self.debts.iter().find(|d| d.id == id).map(|d| self.with_override(d))
    }

    pub fn overrides(&self) -> &BTreeMap<String, DebtStatus> {
        &self.overrides
    }

    fn with_override(&self, debt: &StoredDebt) -> StoredDebt {
        let mut debt = debt.clone();
        if let Some(status) = self.overrides.get(&debt.id) {
            debt.status = *status;
        }
        debt
    }

    /// Merge imported records into the store and persist it
    ///
    /// The in-memory store only changes once every file write succeeded.
    pub fn import(&mut self, records: Vec<DebtRecord>, mode: MergeMode) -> CoreResult<ImportSummary> {
        let received = records.len();

        let mut debts = match mode {
            MergeMode::Replace => Vec::new(),
            MergeMode::Append => self.debts.clone(),
        };
        let mut next_id = self.next_id;
        let mut added = 0;

        let mut known: HashSet<String> = debts.iter().map(StoredDebt::fingerprint).collect();
        for record in records {
            if !known.insert(record_fingerprint(&record)) {
                continue;
            }
            debts.push(StoredDebt::from_record(format!("debt-{:06}", next_id), record));
            next_id += 1;
            added += 1;
        }

        write_json(&self.store_path, &StoreFile { next_id, debts: debts.clone() })?;
        if mode == MergeMode::Replace {
            write_json(&self.overrides_path, &BTreeMap::<String, DebtStatus>::new())?;
            self.overrides.clear();
        }
        self.debts = debts;
        self.next_id = next_id;

        let summary = ImportSummary {
            mode,
            received,
            added,
            duplicates: received - added,
            total: self.debts.len(),
        };
        info!(
            "Import ({}): {} received, {} added, {} duplicates, {} total",
            mode, summary.received, summary.added, summary.duplicates, summary.total
        );
        Ok(summary)
    }

    /// Record a manual status for a debt
    pub fn set_status(&mut self, id: &str, status: DebtStatus) -> CoreResult<StoredDebt> {
        if !self.debts.iter().any(|d| d.id == id) {
            return Err(CoreError::DebtNotFound { id: id.to_string() });
        }

        let mut overrides = self.overrides.clone();
        overrides.insert(id.to_string(), status);
        write_json(&self.overrides_path, &overrides)?;
        self.overrides = overrides;
        info!("Updated status for {} to {}", id, status);

        self.debt(id).ok_or_else(|| CoreError::InternalError {
            message: format!("debt {} vanished while updating", id),
        })
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> CoreResult<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path).map_err(|_| CoreError::IoError {
        path: path.to_string_lossy().to_string(),
    })?;
    if content.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| CoreError::InvalidFormat {
            path: path.to_string_lossy().to_string(),
            message: e.to_string(),
        })
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> CoreResult<()> {
    let io_error = || CoreError::IoError {
        path: path.to_string_lossy().to_string(),
    };

    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir).map_err(|_| io_error())?;
        }
    }

    let content = serde_json::to_string_pretty(value).map_err(|e| CoreError::InternalError {
        message: e.to_string(),
    })?;
    std::fs::write(path, content).map_err(|_| io_error())
}

// ==================== Tests ====================
