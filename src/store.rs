use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::errors::StoreError;
use crate::models::Session;

pub const CURRENT_SCHEMA_VERSION: u32 = 1;
pub const STORAGE_KEY: &str = "workouts_v2";
pub const LEGACY_STORAGE_KEY: &str = "workouts";

/// Durable string storage addressed by key.
pub trait KeyValueStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// One `<key>.json` file per key inside a data directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;
        let target = self.path_for(key);
        let staging = self.dir.join(format!(".{key}.json.tmp"));
        fs::write(&staging, value)?;
        fs::rename(&staging, &target)?;
        debug!(path = %target.display(), bytes = value.len(), "wrote storage key");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process storage, mostly for tests.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(self, key: &str, value: &str) -> Self {
        self.entries.borrow_mut().insert(key.to_string(), value.to_string());
        self
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.raw(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// The two document shapes accepted on load and import.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredDocument {
    /// Oldest layout: just the sessions array.
    Bare(Vec<Session>),
    Versioned { schema_version: Option<u32>, sessions: Vec<Session> },
}

impl StoredDocument {
    pub fn parse(text: &str) -> Result<Self, StoreError> {
        let value: Value = serde_json::from_str(text).map_err(StoreError::Parse)?;
        match value {
            Value::Array(items) => Ok(StoredDocument::Bare(decode_sessions(items)?)),
            Value::Object(mut fields) => match fields.remove("sessions") {
                Some(Value::Array(items)) => {
                    let schema_version = fields
                        .get("schemaVersion")
                        .and_then(Value::as_u64)
                        .filter(|v| *v > 0)
                        .and_then(|v| u32::try_from(v).ok());
                    Ok(StoredDocument::Versioned { schema_version, sessions: decode_sessions(items)? })
                }
                _ => Err(StoreError::Format),
            },
            _ => Err(StoreError::Format),
        }
    }

    pub fn schema_version(&self) -> u32 {
        match self {
            StoredDocument::Bare(_) => CURRENT_SCHEMA_VERSION,
            StoredDocument::Versioned { schema_version, .. } => {
                schema_version.unwrap_or(CURRENT_SCHEMA_VERSION)
            }
        }
    }

    pub fn into_sessions(self) -> Vec<Session> {
        match self {
            StoredDocument::Bare(sessions) | StoredDocument::Versioned { sessions, .. } => sessions,
        }
    }
}

fn decode_sessions(items: Vec<Value>) -> Result<Vec<Session>, StoreError> {
    serde_json::from_value(Value::Array(items)).map_err(StoreError::Parse)
}

#[derive(Serialize)]
struct Envelope<'a> {
    #[serde(rename = "schemaVersion")]
    schema_version: u32,
    sessions: &'a [Session],
}

/// Where the loaded sessions came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentSource {
    Missing,
    Current,
    LegacyKey,
    /// Something was stored but could not be read; treated as empty.
    Unreadable,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoreContents {
    pub schema_version: u32,
    pub sessions: Vec<Session>,
    pub source: DocumentSource,
    pub legacy_shape: bool,
}

impl StoreContents {
    fn empty(source: DocumentSource) -> Self {
        Self { schema_version: CURRENT_SCHEMA_VERSION, sessions: Vec::new(), source, legacy_shape: false }
    }

    fn from_document(document: StoredDocument, source: DocumentSource) -> Self {
        let legacy_shape = matches!(document, StoredDocument::Bare(_));
        let schema_version = document.schema_version();
        Self { schema_version, sessions: document.into_sessions(), source, legacy_shape }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MigrationReport {
    pub found_version: u32,
    pub source: DocumentSource,
    pub legacy_shape: bool,
    pub rewritten: bool,
    pub sessions: usize,
}

/// Session history persisted as `{schemaVersion, sessions}` under a fixed key.
///
/// `append` and `delete_at` are load-modify-save with nothing in between, so
/// callers on a single thread never observe a torn update.
#[derive(Debug)]
pub struct SessionStore<S: KeyValueStorage> {
    storage: S,
}

impl<S: KeyValueStorage> SessionStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn load(&self) -> Result<StoreContents, StoreError> {
        let (raw, source) = match self.read_key(STORAGE_KEY)? {
            Some(raw) => (raw, DocumentSource::Current),
            None => match self.read_key(LEGACY_STORAGE_KEY)? {
                Some(raw) => (raw, DocumentSource::LegacyKey),
                None => return Ok(StoreContents::empty(DocumentSource::Missing)),
            },
        };

        match StoredDocument::parse(&raw) {
            Ok(document) => Ok(StoreContents::from_document(document, source)),
            Err(err) => {
                warn!(error = %err, ?source, "stored workout history is unreadable, starting empty");
                Ok(StoreContents::empty(DocumentSource::Unreadable))
            }
        }
    }

    pub fn sessions(&self) -> Result<Vec<Session>, StoreError> {
        Ok(self.load()?.sessions)
    }

    pub fn save(&self, sessions: &[Session]) -> Result<(), StoreError> {
        let envelope = Envelope { schema_version: CURRENT_SCHEMA_VERSION, sessions };
        let json = serde_json::to_string(&envelope).map_err(StoreError::Serialize)?;
        self.storage.set(STORAGE_KEY, &json)?;
        self.storage.remove(LEGACY_STORAGE_KEY)?;
        Ok(())
    }

    /// Returns the number of stored sessions after the append.
    pub fn append(&self, session: Session) -> Result<usize, StoreError> {
        let mut sessions = self.sessions()?;
        sessions.push(session);
        self.save(&sessions)?;
        info!(total = sessions.len(), "session saved");
        Ok(sessions.len())
    }

    /// Removes the session at `index` (oldest first). Out of range is a no-op.
    pub fn delete_at(&self, index: usize) -> Result<Option<Session>, StoreError> {
        let mut sessions = self.sessions()?;
        if index >= sessions.len() {
            debug!(index, total = sessions.len(), "delete index out of range");
            return Ok(None);
        }
        let removed = sessions.remove(index);
        self.save(&sessions)?;
        info!(index, date = %removed.date, "session deleted");
        Ok(Some(removed))
    }

    /// Pretty-printed sessions array, without the version envelope.
    pub fn export_all(&self) -> Result<String, StoreError> {
        let sessions = self.sessions()?;
        serde_json::to_string_pretty(&sessions).map_err(StoreError::Serialize)
    }

    /// Replaces the whole history with the sessions in `document`. Returns the
    /// number imported; on any error the stored history is left as it was.
    pub fn import_all(&self, document: &str) -> Result<usize, StoreError> {
        let sessions = StoredDocument::parse(document)?.into_sessions();
        self.save(&sessions)?;
        info!(total = sessions.len(), "history imported");
        Ok(sessions.len())
    }

    /// Rewrites legacy data (legacy key, bare array or older schema) into the
    /// current envelope.
    pub fn migrate(&self) -> Result<MigrationReport, StoreError> {
        let contents = self.load()?;
        let outdated = contents.source == DocumentSource::LegacyKey
            || contents.legacy_shape
            || contents.schema_version < CURRENT_SCHEMA_VERSION;

        if contents.schema_version > CURRENT_SCHEMA_VERSION {
            warn!(
                found = contents.schema_version,
                current = CURRENT_SCHEMA_VERSION,
                "history was written by a newer version, leaving it untouched"
            );
        }

        let found_version = contents.schema_version;
        let count = contents.sessions.len();
        if outdated && contents.schema_version <= CURRENT_SCHEMA_VERSION {
            let sessions = upgrade(contents.schema_version, contents.sessions);
            self.save(&sessions)?;
            info!(from = found_version, to = CURRENT_SCHEMA_VERSION, sessions = count, "history migrated");
            return Ok(MigrationReport {
                found_version,
                source: contents.source,
                legacy_shape: contents.legacy_shape,
                rewritten: true,
                sessions: count,
            });
        }

        Ok(MigrationReport {
            found_version,
            source: contents.source,
            legacy_shape: contents.legacy_shape,
            rewritten: false,
            sessions: count,
        })
    }

    fn read_key(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.storage.get(key)?.filter(|raw| !raw.is_empty()))
    }
}

// Version 1 is the first enveloped layout; earlier data is the bare array,
// which decodes into the same session shape.
fn upgrade(_from: u32, sessions: Vec<Session>) -> Vec<Session> {
    sessions
}

pub fn export_file_name(date: NaiveDate) -> String {
    format!("entrenos-{}.json", date.format("%Y-%m-%d"))
}
