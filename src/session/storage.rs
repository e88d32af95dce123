// src/session/storage.rs

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::SessionError;

/// Key written by the registration flow with the candidate's email.
pub const USER_EMAIL_KEY: &str = "userEmail";
/// Key written by the registration flow with the registration id.
pub const REGISTRATION_ID_KEY: &str = "registrationId";

/// Session-scoped string key-value storage (the browser's local storage).
pub trait KeyValueStorage: Send {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), SessionError>;
    fn remove(&mut self, key: &str) -> Result<(), SessionError>;
    fn keys(&self) -> Result<Vec<String>, SessionError>;
}

/// Storage that lives only as long as the process. Clones share entries,
/// the way every page of one browser origin sees the same local storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<BTreeMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SessionError> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), SessionError> {
        self.lock().remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, SessionError> {
        Ok(self.lock().keys().cloned().collect())
    }
}

/// Storage backed by a JSON object on disk, rewritten on every mutation so
/// that drafts survive a reload of the exam client.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStorage {
    /// Opens the file at `path`, starting empty when it does not exist yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SessionError> {
        let path = path.as_ref().to_path_buf();
        let entries = match fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, entries })
    }

    fn persist(&self) -> Result<(), SessionError> {
        let raw = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SessionError> {
        self.entries.insert(key.to_string(), value.to_string());
        self.persist()
    }

    fn remove(&mut self, key: &str) -> Result<(), SessionError> {
        if self.entries.remove(key).is_some() {
            self.persist()?;
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, SessionError> {
        Ok(self.entries.keys().cloned().collect())
    }
}

/// Candidate identity left behind by the registration flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateIdentity {
    pub email: String,
    pub registration_id: String,
}

/// Reads the identity fields; a missing or blank field is an error naming it.
pub fn read_identity(storage: &dyn KeyValueStorage) -> Result<CandidateIdentity, SessionError> {
    let email = required(storage, USER_EMAIL_KEY)?;
    let registration_id = required(storage, REGISTRATION_ID_KEY)?;
    Ok(CandidateIdentity {
        email,
        registration_id,
    })
}

fn required(storage: &dyn KeyValueStorage, key: &'static str) -> Result<String, SessionError> {
    match storage.get(key)? {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(SessionError::MissingIdentity { field: key }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("exam-portal-{}-{}.json", name, std::process::id()))
    }

    #[test]
    fn memory_storage_basic_ops() {
        let mut storage = MemoryStorage::new();
        storage.set("a", "1").unwrap();
        storage.set("b", "2").unwrap();
        storage.remove("a").unwrap();
        assert_eq!(storage.get("a").unwrap(), None);
        assert_eq!(storage.get("b").unwrap().as_deref(), Some("2"));
        assert_eq!(storage.keys().unwrap(), vec!["b".to_string()]);
    }

    #[test]
    fn memory_storage_clones_share_entries() {
        let mut registration_page = MemoryStorage::new();
        let exam_page = registration_page.clone();
        registration_page.set(USER_EMAIL_KEY, "a@b.com").unwrap();
        assert_eq!(exam_page.get(USER_EMAIL_KEY).unwrap().as_deref(), Some("a@b.com"));
    }

    #[test]
    fn file_storage_survives_reopen() {
        let path = temp_path("reopen");
        let _ = fs::remove_file(&path);

        {
            let mut storage = FileStorage::open(&path).unwrap();
            storage.set("question_1", "{\"code\":\"x\",\"output\":\"\"}").unwrap();
        }

        let storage = FileStorage::open(&path).unwrap();
        assert!(storage.get("question_1").unwrap().is_some());
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn identity_requires_both_fields() {
        let mut storage = MemoryStorage::new();
        storage.set(USER_EMAIL_KEY, "a@b.com").unwrap();

        match read_identity(&storage) {
            Err(SessionError::MissingIdentity { field }) => assert_eq!(field, REGISTRATION_ID_KEY),
            other => panic!("unexpected: {:?}", other),
        }

        storage.set(REGISTRATION_ID_KEY, "reg-1").unwrap();
        let identity = read_identity(&storage).unwrap();
        assert_eq!(identity.email, "a@b.com");
        assert_eq!(identity.registration_id, "reg-1");
    }

    #[test]
    fn blank_identity_counts_as_missing() {
        let mut storage = MemoryStorage::new();
        storage.set(USER_EMAIL_KEY, "  ").unwrap();
        storage.set(REGISTRATION_ID_KEY, "reg-1").unwrap();
        assert!(matches!(
            read_identity(&storage),
            Err(SessionError::MissingIdentity { field: USER_EMAIL_KEY })
        ));
    }
}
