//! Record stores.
//!
//! The engine only ever writes whole event snapshots, so a store needs no
//! partial updates: `commit` replaces the stored snapshot atomically.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use fencing_core::{Event, EventId};
use uuid::Uuid;

use crate::error::StoreError;

/// Persistence collaborator for event snapshots
pub trait RecordStore: Send + Sync {
    /// Store a new event
    fn insert(&self, event: &Event) -> Result<(), StoreError>;

    /// Latest committed snapshot of an event
    fn load(&self, id: EventId) -> Result<Event, StoreError>;

    /// Replace the snapshot of an existing event
    fn commit(&self, event: &Event) -> Result<(), StoreError>;

    fn event_ids(&self) -> Result<Vec<EventId>, StoreError>;
}

/// Events kept in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    events: RwLock<HashMap<EventId, Event>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryStore {
    fn insert(&self, event: &Event) -> Result<(), StoreError> {
        let mut events = self.events.write().unwrap_or_else(PoisonError::into_inner);
        if events.contains_key(&event.id) {
            return Err(StoreError::DuplicateEvent(event.id));
        }
        events.insert(event.id, event.clone());
        Ok(())
    }

    fn load(&self, id: EventId) -> Result<Event, StoreError> {
        self.events
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
            .ok_or(StoreError::UnknownEvent(id))
    }

    fn commit(&self, event: &Event) -> Result<(), StoreError> {
        let mut events = self.events.write().unwrap_or_else(PoisonError::into_inner);
        match events.get_mut(&event.id) {
            Some(stored) => {
                *stored = event.clone();
                Ok(())
            }
            None => Err(StoreError::UnknownEvent(event.id)),
        }
    }

    fn event_ids(&self) -> Result<Vec<EventId>, StoreError> {
        let mut ids: Vec<EventId> = self
            .events
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .copied()
            .collect();
        ids.sort();
        Ok(ids)
    }
}

/// One pretty-printed JSON file per event, named `<event id>.json`
#[derive(Debug, Clone)]
pub struct JsonDirStore {
    dir: PathBuf,
}

impl JsonDirStore {
    /// Open (and create if needed) a store directory
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, id: EventId) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    /// Write to a temporary file first so readers never see a torn record
    fn write(&self, event: &Event) -> Result<(), StoreError> {
        let path = self.path_for(event.id);
        let json = serde_json::to_string_pretty(event).map_err(|source| StoreError::Json {
            path: path.clone(),
            source,
        })?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|source| StoreError::Io {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &path).map_err(|source| StoreError::Io { path, source })
    }
}

impl RecordStore for JsonDirStore {
    fn insert(&self, event: &Event) -> Result<(), StoreError> {
        if self.path_for(event.id).exists() {
            return Err(StoreError::DuplicateEvent(event.id));
        }
        self.write(event)
    }

    fn load(&self, id: EventId) -> Result<Event, StoreError> {
        let path = self.path_for(id);
        match read_event(&path) {
            Err(StoreError::Io { source, .. }) if source.kind() == ErrorKind::NotFound => {
                Err(StoreError::UnknownEvent(id))
            }
            other => other,
        }
    }

    fn commit(&self, event: &Event) -> Result<(), StoreError> {
        if !self.path_for(event.id).exists() {
            return Err(StoreError::UnknownEvent(event.id));
        }
        self.write(event)
    }

    fn event_ids(&self) -> Result<Vec<EventId>, StoreError> {
        let entries = fs::read_dir(&self.dir).map_err(|source| StoreError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| StoreError::Io {
                path: self.dir.clone(),
                source,
            })?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                let parsed = path
                    .file_stem()
                    .and_then(|stem| stem.to_str())
                    .and_then(|stem| Uuid::parse_str(stem).ok());
                if let Some(uuid) = parsed {
                    ids.push(EventId(uuid));
                }
            }
        }
        ids.sort();
        Ok(ids)
    }
}

/// Read one event record from a JSON file
pub fn read_event(path: &Path) -> Result<Event, StoreError> {
    let contents = fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod store_tests;
