use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::date::DateKey;
use crate::error::{Error, ErrorKind, Result};

pub const STORAGE_KEY: &str = "shift_schedule_v1";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Shift {
    #[default]
    #[serde(rename = "")]
    None,
    #[serde(rename = "D")]
    Day,
    #[serde(rename = "E")]
    Evening,
    #[serde(rename = "N")]
    Night,
}

impl Shift {
    pub fn next(self) -> Self {
        match self {
            Shift::None => Shift::Day,
            Shift::Day => Shift::Evening,
            Shift::Evening => Shift::Night,
            Shift::Night => Shift::None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Shift::None => "",
            Shift::Day => "D",
            Shift::Evening => "E",
            Shift::Night => "N",
        }
    }

    /// Unknown codes read as no shift.
    pub fn from_code(code: &str) -> Self {
        match code {
            "D" => Shift::Day,
            "E" => Shift::Evening,
            "N" => Shift::Night,
            _ => Shift::None,
        }
    }
}

impl fmt::Display for Shift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shift::None => write!(f, "empty"),
            other => write!(f, "{}", other.code()),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct DayRecord {
    pub shift: Shift,
    pub holiday: bool,
    pub vacation: bool,
}

// Records are only checked shallowly: missing or mistyped fields fall back
// to their defaults instead of rejecting the whole schedule.
impl From<Value> for DayRecord {
    fn from(value: Value) -> Self {
        DayRecord {
            shift: value
                .get("shift")
                .and_then(Value::as_str)
                .map(Shift::from_code)
                .unwrap_or_default(),
            holiday: value.get("holiday").and_then(Value::as_bool).unwrap_or(false),
            vacation: value.get("vacation").and_then(Value::as_bool).unwrap_or(false),
        }
    }
}

pub type Records = BTreeMap<DateKey, DayRecord>;

/// Shallow structural check shared by loading and importing: the document
/// must be a JSON object, its values are taken as day records.
pub fn records_from_str(s: &str) -> Result<Records> {
    let value: Value = serde_json::from_str(s)?;

    match value {
        Value::Object(map) => Ok(map
            .into_iter()
            .map(|(key, record)| (DateKey::unchecked(key), DayRecord::from(record)))
            .collect()),
        other => Err(Error::new(
            ErrorKind::ImportSchema,
            &format!("expected an object of day records, found {}", kind_of(&other)),
        )),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Persistent key-value slot holding the serialized schedule.
pub trait Storage {
    fn read(&self) -> Result<Option<String>>;
    fn write(&mut self, blob: &str) -> Result<()>;
}

pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: &Path) -> Self {
        FileStorage {
            path: path.to_owned(),
        }
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join("shiftcal").join(format!("{}.json", STORAGE_KEY)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Storage for FileStorage {
    fn read(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }

        Ok(Some(fs::read_to_string(&self.path)?))
    }

    fn write(&mut self, blob: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(&self.path, blob)?;
        Ok(())
    }
}

/// In-memory storage whose handles share one slot, so a clone kept outside
/// the schedule observes every write.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    blob: Rc<RefCell<Option<String>>>,
    writes: Rc<Cell<usize>>,
}

impl MemoryStorage {
    pub fn with_blob(blob: &str) -> Self {
        let storage = MemoryStorage::default();
        storage.blob.replace(Some(blob.to_owned()));
        storage
    }

    pub fn blob(&self) -> Option<String> {
        self.blob.borrow().clone()
    }

    pub fn writes(&self) -> usize {
        self.writes.get()
    }
}

impl Storage for MemoryStorage {
    fn read(&self) -> Result<Option<String>> {
        Ok(self.blob())
    }

    fn write(&mut self, blob: &str) -> Result<()> {
        self.blob.replace(Some(blob.to_owned()));
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}

/// Day records of every observed date, written through to a [`Storage`] on
/// every mutation.
pub struct Schedule {
    records: Records,
    storage: Box<dyn Storage>,
}

impl Schedule {
    pub fn new(storage: Box<dyn Storage>) -> Self {
        Schedule {
            records: Records::new(),
            storage,
        }
    }

    /// Creates a schedule hydrated from `storage`. Failures leave it empty.
    pub fn load_from(storage: Box<dyn Storage>) -> Self {
        let mut schedule = Schedule::new(storage);
        schedule.load();
        schedule
    }

    pub fn load(&mut self) {
        if let Err(e) = self.try_load() {
            log::error!("Failed to load schedule: {}", e);
        }
    }

    pub fn try_load(&mut self) -> Result<()> {
        let blob = match self.storage.read() {
            Ok(Some(blob)) => blob,
            Ok(None) => return Ok(()),
            Err(e) => return Err(Error::new(ErrorKind::PersistenceRead, &e.to_string())),
        };

        let records = records_from_str(&blob)
            .map_err(|e| Error::new(ErrorKind::PersistenceRead, &e.to_string()))?;

        log::debug!("Loaded {} day records", records.len());
        self.records = records;
        Ok(())
    }

    pub fn save(&mut self) {
        if let Err(e) = self.try_save() {
            log::error!("Failed to save schedule: {}", e);
        }
    }

    pub fn try_save(&mut self) -> Result<()> {
        let blob = self.to_json()?;
        self.storage
            .write(&blob)
            .map_err(|e| Error::new(ErrorKind::PersistenceWrite, &e.to_string()))
    }

    pub fn get(&self, key: &DateKey) -> Option<&DayRecord> {
        self.records.get(key)
    }

    /// Returns the record for `key`, creating and persisting a default one
    /// when the day has not been observed before.
    pub fn get_or_create(&mut self, key: &DateKey) -> DayRecord {
        if let Some(record) = self.records.get(key) {
            return *record;
        }

        log::trace!("Materializing {}", key);
        self.records.insert(key.clone(), DayRecord::default());
        self.save();
        DayRecord::default()
    }

    pub fn set(&mut self, key: &DateKey, record: DayRecord) {
        self.records.insert(key.clone(), record);
        self.save();
    }

    /// Drops every record and takes `records` instead, then persists.
    pub fn replace_all(&mut self, records: Records) {
        self.records = records;
        self.save();
    }

    pub fn records(&self) -> &Records {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.records)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.records)?)
    }
}
