use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::store::{self, Records, Schedule};

pub const EXPORT_PREFIX: &str = "shift-schedule";

pub fn export_file_name(date: NaiveDate) -> String {
    format!("{}-{}.json", EXPORT_PREFIX, date.format("%Y-%m-%d"))
}

/// Pretty-printed document of the whole schedule.
pub fn export(schedule: &Schedule) -> Result<String> {
    schedule.to_json_pretty()
}

pub fn export_to_dir(schedule: &Schedule, dir: &Path, date: NaiveDate) -> Result<PathBuf> {
    let path = dir.join(export_file_name(date));
    fs::create_dir_all(dir)?;
    fs::write(&path, export(schedule)?)?;

    log::info!(
        "Exported {} day records to '{}'",
        schedule.len(),
        path.display()
    );
    Ok(path)
}

/// Parses an exported document. Only the top level is checked: it has to be
/// an object, individual records are taken as they come.
pub fn import(contents: &str) -> Result<Records> {
    store::records_from_str(contents)
}

pub fn read_import_file(path: &Path) -> Result<String> {
    Ok(fs::read_to_string(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date::DateKey;
    use crate::error::ErrorKind;
    use crate::store::{DayRecord, MemoryStorage, Shift};

    fn sample_schedule(storage: &MemoryStorage) -> Schedule {
        let mut schedule = Schedule::new(Box::new(storage.clone()));
        schedule.set(
            &DateKey::new(2024, 0, 1),
            DayRecord {
                shift: Shift::Day,
                holiday: true,
                vacation: false,
            },
        );
        schedule.set(
            &DateKey::new(2024, 0, 2),
            DayRecord {
                shift: Shift::None,
                holiday: false,
                vacation: true,
            },
        );
        schedule.get_or_create(&DateKey::new(2024, 0, 3));
        schedule
    }

    #[test]
    fn file_name_embeds_date() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(export_file_name(date), "shift-schedule-2024-01-05.json");
    }

    #[test]
    fn export_then_import_is_identity() {
        let storage = MemoryStorage::default();
        let schedule = sample_schedule(&storage);
        let writes = storage.writes();

        let text = export(&schedule).unwrap();
        assert_eq!(storage.writes(), writes);

        assert_eq!(&import(&text).unwrap(), schedule.records());
    }

    #[test]
    fn export_is_pretty_printed() {
        let storage = MemoryStorage::default();
        let text = export(&sample_schedule(&storage)).unwrap();

        assert!(text.contains("\n  \"2024-01-01\": {\n    \"shift\": \"D\""));
        assert!(text.contains("\"shift\": \"\""));
    }

    #[test]
    fn import_rejects_non_objects() {
        assert!(matches!(
            import("[]").unwrap_err().kind,
            ErrorKind::ImportSchema
        ));
        assert!(matches!(
            import("not json").unwrap_err().kind,
            ErrorKind::ImportParse
        ));
    }

    #[test]
    fn exported_file_can_be_imported() {
        let storage = MemoryStorage::default();
        let schedule = sample_schedule(&storage);
        let dir = tempfile::tempdir().unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();

        let path = export_to_dir(&schedule, dir.path(), date).unwrap();
        let records = import(&read_import_file(&path).unwrap()).unwrap();
        assert_eq!(&records, schedule.records());
    }
}
