use chrono::NaiveDate;
use std::path::{Path, PathBuf};

use crate::backup;
use crate::config::Density;
use crate::date::DateKey;
use crate::error::{Error, ErrorKind, Result};
use crate::render::{self, CalendarYear, CellPos};
use crate::store::{DayRecord, Schedule, Shift};

pub const MIN_YEAR: i32 = 1900;
pub const MAX_YEAR: i32 = 2100;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gesture {
    Primary,
    Secondary,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub alt: bool,
}

impl Modifiers {
    pub fn alt() -> Self {
        Modifiers { alt: true }
    }
}

/// The axis a gesture changed, with its new value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Change {
    Shift(Shift),
    Vacation(bool),
    Holiday(bool),
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "ON"
    } else {
        "OFF"
    }
}

impl Change {
    pub fn status_message(&self, key: &DateKey) -> String {
        match self {
            Change::Shift(shift) => format!("{} shift set to {}.", key, shift),
            Change::Vacation(on) => format!("{} vacation: {}.", key, on_off(*on)),
            Change::Holiday(on) => format!("{} holiday: {}.", key, on_off(*on)),
        }
    }
}

/// Applies one gesture to a record. Exactly one axis changes per call: a
/// modified primary gesture toggles vacation and leaves the shift alone.
pub fn apply_gesture(record: DayRecord, gesture: Gesture, modifiers: Modifiers) -> (DayRecord, Change) {
    let mut record = record;
    let change = match (gesture, modifiers.alt) {
        (Gesture::Primary, true) => {
            record.vacation = !record.vacation;
            Change::Vacation(record.vacation)
        }
        (Gesture::Primary, false) => {
            record.shift = record.shift.next();
            Change::Shift(record.shift)
        }
        (Gesture::Secondary, _) => {
            record.holiday = !record.holiday;
            Change::Holiday(record.holiday)
        }
    };

    (record, change)
}

pub fn handle_interaction(
    gesture: Gesture,
    key: &DateKey,
    modifiers: Modifiers,
    record: DayRecord,
) -> (DayRecord, String) {
    let (record, change) = apply_gesture(record, gesture, modifiers);
    (record, change.status_message(key))
}

/// The whole trimmed input must be a number: trailing garbage such as
/// `2024abc` or `2024.5` is rejected rather than truncated to its prefix.
pub fn parse_year(input: &str) -> Result<i32> {
    match input.trim().parse::<i32>() {
        Ok(year) if (MIN_YEAR..=MAX_YEAR).contains(&year) => Ok(year),
        _ => Err(Error::new(
            ErrorKind::InputValidation,
            &format!("Enter a valid year between {} and {}.", MIN_YEAR, MAX_YEAR),
        )),
    }
}

/// Single writer of the schedule: owns it together with the displayed year
/// and keeps both in sync.
pub struct Controller {
    schedule: Schedule,
    calendar: CalendarYear,
    today: DateKey,
    density: Density,
    status: Option<String>,
}

impl Controller {
    pub fn new(mut schedule: Schedule, year: i32, today: DateKey) -> Self {
        let calendar = render::render_year(year, &schedule, &today);
        for key in calendar.keys() {
            schedule.get_or_create(key);
        }

        Controller {
            schedule,
            calendar,
            today,
            density: Density::default(),
            status: None,
        }
    }

    pub fn with_density(mut self, density: Density) -> Self {
        self.density = density;
        self
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn calendar(&self) -> &CalendarYear {
        &self.calendar
    }

    pub fn year(&self) -> i32 {
        self.calendar.year
    }

    pub fn today(&self) -> &DateKey {
        &self.today
    }

    pub fn density(&self) -> Density {
        self.density
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn set_status(&mut self, status: String) {
        log::debug!("{}", status);
        self.status = Some(status);
    }

    /// Rebuilds the whole year. Every displayed day is observed, so missing
    /// records get materialized, each one persisted as it is created.
    fn render(&mut self, year: i32) {
        let calendar = render::render_year(year, &self.schedule, &self.today);
        for key in calendar.keys() {
            self.schedule.get_or_create(key);
        }
        self.calendar = calendar;
    }

    /// Applies a gesture to the day under `pos` and returns the status
    /// message. Empty cells are ignored.
    pub fn interact(&mut self, pos: CellPos, gesture: Gesture, modifiers: Modifiers) -> Option<String> {
        let key = self.calendar.key_at(pos)?.clone();
        Some(self.interact_key(&key, gesture, modifiers))
    }

    pub fn interact_date(&mut self, date: NaiveDate, gesture: Gesture, modifiers: Modifiers) -> Option<String> {
        let pos = self.calendar.position_of(&DateKey::from(date))?;
        self.interact(pos, gesture, modifiers)
    }

    fn interact_key(&mut self, key: &DateKey, gesture: Gesture, modifiers: Modifiers) -> String {
        let record = self.schedule.get_or_create(key);
        let (record, status) = handle_interaction(gesture, key, modifiers, record);

        self.schedule.set(key, record);
        self.calendar.refresh(key, &record);
        self.set_status(status.clone());
        status
    }

    pub fn apply_year(&mut self, input: &str) -> Result<i32> {
        match parse_year(input) {
            Ok(year) => {
                self.show_year(year);
                Ok(year)
            }
            Err(e) => {
                self.set_status(e.message.clone().unwrap_or_else(|| e.kind.as_str()));
                Err(e)
            }
        }
    }

    pub fn step_year(&mut self, delta: i32) -> Result<i32> {
        self.apply_year(&(self.year() + delta).to_string())
    }

    fn show_year(&mut self, year: i32) {
        log::info!("Showing year {}", year);
        self.render(year);
        self.set_status(format!("Showing year {}.", year));
    }

    pub fn set_density(&mut self, density: Density) {
        self.density = density;
        self.set_status(format!("Size set to {}.", density));
    }

    pub fn export(&mut self, dir: &Path, date: NaiveDate) -> Result<PathBuf> {
        match backup::export_to_dir(&self.schedule, dir, date) {
            Ok(path) => {
                self.set_status(format!("Schedule exported as JSON to {}.", path.display()));
                Ok(path)
            }
            Err(e) => {
                log::error!("Export failed: {}", e);
                self.set_status("Error: export failed.".to_owned());
                Err(e)
            }
        }
    }

    /// Completion of a file import: replaces the schedule on success and
    /// redraws the displayed year, leaves everything untouched otherwise.
    pub fn import(&mut self, contents: Result<String>) -> Result<usize> {
        let result = contents.and_then(|text| backup::import(&text));

        match result {
            Ok(records) => {
                let count = records.len();
                self.schedule.replace_all(records);
                let year = self.year();
                self.render(year);
                log::info!("Imported {} day records", count);
                self.set_status("Schedule imported successfully.".to_owned());
                Ok(count)
            }
            Err(e) => {
                log::error!("Import failed: {}", e);
                let status = match e.kind {
                    ErrorKind::ImportSchema => "Error: invalid schedule file.",
                    _ => "Error: import failed.",
                };
                self.set_status(status.to_owned());
                Err(e)
            }
        }
    }
}
