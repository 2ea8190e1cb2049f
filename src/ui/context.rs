use chrono::{Datelike, Local, NaiveDate};
use std::path::PathBuf;
use std::sync::mpsc;

use unsegen::base::style::*;
use unsegen::widget::builtin::PromptLine;

use crate::backup;
use crate::config::{Config, Density};
use crate::control::{Controller, Gesture, Modifiers};
use crate::date::{self, DateKey};
use crate::events::{self, Event};
use crate::print;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Command,
}

#[derive(Clone, Debug)]
pub struct Theme {
    pub day_style: StyleModifier,
    pub holiday_color: Color,
    pub day_shift_style: StyleModifier,
    pub evening_shift_style: StyleModifier,
    pub night_shift_style: StyleModifier,
    pub month_header_style: StyleModifier,
    pub weekday_header_style: StyleModifier,
    pub status_style: StyleModifier,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            day_style: StyleModifier::default(),
            holiday_color: Color::Red,
            day_shift_style: StyleModifier::default().fg_color(Color::Yellow),
            evening_shift_style: StyleModifier::default().fg_color(Color::Magenta),
            night_shift_style: StyleModifier::default().fg_color(Color::LightBlue),
            month_header_style: StyleModifier::default().fg_color(Color::Yellow),
            weekday_header_style: StyleModifier::default().fg_color(Color::LightBlack),
            status_style: StyleModifier::default().fg_color(Color::Cyan),
        }
    }
}

pub struct Context {
    pub mode: Mode,
    pub theme: Theme,
    pub cursor: NaiveDate,
    pub command_line: PromptLine,
    pub quit: bool,
    controller: Controller,
    export_dir: PathBuf,
    event_sink: Option<mpsc::Sender<Event>>,
}

impl Context {
    pub fn new(config: &Config, controller: Controller) -> Self {
        let cursor = initial_cursor(controller.year(), controller.today());
        Context {
            mode: Mode::Normal,
            theme: Theme::default(),
            cursor,
            command_line: PromptLine::with_prompt(":".to_owned()),
            quit: false,
            controller,
            export_dir: config.export_dir(),
            event_sink: None,
        }
    }

    pub fn set_event_sink(&mut self, sink: mpsc::Sender<Event>) {
        self.event_sink = Some(sink);
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut Controller {
        &mut self.controller
    }

    pub fn density(&self) -> Density {
        self.controller.density()
    }

    pub fn cursor_key(&self) -> DateKey {
        DateKey::from(self.cursor)
    }

    pub fn cursor(&self) -> &NaiveDate {
        &self.cursor
    }

    /// Moves the cursor if the target stays within the displayed year.
    pub fn move_cursor(&mut self, days: i64) -> bool {
        match self.cursor.checked_add_signed(chrono::Duration::days(days)) {
            Some(date) if date.year() == self.controller.year() => {
                self.cursor = date;
                true
            }
            _ => false,
        }
    }

    pub fn select_today(&mut self) {
        self.cursor = initial_cursor(self.controller.year(), self.controller.today());
    }

    /// Keeps month and day of the cursor when the displayed year changes.
    fn follow_year(&mut self) {
        let year = self.controller.year();
        if self.cursor.year() == year {
            return;
        }

        let month = date::month_of(self.cursor.month0());
        let day = self.cursor.day().min(date::days_of_month(&month, year));
        self.cursor = NaiveDate::from_ymd_opt(year, self.cursor.month(), day)
            .unwrap_or_else(|| initial_cursor(year, self.controller.today()));
    }

    pub fn gesture(&mut self, gesture: Gesture, modifiers: Modifiers) {
        let cursor = self.cursor;
        if self.controller.interact_date(cursor, gesture, modifiers).is_none() {
            log::debug!("No day under the cursor at {}", cursor);
        }
    }

    pub fn apply_year(&mut self, input: &str) {
        if self.controller.apply_year(input).is_ok() {
            self.follow_year();
        }
    }

    pub fn step_year(&mut self, delta: i32) {
        if self.controller.step_year(delta).is_ok() {
            self.follow_year();
        }
    }

    pub fn set_density(&mut self, density: Density) {
        self.controller.set_density(density);
    }

    pub fn export(&mut self, dir: Option<PathBuf>) {
        let dir = dir.unwrap_or_else(|| self.export_dir.clone());
        // failures are reported on the status line by the controller
        let _ = self.controller.export(&dir, Local::now().date_naive());
    }

    /// Starts reading `path` in the background when an event loop is
    /// attached, otherwise imports right away.
    pub fn import(&mut self, path: PathBuf) {
        match &self.event_sink {
            Some(sink) => {
                self.controller
                    .set_status(format!("Importing {}...", path.display()));
                events::spawn_import(path, sink.clone());
            }
            None => {
                let contents = backup::read_import_file(&path);
                self.finish_import(contents);
            }
        }
    }

    pub fn finish_import(&mut self, contents: crate::error::Result<String>) {
        let _ = self.controller.import(contents);
    }

    pub fn print(&mut self, path: Option<PathBuf>) {
        let path = path.unwrap_or_else(|| {
            self.export_dir
                .join(format!("{}-{}.txt", backup::EXPORT_PREFIX, self.controller.year()))
        });

        let status = match print::print_to_file(
            self.controller.calendar(),
            self.controller.density(),
            &path,
        ) {
            Ok(()) => format!("Printed {} to {}.", self.controller.year(), path.display()),
            Err(e) => {
                log::error!("Print failed: {}", e);
                "Error: print failed.".to_owned()
            }
        };
        self.controller.set_status(status);
    }
}

fn initial_cursor(year: i32, today: &DateKey) -> NaiveDate {
    today
        .to_naive_date()
        .filter(|date| date.year() == year)
        .or_else(|| NaiveDate::from_ymd_opt(year, 1, 1))
        .unwrap_or(NaiveDate::MIN)
}
