use chrono::Month;

use crate::config::Density;
use crate::date::{self, DateKey};
use crate::store::{DayRecord, Schedule, Shift};

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

pub const WEEKDAY_NAMES: [&str; 7] = ["S", "M", "T", "W", "T", "F", "S"];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DayCell {
    pub day: u32,
    pub key: DateKey,
    pub shift: Shift,
    pub holiday: bool,
    pub vacation: bool,
    pub today: bool,
}

impl DayCell {
    fn new(day: u32, key: DateKey, record: &DayRecord, today: &DateKey) -> Self {
        let mut cell = DayCell {
            day,
            today: &key == today,
            key,
            shift: Shift::None,
            holiday: false,
            vacation: false,
        };
        cell.refresh(record);
        cell
    }

    /// Re-derives the visual flags from `record`.
    pub fn refresh(&mut self, record: &DayRecord) {
        self.shift = record.shift;
        self.holiday = record.holiday;
        self.vacation = record.vacation;
    }

    /// Text of the cell. Every density carries the shift code and the
    /// holiday, vacation and today markers, only the spacing differs.
    pub fn label(&self, density: Density) -> String {
        let shift = if self.shift == Shift::None {
            " "
        } else {
            self.shift.code()
        };
        let holiday = if self.holiday { "H" } else { " " };
        let vacation = if self.vacation { "V" } else { " " };
        let today = if self.today { "*" } else { " " };

        match density {
            Density::Small => format!("{:>2}{}{}{}{}", self.day, shift, holiday, vacation, today),
            Density::Medium => format!(
                "{}{:>2} {} {}{}",
                today, self.day, shift, holiday, vacation
            ),
            Density::Large => format!(
                "{}{:>2} [{}] {} {}",
                today, self.day, shift, holiday, vacation
            ),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GridCell {
    Empty,
    Day(DayCell),
}

impl GridCell {
    pub fn day(&self) -> Option<&DayCell> {
        match self {
            GridCell::Day(cell) => Some(cell),
            GridCell::Empty => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, GridCell::Empty)
    }
}

/// Position of a cell inside a [`CalendarYear`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellPos {
    pub month0: usize,
    pub week: usize,
    pub col: usize,
}

impl CellPos {
    pub fn new(month0: usize, week: usize, col: usize) -> Self {
        CellPos { month0, week, col }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MonthGrid {
    pub year: i32,
    pub month: Month,
    pub first_weekday: u32,
    pub days_in_month: u32,
    cells: Vec<GridCell>,
}

impl MonthGrid {
    pub const COLUMNS: usize = 7;
    pub const ROWS: usize = 6;

    pub fn title(&self) -> String {
        let name = MONTH_NAMES[self.month.number_from_month() as usize - 1];
        format!("{} {}", name, self.year)
    }

    pub fn cell(&self, week: usize, col: usize) -> Option<&GridCell> {
        if week >= Self::ROWS || col >= Self::COLUMNS {
            return None;
        }
        self.cells.get(week * Self::COLUMNS + col)
    }

    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    pub fn weeks(&self) -> impl Iterator<Item = &[GridCell]> {
        self.cells.chunks(Self::COLUMNS)
    }

    pub fn day_cells(&self) -> impl Iterator<Item = &DayCell> {
        self.cells.iter().filter_map(GridCell::day)
    }

    /// Number of rows holding at least one day.
    pub fn used_weeks(&self) -> usize {
        self.weeks()
            .filter(|week| week.iter().any(|cell| !cell.is_empty()))
            .count()
    }

    fn position_of_day(&self, day: u32) -> Option<(usize, usize)> {
        if day == 0 || day > self.days_in_month {
            return None;
        }
        let idx = (self.first_weekday + day - 1) as usize;
        Some((idx / Self::COLUMNS, idx % Self::COLUMNS))
    }
}

/// Lays out one month. Reads the schedule without materializing anything.
pub fn render_month(year: i32, month0: u32, schedule: &Schedule, today: &DateKey) -> MonthGrid {
    let month = date::month_of(month0);
    let first_weekday = date::first_weekday(&month, year);
    let days_in_month = date::days_of_month(&month, year);

    let mut cells = Vec::with_capacity(MonthGrid::ROWS * MonthGrid::COLUMNS);
    let mut current_day = 1;

    for week in 0..MonthGrid::ROWS {
        for col in 0..MonthGrid::COLUMNS {
            if (week == 0 && (col as u32) < first_weekday) || current_day > days_in_month {
                cells.push(GridCell::Empty);
                continue;
            }

            let key = DateKey::new(year, month0, current_day);
            let record = schedule.get(&key).copied().unwrap_or_default();
            cells.push(GridCell::Day(DayCell::new(current_day, key, &record, today)));
            current_day += 1;
        }
    }

    MonthGrid {
        year,
        month,
        first_weekday,
        days_in_month,
        cells,
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CalendarYear {
    pub year: i32,
    months: Vec<MonthGrid>,
}

pub fn render_year(year: i32, schedule: &Schedule, today: &DateKey) -> CalendarYear {
    CalendarYear {
        year,
        months: (0..12)
            .map(|month0| render_month(year, month0, schedule, today))
            .collect(),
    }
}

impl CalendarYear {
    pub fn months(&self) -> &[MonthGrid] {
        &self.months
    }

    pub fn cell(&self, pos: CellPos) -> Option<&GridCell> {
        self.months.get(pos.month0)?.cell(pos.week, pos.col)
    }

    /// Date key behind a grid position, `None` for empty cells.
    pub fn key_at(&self, pos: CellPos) -> Option<&DateKey> {
        self.cell(pos)?.day().map(|cell| &cell.key)
    }

    pub fn position_of(&self, key: &DateKey) -> Option<CellPos> {
        let (year, month0, day) = key.ymd().ok()?;
        if year != self.year {
            return None;
        }
        let (week, col) = self.months.get(month0 as usize)?.position_of_day(day)?;
        Some(CellPos::new(month0 as usize, week, col))
    }

    pub fn keys(&self) -> impl Iterator<Item = &DateKey> {
        self.months
            .iter()
            .flat_map(|month| month.day_cells())
            .map(|cell| &cell.key)
    }

    /// Updates a single cell from its record without touching the rest of
    /// the grid. Returns false when `key` is not displayed.
    pub fn refresh(&mut self, key: &DateKey, record: &DayRecord) -> bool {
        let pos = match self.position_of(key) {
            Some(pos) => pos,
            None => return false,
        };

        let idx = pos.week * MonthGrid::COLUMNS + pos.col;
        match self.months[pos.month0].cells.get_mut(idx) {
            Some(GridCell::Day(cell)) => {
                cell.refresh(record);
                true
            }
            _ => false,
        }
    }
}
