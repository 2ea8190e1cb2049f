use itertools::Itertools;
use std::fs;
use std::path::Path;

use crate::config::Density;
use crate::error::Result;
use crate::render::{CalendarYear, GridCell, MonthGrid, WEEKDAY_NAMES};

fn month_lines(grid: &MonthGrid, density: Density) -> Vec<String> {
    let width = density.cell_width();
    let mut lines = Vec::with_capacity(MonthGrid::ROWS + 2);

    lines.push(format!("{:^w$}", grid.title(), w = width * MonthGrid::COLUMNS));
    lines.push(
        WEEKDAY_NAMES
            .iter()
            .map(|name| format!("{:>w$}", name, w = width))
            .join(""),
    );

    for week in grid.weeks() {
        lines.push(
            week.iter()
                .map(|cell| match cell {
                    GridCell::Empty => " ".repeat(width),
                    GridCell::Day(day) => format!("{:>w$}", day.label(density), w = width),
                })
                .join(""),
        );
    }

    lines
}

/// Plain-text rendering of a whole year, months laid out side by side.
pub fn year_to_text(calendar: &CalendarYear, density: Density) -> String {
    let per_row = density.months_per_row();
    let gap = "  ";

    let mut out = String::new();
    for row in calendar.months().chunks(per_row) {
        let blocks: Vec<Vec<String>> = row.iter().map(|m| month_lines(m, density)).collect();
        let height = blocks.iter().map(Vec::len).max().unwrap_or(0);

        for line in 0..height {
            let text = blocks
                .iter()
                .map(|block| block.get(line).map(String::as_str).unwrap_or(""))
                .join(gap);
            out.push_str(text.trim_end());
            out.push('\n');
        }
        out.push('\n');
    }

    out.push_str("D = day  E = evening  N = night  H = holiday  V = vacation  * = today\n");
    out
}

pub fn print_to_file(calendar: &CalendarYear, density: Density, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, year_to_text(calendar, density))?;
    log::info!("Printed {} to '{}'", calendar.year, path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date::DateKey;
    use crate::render::render_year;
    use crate::store::{DayRecord, MemoryStorage, Schedule, Shift};

    #[test]
    fn text_contains_every_month_and_marks() {
        let mut schedule = Schedule::new(Box::new(MemoryStorage::default()));
        schedule.set(
            &DateKey::new(2024, 1, 29),
            DayRecord {
                shift: Shift::Night,
                holiday: true,
                vacation: true,
            },
        );
        let calendar = render_year(2024, &schedule, &DateKey::new(2024, 0, 1));

        let text = year_to_text(&calendar, Density::Medium);
        for name in crate::render::MONTH_NAMES.iter() {
            assert!(text.contains(&format!("{} 2024", name)), "{}", name);
        }
        assert!(text.contains("29 N HV"));
    }

    #[test]
    fn small_density_keeps_every_marker() {
        let mut schedule = Schedule::new(Box::new(MemoryStorage::default()));
        let leap_day = DateKey::new(2024, 1, 29);
        schedule.set(
            &leap_day,
            DayRecord {
                shift: Shift::Night,
                holiday: true,
                vacation: true,
            },
        );
        let calendar = render_year(2024, &schedule, &leap_day);

        let text = year_to_text(&calendar, Density::Small);
        assert!(text.contains("29NHV*"));
        let starred: usize = text
            .lines()
            .filter(|line| !line.contains('='))
            .map(|line| line.matches('*').count())
            .sum();
        assert_eq!(starred, 1);
    }

    #[test]
    fn rows_follow_density() {
        let schedule = Schedule::new(Box::new(MemoryStorage::default()));
        let calendar = render_year(2023, &schedule, &DateKey::new(2023, 0, 1));

        let title_lines = |density| {
            year_to_text(&calendar, density)
                .lines()
                .filter(|l| l.contains("2023"))
                .count()
        };

        assert_eq!(title_lines(Density::Small), 3);
        assert_eq!(title_lines(Density::Medium), 4);
        assert_eq!(title_lines(Density::Large), 6);
    }

    #[test]
    fn writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("2024.txt");
        let schedule = Schedule::new(Box::new(MemoryStorage::default()));
        let calendar = render_year(2024, &schedule, &DateKey::new(2024, 0, 1));

        print_to_file(&calendar, Density::Small, &path).unwrap();
        assert!(fs::read_to_string(&path).unwrap().starts_with(' '));
    }
}
