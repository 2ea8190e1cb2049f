use std::convert::TryFrom;
use std::fmt::Write;
use unsegen::base::*;
use unsegen::widget::*;

use crate::date::DateKey;
use crate::render::{DayCell, GridCell, MonthGrid, WEEKDAY_NAMES};
use crate::store::Shift;

use super::{Context, Theme};

/// Today is bold and vacation underlined, both at once when they coincide.
fn text_format(cell: &DayCell) -> TextFormatModifier {
    let mut format = TextFormatModifier::default();
    if cell.today {
        format = format.bold(true);
    }
    if cell.vacation {
        format = format.underline(true);
    }
    format
}

fn cell_style(cell: &DayCell, selected: bool, theme: &Theme) -> StyleModifier {
    let mut style = match cell.shift {
        Shift::None => theme.day_style,
        Shift::Day => theme.day_shift_style,
        Shift::Evening => theme.evening_shift_style,
        Shift::Night => theme.night_shift_style,
    };

    if cell.holiday {
        style = style.bg_color(theme.holiday_color);
    }

    style = style.format(text_format(cell));

    if selected {
        style = style.invert(true);
    }

    style
}

pub struct MonthPane<'a> {
    grid: &'a MonthGrid,
    selected: Option<DateKey>,
    context: &'a Context,
}

impl<'a> MonthPane<'a> {
    const HEADER_ROWS: usize = 2;

    pub fn new(grid: &'a MonthGrid, context: &'a Context) -> Self {
        let cursor_key = context.cursor_key();
        let selected = grid
            .day_cells()
            .find(|cell| cell.key == cursor_key)
            .map(|cell| cell.key.clone());

        MonthPane {
            grid,
            selected,
            context,
        }
    }
}

impl Widget for MonthPane<'_> {
    fn space_demand(&self) -> Demand2D {
        let cell_width = self.context.density().cell_width();
        Demand2D {
            width: ColDemand::exact(MonthGrid::COLUMNS * cell_width),
            height: RowDemand::exact(Self::HEADER_ROWS + MonthGrid::ROWS),
        }
    }

    fn draw(&self, mut window: Window, _hints: RenderingHints) {
        let theme = &self.context.theme;
        let density = self.context.density();
        let width = density.cell_width();

        let mut cursor = Cursor::new(&mut window)
            .wrapping_mode(WrappingMode::NoWrap)
            .style_modifier(theme.month_header_style);

        if let Err(err) = write!(
            &mut cursor,
            "{:^w$}",
            self.grid.title(),
            w = width * MonthGrid::COLUMNS
        ) {
            log::warn!("Error while writing month title: {}", err);
        }

        cursor.move_to(ColIndex::new(0), RowIndex::new(1));
        cursor.set_style_modifier(theme.weekday_header_style);
        for &head in WEEKDAY_NAMES.iter() {
            let _ = write!(&mut cursor, "{:>w$}", head, w = width);
        }

        for (week_idx, week) in self.grid.weeks().enumerate() {
            cursor.move_to(
                ColIndex::new(0),
                RowIndex::new((Self::HEADER_ROWS + week_idx) as i32),
            );

            for cell in week {
                match cell {
                    GridCell::Empty => {
                        cursor.set_style_modifier(theme.day_style);
                        let _ = write!(&mut cursor, "{:w$}", "", w = width);
                    }
                    GridCell::Day(day) => {
                        let selected = self.selected.as_ref() == Some(&day.key);
                        cursor.set_style_modifier(cell_style(day, selected, theme));
                        let _ = write!(&mut cursor, "{:>w$}", day.label(density), w = width);
                    }
                }
            }
        }
    }
}

/// All twelve months of the displayed year, in rows sized by the density.
pub struct YearWindow<'a> {
    context: &'a Context,
}

impl<'a> YearWindow<'a> {
    pub fn new(context: &'a Context) -> Self {
        YearWindow { context }
    }
}

impl Widget for YearWindow<'_> {
    fn space_demand(&self) -> Demand2D {
        let density = self.context.density();
        let per_row = density.months_per_row();
        let rows = (12 + per_row - 1) / per_row;

        Demand2D {
            width: ColDemand::at_least(per_row * (MonthGrid::COLUMNS * density.cell_width() + 1)),
            height: RowDemand::at_least(rows * (MonthPane::HEADER_ROWS + MonthGrid::ROWS + 1)),
        }
    }

    fn draw(&self, window: Window, hints: RenderingHints) {
        let per_row = self.context.density().months_per_row();
        let calendar = self.context.controller().calendar();

        let mut layout = VLayout::new();
        for row in calendar.months().chunks(per_row) {
            let mut line = HLayout::new().separator(GraphemeCluster::try_from(' ').unwrap());
            for grid in row {
                line = line.widget(MonthPane::new(grid, self.context));
            }
            layout = layout.widget(line);
        }

        layout.draw(window, hints);
    }
}

/// Displayed year, density and the last status message.
pub struct StatusBar<'a> {
    context: &'a Context,
}

impl<'a> StatusBar<'a> {
    pub fn new(context: &'a Context) -> Self {
        StatusBar { context }
    }
}

impl Widget for StatusBar<'_> {
    fn space_demand(&self) -> Demand2D {
        Demand2D {
            width: ColDemand::at_least(1),
            height: RowDemand::exact(1),
        }
    }

    fn draw(&self, mut window: Window, _hints: RenderingHints) {
        let controller = self.context.controller();
        let mut cursor = Cursor::new(&mut window).style_modifier(self.context.theme.status_style);

        let status = controller.status().unwrap_or("");
        let _ = write!(
            &mut cursor,
            " {} [{}] {}",
            controller.year(),
            controller.density(),
            status
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(today: bool, vacation: bool) -> DayCell {
        DayCell {
            day: 14,
            key: DateKey::new(2024, 1, 14),
            shift: Shift::None,
            holiday: false,
            vacation,
            today,
        }
    }

    #[test]
    fn today_and_vacation_formats_combine() {
        assert_eq!(
            text_format(&cell(true, true)),
            TextFormatModifier::default().bold(true).underline(true)
        );
        assert_eq!(
            text_format(&cell(false, true)),
            TextFormatModifier::default().underline(true)
        );
        assert_eq!(
            text_format(&cell(true, false)),
            TextFormatModifier::default().bold(true)
        );
        assert_eq!(text_format(&cell(false, false)), TextFormatModifier::default());
    }
}
