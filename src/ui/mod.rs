pub mod app;
pub mod calendar_window;
pub mod command;
pub mod context;

pub use calendar_window::{MonthPane, StatusBar, YearWindow};
pub use context::{Context, Mode, Theme};
