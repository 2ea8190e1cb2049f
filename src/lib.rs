pub mod backup;
pub mod config;
pub mod control;
pub mod date;
pub mod error;
pub mod events;
pub mod print;
pub mod render;
pub mod store;
pub mod ui;
