pub mod app;
pub mod picker;

pub use app::{picker_rows, App, PickerRow};
