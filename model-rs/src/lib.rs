pub mod menu;
pub mod weekday;

pub use menu::{MenuItem, WeekMenu};
pub use weekday::{UnknownWeekday, Weekday};
