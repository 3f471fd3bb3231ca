pub mod matrix;
pub mod model;
pub mod reports;
pub mod rules;
pub mod week;

pub use matrix::*;
pub use model::*;
pub use reports::*;
pub use rules::*;
pub use week::*;

use time::Date;

// Wire format for calendar dates exchanged with the backend ("YYYY-MM-DD").
time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");
