mod cost;
mod directory;
mod ids;
mod money;
mod time_entry;

pub use cost::*;
pub use directory::*;
pub use ids::*;
pub use money::*;
pub use time_entry::*;
