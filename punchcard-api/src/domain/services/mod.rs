mod reports;
mod time_tracking;

pub use reports::Reports;
pub use time_tracking::SessionTracker;
