mod connection;
mod migrations;
mod queries;

pub use connection::Database;
pub use queries::{RecentLocation, MAX_RECENT_LOCATIONS};
