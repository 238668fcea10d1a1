pub mod api;
pub mod health;
pub mod monitoring;
pub mod users;
