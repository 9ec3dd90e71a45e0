pub mod emotion;
pub mod entry;
pub mod user;
pub mod weather;
