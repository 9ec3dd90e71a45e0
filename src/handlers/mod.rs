pub mod auth;
pub mod chat;
pub mod emotions;
pub mod entries;
pub mod health;
pub mod insights;
pub mod map;
pub mod stats;

use serde::Serialize;

/// Standard success envelope for the dashboard endpoints.
#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}
