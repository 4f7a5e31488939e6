//! Request handlers

pub mod health;
pub mod notes;
pub mod reports;
pub mod search;
pub mod words;

use serde::Serialize;

/// Success envelope wrapping handler payloads
#[derive(Serialize)]
pub struct SuccessResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> SuccessResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}
