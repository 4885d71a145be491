pub mod error;
pub mod gateway;
pub mod models;
pub mod timestamp;

pub use error::ApiError;
pub use gateway::{ApiResponse, Gateway, StateEnvelope};
