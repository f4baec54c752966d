pub mod infra;
pub mod request;

pub use request::{ApiError, HttpRequestClient, Request, RequestClient};
