pub mod biz;
pub mod data;
pub mod error;
pub mod server;
pub mod service;

pub use error::UserError;

use anyhow::Result as AnyResult;

pub type Result<T> = AnyResult<T, UserError>;
