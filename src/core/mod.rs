pub mod catalog;
pub mod etl;
pub mod fetcher;
pub mod normalize;
pub mod schema;
pub mod tap;

#[cfg(test)]
pub(crate) mod testing;

pub use crate::domain::model::{ColumnSchema, ColumnType, Record};
pub use crate::domain::ports::{ApiClient, Backoff, Sink};
pub use crate::utils::error::Result;
