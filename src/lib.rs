pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::adapters::{http::BloomerangClient, singer::SingerWriter};
pub use crate::config::TapConfig;
pub use crate::core::{
    catalog::Catalog,
    etl::{Mode, RunOutcome, TapEngine},
    fetcher::RetryPolicy,
    tap::BloomerangTap,
};
pub use crate::domain::ports::TokioBackoff;
pub use crate::utils::error::{RequestError, Result, TapError};
