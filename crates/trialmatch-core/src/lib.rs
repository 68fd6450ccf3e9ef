pub mod config;
pub mod error;
pub mod types;

pub use config::TrialMatchConfig;
pub use error::{Result, TrialMatchError};
pub use types::*;
