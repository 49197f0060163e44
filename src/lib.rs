pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, Command};

pub use adapters::{ReqwestTransport, TokenAuth};
pub use config::ProfileConfig;
pub use core::profile::ProfileService;
pub use domain::model::{combine, combine_all, OrgSummary, RepositoryFact, Source, SummarySnapshot};
pub use utils::error::{ProfileError, Result};
