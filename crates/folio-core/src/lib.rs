pub mod config;
pub mod error;
pub mod portfolio;
pub mod types;

pub use config::FolioConfig;
pub use error::{FolioError, Result};
pub use portfolio::{Catalog, ExperienceRecord, Portfolio, ProjectRecord, SkillGroup};
pub use types::*;
