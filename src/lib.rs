pub mod config;
pub mod content;
pub mod db;
pub mod error;
pub mod logging;
pub mod progress;
pub mod response;
pub mod services;

pub use config::Config;
pub use content::LessonCatalog;
pub use error::{ErrorResponse, TurnError};
pub use progress::{ProgressStore, PROGRESS_COMPLETE};
pub use services::turn::{Outcome, TurnProcessor, TurnResult};
