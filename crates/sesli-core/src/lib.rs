pub mod config;
pub mod error;
pub mod events;
pub mod text;
pub mod types;

pub use config::SesliConfig;
pub use error::{Result, SesliError};
pub use events::DialogueEvent;
pub use types::*;
