//! Engine Configuration
//!
//! Settings are an explicit, enumerated struct loaded from TOML. Unknown
//! keys are a load-time error, not silently accepted.

mod error;
mod settings;

pub use error::{ConfigError, ConfigResult};
pub use settings::{GrepPart, GrepPattern, GrepSettings, OutputRoots, Settings};
