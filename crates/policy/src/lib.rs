pub mod coerce;
pub mod config;
pub mod host;
pub mod settings;

pub use config::{PolicyConfig, ScanMode, MAX_FILES_CEILING, MAX_FILES_FLOOR};
pub use host::HostLimits;
pub use settings::{parse_settings, RawSettings, SettingsError};
