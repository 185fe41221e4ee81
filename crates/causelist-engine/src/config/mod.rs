pub mod loader;
pub mod schema;

pub use loader::{ConfigError, ConfigLoader};
pub use schema::{
    BrowserSettings, CaptchaConfig, CauselistConfig, FormIds, OutputConfig, PortalConfig,
    TimingConfig,
};
