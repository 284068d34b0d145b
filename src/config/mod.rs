pub mod devices;
pub mod settings;

pub use devices::{DeviceConfig, DeviceSource};
pub use settings::{AppConfig, ClientSettings, DisplaySettings, PollerSettings};
