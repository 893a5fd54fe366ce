//! Browser launch configuration, derived from persona context options.

use std::path::PathBuf;

#[derive(Clone, Debug)]
pub struct CdpConfig {
    pub headless: bool,
    pub executable: Option<PathBuf>,
    pub user_data_dir: Option<PathBuf>,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub device_scale_factor: f64,
    pub locale: String,
    pub timezone: String,
    pub reduced_motion: bool,
    /// Hard ceiling for `domcontentloaded` navigation.
    pub navigation_timeout: std::time::Duration,
}

impl Default for CdpConfig {
    fn default() -> Self {
        Self {
            headless: true,
            executable: None,
            user_data_dir: None,
            viewport_width: 1280,
            viewport_height: 800,
            device_scale_factor: 1.0,
            locale: "en-US".to_string(),
            timezone: "UTC".to_string(),
            reduced_motion: false,
            navigation_timeout: std::time::Duration::from_secs(30),
        }
    }
}
