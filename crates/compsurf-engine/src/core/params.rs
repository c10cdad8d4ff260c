use std::path::PathBuf;

use crate::device::SurfaceConfig;

/// Construction inputs supplied by the host.
///
/// The token and paths are stored and reported, never interpreted.
#[derive(Debug, Clone)]
pub struct ContextParams {
    pub access_token: String,
    pub width: u32,
    pub height: u32,
    pub assets_path: PathBuf,
    pub cache_path: PathBuf,
    pub misc_path: PathBuf,
    pub surface: SurfaceConfig,
}

impl Default for ContextParams {
    fn default() -> Self {
        Self {
            access_token: String::new(),
            width: 1280,
            height: 720,
            assets_path: PathBuf::new(),
            cache_path: PathBuf::new(),
            misc_path: PathBuf::new(),
            surface: SurfaceConfig::default(),
        }
    }
}
