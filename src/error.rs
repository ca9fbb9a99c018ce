use thiserror::Error;

/// Failures that keep the viewer from reaching the running loop.
#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("failed to load shader source {path}: {reason}")]
    ShaderLoad { path: String, reason: String },
    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("no suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),
    #[error("failed to request device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error("surface reports no supported formats")]
    NoSurfaceFormat,
    #[error("platform error: {0}")]
    Platform(String),
}

pub type Result<T> = std::result::Result<T, ViewerError>;

#[cfg(target_arch = "wasm32")]
impl From<ViewerError> for wasm_bindgen::JsValue {
    fn from(err: ViewerError) -> Self {
        wasm_bindgen::JsValue::from_str(&err.to_string())
    }
}
