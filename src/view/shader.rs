use crate::config::ViewerConfig;
use crate::error::{Result, ViewerError};

/// Vertex and fragment program text, loaded once before the loop starts.
#[derive(Debug, Clone)]
pub struct ShaderSources {
    pub vertex: String,
    pub fragment: String,
}

impl ShaderSources {
    /// Fetch both programs. Either failing aborts startup.
    pub async fn load(config: &ViewerConfig) -> Result<Self> {
        let vertex = fetch_text(&config.vertex_shader).await?;
        let fragment = fetch_text(&config.fragment_shader).await?;
        tracing::info!(
            vertex = %config.vertex_shader,
            fragment = %config.fragment_shader,
            "shader sources loaded"
        );
        Ok(Self { vertex, fragment })
    }
}

#[cfg(target_arch = "wasm32")]
async fn fetch_text(url: &str) -> Result<String> {
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::JsFuture;

    let fail = |reason: String| ViewerError::ShaderLoad { path: url.to_string(), reason };
    let window = web_sys::window().ok_or_else(|| fail("no global `window`".into()))?;

    let response = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(|e| fail(format!("{e:?}")))?
        .dyn_into::<web_sys::Response>()
        .map_err(|_| fail("fetch did not return a Response".into()))?;
    if !response.ok() {
        return Err(fail(format!("HTTP {}", response.status())));
    }

    let text = JsFuture::from(response.text().map_err(|e| fail(format!("{e:?}")))?)
        .await
        .map_err(|e| fail(format!("{e:?}")))?;
    text.as_string().ok_or_else(|| fail("response body is not text".into()))
}

#[cfg(not(target_arch = "wasm32"))]
async fn fetch_text(path: &str) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| ViewerError::ShaderLoad {
        path: path.to_string(),
        reason: e.to_string(),
    })
}
