/// Asset bytes over HTTP with the browser's `fetch`
use js_sys::Uint8Array;
use log::debug;
use mview_core::{Completion, Fetch, LoadError};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::Response;

use crate::describe;

/// Fetches sources relative to the page URL.
///
/// Completions run later on the browser event loop, never inside `fetch`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpFetcher;

impl Fetch for HttpFetcher {
    fn fetch(&self, source: &str, done: Completion<Vec<u8>>) {
        let source = source.to_owned();
        spawn_local(async move {
            let result = fetch_bytes(&source).await;
            if let Ok(bytes) = &result {
                debug!("fetched {} bytes from {}", bytes.len(), source);
            }
            done(result);
        });
    }
}

async fn fetch_bytes(source: &str) -> Result<Vec<u8>, LoadError> {
    let failed = |reason: String| LoadError::Fetch {
        asset: source.to_owned(),
        reason,
    };

    let window = web_sys::window().ok_or_else(|| failed("no global window".to_owned()))?;
    let response = JsFuture::from(window.fetch_with_str(source))
        .await
        .map_err(|e| failed(describe(&e)))?;
    let response: Response = response.dyn_into().map_err(|e| failed(describe(&e)))?;

    if !response.ok() {
        return Err(failed(format!(
            "HTTP {} {}",
            response.status(),
            response.status_text()
        )));
    }

    let buffer = response.array_buffer().map_err(|e| failed(describe(&e)))?;
    let buffer = JsFuture::from(buffer)
        .await
        .map_err(|e| failed(describe(&e)))?;

    Ok(Uint8Array::new(&buffer).to_vec())
}
