//! Fetches and parses the bouquet model.

use js_sys::{Reflect, Uint8Array};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{window, ReadableStream, ReadableStreamDefaultReader, Response};

use super::timer;
use crate::loader::{wait_ready, LoadOutcome, Progress, ReadinessPolicy};
use crate::mesh::Model;
use crate::{Error, Result};

/// The page's model loader is `fetch`; very old or locked-down embeds lack it.
pub fn loader_available() -> bool {
    window()
        .map(|w| Reflect::has(&w, &JsValue::from_str("fetch")).unwrap_or(false))
        .unwrap_or(false)
}

/// Waits for the loader, then downloads and parses `url`. Exactly one
/// outcome per call; a rejected fetch or unparseable model is `Failed`.
pub async fn load_model(url: &str, policy: ReadinessPolicy, mut progress: impl FnMut(Progress)) -> LoadOutcome<Model> {
    match fetch_model(url, policy, &mut progress).await {
        Ok(model) => LoadOutcome::Loaded(model),
        Err(err) => LoadOutcome::Failed(err),
    }
}

async fn fetch_model(url: &str, policy: ReadinessPolicy, progress: &mut dyn FnMut(Progress)) -> Result<Model> {
    wait_ready(policy, loader_available, timer::sleep).await?;
    let window = window().ok_or(Error::NoWindow)?;
    let response: Response = JsFuture::from(window.fetch_with_str(url)).await?.dyn_into()?;
    if !response.ok() {
        return Err(Error::Fetch {
            url: url.to_string(),
            status: response.status(),
        });
    }
    let total = response
        .headers()
        .get("content-length")
        .ok()
        .flatten()
        .and_then(|len| len.parse().ok());
    let bytes = match response.body() {
        Some(body) => read_stream(body, total, progress).await?,
        None => {
            let buffer = JsFuture::from(response.array_buffer()?).await?;
            Uint8Array::new(&buffer).to_vec()
        }
    };
    progress(Progress {
        loaded: bytes.len() as u64,
        total,
    });
    log::info!("fetched {url} ({} bytes)", bytes.len());
    Model::from_glb(&bytes)
}

async fn read_stream(body: ReadableStream, total: Option<u64>, progress: &mut dyn FnMut(Progress)) -> Result<Vec<u8>> {
    let reader: ReadableStreamDefaultReader = body
        .get_reader()
        .dyn_into()
        .map_err(|_| Error::Js("response body has no default reader".into()))?;
    let mut bytes = Vec::with_capacity(total.unwrap_or(0) as usize);
    loop {
        let chunk = JsFuture::from(reader.read()).await?;
        if Reflect::get(&chunk, &JsValue::from_str("done"))?
            .as_bool()
            .unwrap_or(true)
        {
            break;
        }
        let value: Uint8Array = Reflect::get(&chunk, &JsValue::from_str("value"))?.dyn_into()?;
        let start = bytes.len();
        bytes.resize(start + value.length() as usize, 0);
        value.copy_to(&mut bytes[start..]);
        progress(Progress {
            loaded: bytes.len() as u64,
            total,
        });
    }
    Ok(bytes)
}
