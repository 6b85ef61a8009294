use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while building or driving the page.
///
/// None of these ever reach the user as a visible failure; callers log them
/// and degrade (CSS fallback, procedural bouquet, stopped subsystem).
#[derive(Debug, Error)]
pub enum Error {
    #[error("no global window")]
    NoWindow,
    #[error("window has no document")]
    NoDocument,
    #[error("element #{0} not found")]
    ElementMissing(String),
    #[error("WebGL2 not supported")]
    ContextUnavailable,
    #[error("shader error: {0}")]
    Shader(String),
    #[error("javascript error: {0}")]
    Js(String),
    #[error("model loader still unavailable after {waited_ms} ms")]
    LoaderUnavailable { waited_ms: u32 },
    #[error("fetching {url} failed with status {status}")]
    Fetch { url: String, status: u16 },
    #[error("invalid glTF: {0}")]
    Gltf(#[from] gltf::Error),
    #[error("model contains no triangle meshes")]
    EmptyModel,
    #[error("model references external buffer {0}")]
    ExternalBuffer(String),
    #[error("an asset load is already in flight")]
    LoadInFlight,
    #[error("asset slot already resolved or closed")]
    SlotResolved,
    #[error("animation driver was cancelled")]
    DriverCancelled,
}
