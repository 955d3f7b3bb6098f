//! Signature image resolution.
//!
//! The signature reference on an invoice may be an `http(s)` URL, a `data:`
//! URI or a local path (optionally `file://`-prefixed). Whatever the source,
//! the bytes are decoded once to prove they are a usable PNG/JPEG and then
//! carried through the layout as a base64 data URI.

use std::time::Duration;

use base64::{engine::general_purpose::STANDARD as BASE64_STD, Engine as _};
use image::ImageFormat;

use crate::document::ImageBlock;
use crate::error::SignatureError;
use crate::layout::{SignatureLayout, SIGNATURE_SIZE};
use crate::render::parse_data_uri;
use crate::style::TextAlign;

/// Default network timeout for remote signatures.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Resolve an optional signature reference into a table variant.
///
/// Any failure is logged and yields [`SignatureLayout::WithoutSignature`].
pub fn resolve_signature(reference: Option<&str>, timeout: Duration) -> SignatureLayout {
    let Some(reference) = reference.map(str::trim).filter(|r| !r.is_empty()) else {
        log::debug!("invoice has no signature reference");
        return SignatureLayout::WithoutSignature;
    };

    match load_signature(reference, timeout) {
        Ok(image) => SignatureLayout::WithSignature(image),
        Err(e) => {
            log::warn!("rendering invoice without signature: {e}");
            SignatureLayout::WithoutSignature
        }
    }
}

/// Load and validate a signature image, returning it as a 50×50 image block.
pub fn load_signature(reference: &str, timeout: Duration) -> Result<ImageBlock, SignatureError> {
    let bytes = if reference.starts_with("data:") {
        parse_data_uri(reference).map_err(SignatureError::DataUri)?
    } else if reference.starts_with("http://") || reference.starts_with("https://") {
        fetch_remote(reference, timeout)?
    } else {
        let path = reference.strip_prefix("file://").unwrap_or(reference);
        std::fs::read(path).map_err(|source| SignatureError::Read {
            path: path.to_string(),
            source,
        })?
    };

    let format = image::guess_format(&bytes)?;
    let decoded = image::load_from_memory_with_format(&bytes, format)?;
    log::debug!(
        "signature decoded: {:?} {}x{} px",
        format,
        decoded.width(),
        decoded.height()
    );

    Ok(ImageBlock {
        src: to_data_uri(&bytes, format),
        width: SIGNATURE_SIZE,
        height: SIGNATURE_SIZE,
        align: TextAlign::Left,
    })
}

fn to_data_uri(bytes: &[u8], format: ImageFormat) -> String {
    format!(
        "data:{};base64,{}",
        format.to_mime_type(),
        BASE64_STD.encode(bytes)
    )
}

#[cfg(feature = "fetch")]
fn fetch_remote(url: &str, timeout: Duration) -> Result<Vec<u8>, SignatureError> {
    let fetch_err = |e: reqwest::Error| SignatureError::Fetch {
        url: url.to_string(),
        reason: e.to_string(),
    };

    log::info!("fetching signature from {url} (timeout {timeout:?})");
    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(fetch_err)?;
    let response = client
        .get(url)
        .send()
        .and_then(|r| r.error_for_status())
        .map_err(fetch_err)?;

    response.bytes().map(|b| b.to_vec()).map_err(fetch_err)
}

#[cfg(not(feature = "fetch"))]
fn fetch_remote(url: &str, _timeout: Duration) -> Result<Vec<u8>, SignatureError> {
    Err(SignatureError::FetchDisabled(url.to_string()))
}
