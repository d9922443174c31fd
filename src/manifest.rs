//! IIIF Presentation 2.1 manifest retrieval and image-service discovery.

use serde_json::Value;
use url::Url;

use crate::error::{MalformedManifestError, ManifestFetchCause, ManifestFetchError, Result};
use crate::handle::ItemId;
use crate::session::Session;

pub fn manifest_url(presentation_base: &str, pid: &ItemId) -> String {
    let presentation_base = presentation_base.trim_end_matches('/');
    format!("{presentation_base}/{pid}/manifest")
}

/// Fetches the manifest through `session`, which keeps any cookie the
/// presentation server sets for the image requests that follow.
pub fn fetch_manifest(
    session: &Session,
    presentation_base: &str,
    pid: &ItemId,
) -> Result<Value, ManifestFetchError> {
    let url = manifest_url(presentation_base, pid);
    let fail = |cause| ManifestFetchError {
        pid: pid.to_string(),
        url: url.clone(),
        cause,
    };

    let parsed = Url::parse(&url).map_err(|err| fail(ManifestFetchCause::InvalidUrl(err)))?;
    let response = session
        .get_json(parsed)
        .map_err(|err| fail(ManifestFetchCause::Request(err)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(fail(ManifestFetchCause::Status(status.as_u16())));
    }

    let body = response
        .bytes()
        .map_err(|err| fail(ManifestFetchCause::Request(err)))?;
    let manifest: Value =
        serde_json::from_slice(&body).map_err(|err| fail(ManifestFetchCause::Json(err)))?;

    tracing::info!(%pid, url = %url, bytes = body.len(), "manifest fetched");
    Ok(manifest)
}

/// Returns one image service id per canvas of the first sequence, in document
/// order. Any canvas missing its image service fails the whole manifest.
pub fn extract_image_service_ids(
    manifest: &Value,
) -> Result<Vec<String>, MalformedManifestError> {
    let sequences = array_at(manifest, "sequences", "sequences")?;
    let sequence = sequences.first().ok_or_else(|| malformed("sequences", "a sequence"))?;
    let canvases = array_at(sequence, "canvases", "sequences[0].canvases")?;
    if canvases.is_empty() {
        return Err(malformed("sequences[0].canvases", "at least one canvas"));
    }

    canvases
        .iter()
        .enumerate()
        .map(|(index, canvas)| canvas_service_id(canvas, index))
        .collect()
}

fn canvas_service_id(canvas: &Value, index: usize) -> Result<String, MalformedManifestError> {
    let base = format!("sequences[0].canvases[{index}]");

    let images = array_at(canvas, "images", &format!("{base}.images"))?;
    let image = images
        .first()
        .ok_or_else(|| malformed(&format!("{base}.images"), "an image"))?;

    let resource_path = format!("{base}.images[0].resource");
    let resource = image
        .get("resource")
        .filter(|v| v.is_object())
        .ok_or_else(|| malformed(&resource_path, "an object"))?;

    let service_path = format!("{resource_path}.service");
    let service = match resource.get("service") {
        Some(Value::Array(services)) => services
            .first()
            .ok_or_else(|| malformed(&service_path, "a service"))?,
        Some(service @ Value::Object(_)) => service,
        _ => return Err(malformed(&service_path, "an object")),
    };

    let id = service
        .get("@id")
        .or_else(|| service.get("id"))
        .and_then(Value::as_str)
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| malformed(&format!("{service_path}.@id"), "a string"))?;

    Ok(id.to_owned())
}

fn array_at<'a>(
    value: &'a Value,
    key: &str,
    path: &str,
) -> Result<&'a Vec<Value>, MalformedManifestError> {
    value
        .get(key)
        .and_then(Value::as_array)
        .ok_or_else(|| malformed(path, "an array"))
}

fn malformed(path: &str, expected: &'static str) -> MalformedManifestError {
    MalformedManifestError {
        path: path.to_owned(),
        expected,
    }
}
