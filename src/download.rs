use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use url::Url;

use crate::config::Config;
use crate::error::{Error, ImageFetchCause, ImageFetchError, Result};
use crate::handle::{self, ItemId};
use crate::image::{self, ImageFormat, SizeSpec};
use crate::manifest;
use crate::session::Session;

#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub handle_url: String,
    pub format: ImageFormat,
    pub size: SizeSpec,
}

impl DownloadRequest {
    /// Full-size JPEGs, the default for every page.
    pub fn new(handle_url: impl Into<String>) -> Self {
        Self {
            handle_url: handle_url.into(),
            format: ImageFormat::default(),
            size: SizeSpec::default(),
        }
    }

    pub fn with_format(mut self, format: ImageFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_size(mut self, size: SizeSpec) -> Self {
        self.size = size;
        self
    }
}

/// One page that was requested and written.
#[derive(Debug, Clone, Serialize)]
pub struct DownloadedPage {
    pub pid: String,
    pub index: usize,
    pub service_id: String,
    pub url: String,
    pub path: PathBuf,
    pub bytes: u64,
}

/// Image request URL for one page, without fetching it.
#[derive(Debug, Clone, Serialize)]
pub struct PageUrl {
    pub pid: String,
    pub index: usize,
    pub service_id: String,
    pub url: String,
}

/// Checked before each page request; set from another thread to stop a download.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

pub fn page_path(output_dir: &Path, pid: &ItemId, index: usize, format: &ImageFormat) -> PathBuf {
    output_dir.join(format!("slv-{pid}-{index}.{}", format.extension()))
}

pub fn download_images(config: &Config, request: &DownloadRequest) -> Result<Vec<DownloadedPage>> {
    download_images_with_cancel(config, request, &CancelFlag::default())
}

/// Resolves the Handle, fetches the manifest and downloads every page in
/// manifest order through one fresh session. Stops at the first failure;
/// pages written before it stay on disk.
pub fn download_images_with_cancel(
    config: &Config,
    request: &DownloadRequest,
    cancel: &CancelFlag,
) -> Result<Vec<DownloadedPage>> {
    let session = Session::open(&config.client)?;
    let (pid, service_ids) = discover_pages(&session, config, &request.handle_url)?;

    let output_dir = &config.output_dir;
    std::fs::create_dir_all(output_dir).map_err(|source| Error::OutputDir {
        path: output_dir.clone(),
        source,
    })?;

    let mut pages = Vec::with_capacity(service_ids.len());
    for (index, service_id) in service_ids.into_iter().enumerate() {
        if cancel.is_cancelled() {
            tracing::warn!(%pid, index, "download cancelled");
            return Err(Error::Cancelled { index });
        }

        let url = image::build_image_url(&service_id, &request.format, request.size);
        let body = fetch_image(&session, index, &url)?;

        let path = page_path(output_dir, &pid, index, &request.format);
        write_page(output_dir, &path, &body).map_err(|source| Error::WritePage {
            index,
            path: path.clone(),
            source,
        })?;

        tracing::info!(%pid, index, path = %path.display(), bytes = body.len(), "page written");
        pages.push(DownloadedPage {
            pid: pid.to_string(),
            index,
            service_id,
            url,
            path,
            bytes: body.len() as u64,
        });
    }

    Ok(pages)
}

/// Same discovery as a download (including the manifest session), without
/// fetching any image.
pub fn list_image_urls(config: &Config, request: &DownloadRequest) -> Result<Vec<PageUrl>> {
    let session = Session::open(&config.client)?;
    let (pid, service_ids) = discover_pages(&session, config, &request.handle_url)?;

    Ok(service_ids
        .into_iter()
        .enumerate()
        .map(|(index, service_id)| PageUrl {
            pid: pid.to_string(),
            index,
            url: image::build_image_url(&service_id, &request.format, request.size),
            service_id,
        })
        .collect())
}

fn discover_pages(
    session: &Session,
    config: &Config,
    handle_url: &str,
) -> Result<(ItemId, Vec<String>)> {
    let pid = handle::resolve(session, handle_url)?;
    let manifest = manifest::fetch_manifest(session, &config.presentation_base, &pid)?;
    let service_ids = manifest::extract_image_service_ids(&manifest)?;
    tracing::info!(%pid, pages = service_ids.len(), "manifest parsed");
    Ok((pid, service_ids))
}

fn fetch_image(session: &Session, index: usize, url: &str) -> Result<Vec<u8>, ImageFetchError> {
    let fail = |cause| ImageFetchError {
        index,
        url: url.to_owned(),
        cause,
    };

    let parsed = Url::parse(url).map_err(|err| fail(ImageFetchCause::InvalidUrl(err)))?;
    let response = session
        .get(parsed)
        .map_err(|err| fail(ImageFetchCause::Request(err)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(fail(ImageFetchCause::Status(status.as_u16())));
    }

    let body = response
        .bytes()
        .map_err(|err| fail(ImageFetchCause::Request(err)))?;
    Ok(body.to_vec())
}

/// Writes through a temp file in the same directory so the page never exists
/// half-written; an existing page is replaced.
fn write_page(output_dir: &Path, path: &Path, body: &[u8]) -> std::io::Result<()> {
    let mut tmp = tempfile::NamedTempFile::new_in(output_dir)?;
    tmp.write_all(body)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|err| err.error)?;
    Ok(())
}
