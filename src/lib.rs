#![forbid(unsafe_code)]

pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod handle;
pub mod image;
pub mod logging;
pub mod manifest;
pub mod session;

pub use config::{ClientConfig, Config};
pub use download::{
    CancelFlag, DownloadRequest, DownloadedPage, PageUrl, download_images,
    download_images_with_cancel, list_image_urls,
};
pub use error::{Error, Result};
pub use image::{ImageFormat, SizeSpec};
