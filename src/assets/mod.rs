//! Thumbnail handling: naming ([`filename`]) and downloading ([`fetcher`]).

pub mod fetcher;
pub mod filename;

pub use fetcher::{AssetFetcher, DownloadError, HttpAssetFetcher};
pub use filename::FilenameGenerator;
