mod batch_downloader;
mod bundle_descriptor;
mod bundle_resolution;
mod cache_index;
mod download_request;
mod error;
mod http_transport;
mod manifest;
mod patch_settings;
mod procedure;
mod progress;
mod sandbox;
mod server_info;
mod verifier;
mod version_information;

pub use procedure::{transition, TRANSITIONS};
