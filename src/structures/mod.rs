mod batch_downloader;
pub use batch_downloader::{BatchDownloader, RequestState};

mod bundle_descriptor;
pub use bundle_descriptor::BundleDescriptor;

mod bundle_resolution;
pub use bundle_resolution::{BundleLocation, BundleResolution};

mod cache_index;
pub use cache_index::CacheIndex;

mod download_request;
pub use download_request::DownloadRequest;

mod error;
pub use error::Error;

mod http_transport;
pub use http_transport::HttpTransport;

mod manifest;
pub use manifest::Manifest;

mod patch_settings;
pub use patch_settings::PatchSettings;

mod procedure;
pub use procedure::{NodeStatus, Operation, PatchState, ProcedureFsm};

mod progress;
pub use progress::{DownloadProgress, Progress};

mod sandbox;
pub use sandbox::{Sandbox, PATCH_MANIFEST_FILE_NAME};
pub(crate) use sandbox::{CACHE_FILE_NAME, CACHE_FOLDER_NAME, PART_EXTENSION};

mod server_info;
pub use server_info::{RemoteServerInfo, ServerEndpoints};

mod verifier;
pub use verifier::{FsFileSize, Sha256Checksum, Verifier, VerifyLevel};

mod version_information;
pub use version_information::VersionInformation;
