//Modules
mod functions;
mod implementations;
mod pausable;
mod patcher;
mod patcher_builder;
mod structures;
pub mod traits;

#[cfg(test)]
mod test_support;
#[cfg(test)]
mod tests;

pub use crate::functions::{get_buffer_hash, get_hash, human_readable_bytesize, plan_downloads, reconcile_already_present};
pub use crate::implementations::{transition, TRANSITIONS};
pub use crate::pausable::{Pausable, PausableTrait, PauseHandle};
pub use crate::patcher::{Patcher, ProgressCallback};
pub use crate::patcher_builder::PatcherBuilder;
pub use crate::structures::{
  BatchDownloader, BundleDescriptor, BundleLocation, BundleResolution, CacheIndex, DownloadProgress, DownloadRequest, Error,
  FsFileSize, HttpTransport, Manifest, NodeStatus, Operation, PatchSettings, PatchState, ProcedureFsm, Progress,
  RemoteServerInfo, RequestState, Sandbox, ServerEndpoints, Sha256Checksum, Verifier, VerifyLevel, VersionInformation,
  PATCH_MANIFEST_FILE_NAME,
};
