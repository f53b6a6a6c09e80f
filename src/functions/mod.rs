mod download_bundle;
mod get_hash;
mod human_readable_bytesize;
mod plan_downloads;
mod write_atomically;

pub(crate) use download_bundle::download_bundle;
pub use get_hash::{get_buffer_hash, get_hash};
pub use human_readable_bytesize::human_readable_bytesize;
pub use plan_downloads::{plan_downloads, reconcile_already_present};
pub(crate) use write_atomically::write_atomically;
