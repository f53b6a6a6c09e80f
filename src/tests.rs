use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::functions::get_buffer_hash;
use crate::patcher::Patcher;
use crate::patcher_builder::PatcherBuilder;
use crate::structures::{
  BundleDescriptor, BundleLocation, CacheIndex, Error, Manifest, NodeStatus, PatchState, RemoteServerInfo, ServerEndpoints,
  VerifyLevel, PATCH_MANIFEST_FILE_NAME,
};
use crate::test_support::{published, MockTransport};

const WEB: &str = "http://web.example.com/version";
const CDN: &str = "http://cdn.example.com";
const BACKUP: &str = "http://backup.example.com";

struct Harness {
  _dir: tempfile::TempDir,
  builtin: PathBuf,
  sandbox: PathBuf,
  transport: Arc<MockTransport>,
}

/// Ships `bundles` as the built-in content at resource version 1
fn harness(bundles: Vec<BundleDescriptor>) -> Harness {
  let dir = tempfile::tempdir().unwrap();
  let builtin = dir.path().join("builtin");
  let sandbox = dir.path().join("sandbox");
  std::fs::create_dir_all(&builtin).unwrap();
  Manifest::new(1, bundles).unwrap().save(&builtin.join(PATCH_MANIFEST_FILE_NAME)).unwrap();
  Harness {
    _dir: dir,
    builtin,
    sandbox,
    transport: Arc::new(MockTransport::new()),
  }
}

impl Harness {
  fn publish_version(&self, resource_version: i32) {
    let document = format!(r#"{{"game_version":"1.0.0","resource_version":{},"found_new_app":false,"force_install":false,"app_url":""}}"#, resource_version);
    self.transport.serve(WEB, document.as_bytes());
  }

  fn manifest_url(resource_version: i32) -> String {
    format!("{}/{}/{}", CDN, resource_version, PATCH_MANIFEST_FILE_NAME)
  }

  /// Publishes a remote manifest and the content of every bundle in it
  fn publish(&self, resource_version: i32, bundles: &[(BundleDescriptor, &str)]) -> Manifest {
    let manifest = Manifest::new(resource_version, bundles.iter().map(|(bundle, _)| bundle.clone()).collect()).unwrap();
    self.transport.serve(&Self::manifest_url(resource_version), manifest.serialize().as_bytes());
    for (bundle, content) in bundles {
      self.transport.serve(&Self::bundle_url(bundle), content.as_bytes());
    }
    manifest
  }

  fn bundle_url(bundle: &BundleDescriptor) -> String {
    format!("{}/{}/{}", CDN, bundle.version, bundle.hash)
  }

  fn cache_file(&self, hash: &str) -> PathBuf {
    self.sandbox.join("cache_files").join(hash)
  }

  fn builder(&self) -> PatcherBuilder {
    let mut builder = PatcherBuilder::new();
    builder
      .set_app_version("1.0")
      .set_builtin_location(&self.builtin)
      .set_sandbox_location(&self.sandbox)
      .set_server_info(RemoteServerInfo::new(ServerEndpoints::new(WEB, CDN, BACKUP)))
      .set_transport(self.transport.clone())
      .set_auto_download_tags(&["dlc1"])
      .set_max_retries(1)
      .set_download_timeout(Duration::from_secs(5));
    builder
  }

  fn patcher(&self) -> Patcher {
    let mut patcher = self.builder().build().unwrap();
    patcher.initialize().unwrap();
    patcher
  }
}

fn names(patcher: &Patcher) -> Vec<&str> {
  patcher.download_list().iter().map(|request| request.bundle_name.as_str()).collect()
}

#[tokio::test]
async fn full_update_parks_at_both_checkpoints() {
  let shipped = published("A", b"a, as shipped", 1, true, &[]);
  let harness = harness(vec![shipped]);
  harness.publish_version(2);
  let changed = published("A", b"a, changed since shipping", 2, true, &[]);
  let dlc = published("B", b"b, first dlc", 2, false, &["dlc1"]);
  let other = published("C", b"c, second dlc", 2, false, &["dlc2"]);
  let remote = harness.publish(2, &[(changed.clone(), "a, changed since shipping"), (dlc.clone(), "b, first dlc"), (other.clone(), "c, second dlc")]);

  let mut patcher = harness.patcher();
  assert_eq!(patcher.local_resource_version(), 1);
  patcher.start().unwrap();
  assert_eq!(patcher.run().await.unwrap(), NodeStatus::Suspended);
  assert_eq!(patcher.current_state(), Some(PatchState::RequestPatchManifest));
  assert_eq!(patcher.requested_resource_version(), Some(2));
  assert_eq!(patcher.requested_game_version(), Some("1.0.0"));
  assert_eq!(patcher.local_resource_version(), 2);
  assert!(!harness.sandbox.join(PATCH_MANIFEST_FILE_NAME).exists());

  assert_eq!(patcher.advance().unwrap(), PatchState::GetDownloadList);
  assert_eq!(patcher.run().await.unwrap(), NodeStatus::Suspended);
  assert_eq!(patcher.current_state_name(), "GetDownloadList");
  assert_eq!(names(&patcher), vec!["A", "B"]);
  assert_eq!(patcher.download_size(), changed.size + dlc.size);

  patcher.advance().unwrap();
  assert_eq!(patcher.run().await.unwrap(), NodeStatus::Finished);
  assert_eq!(patcher.current_state(), Some(PatchState::Done));
  assert!(patcher.cache().contains(&changed.hash));
  assert!(patcher.cache().contains(&dlc.hash));
  assert!(!patcher.cache().contains(&other.hash));
  assert_eq!(Manifest::load(&harness.sandbox.join(PATCH_MANIFEST_FILE_NAME)).unwrap(), remote);
  assert_eq!(harness.transport.times_requested(&Harness::bundle_url(&other)), 0);

  // the next session starts from the persisted state
  let reopened = harness.patcher();
  assert_eq!(reopened.local_resource_version(), 2);
  assert_eq!(reopened.cache().len(), 2);
}

#[tokio::test]
async fn bundles_resolve_by_priority() {
  let unchanged = published("A", b"a", 1, true, &[]);
  let harness = harness(vec![unchanged.clone()]);
  harness.publish_version(2);
  let downloaded = published("B", b"b", 2, false, &["dlc1"]);
  let remote_only = published("C", b"c", 2, true, &["dlc2"]);
  harness.publish(2, &[(unchanged.clone(), "a"), (downloaded.clone(), "b"), (remote_only.clone(), "c")]);

  let mut patcher = harness.patcher();
  patcher.start().unwrap();
  patcher.run().await.unwrap();
  patcher.advance().unwrap();
  patcher.run().await.unwrap();
  patcher.advance().unwrap();
  assert_eq!(patcher.run().await.unwrap(), NodeStatus::Finished);

  let a = patcher.resolve("A");
  assert_eq!(a.location, BundleLocation::Builtin(harness.builtin.join(&unchanged.hash)));
  assert_eq!(a.version, 1);

  let b = patcher.resolve("B");
  assert_eq!(b.location, BundleLocation::Cached(harness.cache_file(&downloaded.hash)));

  let c = patcher.resolve("C");
  assert_eq!(c.location, BundleLocation::Remote {
    url: format!("{}/2/{}", CDN, remote_only.hash),
    fallback_url: format!("{}/2/{}", BACKUP, remote_only.hash),
    save_path: harness.cache_file(&remote_only.hash),
  });
  assert_eq!(c.remote_urls(), Some((Harness::bundle_url(&remote_only).as_str(), format!("{}/2/{}", BACKUP, remote_only.hash).as_str())));

  let missing = patcher.resolve("missing");
  assert_eq!(missing.location, BundleLocation::Unresolved);
  assert!(!missing.is_resolved());
}

#[tokio::test]
async fn unchanged_resource_version_skips_the_manifest() {
  let shipped = published("A", b"a", 1, true, &[]);
  let harness = harness(vec![shipped]);
  harness.publish_version(1);

  let mut patcher = harness.patcher();
  patcher.start().unwrap();
  assert_eq!(patcher.run().await.unwrap(), NodeStatus::Suspended);
  assert_eq!(harness.transport.times_requested(&Harness::manifest_url(1)), 0);
  patcher.advance().unwrap();
  patcher.run().await.unwrap();
  assert!(patcher.download_list().is_empty());
  patcher.advance().unwrap();
  assert_eq!(patcher.run().await.unwrap(), NodeStatus::Finished);
  assert!(!harness.sandbox.join(PATCH_MANIFEST_FILE_NAME).exists());
}

#[tokio::test]
async fn ignoring_the_resource_version_always_fetches_the_manifest() {
  let shipped = published("A", b"a", 1, true, &[]);
  let harness = harness(vec![shipped.clone()]);
  harness.publish_version(1);
  harness.publish(1, &[(shipped, "a")]);

  let mut builder = harness.builder();
  builder.set_ignore_resource_version(true);
  let mut patcher = builder.build().unwrap();
  patcher.initialize().unwrap();
  patcher.start().unwrap();
  assert_eq!(patcher.run().await.unwrap(), NodeStatus::Suspended);
  assert_eq!(harness.transport.times_requested(&Harness::manifest_url(1)), 1);
}

#[tokio::test]
async fn malformed_manifest_parks_until_retried() {
  let harness = harness(vec![]);
  harness.publish_version(2);
  harness.transport.serve(&Harness::manifest_url(2), b"{\"resource_version\": 2, \"bundles\": [");

  let mut patcher = harness.patcher();
  patcher.start().unwrap();
  assert_eq!(patcher.run().await.unwrap(), NodeStatus::Failed);
  assert_eq!(patcher.current_state_name(), "RequestPatchManifest");
  assert!(patcher.last_failure().unwrap().contains("malformed patch manifest"));
  assert_eq!(patcher.local_resource_version(), 1);

  // parked: running again does nothing, advancing is rejected
  assert_eq!(patcher.run().await.unwrap(), NodeStatus::Failed);
  assert_eq!(harness.transport.times_requested(&Harness::manifest_url(2)), 1);
  assert!(patcher.advance().is_err());

  let fixed = published("B", b"b", 2, false, &["dlc1"]);
  harness.publish(2, &[(fixed, "b")]);
  assert_eq!(patcher.retry_current().unwrap(), PatchState::RequestPatchManifest);
  assert!(patcher.last_failure().is_none());
  assert_eq!(patcher.run().await.unwrap(), NodeStatus::Suspended);
  assert_eq!(patcher.local_resource_version(), 2);
}

#[tokio::test]
async fn rejected_operations_leave_the_procedure_alone() {
  let harness = harness(vec![]);
  harness.publish_version(1);

  let mut patcher = harness.patcher();
  assert!(patcher.advance().is_err());
  patcher.start().unwrap();
  assert!(patcher.start().is_err());
  patcher.run().await.unwrap();

  let result = patcher.retry_current();
  assert!(matches!(result, Err(Error::UnsupportedOperation { .. })));
  assert!(patcher.revert_to(PatchState::GetDownloadList).is_err());
  assert!(patcher.revert_to(PatchState::Done).is_err());
  assert_eq!(patcher.current_state(), Some(PatchState::RequestPatchManifest));
  assert_eq!(patcher.node_status(), NodeStatus::Suspended);

  assert_eq!(patcher.revert_to(PatchState::RequestGameVersion).unwrap(), PatchState::RequestGameVersion);
  assert_eq!(patcher.run().await.unwrap(), NodeStatus::Suspended);
  assert_eq!(harness.transport.times_requested(WEB), 2);
}

#[tokio::test]
async fn version_request_posts_the_configured_body() {
  let harness = harness(vec![]);
  harness.publish_version(1);

  let mut builder = harness.builder();
  builder.set_web_post_content("platform=android&channel=beta");
  let mut patcher = builder.build().unwrap();
  patcher.initialize().unwrap();
  patcher.start().unwrap();
  patcher.run().await.unwrap();
  assert_eq!(harness.transport.posted(), vec![(WEB.to_string(), "platform=android&channel=beta".to_string())]);
}

#[tokio::test]
async fn version_failures_park_in_the_first_node() {
  let harness = harness(vec![]);
  harness.transport.fail(WEB, 1);
  harness.transport.serve(WEB, b"this is not a version document");

  let mut patcher = harness.patcher();
  patcher.start().unwrap();
  assert_eq!(patcher.run().await.unwrap(), NodeStatus::Failed);
  assert!(patcher.last_failure().unwrap().contains("network error"));
  assert_eq!(patcher.requested_resource_version(), None);

  patcher.retry_current().unwrap();
  assert_eq!(patcher.run().await.unwrap(), NodeStatus::Failed);
  assert!(patcher.last_failure().unwrap().contains("version"));

  harness.publish_version(1);
  patcher.retry_current().unwrap();
  assert_eq!(patcher.run().await.unwrap(), NodeStatus::Suspended);
  assert_eq!(patcher.requested_resource_version(), Some(1));
}

fn stale_sandbox(harness: &Harness, leftover: &BundleDescriptor, content: &[u8]) {
  let mut cache = CacheIndex::load(harness.sandbox.join("cache.json"));
  cache.reset("0.9").unwrap();
  cache.record_verified(&leftover.hash).unwrap();
  std::fs::create_dir_all(harness.sandbox.join("cache_files")).unwrap();
  std::fs::write(harness.cache_file(&leftover.hash), content).unwrap();
  Manifest::new(5, vec![leftover.clone()]).unwrap().save(&harness.sandbox.join(PATCH_MANIFEST_FILE_NAME)).unwrap();
}

#[tokio::test]
async fn dirty_cache_is_wiped_with_the_whole_sandbox() {
  let leftover = published("D", b"d", 1, false, &[]);
  let harness = harness(vec![leftover.clone()]);
  stale_sandbox(&harness, &leftover, b"d");

  let mut builder = harness.builder();
  builder.set_clear_cache_when_dirty(true);
  let mut patcher = builder.build().unwrap();
  patcher.initialize().unwrap();

  assert_eq!(patcher.cache().owner_app_version(), "1.0");
  assert!(patcher.cache().is_empty());
  assert!(!harness.cache_file(&leftover.hash).exists());
  assert!(!harness.sandbox.join(PATCH_MANIFEST_FILE_NAME).exists());
  assert_eq!(patcher.local_resource_version(), 1);
  assert_eq!(patcher.get_auto_patch_download_list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn dirty_cache_keeps_cache_files_when_only_the_manifest_is_cleared() {
  let leftover = published("D", b"d", 1, false, &[]);
  let harness = harness(vec![leftover.clone()]);
  stale_sandbox(&harness, &leftover, b"d");

  let mut patcher = harness.patcher();
  assert_eq!(patcher.cache().owner_app_version(), "1.0");
  assert!(patcher.cache().is_empty());
  assert!(harness.cache_file(&leftover.hash).exists());
  assert!(!harness.sandbox.join(PATCH_MANIFEST_FILE_NAME).exists());
  assert_eq!(patcher.local_resource_version(), 1);

  // the surviving file verifies and is adopted instead of downloaded again
  assert!(patcher.get_auto_patch_download_list().await.unwrap().is_empty());
  assert!(patcher.cache().contains(&leftover.hash));
}

#[tokio::test]
async fn files_left_by_a_crash_are_adopted_not_downloaded() {
  let harness = harness(vec![]);
  harness.publish_version(2);
  let finished = published("B", b"b, finished before the crash", 2, false, &["dlc1"]);
  let missing = published("E", b"e, never started", 2, false, &[]);
  harness.publish(2, &[(finished.clone(), "b, finished before the crash"), (missing.clone(), "e, never started")]);
  std::fs::create_dir_all(harness.sandbox.join("cache_files")).unwrap();
  std::fs::write(harness.cache_file(&finished.hash), b"b, finished before the crash").unwrap();
  std::fs::write(harness.cache_file(&format!("{}.part", missing.hash)), b"e, nev").unwrap();

  let mut patcher = harness.patcher();
  patcher.start().unwrap();
  patcher.run().await.unwrap();
  patcher.advance().unwrap();
  patcher.run().await.unwrap();
  assert_eq!(names(&patcher), vec!["E"]);
  assert!(patcher.cache().contains(&finished.hash));

  patcher.advance().unwrap();
  assert_eq!(patcher.run().await.unwrap(), NodeStatus::Finished);
  assert_eq!(harness.transport.times_requested(&Harness::bundle_url(&finished)), 0);
  assert!(!harness.cache_file(&format!("{}.part", missing.hash)).exists());
}

#[tokio::test]
async fn failed_downloads_park_until_retried() {
  let harness = harness(vec![]);
  harness.publish_version(2);
  let good = published("B", b"b", 2, false, &["dlc1"]);
  let flaky = published("E", b"e", 2, false, &[]);
  harness.publish(2, &[(good.clone(), "b"), (flaky.clone(), "e")]);
  harness.transport.fail(&Harness::bundle_url(&flaky), 2);
  harness.transport.fail(&format!("{}/2/{}", BACKUP, flaky.hash), usize::MAX);

  let mut patcher = harness.patcher();
  patcher.start().unwrap();
  patcher.run().await.unwrap();
  patcher.advance().unwrap();
  patcher.run().await.unwrap();
  patcher.advance().unwrap();
  assert_eq!(patcher.run().await.unwrap(), NodeStatus::Failed);
  assert_eq!(patcher.current_state(), Some(PatchState::DownloadWebFiles));
  assert!(patcher.last_failure().unwrap().contains("E"));
  assert_eq!(patcher.downloader().unwrap().failed_bundles(), vec!["E"]);
  assert!(!harness.sandbox.join(PATCH_MANIFEST_FILE_NAME).exists());

  patcher.retry_current().unwrap();
  assert_eq!(patcher.run().await.unwrap(), NodeStatus::Finished);
  assert_eq!(harness.transport.times_requested(&Harness::bundle_url(&good)), 1);
  assert_eq!(harness.transport.times_requested(&Harness::bundle_url(&flaky)), 3);
  assert!(patcher.cache().contains(&flaky.hash));
  assert!(harness.sandbox.join(PATCH_MANIFEST_FILE_NAME).exists());
}

#[tokio::test]
async fn reverting_a_failed_download_plans_again() {
  let harness = harness(vec![]);
  harness.publish_version(2);
  let good = published("B", b"b", 2, false, &["dlc1"]);
  let broken = published("E", b"e", 2, false, &[]);
  harness.publish(2, &[(good.clone(), "b"), (broken.clone(), "e")]);
  harness.transport.corrupt(&Harness::bundle_url(&broken), 2);

  let mut patcher = harness.patcher();
  patcher.start().unwrap();
  patcher.run().await.unwrap();
  patcher.advance().unwrap();
  patcher.run().await.unwrap();
  patcher.advance().unwrap();
  assert_eq!(patcher.run().await.unwrap(), NodeStatus::Failed);
  assert!(!harness.cache_file(&broken.hash).exists());

  assert_eq!(patcher.revert_to(PatchState::GetDownloadList).unwrap(), PatchState::GetDownloadList);
  assert!(patcher.downloader().is_none());
  assert_eq!(patcher.run().await.unwrap(), NodeStatus::Suspended);
  assert_eq!(names(&patcher), vec!["E"]);
  patcher.advance().unwrap();
  assert_eq!(patcher.run().await.unwrap(), NodeStatus::Finished);
  assert!(patcher.check_content_integrity("E"));
}

#[tokio::test]
async fn cache_write_failures_are_returned() {
  let harness = harness(vec![]);
  harness.publish_version(2);
  let bundle = published("E", b"e", 2, false, &[]);
  harness.publish(2, &[(bundle, "e")]);

  let mut patcher = harness.patcher();
  patcher.start().unwrap();
  patcher.run().await.unwrap();
  patcher.advance().unwrap();
  patcher.run().await.unwrap();
  patcher.advance().unwrap();
  // a directory where the cache index writes its temporary file
  std::fs::create_dir_all(harness.sandbox.join("cache.json.tmp")).unwrap();

  let result = patcher.run().await;
  assert!(matches!(result, Err(Error::Persistence { .. })));
  assert_eq!(patcher.node_status(), NodeStatus::Failed);
  assert_eq!(patcher.current_state(), Some(PatchState::DownloadWebFiles));
}

#[tokio::test]
async fn manifest_save_failures_can_be_reverted() {
  let harness = harness(vec![]);
  harness.publish_version(2);
  let bundle = published("E", b"e", 2, false, &[]);
  let remote = harness.publish(2, &[(bundle.clone(), "e")]);

  let mut patcher = harness.patcher();
  patcher.start().unwrap();
  patcher.run().await.unwrap();
  patcher.advance().unwrap();
  patcher.run().await.unwrap();
  patcher.advance().unwrap();
  // a directory where the manifest writes its temporary file
  let blocker = harness.sandbox.join(format!("{}.tmp", PATCH_MANIFEST_FILE_NAME));
  std::fs::create_dir_all(&blocker).unwrap();

  assert!(matches!(patcher.run().await, Err(Error::Persistence { .. })));
  assert_eq!(patcher.current_state(), Some(PatchState::DownloadOver));
  assert_eq!(patcher.node_status(), NodeStatus::Failed);
  assert!(patcher.cache().contains(&bundle.hash));

  std::fs::remove_dir(&blocker).unwrap();
  assert_eq!(patcher.revert_to(PatchState::GetDownloadList).unwrap(), PatchState::GetDownloadList);
  assert_eq!(patcher.run().await.unwrap(), NodeStatus::Suspended);
  assert!(patcher.download_list().is_empty());
  patcher.advance().unwrap();
  assert_eq!(patcher.run().await.unwrap(), NodeStatus::Finished);
  assert_eq!(Manifest::load(&harness.sandbox.join(PATCH_MANIFEST_FILE_NAME)).unwrap(), remote);
  assert_eq!(harness.transport.times_requested(&Harness::bundle_url(&bundle)), 1);
}

#[tokio::test]
async fn names_sharing_content_download_it_once() {
  let harness = harness(vec![]);
  harness.publish_version(2);
  let first = published("E", b"shared content", 2, false, &[]);
  let second = published("G", b"shared content", 2, false, &[]);
  harness.publish(2, &[(first.clone(), "shared content"), (second.clone(), "shared content")]);

  let mut builder = harness.builder();
  builder.set_max_retries(0);
  let mut patcher = builder.build().unwrap();
  patcher.initialize().unwrap();
  patcher.start().unwrap();
  patcher.run().await.unwrap();
  patcher.advance().unwrap();
  patcher.run().await.unwrap();
  assert_eq!(names(&patcher), vec!["E"]);
  patcher.advance().unwrap();
  assert_eq!(patcher.run().await.unwrap(), NodeStatus::Finished);
  assert_eq!(harness.transport.times_requested(&Harness::bundle_url(&first)), 1);
  assert!(matches!(patcher.resolve("G").location, BundleLocation::Cached(_)));
}

#[test]
fn missing_builtin_manifest_is_a_configuration_error() {
  let harness = harness(vec![]);
  std::fs::remove_file(harness.builtin.join(PATCH_MANIFEST_FILE_NAME)).unwrap();
  let mut patcher = harness.builder().build().unwrap();
  assert!(matches!(patcher.initialize(), Err(Error::Configuration(_))));
  assert!(patcher.start().is_err());
}

#[tokio::test]
async fn dlc_can_be_fetched_outside_the_procedure() {
  let harness = harness(vec![]);
  harness.publish_version(2);
  let dlc = published("C", b"c, second dlc", 2, false, &["dlc2"]);
  let manual = published("F", b"f, copied by hand", 2, false, &["dlc3"]);
  harness.publish(2, &[(dlc.clone(), "c, second dlc"), (manual.clone(), "f, copied by hand")]);

  let mut patcher = harness.patcher();
  patcher.start().unwrap();
  patcher.run().await.unwrap();
  patcher.advance().unwrap();
  patcher.run().await.unwrap();
  assert!(patcher.download_list().is_empty());

  let list = patcher.get_patch_download_list(&["dlc2"]).await.unwrap();
  assert_eq!(list.len(), 1);
  let mut downloader = patcher.create_downloader(list);
  patcher.run_downloader(&mut downloader).await.unwrap();
  assert!(!downloader.has_error());
  assert!(matches!(patcher.resolve("C").location, BundleLocation::Cached(_)));

  assert!(!patcher.check_content_integrity("F"));
  std::fs::write(harness.cache_file(&manual.hash), b"f, copied by hand").unwrap();
  assert!(patcher.check_content_integrity("F"));
  patcher.cache_download_patch_file("F").unwrap();
  assert!(patcher.cache().contains(&manual.hash));
  assert!(!patcher.check_content_integrity("unknown"));
  patcher.cache_download_patch_file("unknown").unwrap();
}

#[tokio::test]
async fn builtin_tags_can_select_dlc() {
  let shipped = published("S", b"s", 1, true, &["voice_en"]);
  let harness = harness(vec![shipped]);
  harness.publish_version(2);
  let voice = published("V", b"v", 2, false, &["voice_en"]);
  let other = published("W", b"w", 2, false, &["voice_de"]);
  harness.publish(2, &[(voice, "v"), (other, "w")]);

  let mut builder = harness.builder();
  builder.set_auto_download_tags(&[]).set_auto_download_builtin_tags(true);
  let mut patcher = builder.build().unwrap();
  patcher.initialize().unwrap();
  patcher.start().unwrap();
  patcher.run().await.unwrap();
  patcher.advance().unwrap();
  patcher.run().await.unwrap();
  assert_eq!(names(&patcher), vec!["V"]);
}

#[tokio::test]
async fn size_level_accepts_any_file_of_the_right_length() {
  let harness = harness(vec![]);
  harness.publish_version(2);
  let bundle = published("B", b"the real content", 2, false, &["dlc1"]);
  harness.publish(2, &[(bundle.clone(), "the real content")]);
  std::fs::create_dir_all(harness.sandbox.join("cache_files")).unwrap();
  std::fs::write(harness.cache_file(&bundle.hash), b"the real\0\0\0\0\0\0\0\0").unwrap();

  let mut builder = harness.builder();
  builder.set_verify_level(VerifyLevel::Size);
  let mut patcher = builder.build().unwrap();
  patcher.initialize().unwrap();
  patcher.start().unwrap();
  patcher.run().await.unwrap();
  patcher.advance().unwrap();
  patcher.run().await.unwrap();
  assert!(patcher.download_list().is_empty());
  assert!(patcher.cache().contains(&bundle.hash));
}

#[test]
fn paused_downloads_make_no_progress() {
  let rt = tokio::runtime::Builder::new_multi_thread().enable_all().build().unwrap();
  rt.block_on(async {
    let harness = harness(vec![]);
    harness.publish_version(2);
    let bundle = published("E", b"e", 2, false, &[]);
    harness.publish(2, &[(bundle.clone(), "e")]);

    let mut patcher = harness.patcher();
    patcher.start().unwrap();
    patcher.run().await.unwrap();
    patcher.advance().unwrap();
    patcher.run().await.unwrap();
    patcher.advance().unwrap();

    patcher.pause();
    let paused = tokio::time::timeout(Duration::from_millis(50), patcher.run()).await;
    assert!(paused.is_err());
    assert_eq!(harness.transport.times_requested(&Harness::bundle_url(&bundle)), 0);
    assert_eq!(patcher.node_status(), NodeStatus::Entered);

    let handle = patcher.pause_handle();
    tokio::spawn(async move {
      tokio::time::sleep(Duration::from_millis(20)).await;
      handle.resume();
    });
    assert_eq!(patcher.run().await.unwrap(), NodeStatus::Finished);
    assert!(patcher.cache().contains(&bundle.hash));
    assert_eq!(get_buffer_hash(&std::fs::read(harness.cache_file(&bundle.hash)).unwrap()), bundle.hash);
  });
}

#[tokio::test]
async fn dropped_transfers_are_never_recorded() {
  let harness = harness(vec![]);
  harness.publish_version(2);
  let bundle = published("E", b"e, slow to arrive", 2, false, &[]);
  harness.publish(2, &[(bundle.clone(), "e, slow to arrive")]);
  harness.transport.delay(&Harness::bundle_url(&bundle), Duration::from_millis(300));

  let mut patcher = harness.patcher();
  patcher.start().unwrap();
  patcher.run().await.unwrap();
  patcher.advance().unwrap();
  patcher.run().await.unwrap();
  patcher.advance().unwrap();

  let dropped = tokio::time::timeout(Duration::from_millis(50), patcher.run()).await;
  assert!(dropped.is_err());
  assert_eq!(harness.transport.times_requested(&Harness::bundle_url(&bundle)), 0);
  assert_eq!(harness.transport.peak_in_flight(), 1);
  assert!(!patcher.cache().contains(&bundle.hash));
  assert!(!CacheIndex::load(harness.sandbox.join("cache.json")).contains(&bundle.hash));
  assert!(!harness.cache_file(&bundle.hash).exists());
  assert_eq!(patcher.current_state(), Some(PatchState::DownloadWebFiles));

  assert_eq!(patcher.run().await.unwrap(), NodeStatus::Finished);
  assert!(patcher.cache().contains(&bundle.hash));
  assert!(CacheIndex::load(harness.sandbox.join("cache.json")).contains(&bundle.hash));
  assert_eq!(harness.transport.times_requested(&Harness::bundle_url(&bundle)), 1);
}

#[tokio::test]
async fn progress_callback_reports_the_download() {
  let harness = harness(vec![]);
  harness.publish_version(2);
  let first = published("E", b"eeee", 2, false, &[]);
  let second = published("G", b"gg", 2, false, &[]);
  harness.publish(2, &[(first, "eeee"), (second, "gg")]);

  let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
  let recorder = seen.clone();
  let mut builder = harness.builder();
  builder.set_progress_callback(move |progress| recorder.lock().unwrap().push(progress.downloads()));
  let mut patcher = builder.build().unwrap();
  patcher.initialize().unwrap();
  patcher.start().unwrap();
  patcher.run().await.unwrap();
  patcher.advance().unwrap();
  patcher.run().await.unwrap();
  patcher.advance().unwrap();
  patcher.run().await.unwrap();

  let seen = seen.lock().unwrap();
  assert_eq!(seen.len(), 3);
  let last = seen[2];
  assert_eq!((last.files_completed, last.files_total), (2, 2));
  assert_eq!((last.bytes_completed, last.bytes_total), (6, 6));
  assert_eq!(patcher.progress().get_current_action().unwrap(), "Done");
}
