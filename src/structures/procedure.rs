/// Nodes of the update procedure, in the order they run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatchState {
  RequestGameVersion,
  RequestPatchManifest,
  GetDownloadList,
  DownloadWebFiles,
  DownloadOver,
  Done,
}

/// What the current node is doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeStatus {
  /// Entered and waiting for `update()` to run its logic
  Entered,
  /// Succeeded and parked until the caller advances
  Suspended,
  /// Failed and parked until the caller retries or reverts
  Failed,
  Finished,
}

/// Caller driven control transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
  Advance,
  RetryCurrent,
  RevertTo(PatchState),
}

#[derive(Debug)]
pub struct ProcedureFsm {
  pub(crate) nodes: Vec<PatchState>,
  pub(crate) current: Option<usize>,
  pub(crate) status: NodeStatus,
}
