use tracing::{debug, error};

use crate::structures::{Error, NodeStatus, Operation, PatchState, ProcedureFsm};
use PatchState::*;

/// Every legal control transition as (from, operation, to).
pub const TRANSITIONS: &[(PatchState, Operation, PatchState)] = &[
  (RequestGameVersion, Operation::RetryCurrent, RequestGameVersion),

  (RequestPatchManifest, Operation::Advance, GetDownloadList),
  (RequestPatchManifest, Operation::RetryCurrent, RequestPatchManifest),
  (RequestPatchManifest, Operation::RevertTo(RequestGameVersion), RequestGameVersion),

  (GetDownloadList, Operation::Advance, DownloadWebFiles),
  (GetDownloadList, Operation::RetryCurrent, GetDownloadList),
  (GetDownloadList, Operation::RevertTo(RequestPatchManifest), RequestPatchManifest),
  (GetDownloadList, Operation::RevertTo(RequestGameVersion), RequestGameVersion),

  (DownloadWebFiles, Operation::RetryCurrent, DownloadWebFiles),
  (DownloadWebFiles, Operation::RevertTo(GetDownloadList), GetDownloadList),
  (DownloadWebFiles, Operation::RevertTo(RequestPatchManifest), RequestPatchManifest),
  (DownloadWebFiles, Operation::RevertTo(RequestGameVersion), RequestGameVersion),

  (DownloadOver, Operation::RetryCurrent, DownloadOver),
  (DownloadOver, Operation::RevertTo(DownloadWebFiles), DownloadWebFiles),
  (DownloadOver, Operation::RevertTo(GetDownloadList), GetDownloadList),
  (DownloadOver, Operation::RevertTo(RequestPatchManifest), RequestPatchManifest),
  (DownloadOver, Operation::RevertTo(RequestGameVersion), RequestGameVersion),
];

/// Looks up where `operation` leads from `state`, given the status of that node.
pub fn transition(state: PatchState, status: NodeStatus, operation: Operation) -> Option<PatchState> {
  let status_allows = match operation {
    Operation::Advance => status == NodeStatus::Suspended,
    Operation::RetryCurrent => status == NodeStatus::Failed,
    Operation::RevertTo(_) => matches!(status, NodeStatus::Failed | NodeStatus::Suspended),
  };
  if !status_allows {
    return None;
  }
  TRANSITIONS.iter()
    .find(|(from, op, _)| *from == state && *op == operation)
    .map(|(_, _, to)| *to)
}

impl PatchState {
  pub const ALL: [PatchState; 6] = [RequestGameVersion, RequestPatchManifest, GetDownloadList, DownloadWebFiles, DownloadOver, Done];

  pub fn name(&self) -> &'static str {
    match self {
      RequestGameVersion => "RequestGameVersion",
      RequestPatchManifest => "RequestPatchManifest",
      GetDownloadList => "GetDownloadList",
      DownloadWebFiles => "DownloadWebFiles",
      DownloadOver => "DownloadOver",
      Done => "Done",
    }
  }

  pub(crate) fn description(&self) -> &'static str {
    match self {
      RequestGameVersion => "Requesting game version",
      RequestPatchManifest => "Requesting patch manifest",
      GetDownloadList => "Building download list",
      DownloadWebFiles => "Downloading bundles",
      DownloadOver => "Finishing download",
      Done => "Done",
    }
  }
}

impl std::fmt::Display for PatchState {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    f.write_str(self.name())
  }
}

impl std::fmt::Display for Operation {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    match self {
      Operation::Advance => f.write_str("Advance"),
      Operation::RetryCurrent => f.write_str("RetryCurrent"),
      Operation::RevertTo(state) => write!(f, "RevertTo({})", state),
    }
  }
}

impl ProcedureFsm {
  pub fn new() -> Self {
    Self {
      nodes: Vec::new(),
      current: None,
      status: NodeStatus::Entered,
    }
  }

  pub fn add_node(&mut self, state: PatchState) -> Result<(), Error> {
    if self.nodes.contains(&state) {
      error!("Procedure node {} was already added", state);
      return Err(Error::UnsupportedOperation { state: state.to_string(), operation: "AddNode".to_string() });
    }
    self.nodes.push(state);
    Ok(())
  }

  pub fn is_running(&self) -> bool {
    self.current.is_some()
  }

  /// Enters the first node.
  pub fn run(&mut self) -> Result<(), Error> {
    if self.current.is_some() || self.nodes.is_empty() {
      return Err(Error::UnsupportedOperation { state: self.current_name().to_string(), operation: "Run".to_string() });
    }
    self.enter(0);
    Ok(())
  }

  pub fn current(&self) -> Option<PatchState> {
    self.current.map(|index| self.nodes[index])
  }

  pub fn current_name(&self) -> &'static str {
    self.current().map_or("", |state| state.name())
  }

  pub fn status(&self) -> NodeStatus {
    self.status
  }

  pub(crate) fn switch(&mut self, state: PatchState) -> Result<(), Error> {
    let index = self.nodes.iter().position(|node| *node == state)
      .ok_or_else(|| Error::UnsupportedOperation { state: self.current_name().to_string(), operation: format!("Switch({})", state) })?;
    self.enter(index);
    Ok(())
  }

  pub(crate) fn switch_next(&mut self) {
    if let Some(index) = self.current {
      if index + 1 < self.nodes.len() {
        self.enter(index + 1);
      } else {
        self.status = NodeStatus::Finished;
      }
    }
  }

  pub(crate) fn suspend(&mut self) {
    self.status = NodeStatus::Suspended;
  }

  pub(crate) fn fail(&mut self) {
    self.status = NodeStatus::Failed;
  }

  pub(crate) fn finish(&mut self) {
    self.status = NodeStatus::Finished;
  }

  /// Applies a caller operation through the transition table.
  pub fn handle_operation(&mut self, operation: Operation) -> Result<PatchState, Error> {
    let state = match self.current() {
      Some(state) => state,
      None => return Err(Error::UnsupportedOperation { state: "NotStarted".to_string(), operation: operation.to_string() }),
    };
    match transition(state, self.status, operation) {
      Some(next) => {
        self.switch(next)?;
        Ok(next)
      },
      None => {
        error!("Patch state is incorrect for {}: {} ({:?})", operation, state, self.status);
        Err(Error::UnsupportedOperation { state: state.to_string(), operation: operation.to_string() })
      }
    }
  }

  fn enter(&mut self, index: usize) {
    debug!("Entering procedure node {}", self.nodes[index]);
    self.current = Some(index);
    self.status = NodeStatus::Entered;
  }
}

impl Default for ProcedureFsm {
  fn default() -> Self {
    Self::new()
  }
}
