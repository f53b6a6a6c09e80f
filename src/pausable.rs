use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::task::AtomicWaker;

/// Pauses and resumes futures wrapped with `PausableTrait::pausable`
#[derive(Debug, Clone, Default)]
pub struct PauseHandle {
  inner: Arc<PauseState>,
}

#[derive(Debug, Default)]
struct PauseState {
  paused: AtomicBool,
  waker: AtomicWaker,
}

impl PauseHandle {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn pause(&self) {
    tracing::info!("Pausing");
    self.inner.paused.store(true, Ordering::SeqCst);
  }

  pub fn resume(&self) {
    tracing::info!("Resuming");
    self.inner.paused.store(false, Ordering::SeqCst);
    self.inner.waker.wake();
  }

  pub fn is_paused(&self) -> bool {
    self.inner.paused.load(Ordering::SeqCst)
  }
}

pub trait PausableTrait: Future + Unpin + Sized {
  fn pausable(self, handle: PauseHandle) -> Pausable<Self>;
}

impl<A: Future + Unpin> PausableTrait for A {
  fn pausable(self, handle: PauseHandle) -> Pausable<Self> {
    Pausable {
      a: self,
      handle,
    }
  }
}

pub struct Pausable<A: Future + Unpin> {
  a: A,
  handle: PauseHandle,
}

impl<A: Future + Unpin> Future for Pausable<A> {
  type Output = A::Output;

  fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
    if self.handle.is_paused() {
      self.handle.inner.waker.register(cx.waker());
      // resume() may have run between the check and the registration
      if self.handle.is_paused() {
        return Poll::Pending;
      }
    }
    Pin::new(&mut self.a).poll(cx)
  }
}
