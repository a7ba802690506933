use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};
use tokio::sync::Notify;

const UNSTARTED: u64 = 0;
const CANCELLED: u64 = u64::MAX;

/// Lifecycle of a frame loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenState {
    Unstarted,
    /// The loop is running; the id of the current iteration, starting at 1.
    Running(u64),
    /// Terminal.
    Cancelled,
}

impl TokenState {
    fn decode(raw: u64) -> Self {
        match raw {
            UNSTARTED => TokenState::Unstarted,
            CANCELLED => TokenState::Cancelled,
            id => TokenState::Running(id),
        }
    }
}

struct Inner {
    state: AtomicU64,
    notify: Notify,
}

/// Shared stop signal for a frame loop.
///
/// The loop calls [`advance`](Self::advance) at each iteration boundary;
/// any clone may call [`cancel`](Self::cancel). Once cancelled the token
/// never leaves that state.
#[derive(Clone)]
pub struct CancellationToken {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("CancellationToken").field(&self.state()).finish()
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancellationToken {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                state: AtomicU64::new(UNSTARTED),
                notify: Notify::new(),
            }),
        }
    }

    pub fn state(&self) -> TokenState {
        TokenState::decode(self.inner.state.load(Ordering::Acquire))
    }

    /// True if both handles are clones of one token.
    pub fn same_as(&self, other: &CancellationToken) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.state.load(Ordering::Acquire) == CANCELLED
    }

    /// Move to `Cancelled`. Returns `true` only for the call that made the
    /// transition; later calls are no-ops.
    pub fn cancel(&self) -> bool {
        let previous = self.inner.state.swap(CANCELLED, Ordering::AcqRel);
        if previous == CANCELLED {
            return false;
        }
        self.inner.notify.notify_waiters();
        true
    }

    /// Begin the next iteration: `Unstarted → Running(1)`,
    /// `Running(n) → Running(n + 1)`. Returns the new iteration id, or `None`
    /// if the token is cancelled.
    pub fn advance(&self) -> Option<u64> {
        let mut current = self.inner.state.load(Ordering::Acquire);
        loop {
            if current == CANCELLED {
                return None;
            }
            // ids stay clear of the cancelled sentinel
            let next = (current + 1).min(CANCELLED - 1);
            match self.inner.state.compare_exchange_weak(
                current,
                next,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return Some(next),
                Err(actual) => current = actual,
            }
        }
    }

    /// Resolves once the token is cancelled.
    pub async fn cancelled(&self) {
        loop {
            let notified = self.inner.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}
