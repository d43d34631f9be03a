//! Go-like cancellation contexts.
//!
//! A [`Context`] forms a tree: cancelling a parent cancels every context derived from it. A
//! context can additionally carry its own deadline, after which it cancels itself even if nothing
//! else does. This mirrors the shape of Go's `context.Context`, adapted to `async`/`await`.
#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, OnceLock};
use std::task::{Context as TaskContext, Poll};

use futures_lite::future;
use pin_project_lite::pin_project;
use tokio::sync::oneshot;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Why a [`Context`] was cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// An ancestor context was cancelled.
    Parent,
    /// The context's deadline elapsed.
    Deadline,
    /// The context's [`Handler`] was cancelled directly.
    Cancel,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parent => write!(f, "parent"),
            Self::Deadline => write!(f, "deadline"),
            Self::Cancel => write!(f, "cancel"),
        }
    }
}

struct Inner {
    // Held only so that dropping the last `Context` clone closes this channel, waking up any
    // `Handler::done` caller. Never sent on.
    _alive: oneshot::Sender<()>,
    token: CancellationToken,
    deadline: Option<Instant>,
    parent: Option<Context>,
}

fn raw_new() -> (Inner, Handler) {
    let (sender, alive) = oneshot::channel();
    let token = CancellationToken::new();

    (
        Inner {
            _alive: sender,
            token: token.clone(),
            deadline: None,
            parent: None,
        },
        Handler { alive, token },
    )
}

/// A cancellation context, cheaply cloneable and shareable across tasks.
#[derive(Clone)]
pub struct Context(Arc<Inner>);

static GLOBAL: OnceLock<Context> = OnceLock::new();

impl Context {
    /// Creates a new root context with no parent, deadline, or existing cancellation.
    #[must_use]
    pub fn new() -> (Self, Handler) {
        let (inner, handler) = raw_new();
        (Self(Arc::new(inner)), handler)
    }

    /// Creates a new root context that cancels itself once `deadline` elapses.
    #[must_use]
    pub fn with_deadline(deadline: Instant) -> (Self, Handler) {
        let (mut inner, handler) = raw_new();
        inner.deadline = Some(deadline);
        (Self(Arc::new(inner)), handler)
    }

    /// Creates a new root context that cancels itself after `timeout` elapses.
    #[must_use]
    pub fn with_timeout(timeout: std::time::Duration) -> (Self, Handler) {
        Self::with_deadline(Instant::now() + timeout)
    }

    /// Creates a context derived from `parent`: cancelling `parent` (or reaching `deadline`, if
    /// given) cancels this context too.
    #[must_use]
    pub fn with_parent(parent: Context, deadline: Option<Instant>) -> (Self, Handler) {
        let (mut inner, handler) = raw_new();
        inner.parent = Some(parent);
        inner.deadline = deadline;
        (Self(Arc::new(inner)), handler)
    }

    /// Returns a process-wide background context that is never cancelled.
    ///
    /// Useful as a default for call sites that accept an optional [`Context`] but have nothing
    /// meaningful to cancel against.
    pub fn global() -> Self {
        GLOBAL
            .get_or_init(|| {
                let (ctx, handler) = Context::new();
                // Leak the handler: the global context must never observe a cancellation.
                std::mem::forget(handler);
                ctx
            })
            .clone()
    }

    /// Returns `true` if this context (or any ancestor, or its own deadline) has already been
    /// cancelled. Does not block or yield.
    pub fn is_done(&self) -> bool {
        self.0.deadline.is_some_and(|deadline| Instant::now() >= deadline)
            || self.0.token.is_cancelled()
            || self.0.parent.as_ref().is_some_and(Context::is_done)
    }

    /// Waits until this context is cancelled, returning why.
    pub async fn done(&self) -> CancelReason {
        let own = async {
            self.0.token.cancelled().await;
            CancelReason::Cancel
        };

        match (&self.0.parent, self.0.deadline) {
            (Some(parent), Some(deadline)) => {
                let parent_done = box_parent_done(parent);
                let deadline_elapsed = async {
                    tokio::time::sleep_until(deadline).await;
                    CancelReason::Deadline
                };
                future::or(future::or(own, deadline_elapsed), parent_done).await
            }
            (Some(parent), None) => {
                let parent_done = box_parent_done(parent);
                future::or(own, parent_done).await
            }
            (None, Some(deadline)) => {
                let deadline_elapsed = async {
                    tokio::time::sleep_until(deadline).await;
                    CancelReason::Deadline
                };
                future::or(own, deadline_elapsed).await
            }
            (None, None) => own.await,
        }
    }
}

fn box_parent_done(parent: &Context) -> Pin<Box<dyn Future<Output = CancelReason> + Send + '_>> {
    Box::pin(async move {
        parent.done().await;
        CancelReason::Parent
    })
}

/// Controls the lifetime and cancellation of the [`Context`] it was created alongside.
pub struct Handler {
    alive: oneshot::Receiver<()>,
    token: CancellationToken,
}

impl Handler {
    /// Waits until every clone of this handler's [`Context`] has been dropped.
    pub async fn done(&mut self) {
        let _ = (&mut self.alive).await;
    }

    /// Cancels the context immediately, then waits for every clone of it to be dropped.
    pub async fn cancel(mut self) {
        self.token.cancel();
        let _ = (&mut self.alive).await;
    }
}

pin_project! {
    /// A future wrapping another, which resolves to `None` if the paired [`Context`] is cancelled
    /// before the inner future completes, or `Some` with the inner future's output otherwise.
    pub struct WithContext<'a, F> {
        #[pin]
        fut: F,
        done: Pin<Box<dyn Future<Output = CancelReason> + Send + 'a>>,
    }
}

impl<'a, F: Future> Future for WithContext<'a, F> {
    type Output = Option<F::Output>;

    fn poll(self: Pin<&mut Self>, cx: &mut TaskContext<'_>) -> Poll<Self::Output> {
        let mut this = self.project();

        if let Poll::Ready(value) = this.fut.as_mut().poll(cx) {
            return Poll::Ready(Some(value));
        }

        if this.done.as_mut().poll(cx).is_ready() {
            return Poll::Ready(None);
        }

        Poll::Pending
    }
}

/// Extension trait attaching a [`Context`] to any future, so it can be interrupted by
/// cancellation.
pub trait ContextFutExt: Future + Sized {
    /// Races this future against `ctx`'s cancellation, returning `None` if `ctx` is cancelled
    /// first.
    fn with_context(self, ctx: &Context) -> WithContext<'_, Self>;
}

impl<F: Future> ContextFutExt for F {
    fn with_context(self, ctx: &Context) -> WithContext<'_, Self> {
        WithContext {
            fut: self,
            done: Box::pin(ctx.done()),
        }
    }
}
