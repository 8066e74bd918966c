//! Await a callback-style transport call.
//!
//! # Design
//! The completion callback owns the only sender of a oneshot channel, so the
//! awaiting side is resumed at most once, with either the raw response or the
//! transport failure. A caller cancels by dropping the future (a timeout,
//! `JoinHandle::abort`, a `select!` losing branch). A guard holding the call
//! handle then cancels the transport call. Anything the transport reports
//! afterwards finds the receiver gone and is dropped.

use std::panic::{self, AssertUnwindSafe};

use tokio::sync::oneshot;
use tracing::{debug, trace};

use crate::error::{HttpError, HttpResult};
use crate::http::{RawResponse, Request};
use crate::transport::{Call, Completion, Transport};

/// Start `request` on `transport` and wait for its outcome.
///
/// The call is enqueued when the returned future is first polled. Dropping
/// the future before it resolves cancels the call.
pub async fn execute(transport: &dyn Transport, request: Request) -> HttpResult<RawResponse> {
    let (tx, rx) = oneshot::channel();
    let completion: Completion = Box::new(move |outcome| {
        if tx.send(outcome).is_err() {
            trace!("caller is gone, dropping late transport outcome");
        }
    });

    let mut guard = CancelOnDrop::new(transport.enqueue(request, completion));
    let outcome = rx.await;
    guard.disarm();

    match outcome {
        Ok(outcome) => outcome,
        Err(_) => Err(HttpError::Transport(
            "transport dropped the call without completing it".to_string(),
        )),
    }
}

/// Cancels the wrapped call when dropped while still armed.
struct CancelOnDrop {
    call: Option<Box<dyn Call>>,
}

impl CancelOnDrop {
    fn new(call: Box<dyn Call>) -> Self {
        Self { call: Some(call) }
    }

    fn disarm(&mut self) {
        self.call = None;
    }
}

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        let Some(call) = self.call.take() else {
            return;
        };
        debug!("request cancelled before completion, aborting transport call");
        // Cancellation is best effort and must never surface as a new error.
        if panic::catch_unwind(AssertUnwindSafe(|| call.cancel())).is_err() {
            trace!("ignoring panic raised while cancelling the call");
        }
    }
}
