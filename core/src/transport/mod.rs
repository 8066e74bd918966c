//! Callback-style transports.
//!
//! # Design
//! A transport starts a call and reports its outcome exactly once through a
//! `Completion` callback. The returned `Call` handle can abort the call while
//! it is in flight. `crate::bridge` turns this pair into a single `.await`.

mod reqwest_transport;
mod ureq_transport;

pub use reqwest_transport::ReqwestTransport;
pub use ureq_transport::UreqTransport;

use crate::error::HttpResult;
use crate::http::{RawResponse, Request};

/// Callback receiving the outcome of a call.
pub type Completion = Box<dyn FnOnce(HttpResult<RawResponse>) + Send + 'static>;

/// Handle to an in-flight call.
pub trait Call: Send {
    /// Abort the call. Best effort: a call that already completed ignores
    /// this, and some transports can only suppress the callback.
    fn cancel(&self);
}

/// Something that can issue requests asynchronously.
pub trait Transport: Send + Sync {
    /// Start `request` and invoke `completion` once it finishes or fails.
    fn enqueue(&self, request: Request, completion: Completion) -> Box<dyn Call>;
}

impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    fn enqueue(&self, request: Request, completion: Completion) -> Box<dyn Call> {
        (**self).enqueue(request, completion)
    }
}

/// Call handle for work that finished before `enqueue` returned.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct CompletedCall;

impl Call for CompletedCall {
    fn cancel(&self) {}
}
