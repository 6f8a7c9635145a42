/*
 * executor.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * This file is part of Corriere, an asynchronous HTTP request library.
 *
 * Corriere is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Corriere is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Corriere.  If not, see <http://www.gnu.org/licenses/>.
 */

//! Callback-driven request execution: the `RequestExecutor` trait, the single-delivery
//! `Completion` callback it reports through, and the `RequestHandle` used to cancel it.

use std::sync::{Arc, Mutex, MutexGuard, Weak};

use bytes::Bytes;
use tokio::sync::oneshot;
use tokio::task::AbortHandle;
use tracing::{debug, warn};

use crate::error::FuelError;
use crate::http::{Request, Response};
use crate::result::FuelResult;

/// What an executor reports when a request finishes.
/// `response` is present whenever a status line was received, including non-2xx.
#[derive(Debug)]
pub struct RequestOutcome {
    pub request: Request,
    pub response: Option<Response>,
    pub result: FuelResult<Bytes, FuelError>,
}

impl RequestOutcome {
    pub fn success(request: Request, response: Response, body: Bytes) -> Self {
        Self {
            request,
            response: Some(response),
            result: FuelResult::Success(body),
        }
    }

    pub fn failure(request: Request, response: Option<Response>, error: FuelError) -> Self {
        Self {
            request,
            response,
            result: FuelResult::Failure(error),
        }
    }
}

type Slot = Arc<Mutex<Option<oneshot::Sender<RequestOutcome>>>>;

fn lock(slot: &Slot) -> MutexGuard<'_, Option<oneshot::Sender<RequestOutcome>>> {
    match slot.lock() {
        Ok(g) => g,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Callback handed to `RequestExecutor::execute`. Cloneable so an executor can reach it from
/// several code paths; only the first `complete` is delivered.
#[derive(Clone)]
pub struct Completion {
    slot: Slot,
}

impl Completion {
    /// New completion, the receiving end the awaiting side listens on, and the registration
    /// used to withdraw the completion on cancellation. The registration holds the slot weakly:
    /// once every clone of the completion is dropped the receiver sees the sender go away.
    pub(crate) fn channel() -> (Completion, oneshot::Receiver<RequestOutcome>, Registration) {
        let (tx, rx) = oneshot::channel();
        let slot: Slot = Arc::new(Mutex::new(Some(tx)));
        let registration = Registration {
            slot: Arc::downgrade(&slot),
        };
        (Completion { slot }, rx, registration)
    }

    /// Deliver the outcome. Returns false, dropping the outcome, if an outcome was already
    /// delivered or the awaiting side has gone away.
    pub fn complete(&self, outcome: RequestOutcome) -> bool {
        let sender = lock(&self.slot).take();
        match sender {
            Some(tx) => match tx.send(outcome) {
                Ok(()) => true,
                Err(outcome) => {
                    debug!(path = %outcome.request.path, "outcome dropped: awaiter gone");
                    false
                }
            },
            None => {
                warn!(
                    path = %outcome.request.path,
                    "completion already delivered or withdrawn; ignoring"
                );
                false
            }
        }
    }

    /// True while a caller is still waiting for this completion.
    pub fn is_registered(&self) -> bool {
        lock(&self.slot).as_ref().map(|tx| !tx.is_closed()).unwrap_or(false)
    }
}

/// The awaiting side's hold on a completion slot.
pub(crate) struct Registration {
    slot: Weak<Mutex<Option<oneshot::Sender<RequestOutcome>>>>,
}

impl Registration {
    /// Empty the slot so no later `complete` can deliver. Returns true if it was still armed.
    pub(crate) fn withdraw(&self) -> bool {
        match self.slot.upgrade() {
            Some(slot) => lock(&slot).take().is_some(),
            None => false,
        }
    }
}

/// Cancels an in-flight request. Dropping a handle without calling `cancel` lets the request run.
pub struct RequestHandle {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl RequestHandle {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Handle for a request that cannot be cancelled, e.g. one that already completed
    /// synchronously.
    pub fn detached() -> Self {
        Self { cancel: None }
    }

    /// Cancel by aborting the tokio task running the request.
    pub fn from_abort_handle(abort: AbortHandle) -> Self {
        Self::new(move || abort.abort())
    }

    /// Best-effort cancellation; a no-op if the request already finished.
    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

/// Executes requests and reports each through its `Completion` exactly once.
///
/// Implementations start the request and return immediately. A request that cannot be started
/// (malformed URL, ...) is completed with a failure before `execute` returns.
pub trait RequestExecutor: Send + Sync {
    fn execute(&self, request: Request, completion: Completion) -> RequestHandle;
}

impl<X: RequestExecutor + ?Sized> RequestExecutor for Arc<X> {
    fn execute(&self, request: Request, completion: Completion) -> RequestHandle {
        (**self).execute(request, completion)
    }
}

impl<X: RequestExecutor + ?Sized> RequestExecutor for &X {
    fn execute(&self, request: Request, completion: Completion) -> RequestHandle {
        (**self).execute(request, completion)
    }
}
