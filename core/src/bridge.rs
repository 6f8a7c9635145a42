/*
 * bridge.rs
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

//! Await bridge: turns one callback-driven `RequestExecutor::execute` into one `.await`.
//!
//! `AwaitBridge::submit` returns a `PendingOutcome` future. Like any future it does nothing until
//! polled; the first poll hands the request to the executor together with a `Completion` and
//! the task then sleeps until the executor calls `Completion::complete`. Dropping the future
//! while the request is in flight (task aborted, losing branch of `select!`, `timeout`) withdraws
//! the completion and cancels the request through its `RequestHandle`.
//!
//! States: Created → InFlight → Completed | Cancelled.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;
use tracing::debug;

use crate::executor::{Completion, Registration, RequestExecutor, RequestHandle, RequestOutcome};
use crate::http::Request;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    /// Not yet handed to the executor.
    Created,
    InFlight,
    Completed,
    /// Dropped while in flight; the executor was asked to cancel.
    Cancelled,
}

/// One request's path from callback to `.await`. Consumed by `submit`, so a bridge never has
/// more than one request in flight.
pub struct AwaitBridge<'a, X: RequestExecutor + ?Sized> {
    executor: &'a X,
}

impl<'a, X: RequestExecutor + ?Sized> AwaitBridge<'a, X> {
    pub fn new(executor: &'a X) -> Self {
        Self { executor }
    }

    pub fn submit(self, request: Request) -> PendingOutcome<'a, X> {
        PendingOutcome {
            executor: self.executor,
            path: request.path.clone(),
            request: Some(request),
            receiver: None,
            registration: None,
            handle: None,
            state: RequestState::Created,
        }
    }
}

/// Future resolving to the executor's `RequestOutcome`, exactly once.
///
/// # Panics
///
/// Panics if the executor drops every clone of its `Completion` without calling `complete`:
/// that is a broken executor, not a request failure, and is never reported as one.
pub struct PendingOutcome<'a, X: RequestExecutor + ?Sized> {
    executor: &'a X,
    path: String,
    request: Option<Request>,
    receiver: Option<oneshot::Receiver<RequestOutcome>>,
    registration: Option<Registration>,
    handle: Option<RequestHandle>,
    state: RequestState,
}

impl<X: RequestExecutor + ?Sized> PendingOutcome<'_, X> {
    pub fn state(&self) -> RequestState {
        self.state
    }

    fn start(&mut self) {
        let Some(request) = self.request.take() else {
            return;
        };
        let (completion, receiver, registration) = Completion::channel();
        debug!(method = request.method.as_str(), path = %self.path, "request submitted");
        // The executor may complete synchronously; the outcome then waits in the channel.
        let handle = self.executor.execute(request, completion);
        self.receiver = Some(receiver);
        self.registration = Some(registration);
        self.handle = Some(handle);
        self.state = RequestState::InFlight;
    }
}

impl<X: RequestExecutor + ?Sized> Future for PendingOutcome<'_, X> {
    type Output = RequestOutcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<RequestOutcome> {
        let this = &mut *self;
        if this.state == RequestState::Created {
            this.start();
        }
        let Some(receiver) = this.receiver.as_mut() else {
            panic!("PendingOutcome polled after completion");
        };
        match Pin::new(receiver).poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Ok(outcome)) => {
                this.state = RequestState::Completed;
                this.receiver = None;
                this.registration = None;
                this.handle = None;
                debug!(
                    path = %this.path,
                    success = outcome.result.is_success(),
                    status = outcome.response.as_ref().map(|r| r.code),
                    "request completed"
                );
                Poll::Ready(outcome)
            }
            Poll::Ready(Err(_)) => {
                this.state = RequestState::Completed;
                this.receiver = None;
                panic!(
                    "request executor dropped the completion for {} without delivering an outcome",
                    this.path
                );
            }
        }
    }
}

impl<X: RequestExecutor + ?Sized> Drop for PendingOutcome<'_, X> {
    fn drop(&mut self) {
        if self.state != RequestState::InFlight {
            return;
        }
        self.state = RequestState::Cancelled;
        let armed = self
            .registration
            .take()
            .map(|r| r.withdraw())
            .unwrap_or(false);
        if let Some(handle) = self.handle.take() {
            if armed {
                debug!(path = %self.path, "request cancelled");
                handle.cancel();
            }
        }
    }
}
