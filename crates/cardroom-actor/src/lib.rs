//! Request actor for Cardroom's long-lived managers.
//!
//! A manager (the table registry, for one) owns state that many
//! connection tasks want to mutate at once. Instead of a lock around the
//! whole manager, every mutation is turned into a request and pushed onto
//! one FIFO queue. A single worker task drains the queue and hands each
//! request to the manager's [`RequestHandler`], so at most one request is
//! in flight per manager and requests run in arrival order.
//!
//! # Lifecycle
//!
//! ```text
//! spawn() ──→ submit()* ──→ close()      (refuse new work, keep draining)
//!                      └──→ shutdown()   (refuse new work, stop after the
//!                                         already-queued requests)
//!                                 └──→ wait()  (until the worker exits)
//! ```
//!
//! The closed check in [`RequestActor::submit`] is best-effort: a submit
//! that passed the check can still land behind the shutdown sentinel, in
//! which case it is never handled.

mod error;

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures_util::FutureExt;
use tokio::sync::{mpsc, watch};

pub use error::ActorError;

/// The manager-side half of an actor: what to do with each request.
///
/// `Request` is a closed enum, so dispatch is an exhaustive `match`
/// inside [`handle`](Self::handle) and an unknown operation cannot be
/// submitted in the first place.
///
/// Errors returned from `handle` are logged by the worker and dropped.
/// Handlers that need to tell a caller about a failure do it through a
/// reply channel carried in the request.
pub trait RequestHandler: Send + 'static {
    /// The operations this manager accepts.
    type Request: Send + 'static;

    /// Handler-internal failure, logged by the worker.
    type Error: std::fmt::Display + Send;

    /// Processes one request. Never runs concurrently with another call.
    fn handle(
        &mut self,
        request: Self::Request,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

/// What travels on the queue: a request, or the reserved stop sentinel.
enum Envelope<R> {
    Request(R),
    Shutdown,
}

/// Handle to a running request actor. Cheap to clone.
pub struct RequestActor<R> {
    name: Arc<str>,
    sender: mpsc::UnboundedSender<Envelope<R>>,
    closed: Arc<AtomicBool>,
    exited: watch::Receiver<bool>,
}

impl<R> Clone for RequestActor<R> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            sender: self.sender.clone(),
            closed: Arc::clone(&self.closed),
            exited: self.exited.clone(),
        }
    }
}

impl<R: Send + 'static> RequestActor<R> {
    /// Spawns the worker task for `handler` and returns a handle to it.
    ///
    /// `name` only appears in logs and error messages.
    pub fn spawn<H>(name: &str, handler: H) -> Self
    where
        H: RequestHandler<Request = R>,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let (exited_tx, exited_rx) = watch::channel(false);
        let name: Arc<str> = Arc::from(name);
        let closed = Arc::new(AtomicBool::new(false));

        let worker = Worker {
            name: Arc::clone(&name),
            handler,
            receiver: rx,
            closed: Arc::clone(&closed),
            exited: exited_tx,
        };
        tokio::spawn(worker.run());

        Self {
            name,
            sender: tx,
            closed,
            exited: exited_rx,
        }
    }

    /// Returns the manager name this actor was spawned with.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Enqueues a request. Never waits for the worker.
    ///
    /// # Errors
    /// [`ActorError::Closed`] once the actor has been closed or shut down.
    pub fn submit(&self, request: R) -> Result<(), ActorError> {
        if self.is_closed() {
            return Err(ActorError::Closed(self.name.to_string()));
        }
        self.sender
            .send(Envelope::Request(request))
            .map_err(|_| ActorError::Closed(self.name.to_string()))
    }

    /// Refuses further submissions. Already-queued requests still run
    /// and the worker keeps waiting for more (it just won't get any).
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    /// Returns `true` once submissions are refused.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Refuses further submissions and tells the worker to stop once
    /// everything queued before this call has been handled.
    pub fn shutdown(&self) {
        self.close();
        // Fails only if the worker is already gone, which is the goal.
        let _ = self.sender.send(Envelope::Shutdown);
        tracing::debug!(manager = %self.name, "shutdown requested");
    }

    /// Waits until the worker task has exited.
    ///
    /// Safe to call from several clones at once; returns immediately if
    /// the worker is already gone.
    pub async fn wait(&self) {
        let mut exited = self.exited.clone();
        // Err means the worker dropped its side without reporting, which
        // only happens if its task was torn down. Either way it's gone.
        let _ = exited.wait_for(|done| *done).await;
    }
}

/// The worker task: the only place the handler is ever touched.
struct Worker<H: RequestHandler> {
    name: Arc<str>,
    handler: H,
    receiver: mpsc::UnboundedReceiver<Envelope<H::Request>>,
    closed: Arc<AtomicBool>,
    exited: watch::Sender<bool>,
}

impl<H: RequestHandler> Worker<H> {
    async fn run(mut self) {
        tracing::info!(manager = %self.name, "request worker started");

        while let Some(envelope) = self.receiver.recv().await {
            let request = match envelope {
                Envelope::Request(request) => request,
                Envelope::Shutdown => break,
            };

            let outcome = AssertUnwindSafe(self.handler.handle(request))
                .catch_unwind()
                .await;

            match outcome {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    tracing::error!(
                        manager = %self.name,
                        error = %e,
                        "request failed"
                    );
                }
                Err(payload) => {
                    tracing::error!(
                        manager = %self.name,
                        panic = %panic_message(payload.as_ref()),
                        "request handler panicked"
                    );
                }
            }
        }

        self.closed.store(true, Ordering::SeqCst);
        let _ = self.exited.send(true);
        tracing::info!(manager = %self.name, "request worker stopped");
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
