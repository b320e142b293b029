//! Process-wide PDF engine handle.
//!
//! The engine moves through `Uninitialized -> Initializing -> Ready` or
//! `Initializing -> Failed`. Initialization runs on its own task; every caller
//! that arrives while it is in flight awaits the same shared future, so at
//! most one initialization runs at a time. A `Failed` engine is retried by
//! the next caller.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::pdf::{LopdfBackend, PdfBackend};

pub type PdfInitializer =
    Box<dyn Fn() -> BoxFuture<'static, anyhow::Result<Arc<dyn PdfBackend>>> + Send + Sync>;

type InitOutcome = Result<Arc<dyn PdfBackend>, String>;
type PendingInit = Shared<BoxFuture<'static, InitOutcome>>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("PDF engine not ready: {0}")]
    NotReady(String),
}

/// Observable engine state, for logs and diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineStatus {
    Uninitialized,
    Initializing,
    Ready,
    Failed(String),
}

enum EngineState {
    Uninitialized,
    Initializing(PendingInit),
    Ready(Arc<dyn PdfBackend>),
    Failed(String),
}

struct Inner {
    state: Mutex<EngineState>,
    init: PdfInitializer,
}

#[derive(Clone)]
pub struct PdfEngineHandle {
    inner: Arc<Inner>,
}

impl PdfEngineHandle {
    pub fn new(init: PdfInitializer) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(EngineState::Uninitialized),
                init,
            }),
        }
    }

    /// Handle whose initialization yields the `lopdf` engine.
    pub fn lopdf() -> Self {
        Self::new(Box::new(|| {
            async { Ok::<_, anyhow::Error>(Arc::new(LopdfBackend) as Arc<dyn PdfBackend>) }.boxed()
        }))
    }

    pub async fn status(&self) -> EngineStatus {
        match &*self.inner.state.lock().await {
            EngineState::Uninitialized => EngineStatus::Uninitialized,
            EngineState::Initializing(_) => EngineStatus::Initializing,
            EngineState::Ready(_) => EngineStatus::Ready,
            EngineState::Failed(message) => EngineStatus::Failed(message.clone()),
        }
    }

    /// Returns the ready engine, starting or joining initialization as needed.
    /// With `wait` set, gives up after that long; initialization keeps running.
    pub async fn ensure_ready(
        &self,
        wait: Option<Duration>,
    ) -> Result<Arc<dyn PdfBackend>, EngineError> {
        let pending = {
            let mut state = self.inner.state.lock().await;
            let joined = match &*state {
                EngineState::Ready(engine) => return Ok(Arc::clone(engine)),
                EngineState::Initializing(pending) => Some(pending.clone()),
                EngineState::Uninitialized | EngineState::Failed(_) => None,
            };
            match joined {
                Some(pending) => pending,
                None => {
                    let pending = self.start_init();
                    *state = EngineState::Initializing(pending.clone());
                    pending
                }
            }
        };

        let outcome = match wait {
            Some(limit) => match tokio::time::timeout(limit, pending).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    warn!(target: "pdf_engine", wait_ms = limit.as_millis() as u64, "PDF engine still initializing");
                    return Err(EngineError::NotReady(format!(
                        "PDF engine did not become ready within {} ms",
                        limit.as_millis()
                    )));
                }
            },
            None => pending.await,
        };

        outcome.map_err(EngineError::NotReady)
    }

    /// Spawns the startup initialization. Its result is only observable
    /// through the handle state.
    pub fn spawn_warmup(&self) -> tokio::task::JoinHandle<()> {
        let handle = self.clone();
        tokio::spawn(async move {
            match handle.ensure_ready(None).await {
                Ok(_) => info!(target: "pdf_engine", "PDF engine warm-up completed"),
                Err(e) => warn!(target: "pdf_engine", "PDF engine warm-up failed: {}", e),
            }
        })
    }

    // Caller must hold the state lock and store the returned future in it.
    fn start_init(&self) -> PendingInit {
        let inner = Arc::clone(&self.inner);
        info!(target: "pdf_engine", "Initializing PDF engine");
        let task_inner = Arc::clone(&inner);
        let task = tokio::spawn(async move {
            let inner = task_inner;
            let started = std::time::Instant::now();
            let attempt = AssertUnwindSafe(async { (inner.init)().await })
                .catch_unwind()
                .await;
            let outcome: InitOutcome = match attempt {
                Ok(result) => result.map_err(|e| format!("{:#}", e)),
                Err(panic) => Err(format!(
                    "PDF engine initialization panicked: {}",
                    panic_message(&*panic)
                )),
            };

            let mut state = inner.state.lock().await;
            *state = match &outcome {
                Ok(engine) => {
                    info!(target: "pdf_engine", elapsed_ms = started.elapsed().as_millis() as u64, "PDF engine ready");
                    EngineState::Ready(Arc::clone(engine))
                }
                Err(message) => {
                    warn!(target: "pdf_engine", "PDF engine initialization failed: {}", message);
                    EngineState::Failed(message.clone())
                }
            };
            outcome
        });

        async move {
            match task.await {
                Ok(outcome) => outcome,
                Err(join_error) => {
                    let message = format!("PDF engine initialization aborted: {}", join_error);
                    warn!(target: "pdf_engine", "{}", message);
                    *inner.state.lock().await = EngineState::Failed(message.clone());
                    Err(message)
                }
            }
        }
        .boxed()
        .shared()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}
