//! Agent Handle
//!
//! The process-wide, read-only binding of engine + tool set, and the
//! single-flight cell that constructs it.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};

use crate::engine::ReasoningEngine;
use crate::error::InitError;

/// Default per-request budget for one orchestration
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Published, read-only agent binding shared by every request
pub struct AgentHandle {
    engine: Arc<dyn ReasoningEngine>,
    tool_names: Vec<String>,
    request_timeout: Duration,
}

impl AgentHandle {
    pub fn new(engine: Arc<dyn ReasoningEngine>, tool_names: Vec<String>) -> Self {
        Self {
            engine,
            tool_names,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    #[must_use]
    pub fn engine(&self) -> &dyn ReasoningEngine {
        self.engine.as_ref()
    }

    /// Names of the tools bound to the engine
    #[must_use]
    pub fn tool_names(&self) -> &[String] {
        &self.tool_names
    }

    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}

impl std::fmt::Debug for AgentHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentHandle")
            .field("tool_names", &self.tool_names)
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}

type InitResult = Result<Arc<AgentHandle>, InitError>;
type InitFn = dyn Fn() -> BoxFuture<'static, Result<AgentHandle, InitError>> + Send + Sync;

enum CellState {
    Empty,
    Pending(Shared<BoxFuture<'static, InitResult>>),
    Ready(Arc<AgentHandle>),
}

/// Single-flight constructor for the [`AgentHandle`].
///
/// Concurrent callers during cold start share one construction and observe
/// the same handle or the same failure. A failed construction leaves the cell
/// empty so a later call can retry; a successful one is published for the
/// rest of the process lifetime.
pub struct AgentCell {
    init: Box<InitFn>,
    state: Mutex<CellState>,
    last_error: Mutex<Option<InitError>>,
    attempts: AtomicUsize,
}

impl AgentCell {
    /// Cell that builds the handle with `init` on first use
    pub fn new<F, Fut>(init: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<AgentHandle, InitError>> + Send + 'static,
    {
        Self {
            init: Box::new(move || init().boxed()),
            state: Mutex::new(CellState::Empty),
            last_error: Mutex::new(None),
            attempts: AtomicUsize::new(0),
        }
    }

    /// Cell that already holds a published handle
    #[must_use]
    pub fn ready(handle: AgentHandle) -> Self {
        let cell = Self::new(|| async {
            Err(InitError::integration("agent cell", "handle was supplied pre-built"))
        });
        *lock(&cell.state) = CellState::Ready(Arc::new(handle));
        cell
    }

    /// Return the published handle, constructing it if needed
    pub async fn get_or_init(&self) -> InitResult {
        let pending = {
            let mut state = lock(&self.state);
            match &*state {
                CellState::Ready(handle) => return Ok(Arc::clone(handle)),
                CellState::Pending(fut) => fut.clone(),
                CellState::Empty => {
                    let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
                    tracing::info!(attempt, "Initializing agent");

                    let build = (self.init)();
                    let fut = async move {
                        let handle = build.await?;
                        // Never publish a handle that cannot serve requests
                        handle.engine().probe()?;
                        Ok(Arc::new(handle))
                    }
                    .boxed()
                    .shared();
                    *state = CellState::Pending(fut.clone());
                    fut
                }
            }
        };

        let result = pending.clone().await;

        let mut state = lock(&self.state);
        if matches!(&*state, CellState::Pending(current) if current.ptr_eq(&pending)) {
            match &result {
                Ok(handle) => {
                    tracing::info!(tools = ?handle.tool_names(), "Agent initialized");
                    *state = CellState::Ready(Arc::clone(handle));
                    *lock(&self.last_error) = None;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Agent initialization failed");
                    *state = CellState::Empty;
                    *lock(&self.last_error) = Some(e.clone());
                }
            }
        }

        result
    }

    /// The published handle, without attempting construction
    #[must_use]
    pub fn get(&self) -> Option<Arc<AgentHandle>> {
        match &*lock(&self.state) {
            CellState::Ready(handle) => Some(Arc::clone(handle)),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.get().is_some()
    }

    /// Failure of the most recent construction, cleared on success
    #[must_use]
    pub fn last_error(&self) -> Option<InitError> {
        lock(&self.last_error).clone()
    }

    /// Number of constructions started so far
    #[must_use]
    pub fn construction_attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
