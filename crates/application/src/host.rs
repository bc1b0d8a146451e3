//! Application and host context handles.
//!
//! Both contexts are cheap, cloneable handles onto shared state. Tearing a
//! context down is visible through every clone, which lets the coordinator
//! notice that sessions bound to it went stale.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::ports::Launcher;

static NEXT_HOST_ID: AtomicU64 = AtomicU64::new(1);

/// Process-wide identity of the embedding application.
#[derive(Clone)]
pub struct ApplicationContext {
    inner: Arc<ApplicationInner>,
}

struct ApplicationInner {
    application_id: String,
    alive: AtomicBool,
}

impl ApplicationContext {
    /// Creates a live application context.
    pub fn new(application_id: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(ApplicationInner {
                application_id: application_id.into(),
                alive: AtomicBool::new(true),
            }),
        }
    }

    /// Identifier of the embedding application.
    #[must_use]
    pub fn application_id(&self) -> &str {
        &self.inner.application_id
    }

    /// Returns true until [`tear_down`](Self::tear_down) is called on any clone.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.inner.alive.load(Ordering::Acquire)
    }

    /// Marks the context as gone.
    pub fn tear_down(&self) {
        self.inner.alive.store(false, Ordering::Release);
    }
}

impl fmt::Debug for ApplicationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApplicationContext")
            .field("application_id", &self.inner.application_id)
            .field("alive", &self.is_alive())
            .finish()
    }
}

/// The UI-bound host that sessions are attached to.
///
/// The host owns the [`Launcher`] used to open authorization pages. Once the
/// host is torn down every session built for it is stale.
#[derive(Clone)]
pub struct HostContext {
    inner: Arc<HostInner>,
}

struct HostInner {
    id: u64,
    label: String,
    alive: AtomicBool,
    launcher: Arc<dyn Launcher>,
}

impl HostContext {
    /// Creates a live host context.
    pub fn new(label: impl Into<String>, launcher: Arc<dyn Launcher>) -> Self {
        Self {
            inner: Arc::new(HostInner {
                id: NEXT_HOST_ID.fetch_add(1, Ordering::Relaxed),
                label: label.into(),
                alive: AtomicBool::new(true),
                launcher,
            }),
        }
    }

    /// Process-unique host id.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Human-readable label, used in logs.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.inner.label
    }

    /// The launcher that opens authorization pages for this host.
    #[must_use]
    pub fn launcher(&self) -> Arc<dyn Launcher> {
        Arc::clone(&self.inner.launcher)
    }

    /// Returns true until [`tear_down`](Self::tear_down) is called on any clone.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.inner.alive.load(Ordering::Acquire)
    }

    /// Marks the host as gone.
    pub fn tear_down(&self) {
        self.inner.alive.store(false, Ordering::Release);
    }
}

impl fmt::Debug for HostContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostContext")
            .field("id", &self.inner.id)
            .field("label", &self.inner.label)
            .field("alive", &self.is_alive())
            .finish_non_exhaustive()
    }
}
