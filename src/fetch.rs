//! Background page fetching and media probing.
//!
//! The UI thread never awaits anything.  It hands [`Job`]s to the
//! [`Fetcher`], which spawns them on the tokio runtime; results come back as
//! [`FetchMsg`]s over an unbounded channel that the main loop drains on every
//! tick.
//!
//! ## Guard release
//!
//! Every page job carries a [`Reply`].  If the task finishes normally the
//! reply sends the real result.  If the task panics or the runtime drops it,
//! the reply's [`Drop`] impl sends [`FetchError::Abandoned`] instead, so the
//! feed's loading guard is released on every exit path.  A source that
//! never answers is cut off after the configured timeout.

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::error::{FetchError, MediaError};
use crate::feed::{PageRequest, PageResult};
use crate::media::MediaProbe;
use crate::source::{ContentSource, Item, MediaKind};

/// Work requested by the app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Job {
    /// Fetch a page for the feed in tab `tab`.
    Page { tab: usize, request: PageRequest },
    /// Try to load a media URL.
    Probe { kind: MediaKind, url: String },
}

/// Messages sent from background tasks to the UI thread.
#[derive(Debug)]
pub enum FetchMsg {
    Page { tab: usize, result: PageResult },
    Probe {
        kind: MediaKind,
        url: String,
        outcome: Result<(), MediaError>,
    },
}

/// One-shot answer for a page request.
struct Reply {
    tx: UnboundedSender<FetchMsg>,
    tab: usize,
    request: Option<PageRequest>,
}

impl Reply {
    fn send(mut self, outcome: Result<Vec<Item>, FetchError>) {
        if let Some(request) = self.request.take() {
            let _ = self.tx.send(FetchMsg::Page {
                tab: self.tab,
                result: request.resolve(outcome),
            });
        }
    }
}

impl Drop for Reply {
    fn drop(&mut self) {
        if let Some(request) = self.request.take() {
            tracing::warn!(page = request.page, "fetch task ended without a result");
            // If the receiver is gone the UI has exited; nothing to release.
            let _ = self.tx.send(FetchMsg::Page {
                tab: self.tab,
                result: request.resolve(Err(FetchError::Abandoned)),
            });
        }
    }
}

pub struct Fetcher {
    handle: Handle,
    source: Arc<dyn ContentSource>,
    probe: Arc<dyn MediaProbe>,
    timeout: Duration,
    tx: UnboundedSender<FetchMsg>,
}

impl Fetcher {
    /// Returns the fetcher and the receiver the main loop should drain.
    pub fn new(
        handle: Handle,
        source: Arc<dyn ContentSource>,
        probe: Arc<dyn MediaProbe>,
        timeout: Duration,
    ) -> (Self, UnboundedReceiver<FetchMsg>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let fetcher = Self {
            handle,
            source,
            probe,
            timeout,
            tx,
        };
        (fetcher, rx)
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    pub fn dispatch(&self, job: Job) {
        match job {
            Job::Page { tab, request } => self.spawn_page(tab, request),
            Job::Probe { kind, url } => self.spawn_probe(kind, url),
        }
    }

    fn spawn_page(&self, tab: usize, request: PageRequest) {
        let source = Arc::clone(&self.source);
        let timeout = self.timeout;
        let reply = Reply {
            tx: self.tx.clone(),
            tab,
            request: Some(request),
        };

        self.handle.spawn(async move {
            let fetch = source.fetch_page(request.page, request.format);
            let outcome = match tokio::time::timeout(timeout, fetch).await {
                Ok(outcome) => outcome,
                Err(_) => Err(FetchError::Timeout(timeout)),
            };
            reply.send(outcome);
        });
    }

    fn spawn_probe(&self, kind: MediaKind, url: String) {
        let probe = Arc::clone(&self.probe);
        let tx = self.tx.clone();

        self.handle.spawn(async move {
            let outcome = probe.probe(kind, &url).await;
            let _ = tx.send(FetchMsg::Probe { kind, url, outcome });
        });
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
