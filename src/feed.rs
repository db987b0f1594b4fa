//! Feed loading and state reconciliation.
//!
//! [`Feed`] owns the ordered entry list, the page cursor and the three guards
//! (`in_flight`, `has_more`, `is_refreshing`) that keep at most one fetch
//! outstanding while the initial load, the near-bottom trigger and
//! pull-to-refresh all compete for it.
//!
//! A fetch is split in two so the UI thread never blocks on the source:
//!
//! ```text
//!  load_more() ──► PageRequest ──► (driver awaits the source) ──► PageResult ──► complete()
//!   claims the guard                                                releases the guard
//! ```
//!
//! Every request handed out is eventually answered by exactly one
//! [`PageResult`]; the driver in [`crate::fetch`] guarantees this even when
//! the fetch task dies.
//!
//! ## Refresh and restore
//!
//! A successful refresh moves the current window into a snapshot before
//! replacing it with page 1.  Scrolling back to the top afterwards
//! ([`Feed::maybe_restore`]) brings the old window back exactly once.

use std::fmt;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};

use crate::error::FetchError;
use crate::notice::{self, Notice, NoticeKind};
use crate::source::{Format, Item};

/// Session-unique identity of a rendered entry.
///
/// Source ids are only unique within a page, so the feed keys entries by the
/// fetch that produced them as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryKey {
    /// Per-feed count of successful fetches, starting at 1.
    pub fetch: u64,
    pub page: u32,
    pub index: u32,
}

impl fmt::Display for EntryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.fetch, self.page, self.index)
    }
}

/// An item as placed in the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub key: EntryKey,
    pub item: Item,
}

/// A claimed fetch.  Must be answered with a [`PageResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub id: u64,
    pub page: u32,
    pub format: Format,
    pub refresh: bool,
}

impl PageRequest {
    pub fn resolve(self, outcome: Result<Vec<Item>, FetchError>) -> PageResult {
        PageResult {
            request: self,
            outcome,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResult {
    pub request: PageRequest,
    pub outcome: Result<Vec<Item>, FetchError>,
}

/// What [`Feed::complete`] did with a result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Appended { page: u32, count: usize },
    Refreshed { count: usize },
    Failed(FetchError),
    /// The result did not belong to the in-flight request.
    Ignored,
}

/// Pre-refresh window.
#[derive(Debug, Clone)]
struct Snapshot {
    entries: Vec<Entry>,
    cursor: u32,
    has_more: bool,
}

#[derive(Debug)]
pub struct Feed {
    format: Format,
    entries: Vec<Entry>,
    /// Next page to request.
    cursor: u32,
    has_more: bool,
    /// The single outstanding fetch, if any.  This is the loading guard.
    in_flight: Option<PageRequest>,
    is_refreshing: bool,
    snapshot: Option<Snapshot>,
    notice: Option<Notice>,
    notice_ttl: Duration,
    next_request_id: u64,
    fetches: u64,
    last_refreshed: Option<DateTime<Local>>,
}

impl Feed {
    pub fn new(format: Format, notice_ttl: Duration) -> Self {
        Self {
            format,
            entries: Vec::new(),
            cursor: 1,
            has_more: true,
            in_flight: None,
            is_refreshing: false,
            snapshot: None,
            notice: None,
            notice_ttl,
            next_request_id: 0,
            fetches: 0,
            last_refreshed: None,
        }
    }

    // -- triggers ------------------------------------------------------------

    /// Initial load when the feed is first shown.
    pub fn mount(&mut self) -> Option<PageRequest> {
        self.load_more(false)
    }

    /// Claim the loading guard for the next page (or page 1 on refresh).
    ///
    /// Returns `None` while another fetch is in flight, and for non-refresh
    /// loads once the source is exhausted.
    pub fn load_more(&mut self, refresh: bool) -> Option<PageRequest> {
        if self.in_flight.is_some() {
            tracing::debug!(format = %self.format, refresh, "load skipped: fetch in flight");
            return None;
        }
        if !self.has_more && !refresh {
            tracing::debug!(format = %self.format, "load skipped: feed exhausted");
            return None;
        }

        self.next_request_id += 1;
        let request = PageRequest {
            id: self.next_request_id,
            page: if refresh { 1 } else { self.cursor },
            format: self.format,
            refresh,
        };
        self.in_flight = Some(request);

        tracing::debug!(format = %self.format, page = request.page, refresh, "fetch started");
        Some(request)
    }

    /// The list scrolled within reach of its end.
    pub fn trigger_near_bottom(&mut self) -> Option<PageRequest> {
        if self.in_flight.is_some() || !self.has_more || self.is_refreshing {
            return None;
        }
        self.load_more(false)
    }

    /// Pull-to-refresh.  The refresh flag stays up until the request completes.
    pub fn trigger_refresh(&mut self) -> Option<PageRequest> {
        self.is_refreshing = true;
        let request = self.load_more(true);
        if request.is_none() {
            self.is_refreshing = false;
        }
        request
    }

    /// Bring back the pre-refresh window after the user scrolled to the top.
    ///
    /// Only fires once per refresh: the snapshot is consumed.
    pub fn maybe_restore(&mut self) -> bool {
        if self.is_refreshing || self.in_flight.is_some() {
            return false;
        }
        let Some(snapshot) = self.snapshot.take() else {
            return false;
        };

        tracing::info!(
            format = %self.format,
            entries = snapshot.entries.len(),
            cursor = snapshot.cursor,
            "restored pre-refresh feed"
        );
        self.entries = snapshot.entries;
        self.cursor = snapshot.cursor;
        self.has_more = snapshot.has_more;
        true
    }

    // -- completion ----------------------------------------------------------

    /// Apply a finished fetch and release the loading guard.
    pub fn complete(&mut self, result: PageResult, now: Instant) -> Completion {
        if self.in_flight != Some(result.request) {
            tracing::warn!(
                format = %self.format,
                request = result.request.id,
                "ignoring result for a request that is not in flight"
            );
            return Completion::Ignored;
        }

        let request = result.request;
        self.in_flight = None;
        if request.refresh {
            self.is_refreshing = false;
        }

        match result.outcome {
            Ok(items) if request.refresh => {
                let count = items.len();
                let previous = Snapshot {
                    entries: std::mem::take(&mut self.entries),
                    cursor: self.cursor,
                    has_more: self.has_more,
                };
                self.snapshot = Some(previous);
                self.entries = self.stamp(request.page, items);
                self.cursor = 2;
                self.has_more = true;
                self.last_refreshed = Some(Local::now());
                self.notice = Some(Notice::new(
                    NoticeKind::Updated,
                    "Feed updated",
                    now,
                    self.notice_ttl,
                ));

                tracing::info!(format = %self.format, count, "feed refreshed");
                Completion::Refreshed { count }
            }
            Ok(items) => {
                let count = items.len();
                let stamped = self.stamp(request.page, items);
                self.entries.extend(stamped);
                self.cursor = request.page + 1;
                self.has_more = count > 0;

                tracing::info!(format = %self.format, page = request.page, count, "page loaded");
                Completion::Appended {
                    page: request.page,
                    count,
                }
            }
            Err(error) => {
                tracing::warn!(format = %self.format, page = request.page, %error, "page fetch failed");
                self.notice = Some(Notice::new(
                    NoticeKind::Failed,
                    "Load failed, please retry",
                    now,
                    self.notice_ttl,
                ));
                Completion::Failed(error)
            }
        }
    }

    fn stamp(&mut self, page: u32, items: Vec<Item>) -> Vec<Entry> {
        self.fetches += 1;
        let fetch = self.fetches;
        items
            .into_iter()
            .zip(0u32..)
            .map(|(item, index)| Entry {
                key: EntryKey { fetch, page, index },
                item,
            })
            .collect()
    }

    /// Expire the current notice if its time is up.
    pub fn tick(&mut self, now: Instant) {
        notice::expire(&mut self.notice, now);
    }

    // -- accessors -----------------------------------------------------------

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn cursor(&self) -> u32 {
        self.cursor
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn is_refreshing(&self) -> bool {
        self.is_refreshing
    }

    /// Page currently being fetched, for the loading indicator.
    pub fn loading_page(&self) -> Option<u32> {
        self.in_flight.map(|r| r.page)
    }

    pub fn has_snapshot(&self) -> bool {
        self.snapshot.is_some()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn last_refreshed(&self) -> Option<DateTime<Local>> {
        self.last_refreshed
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
