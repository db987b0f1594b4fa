use std::collections::HashSet;
use std::time::Instant;

use ratatui::widgets::ListState;

use crate::config::FeedConfig;
use crate::feed::{Completion, Entry, Feed, PageRequest};
use crate::fetch::{FetchMsg, Job};
use crate::media::MediaHealth;
use crate::overlay::VideoOverlay;
use crate::scroll::{ScrollAdapter, ScrollSignal};
use crate::source::{Format, Media, MediaKind};

/// Events the presentation layer forwards into the feed core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    NearBottomReached,
    PullToRefresh,
    MediaLoadFailed { kind: MediaKind, url: String },
    VideoActivated(String),
    OverlayCloseRequested,
    ScrolledToTop,
}

/// One feed with its own scroll position.
pub struct Tab {
    pub feed: Feed,
    pub list_state: ListState,
}

pub struct App {
    pub tabs: Vec<Tab>,
    /// Index of the visible tab.
    pub active: usize,
    /// Shared by every tab: a URL that failed once stays failed.
    pub media: MediaHealth,
    pub overlay: VideoOverlay,
    /// Whether the user has requested to quit.
    pub quit: bool,
    /// Last status message.
    pub status: String,
    scroll: ScrollAdapter,
    /// Media URLs already handed to the probe from a render.
    probed: HashSet<(MediaKind, String)>,
    /// Jobs waiting to be handed to the fetcher.
    jobs: Vec<Job>,
}

impl App {
    /// One tab per format, with `first` selected.
    pub fn new(config: &FeedConfig, formats: &[Format], first: Format) -> Self {
        let tabs = formats
            .iter()
            .map(|&format| Tab {
                feed: Feed::new(format, config.notice_ttl()),
                list_state: ListState::default(),
            })
            .collect();

        Self {
            tabs,
            active: formats.iter().position(|&f| f == first).unwrap_or(0),
            media: MediaHealth::new(),
            overlay: VideoOverlay::default(),
            quit: false,
            status: "Starting…".into(),
            scroll: ScrollAdapter::new(config.near_bottom_threshold),
            probed: HashSet::new(),
            jobs: Vec::new(),
        }
    }

    /// Kick off the initial load of every tab.
    pub fn mount(&mut self) {
        for tab in 0..self.tabs.len() {
            let request = self.tabs[tab].feed.mount();
            self.queue_page(tab, request);
        }
    }

    /// Drain jobs produced since the last call.
    pub fn take_jobs(&mut self) -> Vec<Job> {
        std::mem::take(&mut self.jobs)
    }

    pub fn current(&self) -> &Tab {
        &self.tabs[self.active]
    }

    fn current_mut(&mut self) -> &mut Tab {
        &mut self.tabs[self.active]
    }

    fn queue_page(&mut self, tab: usize, request: Option<PageRequest>) {
        if let Some(request) = request {
            self.jobs.push(Job::Page { tab, request });
        }
    }

    // -- core events ---------------------------------------------------------

    /// Route one presentation-layer event into the active feed.
    pub fn handle(&mut self, event: UiEvent) {
        let tab = self.active;
        match event {
            UiEvent::NearBottomReached => {
                let request = self.tabs[tab].feed.trigger_near_bottom();
                self.queue_page(tab, request);
            }
            UiEvent::PullToRefresh => {
                let request = self.tabs[tab].feed.trigger_refresh();
                if request.is_some() {
                    self.status = "Refreshing…".into();
                }
                self.queue_page(tab, request);
            }
            UiEvent::MediaLoadFailed { kind, url } => {
                self.media.mark_failed(kind, &url);
            }
            UiEvent::VideoActivated(url) => {
                // Playback is a fresh load attempt; a failure only marks the
                // URL for later renders and leaves the overlay open.
                self.jobs.push(Job::Probe {
                    kind: MediaKind::Video,
                    url: url.clone(),
                });
                self.overlay.activate(url);
            }
            UiEvent::OverlayCloseRequested => {
                self.overlay.close();
            }
            UiEvent::ScrolledToTop => {
                let tab = self.current_mut();
                if tab.feed.maybe_restore() {
                    tab.list_state.select(Some(0));
                    self.status = "Restored previous feed".into();
                }
            }
        }
    }

    /// Apply a message from a background task.
    ///
    /// Only results for the visible tab update the status line.
    pub fn apply(&mut self, msg: FetchMsg, now: Instant) {
        match msg {
            FetchMsg::Page { tab, result } => {
                let visible = tab == self.active;
                let Some(target) = self.tabs.get_mut(tab) else {
                    tracing::warn!(tab, "page result for unknown tab");
                    return;
                };
                let status = match target.feed.complete(result, now) {
                    Completion::Appended { page, count } => {
                        if target.list_state.selected().is_none() && count > 0 {
                            target.list_state.select(Some(0));
                        }
                        if count == 0 {
                            "No more content".to_string()
                        } else {
                            format!("Loaded page {page} ({count} cards)")
                        }
                    }
                    Completion::Refreshed { count } => {
                        target.list_state.select(if count > 0 { Some(0) } else { None });
                        format!("Refreshed ({count} cards)")
                    }
                    Completion::Failed(e) => format!("Error: {e}"),
                    Completion::Ignored => return,
                };
                if visible {
                    self.status = status;
                }
            }
            FetchMsg::Probe { kind, url, outcome } => {
                if let Err(e) = outcome {
                    tracing::debug!(error = %e, "media probe failed");
                    self.handle(UiEvent::MediaLoadFailed { kind, url });
                }
            }
        }
    }

    /// Periodic housekeeping: expire transient notices.
    pub fn tick(&mut self, now: Instant) {
        for tab in &mut self.tabs {
            tab.feed.tick(now);
        }
    }

    /// Called by the renderer for every media URL it puts on screen.
    pub fn note_rendered(&mut self, kind: MediaKind, url: &str) {
        if self.media.has_failed(kind, url) {
            return;
        }
        if self.probed.insert((kind, url.to_string())) {
            self.jobs.push(Job::Probe {
                kind,
                url: url.to_string(),
            });
        }
    }

    // -- gestures ------------------------------------------------------------

    pub fn pull_to_refresh(&mut self) {
        self.handle(UiEvent::PullToRefresh);
    }

    /// Play the selected card if it is a working video.
    pub fn activate_selected(&mut self) {
        let Some(entry) = self.selected_entry() else {
            return;
        };
        if let Media::Video { url } = &entry.item.media {
            if !self.media.has_failed(MediaKind::Video, url) {
                let url = url.clone();
                self.handle(UiEvent::VideoActivated(url));
            }
        }
    }

    pub fn close_overlay(&mut self) {
        self.handle(UiEvent::OverlayCloseRequested);
    }

    /// Escape closes the overlay if one is open, otherwise quits.
    pub fn escape(&mut self) {
        if self.overlay.is_open() {
            self.close_overlay();
        } else {
            self.quit = true;
        }
    }

    pub fn next_tab(&mut self) {
        if !self.tabs.is_empty() {
            self.active = (self.active + 1) % self.tabs.len();
        }
    }

    pub fn selected_entry(&self) -> Option<&Entry> {
        let tab = self.current();
        tab.list_state
            .selected()
            .and_then(|i| tab.feed.entries().get(i))
    }

    // -- navigation ----------------------------------------------------------

    pub fn select_next(&mut self) {
        self.move_selection(|i, _| i + 1);
    }

    pub fn select_previous(&mut self) {
        self.move_selection(|i, _| i.saturating_sub(1));
    }

    pub fn select_first(&mut self) {
        self.move_selection(|_, _| 0);
    }

    pub fn select_last(&mut self) {
        self.move_selection(|_, len| len.saturating_sub(1));
    }

    pub fn page_down(&mut self, rows: usize) {
        self.move_selection(|i, _| i + rows.max(1));
    }

    pub fn page_up(&mut self, rows: usize) {
        self.move_selection(|i, _| i.saturating_sub(rows.max(1)));
    }

    /// Move the selection, then tell the feed where the user ended up.
    fn move_selection(&mut self, step: impl Fn(usize, usize) -> usize) {
        let tab = self.current_mut();
        let len = tab.feed.entries().len();
        if len > 0 {
            let i = match tab.list_state.selected() {
                Some(i) => step(i, len).min(len - 1),
                None => 0,
            };
            tab.list_state.select(Some(i));
        }
        self.on_scrolled();
    }

    fn on_scrolled(&mut self) {
        let tab = self.current();
        let signal = self
            .scroll
            .observe(tab.list_state.selected(), tab.feed.entries().len());

        match signal {
            Some(ScrollSignal::NearBottom) => self.handle(UiEvent::NearBottomReached),
            Some(ScrollSignal::ScrolledToTop) => self.handle(UiEvent::ScrolledToTop),
            None => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::feed::tests::make_items;
    use crate::source::{Dimensions, Item};

    fn app() -> App {
        App::new(&FeedConfig::default(), &Format::ALL, Format::Picsum)
    }

    fn page_jobs(app: &mut App) -> Vec<(usize, PageRequest)> {
        app.take_jobs()
            .into_iter()
            .filter_map(|job| match job {
                Job::Page { tab, request } => Some((tab, request)),
                Job::Probe { .. } => None,
            })
            .collect()
    }

    fn deliver(app: &mut App, tab: usize, request: PageRequest, items: Vec<Item>) {
        app.apply(
            FetchMsg::Page {
                tab,
                result: request.resolve(Ok(items)),
            },
            Instant::now(),
        );
    }

    /// Mount and load page 1 into every tab.
    fn loaded_app() -> App {
        let mut app = app();
        app.mount();
        for (tab, request) in page_jobs(&mut app) {
            deliver(&mut app, tab, request, make_items(request.page, 10));
        }
        app
    }

    fn video_item(url: &str) -> Item {
        Item {
            id: "v".into(),
            media: Media::Video { url: url.into() },
            thumbnail_url: "https://thumb".into(),
            title: "Video".into(),
            description: String::new(),
            dimensions: Dimensions { width: 300, height: 300 },
        }
    }

    #[test]
    fn mount_requests_first_page_for_every_tab() {
        let mut app = app();
        app.mount();
        let jobs = page_jobs(&mut app);

        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].1.format, Format::Picsum);
        assert_eq!(jobs[1].1.format, Format::Unsplash);
        assert!(jobs.iter().all(|(_, r)| r.page == 1 && !r.refresh));
    }

    #[test]
    fn first_format_selects_tab() {
        let app = App::new(&FeedConfig::default(), &Format::ALL, Format::Unsplash);
        assert_eq!(app.active, 1);
    }

    #[test]
    fn loaded_page_selects_first_row() {
        let app = loaded_app();
        assert_eq!(app.current().feed.entries().len(), 10);
        assert_eq!(app.current().list_state.selected(), Some(0));
        assert!(app.status.contains("page 1"));
    }

    #[test]
    fn scrolling_near_bottom_requests_next_page_once() {
        let mut app = loaded_app();
        app.select_last();
        app.select_previous();
        app.select_next();

        let jobs = page_jobs(&mut app);
        assert_eq!(jobs.len(), 1, "guard must drop repeated triggers");
        assert_eq!(jobs[0].1.page, 2);

        deliver(&mut app, 0, jobs[0].1, make_items(2, 10));
        assert_eq!(app.current().feed.entries().len(), 20);
    }

    #[test]
    fn middle_scroll_does_not_load() {
        let mut app = loaded_app();
        app.select_next();
        app.select_next();
        assert!(page_jobs(&mut app).is_empty());
    }

    #[test]
    fn refresh_then_scroll_up_restores() {
        let mut app = loaded_app();
        app.select_last();
        let (tab, request) = page_jobs(&mut app)[0];
        deliver(&mut app, tab, request, make_items(2, 10));
        let before: Vec<Entry> = app.current().feed.entries().to_vec();

        app.pull_to_refresh();
        let (tab, request) = page_jobs(&mut app)[0];
        assert!(request.refresh);
        assert!(app.current().feed.is_refreshing());

        app.select_first();
        assert!(page_jobs(&mut app).is_empty(), "no loads while refreshing");

        deliver(&mut app, tab, request, make_items(1, 10));
        assert_eq!(app.current().feed.entries().len(), 10);
        assert_eq!(app.current().list_state.selected(), Some(0));

        app.select_previous();
        assert_eq!(app.current().feed.entries(), before.as_slice());
        assert_eq!(app.status, "Restored previous feed");

        app.select_previous();
        assert_eq!(app.current().feed.entries(), before.as_slice());
    }

    #[test]
    fn fetch_error_updates_status() {
        let mut app = app();
        app.mount();
        let (tab, request) = page_jobs(&mut app)[0];
        app.apply(
            FetchMsg::Page {
                tab,
                result: request.resolve(Err(FetchError::Unavailable("offline".into()))),
            },
            Instant::now(),
        );

        assert!(app.status.starts_with("Error:"));
        assert!(!app.tabs[tab].feed.is_loading());
    }

    #[test]
    fn probe_failure_marks_media() {
        let mut app = app();
        app.apply(
            FetchMsg::Probe {
                kind: MediaKind::Image,
                url: "https://img".into(),
                outcome: Err(crate::error::MediaError::LoadFailed {
                    kind: MediaKind::Image,
                    url: "https://img".into(),
                }),
            },
            Instant::now(),
        );
        assert!(app.media.has_failed(MediaKind::Image, "https://img"));
    }

    #[test]
    fn failed_media_stays_failed_after_refresh() {
        let mut app = loaded_app();
        let url = "https://img/1/0";
        app.handle(UiEvent::MediaLoadFailed {
            kind: MediaKind::Image,
            url: url.into(),
        });

        app.pull_to_refresh();
        let (tab, request) = page_jobs(&mut app)[0];
        assert!(request.refresh);
        deliver(&mut app, tab, request, make_items(1, 10));
        assert_eq!(app.current().feed.entries()[0].item.media.url(), url);

        assert!(app.media.has_failed(MediaKind::Image, url));
        app.note_rendered(MediaKind::Image, url);
        assert!(app.take_jobs().is_empty(), "failed media is not loaded again");
    }

    #[test]
    fn background_tab_results_leave_status_alone() {
        let mut app = app();
        app.mount();
        let jobs = page_jobs(&mut app);
        let (tab, request) = jobs[0];
        deliver(&mut app, tab, request, make_items(1, 10));
        assert_eq!(app.status, "Loaded page 1 (10 cards)");

        let (tab, request) = jobs[1];
        assert_ne!(tab, app.active);
        app.apply(
            FetchMsg::Page {
                tab,
                result: request.resolve(Err(FetchError::Unavailable("offline".into()))),
            },
            Instant::now(),
        );
        assert_eq!(app.status, "Loaded page 1 (10 cards)");
        assert!(!app.tabs[tab].feed.is_loading());
    }

    #[test]
    fn rendered_media_is_probed_once() {
        let mut app = app();
        app.note_rendered(MediaKind::Image, "https://img");
        app.note_rendered(MediaKind::Image, "https://img");
        assert_eq!(app.take_jobs().len(), 1);

        app.media.mark_failed(MediaKind::Image, "https://other");
        app.note_rendered(MediaKind::Image, "https://other");
        assert!(app.take_jobs().is_empty());
    }

    #[test]
    fn activate_video_opens_overlay_and_probes() {
        let mut app = app();
        app.mount();
        let (tab, request) = page_jobs(&mut app)[0];
        deliver(&mut app, tab, request, vec![video_item("https://vid")]);

        app.activate_selected();
        assert_eq!(app.overlay.playing(), Some("https://vid"));
        assert_eq!(
            app.take_jobs(),
            vec![Job::Probe {
                kind: MediaKind::Video,
                url: "https://vid".into()
            }]
        );

        // Playback failure keeps the overlay open.
        app.handle(UiEvent::MediaLoadFailed {
            kind: MediaKind::Video,
            url: "https://vid".into(),
        });
        assert!(app.overlay.is_open());

        app.escape();
        assert!(!app.overlay.is_open());
        assert!(!app.quit);

        // A failed video is not playable any more.
        app.activate_selected();
        assert!(!app.overlay.is_open());

        app.escape();
        assert!(app.quit);
    }

    #[test]
    fn activating_an_image_does_nothing() {
        let mut app = loaded_app();
        app.activate_selected();
        assert!(!app.overlay.is_open());
    }

    #[test]
    fn tabs_keep_separate_feeds() {
        let mut app = loaded_app();
        app.select_last();
        let jobs = page_jobs(&mut app);
        assert_eq!(jobs[0].0, 0);

        app.next_tab();
        assert_eq!(app.active, 1);
        assert!(!app.current().feed.is_loading());
        app.pull_to_refresh();
        let jobs = page_jobs(&mut app);
        assert_eq!(jobs[0].0, 1);
        assert!(jobs[0].1.refresh);

        app.next_tab();
        assert_eq!(app.active, 0);
    }
}
