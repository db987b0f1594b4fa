//! Terminal UI rendering.
//!
//! All drawing logic lives here, separated from application state ([`App`])
//! and input handling ([`crate::input`]).
//!
//! ## For contributors
//!
//! * The layout is four rows: the tab bar, the scrollable card list, a
//!   one-line notice / loading strip and the status bar.
//! * The video overlay is drawn last, on top of everything else.
//! * Rendering a card is what "loads" its media: every visible media URL is
//!   reported through [`App::note_rendered`], which probes it once.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Tabs, Wrap},
    Frame,
};

use crate::app::{App, Tab};
use crate::feed::Entry;
use crate::media::MediaHealth;
use crate::notice::NoticeKind;
use crate::source::{Media, MediaKind};

/// Each card takes two rows.
const CARD_HEIGHT: u16 = 2;

/// Draw the complete UI for one frame.
pub fn draw(app: &mut App, frame: &mut Frame) {
    let [tabs_area, main_area, notice_area, status_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(1),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    draw_tabs(app, frame, tabs_area);
    draw_feed_list(app, frame, main_area);
    draw_notice(app, frame, notice_area);
    draw_status_bar(app, frame, status_area);

    if app.overlay.is_open() {
        draw_overlay(app, frame);
    }
}

fn draw_tabs(app: &App, frame: &mut Frame, area: Rect) {
    let titles: Vec<Line> = app
        .tabs
        .iter()
        .map(|tab| {
            let spinner = if tab.feed.is_loading() { " ⟳" } else { "" };
            Line::from(format!(" {}{} ", tab.feed.format().label(), spinner))
        })
        .collect();

    let tabs = Tabs::new(titles)
        .select(app.active)
        .style(Style::default().fg(Color::DarkGray))
        .highlight_style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(tabs, area);
}

/// Render the scrollable card list and probe whatever ended up on screen.
fn draw_feed_list(app: &mut App, frame: &mut Frame, area: Rect) {
    let visible = {
        let App {
            tabs,
            active,
            media,
            ..
        } = &mut *app;
        let Tab { feed, list_state } = &mut tabs[*active];
        let media: &MediaHealth = media;

        let list_items: Vec<ListItem> = feed
            .entries()
            .iter()
            .map(|entry| card(entry, media))
            .collect();

        let list = List::new(list_items)
            .block(
                Block::default()
                    .title(format!(" Discover · {} ", feed.format()))
                    .borders(Borders::ALL),
            )
            .highlight_style(
                Style::default()
                    .add_modifier(Modifier::BOLD)
                    .bg(Color::DarkGray),
            )
            .highlight_symbol("▸ ");

        frame.render_stateful_widget(list, area, list_state);

        let rows = usize::from(area.height.saturating_sub(2) / CARD_HEIGHT).max(1);
        feed.entries()
            .iter()
            .skip(list_state.offset())
            .take(rows)
            .map(|entry| (entry.item.kind(), entry.item.media.url().to_string()))
            .collect::<Vec<_>>()
    };

    for (kind, url) in visible {
        app.note_rendered(kind, &url);
    }
}

/// Two-line card: title row, then description and media status.
fn card<'a>(entry: &'a Entry, media: &MediaHealth) -> ListItem<'a> {
    let item = &entry.item;
    let (badge, badge_color) = match item.media {
        Media::Image { .. } => ("[IMG]", Color::Cyan),
        Media::Video { .. } => ("[VID]", Color::Magenta),
    };

    let title = Line::from(vec![
        Span::styled(badge, Style::default().fg(badge_color)),
        Span::raw(" "),
        Span::styled(&item.title, Style::default().fg(Color::White)),
        Span::styled(
            format!("  #{} [{}]", item.id, entry.key),
            Style::default().fg(Color::DarkGray),
        ),
        Span::raw("  "),
        Span::styled(
            item.dimensions.to_string(),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let kind = item.kind();
    let media_span = if media.has_failed(kind, item.media.url()) {
        Span::styled(
            format!("[{kind} failed to load]"),
            Style::default().fg(Color::Red),
        )
    } else {
        match kind {
            MediaKind::Image => Span::styled(
                item.media.url(),
                Style::default().fg(Color::DarkGray),
            ),
            MediaKind::Video => Span::styled(
                format!("▶ {}  (Enter to play)", item.thumbnail_url),
                Style::default().fg(Color::DarkGray),
            ),
        }
    };

    let detail = Line::from(vec![
        Span::raw("      "),
        Span::styled(&item.description, Style::default().fg(Color::Gray)),
        Span::raw("  "),
        media_span,
    ]);

    ListItem::new(vec![title, detail])
}

/// Transient notice if one is showing, otherwise the loading indicator.
fn draw_notice(app: &App, frame: &mut Frame, area: Rect) {
    let feed = &app.current().feed;

    let line = if let Some(notice) = feed.notice() {
        let (icon, color) = match notice.kind {
            NoticeKind::Updated => ("✨", Color::Green),
            NoticeKind::Failed => ("✖", Color::Red),
        };
        Line::from(Span::styled(
            format!(" {icon} {}", notice.text),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ))
    } else if feed.is_refreshing() {
        Line::from(Span::styled(
            " ⟳ Refreshing…",
            Style::default().fg(Color::Yellow),
        ))
    } else if let Some(page) = feed.loading_page() {
        Line::from(Span::styled(
            format!(" ⟳ Loading page {page}…"),
            Style::default().fg(Color::Yellow),
        ))
    } else if feed.has_snapshot() {
        Line::from(Span::styled(
            " ↑ scroll to the top to bring back the previous feed",
            Style::default().fg(Color::DarkGray),
        ))
    } else if !feed.has_more() {
        Line::from(Span::styled(
            " — end of feed, press r to refresh —",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Line::default()
    };

    frame.render_widget(Paragraph::new(line), area);
}

/// Render the bottom status bar.
fn draw_status_bar(app: &App, frame: &mut Frame, area: Rect) {
    let feed = &app.current().feed;
    let refreshed = feed
        .last_refreshed()
        .map(|t| format!("  refreshed {}", t.format("%H:%M:%S")))
        .unwrap_or_default();

    let status = Paragraph::new(Line::from(vec![
        Span::styled(" ", Style::default()),
        Span::styled(&app.status, Style::default().fg(Color::Yellow)),
        Span::raw("  "),
        Span::styled(
            format!("{} cards", feed.entries().len()),
            Style::default().fg(Color::Green),
        ),
        Span::styled(
            format!("  next page {}", feed.cursor()),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!(
                "  failed: {} img / {} vid",
                app.media.failed_count(MediaKind::Image),
                app.media.failed_count(MediaKind::Video)
            ),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(refreshed, Style::default().fg(Color::DarkGray)),
        Span::raw("  q: quit  r: refresh  Tab: switch  Enter: play"),
    ]));
    frame.render_widget(status, area);
}

fn draw_overlay(app: &App, frame: &mut Frame) {
    let Some(url) = app.overlay.playing() else {
        return;
    };
    let area = centered(frame.area(), 70, 7);

    let mut lines = vec![
        Line::from(Span::styled(url, Style::default().fg(Color::White))),
        Line::default(),
    ];
    if app.media.has_failed(MediaKind::Video, url) {
        lines.push(Line::from(Span::styled(
            "⚠ playback failed",
            Style::default().fg(Color::Red),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            "▶ playing",
            Style::default().fg(Color::Green),
        )));
    }
    lines.push(Line::from(Span::styled(
        "x / Esc: close",
        Style::default().fg(Color::DarkGray),
    )));

    let popup = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .title(" Now playing ")
                .borders(Borders::ALL),
        );

    frame.render_widget(Clear, area);
    frame.render_widget(popup, area);
}

fn centered(area: Rect, width_percent: u16, height: u16) -> Rect {
    let width = (u32::from(area.width) * u32::from(width_percent) / 100) as u16;
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FeedConfig;
    use crate::feed::tests::make_items;
    use crate::fetch::{FetchMsg, Job};
    use crate::source::Format;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use std::time::Instant;

    fn loaded_app() -> App {
        let mut app = App::new(&FeedConfig::default(), &Format::ALL, Format::Picsum);
        app.mount();
        for job in app.take_jobs() {
            if let Job::Page { tab, request } = job {
                app.apply(
                    FetchMsg::Page {
                        tab,
                        result: request.resolve(Ok(make_items(request.page, 10))),
                    },
                    Instant::now(),
                );
            }
        }
        app
    }

    fn render(app: &mut App) -> String {
        let backend = TestBackend::new(120, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| draw(app, f)).unwrap();

        let buf = terminal.backend().buffer().clone();
        buf.content()
            .iter()
            .map(|c| c.symbol().chars().next().unwrap_or(' '))
            .collect()
    }

    #[test]
    fn draw_does_not_panic_with_no_items() {
        let mut app = App::new(&FeedConfig::default(), &Format::ALL, Format::Picsum);
        render(&mut app);
    }

    #[test]
    fn draw_shows_cards_and_count() {
        let mut app = loaded_app();
        let text = render(&mut app);
        assert!(text.contains("Card 1-0"));
        assert!(text.contains("10 cards"), "status bar should show card count");
    }

    #[test]
    fn loading_indicator_names_the_page() {
        let mut app = loaded_app();
        app.select_last();
        let text = render(&mut app);
        assert!(text.contains("Loading page 2"));
    }

    #[test]
    fn failed_image_renders_placeholder() {
        let mut app = loaded_app();
        app.media.mark_failed(MediaKind::Image, "https://img/1/0");
        let text = render(&mut app);
        assert!(text.contains("[image failed to load]"));
    }

    #[test]
    fn rendering_probes_visible_media() {
        let mut app = loaded_app();
        render(&mut app);
        let probes = app
            .take_jobs()
            .into_iter()
            .filter(|j| matches!(j, Job::Probe { .. }))
            .count();
        assert!(probes > 0);
        assert!(probes <= 10);

        render(&mut app);
        assert!(app.take_jobs().is_empty(), "media is probed once");
    }

    #[test]
    fn overlay_is_drawn_when_playing() {
        let mut app = loaded_app();
        app.overlay.activate("https://vid/sample.mp4");
        let text = render(&mut app);
        assert!(text.contains("Now playing"));
        assert!(text.contains("https://vid/sample.mp4"));
    }
}
