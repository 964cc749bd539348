//! Preview Module - Drive a headless page from the terminal
//!
//! Support code for the `folio-preview` binary: a sample portfolio page,
//! crossterm event conversion and a plain-text rendering of controller
//! state. Everything here is terminal-free except [`poll_command`], so the
//! mapping and rendering are unit tested.
//!
//! # Keys
//!
//! ```text
//! ↑/k ↓/j      scroll one step        PageUp/PageDown  scroll one viewport
//! Home/End     top / bottom           m                toggle mobile nav
//! 1-9          click nav link N       s                submit contact form
//! q / Esc / Ctrl+C                    quit
//! ```

use std::time::Duration;

use crossterm::event::{
    poll, read, Event as CrosstermEvent, KeyCode, KeyEvent as CrosstermKeyEvent, KeyEventKind,
    KeyModifiers, MouseEvent as CrosstermMouseEvent, MouseEventKind,
};

use crate::dom::{ElementSpec, HeadlessPage, Page};
use crate::observer::IntersectionHost;
use crate::pipeline::{Dispatch, PageController, PageEvent};
use crate::state::StatusTone;

/// Pixels scrolled per arrow key or wheel notch.
pub const SCROLL_STEP: f32 = 80.0;

/// CSS pixels per terminal cell, for mapping the terminal to a viewport.
pub const CELL_WIDTH: f32 = 8.0;
pub const CELL_HEIGHT: f32 = 16.0;

// =============================================================================
// SAMPLE PAGE
// =============================================================================

const SECTIONS: [(&str, &str, f32); 5] = [
    ("hero", "Hi, I build things for the web", 560.0),
    ("about", "About", 720.0),
    ("work", "Selected Work", 800.0),
    ("experience", "Experience", 760.0),
    ("contact", "Contact", 640.0),
];

/// The stock portfolio layout: a header with nav, five sections with
/// reveal cards, a contact form posting to `relay_action`, and a footer.
pub fn sample_portfolio_page(
    location: &str,
    relay_action: &str,
    sender_email: &str,
) -> Result<HeadlessPage, url::ParseError> {
    let links = SECTIONS.iter().skip(1).map(|(id, title, _)| {
        ElementSpec::new("a")
            .class("nav-link")
            .attr("href", &format!("#{id}"))
            .text(title)
    });

    let header = ElementSpec::new("header")
        .class("site-header")
        .height(72.0)
        .child(ElementSpec::new("a").class("brand").attr("href", "#").text("Folio"))
        .child(
            ElementSpec::new("button")
                .id("nav-toggle")
                .attr("aria-expanded", "false")
                .attr("aria-controls", "primary-nav")
                .text("Menu"),
        )
        .child(ElementSpec::new("nav").id("primary-nav").children(links));

    let sections = SECTIONS.iter().map(|(id, title, height)| {
        let mut section = ElementSpec::new("section")
            .id(id)
            .height(*height)
            .child(ElementSpec::new("h2").class("reveal").height(48.0).text(title));

        if *id == "work" {
            section = section.children((1..=6).map(|n| {
                ElementSpec::new("article")
                    .class("card")
                    .class("reveal")
                    .height(100.0)
                    .text(&format!("Project {n}"))
            }));
        }

        if *id == "contact" {
            section = section
                .child(
                    ElementSpec::new("form")
                        .id("contact-form")
                        .attr("action", relay_action)
                        .attr("method", "POST")
                        .child(ElementSpec::new("input").attr("name", "name").value("Preview Visitor"))
                        .child(ElementSpec::new("input").attr("name", "email").value(sender_email))
                        .child(
                            ElementSpec::new("textarea")
                                .attr("name", "message")
                                .value("Hello from the terminal preview."),
                        )
                        .child(
                            ElementSpec::new("input")
                                .attr("type", "hidden")
                                .attr("name", "_subject")
                                .value("New portfolio message"),
                        )
                        .child(
                            ElementSpec::new("button")
                                .attr("type", "submit")
                                .text("Send Message"),
                        ),
                )
                .child(ElementSpec::new("p").id("form-status").attr("role", "status"));
        }
        section
    });

    let body = ElementSpec::new("body")
        .child(ElementSpec::new("div").id("scroll-progress"))
        .child(header)
        .child(ElementSpec::new("main").children(sections))
        .child(
            ElementSpec::new("footer")
                .height(96.0)
                .child(ElementSpec::new("span").id("current-year")),
        );

    HeadlessPage::builder(body).location(location).build()
}

/// Viewport size in CSS pixels for a terminal of `cols` x `rows`.
pub fn terminal_viewport(cols: u16, rows: u16) -> (f32, f32) {
    (f32::from(cols) * CELL_WIDTH, f32::from(rows) * CELL_HEIGHT)
}

// =============================================================================
// COMMANDS
// =============================================================================

/// What a terminal event asks the preview to do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PreviewCommand {
    ScrollBy(f32),
    PageUp,
    PageDown,
    Top,
    Bottom,
    ToggleNav,
    /// Click the nav link at this zero-based index.
    ClickLink(usize),
    Submit,
    Resize(u16, u16),
    Quit,
}

/// Map a key press to a command. Releases and unbound keys map to `None`.
pub fn convert_key_event(event: CrosstermKeyEvent) -> Option<PreviewCommand> {
    if event.kind == KeyEventKind::Release {
        return None;
    }
    if event.modifiers.contains(KeyModifiers::CONTROL) {
        return (event.code == KeyCode::Char('c')).then_some(PreviewCommand::Quit);
    }

    match event.code {
        KeyCode::Up | KeyCode::Char('k') => Some(PreviewCommand::ScrollBy(-SCROLL_STEP)),
        KeyCode::Down | KeyCode::Char('j') => Some(PreviewCommand::ScrollBy(SCROLL_STEP)),
        KeyCode::PageUp => Some(PreviewCommand::PageUp),
        KeyCode::PageDown | KeyCode::Char(' ') => Some(PreviewCommand::PageDown),
        KeyCode::Home | KeyCode::Char('g') => Some(PreviewCommand::Top),
        KeyCode::End | KeyCode::Char('G') => Some(PreviewCommand::Bottom),
        KeyCode::Char('m') => Some(PreviewCommand::ToggleNav),
        KeyCode::Char('s') => Some(PreviewCommand::Submit),
        KeyCode::Char('q') | KeyCode::Esc => Some(PreviewCommand::Quit),
        KeyCode::Char(c @ '1'..='9') => c
            .to_digit(10)
            .map(|n| PreviewCommand::ClickLink(n as usize - 1)),
        _ => None,
    }
}

/// Map a mouse event to a command (wheel only).
pub fn convert_mouse_event(event: CrosstermMouseEvent) -> Option<PreviewCommand> {
    match event.kind {
        MouseEventKind::ScrollUp => Some(PreviewCommand::ScrollBy(-SCROLL_STEP)),
        MouseEventKind::ScrollDown => Some(PreviewCommand::ScrollBy(SCROLL_STEP)),
        _ => None,
    }
}

pub fn convert_event(event: CrosstermEvent) -> Option<PreviewCommand> {
    match event {
        CrosstermEvent::Key(key) => convert_key_event(key),
        CrosstermEvent::Mouse(mouse) => convert_mouse_event(mouse),
        CrosstermEvent::Resize(cols, rows) => Some(PreviewCommand::Resize(cols, rows)),
        _ => None,
    }
}

/// Poll for the next command with timeout.
pub fn poll_command(timeout: Duration) -> std::io::Result<Option<PreviewCommand>> {
    if poll(timeout)? {
        Ok(convert_event(read()?))
    } else {
        Ok(None)
    }
}

// =============================================================================
// APPLYING COMMANDS
// =============================================================================

/// Apply `command` to a controller mounted on a headless page.
///
/// Returns `false` when the preview should exit.
pub fn apply_command<O: IntersectionHost>(
    controller: &mut PageController<HeadlessPage, O>,
    command: PreviewCommand,
) -> bool {
    match command {
        PreviewCommand::Quit => return false,
        PreviewCommand::ScrollBy(dy) => scroll(controller, |page| page.scroll_by(dy)),
        PreviewCommand::PageUp => scroll(controller, |page| {
            let height = page.inner_height();
            page.scroll_by(-height);
        }),
        PreviewCommand::PageDown => scroll(controller, |page| {
            let height = page.inner_height();
            page.scroll_by(height);
        }),
        PreviewCommand::Top => scroll(controller, |page| page.set_scroll_y(0.0)),
        PreviewCommand::Bottom => scroll(controller, |page| {
            let max = page.max_scroll();
            page.set_scroll_y(max);
        }),
        PreviewCommand::Resize(cols, rows) => {
            let (width, height) = terminal_viewport(cols, rows);
            controller.page_mut().resize(width, height);
            controller.dispatch(PageEvent::Resize);
        }
        PreviewCommand::ToggleNav => {
            let toggle = controller
                .page()
                .query_selector(&controller.config().selectors.nav_toggle);
            if let Some(toggle) = toggle {
                controller.dispatch(PageEvent::Click(toggle));
            }
        }
        PreviewCommand::ClickLink(index) => {
            let links = controller
                .page()
                .query_selector_all(&controller.config().selectors.nav_links);
            if let Some(&link) = links.get(index) {
                // Anchor scrolling moves the page, which fires scroll events
                if controller.dispatch(PageEvent::Click(link)) == Dispatch::Prevented {
                    controller.dispatch(PageEvent::Scroll);
                }
            }
        }
        PreviewCommand::Submit => {
            let form = controller.contact().map(|contact| contact.form());
            if let Some(form) = form {
                controller.dispatch(PageEvent::Submit(form));
            }
        }
    }
    true
}

fn scroll<O: IntersectionHost>(
    controller: &mut PageController<HeadlessPage, O>,
    move_page: impl FnOnce(&mut HeadlessPage),
) {
    let before = controller.page().scroll_y();
    move_page(controller.page_mut());
    if controller.page().scroll_y() != before {
        controller.dispatch(PageEvent::Scroll);
    }
}

// =============================================================================
// RENDERING
// =============================================================================

/// `[#####.....]` bar of `width` cells for `percent`.
pub fn progress_bar(percent: f32, width: usize) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * width as f32).round() as usize;
    let filled = filled.min(width);
    format!("[{}{}]", "#".repeat(filled), ".".repeat(width - filled))
}

/// Plain-text lines describing the page and controller state.
pub fn render_lines<O: IntersectionHost>(
    controller: &PageController<HeadlessPage, O>,
    width: usize,
) -> Vec<String> {
    let page = controller.page();
    let state = controller.state();
    let selectors = &controller.config().selectors;
    let mut lines = Vec::new();

    let bar_width = width.saturating_sub(10).max(10);
    lines.push(format!(
        "{} {:>5.1}%",
        progress_bar(state.progress.get(), bar_width),
        state.progress.get()
    ));
    lines.push(format!(
        "scroll {:.0}/{:.0}px  viewport {:.0}x{:.0}",
        page.scroll_y(),
        page.max_scroll(),
        page.inner_width(),
        page.inner_height()
    ));

    let menu = if state.nav_open.get() { "open" } else { "closed" };
    let links: Vec<String> = page
        .query_selector_all(&selectors.nav_links)
        .into_iter()
        .enumerate()
        .map(|(i, link)| {
            let label = page.text(link);
            if page.has_class(link, &controller.config().highlight.active_class) {
                format!("{}:[{}]", i + 1, label)
            } else {
                format!("{}:{}", i + 1, label)
            }
        })
        .collect();
    lines.push(format!("menu {menu}  {}", links.join("  ")));

    let active = state.active_section.get().unwrap_or_else(|| "-".to_string());
    let revealed = state.revealed.get();
    let total = controller.reveal().map(|r| r.items().len()).unwrap_or(0);
    lines.push(format!("section {active}  revealed {revealed}/{total}"));

    if let Some(year) = page.query_selector(&selectors.year) {
        lines.push(format!("footer © {}", page.text(year)));
    }

    match state.status.get() {
        Some(status) => {
            let tone = match status.tone {
                StatusTone::Pending => "pending",
                StatusTone::Success => "success",
                StatusTone::Error => "error",
            };
            lines.push(format!("form [{tone}] {}", status.text));
        }
        None => lines.push("form -".to_string()),
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::GeometryObserverHost;
    use crate::state::FixedClock;
    use crossterm::event::KeyEventState;

    fn key(code: KeyCode) -> CrosstermKeyEvent {
        CrosstermKeyEvent {
            code,
            modifiers: KeyModifiers::empty(),
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn controller() -> PageController<HeadlessPage, GeometryObserverHost> {
        let mut page = sample_portfolio_page(
            "http://localhost:5500/",
            "https://relay.example/ajax/hello@example.com",
            "visitor@example.com",
        )
        .unwrap();
        page.resize(1024.0, 768.0);
        PageController::builder(page, GeometryObserverHost::new())
            .clock(FixedClock(2027))
            .mount()
    }

    #[test]
    fn test_convert_keys() {
        assert_eq!(
            convert_key_event(key(KeyCode::Down)),
            Some(PreviewCommand::ScrollBy(SCROLL_STEP))
        );
        assert_eq!(
            convert_key_event(key(KeyCode::Char('k'))),
            Some(PreviewCommand::ScrollBy(-SCROLL_STEP))
        );
        assert_eq!(convert_key_event(key(KeyCode::Char('m'))), Some(PreviewCommand::ToggleNav));
        assert_eq!(convert_key_event(key(KeyCode::Char('3'))), Some(PreviewCommand::ClickLink(2)));
        assert_eq!(convert_key_event(key(KeyCode::Esc)), Some(PreviewCommand::Quit));
        assert_eq!(convert_key_event(key(KeyCode::Char('x'))), None);
    }

    #[test]
    fn test_convert_key_release_and_ctrl() {
        let mut release = key(KeyCode::Char('q'));
        release.kind = KeyEventKind::Release;
        assert_eq!(convert_key_event(release), None);

        let mut ctrl_c = key(KeyCode::Char('c'));
        ctrl_c.modifiers = KeyModifiers::CONTROL;
        assert_eq!(convert_key_event(ctrl_c), Some(PreviewCommand::Quit));

        let mut ctrl_m = key(KeyCode::Char('m'));
        ctrl_m.modifiers = KeyModifiers::CONTROL;
        assert_eq!(convert_key_event(ctrl_m), None);
    }

    #[test]
    fn test_convert_wheel_and_resize() {
        let wheel = CrosstermMouseEvent {
            kind: MouseEventKind::ScrollDown,
            column: 0,
            row: 0,
            modifiers: KeyModifiers::empty(),
        };
        assert_eq!(
            convert_event(CrosstermEvent::Mouse(wheel)),
            Some(PreviewCommand::ScrollBy(SCROLL_STEP))
        );
        assert_eq!(
            convert_event(CrosstermEvent::Resize(100, 40)),
            Some(PreviewCommand::Resize(100, 40))
        );
        assert_eq!(terminal_viewport(100, 40), (800.0, 640.0));
    }

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(0.0, 4), "[....]");
        assert_eq!(progress_bar(50.0, 4), "[##..]");
        assert_eq!(progress_bar(150.0, 4), "[####]");
    }

    #[test]
    fn test_sample_page_wires_everything() {
        let controller = controller();
        assert_eq!(controller.features(), crate::types::Features::all());

        let lines = render_lines(&controller, 60);
        assert!(lines.iter().any(|l| l == "footer © 2027"));
        assert!(lines.iter().any(|l| l == "form -"));
    }

    #[test]
    fn test_commands_drive_controller() {
        let mut c = controller();

        assert!(apply_command(&mut c, PreviewCommand::Bottom));
        assert_eq!(c.state().progress.get(), 100.0);

        assert!(apply_command(&mut c, PreviewCommand::ToggleNav));
        assert!(c.state().nav_open.get());

        // Link 2 is #work; clicking it closes the menu and scrolls
        assert!(apply_command(&mut c, PreviewCommand::ClickLink(1)));
        assert!(!c.state().nav_open.get());
        assert!(c.state().progress.get() < 100.0);

        assert!(apply_command(&mut c, PreviewCommand::Top));
        assert_eq!(c.state().progress.get(), 0.0);

        assert!(!apply_command(&mut c, PreviewCommand::Quit));
    }
}
