//! Interactive run loop.
//!
//! The UI thread owns every piece of state: it polls crossterm for input,
//! applies finished remote tasks, steps the overlay and draws a frame.

use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyEventKind};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::{debug, info};

use crate::config::Config;
use crate::core::dispatcher::{Dispatcher, Services, TaskEvent};
use crate::core::session::TerminalSession;
use crate::deck::ExperienceDeck;
use crate::ui::{InputAction, KeyMapper, Renderer, TypingBanner, View};

pub const WELCOME: &str = "Welcome to my interactive terminal!";
pub const WELCOME_HINT: &str =
    "Type 'help' to see available commands, or just ask me a question.";

/// Time between overlay steps and idle redraws (~30 fps)
const FRAME_INTERVAL: Duration = Duration::from_millis(33);
/// Rows moved per PageUp/PageDown
const SCROLL_STEP: usize = 10;

pub struct App {
    session: TerminalSession,
    dispatcher: Dispatcher,
    events: UnboundedReceiver<TaskEvent>,
    deck: ExperienceDeck,
    banner: TypingBanner,
    renderer: Renderer,
    prompt: String,
    started: Instant,
}

impl App {
    pub fn new(config: &Config, services: Services, runtime: Handle) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        let mut session = TerminalSession::new();
        session.print(WELCOME);
        session.print(WELCOME_HINT);

        Self {
            session,
            dispatcher: Dispatcher::new(services, runtime, tx),
            events: rx,
            deck: ExperienceDeck::default(),
            banner: TypingBanner::for_owner(&config.owner),
            renderer: Renderer::with_color_scheme(config.get_color_scheme()),
            prompt: format!("user@{}:~$ ", config.owner),
            started: Instant::now(),
        }
    }

    /// Run until the user quits
    pub fn run(&mut self) -> anyhow::Result<()> {
        let (cols, rows) = Renderer::size()?;
        info!("Terminal size: {}x{}", cols, rows);
        self.dispatcher.set_viewport(cols, rows);

        self.renderer.init()?;
        let result = self.run_loop();
        self.renderer.cleanup()?;
        result
    }

    fn run_loop(&mut self) -> anyhow::Result<()> {
        let poll_timeout = Duration::from_millis(10);
        let mut rng = rand::rng();
        let mut last_frame: Option<Instant> = None;
        let mut dirty = true;

        loop {
            // Finished remote work
            while let Ok(event) = self.events.try_recv() {
                self.dispatcher.apply(&mut self.session, event);
                dirty = true;
            }

            let now = Instant::now();
            let frame_due = last_frame.map_or(true, |t| now.duration_since(t) >= FRAME_INTERVAL);
            if frame_due {
                if let Some(overlay) = self.session.overlay_mut() {
                    overlay.advance(&mut rng);
                }
            }
            if self.session.expire_overlay(now) {
                info!("Matrix overlay finished");
                dirty = true;
            }

            if dirty || frame_due {
                self.draw()?;
                last_frame = Some(now);
                dirty = false;
            }

            if event::poll(poll_timeout)? {
                match event::read()? {
                    Event::Key(key_event) => {
                        // Only process key press events
                        if key_event.kind != KeyEventKind::Press {
                            continue;
                        }
                        if let Some(action) = KeyMapper::map(&key_event) {
                            if !self.handle(action, Instant::now()) {
                                info!("Quit requested");
                                break;
                            }
                            dirty = true;
                        }
                    }
                    Event::Resize(cols, rows) => {
                        self.resize(cols, rows);
                        dirty = true;
                    }
                    _ => {}
                }
            }
        }

        Ok(())
    }

    fn draw(&mut self) -> std::io::Result<()> {
        let banner = self.banner.frame(self.started.elapsed());
        let view = View {
            session: &self.session,
            deck: &self.deck,
            banner: &banner,
            prompt: &self.prompt,
            query_pending: self.dispatcher.is_query_pending(),
        };
        self.renderer.render(&view)
    }

    /// Apply one input action. Returns false when the user asked to quit.
    pub fn handle(&mut self, action: InputAction, now: Instant) -> bool {
        match action {
            InputAction::Quit => return false,
            InputAction::Submit => {
                self.renderer.reset_scroll();
                let outcome = self.dispatcher.submit(&mut self.session);
                debug!("Submitted: {:?}", outcome);
            }
            InputAction::Insert(ch) => self.session.insert_char(ch),
            InputAction::Backspace => self.session.backspace(),
            InputAction::HistoryPrev => self.session.recall_older(),
            InputAction::HistoryNext => self.session.recall_newer(),
            InputAction::DeckPrev => {
                self.deck.navigate(-1, now);
            }
            InputAction::DeckNext => {
                self.deck.navigate(1, now);
            }
            InputAction::ScrollUp => self.renderer.scroll_up(SCROLL_STEP),
            InputAction::ScrollDown => self.renderer.scroll_down(SCROLL_STEP),
            InputAction::ToggleTheme => {
                let scheme = self.renderer.color_scheme.toggled();
                info!("Theme switched to {}", scheme.name);
                self.renderer.set_color_scheme(scheme);
            }
        }
        true
    }

    /// Follow a terminal resize
    pub fn resize(&mut self, cols: u16, rows: u16) {
        debug!("Resize to {}x{}", cols, rows);
        self.dispatcher.set_viewport(cols, rows);
        if let Some(overlay) = self.session.overlay_mut() {
            overlay.resize(cols, rows);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::{DisabledLocator, HttpAssistant, NominatimGeocoder};
    use std::sync::Arc;

    fn app() -> App {
        let config = Config::default();
        let services = Services {
            assistant: Arc::new(HttpAssistant::new(&config.assistant).unwrap()),
            locator: Arc::new(DisabledLocator),
            geocoder: Arc::new(NominatimGeocoder::new(&config.location).unwrap()),
            locate_timeout: Duration::from_secs(5),
        };
        App::new(&config, services, Handle::current())
    }

    fn type_line(app: &mut App, line: &str) {
        let now = Instant::now();
        for ch in line.chars() {
            app.handle(InputAction::Insert(ch), now);
        }
        app.handle(InputAction::Submit, now);
    }

    #[tokio::test]
    async fn test_starts_with_welcome() {
        let app = app();
        assert_eq!(app.session.transcript(), vec![WELCOME, WELCOME_HINT]);
        assert_eq!(app.prompt, "user@apoorv:~$ ");
    }

    #[tokio::test]
    async fn test_typed_command_runs() {
        let mut app = app();
        type_line(&mut app, "LOCATION");
        assert!(app.session.contains_text("Currently based in New York, USA."));

        // Up brings the command back
        app.handle(InputAction::HistoryPrev, Instant::now());
        assert_eq!(app.session.input(), "LOCATION");
    }

    #[tokio::test]
    async fn test_overlay_follows_resize() {
        let mut app = app();
        app.resize(100, 30);
        type_line(&mut app, "matrix");

        let rain = app.session.overlay().unwrap().rain();
        assert_eq!((rain.cols(), rain.rows()), (100, 30));

        app.resize(60, 20);
        let rain = app.session.overlay().unwrap().rain();
        assert_eq!((rain.cols(), rain.rows()), (60, 20));

        // Typing continues while the prompt is hidden
        type_line(&mut app, "clear");
        assert!(!app.session.is_overlay_active());
    }

    #[tokio::test]
    async fn test_theme_toggle_and_quit() {
        let mut app = app();
        assert_eq!(app.renderer.color_scheme.name, "dark");
        assert!(app.handle(InputAction::ToggleTheme, Instant::now()));
        assert_eq!(app.renderer.color_scheme.name, "light");
        assert!(!app.handle(InputAction::Quit, Instant::now()));
    }

    #[tokio::test]
    async fn test_deck_keys() {
        let mut app = app();
        let start = Instant::now();
        app.handle(InputAction::DeckNext, start);
        assert_eq!(app.deck.current(), 1);
        // Throttled
        app.handle(InputAction::DeckNext, start + Duration::from_millis(100));
        assert_eq!(app.deck.current(), 1);
        app.handle(InputAction::DeckPrev, start + Duration::from_millis(600));
        assert_eq!(app.deck.current(), 0);
    }
}
