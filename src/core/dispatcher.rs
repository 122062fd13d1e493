//! Command dispatcher
//!
//! Turns one submitted line into output. Greetings and table entries are
//! answered on the spot; anything else goes to the remote assistant. Work
//! that needs the network runs as a task on the tokio runtime and reports
//! back through a [`TaskEvent`], which the UI thread hands to
//! [`Dispatcher::apply`]. Tasks never touch the session themselves.
//!
//! Only one assistant query is kept in flight. Submitting another unmatched
//! line aborts the previous query and removes its placeholder.

use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::seq::IndexedRandom;
use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::commands::{self, Action, CommandEntry, GREETING_RESPONSE, QUOTES};
use super::overlay::Overlay;
use super::session::{LineId, TerminalSession};
use crate::config::Config;
use crate::remote::location::resolve_place;
use crate::remote::{
    Assistant, DisabledLocator, Geocoder, HttpAssistant, IpLocator, LocateError, Locator,
    NominatimGeocoder, Place, RemoteError,
};

pub const THINKING: &str = "Thinking...";
pub const ASSISTANT_FAILURE: &str =
    "Sorry, I was unable to connect to my AI brain. Please make sure the local server is running.";
pub const FETCHING_LOCATION: &str = "Fetching your location...";
pub const LOCATION_UNSUPPORTED: &str = "Geolocation is not supported by your browser.";
pub const LOCATION_FAILURE: &str =
    "Could not retrieve your location. Please ensure you have granted permission.";

/// Remote services the dispatcher calls out to
pub struct Services {
    pub assistant: Arc<dyn Assistant>,
    pub locator: Arc<dyn Locator>,
    pub geocoder: Arc<dyn Geocoder>,
    /// Bound on waiting for a location fix
    pub locate_timeout: Duration,
}

impl Services {
    /// HTTP-backed services as configured
    pub fn from_config(config: &Config) -> Result<Self, RemoteError> {
        let locator: Arc<dyn Locator> = if config.location.enabled {
            Arc::new(IpLocator::new(&config.location)?)
        } else {
            Arc::new(DisabledLocator)
        };

        Ok(Self {
            assistant: Arc::new(HttpAssistant::new(&config.assistant)?),
            locator,
            geocoder: Arc::new(NominatimGeocoder::new(&config.location)?),
            locate_timeout: config.location.timeout(),
        })
    }
}

/// Completion of work started by the dispatcher
#[derive(Debug)]
pub enum TaskEvent {
    QueryFinished {
        ticket: u64,
        result: Result<String, RemoteError>,
    },
    LocationResolved(Result<Place, LocateError>),
}

/// How a submitted line was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Blank input
    Ignored,
    Greeting,
    Literal,
    /// Action finished inside `execute`
    Completed(Action),
    /// Action finishes when its [`TaskEvent`] is applied
    Pending(Action),
    /// Sent to the assistant
    Remote,
}

struct InflightQuery {
    ticket: u64,
    placeholder: LineId,
    task: JoinHandle<()>,
}

pub struct Dispatcher {
    services: Services,
    runtime: Handle,
    events: UnboundedSender<TaskEvent>,
    inflight: Option<InflightQuery>,
    next_ticket: u64,
    /// Size given to new overlays
    viewport: (u16, u16),
}

impl Dispatcher {
    pub fn new(services: Services, runtime: Handle, events: UnboundedSender<TaskEvent>) -> Self {
        Self {
            services,
            runtime,
            events,
            inflight: None,
            next_ticket: 1,
            viewport: (80, 24),
        }
    }

    pub fn set_viewport(&mut self, cols: u16, rows: u16) {
        self.viewport = (cols, rows);
    }

    /// Whether an assistant query is still waiting for its answer
    pub fn is_query_pending(&self) -> bool {
        self.inflight.is_some()
    }

    /// Submit whatever is in the session's input buffer
    pub fn submit(&mut self, session: &mut TerminalSession) -> Dispatch {
        let line = session.take_input();
        let command = line.trim();
        if command.is_empty() {
            return Dispatch::Ignored;
        }

        session.history_mut().add(command);
        session.echo(command);
        self.execute(session, command)
    }

    /// Handle one line of input
    pub fn execute(&mut self, session: &mut TerminalSession, raw: &str) -> Dispatch {
        let input = raw.trim();
        if input.is_empty() {
            return Dispatch::Ignored;
        }

        if commands::is_greeting(input) {
            session.print(GREETING_RESPONSE);
            return Dispatch::Greeting;
        }

        match commands::lookup(input) {
            Some(CommandEntry::Literal(text)) => {
                session.print(text);
                Dispatch::Literal
            }
            Some(CommandEntry::Action(action)) => self.run_action(session, action),
            None => {
                self.query(session, input);
                Dispatch::Remote
            }
        }
    }

    fn run_action(&mut self, session: &mut TerminalSession, action: Action) -> Dispatch {
        debug!("Running {:?}", action);
        match action {
            Action::Quote => {
                let mut rng = rand::rng();
                if let Some(quote) = QUOTES.choose(&mut rng) {
                    session.print(*quote);
                }
            }
            Action::Date => {
                let now = chrono::Local::now();
                session.print(now.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string());
            }
            Action::Matrix => {
                let (cols, rows) = self.viewport;
                if session.launch_overlay(Overlay::new(cols, rows, Instant::now())) {
                    info!("Matrix overlay started at {}x{}", cols, rows);
                }
            }
            Action::Clear => {
                session.clear_output();
                if session.dismiss_overlay() {
                    info!("Matrix overlay ended by clear");
                }
            }
            Action::WhereAmI => {
                session.print(FETCHING_LOCATION);
                if !self.services.locator.is_supported() {
                    session.print_error(LOCATION_UNSUPPORTED);
                    return Dispatch::Completed(action);
                }
                self.spawn_location_lookup();
                return Dispatch::Pending(action);
            }
        }
        Dispatch::Completed(action)
    }

    fn spawn_location_lookup(&self) {
        let locator = Arc::clone(&self.services.locator);
        let geocoder = Arc::clone(&self.services.geocoder);
        let wait = self.services.locate_timeout;
        let events = self.events.clone();

        self.runtime.spawn(async move {
            let result = resolve_place(locator.as_ref(), geocoder.as_ref(), wait).await;
            let _ = events.send(TaskEvent::LocationResolved(result));
        });
    }

    /// Ask the assistant, replacing any query still in flight
    fn query(&mut self, session: &mut TerminalSession, prompt: &str) {
        if let Some(previous) = self.inflight.take() {
            previous.task.abort();
            session.remove_line(previous.placeholder);
            debug!("Query #{} replaced before it finished", previous.ticket);
        }

        let placeholder = session.print_placeholder(THINKING);
        let ticket = self.next_ticket;
        self.next_ticket += 1;

        let assistant = Arc::clone(&self.services.assistant);
        let events = self.events.clone();
        let prompt = prompt.to_string();
        let task = self.runtime.spawn(async move {
            let result = assistant.ask(&prompt).await;
            let _ = events.send(TaskEvent::QueryFinished { ticket, result });
        });

        debug!("Query #{} sent", ticket);
        self.inflight = Some(InflightQuery {
            ticket,
            placeholder,
            task,
        });
    }

    /// Apply a finished task to the session
    pub fn apply(&mut self, session: &mut TerminalSession, event: TaskEvent) {
        match event {
            TaskEvent::QueryFinished { ticket, result } => {
                if self.inflight.as_ref().map(|q| q.ticket) != Some(ticket) {
                    debug!("Dropping result of replaced query #{}", ticket);
                    return;
                }
                if let Some(query) = self.inflight.take() {
                    session.remove_line(query.placeholder);
                }

                match result {
                    Ok(reply) => {
                        session.print(reply);
                    }
                    Err(e) => {
                        warn!("Assistant query #{} failed: {}", ticket, e);
                        session.print_error(ASSISTANT_FAILURE);
                    }
                }
            }
            TaskEvent::LocationResolved(result) => match result {
                Ok(place) => {
                    session.print(format!(
                        "Your location is approximately: {}, {}",
                        place.city, place.country
                    ));
                }
                Err(LocateError::Unsupported) => {
                    session.print_error(LOCATION_UNSUPPORTED);
                }
                Err(e) => {
                    warn!("Location lookup failed: {}", e);
                    session.print_error(LOCATION_FAILURE);
                }
            },
        }
    }
}
