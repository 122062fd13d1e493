//! Core terminal logic, independent of how it is drawn.
//!
//! - **commands**: static command table and greeting set
//! - **dispatcher**: routes a submitted line to output or a remote task
//! - **overlay**: the timed full-screen `matrix` overlay
//! - **session**: output log, input line and overlay state
//!
//! # Architecture
//!
//! ```text
//! Dispatcher
//! ├── Services (assistant, locator, geocoder)
//! └── tokio tasks ──TaskEvent──> apply()
//!                                   │
//! TerminalSession <─────────────────┘
//! ├── output log (LineId per line)
//! ├── input + InputHistory
//! └── Option<Overlay>
//! ```

pub mod commands;
pub mod dispatcher;
pub mod overlay;
pub mod session;
