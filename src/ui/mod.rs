//! User interface rendering and input handling.
//!
//! - **renderer**: full-screen frame drawing (header, log, prompt, status bar, overlay)
//! - **keymapper**: keyboard input to [`InputAction`] mapping
//! - **banner**: the typing banner in the header
//! - **matrix**: rain state drawn by the `matrix` overlay

pub mod banner;
pub mod keymapper;
pub mod matrix;
pub mod renderer;

pub use banner::TypingBanner;
pub use keymapper::{InputAction, KeyMapper};
pub use renderer::{Renderer, View};
