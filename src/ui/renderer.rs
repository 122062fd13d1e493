//! Terminal renderer using crossterm
//!
//! Draws one frame of the whole screen:
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │ Heya, apoorv here!|                  │  banner
//! │ ‹ left   center card   right ›       │  experience deck
//! │──────────────────────────────────────│
//! │ output log ...                       │
//! │ user@apoorv:~$ input_                │  prompt (when visible)
//! │ status bar                           │
//! └──────────────────────────────────────┘
//! ```
//!
//! While the `matrix` overlay is up it covers the whole screen instead.

use std::io::{self, Write};

use crossterm::{
    cursor::{Hide, MoveTo, Show},
    execute,
    style::{
        Attribute, Color as CtColor, Print, ResetColor, SetAttribute, SetBackgroundColor,
        SetForegroundColor,
    },
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::config::ColorScheme;
use crate::core::overlay::Overlay;
use crate::core::session::{LineKind, TerminalSession};
use crate::deck::{ExperienceDeck, Placement};
use crate::ui::matrix::VISIBLE_THRESHOLD;

/// Banner, deck strip and separator
const HEADER_ROWS: u16 = 3;
const STATUS_ROWS: u16 = 1;

/// Begin a render frame (start synchronized update, disable autowrap, hide cursor)
fn begin_frame<W: Write>(out: &mut W) -> io::Result<()> {
    write!(out, "\x1b[?2026h")?;
    write!(out, "\x1b[?7l")?;
    execute!(out, Hide)?;
    Ok(())
}

/// End a render frame (enable autowrap, end synchronized update, flush)
fn end_frame<W: Write>(out: &mut W) -> io::Result<()> {
    write!(out, "\x1b[?7h")?;
    write!(out, "\x1b[?2026l")?;
    out.flush()?;
    Ok(())
}

/// Execute a render operation with frame guards, ensuring cleanup on error
fn with_frame<W: Write, F, R>(out: &mut W, f: F) -> io::Result<R>
where
    F: FnOnce(&mut W) -> io::Result<R>,
{
    begin_frame(out)?;
    let result = f(out);
    // Always end frame, even on error
    let _ = end_frame(out);
    result
}

/// Split `text` into rows no wider than `width` display columns
pub fn wrap_line(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut rows = Vec::new();
    let mut current = String::new();
    let mut current_width = 0;

    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if current_width + w > width && !current.is_empty() {
            rows.push(std::mem::take(&mut current));
            current_width = 0;
        }
        current.push(ch);
        current_width += w;
    }

    rows.push(current);
    rows
}

/// Longest prefix of `text` that fits in `width` columns
pub fn truncate_to_width(text: &str, width: usize) -> &str {
    let mut used = 0;
    for (i, ch) in text.char_indices() {
        let w = ch.width().unwrap_or(0);
        if used + w > width {
            return &text[..i];
        }
        used += w;
    }
    text
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Blank,
    /// Echoed command; `prompt_len` bytes at the start are the prompt
    Echo { prompt_len: usize },
    Output,
    Placeholder,
    Error,
    /// The live input line
    Input { prompt_len: usize },
}

/// One screen row of the terminal body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyRow {
    pub kind: RowKind,
    pub text: String,
}

impl BodyRow {
    fn new(kind: RowKind, text: String) -> Self {
        Self { kind, text }
    }
}

/// Wrap `prompt` + `text`, marking the prompt on the first row only
fn prompted_rows(
    prompt: &str,
    text: &str,
    width: usize,
    kind: fn(usize) -> RowKind,
) -> Vec<BodyRow> {
    wrap_line(&format!("{}{}", prompt, text), width)
        .into_iter()
        .enumerate()
        .map(|(i, row)| {
            let prompt_len = if i == 0 { prompt.len().min(row.len()) } else { 0 };
            BodyRow::new(kind(prompt_len), row)
        })
        .collect()
}

/// Lay the output log and the input line out as screen rows
pub fn body_rows(session: &TerminalSession, prompt: &str, width: usize) -> Vec<BodyRow> {
    let mut rows = Vec::new();

    for (i, line) in session.lines().iter().enumerate() {
        let kind = match line.kind {
            LineKind::Echo => {
                if i > 0 {
                    rows.push(BodyRow::new(RowKind::Blank, String::new()));
                }
                rows.extend(prompted_rows(prompt, &line.text, width, |prompt_len| {
                    RowKind::Echo { prompt_len }
                }));
                continue;
            }
            LineKind::Output => RowKind::Output,
            LineKind::Placeholder => RowKind::Placeholder,
            LineKind::Error => RowKind::Error,
        };

        for part in line.text.split('\n') {
            for row in wrap_line(part, width) {
                rows.push(BodyRow::new(kind, row));
            }
        }
    }

    if session.is_input_visible() {
        rows.extend(prompted_rows(prompt, session.input(), width, |prompt_len| {
            RowKind::Input { prompt_len }
        }));
    }

    rows
}

/// Rows `start..end` to show, and the scroll offset clamped to what exists
pub fn visible_range(total: usize, height: usize, scroll: usize) -> (usize, usize, usize) {
    let max_scroll = total.saturating_sub(height);
    let scroll = scroll.min(max_scroll);
    let end = total - scroll;
    (end.saturating_sub(height), end, scroll)
}

/// Everything a frame shows
pub struct View<'a> {
    pub session: &'a TerminalSession,
    pub deck: &'a ExperienceDeck,
    /// Banner text for this instant, cursor included
    pub banner: &'a str,
    pub prompt: &'a str,
    pub query_pending: bool,
}

/// Terminal renderer
pub struct Renderer {
    /// Whether the terminal has been initialized
    initialized: bool,
    pub color_scheme: ColorScheme,
    /// Rows scrolled back from the bottom of the log
    scroll: usize,
}

impl Renderer {
    pub fn with_color_scheme(color_scheme: ColorScheme) -> Self {
        Self {
            initialized: false,
            color_scheme,
            scroll: 0,
        }
    }

    /// Set color scheme
    pub fn set_color_scheme(&mut self, scheme: ColorScheme) {
        self.color_scheme = scheme;
    }

    pub fn scroll_up(&mut self, rows: usize) {
        self.scroll = self.scroll.saturating_add(rows);
    }

    pub fn scroll_down(&mut self, rows: usize) {
        self.scroll = self.scroll.saturating_sub(rows);
    }

    /// Jump back to the newest output
    pub fn reset_scroll(&mut self) {
        self.scroll = 0;
    }

    /// Initialize the terminal for rendering
    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;

        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, Clear(ClearType::All), MoveTo(0, 0))?;
        stdout.flush()?;
        self.initialized = true;
        Ok(())
    }

    /// Cleanup the terminal
    pub fn cleanup(&mut self) -> io::Result<()> {
        if !self.initialized {
            return Ok(());
        }
        self.initialized = false;

        let mut stdout = io::stdout();
        let _ = execute!(stdout, ResetColor, SetAttribute(Attribute::Reset));
        let _ = execute!(stdout, Show);
        let _ = execute!(stdout, LeaveAlternateScreen);
        let _ = stdout.flush();

        // Disable raw mode - this is the most important part
        terminal::disable_raw_mode()?;
        Ok(())
    }

    /// Render one frame
    pub fn render(&mut self, view: &View) -> io::Result<()> {
        let (cols, rows) = Self::size()?;

        let stdout = io::stdout();
        let mut out = io::BufWriter::with_capacity(65536, stdout.lock());

        with_frame(&mut out, |out| match view.session.overlay() {
            Some(overlay) => self.render_overlay(out, overlay, cols, rows),
            None => {
                self.render_header(out, view, cols)?;
                self.render_body(out, view, cols, rows)?;
                self.render_status_bar(out, view, cols, rows)
            }
        })
    }

    /// Start a row: move there, set the base colors and clear it
    fn begin_row<W: Write>(&self, out: &mut W, row: u16) -> io::Result<()> {
        let cs = &self.color_scheme;
        execute!(
            out,
            MoveTo(0, row),
            SetAttribute(Attribute::Reset),
            SetBackgroundColor(cs.background.to_crossterm()),
        )?;
        write!(out, "\x1b[K")?;
        Ok(())
    }

    fn render_header<W: Write>(&self, out: &mut W, view: &View, cols: u16) -> io::Result<()> {
        let cs = &self.color_scheme;
        let width = cols as usize;

        // Banner
        self.begin_row(out, 0)?;
        execute!(
            out,
            SetForegroundColor(cs.banner_fg.to_crossterm()),
            SetAttribute(Attribute::Bold),
            Print(format!(" {}", truncate_to_width(view.banner, width.saturating_sub(1)))),
            SetAttribute(Attribute::Reset),
        )?;

        // Deck strip
        self.begin_row(out, 1)?;
        let side = |placement| {
            view.deck
                .card_at(placement)
                .map(|c| c.title.clone())
                .unwrap_or_default()
        };
        let center = view
            .deck
            .card_at(Placement::Center)
            .map(|c| format!("{} @ {} ({})", c.title, c.place, c.period))
            .unwrap_or_default();
        let parts = [
            (format!(" ‹ {}   ", side(Placement::Left)), cs.card_dim_fg),
            (center, cs.card_active_fg),
            (format!("   {} ›", side(Placement::Right)), cs.card_dim_fg),
        ];
        let mut remaining = width;
        for (text, color) in &parts {
            let shown = truncate_to_width(text, remaining);
            remaining -= shown.width();
            execute!(out, SetForegroundColor(color.to_crossterm()), Print(shown))?;
        }

        // Separator
        self.begin_row(out, 2)?;
        execute!(
            out,
            SetForegroundColor(cs.muted.to_crossterm()),
            Print("─".repeat(width)),
        )?;
        Ok(())
    }

    fn render_body<W: Write>(
        &mut self,
        out: &mut W,
        view: &View,
        cols: u16,
        rows: u16,
    ) -> io::Result<()> {
        let height = rows.saturating_sub(HEADER_ROWS + STATUS_ROWS) as usize;
        let all = body_rows(view.session, view.prompt, cols as usize);
        let (start, end, scroll) = visible_range(all.len(), height, self.scroll);
        self.scroll = scroll;

        let mut cursor = None;
        for (screen_row, row) in all[start..end].iter().enumerate() {
            let y = HEADER_ROWS + screen_row as u16;
            self.begin_row(out, y)?;
            self.render_row(out, row)?;
            if matches!(row.kind, RowKind::Input { .. }) {
                let x = (row.text.width() as u16).min(cols.saturating_sub(1));
                cursor = Some((x, y));
            }
        }
        for y in (HEADER_ROWS + (end - start) as u16)..(HEADER_ROWS + height as u16) {
            self.begin_row(out, y)?;
        }

        // Only the last input row carries the cursor, and only when scrolled to the bottom
        if let Some((x, y)) = cursor.filter(|_| scroll == 0) {
            execute!(out, MoveTo(x, y), Show)?;
        }
        Ok(())
    }

    fn render_row<W: Write>(&self, out: &mut W, row: &BodyRow) -> io::Result<()> {
        let cs = &self.color_scheme;
        match row.kind {
            RowKind::Blank => Ok(()),
            RowKind::Echo { prompt_len } | RowKind::Input { prompt_len } => {
                let (prompt, rest) = row.text.split_at(prompt_len);
                execute!(
                    out,
                    SetForegroundColor(cs.accent.to_crossterm()),
                    Print(prompt),
                    SetForegroundColor(cs.foreground.to_crossterm()),
                    Print(rest),
                )
            }
            RowKind::Output => execute!(
                out,
                SetForegroundColor(cs.foreground.to_crossterm()),
                Print(&row.text),
            ),
            RowKind::Placeholder => execute!(
                out,
                SetForegroundColor(cs.muted.to_crossterm()),
                SetAttribute(Attribute::Italic),
                Print(&row.text),
                SetAttribute(Attribute::Reset),
            ),
            RowKind::Error => execute!(
                out,
                SetForegroundColor(cs.error.to_crossterm()),
                Print(&row.text),
            ),
        }
    }

    fn render_status_bar<W: Write>(
        &self,
        out: &mut W,
        view: &View,
        cols: u16,
        rows: u16,
    ) -> io::Result<()> {
        let cs = &self.color_scheme;
        let width = cols as usize;
        let busy = if view.query_pending { " │ thinking" } else { "" };
        let scrolled = if self.scroll > 0 {
            format!(" │ ↑ {} rows", self.scroll)
        } else {
            String::new()
        };
        let text = format!(
            " folio │ {}{}{} │ Ctrl+←/→ experience  Ctrl+T theme  Ctrl+C quit",
            cs.name, busy, scrolled
        );
        let shown = truncate_to_width(&text, width);
        let padding = width.saturating_sub(shown.width());

        execute!(
            out,
            MoveTo(0, rows.saturating_sub(1)),
            SetBackgroundColor(cs.status_bar_bg.to_crossterm()),
            SetForegroundColor(cs.status_bar_fg.to_crossterm()),
            Print(shown),
            Print(" ".repeat(padding)),
            ResetColor,
        )?;
        Ok(())
    }

    /// Full-screen rain; dim cells are left blank
    fn render_overlay<W: Write>(
        &self,
        out: &mut W,
        overlay: &Overlay,
        cols: u16,
        rows: u16,
    ) -> io::Result<()> {
        let rain = overlay.rain();
        execute!(out, SetBackgroundColor(CtColor::Black))?;

        for row in 0..rows {
            execute!(out, MoveTo(0, row))?;
            let mut last_level = None;
            for col in 0..cols {
                match rain.cell(col, row) {
                    Some(cell) if cell.brightness >= VISIBLE_THRESHOLD => {
                        if last_level != Some(cell.brightness) {
                            execute!(
                                out,
                                SetForegroundColor(CtColor::Rgb {
                                    r: 0,
                                    g: cell.brightness,
                                    b: 0
                                })
                            )?;
                            last_level = Some(cell.brightness);
                        }
                        write!(out, "{}", cell.glyph)?;
                    }
                    _ => write!(out, " ")?,
                }
            }
        }

        execute!(out, ResetColor)?;
        Ok(())
    }

    /// Get terminal size
    pub fn size() -> io::Result<(u16, u16)> {
        terminal::size()
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROMPT: &str = "user@apoorv:~$ ";

    #[test]
    fn test_wrap_line() {
        assert_eq!(wrap_line("", 10), vec![""]);
        assert_eq!(wrap_line("abcdef", 3), vec!["abc", "def"]);
        assert_eq!(wrap_line("abcdefg", 3), vec!["abc", "def", "g"]);
        // Zero width still makes progress
        assert_eq!(wrap_line("ab", 0), vec!["a", "b"]);
    }

    #[test]
    fn test_wrap_wide_chars() {
        // Each of these takes two columns
        assert_eq!(wrap_line("日本語", 4), vec!["日本", "語"]);
        assert_eq!(wrap_line("a日本", 4), vec!["a日", "本"]);
        // Half-width katakana take one
        assert_eq!(wrap_line("ｱｲｳｴ", 2), vec!["ｱｲ", "ｳｴ"]);
    }

    #[test]
    fn test_truncate_to_width() {
        assert_eq!(truncate_to_width("hello", 3), "hel");
        assert_eq!(truncate_to_width("hello", 10), "hello");
        assert_eq!(truncate_to_width("日本", 3), "日");
    }

    #[test]
    fn test_body_rows_echo_and_input() {
        let mut session = TerminalSession::new();
        session.print("Welcome");
        session.echo("help");
        session.print("line one\nline two");
        session.insert_char('x');

        let rows = body_rows(&session, PROMPT, 80);
        let kinds: Vec<_> = rows.iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![
                RowKind::Output,
                RowKind::Blank,
                RowKind::Echo {
                    prompt_len: PROMPT.len()
                },
                RowKind::Output,
                RowKind::Output,
                RowKind::Input {
                    prompt_len: PROMPT.len()
                },
            ]
        );
        assert_eq!(rows[2].text, "user@apoorv:~$ help");
        assert_eq!(rows[5].text, "user@apoorv:~$ x");
    }

    #[test]
    fn test_body_rows_first_echo_has_no_gap() {
        let mut session = TerminalSession::new();
        session.echo("about");
        let rows = body_rows(&session, PROMPT, 80);
        assert!(matches!(rows[0].kind, RowKind::Echo { .. }));
    }

    #[test]
    fn test_body_rows_hidden_input() {
        let mut session = TerminalSession::new();
        session.print("x");
        session.launch_overlay(Overlay::new(10, 5, std::time::Instant::now()));
        let rows = body_rows(&session, PROMPT, 80);
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_long_echo_wraps_with_prompt_on_first_row() {
        let mut session = TerminalSession::new();
        session.echo("abcdefghij");
        session.launch_overlay(Overlay::new(10, 5, std::time::Instant::now()));

        let rows = body_rows(&session, PROMPT, 20);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].kind, RowKind::Echo { prompt_len: PROMPT.len() });
        assert_eq!(rows[1].kind, RowKind::Echo { prompt_len: 0 });
        assert_eq!(rows[0].text, "user@apoorv:~$ abcde");
        assert_eq!(rows[1].text, "fghij");
    }

    #[test]
    fn test_visible_range() {
        // Fits entirely
        assert_eq!(visible_range(3, 10, 0), (0, 3, 0));
        // Pinned to the bottom
        assert_eq!(visible_range(30, 10, 0), (20, 30, 0));
        // Scrolled back
        assert_eq!(visible_range(30, 10, 5), (15, 25, 5));
        // Scroll clamps at the top
        assert_eq!(visible_range(30, 10, 100), (0, 10, 20));
    }
}
