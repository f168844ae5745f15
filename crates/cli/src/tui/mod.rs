use std::io::stdout;
use std::time::Duration;

use bookreg_core::{paste, stamp, Action, AppendRows, BookRecord, DeletePolicy, Field, Form, Row, RowId, FIELD_COUNT};
use crossterm::{
    event::{self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame, Terminal,
};

use crate::util;

/// Display width of each field column, in canonical field order.
const COLUMN_WIDTHS: [usize; FIELD_COUNT] = [8, 26, 14, 14, 13, 10, 13, 13, 12];

/// Row-number gutter: three digits, the delete marker, a space.
const GUTTER_WIDTH: usize = 5;

const PAGE_JUMP: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusKind {
    Info,
    Busy,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Status {
    kind: StatusKind,
    text: String,
}

impl Status {
    fn info(text: impl Into<String>) -> Self {
        Self { kind: StatusKind::Info, text: text.into() }
    }

    fn error(text: impl Into<String>) -> Self {
        Self { kind: StatusKind::Error, text: text.into() }
    }
}

struct FormApp<S: AppendRows> {
    form: Form,
    sink: S,
    /// Row position (not id) of the cursor.
    cursor_row: usize,
    /// Field index of the cursor.
    cursor_col: usize,
    scroll_row: usize,
    scroll_col: usize,
    /// Keystrokes go into the current cell.
    editing: bool,
    status: Status,
    /// Rows handed out by `begin_submit`, sent on the next loop turn so
    /// the busy state is drawn first.
    queued: Option<Vec<BookRecord>>,
    should_quit: bool,
    show_help: bool,
}

impl<S: AppendRows> FormApp<S> {
    fn new(form: Form, sink: S) -> Self {
        Self {
            form,
            sink,
            cursor_row: 0,
            cursor_col: 0,
            scroll_row: 0,
            scroll_col: 0,
            editing: false,
            status: Status::info("type to edit, paste to fill, Ctrl+S to submit"),
            queued: None,
            should_quit: false,
            show_help: false,
        }
    }

    fn current_field(&self) -> Field {
        Field::ALL[self.cursor_col]
    }

    fn current_row(&self) -> Option<&Row> {
        self.form.grid().row_at(self.cursor_row)
    }

    fn current_row_id(&self) -> Option<RowId> {
        self.current_row().map(|r| r.id)
    }

    fn current_value(&self) -> &str {
        self.current_row().map(|r| r.get(self.current_field())).unwrap_or("")
    }

    fn has_queued_submit(&self) -> bool {
        self.queued.is_some()
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if self.show_help {
            // Any key dismisses help
            self.show_help = false;
            return;
        }
        if self.form.is_busy() {
            return;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('q') if ctrl => self.should_quit = true,
            KeyCode::Char('s') if ctrl => self.begin_submit(),
            KeyCode::Char('n') if ctrl => self.add_row(),
            KeyCode::Char('d') if ctrl => self.delete_current_row(),
            KeyCode::F(1) => self.show_help = true,
            _ if self.editing => self.handle_edit_key(key),
            _ => self.handle_nav_key(key),
        }
    }

    fn handle_nav_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up => self.move_cursor(-1, 0),
            KeyCode::Down => self.move_cursor(1, 0),
            KeyCode::Left => self.move_cursor(0, -1),
            KeyCode::Right => self.move_cursor(0, 1),
            KeyCode::Tab => self.next_cell(),
            KeyCode::BackTab => self.prev_cell(),
            KeyCode::PageUp => self.cursor_row = self.cursor_row.saturating_sub(PAGE_JUMP),
            KeyCode::PageDown => self.move_cursor(PAGE_JUMP as i32, 0),
            KeyCode::Home => self.cursor_col = 0,
            KeyCode::End => self.cursor_col = FIELD_COUNT - 1,
            KeyCode::Enter | KeyCode::F(2) => self.editing = true,
            KeyCode::Backspace | KeyCode::Delete => self.input(String::new()),
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                // Typing over a selected cell replaces its value
                self.editing = true;
                self.input(c.to_string());
            }
            _ => {}
        }
    }

    fn handle_edit_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.editing = false,
            KeyCode::Enter => {
                self.editing = false;
                self.move_cursor(1, 0);
            }
            KeyCode::Tab => {
                self.editing = false;
                self.next_cell();
            }
            KeyCode::BackTab => {
                self.editing = false;
                self.prev_cell();
            }
            KeyCode::Up | KeyCode::Down => {
                self.editing = false;
                self.handle_nav_key(key);
            }
            KeyCode::Backspace => {
                let mut typed = self.current_value().to_string();
                typed.pop();
                self.input(typed);
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                let mut typed = self.current_value().to_string();
                typed.push(c);
                self.input(typed);
            }
            _ => {}
        }
    }

    /// The cell changed from its stored value to `typed`.
    fn input(&mut self, typed: String) {
        let Some(row) = self.current_row_id() else {
            return;
        };
        let field = self.current_field();
        let value = self
            .form
            .settings()
            .policies
            .on_input(field, self.current_value(), &typed);
        self.form.dispatch(Action::SetCell { row, field, value });
    }

    fn handle_paste(&mut self, text: &str) {
        if self.form.is_busy() {
            return;
        }
        let Some(row) = self.current_row_id() else {
            return;
        };
        self.editing = false;
        let text = paste::normalize_line_endings(text);
        let lines = text.lines().filter(|l| !l.trim().is_empty()).count();
        self.form.dispatch(Action::Paste {
            row,
            field: self.current_field(),
            text,
        });
        self.status = Status::info(format!("pasted {} line(s)", lines));
    }

    fn add_row(&mut self) {
        self.form.dispatch(Action::AddRow);
        self.editing = false;
        self.cursor_row = self.form.grid().len() - 1;
        self.status = Status::info(format!("row {} added", self.cursor_row + 1));
    }

    fn delete_current_row(&mut self) {
        let Some(row) = self.current_row_id() else {
            return;
        };
        if !self.form.delete_row(row) {
            self.status = Status::error(self.delete_refusal());
            return;
        }
        self.editing = false;
        self.cursor_row = self.cursor_row.min(self.form.grid().len() - 1);
        self.status = Status::info("row deleted");
    }

    fn delete_refusal(&self) -> String {
        let settings = self.form.settings();
        if self.form.grid().len() <= self.form.grid().min_rows() {
            return format!("at least {} row(s) must remain", self.form.grid().min_rows());
        }
        match settings.delete_policy {
            DeletePolicy::ContentBearing => "only rows with content can be deleted".to_string(),
            DeletePolicy::BeyondSeed => format!("the first {} rows cannot be deleted", settings.seed_rows),
            DeletePolicy::Any => "row cannot be deleted".to_string(),
        }
    }

    fn begin_submit(&mut self) {
        self.editing = false;
        match self.form.begin_submit::<S::Error>() {
            Ok(rows) => {
                self.status = Status {
                    kind: StatusKind::Busy,
                    text: format!("submitting {} row(s)...", rows.len()),
                };
                self.queued = Some(rows);
            }
            Err(e) => self.status = Status::error(e.to_string()),
        }
    }

    /// Send the queued rows and settle the form.
    fn flush_submit(&mut self, submitted_at: &str) {
        let Some(rows) = self.queued.take() else {
            return;
        };
        let result = self.sink.append_rows(&rows, submitted_at);
        match self.form.finish_submit(rows.len(), result) {
            Ok(sent) => {
                self.cursor_row = 0;
                self.scroll_row = 0;
                self.status = Status::info(format!("submitted {} row(s)", sent));
            }
            Err(e) => self.status = Status::error(e.to_string()),
        }
    }

    fn move_cursor(&mut self, drow: i32, dcol: i32) {
        let num_rows = self.form.grid().len();
        if num_rows == 0 {
            return;
        }
        let new_row = (self.cursor_row as i32 + drow)
            .max(0)
            .min(num_rows as i32 - 1) as usize;
        let new_col = (self.cursor_col as i32 + dcol)
            .max(0)
            .min(FIELD_COUNT as i32 - 1) as usize;
        self.cursor_row = new_row;
        self.cursor_col = new_col;
    }

    /// Next cell in reading order, wrapping to the next row.
    fn next_cell(&mut self) {
        if self.cursor_col + 1 < FIELD_COUNT {
            self.cursor_col += 1;
        } else if self.cursor_row + 1 < self.form.grid().len() {
            self.cursor_col = 0;
            self.cursor_row += 1;
        }
    }

    fn prev_cell(&mut self) {
        if self.cursor_col > 0 {
            self.cursor_col -= 1;
        } else if self.cursor_row > 0 {
            self.cursor_col = FIELD_COUNT - 1;
            self.cursor_row -= 1;
        }
    }

    fn ensure_visible(&mut self, visible_rows: usize, area_width: u16) {
        self.cursor_row = self.cursor_row.min(self.form.grid().len().saturating_sub(1));
        if self.cursor_row < self.scroll_row {
            self.scroll_row = self.cursor_row;
        }
        if visible_rows > 0 && self.cursor_row >= self.scroll_row + visible_rows {
            self.scroll_row = self.cursor_row - visible_rows + 1;
        }

        let available = (area_width as usize).saturating_sub(GUTTER_WIDTH);
        if self.cursor_col < self.scroll_col {
            self.scroll_col = self.cursor_col;
        }
        while self.scroll_col < self.cursor_col
            && !self.visible_columns(self.scroll_col, available).contains(&self.cursor_col)
        {
            self.scroll_col += 1;
        }
    }

    fn visible_columns(&self, start_col: usize, available: usize) -> Vec<usize> {
        let mut cols = Vec::new();
        let mut used = 0usize;
        for (c, w) in COLUMN_WIDTHS.iter().enumerate().skip(start_col) {
            let w = w + 1;
            if used + w > available && !cols.is_empty() {
                break;
            }
            used += w;
            cols.push(c);
        }
        cols
    }

    /// Text shown for one cell. The cell being edited shows its raw value
    /// and a caret; every other cell goes through the field's presenter.
    fn cell_text(&self, row: &Row, field: Field, is_cursor: bool) -> String {
        let stored = row.get(field);
        if is_cursor && self.editing {
            format!("{}▏", stored)
        } else {
            self.form.settings().policies.display(field, stored)
        }
    }

    fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(area);

        self.draw_title(frame, chunks[0]);
        self.draw_grid(frame, chunks[1]);
        self.draw_status(frame, chunks[2]);

        if self.show_help {
            self.draw_help(frame, area);
        }
    }

    fn draw_title(&self, frame: &mut Frame, area: Rect) {
        let grid = self.form.grid();
        let ready = grid.content_rows().len();
        let title = format!(" bookreg | {} rows | {} ready to submit ", grid.len(), ready);
        let para = Paragraph::new(Line::from(vec![Span::styled(
            title,
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )]))
        .style(Style::default().bg(Color::Cyan));
        frame.render_widget(para, area);
    }

    fn draw_grid(&self, frame: &mut Frame, area: Rect) {
        let grid = self.form.grid();
        let available = (area.width as usize).saturating_sub(GUTTER_WIDTH);
        let vis_cols = self.visible_columns(self.scroll_col, available);

        // Header line
        let mut header_spans = vec![Span::raw(" ".repeat(GUTTER_WIDTH))];
        for &c in &vis_cols {
            let w = COLUMN_WIDTHS[c];
            let display = util::pad_right(Field::ALL[c].label(), w);
            let style = if c == self.cursor_col {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            };
            header_spans.push(Span::styled(format!("{} ", display), style));
        }

        let visible_rows = (area.height as usize).saturating_sub(1);
        let end_row = (self.scroll_row + visible_rows).min(grid.len());

        let mut lines: Vec<Line> = Vec::with_capacity(visible_rows + 1);
        lines.push(Line::from(header_spans));

        for (pos, row) in grid.rows().enumerate().take(end_row).skip(self.scroll_row) {
            let is_cursor_row = pos == self.cursor_row;
            let marker = if self.form.can_delete(row.id) { "×" } else { " " };
            let gutter_style = if is_cursor_row {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            let mut spans = vec![Span::styled(format!("{:>3}{} ", pos + 1, marker), gutter_style)];

            for &c in &vis_cols {
                let is_cursor = is_cursor_row && c == self.cursor_col;
                let text = self.cell_text(row, Field::ALL[c], is_cursor);
                let display = util::pad_right(&text, COLUMN_WIDTHS[c]);

                let style = if is_cursor && self.editing {
                    Style::default().fg(Color::Black).bg(Color::Yellow)
                } else if is_cursor {
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::White)
                        .add_modifier(Modifier::BOLD)
                } else if is_cursor_row {
                    Style::default().fg(Color::White)
                } else {
                    Style::default().fg(Color::Gray)
                };
                spans.push(Span::styled(format!("{} ", display), style));
            }

            lines.push(Line::from(spans));
        }

        frame.render_widget(Paragraph::new(lines), area);
    }

    fn draw_status(&self, frame: &mut Frame, area: Rect) {
        let mode = if self.form.is_busy() {
            "BUSY"
        } else if self.editing {
            "EDIT"
        } else {
            "NAV"
        };
        let left = format!(" {}", self.status.text);
        let right = format!(
            "{} {}/{}  {}  F1: help ",
            self.current_field().label(),
            self.cursor_row + 1,
            self.form.grid().len(),
            mode
        );

        let padding = (area.width as usize)
            .saturating_sub(util::display_width(&left) + util::display_width(&right));
        let status = format!("{}{:pad$}{}", left, "", right, pad = padding);

        let bg = match self.status.kind {
            StatusKind::Info => Color::DarkGray,
            StatusKind::Busy => Color::Yellow,
            StatusKind::Error => Color::Red,
        };
        let para = Paragraph::new(Line::from(vec![Span::styled(
            status,
            Style::default().fg(Color::Black).bg(bg),
        )]))
        .style(Style::default().bg(bg));
        frame.render_widget(para, area);
    }

    fn draw_help(&self, frame: &mut Frame, area: Rect) {
        let help_lines = [
            "",
            "  Navigation",
            "  ----------",
            "  arrows            Move cursor",
            "  Tab / Shift+Tab   Next/prev cell",
            "  PgUp / PgDn       Page up/down",
            "  Home / End        First/last field",
            "",
            "  Editing",
            "  -------",
            "  type              Replace the cell",
            "  Enter / F2        Edit the cell",
            "  Esc / Enter       Stop editing",
            "  Backspace / Del   Clear the cell",
            "  paste             Fill from the cursor",
            "",
            "  Rows",
            "  ----",
            "  Ctrl+N            Add a row",
            "  Ctrl+D            Delete row (marked ×)",
            "  Ctrl+S            Submit filled rows",
            "",
            "  Ctrl+Q            Quit",
            "  F1                Toggle this help",
            "",
        ];
        let help_width: u16 = 44;
        let help_height: u16 = help_lines.len() as u16 + 2;

        let x = area.width.saturating_sub(help_width) / 2;
        let y = area.height.saturating_sub(help_height) / 2;
        let popup = Rect::new(
            area.x + x,
            area.y + y,
            help_width.min(area.width),
            help_height.min(area.height),
        );

        let lines: Vec<Line> = help_lines
            .iter()
            .map(|s| Line::from(Span::styled(*s, Style::default().fg(Color::White))))
            .collect();

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Keybindings ")
            .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .style(Style::default().bg(Color::Black));

        frame.render_widget(Clear, popup);
        frame.render_widget(Paragraph::new(lines).block(block), popup);
    }
}

/// Run the interactive form until the user quits. Submissions go to `sink`.
pub fn run<S: AppendRows>(form: Form, sink: S) -> Result<(), String> {
    let mut app = FormApp::new(form, sink);

    terminal::enable_raw_mode().map_err(|e| format!("failed to enable raw mode: {}", e))?;
    stdout()
        .execute(EnterAlternateScreen)
        .map_err(|e| format!("failed to enter alternate screen: {}", e))?;
    stdout()
        .execute(EnableBracketedPaste)
        .map_err(|e| format!("failed to enable bracketed paste: {}", e))?;

    struct Cleanup;
    impl Drop for Cleanup {
        fn drop(&mut self) {
            let _ = stdout().execute(DisableBracketedPaste);
            let _ = stdout().execute(LeaveAlternateScreen);
            let _ = terminal::disable_raw_mode();
        }
    }
    let _cleanup = Cleanup;

    let backend = CrosstermBackend::new(stdout());
    let mut terminal =
        Terminal::new(backend).map_err(|e| format!("failed to create terminal: {}", e))?;

    loop {
        let term_size = terminal
            .size()
            .map(|s| Rect::new(0, 0, s.width, s.height))
            .unwrap_or_default();
        // title + header + status
        let visible_rows = term_size.height.saturating_sub(3) as usize;
        app.ensure_visible(visible_rows, term_size.width);

        terminal
            .draw(|frame| app.draw(frame))
            .map_err(|e| format!("draw error: {}", e))?;

        if app.has_queued_submit() {
            app.flush_submit(&stamp::now());
            continue;
        }

        if event::poll(Duration::from_millis(100)).map_err(|e| format!("event poll error: {}", e))? {
            match event::read().map_err(|e| format!("event read error: {}", e))? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key(key),
                Event::Paste(text) => app.handle_paste(&text),
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    log::info!("form closed with {} filled row(s)", app.form.pending().len());
    Ok(())
}
