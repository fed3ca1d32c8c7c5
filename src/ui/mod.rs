// `taskd ui` — ratatui terminal task list.
//
// Full-screen interactive view over the task API:
//   - Header: "N of M tasks completed"
//   - Scrollable task list (Up/Down to select)
//   - Input line at the bottom (type + Enter to add)
//   - Help line (Tab: toggle, Del: remove, Esc: quit)
//
// Local state mirrors server state: the list is fetched once at startup,
// then every user action is one awaited request/response round trip that
// mutates local state on success and leaves it untouched on failure.
// Failures go to the log, never to the screen.

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Terminal,
};
use std::io;
use tracing::{error, warn};

use crate::client::{ApiClient, Task};

/// ratatui-based interactive task list.
pub struct TaskUi {
    client: ApiClient,
    tasks: Vec<Task>,
    input_buf: String,
    cursor: usize,
}

/// The draft text an Enter press would submit: the trimmed input, or
/// `None` when the input is empty or whitespace-only (a no-op).
fn draft_text(input: &str) -> Option<&str> {
    let trimmed = input.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Derived display values, recomputed from local state on every render.
fn counts(tasks: &[Task]) -> (usize, usize, usize) {
    let total = tasks.len();
    let completed = tasks.iter().filter(|t| t.completed).count();
    (completed, total, total - completed)
}

impl TaskUi {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            tasks: Vec::new(),
            input_buf: String::new(),
            cursor: 0,
        }
    }

    /// Start the interactive TUI loop.
    pub async fn run(mut self) -> Result<()> {
        // Initial load. A failed fetch is logged; the view starts empty.
        match self.client.list().await {
            Ok(tasks) => self.tasks = tasks,
            Err(e) => warn!(err = %e, "initial task fetch failed — starting with an empty list"),
        }

        // Set up terminal.
        enable_raw_mode().context("enable raw mode")?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen).context("enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("create terminal")?;

        let result = self.event_loop(&mut terminal).await;

        // Restore terminal regardless of result.
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    async fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> Result<()> {
        loop {
            terminal.draw(|f| {
                draw_ui(f, &self.tasks, &self.input_buf, self.cursor);
            })?;

            // Poll for terminal events (non-blocking, 50ms timeout).
            if event::poll(std::time::Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    match (key.code, key.modifiers) {
                        (KeyCode::Char('c'), KeyModifiers::CONTROL) | (KeyCode::Esc, _) => break,
                        // Enter — add the drafted task.
                        (KeyCode::Enter, _) => self.add_task().await,
                        // Tab — toggle the selected task's completion.
                        (KeyCode::Tab, _) => self.toggle_selected().await,
                        // Delete — remove the selected task.
                        (KeyCode::Delete, _) => self.remove_selected().await,
                        (KeyCode::Up, _) => {
                            self.cursor = self.cursor.saturating_sub(1);
                        }
                        (KeyCode::Down, _) => {
                            if self.cursor + 1 < self.tasks.len() {
                                self.cursor += 1;
                            }
                        }
                        (KeyCode::Backspace, _) => {
                            self.input_buf.pop();
                        }
                        // Regular character input.
                        (KeyCode::Char(c), _) => {
                            self.input_buf.push(c);
                        }
                        _ => {}
                    }
                }
            }
        }

        Ok(())
    }

    /// Add the drafted task. Whitespace-only input is a no-op; on failure
    /// the input is kept so nothing typed is lost.
    async fn add_task(&mut self) {
        let Some(text) = draft_text(&self.input_buf).map(str::to_string) else {
            return;
        };
        match self.client.create(&text).await {
            Ok(task) => {
                self.tasks.push(task);
                self.input_buf.clear();
            }
            Err(e) => error!(err = %e, "failed to add task"),
        }
    }

    /// Toggle the selected task: send the negation of its current state and
    /// adopt whatever completion value the server returns.
    async fn toggle_selected(&mut self) {
        let Some(task) = self.tasks.get(self.cursor) else {
            return;
        };
        let (id, current) = (task.id.clone(), task.completed);
        match self.client.set_completed(&id, !current).await {
            Ok(updated) => {
                if let Some(t) = self.tasks.iter_mut().find(|t| t.id == id) {
                    t.completed = updated.completed;
                }
            }
            Err(e) => error!(err = %e, "failed to update task"),
        }
    }

    async fn remove_selected(&mut self) {
        let Some(task) = self.tasks.get(self.cursor) else {
            return;
        };
        let id = task.id.clone();
        match self.client.delete(&id).await {
            Ok(()) => {
                self.tasks.retain(|t| t.id != id);
                if self.cursor > 0 && self.cursor >= self.tasks.len() {
                    self.cursor -= 1;
                }
            }
            Err(e) => error!(err = %e, "failed to delete task"),
        }
    }
}

// ─── UI rendering ─────────────────────────────────────────────────────────────

fn draw_ui(f: &mut ratatui::Frame, tasks: &[Task], input: &str, cursor: usize) {
    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // header
            Constraint::Min(3),    // task list
            Constraint::Length(3), // input area
            Constraint::Length(1), // help line
        ])
        .split(area);

    render_header(f, chunks[0], tasks);
    render_tasks(f, chunks[1], tasks, cursor);
    render_input(f, chunks[2], input);
    render_help(f, chunks[3], tasks);
}

fn render_header(f: &mut ratatui::Frame, area: Rect, tasks: &[Task]) {
    let (completed, total, _) = counts(tasks);
    let header = Paragraph::new(format!(" taskd  {completed} of {total} tasks completed"))
        .style(Style::default().bg(Color::Rgb(28, 28, 40)).fg(Color::White));
    f.render_widget(header, area);
}

fn render_tasks(f: &mut ratatui::Frame, area: Rect, tasks: &[Task], cursor: usize) {
    if tasks.is_empty() {
        let empty = Paragraph::new("\nNo tasks yet. Add one above!")
            .block(Block::default().borders(Borders::ALL).title("Tasks"))
            .style(Style::default().fg(Color::DarkGray));
        f.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = tasks
        .iter()
        .enumerate()
        .map(|(i, t)| {
            let mark = if t.completed { "[x]" } else { "[ ]" };
            let mut style = if t.completed {
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::CROSSED_OUT)
            } else {
                Style::default().fg(Color::White)
            };
            if i == cursor {
                style = style.bg(Color::Rgb(50, 50, 70)).add_modifier(Modifier::BOLD);
            }
            ListItem::new(Line::from(Span::styled(format!(" {mark} {}", t.task), style)))
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Tasks"))
        .style(Style::default().fg(Color::White));

    f.render_widget(list, area);
}

fn render_input(f: &mut ratatui::Frame, area: Rect, input: &str) {
    let text = Paragraph::new(format!("> {input}▌"))
        .block(Block::default().borders(Borders::ALL).title("Add a new task"))
        .wrap(Wrap { trim: false })
        .style(Style::default().fg(Color::White));
    f.render_widget(text, area);
}

fn render_help(f: &mut ratatui::Frame, area: Rect, tasks: &[Task]) {
    let (_, _, remaining) = counts(tasks);
    let help = Paragraph::new(format!(
        " Enter: add  |  Tab: toggle  |  Del: remove  |  ↑/↓: select  |  Esc: quit  —  {remaining} remaining",
    ))
    .style(Style::default().fg(Color::DarkGray));
    f.render_widget(help, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(completed: bool) -> Task {
        Task {
            id: "t".into(),
            task: "x".into(),
            completed,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn whitespace_only_draft_is_a_noop() {
        assert_eq!(draft_text("   "), None);
        assert_eq!(draft_text(""), None);
        assert_eq!(draft_text("  buy milk  "), Some("buy milk"));
    }

    #[test]
    fn counts_are_derived_from_state() {
        let tasks = vec![task(true), task(false), task(true)];
        assert_eq!(counts(&tasks), (2, 3, 1));
        assert_eq!(counts(&[]), (0, 0, 0));
    }
}
