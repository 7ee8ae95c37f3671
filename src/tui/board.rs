//! Week board interface.
//!
//! Seven day columns fed by the projection's per-day buckets. The board keeps
//! the current window and filter criteria as plain values and rebuilds its
//! columns from the store after every change.

use std::collections::HashMap;
use std::io;
use std::time::Duration;

use chrono::{Local, NaiveDate};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame, Terminal,
};

use crate::cmd::Context;
use crate::dates::{format_date, format_due_relative};
use crate::fields::*;
use crate::filter::{cycle_choice, distinct_assignees, distinct_clients, distinct_sectors, FilterCriteria};
use crate::projection::{is_overdue, project};
use crate::session;
use crate::store::TaskStore;
use crate::task::Task;
use crate::tui::colors::{priority_color, ACCENT, OVERDUE, TODAY};
use crate::week::{initial_window, next_week, previous_week, WeekWindow};

const CARD_HEIGHT: usize = 4;

/// Main week board state
pub struct WeekBoard {
    ctx: Context,
    window: WeekWindow,
    criteria: FilterCriteria,
    view: ViewKind,
    selected_day: usize,
    selected_card: usize,
    scroll_offsets: [usize; 7],
    status_message: String,
    show_detail: bool,
    confirm_delete: bool,
    /// Positions in `ctx.store.tasks()` per window day, rebuilt on every refresh.
    columns: [Vec<usize>; 7],
}

impl WeekBoard {
    pub fn new(ctx: Context, window: WeekWindow, criteria: FilterCriteria) -> Self {
        let mut board = WeekBoard {
            ctx,
            window,
            criteria,
            view: ViewKind::Calendar,
            selected_day: 0,
            selected_card: 0,
            scroll_offsets: [0; 7],
            status_message: String::new(),
            show_detail: false,
            confirm_delete: false,
            columns: Default::default(),
        };
        if let Some(i) = board.window.days().iter().position(|d| *d == board.ctx.today) {
            board.selected_day = i;
        }
        board.refresh();
        board
    }

    pub fn window(&self) -> &WeekWindow {
        &self.window
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn view(&self) -> ViewKind {
        self.view
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    /// Tasks shown in the day column at `day` (0 = window start).
    pub fn column(&self, day: usize) -> Vec<&Task> {
        self.columns[day].iter().filter_map(|&i| self.task_at(i)).collect()
    }

    fn task_at(&self, position: usize) -> Option<&Task> {
        self.ctx.store.tasks().get(position)
    }

    /// Rebuild the day columns from the store.
    fn refresh(&mut self) {
        let tasks = self.ctx.store.tasks();
        let positions: HashMap<&str, usize> = tasks
            .iter()
            .enumerate()
            .map(|(i, t)| (t.id.as_str(), i))
            .collect();
        let p = project(tasks, &self.criteria, &self.window, self.view);
        for (i, day) in self.window.days().into_iter().enumerate() {
            self.columns[i] = p
                .on(day)
                .iter()
                .filter_map(|t| positions.get(t.id.as_str()).copied())
                .collect();
            self.scroll_offsets[i] = 0;
        }
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        let len = self.columns[self.selected_day].len();
        if len == 0 {
            self.selected_card = 0;
        } else if self.selected_card >= len {
            self.selected_card = len - 1;
        }
    }

    fn selected_task(&self) -> Option<&Task> {
        let &position = self.columns[self.selected_day].get(self.selected_card)?;
        self.task_at(position)
    }

    fn set_window(&mut self, window: WeekWindow) {
        self.window = window;
        self.selected_card = 0;
        self.refresh();
        self.status_message = format!("Week {}", self.window.label());
    }

    fn set_criteria(&mut self, criteria: FilterCriteria) {
        self.criteria = criteria;
        self.refresh();
        self.status_message = format!("Filters: {}", self.criteria.describe());
    }

    fn toggle_selected(&mut self) {
        let Some(id) = self.selected_task().map(|t| t.id.clone()) else {
            return;
        };
        if let Err(e) = session::require(self.ctx.session.as_ref()) {
            self.status_message = e.to_string();
            return;
        }
        match self.ctx.store.toggle_status(&id) {
            Ok(task) => {
                self.status_message = format!("{} is now {}", task.title, format_status(task.status));
            }
            Err(e) => self.status_message = format!("Error saving: {e}"),
        }
        self.refresh();
    }

    fn delete_selected(&mut self) {
        let Some(id) = self.selected_task().map(|t| t.id.clone()) else {
            return;
        };
        if let Err(e) = session::require(self.ctx.session.as_ref()) {
            self.status_message = e.to_string();
            return;
        }
        match self.ctx.store.delete(&id) {
            Ok(()) => self.status_message = "Task deleted".to_string(),
            Err(e) => self.status_message = format!("Error deleting: {e}"),
        }
        self.refresh();
    }

    /// Apply one key press. Returns true when the board should close.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if self.confirm_delete {
            self.confirm_delete = false;
            if key.code == KeyCode::Char('y') {
                self.delete_selected();
            } else {
                self.status_message = "Delete cancelled".to_string();
            }
            return false;
        }
        if self.show_detail {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                self.show_detail = false;
            }
            return false;
        }

        self.status_message.clear();
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return true,

            KeyCode::Left => {
                self.selected_day = self.selected_day.saturating_sub(1);
                self.clamp_selection();
            }
            KeyCode::Right => {
                self.selected_day = (self.selected_day + 1).min(6);
                self.clamp_selection();
            }
            KeyCode::Up => self.selected_card = self.selected_card.saturating_sub(1),
            KeyCode::Down => {
                let len = self.columns[self.selected_day].len();
                if self.selected_card + 1 < len {
                    self.selected_card += 1;
                }
            }

            KeyCode::Char('[') => self.set_window(previous_week(&self.window)),
            KeyCode::Char(']') => self.set_window(next_week(&self.window)),
            KeyCode::Char('.') => {
                let window = initial_window(self.ctx.today, self.ctx.config.week_start);
                self.set_window(window);
            }

            KeyCode::Char('v') => {
                self.view = match self.view {
                    ViewKind::Calendar => ViewKind::Grid,
                    ViewKind::Grid => ViewKind::Calendar,
                };
                self.refresh();
                self.status_message = match self.view {
                    ViewKind::Calendar => "Hiding completed tasks".to_string(),
                    ViewKind::Grid => "Showing completed tasks".to_string(),
                };
            }

            KeyCode::Char('s') => {
                let sector = cycle_choice(self.criteria.sector.as_deref(), &distinct_sectors(self.ctx.store.tasks()));
                self.set_criteria(FilterCriteria { sector, ..self.criteria.clone() });
            }
            KeyCode::Char('p') => {
                let priority = Priority::cycle(self.criteria.priority);
                self.set_criteria(FilterCriteria { priority, ..self.criteria.clone() });
            }
            KeyCode::Char('a') => {
                let assignee_name =
                    cycle_choice(self.criteria.assignee_name.as_deref(), &distinct_assignees(self.ctx.store.tasks()));
                self.set_criteria(FilterCriteria { assignee_name, ..self.criteria.clone() });
            }
            KeyCode::Char('c') => {
                let client = cycle_choice(self.criteria.client.as_deref(), &distinct_clients(self.ctx.store.tasks()));
                self.set_criteria(FilterCriteria { client, ..self.criteria.clone() });
            }
            KeyCode::Char('x') => self.set_criteria(FilterCriteria::default()),

            KeyCode::Char(' ') => self.toggle_selected(),
            KeyCode::Char('D') => {
                if let Some(t) = self.selected_task() {
                    self.status_message = format!("Delete '{}'? y to confirm", t.title);
                    self.confirm_delete = true;
                }
            }
            KeyCode::Enter => self.show_detail = self.selected_task().is_some(),
            KeyCode::Char('h') => {
                self.status_message = "←/→ day | ↑/↓ card | [/] week | . today | v completed | s/p/a/c filters | x clear | space toggle | D delete | q quit".to_string();
            }
            _ => {}
        }
        false
    }

    fn handle_input(&mut self) -> io::Result<bool> {
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    return Ok(self.handle_key(key));
                }
            }
        }
        Ok(false)
    }

    fn render(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Board
                Constraint::Length(1), // Status bar
            ])
            .split(f.area());

        self.render_header(f, chunks[0]);
        self.render_board(f, chunks[1]);
        self.render_status_bar(f, chunks[2]);

        if self.show_detail {
            self.render_detail_popup(f);
        }
    }

    fn render_header(&self, f: &mut Frame, area: Rect) {
        let view = match self.view {
            ViewKind::Calendar => "Calendar",
            ViewKind::Grid => "All tasks",
        };
        let header = Paragraph::new(Line::from(vec![
            Span::styled(self.window.label(), Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("  "),
            Span::styled(
                format!("{view} | Filters: {}", self.criteria.describe()),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC),
            ),
        ]))
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center);
        f.render_widget(header, area);
    }

    fn render_board(&mut self, f: &mut Frame, area: Rect) {
        let layout = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 7); 7])
            .split(area);

        for (i, (day, &column_area)) in self.window.days().into_iter().zip(layout.iter()).enumerate() {
            self.render_column(f, column_area, i, day);
        }
    }

    fn render_column(&mut self, f: &mut Frame, area: Rect, index: usize, day: NaiveDate) {
        let is_selected = index == self.selected_day;
        let is_today = day == self.ctx.today;
        let pending = self.columns[index]
            .iter()
            .filter_map(|&i| self.task_at(i))
            .filter(|t| t.status == Status::Pending)
            .count();

        let mut border_style = Style::default();
        if is_today {
            border_style = border_style.fg(TODAY);
        }
        if is_selected {
            border_style = border_style.add_modifier(Modifier::BOLD);
            if !is_today {
                border_style = border_style.fg(ACCENT);
            }
        }
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("{} ({pending})", day.format("%a %d/%m")))
            .border_style(border_style);
        let inner = block.inner(area);
        f.render_widget(block, area);

        let cards = &self.columns[index];
        if cards.is_empty() {
            return;
        }

        let visible = (inner.height as usize / CARD_HEIGHT).max(1);
        let mut offset = self.scroll_offsets[index];
        if is_selected {
            if self.selected_card < offset {
                offset = self.selected_card;
            } else if self.selected_card >= offset + visible {
                offset = self.selected_card + 1 - visible;
            }
            self.scroll_offsets[index] = offset;
        }

        let mut y = 0;
        for (card_index, &position) in cards.iter().enumerate().skip(offset) {
            if y + CARD_HEIGHT > inner.height as usize {
                break;
            }
            let Some(task) = self.task_at(position) else {
                continue;
            };
            let card_area = Rect {
                x: inner.x,
                y: inner.y + y as u16,
                width: inner.width,
                height: CARD_HEIGHT as u16,
            };
            self.render_card(f, card_area, task, is_selected && card_index == self.selected_card);
            y += CARD_HEIGHT;
        }

        if offset > 0 {
            let indicator = Paragraph::new(format!("▲ +{offset}")).style(Style::default().fg(Color::Cyan));
            f.render_widget(indicator, Rect { height: 1, ..inner });
        }
    }

    fn render_card(&self, f: &mut Frame, area: Rect, task: &Task, is_selected: bool) {
        let mut style = if is_overdue(task, self.ctx.today) {
            Style::default().bg(OVERDUE).fg(Color::White)
        } else {
            Style::default().bg(Color::DarkGray)
        };
        if is_selected {
            style = style.add_modifier(Modifier::REVERSED | Modifier::BOLD);
        }
        let title_style = if task.is_completed() {
            Style::default().add_modifier(Modifier::CROSSED_OUT)
        } else {
            Style::default()
        };

        let lines = vec![
            Line::from(Span::styled(task.title.clone(), title_style)),
            Line::from(vec![
                Span::styled("● ", Style::default().fg(priority_color(task.priority))),
                Span::raw(task.assignee_name.as_deref().unwrap_or("Unassigned").to_string()),
            ]),
        ];
        let card = Paragraph::new(lines)
            .block(Block::default().borders(Borders::BOTTOM))
            .style(style)
            .wrap(Wrap { trim: true });
        f.render_widget(card, area);
    }

    fn render_status_bar(&self, f: &mut Frame, area: Rect) {
        let text = if !self.status_message.is_empty() {
            self.status_message.clone()
        } else {
            let shown: usize = self.columns.iter().map(Vec::len).sum();
            format!("Tasks this week: {shown} | Enter: Details | space: Toggle | D: Delete | h: Help | q: Quit")
        };
        let status = Paragraph::new(text)
            .style(Style::default().bg(ACCENT).fg(Color::White))
            .alignment(Alignment::Left);
        f.render_widget(status, area);
    }

    fn render_detail_popup(&self, f: &mut Frame) {
        let Some(task) = self.selected_task() else {
            return;
        };
        let popup_area = {
            let area = f.area();
            let width = (area.width * 70) / 100;
            let height = (area.height * 70) / 100;
            Rect::new((area.width - width) / 2, (area.height - height) / 2, width, height)
        };
        f.render_widget(Clear, popup_area);

        let dash = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());
        let mut lines = vec![
            Line::from(Span::styled(task.title.clone(), Style::default().add_modifier(Modifier::BOLD))),
            Line::from(""),
            Line::from(format!("Status:      {}", format_status(task.status))),
            Line::from(vec![
                Span::raw("Priority:    "),
                Span::styled(format_priority(task.priority), Style::default().fg(priority_color(task.priority))),
            ]),
            Line::from(format!(
                "Due:         {} ({})",
                task.due_date.map(format_date).unwrap_or_else(|| "-".to_string()),
                format_due_relative(task.due_date, self.ctx.today)
            )),
            Line::from(format!(
                "Start:       {}",
                task.start_date.map(format_date).unwrap_or_else(|| "-".to_string())
            )),
            Line::from(format!("Client:      {}", dash(&task.client))),
            Line::from(format!("Sector:      {}", dash(&task.sector))),
            Line::from(format!("Responsible: {}", task.assignee_name.as_deref().unwrap_or("Unassigned"))),
            Line::from(format!("Link:        {}", dash(&task.link))),
            Line::from(format!(
                "Created:     {} by {}",
                task.created_at.with_timezone(&Local).format("%d/%m/%Y %H:%M"),
                task.created_by.as_deref().unwrap_or(&task.creator_id)
            )),
            Line::from(""),
            Line::from("Description:"),
            Line::from(task.description.as_deref().unwrap_or("-").to_string()),
        ];
        if let Some(note) = &task.observation {
            lines.extend([Line::from(""), Line::from(format!("Note: {note}"))]);
        }

        let block = Block::default()
            .borders(Borders::ALL)
            .title("Task Details (Enter to close)")
            .title_alignment(Alignment::Center)
            .border_style(Style::default().fg(priority_color(task.priority)).add_modifier(Modifier::BOLD));
        let popup = Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: true })
            .style(Style::default().bg(Color::Black));
        f.render_widget(popup, popup_area);
    }

    /// Main event loop
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;
            if self.handle_input()? {
                break;
            }
        }
        Ok(())
    }
}
