use chrono::Local;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs},
    Frame,
};
use todo_core::{Filter, Todo, Transport};
use unicode_width::UnicodeWidthStr;

use crate::app::{App, Field, Form, StatusType};

const ACCENT: Color = Color::Rgb(67, 97, 238);
const MUTED: Color = Color::DarkGray;
const TEXT: Color = Color::White;
const SUBTLE: Color = Color::Gray;

/// Draw the main UI
pub fn draw<T: Transport>(f: &mut Frame, app: &App<T>) {
    let area = f.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(3), // Filter tabs
            Constraint::Min(0),    // Task list
            Constraint::Length(1), // Status line
        ])
        .split(area);

    draw_header(f, chunks[0], app);
    draw_filter_tabs(f, chunks[1], app);
    draw_task_list(f, chunks[2], app);
    draw_status_line(f, chunks[3], app);

    if let Some(form) = &app.form {
        draw_form(f, area, form);
    }
}

fn draw_header<T: Transport>(f: &mut Frame, area: Rect, app: &App<T>) {
    let counts = app.store.counts();
    let header = Line::from(vec![
        Span::styled(
            " Task Manager",
            Style::default().fg(TEXT).add_modifier(Modifier::BOLD),
        ),
        Span::styled(" │ ", Style::default().fg(MUTED)),
        Span::styled(
            format!("{} open, {} done", counts.pending, counts.completed),
            Style::default().fg(SUBTLE),
        ),
    ]);
    let hint = Line::from(Span::styled("[+] new task ", Style::default().fg(ACCENT)));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(MUTED));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(14)])
        .split(inner);
    f.render_widget(Paragraph::new(header), columns[0]);
    f.render_widget(Paragraph::new(hint).alignment(Alignment::Right), columns[1]);
}

fn draw_filter_tabs<T: Transport>(f: &mut Frame, area: Rect, app: &App<T>) {
    let counts = app.store.counts();
    let titles: Vec<Line> = Filter::ALL
        .iter()
        .map(|filter| Line::from(format!("{} ({})", filter, counts.for_filter(*filter))))
        .collect();

    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(MUTED)),
        )
        .style(Style::default().fg(SUBTLE))
        .highlight_style(Style::default().fg(TEXT).bg(ACCENT).add_modifier(Modifier::BOLD))
        .select(app.filter.index());

    f.render_widget(tabs, area);
}

fn draw_task_list<T: Transport>(f: &mut Frame, area: Rect, app: &App<T>) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(MUTED));

    if app.loading {
        let loading = Paragraph::new("Loading…")
            .alignment(Alignment::Center)
            .style(Style::default().fg(SUBTLE))
            .block(block);
        f.render_widget(loading, area);
        return;
    }

    let visible = app.visible();
    if visible.is_empty() {
        let empty = Paragraph::new("No tasks yet")
            .alignment(Alignment::Center)
            .style(Style::default().fg(MUTED))
            .block(block);
        f.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = visible.iter().map(|todo| task_item(todo)).collect();
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::Rgb(40, 40, 48)))
        .highlight_symbol("▶ ");

    let mut state = ListState::default();
    state.select(Some(app.selected));
    f.render_stateful_widget(list, area, &mut state);
}

/// One row: checkbox and title, optional description, creation date
fn task_item(todo: &Todo) -> ListItem<'static> {
    let done = todo.is_completed();
    let (checkbox, checkbox_style) = if done {
        ("[✓] ", Style::default().fg(ACCENT))
    } else {
        ("[ ] ", Style::default().fg(SUBTLE))
    };
    let strike = |style: Style| {
        if done {
            style.add_modifier(Modifier::CROSSED_OUT)
        } else {
            style
        }
    };

    let mut lines = vec![Line::from(vec![
        Span::styled(checkbox, checkbox_style),
        Span::styled(
            todo.title.clone(),
            strike(Style::default().fg(if done { MUTED } else { TEXT }).add_modifier(Modifier::BOLD)),
        ),
    ])];
    if !todo.description.is_empty() {
        lines.push(Line::from(vec![
            Span::raw("    "),
            Span::styled(todo.description.clone(), strike(Style::default().fg(SUBTLE))),
        ]));
    }
    let created = todo.created_at.with_timezone(&Local).format("%Y-%m-%d");
    lines.push(Line::from(Span::styled(
        format!("    {created}"),
        Style::default().fg(MUTED),
    )));

    ListItem::new(Text::from(lines))
}

fn draw_status_line<T: Transport>(f: &mut Frame, area: Rect, app: &App<T>) {
    let line = match &app.status_message {
        Some(message) => {
            let color = match message.message_type {
                StatusType::Success => Color::Green,
                StatusType::Error => Color::Red,
            };
            Line::from(Span::styled(format!(" {}", message.text), Style::default().fg(color)))
        }
        None => Line::from(Span::styled(
            " a add · e edit · space toggle · d delete · tab filter · r reload · q quit",
            Style::default().fg(MUTED),
        )),
    };
    f.render_widget(Paragraph::new(line), area);
}

/// Draw the create/edit form as a centered popup
fn draw_form(f: &mut Frame, area: Rect, form: &Form) {
    let popup_area = centered_rect(area, 60, 11);
    f.render_widget(Clear, popup_area);

    let title = if form.is_edit() { " Edit task " } else { " New task " };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ACCENT));
    let inner = block.inner(popup_area);
    f.render_widget(block, popup_area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Length(3), // Description
            Constraint::Min(1),    // Buttons
        ])
        .split(inner);

    let field = |label: &'static str, value: &str, focused: bool| {
        let border = if focused { ACCENT } else { MUTED };
        Paragraph::new(value.to_string()).block(
            Block::default()
                .title(label)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border)),
        )
    };
    f.render_widget(field("Task name", &form.title, form.focus == Field::Title), rows[0]);
    f.render_widget(
        field("Description", &form.description, form.focus == Field::Description),
        rows[1],
    );

    let buttons = Line::from(vec![
        Span::styled(
            format!(" [Enter] {} ", form.submit_label()),
            Style::default().fg(TEXT).bg(ACCENT),
        ),
        Span::raw("  "),
        Span::styled(" [Esc] Cancel ", Style::default().fg(SUBTLE)),
        Span::styled("   tab switches field", Style::default().fg(MUTED)),
    ]);
    f.render_widget(Paragraph::new(buttons), rows[2]);

    let (row, value) = match form.focus {
        Field::Title => (rows[0], &form.title),
        Field::Description => (rows[1], &form.description),
    };
    let text_width = u16::try_from(value.width()).unwrap_or(u16::MAX);
    f.set_cursor(cursor_x(row, text_width), row.y + 1);
}

/// Column after `text_width` cells inside a bordered `row`, kept on the border
fn cursor_x(row: Rect, text_width: u16) -> u16 {
    let max_x = row.x.saturating_add(row.width.saturating_sub(2));
    row.x.saturating_add(1).saturating_add(text_width).min(max_x)
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
