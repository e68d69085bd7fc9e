use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, ListState, Paragraph},
    Frame,
};

use super::{progress_bar, truncate};
use crate::router::Dashboard;
use crate::tui::App;

pub fn draw(f: &mut Frame, app: &App, dash: &Dashboard, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Global progress
            Constraint::Length(8), // Stats + sections row
            Constraint::Min(0),    // Recent flashcards
        ])
        .split(area);

    let top_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(chunks[1]);

    draw_overview(f, dash, chunks[0]);
    draw_stats(f, dash, top_chunks[0]);
    draw_sections(f, dash, top_chunks[1]);
    draw_recent(f, app, dash, chunks[2]);
}

fn draw_overview(f: &mut Frame, dash: &Dashboard, area: Rect) {
    let o = &dash.overview;
    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Overall progress ")
                .title_style(Style::default().fg(Color::Cyan)),
        )
        .gauge_style(Style::default().fg(Color::Green))
        .percent(o.percentage.min(100) as u16)
        .label(format!("{}/{} fiches ({}%)", o.completed, o.total, o.percentage));

    f.render_widget(gauge, area);
}

fn stat_line<'a>(label: &'a str, value: String, color: Color) -> Line<'a> {
    Line::from(vec![
        Span::styled(label, Style::default().fg(Color::Gray)),
        Span::styled(
            value,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
    ])
}

fn draw_stats(f: &mut Frame, dash: &Dashboard, area: Rect) {
    let last_card = dash
        .last_card_date
        .map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| "-".to_string());

    let text = vec![
        stat_line("Flashcards: ", dash.flashcard_count.to_string(), Color::White),
        stat_line("Last card: ", last_card, Color::White),
        stat_line(
            "Streak: ",
            format!("{} day(s)", dash.streak_days),
            if dash.streak_days > 0 {
                Color::Yellow
            } else {
                Color::White
            },
        ),
        stat_line("Study time: ", format!("{}h", dash.study_hours), Color::Cyan),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Stats ")
        .title_style(Style::default().fg(Color::Cyan));

    f.render_widget(Paragraph::new(text).block(block), area);
}

fn draw_sections(f: &mut Frame, dash: &Dashboard, area: Rect) {
    let items: Vec<ListItem> = dash
        .sections
        .iter()
        .map(|s| {
            let pct = s.progress.percentage();
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:<26}", truncate(s.section.title, 24)),
                    Style::default().fg(Color::White),
                ),
                Span::styled(progress_bar(pct, 10), Style::default().fg(Color::Green)),
                Span::styled(
                    format!(" {}/{}", s.progress.completed, s.progress.total),
                    Style::default().fg(Color::Yellow),
                ),
            ]))
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Sections ")
        .title_style(Style::default().fg(Color::Yellow));

    f.render_widget(List::new(items).block(block), area);
}

fn draw_recent(f: &mut Frame, app: &App, dash: &Dashboard, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Recent flashcards ")
        .title_style(Style::default().fg(Color::Magenta));

    if dash.recent.is_empty() {
        let paragraph = Paragraph::new("No flashcards yet. Create one from the Nouvelle carte tab.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(paragraph, area);
        return;
    }

    let items: Vec<ListItem> = dash
        .recent
        .iter()
        .map(|card| {
            let date = card
                .created_at
                .map(|t| t.format("%d/%m").to_string())
                .unwrap_or_default();
            ListItem::new(Line::from(vec![
                Span::styled(format!("{:<7}", date), Style::default().fg(Color::DarkGray)),
                Span::styled(
                    format!("{:<50}", truncate(&card.question, 48)),
                    Style::default().fg(Color::White),
                ),
                Span::styled(card.category.as_str(), Style::default().fg(Color::Cyan)),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(app.recent.selected);
    f.render_stateful_widget(list, area, &mut state);
}
