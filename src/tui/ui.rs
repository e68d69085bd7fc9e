use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};

use super::widgets::{create_flashcard, dashboard, flashcards, section};
use super::{tab_index, App, Status, TABS};
use crate::router::{ActiveView, Screen};

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tab bar
            Constraint::Min(0),    // Content
            Constraint::Length(1), // Status line
            Constraint::Length(1), // Help bar
        ])
        .split(f.area());

    draw_tabs(f, app, chunks[0]);
    draw_content(f, app, chunks[1]);
    draw_status(f, app, chunks[2]);
    draw_help_bar(f, app, chunks[3]);
}

fn draw_tabs(f: &mut Frame, app: &App, area: Rect) {
    let tab_titles: Vec<&str> = TABS.iter().map(|(_, label)| *label).collect();

    let tabs = Tabs::new(tab_titles)
        .block(Block::default().borders(Borders::ALL).title(" Fiches "))
        .select(tab_index(app.view()))
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    f.render_widget(tabs, area);
}

fn draw_content(f: &mut Frame, app: &App, area: Rect) {
    match app.study().screen() {
        Screen::Dashboard(dash) => dashboard::draw(f, app, &dash, area),
        Screen::Section {
            section,
            fiches,
            progress,
        } => section::draw(f, app, section, &fiches, progress, area),
        Screen::Flashcards { cards, .. } => flashcards::draw(f, app, cards, area),
        Screen::CreateFlashcard { categories } => {
            create_flashcard::draw(f, app, categories, area)
        }
    }
}

fn draw_status(f: &mut Frame, app: &App, area: Rect) {
    let line = if app.confirm_reset {
        Line::from(Span::styled(
            "Erase all progress and flashcards? y to confirm, any other key cancels",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ))
    } else {
        match &app.status {
            Some(Status::Info(msg)) => {
                Line::from(Span::styled(msg.as_str(), Style::default().fg(Color::Green)))
            }
            Some(Status::Error(msg)) => {
                Line::from(Span::styled(msg.as_str(), Style::default().fg(Color::Red)))
            }
            None => Line::from(""),
        }
    };

    f.render_widget(Paragraph::new(line), area);
}

fn key(k: &'static str) -> Span<'static> {
    Span::styled(k, Style::default().fg(Color::Cyan))
}

fn draw_help_bar(f: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![key("<Tab>"), Span::raw(" Views  ")];

    match app.view() {
        ActiveView::Dashboard => {
            spans.extend(vec![
                key("j/k"),
                Span::raw(" Recent cards  "),
                key("<CR>"),
                Span::raw(" Review card  "),
            ]);
        }
        ActiveView::Section(_) | ActiveView::Themes => {
            if app.open_fiche.is_some() {
                spans.extend(vec![
                    key("j/k"),
                    Span::raw(" Prev/Next  "),
                    key("s"),
                    Span::raw(" Mark seen  "),
                    key("h/<Esc>"),
                    Span::raw(" Back  "),
                ]);
            } else {
                spans.extend(vec![
                    key("j/k"),
                    Span::raw(" Nav  "),
                    key("l/<CR>"),
                    Span::raw(" Open  "),
                    key("s"),
                    Span::raw(" Mark seen  "),
                ]);
            }
        }
        ActiveView::Flashcards => {
            if app.study().session().is_active() {
                spans.extend(vec![
                    key("<Space>"),
                    Span::raw(" Reveal  "),
                    key("y/n"),
                    Span::raw(" Correct/Incorrect  "),
                    key("h/l"),
                    Span::raw(" Prev/Next  "),
                    key("<Esc>"),
                    Span::raw(" Stop  "),
                ]);
            } else {
                spans.extend(vec![
                    key("b"),
                    Span::raw(" Book  "),
                    key("c"),
                    Span::raw(" Category  "),
                    key("+/-"),
                    Span::raw(" Size  "),
                    key("<CR>"),
                    Span::raw(" Start  "),
                ]);
            }
        }
        ActiveView::CreateFlashcard => {
            spans.extend(vec![
                key("Up/Down"),
                Span::raw(" Field  "),
                key("Left/Right"),
                Span::raw(" Choose  "),
                key("<CR>"),
                Span::raw(" Save  "),
                key("<Esc>"),
                Span::raw(" Cancel"),
            ]);
        }
    }

    if app.view() != ActiveView::CreateFlashcard {
        spans.extend(vec![
            key("R"),
            Span::raw(" Reset  "),
            key("q"),
            Span::raw(" Quit"),
        ]);
    }

    let help = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));

    f.render_widget(help, area);
}
