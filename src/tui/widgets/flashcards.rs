use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, Paragraph, Wrap},
    Frame,
};

use super::{book_title, truncate};
use crate::models::{Difficulty, Flashcard};
use crate::session::SessionState;
use crate::tui::{can_start, deck_size, App};

pub fn draw(f: &mut Frame, app: &App, cards: &[Flashcard], area: Rect) {
    match app.study().session().state() {
        Some(state) => draw_review(f, state, area),
        None => draw_setup(f, app, cards, area),
    }
}

fn difficulty_color(d: Difficulty) -> Color {
    match d {
        Difficulty::Easy => Color::Green,
        Difficulty::Medium => Color::Yellow,
        Difficulty::Hard => Color::Red,
    }
}

fn draw_setup(f: &mut Frame, app: &App, cards: &[Flashcard], area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7), // Session settings
            Constraint::Min(0),    // Matching cards
        ])
        .split(area);

    let start_line = if can_start(app) {
        Line::from(Span::styled(
            "Press Enter to start the session",
            Style::default().fg(Color::Green),
        ))
    } else {
        Line::from(Span::styled(
            "No flashcards match these filters",
            Style::default().fg(Color::Red),
        ))
    };

    let text = vec![
        Line::from(vec![
            Span::styled("Book: ", Style::default().fg(Color::Gray)),
            Span::styled(book_title(app.deck.book), Style::default().fg(Color::White)),
        ]),
        Line::from(vec![
            Span::styled("Category: ", Style::default().fg(Color::Gray)),
            Span::styled(
                app.deck.category.as_deref().unwrap_or("All"),
                Style::default().fg(Color::White),
            ),
        ]),
        Line::from(vec![
            Span::styled("Cards: ", Style::default().fg(Color::Gray)),
            Span::styled(
                format!("{} of {} available", deck_size(app), app.available_cards()),
                Style::default().fg(Color::Cyan),
            ),
        ]),
        Line::from(""),
        start_line,
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Review session ")
        .title_style(Style::default().fg(Color::Cyan));
    f.render_widget(Paragraph::new(text).block(block), chunks[0]);

    let matching = app
        .study()
        .filtered_cards(app.deck.book, app.deck.category.as_deref());
    let items: Vec<ListItem> = matching
        .iter()
        .map(|card| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:<50}", truncate(&card.question, 48)),
                    Style::default().fg(Color::White),
                ),
                Span::styled(
                    format!("{:<11}", card.difficulty.label()),
                    Style::default().fg(difficulty_color(card.difficulty)),
                ),
                Span::styled(card.category.as_str(), Style::default().fg(Color::DarkGray)),
            ]))
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Flashcards ({}/{}) ", matching.len(), cards.len()))
        .title_style(Style::default().fg(Color::Magenta));
    f.render_widget(List::new(items).block(block), chunks[1]);
}

fn draw_review(f: &mut Frame, state: &SessionState, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),      // Progress
            Constraint::Percentage(40), // Question
            Constraint::Min(0),         // Answer
            Constraint::Length(3),      // Tally
        ])
        .split(area);

    let card = state.current();

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL))
        .gauge_style(Style::default().fg(Color::Cyan))
        .ratio(state.progress().clamp(0.0, 1.0))
        .label(format!(
            "Card {} of {}",
            state.current_index + 1,
            state.cards.len()
        ));
    f.render_widget(gauge, chunks[0]);

    let question_block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", card.category))
        .title_style(Style::default().fg(difficulty_color(card.difficulty)));
    let question = Paragraph::new(card.question.as_str())
        .style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .block(question_block)
        .wrap(Wrap { trim: true });
    f.render_widget(question, chunks[1]);

    let answer_block = Block::default()
        .borders(Borders::ALL)
        .title(" Answer ")
        .title_style(Style::default().fg(Color::Green));
    let answer = if state.show_answer {
        Paragraph::new(card.answer.as_str()).style(Style::default().fg(Color::White))
    } else if state.is_last() {
        Paragraph::new("Press space to reveal the answer before finishing")
            .style(Style::default().fg(Color::DarkGray))
    } else {
        Paragraph::new("Press space to reveal the answer")
            .style(Style::default().fg(Color::DarkGray))
    };
    f.render_widget(answer.block(answer_block).wrap(Wrap { trim: true }), chunks[2]);

    let tally = Line::from(vec![
        Span::styled("Correct: ", Style::default().fg(Color::Gray)),
        Span::styled(
            state.stats.correct.to_string(),
            Style::default().fg(Color::Green),
        ),
        Span::raw("  "),
        Span::styled("Incorrect: ", Style::default().fg(Color::Gray)),
        Span::styled(
            state.stats.incorrect.to_string(),
            Style::default().fg(Color::Red),
        ),
        Span::raw("  "),
        Span::styled(
            format!("({} answered)", state.stats.answered()),
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    f.render_widget(
        Paragraph::new(tally).block(Block::default().borders(Borders::ALL)),
        chunks[3],
    );
}
