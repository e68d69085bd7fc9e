use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use super::{emphasized, truncate};
use crate::content::Section;
use crate::models::{Fiche, SectionProgress};
use crate::tui::App;

pub fn draw(
    f: &mut Frame,
    app: &App,
    section: &Section,
    fiches: &[&Fiche],
    progress: &SectionProgress,
    area: Rect,
) {
    let open = app
        .open_fiche
        .as_deref()
        .and_then(|id| fiches.iter().find(|fiche| fiche.id == id));

    if let Some(fiche) = open {
        draw_fiche(f, fiche, progress.has_seen(&fiche.id), area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Header
            Constraint::Length(3), // Progress
            Constraint::Min(0),    // Fiches
        ])
        .split(area);

    draw_header(f, section, chunks[0]);
    draw_progress(f, progress, chunks[1]);
    draw_list(f, app, fiches, progress, chunks[2]);
}

fn draw_header(f: &mut Frame, section: &Section, area: Rect) {
    let mut text = Vec::new();
    if let Some(author) = section.author {
        text.push(Line::from(Span::styled(
            author,
            Style::default().fg(Color::Cyan),
        )));
    }
    text.push(Line::from(Span::styled(
        section.description,
        Style::default().fg(Color::White),
    )));
    if let Some(citation) = section.citation {
        text.push(Line::from(Span::styled(
            citation,
            Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::ITALIC),
        )));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", section.title))
        .title_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    let paragraph = Paragraph::new(text).block(block).wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

fn draw_progress(f: &mut Frame, progress: &SectionProgress, area: Rect) {
    let pct = progress.percentage();
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(" Progress "))
        .gauge_style(Style::default().fg(Color::Green))
        .percent(pct.min(100) as u16)
        .label(format!(
            "{}/{} seen ({}%)",
            progress.completed, progress.total, pct
        ));
    f.render_widget(gauge, area);
}

fn draw_list(
    f: &mut Frame,
    app: &App,
    fiches: &[&Fiche],
    progress: &SectionProgress,
    area: Rect,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Fiches ({}) ", fiches.len()))
        .title_style(Style::default().fg(Color::Cyan));

    if fiches.is_empty() {
        let paragraph = Paragraph::new("No fiches in this section.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(paragraph, area);
        return;
    }

    let items: Vec<ListItem> = fiches
        .iter()
        .map(|fiche| {
            let seen = progress.has_seen(&fiche.id);
            let (mark, color) = if seen {
                ("[x] ", Color::Green)
            } else {
                ("[ ] ", Color::DarkGray)
            };
            let number = fiche
                .fiche_numero
                .map(|n| format!("{:>2}. ", n))
                .unwrap_or_else(|| "    ".to_string());

            ListItem::new(Line::from(vec![
                Span::styled(mark, Style::default().fg(color)),
                Span::styled(number, Style::default().fg(Color::DarkGray)),
                Span::styled(
                    format!("{:<50}", truncate(&fiche.title, 48)),
                    Style::default().fg(Color::White),
                ),
                Span::styled(fiche.fiche_type.as_str(), Style::default().fg(Color::Cyan)),
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
    state.select(app.fiches.selected);
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_fiche(f: &mut Frame, fiche: &Fiche, seen: bool, area: Rect) {
    let heading = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let body = Style::default().fg(Color::White);

    let mut text: Vec<Line> = Vec::new();
    if !fiche.summary.is_empty() {
        text.extend(emphasized(&fiche.summary, body.add_modifier(Modifier::ITALIC)));
        text.push(Line::from(""));
    }
    if !fiche.concepts.is_empty() {
        text.push(Line::from(vec![
            Span::styled("Concepts: ", Style::default().fg(Color::Gray)),
            Span::styled(fiche.concepts.join(", "), Style::default().fg(Color::Cyan)),
        ]));
        text.push(Line::from(""));
    }

    match &fiche.detailed_sections {
        Some(sections) if fiche.shows_sections() => {
            for s in sections {
                text.push(Line::from(Span::styled(s.title.clone(), heading)));
                text.extend(emphasized(&s.content, body));
                text.push(Line::from(""));
            }
        }
        _ => text.extend(emphasized(&fiche.content, body)),
    }

    if !fiche.questions().is_empty() {
        text.push(Line::from(""));
        text.push(Line::from(Span::styled("Questions", heading)));
        for (i, q) in fiche.questions().iter().enumerate() {
            text.push(Line::from(Span::styled(
                format!("{}. {}", i + 1, q),
                Style::default().fg(Color::Gray),
            )));
        }
    }

    let title = if seen {
        format!(" {} (seen) ", fiche.title)
    } else {
        format!(" {} ", fiche.title)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .title_style(Style::default().fg(if seen { Color::Green } else { Color::Yellow }));

    let paragraph = Paragraph::new(text).block(block).wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}
