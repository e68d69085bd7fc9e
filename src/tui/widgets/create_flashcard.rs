use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::book_title;
use crate::tui::{App, Field};

fn label(name: &'static str, focused: bool) -> Span<'static> {
    let style = if focused {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };
    Span::styled(format!("{:<12}", name), style)
}

fn text_value(value: &str, focused: bool) -> Vec<Span<'_>> {
    let mut spans = vec![Span::styled(value, Style::default().fg(Color::White))];
    if focused {
        spans.push(Span::styled("█", Style::default().fg(Color::Yellow)));
    }
    spans
}

fn choice_value(value: String, focused: bool) -> Vec<Span<'static>> {
    if focused {
        vec![
            Span::styled("◀ ", Style::default().fg(Color::Yellow)),
            Span::styled(value, Style::default().fg(Color::White)),
            Span::styled(" ▶", Style::default().fg(Color::Yellow)),
        ]
    } else {
        vec![Span::styled(value, Style::default().fg(Color::White))]
    }
}

pub fn draw(f: &mut Frame, app: &App, categories: &[&str], area: Rect) {
    let form = &app.form;
    let focus = form.focus;

    let category = match form.category {
        Some(c) => {
            let position = categories.iter().position(|x| *x == c).map_or(0, |i| i + 1);
            format!("{} ({}/{})", c, position, categories.len())
        }
        None => "Choose a category".to_string(),
    };

    let mut lines = Vec::new();
    for field in [
        Field::Question,
        Field::Answer,
        Field::Category,
        Field::Difficulty,
        Field::Book,
    ] {
        let focused = focus == field;
        let (name, value) = match field {
            Field::Question => ("Question", text_value(&form.question, focused)),
            Field::Answer => ("Answer", text_value(&form.answer, focused)),
            Field::Category => ("Category", choice_value(category.clone(), focused)),
            Field::Difficulty => (
                "Difficulty",
                choice_value(form.difficulty.label().to_string(), focused),
            ),
            Field::Book => (
                "Book",
                choice_value(
                    if form.book.is_some() {
                        book_title(form.book).to_string()
                    } else {
                        "None".to_string()
                    },
                    focused,
                ),
            ),
        };

        let mut spans = vec![label(name, focused)];
        spans.extend(value);
        lines.push(Line::from(spans));
        lines.push(Line::from(""));
    }

    let hint = if focus.is_text() {
        "Type to edit, Up/Down to change field, Enter to save"
    } else {
        "Left/Right or Space to choose, Up/Down to change field, Enter to save"
    };
    lines.push(Line::from(Span::styled(
        hint,
        Style::default().fg(Color::DarkGray),
    )));

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" New flashcard ")
        .title_style(Style::default().fg(Color::Cyan));

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}
