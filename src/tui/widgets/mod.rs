pub mod create_flashcard;
pub mod dashboard;
pub mod flashcards;
pub mod section;

use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};

use crate::content;

pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

pub fn progress_bar(percentage: u32, width: usize) -> String {
    let filled = (percentage.min(100) as usize * width + 50) / 100;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// Split text into lines, rendering `**bold**` spans with BOLD.
pub fn emphasized(text: &str, base: Style) -> Vec<Line<'static>> {
    text.lines()
        .map(|line| {
            let spans: Vec<Span<'static>> = line
                .split("**")
                .enumerate()
                .filter(|(_, part)| !part.is_empty())
                .map(|(i, part)| {
                    let style = if i % 2 == 1 {
                        base.add_modifier(Modifier::BOLD)
                    } else {
                        base
                    };
                    Span::styled(part.to_string(), style)
                })
                .collect();
            Line::from(spans)
        })
        .collect()
}

pub fn book_title(key: Option<&str>) -> &'static str {
    key.and_then(content::section)
        .map(|s| s.title)
        .unwrap_or("All")
}
