//! Maps the active view token to the screen that gets rendered and the
//! data it is handed.

use chrono::NaiveDate;
use serde::Serialize;

use crate::content::{self, ContentStore, Section, SectionKind, SECTIONS};
use crate::flashcards::CATEGORIES;
use crate::models::{Fiche, Flashcard, SectionProgress, StudyData};
use crate::progress::{self, Overview};

/// Number of cards listed on the dashboard.
pub const RECENT_CARDS: usize = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ActiveView {
    #[default]
    Dashboard,
    /// A book or the methodology collection.
    Section(&'static str),
    Themes,
    Flashcards,
    CreateFlashcard,
}

impl ActiveView {
    /// Unknown tokens fall back to the dashboard.
    pub fn parse(token: &str) -> Self {
        match token {
            "dashboard" => ActiveView::Dashboard,
            "flashcards" => ActiveView::Flashcards,
            "create-flashcard" => ActiveView::CreateFlashcard,
            content::THEMES => ActiveView::Themes,
            other => match content::section(other) {
                Some(s) if s.kind != SectionKind::Themes => ActiveView::Section(s.key),
                _ => ActiveView::Dashboard,
            },
        }
    }

    pub fn token(&self) -> &'static str {
        match self {
            ActiveView::Dashboard => "dashboard",
            ActiveView::Section(key) => *key,
            ActiveView::Themes => content::THEMES,
            ActiveView::Flashcards => "flashcards",
            ActiveView::CreateFlashcard => "create-flashcard",
        }
    }
}

/// The active view plus the card to open straight into review, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Route {
    pub view: ActiveView,
    pub pending_card: Option<String>,
}

impl Route {
    pub fn to(token: &str) -> Self {
        Self {
            view: ActiveView::parse(token),
            pending_card: None,
        }
    }

    pub fn open_card(id: &str) -> Self {
        Self {
            view: ActiveView::Flashcards,
            pending_card: Some(id.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionSummary<'a> {
    #[serde(flatten)]
    pub section: &'static Section,
    pub progress: &'a SectionProgress,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard<'a> {
    pub overview: Overview,
    pub sections: Vec<SectionSummary<'a>>,
    pub flashcard_count: usize,
    pub last_card_date: Option<NaiveDate>,
    pub streak_days: u32,
    pub study_hours: u32,
    /// Most recent first.
    pub recent: Vec<&'a Flashcard>,
}

impl<'a> Dashboard<'a> {
    pub fn build(data: &'a StudyData, themes: &'a SectionProgress) -> Self {
        let sections = SECTIONS
            .iter()
            .filter_map(|s| {
                let progress = match s.kind {
                    SectionKind::Themes => Some(themes),
                    _ => data.section(s.key),
                }?;
                Some(SectionSummary {
                    section: s,
                    progress,
                })
            })
            .collect();

        Self {
            overview: progress::overview(data),
            sections,
            flashcard_count: data.flashcards.len(),
            last_card_date: data
                .flashcards
                .last()
                .and_then(|c| c.created_at)
                .map(|t| t.date_naive()),
            streak_days: data.streak_days,
            study_hours: data.study_hours(),
            recent: data.recent_flashcards(RECENT_CARDS).iter().rev().collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Screen<'a> {
    Dashboard(Dashboard<'a>),
    Section {
        section: &'static Section,
        fiches: Vec<&'a Fiche>,
        progress: &'a SectionProgress,
    },
    Flashcards {
        cards: &'a [Flashcard],
        open_card: Option<&'a str>,
    },
    CreateFlashcard {
        categories: &'static [&'static str],
    },
}

/// Resolve a route against the current state. A section missing from
/// `data` falls back to the dashboard.
pub fn resolve<'a>(
    route: &'a Route,
    content: &'a ContentStore,
    data: &'a StudyData,
    themes: &'a SectionProgress,
) -> Screen<'a> {
    let section_screen = |key: &str, progress: &'a SectionProgress| {
        content::section(key).map(|section| Screen::Section {
            section,
            fiches: content.fiches_for(key),
            progress,
        })
    };

    let screen = match route.view {
        ActiveView::Dashboard => None,
        ActiveView::Section(key) => data.section(key).and_then(|p| section_screen(key, p)),
        ActiveView::Themes => section_screen(content::THEMES, themes),
        ActiveView::Flashcards => Some(Screen::Flashcards {
            cards: &data.flashcards,
            open_card: route.pending_card.as_deref(),
        }),
        ActiveView::CreateFlashcard => Some(Screen::CreateFlashcard {
            categories: &CATEGORIES,
        }),
    };

    screen.unwrap_or_else(|| Screen::Dashboard(Dashboard::build(data, themes)))
}
