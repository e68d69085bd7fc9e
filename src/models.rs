use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::content::PERSISTED_SECTIONS;

// === Content ===

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FicheType {
    Book,
    Citations,
    Methodology,
    Theme,
}

impl FicheType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FicheType::Book => "book",
            FicheType::Citations => "citations",
            FicheType::Methodology => "methodology",
            FicheType::Theme => "theme",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailedSection {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fiche {
    pub id: String,
    pub group: String,
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub concepts: Vec<String>,
    #[serde(default)]
    pub content: String,
    #[serde(
        default,
        rename = "detailedSections",
        skip_serializing_if = "Option::is_none"
    )]
    pub detailed_sections: Option<Vec<DetailedSection>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub questions: Option<Vec<String>>,
    #[serde(rename = "type")]
    pub fiche_type: FicheType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fiche_numero: Option<u32>,
}

impl Fiche {
    // Citation fiches carry their text in detailed sections rather than `content`
    pub fn shows_sections(&self) -> bool {
        self.fiche_type == FicheType::Citations
            && self
                .detailed_sections
                .as_ref()
                .is_some_and(|s| !s.is_empty())
    }

    pub fn questions(&self) -> &[String] {
        self.questions.as_deref().unwrap_or_default()
    }
}

// === Progress ===

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SectionProgress {
    pub completed: u32,
    pub total: u32,
    pub fiches_seen: Vec<String>,
}

impl SectionProgress {
    pub fn has_seen(&self, fiche_id: &str) -> bool {
        self.fiches_seen.iter().any(|id| id == fiche_id)
    }

    /// Rounded completion percentage; an empty section reports 0.
    pub fn percentage(&self) -> u32 {
        percentage(self.completed, self.total)
    }
}

pub fn percentage(completed: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    ((completed as f64 / total as f64) * 100.0).round() as u32
}

// === Flashcards ===

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Facile",
            Difficulty::Medium => "Moyen",
            Difficulty::Hard => "Difficile",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "easy" | "e" | "facile" => Some(Difficulty::Easy),
            "medium" | "m" | "moyen" => Some(Difficulty::Medium),
            "hard" | "h" | "difficile" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    pub fn cycle(&self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Medium,
            Difficulty::Medium => Difficulty::Hard,
            Difficulty::Hard => Difficulty::Easy,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flashcard {
    #[serde(deserialize_with = "deserialize_card_id")]
    pub id: String,
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_created_at",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

/// User input for a new flashcard, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewFlashcard {
    pub question: String,
    pub answer: String,
    pub category: String,
    pub difficulty: Difficulty,
    pub book: Option<String>,
}

// Older stores used millisecond timestamps as numeric ids
fn deserialize_card_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(u64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}

fn deserialize_created_at<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| match DateTime::parse_from_rfc3339(&s) {
        Ok(dt) => Some(dt.with_timezone(&Utc)),
        Err(e) => {
            log::warn!("Dropping unparseable flashcard timestamp '{}': {}", s, e);
            None
        }
    }))
}

fn deserialize_study_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| {
        let day: String = s.chars().take(10).collect();
        NaiveDate::parse_from_str(&day, "%Y-%m-%d").ok()
    }))
}

// === Root aggregate ===

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StudyData {
    pub books_progress: BTreeMap<String, SectionProgress>,
    pub flashcards: Vec<Flashcard>,
    pub total_study_time: u32,
    pub streak_days: u32,
    #[serde(deserialize_with = "deserialize_study_date")]
    pub last_study_date: Option<NaiveDate>,
}

impl Default for StudyData {
    fn default() -> Self {
        let books_progress = PERSISTED_SECTIONS
            .iter()
            .map(|key| (key.to_string(), SectionProgress::default()))
            .collect();

        Self {
            books_progress,
            flashcards: Vec::new(),
            total_study_time: 0,
            streak_days: 0,
            last_study_date: None,
        }
    }
}

impl StudyData {
    /// Fill in any default section a persisted blob is missing, keeping the
    /// persisted entries for sections it does have.
    pub fn with_default_sections(mut self) -> Self {
        for key in PERSISTED_SECTIONS {
            self.books_progress.entry(key.to_string()).or_default();
        }
        self
    }

    pub fn section(&self, key: &str) -> Option<&SectionProgress> {
        self.books_progress.get(key)
    }

    pub fn recent_flashcards(&self, n: usize) -> &[Flashcard] {
        let start = self.flashcards.len().saturating_sub(n);
        &self.flashcards[start..]
    }

    pub fn flashcard(&self, id: &str) -> Option<&Flashcard> {
        self.flashcards.iter().find(|c| c.id == id)
    }

    pub fn study_hours(&self) -> u32 {
        self.total_study_time / 60
    }
}

// === Review ===

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewOutcome {
    Correct,
    Incorrect,
}

// JSON output wrapper for CLI
#[derive(Debug, Serialize)]
pub struct JsonOutput<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}
