//! Flashcard review sessions.
//!
//! The manager is either idle or holds exactly one active [`SessionState`].
//! Ending a session, by walking past the last card or exiting, drops the
//! deck and returns to idle; nothing about a session is persisted except
//! the study time the caller chooses to record from its summary.

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::flashcards;
use crate::models::{Flashcard, ReviewOutcome, StudyData};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    pub correct: u32,
    pub incorrect: u32,
}

impl SessionStats {
    fn record(&mut self, outcome: ReviewOutcome) {
        match outcome {
            ReviewOutcome::Correct => self.correct += 1,
            ReviewOutcome::Incorrect => self.incorrect += 1,
        }
    }

    pub fn answered(&self) -> u32 {
        self.correct + self.incorrect
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub cards: Vec<Flashcard>,
    pub current_index: usize,
    pub show_answer: bool,
    pub stats: SessionStats,
    pub started_at: DateTime<Utc>,
}

impl SessionState {
    fn new(cards: Vec<Flashcard>, current_index: usize) -> Self {
        Self {
            cards,
            current_index,
            show_answer: false,
            stats: SessionStats::default(),
            started_at: Utc::now(),
        }
    }

    pub fn current(&self) -> &Flashcard {
        &self.cards[self.current_index]
    }

    pub fn is_last(&self) -> bool {
        self.current_index + 1 >= self.cards.len()
    }

    /// Position of the current card, as a 0.0..=1.0 fraction of the deck.
    pub fn progress(&self) -> f64 {
        (self.current_index + 1) as f64 / self.cards.len() as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub cards: usize,
    pub stats: SessionStats,
    pub started_at: DateTime<Utc>,
}

impl SessionSummary {
    pub fn elapsed_minutes(&self, now: DateTime<Utc>) -> u32 {
        now.signed_duration_since(self.started_at)
            .num_minutes()
            .max(0) as u32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Next,
    Finished(SessionSummary),
}

/// Cards matching every filter that is present.
pub fn filter(data: &StudyData, book: Option<&str>, category: Option<&str>) -> Vec<Flashcard> {
    flashcards::list(data, book, category)
        .into_iter()
        .cloned()
        .collect()
}

pub fn clamp_count(requested: usize, available: usize) -> usize {
    requested.clamp(1, available.max(1)).min(available)
}

/// Uniformly shuffle the deck and keep the first `requested` cards.
pub fn sample<R: Rng + ?Sized>(
    mut cards: Vec<Flashcard>,
    requested: usize,
    rng: &mut R,
) -> Vec<Flashcard> {
    let count = clamp_count(requested, cards.len());
    cards.shuffle(rng);
    cards.truncate(count);
    cards
}

#[derive(Debug, Default)]
pub struct SessionManager {
    active: Option<SessionState>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn state(&self) -> Option<&SessionState> {
        self.active.as_ref()
    }

    /// Start a shuffled session. An empty deck leaves the manager idle.
    pub fn start<R: Rng + ?Sized>(
        &mut self,
        filtered: Vec<Flashcard>,
        requested: usize,
        rng: &mut R,
    ) -> bool {
        if filtered.is_empty() {
            log::debug!("Refusing to start a session on an empty deck");
            self.active = None;
            return false;
        }

        let deck = sample(filtered, requested, rng);
        log::debug!("Session started with {} cards", deck.len());
        self.active = Some(SessionState::new(deck, 0));
        true
    }

    /// Open the whole deck in its stored order, positioned on `card_id`
    /// (or the first card when the id is unknown).
    pub fn start_at(&mut self, cards: Vec<Flashcard>, card_id: &str) -> bool {
        if cards.is_empty() {
            self.active = None;
            return false;
        }

        let index = cards.iter().position(|c| c.id == card_id).unwrap_or(0);
        log::debug!("Session opened on card {} of {}", index + 1, cards.len());
        self.active = Some(SessionState::new(cards, index));
        true
    }

    pub fn reveal(&mut self) {
        if let Some(state) = self.active.as_mut() {
            state.show_answer = true;
        }
    }

    /// Next is unavailable on an unrevealed last card.
    pub fn can_advance(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|s| !(s.is_last() && !s.show_answer))
    }

    /// Tally `outcome` if given, then move on. Past the last card the
    /// session ends and its summary is returned. `None` when idle.
    pub fn advance(&mut self, outcome: Option<ReviewOutcome>) -> Option<Advance> {
        let state = self.active.as_mut()?;

        if let Some(outcome) = outcome {
            state.stats.record(outcome);
        }

        if state.is_last() {
            let summary = SessionSummary {
                cards: state.cards.len(),
                stats: state.stats,
                started_at: state.started_at,
            };
            log::debug!(
                "Session finished: {} correct, {} incorrect",
                summary.stats.correct,
                summary.stats.incorrect
            );
            self.active = None;
            return Some(Advance::Finished(summary));
        }

        state.current_index += 1;
        state.show_answer = false;
        Some(Advance::Next)
    }

    pub fn retreat(&mut self) {
        if let Some(state) = self.active.as_mut() {
            if state.current_index > 0 {
                state.current_index -= 1;
                state.show_answer = false;
            }
        }
    }

    /// Leave the session without finishing it.
    pub fn exit(&mut self) -> Option<SessionState> {
        self.active.take()
    }
}
