//! Application state: the loaded content, the study data and the review
//! session, plus the user intents that mutate them. Every completed
//! mutation is written through to storage before it becomes visible.

use chrono::{Local, NaiveDate, Utc};
use rand::Rng;

use crate::content::{ContentStore, THEMES};
use crate::db::Database;
use crate::error::{Result, StudyError};
use crate::flashcards;
use crate::models::{Flashcard, NewFlashcard, ReviewOutcome, SectionProgress, StudyData};
use crate::progress;
use crate::router::{self, Route, Screen};
use crate::session::{self, Advance, SessionManager};

fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub struct Study {
    content: ContentStore,
    db: Database,
    data: StudyData,
    themes: SectionProgress,
    session: SessionManager,
    route: Route,
}

impl Study {
    pub fn load(content: ContentStore, db: Database) -> Result<Self> {
        let data = progress::refresh_totals(db.load()?, &content);
        let themes = progress::theme_progress(db.load_theme_seen()?, &content);
        Ok(Self {
            content,
            db,
            data,
            themes,
            session: SessionManager::new(),
            route: Route::default(),
        })
    }

    pub fn data(&self) -> &StudyData {
        &self.data
    }

    pub fn content(&self) -> &ContentStore {
        &self.content
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    /// Progress of any section, themes included.
    pub fn progress(&self, section: &str) -> Option<&SectionProgress> {
        if section == THEMES {
            Some(&self.themes)
        } else {
            self.data.section(section)
        }
    }

    pub fn theme_progress(&self) -> &SectionProgress {
        &self.themes
    }

    pub fn screen(&self) -> Screen<'_> {
        router::resolve(&self.route, &self.content, &self.data, &self.themes)
    }

    // Navigation
    /// Switch views. Leaving the flashcards view abandons any session.
    pub fn navigate(&mut self, token: &str) {
        self.route = Route::to(token);
        if self.session.exit().is_some() {
            log::debug!("Session abandoned on navigation to {}", token);
        }
    }

    /// Jump to the flashcards view with `card_id` open for review.
    pub fn open_flashcard(&mut self, card_id: &str) {
        if self.data.flashcard(card_id).is_none() {
            log::debug!("Card {} not found, opening the first card", card_id);
        }
        self.route = Route::open_card(card_id);
        self.session.start_at(self.data.flashcards.clone(), card_id);
        self.route.pending_card = None;
    }

    fn commit(&mut self, next: StudyData) -> Result<()> {
        let next = progress::record_study_day(next, today());
        self.db.save(&next)?;
        self.data = next;
        Ok(())
    }

    // Intents
    /// A fiche that was already seen leaves the study data untouched.
    pub fn mark_fiche_seen(&mut self, section: &str, fiche_id: &str) -> Result<()> {
        if section == THEMES {
            let (themes, recorded) =
                progress::mark_theme_seen(self.themes.clone(), &self.content, fiche_id)?;
            if !recorded {
                return Ok(());
            }
            let next = progress::record_study_day(self.data.clone(), today());
            self.db.save_with_themes(&next, &themes.fiches_seen)?;
            self.themes = themes;
            self.data = next;
            return Ok(());
        }

        let (next, recorded) =
            progress::mark_seen(self.data.clone(), &self.content, section, fiche_id)?;
        if recorded {
            self.commit(next)?;
        }
        Ok(())
    }

    pub fn create_flashcard(&mut self, input: NewFlashcard) -> Result<Flashcard> {
        let (next, card) = flashcards::create(self.data.clone(), input)?;
        self.commit(next)?;
        Ok(card)
    }

    /// Cards passing the current book and category filters.
    pub fn filtered_cards(&self, book: Option<&str>, category: Option<&str>) -> Vec<Flashcard> {
        session::filter(&self.data, book, category)
    }

    pub fn start_session<R: Rng + ?Sized>(
        &mut self,
        book: Option<&str>,
        category: Option<&str>,
        count: usize,
        rng: &mut R,
    ) -> bool {
        let cards = self.filtered_cards(book, category);
        self.session.start(cards, count, rng)
    }

    pub fn reveal(&mut self) {
        self.session.reveal();
    }

    /// Move past the current card. Finishing a session adds its
    /// duration to the study time.
    pub fn advance(&mut self, outcome: Option<ReviewOutcome>) -> Result<Option<Advance>> {
        let step = self.session.advance(outcome);
        if let Some(Advance::Finished(summary)) = step {
            let minutes = summary.elapsed_minutes(Utc::now());
            self.commit(progress::add_study_minutes(self.data.clone(), minutes))?;
        }
        Ok(step)
    }

    pub fn retreat(&mut self) {
        self.session.retreat();
    }

    pub fn exit_session(&mut self) {
        self.session.exit();
    }

    /// Wipe all persisted progress and flashcards. Refused unless the user
    /// confirmed.
    pub fn reset_all_progress(&mut self, confirmed: bool) -> Result<()> {
        if !confirmed {
            return Err(StudyError::ResetNotConfirmed);
        }

        self.db.clear()?;
        self.session.exit();
        self.data = progress::refresh_totals(StudyData::default(), &self.content);
        self.themes = progress::theme_progress(Vec::new(), &self.content);
        self.route = Route::default();
        log::info!("All progress reset");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{CONNAISSANCE_VIE, METHODOLOGIE, MUR_INVISIBLE, VINGT_MILLE_LIEUES};
    use crate::db::STUDY_DATA_KEY;
    use crate::models::Difficulty;
    use crate::router::ActiveView;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn setup_db() -> Database {
        let db = Database::open(":memory:").expect("Failed to create in-memory database");
        db.init().expect("Failed to initialize database");
        db
    }

    fn setup() -> Study {
        Study::load(ContentStore::bundled().unwrap(), setup_db()).unwrap()
    }

    fn input(question: &str, answer: &str, category: &str) -> NewFlashcard {
        NewFlashcard {
            question: question.to_string(),
            answer: answer.to_string(),
            category: category.to_string(),
            difficulty: Difficulty::Easy,
            book: None,
        }
    }

    // Reload from the same storage, as a restart would
    fn reload(study: Study) -> Study {
        Study::load(study.content, study.db).unwrap()
    }

    mod load_tests {
        use super::*;

        #[test]
        fn empty_storage_gives_content_totals() {
            let study = setup();
            let content = ContentStore::bundled().unwrap();
            for key in [CONNAISSANCE_VIE, VINGT_MILLE_LIEUES, MUR_INVISIBLE, METHODOLOGIE] {
                let p = study.progress(key).unwrap();
                assert_eq!(p.total as usize, content.count(key));
                assert_eq!(p.completed, 0);
                assert!(p.fiches_seen.is_empty());
            }
            assert_eq!(study.theme_progress().total, 3);
            assert!(study.data().flashcards.is_empty());
        }

        #[test]
        fn load_does_not_write() {
            let study = setup();
            assert!(study.db.get(STUDY_DATA_KEY).unwrap().is_none());
        }
    }

    mod mark_seen_tests {
        use super::*;

        #[test]
        fn marking_twice_is_idempotent() {
            let mut study = setup();
            study.mark_fiche_seen(CONNAISSANCE_VIE, "canguilhem-1").unwrap();
            study.mark_fiche_seen(CONNAISSANCE_VIE, "canguilhem-1").unwrap();

            assert_eq!(
                study.progress(CONNAISSANCE_VIE).unwrap(),
                &SectionProgress {
                    completed: 1,
                    total: 3,
                    fiches_seen: vec!["canguilhem-1".to_string()],
                }
            );
        }

        #[test]
        fn progress_survives_reload() {
            let mut study = setup();
            study.mark_fiche_seen(METHODOLOGIE, "methodo-2").unwrap();
            study.mark_fiche_seen(THEMES, "theme-1").unwrap();

            let study = reload(study);
            assert_eq!(study.progress(METHODOLOGIE).unwrap().fiches_seen, ["methodo-2"]);
            assert_eq!(study.theme_progress().fiches_seen, ["theme-1"]);
            assert_eq!(study.data().streak_days, 1);
        }

        #[test]
        fn repeat_mark_on_a_later_day_changes_nothing() {
            let mut study = setup();
            study.mark_fiche_seen(CONNAISSANCE_VIE, "canguilhem-1").unwrap();
            study.mark_fiche_seen(THEMES, "theme-1").unwrap();
            study.data.last_study_date = today().pred_opt();
            study.db.save(&study.data).unwrap();

            let before = study.data().clone();
            let stored = study.db.get(STUDY_DATA_KEY).unwrap();
            study.mark_fiche_seen(CONNAISSANCE_VIE, "canguilhem-1").unwrap();
            study.mark_fiche_seen(THEMES, "theme-1").unwrap();

            assert_eq!(study.data(), &before);
            assert_eq!(study.db.get(STUDY_DATA_KEY).unwrap(), stored);
        }

        #[test]
        fn failed_theme_save_leaves_state_untouched() {
            let mut study = setup();
            let before = study.data().clone();
            study.db.set_read_only(true).unwrap();

            assert!(study.mark_fiche_seen(THEMES, "theme-1").is_err());
            assert!(study.theme_progress().fiches_seen.is_empty());
            assert_eq!(study.data(), &before);

            study.db.set_read_only(false).unwrap();
            let study = reload(study);
            assert!(study.theme_progress().fiches_seen.is_empty());
        }

        #[test]
        fn rejected_mark_changes_nothing() {
            let mut study = setup();
            let before = study.data().clone();
            assert!(study.mark_fiche_seen(MUR_INVISIBLE, "verne-1").is_err());
            assert_eq!(study.data(), &before);
            assert!(study.db.get(STUDY_DATA_KEY).unwrap().is_none());
        }
    }

    mod flashcard_tests {
        use super::*;

        #[test]
        fn create_then_reject() {
            let mut study = setup();
            let card = study.create_flashcard(input("Q", "A", "C")).unwrap();
            assert_eq!(study.data().flashcards.len(), 1);
            assert!(!card.id.is_empty());
            assert_eq!(study.data().flashcard(&card.id).unwrap().difficulty, Difficulty::Easy);

            let result = study.create_flashcard(input("Q", "", "C"));
            assert!(matches!(result, Err(StudyError::Validation { field: "answer" })));
            assert_eq!(study.data().flashcards.len(), 1);
        }

        #[test]
        fn cards_survive_reload() {
            let mut study = setup();
            let card = study.create_flashcard(input("Q", "A", "C")).unwrap();
            let study = reload(study);
            assert_eq!(study.data().flashcard(&card.id), Some(&card));
        }
    }

    mod session_tests {
        use super::*;

        fn with_cards(n: usize) -> Study {
            let mut study = setup();
            for i in 0..n {
                study
                    .create_flashcard(input(&format!("Q{}", i), "A", "Concepts clés"))
                    .unwrap();
            }
            study
        }

        #[test]
        fn full_session_returns_to_idle() {
            let mut study = with_cards(4);
            let mut rng = StdRng::seed_from_u64(1);
            assert!(study.start_session(None, None, 3, &mut rng));

            let mut last = None;
            for _ in 0..3 {
                study.reveal();
                last = study.advance(Some(ReviewOutcome::Correct)).unwrap();
            }
            match last {
                Some(Advance::Finished(summary)) => assert_eq!(summary.stats.correct, 3),
                other => panic!("Expected Finished, got {:?}", other),
            }
            assert!(!study.session().is_active());
        }

        #[test]
        fn empty_filter_does_not_start() {
            let mut study = with_cards(2);
            let mut rng = StdRng::seed_from_u64(1);
            assert!(!study.start_session(Some(MUR_INVISIBLE), None, 5, &mut rng));
            assert!(!study.session().is_active());
        }

        #[test]
        fn open_flashcard_positions_review() {
            let mut study = with_cards(3);
            let id = study.data().flashcards[1].id.clone();
            study.open_flashcard(&id);

            assert_eq!(study.route().view, ActiveView::Flashcards);
            let state = study.session().state().unwrap();
            assert_eq!(state.current_index, 1);
            assert_eq!(state.cards.len(), 3);
        }

        #[test]
        fn navigation_abandons_session() {
            let mut study = with_cards(2);
            let mut rng = StdRng::seed_from_u64(1);
            study.start_session(None, None, 2, &mut rng);
            study.navigate("dashboard");
            assert!(!study.session().is_active());
            assert_eq!(study.route().view, ActiveView::Dashboard);
        }
    }

    mod reset_tests {
        use super::*;

        #[test]
        fn requires_confirmation() {
            let mut study = setup();
            study.create_flashcard(input("Q", "A", "C")).unwrap();
            let result = study.reset_all_progress(false);
            assert!(matches!(result, Err(StudyError::ResetNotConfirmed)));
            assert_eq!(study.data().flashcards.len(), 1);
        }

        #[test]
        fn clears_everything() {
            let mut study = setup();
            study.create_flashcard(input("Q", "A", "C")).unwrap();
            study.mark_fiche_seen(CONNAISSANCE_VIE, "canguilhem-2").unwrap();
            study.mark_fiche_seen(THEMES, "theme-3").unwrap();

            study.reset_all_progress(true).unwrap();
            assert!(study.data().flashcards.is_empty());
            assert_eq!(study.progress(CONNAISSANCE_VIE).unwrap().completed, 0);
            assert_eq!(study.progress(CONNAISSANCE_VIE).unwrap().total, 3);

            let study = reload(study);
            assert!(study.data().flashcards.is_empty());
            assert_eq!(study.theme_progress().completed, 0);
            assert_eq!(study.data().streak_days, 0);
        }
    }
}
