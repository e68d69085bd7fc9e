mod ui;
mod widgets;

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::content;
use crate::flashcards::{self, CATEGORIES};
use crate::models::{Difficulty, NewFlashcard, ReviewOutcome};
use crate::router::{ActiveView, RECENT_CARDS};
use crate::session::{self, Advance};
use crate::state::Study;

type AppResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Views in tab order, with their tab labels.
pub const TABS: [(&str, &str); 8] = [
    ("dashboard", "Accueil"),
    (content::CONNAISSANCE_VIE, "Canguilhem"),
    (content::VINGT_MILLE_LIEUES, "Verne"),
    (content::MUR_INVISIBLE, "Haushofer"),
    (content::METHODOLOGIE, "Méthodologie"),
    (content::THEMES, "Thèmes"),
    ("flashcards", "Flashcards"),
    ("create-flashcard", "Nouvelle carte"),
];

pub const DEFAULT_DECK_SIZE: usize = 10;

pub fn tab_index(view: ActiveView) -> usize {
    TABS.iter()
        .position(|(token, _)| *token == view.token())
        .unwrap_or(0)
}

pub struct StatefulList<T> {
    pub items: Vec<T>,
    pub selected: Option<usize>,
}

impl<T> StatefulList<T> {
    fn with_items(items: Vec<T>) -> Self {
        let selected = if items.is_empty() { None } else { Some(0) };
        Self { items, selected }
    }

    fn next(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.selected {
            Some(i) => {
                if i >= self.items.len() - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.selected = Some(i);
    }

    fn previous(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.selected {
            Some(i) => {
                if i == 0 {
                    self.items.len() - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.selected = Some(i);
    }

    fn first(&mut self) {
        if !self.items.is_empty() {
            self.selected = Some(0);
        }
    }

    fn last(&mut self) {
        if !self.items.is_empty() {
            self.selected = Some(self.items.len() - 1);
        }
    }

    fn selected_item(&self) -> Option<&T> {
        self.selected.and_then(|i| self.items.get(i))
    }
}

// None, then each option in turn, then None again
fn cycle<T: Copy + PartialEq>(current: Option<T>, options: &[T]) -> Option<T> {
    match current.and_then(|c| options.iter().position(|o| *o == c)) {
        None => options.first().copied(),
        Some(i) => options.get(i + 1).copied(),
    }
}

fn cycle_back<T: Copy + PartialEq>(current: Option<T>, options: &[T]) -> Option<T> {
    let reversed: Vec<T> = options.iter().rev().copied().collect();
    cycle(current, &reversed)
}

fn book_keys() -> Vec<&'static str> {
    content::books().map(|s| s.key).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Info(String),
    Error(String),
}

/// Filters and size of the next review session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckSetup {
    pub book: Option<&'static str>,
    pub category: Option<String>,
    pub count: usize,
}

impl Default for DeckSetup {
    fn default() -> Self {
        Self {
            book: None,
            category: None,
            count: DEFAULT_DECK_SIZE,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Field {
    #[default]
    Question,
    Answer,
    Category,
    Difficulty,
    Book,
}

impl Field {
    const ALL: [Field; 5] = [
        Field::Question,
        Field::Answer,
        Field::Category,
        Field::Difficulty,
        Field::Book,
    ];

    fn index(&self) -> usize {
        Self::ALL.iter().position(|f| f == self).unwrap_or(0)
    }

    fn next(&self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    fn prev(&self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Field::Question | Field::Answer)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardForm {
    pub question: String,
    pub answer: String,
    pub category: Option<&'static str>,
    pub difficulty: Difficulty,
    pub book: Option<&'static str>,
    pub focus: Field,
}

impl CardForm {
    fn input(&self) -> NewFlashcard {
        NewFlashcard {
            question: self.question.clone(),
            answer: self.answer.clone(),
            category: self.category.unwrap_or_default().to_string(),
            difficulty: self.difficulty,
            book: self.book.map(String::from),
        }
    }

    fn text_mut(&mut self) -> Option<&mut String> {
        match self.focus {
            Field::Question => Some(&mut self.question),
            Field::Answer => Some(&mut self.answer),
            _ => None,
        }
    }

    fn cycle_choice(&mut self, forward: bool) {
        match self.focus {
            Field::Category => {
                self.category = if forward {
                    cycle(self.category, &CATEGORIES)
                } else {
                    cycle_back(self.category, &CATEGORIES)
                }
            }
            Field::Difficulty => self.difficulty = self.difficulty.cycle(),
            Field::Book => {
                let books = book_keys();
                self.book = if forward {
                    cycle(self.book, &books)
                } else {
                    cycle_back(self.book, &books)
                }
            }
            Field::Question | Field::Answer => {}
        }
    }
}

pub struct App {
    study: Study,
    pub fiches: StatefulList<String>,
    pub open_fiche: Option<String>,
    pub recent: StatefulList<String>,
    pub deck: DeckSetup,
    pub form: CardForm,
    pub status: Option<Status>,
    pub confirm_reset: bool,
    pub should_quit: bool,
}

impl App {
    pub fn new(study: Study) -> Self {
        let mut app = Self {
            study,
            fiches: StatefulList::with_items(Vec::new()),
            open_fiche: None,
            recent: StatefulList::with_items(Vec::new()),
            deck: DeckSetup::default(),
            form: CardForm::default(),
            status: None,
            confirm_reset: false,
            should_quit: false,
        };
        app.refresh_lists();
        app
    }

    pub fn study(&self) -> &Study {
        &self.study
    }

    pub fn view(&self) -> ActiveView {
        self.study.route().view
    }

    fn refresh_lists(&mut self) {
        let fiches = match self.view() {
            ActiveView::Section(_) | ActiveView::Themes => self
                .study
                .content()
                .fiches_for(self.view().token())
                .iter()
                .map(|f| f.id.clone())
                .collect(),
            _ => Vec::new(),
        };
        self.fiches = StatefulList::with_items(fiches);
        self.recent = StatefulList::with_items(
            self.study
                .data()
                .recent_flashcards(RECENT_CARDS)
                .iter()
                .rev()
                .map(|c| c.id.clone())
                .collect(),
        );
    }

    fn go_to(&mut self, token: &str) {
        self.study.navigate(token);
        self.open_fiche = None;
        self.status = None;
        self.refresh_lists();
    }

    fn switch_tab(&mut self, forward: bool) {
        let len = TABS.len();
        let current = tab_index(self.view());
        let next = if forward {
            (current + 1) % len
        } else {
            (current + len - 1) % len
        };
        self.go_to(TABS[next].0);
    }

    /// Cards matching the current deck filters.
    pub fn available_cards(&self) -> usize {
        self.study
            .filtered_cards(self.deck.book, self.deck.category.as_deref())
            .len()
    }

    // Input errors become an inline message; storage errors abort the UI
    fn surface<T>(&mut self, result: crate::error::Result<T>) -> AppResult<Option<T>> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.is_recoverable() => {
                self.status = Some(Status::Error(e.to_string()));
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn mark_seen(&mut self, fiche_id: &str) -> AppResult<()> {
        let section = self.view().token();
        let result = self.study.mark_fiche_seen(section, fiche_id);
        if self.surface(result)?.is_some() {
            self.status = Some(Status::Info(format!("'{}' marked as seen", fiche_id)));
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) -> AppResult<()> {
        if self.confirm_reset {
            self.confirm_reset = false;
            if !matches!(key, KeyCode::Char('y') | KeyCode::Char('Y')) {
                self.status = Some(Status::Info("Reset cancelled".to_string()));
                return Ok(());
            }
            self.study.reset_all_progress(true)?;
            self.deck = DeckSetup::default();
            self.form = CardForm::default();
            self.open_fiche = None;
            self.refresh_lists();
            self.status = Some(Status::Info("All progress has been reset".to_string()));
            return Ok(());
        }

        match key {
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
                return Ok(());
            }
            KeyCode::Tab => {
                self.switch_tab(!modifiers.contains(KeyModifiers::SHIFT));
                return Ok(());
            }
            KeyCode::BackTab => {
                self.switch_tab(false);
                return Ok(());
            }
            _ => {}
        }

        // The form captures every printable key
        if self.view() == ActiveView::CreateFlashcard {
            return self.handle_form_key(key);
        }

        match key {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('R') => self.confirm_reset = true,
            _ => match self.view() {
                ActiveView::Dashboard => self.handle_dashboard_key(key),
                ActiveView::Section(_) | ActiveView::Themes => self.handle_section_key(key)?,
                ActiveView::Flashcards => self.handle_flashcards_key(key)?,
                ActiveView::CreateFlashcard => {}
            },
        }
        Ok(())
    }

    fn handle_dashboard_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('j') | KeyCode::Down => self.recent.next(),
            KeyCode::Char('k') | KeyCode::Up => self.recent.previous(),
            KeyCode::Enter => {
                if let Some(id) = self.recent.selected_item().cloned() {
                    self.study.open_flashcard(&id);
                    self.status = None;
                }
            }
            KeyCode::Char('h') | KeyCode::Left => self.switch_tab(false),
            KeyCode::Char('l') | KeyCode::Right => self.switch_tab(true),
            _ => {}
        }
    }

    fn handle_section_key(&mut self, key: KeyCode) -> AppResult<()> {
        if self.open_fiche.is_some() {
            match key {
                KeyCode::Esc | KeyCode::Char('h') | KeyCode::Left => self.open_fiche = None,
                KeyCode::Char('s') | KeyCode::Char(' ') => {
                    if let Some(id) = self.open_fiche.clone() {
                        self.mark_seen(&id)?;
                    }
                }
                KeyCode::Char('j') | KeyCode::Down => {
                    self.fiches.next();
                    self.open_fiche = self.fiches.selected_item().cloned();
                }
                KeyCode::Char('k') | KeyCode::Up => {
                    self.fiches.previous();
                    self.open_fiche = self.fiches.selected_item().cloned();
                }
                _ => {}
            }
            return Ok(());
        }

        match key {
            KeyCode::Char('j') | KeyCode::Down => self.fiches.next(),
            KeyCode::Char('k') | KeyCode::Up => self.fiches.previous(),
            KeyCode::Char('g') => self.fiches.first(),
            KeyCode::Char('G') => self.fiches.last(),
            KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right => {
                self.open_fiche = self.fiches.selected_item().cloned();
            }
            KeyCode::Char('s') | KeyCode::Char(' ') => {
                if let Some(id) = self.fiches.selected_item().cloned() {
                    self.mark_seen(&id)?;
                }
            }
            KeyCode::Char('h') | KeyCode::Left => self.switch_tab(false),
            KeyCode::Esc => self.go_to("dashboard"),
            _ => {}
        }
        Ok(())
    }

    fn handle_flashcards_key(&mut self, key: KeyCode) -> AppResult<()> {
        if let Some(state) = self.study.session().state() {
            let revealed = state.show_answer;
            match key {
                KeyCode::Char(' ') | KeyCode::Enter if !revealed => self.study.reveal(),
                KeyCode::Char('y') if revealed => self.advance(Some(ReviewOutcome::Correct))?,
                KeyCode::Char('n') if revealed => self.advance(Some(ReviewOutcome::Incorrect))?,
                KeyCode::Char('l') | KeyCode::Right => {
                    if self.study.session().can_advance() {
                        self.advance(None)?;
                    }
                }
                KeyCode::Char('h') | KeyCode::Left => self.study.retreat(),
                KeyCode::Esc => {
                    self.study.exit_session();
                    self.status = Some(Status::Info("Session abandoned".to_string()));
                }
                _ => {}
            }
            return Ok(());
        }

        let available = self.available_cards();
        match key {
            KeyCode::Char('b') => self.deck.book = cycle(self.deck.book, &book_keys()),
            KeyCode::Char('c') => {
                let options = flashcards::categories(self.study.data());
                self.deck.category =
                    cycle(self.deck.category.as_deref(), &options).map(str::to_string);
            }
            KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Char('k') | KeyCode::Up => {
                if self.deck.count < available {
                    self.deck.count += 1;
                }
            }
            KeyCode::Char('-') | KeyCode::Char('j') | KeyCode::Down => {
                self.deck.count = self.deck.count.saturating_sub(1).max(1);
            }
            KeyCode::Enter | KeyCode::Char('s') => {
                let started = self.study.start_session(
                    self.deck.book,
                    self.deck.category.as_deref(),
                    self.deck.count,
                    &mut rand::thread_rng(),
                );
                self.status = if started {
                    None
                } else {
                    Some(Status::Error("No flashcards match these filters".to_string()))
                };
            }
            KeyCode::Char('h') | KeyCode::Left => self.switch_tab(false),
            KeyCode::Char('l') | KeyCode::Right => self.switch_tab(true),
            KeyCode::Esc => self.go_to("dashboard"),
            _ => {}
        }
        Ok(())
    }

    fn advance(&mut self, outcome: Option<ReviewOutcome>) -> AppResult<()> {
        if let Some(Advance::Finished(summary)) = self.study.advance(outcome)? {
            self.status = Some(Status::Info(format!(
                "Session complete: {} correct, {} incorrect out of {}",
                summary.stats.correct, summary.stats.incorrect, summary.cards
            )));
        }
        Ok(())
    }

    fn handle_form_key(&mut self, key: KeyCode) -> AppResult<()> {
        match key {
            KeyCode::Esc => self.go_to("dashboard"),
            KeyCode::Down => self.form.focus = self.form.focus.next(),
            KeyCode::Up => self.form.focus = self.form.focus.prev(),
            KeyCode::Right => self.form.cycle_choice(true),
            KeyCode::Left => self.form.cycle_choice(false),
            KeyCode::Enter => self.submit_form()?,
            KeyCode::Backspace => {
                if let Some(text) = self.form.text_mut() {
                    text.pop();
                }
            }
            KeyCode::Char(c) => match self.form.text_mut() {
                Some(text) => text.push(c),
                None if c == ' ' => self.form.cycle_choice(true),
                None => {}
            },
            _ => {}
        }
        Ok(())
    }

    fn submit_form(&mut self) -> AppResult<()> {
        let result = self.study.create_flashcard(self.form.input());
        if let Some(card) = self.surface(result)? {
            self.form = CardForm::default();
            self.refresh_lists();
            self.status = Some(Status::Info(format!("Flashcard created ({})", card.id)));
        }
        Ok(())
    }
}

/// Whether the session deck could start with the current filters.
pub fn can_start(app: &App) -> bool {
    app.available_cards() > 0
}

/// Deck size actually used for the current filters.
pub fn deck_size(app: &App) -> usize {
    session::clamp_count(app.deck.count, app.available_cards())
}

pub fn run(study: Study) -> AppResult<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(study);

    // Main loop
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> AppResult<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key.code, key.modifiers)?;
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
