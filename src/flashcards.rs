use chrono::Utc;
use uuid::Uuid;

use crate::error::{Result, StudyError};
use crate::models::{Flashcard, NewFlashcard, StudyData};

/// Categories offered by the creation form.
pub const CATEGORIES: [&str; 6] = [
    "La Connaissance de la vie",
    "Vingt mille lieues sous les mers",
    "Le Mur invisible",
    "Thèmes transversaux",
    "Méthodologie",
    "Concepts clés",
];

fn required(value: &str, field: &'static str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(StudyError::Validation { field })
    } else {
        Ok(trimmed.to_string())
    }
}

/// Validate the input and build a card with a fresh id and timestamp.
pub fn build(input: NewFlashcard) -> Result<Flashcard> {
    let question = required(&input.question, "question")?;
    let answer = required(&input.answer, "answer")?;
    let category = required(&input.category, "category")?;
    let book = input
        .book
        .map(|b| b.trim().to_string())
        .filter(|b| !b.is_empty());

    Ok(Flashcard {
        id: Uuid::new_v4().to_string(),
        question,
        answer,
        category,
        difficulty: input.difficulty,
        book,
        created_at: Some(Utc::now()),
    })
}

/// Append a validated card. Validation runs before `data` is touched.
pub fn create(mut data: StudyData, input: NewFlashcard) -> Result<(StudyData, Flashcard)> {
    let card = build(input)?;
    log::info!("Created flashcard {} in '{}'", card.id, card.category);
    data.flashcards.push(card.clone());
    Ok((data, card))
}

/// Cards in insertion order, optionally narrowed by book and category.
pub fn list<'a>(
    data: &'a StudyData,
    book: Option<&str>,
    category: Option<&str>,
) -> Vec<&'a Flashcard> {
    data.flashcards
        .iter()
        .filter(|c| book.map_or(true, |b| c.book.as_deref() == Some(b)))
        .filter(|c| category.map_or(true, |cat| c.category == cat))
        .collect()
}

/// The last `n` cards passing the filters, most recent first.
pub fn recent<'a>(
    data: &'a StudyData,
    book: Option<&str>,
    category: Option<&str>,
    n: usize,
) -> Vec<&'a Flashcard> {
    let mut cards = list(data, book, category);
    let cards = cards.split_off(cards.len().saturating_sub(n));
    cards.into_iter().rev().collect()
}

/// Distinct categories of the stored cards, in first-seen order.
pub fn categories(data: &StudyData) -> Vec<&str> {
    let mut seen: Vec<&str> = Vec::new();
    for card in &data.flashcards {
        if !seen.contains(&card.category.as_str()) {
            seen.push(card.category.as_str());
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Difficulty;
    use std::collections::HashSet;

    fn input(question: &str, answer: &str, category: &str) -> NewFlashcard {
        NewFlashcard {
            question: question.to_string(),
            answer: answer.to_string(),
            category: category.to_string(),
            difficulty: Difficulty::Easy,
            book: None,
        }
    }

    mod create_tests {
        use super::*;

        #[test]
        fn appends_with_id_and_timestamp() {
            let (data, card) = create(StudyData::default(), input("Q", "A", "C")).unwrap();
            assert_eq!(data.flashcards.len(), 1);
            assert!(!card.id.is_empty());
            assert!(card.created_at.is_some());

            let stored = data.flashcard(&card.id).unwrap();
            assert_eq!(stored.question, "Q");
            assert_eq!(stored.answer, "A");
            assert_eq!(stored.category, "C");
            assert_eq!(stored.difficulty, Difficulty::Easy);
        }

        #[test]
        fn trims_fields() {
            let (_, card) = create(StudyData::default(), input("  Q ", "\tA\n", " C ")).unwrap();
            assert_eq!(card.question, "Q");
            assert_eq!(card.answer, "A");
            assert_eq!(card.category, "C");
        }

        #[test]
        fn preserves_insertion_order() {
            let (data, first) = create(StudyData::default(), input("1", "A", "C")).unwrap();
            let (data, second) = create(data, input("2", "A", "C")).unwrap();
            assert_eq!(data.flashcards[0].id, first.id);
            assert_eq!(data.flashcards[1].id, second.id);
        }

        #[test]
        fn ids_never_repeat() {
            let mut data = StudyData::default();
            for _ in 0..500 {
                data = create(data, input("Q", "A", "C")).unwrap().0;
            }
            let ids: HashSet<&str> = data.flashcards.iter().map(|c| c.id.as_str()).collect();
            assert_eq!(ids.len(), 500);
        }

        #[test]
        fn blank_book_is_dropped() {
            let mut i = input("Q", "A", "C");
            i.book = Some("  ".to_string());
            assert!(build(i).unwrap().book.is_none());
        }
    }

    mod validation_tests {
        use super::*;

        #[test]
        fn empty_question_rejected() {
            let result = create(StudyData::default(), input("", "A", "C"));
            assert!(matches!(
                result,
                Err(StudyError::Validation { field: "question" })
            ));
        }

        #[test]
        fn whitespace_answer_rejected() {
            let result = create(StudyData::default(), input("Q", "   ", "C"));
            assert!(matches!(
                result,
                Err(StudyError::Validation { field: "answer" })
            ));
        }

        #[test]
        fn missing_category_rejected() {
            let result = create(StudyData::default(), input("Q", "A", ""));
            assert!(matches!(
                result,
                Err(StudyError::Validation { field: "category" })
            ));
        }

        #[test]
        fn rejection_leaves_list_unchanged() {
            let (data, _) = create(StudyData::default(), input("Q", "A", "C")).unwrap();
            let before = data.clone();
            assert!(create(data, input("Q", "", "C")).is_err());
            assert_eq!(before.flashcards.len(), 1);
        }
    }

    mod list_tests {
        use super::*;

        fn seeded() -> StudyData {
            let mut data = StudyData::default();
            for (q, book, cat) in [
                ("1", Some("mur-invisible"), "Concepts clés"),
                ("2", None, "Méthodologie"),
                ("3", Some("mur-invisible"), "Méthodologie"),
            ] {
                let mut i = input(q, "A", cat);
                i.book = book.map(String::from);
                data = create(data, i).unwrap().0;
            }
            data
        }

        #[test]
        fn no_filters_returns_all() {
            assert_eq!(list(&seeded(), None, None).len(), 3);
        }

        #[test]
        fn filters_combine() {
            let data = seeded();
            let by_book: Vec<&str> = list(&data, Some("mur-invisible"), None)
                .iter()
                .map(|c| c.question.as_str())
                .collect();
            assert_eq!(by_book, ["1", "3"]);

            let both = list(&data, Some("mur-invisible"), Some("Méthodologie"));
            assert_eq!(both.len(), 1);
            assert_eq!(both[0].question, "3");
        }

        #[test]
        fn recent_applies_filters_before_limit() {
            let data = seeded();
            let questions: Vec<&str> = recent(&data, None, Some("Méthodologie"), 5)
                .iter()
                .map(|c| c.question.as_str())
                .collect();
            assert_eq!(questions, ["3", "2"]);

            let last: Vec<&str> = recent(&data, None, None, 1)
                .iter()
                .map(|c| c.question.as_str())
                .collect();
            assert_eq!(last, ["3"]);
            assert!(recent(&data, None, None, 0).is_empty());
        }

        #[test]
        fn categories_are_distinct_in_first_seen_order() {
            let mut data = seeded();
            data = create(data, input("4", "A", "Hors programme")).unwrap().0;
            assert_eq!(
                categories(&data),
                ["Concepts clés", "Méthodologie", "Hors programme"]
            );
            assert!(categories(&StudyData::default()).is_empty());
        }
    }
}
