//! Reading progress reducers. Each takes the current state and returns the
//! next one; persisting the result is the caller's job.

use chrono::NaiveDate;
use serde::Serialize;

use crate::content::{ContentStore, PERSISTED_SECTIONS, THEMES};
use crate::error::{Result, StudyError};
use crate::models::{percentage, SectionProgress, StudyData};

// Returns whether the id was newly recorded
fn record(progress: &mut SectionProgress, fiche_id: &str) -> bool {
    if progress.has_seen(fiche_id) {
        return false;
    }
    progress.fiches_seen.push(fiche_id.to_string());
    progress.completed = progress.fiches_seen.len() as u32;
    true
}

fn ensure_member(content: &ContentStore, section: &str, fiche_id: &str) -> Result<()> {
    if content.contains(section, fiche_id) {
        Ok(())
    } else {
        Err(StudyError::UnknownFiche {
            section: section.to_string(),
            fiche: fiche_id.to_string(),
        })
    }
}

/// Mark a fiche of a book or methodology section as seen. Idempotent; the
/// flag is false when the fiche was already seen.
pub fn mark_seen(
    mut data: StudyData,
    content: &ContentStore,
    section: &str,
    fiche_id: &str,
) -> Result<(StudyData, bool)> {
    if !PERSISTED_SECTIONS.iter().any(|k| *k == section) {
        return Err(StudyError::UnknownSection(section.to_string()));
    }
    ensure_member(content, section, fiche_id)?;

    let progress = data.books_progress.entry(section.to_string()).or_default();
    progress.total = content.count(section) as u32;
    let recorded = record(progress, fiche_id);
    if recorded {
        log::debug!("Marked {} as seen in {}", fiche_id, section);
    }
    Ok((data, recorded))
}

/// Recompute every total from the content and restore `completed == |fichesSeen|`.
pub fn refresh_totals(mut data: StudyData, content: &ContentStore) -> StudyData {
    for (key, progress) in data.books_progress.iter_mut() {
        let mut seen: Vec<String> = Vec::with_capacity(progress.fiches_seen.len());
        for id in progress.fiches_seen.drain(..) {
            if !seen.contains(&id) {
                seen.push(id);
            }
        }
        progress.fiches_seen = seen;
        progress.completed = progress.fiches_seen.len() as u32;
        progress.total = content.count(key) as u32;
    }
    data
}

/// Theme progress as a standalone section instance.
pub fn theme_progress(fiches_seen: Vec<String>, content: &ContentStore) -> SectionProgress {
    let mut progress = SectionProgress {
        completed: 0,
        total: content.count(THEMES) as u32,
        fiches_seen: Vec::new(),
    };
    for id in &fiches_seen {
        record(&mut progress, id);
    }
    progress
}

pub fn mark_theme_seen(
    mut progress: SectionProgress,
    content: &ContentStore,
    fiche_id: &str,
) -> Result<(SectionProgress, bool)> {
    ensure_member(content, THEMES, fiche_id)?;
    progress.total = content.count(THEMES) as u32;
    let recorded = record(&mut progress, fiche_id);
    Ok((progress, recorded))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Overview {
    pub completed: u32,
    pub total: u32,
    pub percentage: u32,
}

/// Completion across the books and methodology; themes are tracked apart.
pub fn overview(data: &StudyData) -> Overview {
    let (completed, total) = PERSISTED_SECTIONS
        .iter()
        .filter_map(|key| data.section(key))
        .fold((0, 0), |(c, t), p| (c + p.completed, t + p.total));

    Overview {
        completed,
        total,
        percentage: percentage(completed, total),
    }
}

/// Update the consecutive-days streak for activity on `today`.
pub fn record_study_day(mut data: StudyData, today: NaiveDate) -> StudyData {
    data.streak_days = match data.last_study_date {
        Some(last) if last == today => data.streak_days.max(1),
        Some(last) if last.succ_opt() == Some(today) => data.streak_days + 1,
        _ => 1,
    };
    data.last_study_date = Some(today);
    data
}

pub fn add_study_minutes(mut data: StudyData, minutes: u32) -> StudyData {
    data.total_study_time = data.total_study_time.saturating_add(minutes);
    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{CONNAISSANCE_VIE, METHODOLOGIE, MUR_INVISIBLE};

    fn content() -> ContentStore {
        ContentStore::bundled().unwrap()
    }

    fn fresh() -> StudyData {
        refresh_totals(StudyData::default(), &content())
    }

    mod mark_seen_tests {
        use super::*;

        #[test]
        fn marks_new_fiche() {
            let (data, recorded) =
                mark_seen(fresh(), &content(), CONNAISSANCE_VIE, "canguilhem-1").unwrap();
            assert!(recorded);
            let p = data.section(CONNAISSANCE_VIE).unwrap();
            assert_eq!(p.completed, 1);
            assert_eq!(p.fiches_seen, ["canguilhem-1"]);
            assert_eq!(p.total, 3);
        }

        #[test]
        fn is_idempotent() {
            let c = content();
            let (once, first) = mark_seen(fresh(), &c, CONNAISSANCE_VIE, "canguilhem-1").unwrap();
            let (twice, again) =
                mark_seen(once.clone(), &c, CONNAISSANCE_VIE, "canguilhem-1").unwrap();
            assert!(first);
            assert!(!again);
            assert_eq!(once, twice);
            assert_eq!(
                twice.section(CONNAISSANCE_VIE).unwrap(),
                &SectionProgress {
                    completed: 1,
                    total: 3,
                    fiches_seen: vec!["canguilhem-1".to_string()],
                }
            );
        }

        #[test]
        fn keeps_insertion_order() {
            let c = content();
            let data = mark_seen(fresh(), &c, METHODOLOGIE, "methodo-3").unwrap().0;
            let data = mark_seen(data, &c, METHODOLOGIE, "methodo-1").unwrap().0;
            assert_eq!(
                data.section(METHODOLOGIE).unwrap().fiches_seen,
                ["methodo-3", "methodo-1"]
            );
        }

        #[test]
        fn rejects_fiche_from_other_section() {
            let result = mark_seen(fresh(), &content(), MUR_INVISIBLE, "canguilhem-1");
            assert!(matches!(result, Err(StudyError::UnknownFiche { .. })));
        }

        #[test]
        fn rejects_unknown_section() {
            let result = mark_seen(fresh(), &content(), "dashboard", "canguilhem-1");
            assert!(matches!(result, Err(StudyError::UnknownSection(_))));
        }

        #[test]
        fn themes_are_not_a_books_section() {
            let result = mark_seen(fresh(), &content(), THEMES, "theme-1");
            assert!(matches!(result, Err(StudyError::UnknownSection(_))));
        }
    }

    mod refresh_tests {
        use super::*;

        #[test]
        fn totals_follow_content_not_storage() {
            let mut data = StudyData::default();
            data.books_progress.get_mut(MUR_INVISIBLE).unwrap().total = 8;

            let data = refresh_totals(data, &content());
            assert_eq!(data.section(MUR_INVISIBLE).unwrap().total, 2);
            assert_eq!(data.section(METHODOLOGIE).unwrap().total, 3);
        }

        #[test]
        fn completed_is_recomputed_and_deduplicated() {
            let mut data = StudyData::default();
            let p = data.books_progress.get_mut(METHODOLOGIE).unwrap();
            p.completed = 9;
            p.fiches_seen = vec!["methodo-1".into(), "methodo-1".into(), "methodo-2".into()];

            let data = refresh_totals(data, &content());
            let p = data.section(METHODOLOGIE).unwrap();
            assert_eq!(p.completed, 2);
            assert_eq!(p.fiches_seen, ["methodo-1", "methodo-2"]);
        }
    }

    mod theme_tests {
        use super::*;

        #[test]
        fn builds_from_seen_ids() {
            let p = theme_progress(vec!["theme-1".into(), "theme-1".into()], &content());
            assert_eq!(p.completed, 1);
            assert_eq!(p.total, 3);
        }

        #[test]
        fn mark_is_idempotent() {
            let c = content();
            let p = theme_progress(Vec::new(), &c);
            let (once, first) = mark_theme_seen(p, &c, "theme-2").unwrap();
            let (twice, again) = mark_theme_seen(once.clone(), &c, "theme-2").unwrap();
            assert!(first);
            assert!(!again);
            assert_eq!(once, twice);
            assert_eq!(twice.completed, 1);
        }

        #[test]
        fn rejects_non_theme_fiche() {
            let c = content();
            let p = theme_progress(Vec::new(), &c);
            assert!(mark_theme_seen(p, &c, "methodo-1").is_err());
        }
    }

    mod overview_tests {
        use super::*;

        #[test]
        fn empty_progress_is_zero() {
            let o = overview(&fresh());
            assert_eq!(o.completed, 0);
            assert_eq!(o.total, 11);
            assert_eq!(o.percentage, 0);
        }

        #[test]
        fn no_content_does_not_divide_by_zero() {
            let empty = ContentStore::new(Vec::new()).unwrap();
            let o = overview(&refresh_totals(StudyData::default(), &empty));
            assert_eq!(o.total, 0);
            assert_eq!(o.percentage, 0);
        }

        #[test]
        fn counts_across_sections() {
            let c = content();
            let data = mark_seen(fresh(), &c, CONNAISSANCE_VIE, "canguilhem-1").unwrap().0;
            let data = mark_seen(data, &c, METHODOLOGIE, "methodo-1").unwrap().0;
            let o = overview(&data);
            assert_eq!(o.completed, 2);
            assert_eq!(o.percentage, 18);
        }
    }

    mod streak_tests {
        use super::*;

        fn day(d: u32) -> NaiveDate {
            NaiveDate::from_ymd_opt(2025, 10, d).unwrap()
        }

        #[test]
        fn first_day_starts_streak() {
            let data = record_study_day(StudyData::default(), day(1));
            assert_eq!(data.streak_days, 1);
            assert_eq!(data.last_study_date, Some(day(1)));
        }

        #[test]
        fn consecutive_days_extend_streak() {
            let data = record_study_day(StudyData::default(), day(1));
            let data = record_study_day(data, day(2));
            let data = record_study_day(data, day(3));
            assert_eq!(data.streak_days, 3);
        }

        #[test]
        fn same_day_is_unchanged() {
            let data = record_study_day(StudyData::default(), day(1));
            let data = record_study_day(data, day(2));
            let again = record_study_day(data.clone(), day(2));
            assert_eq!(again, data);
        }

        #[test]
        fn gap_resets_streak() {
            let data = record_study_day(StudyData::default(), day(1));
            let data = record_study_day(data, day(2));
            let data = record_study_day(data, day(5));
            assert_eq!(data.streak_days, 1);
        }

        #[test]
        fn study_minutes_accumulate() {
            let data = add_study_minutes(StudyData::default(), 45);
            let data = add_study_minutes(data, 30);
            assert_eq!(data.total_study_time, 75);
            assert_eq!(data.study_hours(), 1);
        }
    }
}
