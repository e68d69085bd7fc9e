//! Read-only study content: the section catalog and the fiches document.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

use crate::error::{Result, StudyError};
use crate::models::{Fiche, FicheType};

const BUNDLED_CONTENT: &str = include_str!("../content/fiches.json");

pub const CONNAISSANCE_VIE: &str = "connaissance-vie";
pub const VINGT_MILLE_LIEUES: &str = "vingt-mille-lieues";
pub const MUR_INVISIBLE: &str = "mur-invisible";
pub const METHODOLOGIE: &str = "methodologie";
pub const THEMES: &str = "themes";

/// Sections whose progress lives in the `booksProgress` map.
pub const PERSISTED_SECTIONS: [&str; 4] =
    [CONNAISSANCE_VIE, VINGT_MILLE_LIEUES, MUR_INVISIBLE, METHODOLOGIE];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Book,
    Methodology,
    Themes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Section {
    pub key: &'static str,
    pub title: &'static str,
    pub author: Option<&'static str>,
    pub description: &'static str,
    pub citation: Option<&'static str>,
    pub kind: SectionKind,
}

pub const SECTIONS: [Section; 5] = [
    Section {
        key: CONNAISSANCE_VIE,
        title: "La Connaissance de la vie",
        author: Some("Georges Canguilhem"),
        description: "Épistémologie et philosophie des sciences du vivant",
        citation: Some("« Le propre du vivant, c'est de se faire son milieu, de se composer son milieu. »"),
        kind: SectionKind::Book,
    },
    Section {
        key: VINGT_MILLE_LIEUES,
        title: "Vingt mille lieues sous les mers",
        author: Some("Jules Verne"),
        description: "Nature, technique et exploration scientifique",
        citation: Some("« Mobilis in mobili. »"),
        kind: SectionKind::Book,
    },
    Section {
        key: MUR_INVISIBLE,
        title: "Le Mur invisible",
        author: Some("Marlen Haushofer"),
        description: "Isolement, nature et condition humaine",
        citation: Some("« Je vois que ce n'est pas la fin. Tout continue. »"),
        kind: SectionKind::Book,
    },
    Section {
        key: METHODOLOGIE,
        title: "Méthodologie",
        author: None,
        description: "Méthodes d'analyse et techniques de dissertation",
        citation: None,
        kind: SectionKind::Methodology,
    },
    Section {
        key: THEMES,
        title: "Thèmes transversaux",
        author: None,
        description: "Les grands axes reliant les œuvres au programme",
        citation: None,
        kind: SectionKind::Themes,
    },
];

pub fn section(key: &str) -> Option<&'static Section> {
    SECTIONS.iter().find(|s| s.key == key)
}

pub fn books() -> impl Iterator<Item = &'static Section> {
    SECTIONS.iter().filter(|s| s.kind == SectionKind::Book)
}

/// Lowercase, strip accents, collapse whitespace.
pub fn normalize(s: &str) -> String {
    let folded: String = s
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

// Numbered fiches first, by number; then by id
fn compare_fiches(a: &Fiche, b: &Fiche) -> Ordering {
    match (a.fiche_numero, b.fiche_numero) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.id.cmp(&b.id),
    }
}

#[derive(Debug, Deserialize)]
struct ContentDocument {
    fiches: Vec<Fiche>,
}

#[derive(Debug, Clone)]
pub struct ContentStore {
    fiches: Vec<Fiche>,
}

impl ContentStore {
    pub fn from_json(json: &str) -> Result<Self> {
        let doc: ContentDocument = serde_json::from_str(json)?;
        Self::new(doc.fiches)
    }

    pub fn new(fiches: Vec<Fiche>) -> Result<Self> {
        let mut ids = HashSet::new();
        for fiche in &fiches {
            if !ids.insert(fiche.id.as_str()) {
                return Err(StudyError::Content(format!(
                    "duplicate fiche id '{}'",
                    fiche.id
                )));
            }
        }
        Ok(Self { fiches })
    }

    pub fn bundled() -> Result<Self> {
        Self::from_json(BUNDLED_CONTENT)
    }

    /// Load from `path` when given, otherwise fall back to the bundled document.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => {
                log::debug!("Loading content from {}", p.display());
                let json = std::fs::read_to_string(p)?;
                Self::from_json(&json)
            }
            None => Self::bundled(),
        }
    }

    pub fn fiche(&self, id: &str) -> Option<&Fiche> {
        self.fiches.iter().find(|f| f.id == id)
    }

    /// Ordered fiches belonging to a section; empty for unknown keys.
    pub fn fiches_for(&self, key: &str) -> Vec<&Fiche> {
        let Some(section) = section(key) else {
            return Vec::new();
        };

        let mut fiches: Vec<&Fiche> = match section.kind {
            SectionKind::Methodology => self
                .fiches
                .iter()
                .filter(|f| f.fiche_type == FicheType::Methodology)
                .collect(),
            SectionKind::Themes => self
                .fiches
                .iter()
                .filter(|f| f.fiche_type == FicheType::Theme)
                .collect(),
            SectionKind::Book => {
                let title = normalize(section.title);
                self.fiches
                    .iter()
                    .filter(|f| {
                        matches!(f.fiche_type, FicheType::Book | FicheType::Citations)
                            && normalize(&f.group) == title
                    })
                    .collect()
            }
        };

        fiches.sort_by(|a, b| compare_fiches(a, b));
        fiches
    }

    pub fn count(&self, key: &str) -> usize {
        self.fiches_for(key).len()
    }

    pub fn contains(&self, key: &str, fiche_id: &str) -> bool {
        self.fiches_for(key).iter().any(|f| f.id == fiche_id)
    }

    pub fn section_of(&self, fiche_id: &str) -> Option<&'static Section> {
        SECTIONS.iter().find(|s| self.contains(s.key, fiche_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fiche(id: &str, group: &str, fiche_type: FicheType, numero: Option<u32>) -> Fiche {
        Fiche {
            id: id.to_string(),
            group: group.to_string(),
            title: id.to_string(),
            summary: String::new(),
            concepts: vec![],
            content: String::new(),
            detailed_sections: None,
            questions: None,
            fiche_type,
            fiche_numero: numero,
        }
    }

    mod normalize_tests {
        use super::*;

        #[test]
        fn strips_accents_and_case() {
            assert_eq!(normalize("Méthodologie"), "methodologie");
            assert_eq!(normalize("Thèmes TRANSVERSAUX"), "themes transversaux");
        }

        #[test]
        fn collapses_whitespace() {
            assert_eq!(
                normalize("  La connaissance   de la\tvie "),
                "la connaissance de la vie"
            );
        }
    }

    mod ordering_tests {
        use super::*;

        #[test]
        fn numbered_before_unnumbered_then_by_id() {
            let store = ContentStore::new(vec![
                fiche("m-b", "x", FicheType::Methodology, None),
                fiche("m-3", "x", FicheType::Methodology, Some(3)),
                fiche("m-a", "x", FicheType::Methodology, None),
                fiche("m-1", "x", FicheType::Methodology, Some(1)),
            ])
            .unwrap();

            let ids: Vec<&str> = store
                .fiches_for(METHODOLOGIE)
                .iter()
                .map(|f| f.id.as_str())
                .collect();
            assert_eq!(ids, ["m-1", "m-3", "m-a", "m-b"]);
        }
    }

    mod membership_tests {
        use super::*;

        #[test]
        fn book_section_matches_normalized_group() {
            let store = ContentStore::new(vec![
                fiche("a", "Le Mur invisible", FicheType::Book, None),
                fiche("b", "le mur  INVISIBLE", FicheType::Citations, None),
                fiche("c", "Le Mur invisible", FicheType::Theme, None),
                fiche("d", "Vingt mille lieues sous les mers", FicheType::Book, None),
            ])
            .unwrap();

            assert_eq!(store.count(MUR_INVISIBLE), 2);
            assert!(store.contains(MUR_INVISIBLE, "b"));
            assert!(!store.contains(MUR_INVISIBLE, "c"));
            assert_eq!(store.count(THEMES), 1);
        }

        #[test]
        fn unknown_section_is_empty() {
            let store = ContentStore::bundled().unwrap();
            assert!(store.fiches_for("nope").is_empty());
            assert_eq!(store.count("nope"), 0);
        }

        #[test]
        fn section_of_finds_owner() {
            let store = ContentStore::bundled().unwrap();
            assert_eq!(
                store.section_of("canguilhem-1").map(|s| s.key),
                Some(CONNAISSANCE_VIE)
            );
            assert_eq!(store.section_of("theme-2").map(|s| s.key), Some(THEMES));
            assert!(store.section_of("missing").is_none());
        }
    }

    mod loading_tests {
        use super::*;

        #[test]
        fn bundled_content_covers_every_section() {
            let store = ContentStore::bundled().unwrap();
            for s in SECTIONS {
                assert!(store.count(s.key) > 0, "section {} is empty", s.key);
            }
            assert_eq!(store.count(CONNAISSANCE_VIE), 3);
        }

        #[test]
        fn duplicate_ids_are_rejected() {
            let result = ContentStore::new(vec![
                fiche("dup", "x", FicheType::Theme, None),
                fiche("dup", "y", FicheType::Theme, None),
            ]);
            assert!(matches!(result, Err(StudyError::Content(_))));
        }

        #[test]
        fn missing_fiches_key_is_an_error() {
            assert!(ContentStore::from_json(r#"{"cards": []}"#).is_err());
        }

        #[test]
        fn load_reads_file() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("fiches.json");
            std::fs::write(
                &path,
                r#"{"fiches": [{"id": "t", "group": "g", "title": "T", "type": "theme"}]}"#,
            )
            .unwrap();

            let store = ContentStore::load(Some(&path)).unwrap();
            assert_eq!(store.count(THEMES), 1);
            assert_eq!(store.fiche("t").map(|f| f.title.as_str()), Some("T"));
        }
    }

    mod catalog_tests {
        use super::*;

        #[test]
        fn three_books() {
            assert_eq!(books().count(), 3);
        }

        #[test]
        fn section_lookup() {
            assert_eq!(section(METHODOLOGIE).unwrap().kind, SectionKind::Methodology);
            assert!(section("dashboard").is_none());
        }
    }
}
