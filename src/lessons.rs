use include_dir::{include_dir, Dir};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;
use tracing::error;

use crate::settings::{TextSelection, TextType};

static LESSON_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/lessons");

const LESSON_FILE: &str = "lessons.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Level {
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Lesson {
    pub id: String,
    pub title: String,
    pub description: String,
    pub text: String,
    pub level: Level,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

impl Lesson {
    pub fn matches(&self, text_type: TextType) -> bool {
        match text_type {
            TextType::All => true,
            other => self
                .kind
                .as_deref()
                .is_some_and(|k| k.eq_ignore_ascii_case(&other.to_string())),
        }
    }
}

/// The practice texts shipped with the binary.
#[derive(Debug, Clone, Default)]
pub struct LessonLibrary {
    lessons: Vec<Lesson>,
}

impl LessonLibrary {
    pub fn new(lessons: Vec<Lesson>) -> Self {
        Self { lessons }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json).map(Self::new)
    }

    /// Lessons embedded at compile time. An unreadable bundle yields an empty
    /// library.
    pub fn builtin() -> Self {
        let Some(json) = LESSON_DIR
            .get_file(LESSON_FILE)
            .and_then(|f| f.contents_utf8())
        else {
            error!("built-in lesson file missing");
            return Self::default();
        };

        Self::from_json(json).unwrap_or_else(|err| {
            error!(%err, "built-in lessons failed to parse");
            Self::default()
        })
    }

    pub fn lessons(&self) -> &[Lesson] {
        &self.lessons
    }

    pub fn is_empty(&self) -> bool {
        self.lessons.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&Lesson> {
        self.lessons.iter().find(|l| l.id == id)
    }

    pub fn first(&self, text_type: TextType) -> Option<&Lesson> {
        self.candidates(TextSelection::Sequential, text_type)
            .into_iter()
            .next()
    }

    /// Lessons of `text_type` in the order `selection` walks them. An empty
    /// filter result falls back to the whole library.
    fn candidates(&self, selection: TextSelection, text_type: TextType) -> Vec<&Lesson> {
        let mut found: Vec<&Lesson> = self.lessons.iter().filter(|l| l.matches(text_type)).collect();
        if found.is_empty() {
            found = self.lessons.iter().collect();
        }
        if selection == TextSelection::Difficulty {
            // stable, so lessons of one level keep file order
            found.sort_by_key(|l| l.level);
        }
        found
    }

    /// Pick the lesson to practice after `current`.
    pub fn next_with_rng<R: Rng + ?Sized>(
        &self,
        selection: TextSelection,
        text_type: TextType,
        current: Option<&str>,
        rng: &mut R,
    ) -> Option<&Lesson> {
        let candidates = self.candidates(selection, text_type);

        match selection {
            TextSelection::Random => {
                let others: Vec<&Lesson> = candidates
                    .iter()
                    .copied()
                    .filter(|l| Some(l.id.as_str()) != current)
                    .collect();
                let pool = if others.is_empty() { &candidates } else { &others };
                pool.choose(rng).copied()
            }
            TextSelection::Sequential | TextSelection::Difficulty => {
                let next_idx = current
                    .and_then(|id| candidates.iter().position(|l| l.id == id))
                    .map(|idx| idx + 1)
                    .unwrap_or(0);
                candidates
                    .get(next_idx % candidates.len().max(1))
                    .copied()
            }
        }
    }

    pub fn next(
        &self,
        selection: TextSelection,
        text_type: TextType,
        current: Option<&str>,
    ) -> Option<&Lesson> {
        self.next_with_rng(selection, text_type, current, &mut rand::thread_rng())
    }
}
