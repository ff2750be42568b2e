//! On-disk content store for lessons and explanations.
//!
//! One UTF-8 text file per topic, exact `{topic}.txt` filename match.
//! File existence is the only validity check; a missing file is a
//! normal branch, not an error.

use std::path::{Path, PathBuf};
use tracing::warn;

pub struct ContentStore {
    lessons_dir: PathBuf,
    explanations_dir: PathBuf,
}

impl ContentStore {
    pub fn new(lessons_dir: PathBuf, explanations_dir: PathBuf) -> Self {
        Self {
            lessons_dir,
            explanations_dir,
        }
    }

    pub fn lesson(&self, topic: &str) -> Option<String> {
        read_topic(&self.lessons_dir, topic)
    }

    pub fn explanation(&self, topic: &str) -> Option<String> {
        read_topic(&self.explanations_dir, topic)
    }

    /// Lesson topics available on disk, sorted.
    pub fn list_topics(&self) -> Vec<String> {
        let entries = match std::fs::read_dir(&self.lessons_dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Failed to read lessons dir {:?}: {e}", self.lessons_dir);
                return Vec::new();
            }
        };

        let mut topics: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "txt"))
            .filter_map(|path| {
                path.file_stem()
                    .and_then(|stem| stem.to_str())
                    .map(str::to_string)
            })
            .collect();
        topics.sort();
        topics
    }
}

fn read_topic(dir: &Path, topic: &str) -> Option<String> {
    if !is_valid_topic(topic) {
        return None;
    }
    std::fs::read_to_string(dir.join(format!("{topic}.txt"))).ok()
}

/// Topic names come from users; keep them from escaping the content
/// directory.
fn is_valid_topic(topic: &str) -> bool {
    !topic.is_empty()
        && topic
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn store_with(files: &[(&str, &str)]) -> (TempDir, TempDir, ContentStore) {
        let lessons = TempDir::new().unwrap();
        let explanations = TempDir::new().unwrap();
        for (name, content) in files {
            let mut f = std::fs::File::create(lessons.path().join(name)).unwrap();
            f.write_all(content.as_bytes()).unwrap();
            let mut f = std::fs::File::create(explanations.path().join(name)).unwrap();
            f.write_all(content.as_bytes()).unwrap();
        }
        let store = ContentStore::new(
            lessons.path().to_path_buf(),
            explanations.path().to_path_buf(),
        );
        (lessons, explanations, store)
    }

    #[test]
    fn test_lesson_found() {
        let (_l, _e, store) = store_with(&[("gender.txt", "o menino — the boy")]);
        assert_eq!(store.lesson("gender").unwrap(), "o menino — the boy");
    }

    #[test]
    fn test_missing_topic_is_none() {
        let (_l, _e, store) = store_with(&[("gender.txt", "x")]);
        assert!(store.lesson("nonexistent").is_none());
        assert!(store.explanation("nonexistent").is_none());
    }

    #[test]
    fn test_topic_match_is_case_sensitive() {
        let (_l, _e, store) = store_with(&[("gender.txt", "x")]);
        assert!(store.lesson("Gender").is_none());
    }

    #[test]
    fn test_path_escape_rejected() {
        let (_l, _e, store) = store_with(&[("gender.txt", "x")]);
        assert!(store.lesson("../gender").is_none());
        assert!(store.lesson("a/b").is_none());
        assert!(store.lesson("").is_none());
    }

    #[test]
    fn test_list_topics_sorted_stems() {
        let (_l, _e, store) = store_with(&[
            ("plurals.txt", "x"),
            ("gender.txt", "x"),
            ("notes.md", "ignored"),
        ]);
        assert_eq!(store.list_topics(), vec!["gender", "plurals"]);
    }

    #[test]
    fn test_list_topics_missing_dir() {
        let store = ContentStore::new(PathBuf::from("/nonexistent"), PathBuf::from("/nonexistent"));
        assert!(store.list_topics().is_empty());
    }
}
