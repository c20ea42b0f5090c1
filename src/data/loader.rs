use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::models::QuizDefinition;

/// Error raised while reading a quiz definitions file.
#[derive(Debug)]
pub enum LoadError {
    Io { path: PathBuf, source: io::Error },
    Parse { path: PathBuf, source: serde_json::Error },
    Empty { path: PathBuf },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Io { path, source } => {
                write!(f, "failed to read {}: {}", path.display(), source)
            }
            LoadError::Parse { path, source } => {
                write!(f, "failed to parse {}: {}", path.display(), source)
            }
            LoadError::Empty { path } => {
                write!(f, "{} must contain at least one quiz", path.display())
            }
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Io { source, .. } => Some(source),
            LoadError::Parse { source, .. } => Some(source),
            LoadError::Empty { .. } => None,
        }
    }
}

/// Load quiz definitions from a JSON array on disk.
pub fn load_quiz_definitions<P: AsRef<Path>>(path: P) -> Result<Vec<QuizDefinition>, LoadError> {
    let path = path.as_ref();

    let json_content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let definitions: Vec<QuizDefinition> =
        serde_json::from_str(&json_content).map_err(|source| LoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    if definitions.is_empty() {
        return Err(LoadError::Empty {
            path: path.to_path_buf(),
        });
    }

    log::debug!("loaded {} quiz definitions from {}", definitions.len(), path.display());
    Ok(definitions)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_temp(name: &str, contents: &str) -> PathBuf {
        let file_name = format!("near-quiz-{}-{}", uuid::Uuid::new_v4(), name);
        let path = std::env::temp_dir().join(file_name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_load_definitions() {
        let path = write_temp(
            "quizzes.json",
            r#"[
                {
                    "hash": "1",
                    "question": "What is the capital of France",
                    "answers": ["Kyiv", "Madrid", "Paris", "Berlin"],
                    "correct_index": 2,
                    "max_prize_amount": "1000"
                },
                {
                    "hash": "2",
                    "question": "2 + 2",
                    "answers": ["4", "5"],
                    "correct_index": 0,
                    "max_prize_amount": "10",
                    "publish": false
                }
            ]"#,
        );

        let definitions = load_quiz_definitions(&path).unwrap();
        assert_eq!(definitions.len(), 2);
        assert!(definitions[0].publish);
        assert!(!definitions[1].publish);
        assert_eq!(definitions[0].answers[2], "Paris");

        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_load_empty_file() {
        let path = write_temp("empty.json", "[]");
        assert!(matches!(load_quiz_definitions(&path), Err(LoadError::Empty { .. })));
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_load_malformed_file() {
        let path = write_temp("bad.json", "{ not json");
        assert!(matches!(load_quiz_definitions(&path), Err(LoadError::Parse { .. })));
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_quiz_definitions("/nonexistent/near-quiz/quizzes.json").unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
        assert!(err.to_string().contains("failed to read"));
    }
}
