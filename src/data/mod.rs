mod loader;

pub use loader::{load_quiz_definitions, LoadError};
