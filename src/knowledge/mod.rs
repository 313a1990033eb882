//! Knowledge-base corpus.
//!
//! The built-in corpus is static data compiled into the binary; deployments
//! can point `BYTEDENT_CORPUS_PATH` at a file to replace it. Loaded once at
//! startup to build the index and read-only afterwards.

use std::borrow::Cow;
use std::path::Path;

use tracing::info;

static KNOWLEDGE_BASE: &str = include_str!("../../data/knowledge_base.md");

/// Returns the built-in dental knowledge base.
pub fn builtin_corpus() -> &'static str {
    KNOWLEDGE_BASE
}

/// Loads the corpus, preferring an override file when given.
pub fn load(override_path: Option<&Path>) -> std::io::Result<Cow<'static, str>> {
    match override_path {
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            info!(path = %path.display(), bytes = text.len(), "Loaded corpus override");
            Ok(Cow::Owned(text))
        }
        None => Ok(Cow::Borrowed(KNOWLEDGE_BASE)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_corpus_is_nonempty() {
        let corpus = builtin_corpus();
        assert!(!corpus.trim().is_empty());
        assert!(corpus.contains("CBCT"));
        assert!(corpus.contains("ByteDent"));
    }

    #[test]
    fn test_load_without_override_returns_builtin() {
        let corpus = load(None).unwrap();
        assert_eq!(corpus.as_ref(), builtin_corpus());
    }

    #[test]
    fn test_load_missing_override_fails() {
        assert!(load(Some(Path::new("/no/such/corpus.md"))).is_err());
    }
}
