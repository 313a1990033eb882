use super::*;
use serial_test::serial;
use std::env;

fn with_env_vars<F, R>(vars: &[(&str, &str)], f: F) -> R
where
    F: FnOnce() -> R,
{
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, value) in vars {
        unsafe { env::set_var(key, value) };
    }

    let result = f();

    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, _) in vars {
        unsafe { env::remove_var(key) };
    }

    result
}

fn clear_bytedent_env() {
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    unsafe {
        env::remove_var("BYTEDENT_RETRIEVAL_TOP_K");
        env::remove_var("BYTEDENT_MIN_SIMILARITY_THRESHOLD");
        env::remove_var("BYTEDENT_HANDOFF_SIMILARITY_THRESHOLD");
        env::remove_var("BYTEDENT_CHUNK_SIZE_TOKENS");
        env::remove_var("BYTEDENT_CHUNK_OVERLAP_TOKENS");
        env::remove_var("BYTEDENT_CACHE_CAPACITY");
        env::remove_var("BYTEDENT_CACHE_TTL_SECS");
        env::remove_var("BYTEDENT_MAX_NEW_TOKENS");
        env::remove_var("BYTEDENT_TEMPERATURE");
        env::remove_var("BYTEDENT_TOP_P");
        env::remove_var("BYTEDENT_CHAT_MODEL");
        env::remove_var("BYTEDENT_EMBEDDER_DIR");
        env::remove_var("BYTEDENT_CHUNKER_TOKENIZER");
        env::remove_var("BYTEDENT_CORPUS_PATH");
    }
}

#[test]
fn test_default_settings() {
    let settings = Settings::default();

    assert_eq!(settings.retrieval_top_k, 5);
    assert_eq!(settings.min_similarity_threshold, 0.25);
    assert_eq!(settings.handoff_similarity_threshold, 0.30);
    assert_eq!(settings.chunk_size_tokens, 400);
    assert_eq!(settings.chunk_overlap_tokens, 80);
    assert_eq!(settings.cache_capacity, 100);
    assert_eq!(settings.cache_ttl_secs, 3600);
    assert!(settings.embedder_dir.is_none());
    assert!(settings.chunker_tokenizer_path.is_none());
}

#[test]
fn test_default_settings_validate() {
    Settings::default().validate().expect("defaults are valid");
}

#[test]
#[serial]
fn test_from_env_with_defaults() {
    clear_bytedent_env();
    let settings = Settings::from_env().expect("from_env with no overrides");
    assert_eq!(settings.retrieval_top_k, 5);
    assert_eq!(settings.chat_model, "gpt-4o-mini");
}

#[test]
#[serial]
fn test_from_env_overrides() {
    clear_bytedent_env();
    let settings = with_env_vars(
        &[
            ("BYTEDENT_RETRIEVAL_TOP_K", "3"),
            ("BYTEDENT_HANDOFF_SIMILARITY_THRESHOLD", "0.5"),
            ("BYTEDENT_CHAT_MODEL", "gpt-4o"),
        ],
        || Settings::from_env().expect("from_env with overrides"),
    );

    assert_eq!(settings.retrieval_top_k, 3);
    assert_eq!(settings.handoff_similarity_threshold, 0.5);
    assert_eq!(settings.chat_model, "gpt-4o");
}

#[test]
#[serial]
fn test_from_env_rejects_garbage() {
    clear_bytedent_env();
    let result = with_env_vars(&[("BYTEDENT_RETRIEVAL_TOP_K", "many")], Settings::from_env);
    assert!(matches!(result, Err(ConfigError::ParseError { .. })));
}

#[test]
fn test_validate_rejects_overlap_at_chunk_size() {
    let settings = Settings {
        chunk_size_tokens: 100,
        chunk_overlap_tokens: 100,
        ..Default::default()
    };
    assert!(matches!(
        settings.validate(),
        Err(ConfigError::InvalidChunking { .. })
    ));
}

#[test]
fn test_validate_rejects_out_of_range_threshold() {
    let settings = Settings {
        handoff_similarity_threshold: 1.5,
        ..Default::default()
    };
    assert!(matches!(
        settings.validate(),
        Err(ConfigError::InvalidThreshold { .. })
    ));
}

#[test]
fn test_validate_rejects_zero_top_k() {
    let settings = Settings {
        retrieval_top_k: 0,
        ..Default::default()
    };
    assert!(matches!(
        settings.validate(),
        Err(ConfigError::ZeroCount { .. })
    ));
}

#[test]
fn test_keyword_lists_nonempty() {
    let settings = Settings::default();
    assert!(settings.uncertainty_keywords().contains(&"i'm not sure"));
    assert!(settings.handoff_required_topics().contains(&"pricing"));
}
