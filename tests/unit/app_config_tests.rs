/*!
 * Tests for application configuration functionality
 */

use std::time::Duration;

use ai_translator::app_config::{Config, LogLevel, TranslationProvider};

use crate::common::create_temp_dir;

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.target_language, "zh");
    assert_eq!(config.file_format, "markdown");
    assert_eq!(config.pages, None);
    assert_eq!(config.translation.provider, TranslationProvider::OpenAI);
    assert_eq!(config.log_level, LogLevel::Info);

    let common = &config.translation.common;
    assert_eq!(common.max_attempts, 3);
    assert_eq!(common.rate_limit_delay(), Duration::from_secs(60));
    assert_eq!(common.concurrent_requests, None);

    let chatglm = config
        .translation
        .get_provider_config(&TranslationProvider::ChatGlm)
        .expect("ChatGLM provider config should exist");
    assert_eq!(chatglm.endpoint, "http://localhost:8000");
    assert_eq!(chatglm.model, "chatglm2-6b");
}

/// A config file that sets only a few keys keeps the defaults for the rest
#[test]
fn test_load_withPartialFile_shouldFillDefaults() {
    let dir = create_temp_dir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(
        &path,
        r#"{"target_language": "ja", "translation": {"provider": "chatglm"}}"#,
    )
    .unwrap();

    let config = Config::load_or_create(&path).unwrap();

    assert_eq!(config.target_language, "ja");
    assert_eq!(config.book, "tests/test.pdf");
    assert_eq!(config.translation.provider, TranslationProvider::ChatGlm);
    assert_eq!(config.translation.get_endpoint(), "http://localhost:8000");
    assert_eq!(config.translation.get_timeout(), Duration::from_secs(300));
}

#[test]
fn test_loadOrCreate_withMissingFile_shouldWriteDefaults() {
    let dir = create_temp_dir().unwrap();
    let path = dir.path().join("nested").join("config.json");

    let config = Config::load_or_create(&path).unwrap();

    assert!(path.exists());
    let reloaded = Config::load_or_create(&path).unwrap();
    assert_eq!(reloaded.target_language, config.target_language);
    assert_eq!(reloaded.translation.available_providers.len(), 2);
}

/// Test configuration validation
#[test]
fn test_config_validation_withVariousConfigs_shouldValidateCorrectly() {
    let mut config = Config::default();
    config.translation.provider = TranslationProvider::ChatGlm;
    assert!(config.validate().is_ok());

    config.target_language = " ".to_string();
    assert!(config.validate().is_err());
    config.target_language = "fr".to_string();

    config.file_format = "docx".to_string();
    let error = config.validate().unwrap_err();
    assert!(error.to_string().contains("docx"), "unexpected error: {}", error);
    config.file_format = "pdf".to_string();

    config.pages = Some(0);
    assert!(config.validate().is_err());
    config.pages = Some(2);

    config.translation.common.concurrent_requests = Some(0);
    assert!(config.validate().is_err());
    config.translation.common.concurrent_requests = Some(2);

    config.translation.active_provider_config_mut().endpoint = "not a url".to_string();
    assert!(config.validate().is_err());
    config.translation.active_provider_config_mut().endpoint = "http://gpu-box:8000".to_string();

    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_withOpenAiKey_shouldPass() {
    let mut config = Config::default();
    config
        .translation
        .provider_config_mut(TranslationProvider::OpenAI)
        .api_key = "sk-test".to_string();

    assert!(config.validate().is_ok());
    assert_eq!(config.translation.get_api_key(), "sk-test");
}

#[test]
fn test_providerConfigMut_withMissingEntry_shouldCreateIt() {
    let mut config = Config::default();
    config.translation.available_providers.clear();

    config.translation.provider_config_mut(TranslationProvider::ChatGlm).model = "chatglm3-6b".to_string();
    config.translation.provider = TranslationProvider::ChatGlm;

    assert_eq!(config.translation.available_providers.len(), 1);
    assert_eq!(config.translation.get_model(), "chatglm3-6b");
}

#[test]
fn test_translationProvider_fromStr_shouldAcceptAliases() {
    assert_eq!("glm".parse::<TranslationProvider>().unwrap(), TranslationProvider::ChatGlm);
    assert_eq!("OpenAIModel".parse::<TranslationProvider>().unwrap(), TranslationProvider::OpenAI);
    assert!("gemini".parse::<TranslationProvider>().is_err());
    assert_eq!(TranslationProvider::ChatGlm.to_string(), "chatglm");
    assert_eq!(TranslationProvider::ChatGlm.display_name(), "ChatGLM");
}
