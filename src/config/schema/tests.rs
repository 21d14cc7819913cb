use super::*;

#[test]
fn test_default_config_validates() {
    let config = Config::default();
    assert!(config.validate().is_ok());
}

#[test]
fn test_defaults_match_grid_layout() {
    let config = Config::default();
    assert_eq!(config.services.identity, "http://id.psx");
    assert_eq!(config.services.forge, "http://forge.psx");
    assert_eq!(config.hub.backend_timeout_secs, 5);
    assert_eq!(config.hub.client_id, "psx-grid-mcp");
    assert_eq!(config.agents.memory_window_chars, 2000);
    assert_eq!(config.agents.result_record_chars, 1000);
    assert_eq!(config.agents.pacing_secs, 15);
    assert_eq!(config.providers.gemini.model, "gemini-2.5-flash-lite");
}

#[test]
fn test_invalid_zero_port() {
    let mut config = Config::default();
    config.hub.port = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_invalid_service_url() {
    let mut config = Config::default();
    config.services.bank = "not a url".into();
    let err = config.validate().unwrap_err().to_string();
    assert!(err.contains("services.bank"));
}

#[test]
fn test_non_http_service_rejected() {
    let mut config = Config::default();
    config.services.mail = "ftp://mail.psx".into();
    assert!(config.validate().is_err());
}

#[test]
fn test_invalid_temperature_too_high() {
    let mut config = Config::default();
    config.agents.temperature = 3.0;
    assert!(config.validate().is_err());
}

#[test]
fn test_zero_memory_window_rejected() {
    let mut config = Config::default();
    config.agents.memory_window_chars = 0;
    let err = config.validate().unwrap_err().to_string();
    assert!(err.contains("memoryWindowChars"));
}

#[test]
fn test_require_gemini_key() {
    let mut config = Config::default();
    assert!(matches!(
        config.require_gemini_key(),
        Err(GridError::Config(_))
    ));
    config.providers.gemini.api_key = "k".into();
    assert_eq!(config.require_gemini_key().unwrap(), "k");
}

#[test]
fn test_secrets_redacted_in_debug() {
    let mut config = Config::default();
    config.providers.gemini.api_key = "super-secret".into();
    config.provisioning.system_secret = "master".into();
    let dbg = format!("{config:?}");
    assert!(!dbg.contains("super-secret"));
    assert!(!dbg.contains("master"));
    assert!(dbg.contains("[REDACTED]"));
}

#[test]
fn test_camel_case_keys() {
    let json = serde_json::json!({
        "hub": {"backendTimeoutSecs": 2, "globalCredentialFallback": false},
        "agents": {"pacingSecs": 0, "dataDir": "/tmp/agents"}
    });
    let config: Config = serde_json::from_value(json).unwrap();
    assert_eq!(config.hub.backend_timeout_secs, 2);
    assert!(!config.hub.global_credential_fallback);
    assert_eq!(config.agents.pacing_secs, 0);
    assert_eq!(
        config.agents.data_path().unwrap(),
        std::path::PathBuf::from("/tmp/agents")
    );
}

#[test]
fn test_all_at_points_every_service() {
    let services = ServicesConfig::all_at("http://127.0.0.1:9999/");
    assert!(services.named().iter().all(|(_, u)| *u == "http://127.0.0.1:9999"));
}
