use std::collections::HashMap;
use std::env::VarError;
use std::path::Path;

use super::*;
use crate::StoreSchema;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

#[test]
fn build_app_config_defaults_with_empty_env() {
    let map: HashMap<&str, &str> = HashMap::new();
    let result = build_app_config(lookup_from_map(&map));
    assert!(result.is_ok(), "expected Ok, got: {result:?}");
    let cfg = result.unwrap();
    assert_eq!(cfg.page_size, 100);
    assert_eq!(cfg.page_limit, 5);
    assert!(!cfg.debug);
    assert_eq!(cfg.backend, Backend::Http);
    assert_eq!(cfg.pagination, PaginationStyle::PageIndex);
    assert_eq!(cfg.base_url, "https://www.bigbadtoystore.com");
    assert_eq!(cfg.output_path, Path::new("outputs.csv"));
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.request_timeout_secs, 30);
    assert_eq!(cfg.ready_timeout_secs, 60);
    assert_eq!(cfg.user_agent, DEFAULT_USER_AGENT);
    assert_eq!(cfg.webdriver_url, "http://localhost:4444");
    assert!(cfg.headless);
    assert_eq!(cfg.inter_request_delay_ms, 250);
}

#[test]
fn page_size_and_limit_override() {
    let mut map = HashMap::new();
    map.insert("PAGE_SIZE", "40");
    map.insert("PAGE_LIMIT", "3");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.page_size, 40);
    assert_eq!(cfg.page_limit, 3);
}

#[test]
fn page_size_zero_is_rejected() {
    let mut map = HashMap::new();
    map.insert("PAGE_SIZE", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "PAGE_SIZE"),
        "expected InvalidEnvVar(PAGE_SIZE), got: {result:?}"
    );
}

#[test]
fn page_limit_invalid() {
    let mut map = HashMap::new();
    map.insert("PAGE_LIMIT", "many");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "PAGE_LIMIT"),
        "expected InvalidEnvVar(PAGE_LIMIT), got: {result:?}"
    );
}

#[test]
fn debug_flag_accepts_one() {
    let mut map = HashMap::new();
    map.insert("DEBUG", "1");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.debug);
}

#[test]
fn debug_flag_rejects_garbage() {
    let mut map = HashMap::new();
    map.insert("DEBUG", "maybe");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "DEBUG"),
        "expected InvalidEnvVar(DEBUG), got: {result:?}"
    );
}

#[test]
fn browser_backend_selects_photo_schema() {
    let mut map = HashMap::new();
    map.insert("BBTS_BACKEND", "browser");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.backend, Backend::Browser);
    assert_eq!(cfg.backend.schema(), StoreSchema::WithPhoto);
}

#[test]
fn unknown_backend_is_rejected() {
    let mut map = HashMap::new();
    map.insert("BBTS_BACKEND", "curl");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "BBTS_BACKEND"),
        "expected InvalidEnvVar(BBTS_BACKEND), got: {result:?}"
    );
}

#[test]
fn offset_pagination_starts_at_zero() {
    let mut map = HashMap::new();
    map.insert("BBTS_PAGINATION", "offset");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.pagination, PaginationStyle::Offset);
    assert_eq!(cfg.pagination.first_index(), 0);
    assert_eq!(PaginationStyle::PageIndex.first_index(), 1);
}

#[test]
fn headless_can_be_disabled() {
    let mut map = HashMap::new();
    map.insert("BBTS_HEADLESS", "false");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(!cfg.headless);
}

#[test]
fn ready_timeout_invalid() {
    let mut map = HashMap::new();
    map.insert("BBTS_READY_TIMEOUT_SECS", "soon");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "BBTS_READY_TIMEOUT_SECS"),
        "expected InvalidEnvVar(BBTS_READY_TIMEOUT_SECS), got: {result:?}"
    );
}

#[test]
fn backend_round_trips_through_display() {
    for backend in [Backend::Http, Backend::Browser] {
        assert_eq!(backend.to_string().parse::<Backend>(), Ok(backend));
    }
}
