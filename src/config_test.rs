use std::sync::{Mutex, MutexGuard, PoisonError};

use super::*;

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn env_lock() -> MutexGuard<'static, ()> {
    ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}

/// # Safety
/// Callers must hold [`env_lock`] so env mutations do not race.
unsafe fn clear_client_env() {
    unsafe {
        std::env::remove_var("CLIENTDESK_BASE_URL");
        std::env::remove_var("CLIENTDESK_TIMEOUT_MS");
        std::env::remove_var("CLIENTDESK_CONNECT_TIMEOUT_MS");
        std::env::remove_var("CLIENTDESK_LOCALE");
        std::env::remove_var("CLIENTDESK_TIMEZONE");
        std::env::remove_var("TZ");
    }
}

#[test]
fn from_env_defaults() {
    let _env = env_lock();
    unsafe {
        clear_client_env();
        std::env::set_var("CLIENTDESK_BASE_URL", "http://localhost:8080/api/");
    }

    let cfg = ClientConfig::from_env().unwrap();
    assert_eq!(cfg.base_url, "http://localhost:8080/api");
    assert_eq!(cfg.timeouts, Timeouts::default());
    assert_eq!(cfg.timeouts.request, Duration::from_millis(5000));
    assert_eq!(cfg.locale, Locale::Ru);
    assert_eq!(cfg.timezone, "UTC");

    unsafe { clear_client_env() };
}

#[test]
fn from_env_parses_overrides() {
    let _env = env_lock();
    unsafe {
        clear_client_env();
        std::env::set_var("CLIENTDESK_BASE_URL", "https://crm.example.test");
        std::env::set_var("CLIENTDESK_TIMEOUT_MS", "1500");
        std::env::set_var("CLIENTDESK_CONNECT_TIMEOUT_MS", "250");
        std::env::set_var("CLIENTDESK_LOCALE", "en");
        std::env::set_var("CLIENTDESK_TIMEZONE", "Europe/Moscow");
    }

    let cfg = ClientConfig::from_env().unwrap();
    assert_eq!(cfg.base_url, "https://crm.example.test");
    assert_eq!(
        cfg.timeouts,
        Timeouts { request: Duration::from_millis(1500), connect: Duration::from_millis(250) }
    );
    assert_eq!(cfg.locale, Locale::En);
    assert_eq!(cfg.timezone, "Europe/Moscow");

    unsafe { clear_client_env() };
}

#[test]
fn from_env_timezone_falls_back_to_tz() {
    let _env = env_lock();
    unsafe {
        clear_client_env();
        std::env::set_var("CLIENTDESK_BASE_URL", "http://localhost");
        std::env::set_var("TZ", "Asia/Tokyo");
    }

    let cfg = ClientConfig::from_env().unwrap();
    assert_eq!(cfg.timezone, "Asia/Tokyo");

    unsafe { clear_client_env() };
}

#[test]
fn from_env_bad_timeout_uses_default() {
    let _env = env_lock();
    unsafe {
        clear_client_env();
        std::env::set_var("CLIENTDESK_BASE_URL", "http://localhost");
        std::env::set_var("CLIENTDESK_TIMEOUT_MS", "soon");
    }

    let cfg = ClientConfig::from_env().unwrap();
    assert_eq!(cfg.timeouts.request, Duration::from_millis(DEFAULT_TIMEOUT_MS));

    unsafe { clear_client_env() };
}

#[test]
fn from_env_missing_base_url_errors() {
    let _env = env_lock();
    unsafe { clear_client_env() };

    let err = ClientConfig::from_env().unwrap_err();
    assert!(matches!(err, ConfigError::Missing { var: "CLIENTDESK_BASE_URL" }));
}

#[test]
fn from_env_unknown_locale_errors() {
    let _env = env_lock();
    unsafe {
        clear_client_env();
        std::env::set_var("CLIENTDESK_BASE_URL", "http://localhost");
        std::env::set_var("CLIENTDESK_LOCALE", "de");
    }

    let err = ClientConfig::from_env().unwrap_err().to_string();
    assert!(err.contains("unknown CLIENTDESK_LOCALE"));

    unsafe { clear_client_env() };
}

#[test]
fn new_trims_trailing_slash() {
    let cfg = ClientConfig::new("http://localhost:3000/");
    assert_eq!(cfg.base_url, "http://localhost:3000");
    assert_eq!(cfg.timezone, DEFAULT_TIMEZONE);
}
