//! UI locale and timezone shared by every outgoing request.
//!
//! DESIGN
//! ======
//! `LocaleState` is a cheap cloneable handle. The UI layer switches the
//! locale at runtime; request middleware reads it on each send, so a switch
//! takes effect from the next request without rebuilding the clients.

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, PoisonError, RwLock};

/// Locales the UI ships catalogs for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Locale {
    #[default]
    Ru,
    En,
}

impl Locale {
    /// Locale used when a message is missing from the current catalog.
    pub const FALLBACK: Self = Self::En;

    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::Ru => "ru",
            Self::En => "en",
        }
    }

    /// Plural form index for `choice` under this locale's rules.
    #[must_use]
    pub fn plural_index(self, choice: u64, choices_len: usize) -> usize {
        match self {
            Self::Ru => plural_index(choice, choices_len),
            Self::En => usize::from(choice != 1).min(choices_len.saturating_sub(1)),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unsupported locale: {0}")]
pub struct UnknownLocale(pub String);

impl FromStr for Locale {
    type Err = UnknownLocale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Accept region-tagged codes like "ru-RU" or "en_US".
        let lang = s
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match lang.as_str() {
            "ru" => Ok(Self::Ru),
            "en" => Ok(Self::En),
            _ => Err(UnknownLocale(s.to_owned())),
        }
    }
}

/// Russian plural-form selection over a `zero | one | few | many` catalog.
///
/// Catalogs with fewer than three forms collapse `many` onto index 2.
#[must_use]
pub fn plural_index(choice: u64, choices_len: usize) -> usize {
    if choice == 0 {
        return 0;
    }

    let teen = choice > 10 && choice < 20;
    let last_digit = choice % 10;
    if !teen && last_digit == 1 {
        return 1;
    }
    if !teen && (2..=4).contains(&last_digit) {
        return 2;
    }

    if choices_len < 3 { 2 } else { 3 }
}

#[derive(Debug)]
struct LocaleInner {
    locale: Locale,
    timezone: String,
}

/// Shared current locale and IANA timezone.
#[derive(Debug, Clone)]
pub struct LocaleState {
    inner: Arc<RwLock<LocaleInner>>,
}

impl LocaleState {
    #[must_use]
    pub fn new(locale: Locale, timezone: impl Into<String>) -> Self {
        Self { inner: Arc::new(RwLock::new(LocaleInner { locale, timezone: timezone.into() })) }
    }

    #[must_use]
    pub fn current(&self) -> Locale {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .locale
    }

    pub fn set_current(&self, locale: Locale) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .locale = locale;
        tracing::debug!(locale = locale.code(), "locale switched");
    }

    #[must_use]
    pub fn timezone(&self) -> String {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .timezone
            .clone()
    }

    pub fn set_timezone(&self, timezone: impl Into<String>) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .timezone = timezone.into();
    }
}

impl Default for LocaleState {
    fn default() -> Self {
        Self::new(Locale::default(), crate::config::DEFAULT_TIMEZONE)
    }
}

#[cfg(test)]
#[path = "locale_test.rs"]
mod tests;
