#![forbid(unsafe_code)]

//! Gallery configuration: DOM hooks, timing, and fallback text.
//!
//! Every section defaults independently, so a host may pass a partial JSON
//! object such as `{"timing":{"load_timeout_ms":3000}}`.

use core::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// Guard interval after which a stalled image is treated as failed.
pub const DEFAULT_LOAD_TIMEOUT_MS: u64 = 6000;
/// Delay before focus moves to the close control after opening.
pub const DEFAULT_FOCUS_DELAY_MS: u64 = 10;
/// Delay between focus restoration and the visual hide on close.
pub const DEFAULT_HIDE_DELAY_MS: u64 = 16;

/// Ids and selectors the web host uses to find page elements.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DomSelectors {
    pub card: String,
    pub modal_id: String,
    pub image_id: String,
    /// Used when no element carries `image_id`.
    pub image_fallback: String,
    pub title_id: String,
    pub desc_id: String,
    pub close: String,
    pub prev: String,
    pub next: String,
    pub nav: String,
    /// Links whose clicks get smooth-scroll handling.
    pub scroll_links: String,
    pub year_id: String,
}

impl Default for DomSelectors {
    fn default() -> Self {
        Self {
            card: ".project-card".to_owned(),
            modal_id: "modal".to_owned(),
            image_id: "modalImage".to_owned(),
            image_fallback: ".modal-media img".to_owned(),
            title_id: "modalTitle".to_owned(),
            desc_id: "modalDesc".to_owned(),
            close: ".modal-close".to_owned(),
            prev: ".modal-prev".to_owned(),
            next: ".modal-next".to_owned(),
            nav: ".nav".to_owned(),
            scroll_links: ".nav a, .btn".to_owned(),
            year_id: "year".to_owned(),
        }
    }
}

/// Deferred-step timing, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ModalTiming {
    pub load_timeout_ms: u64,
    pub focus_delay_ms: u64,
    pub hide_delay_ms: u64,
}

impl Default for ModalTiming {
    fn default() -> Self {
        Self {
            load_timeout_ms: DEFAULT_LOAD_TIMEOUT_MS,
            focus_delay_ms: DEFAULT_FOCUS_DELAY_MS,
            hide_delay_ms: DEFAULT_HIDE_DELAY_MS,
        }
    }
}

impl ModalTiming {
    #[must_use]
    pub const fn load_timeout(&self) -> Duration {
        Duration::from_millis(self.load_timeout_ms)
    }

    #[must_use]
    pub const fn focus_delay(&self) -> Duration {
        Duration::from_millis(self.focus_delay_ms)
    }

    #[must_use]
    pub const fn hide_delay(&self) -> Duration {
        Duration::from_millis(self.hide_delay_ms)
    }
}

/// Fallback strings for captions and accessible labels.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GalleryText {
    /// Title used when a card has neither `data-title` nor `.meta` text.
    pub default_title: String,
    /// Description used when a card has no `data-desc`.
    pub default_desc: String,
    /// Image `alt` used when the current item has an empty title.
    pub default_alt: String,
    /// Image `alt` set after a load failure or timeout.
    pub error_alt: String,
}

impl Default for GalleryText {
    fn default() -> Self {
        Self {
            default_title: "Project".to_owned(),
            default_desc: "A closer look at this design work: simple, elegant, and creative."
                .to_owned(),
            default_alt: "Project Preview".to_owned(),
            error_alt: "Failed to load image".to_owned(),
        }
    }
}

/// Complete gallery configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    pub selectors: DomSelectors,
    pub timing: ModalTiming,
    pub text: GalleryText,
    /// `tracing` level name: `trace`, `debug`, `info`, `warn` or `error`.
    pub log_level: String,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            selectors: DomSelectors::default(),
            timing: ModalTiming::default(),
            text: GalleryText::default(),
            log_level: "info".to_owned(),
        }
    }
}

impl GalleryConfig {
    /// Parse and validate a JSON configuration object.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the invariants the host relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timing.load_timeout_ms == 0 {
            return Err(ConfigError::ZeroLoadTimeout);
        }
        let required = [
            ("card", &self.selectors.card),
            ("modal_id", &self.selectors.modal_id),
            ("image_fallback", &self.selectors.image_fallback),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::EmptySelector(name));
            }
        }
        self.level()?;
        Ok(())
    }

    /// The configured log level.
    pub fn level(&self) -> Result<tracing::Level, ConfigError> {
        self.log_level
            .trim()
            .parse::<tracing::Level>()
            .map_err(|_| ConfigError::UnknownLogLevel(self.log_level.clone()))
    }

    /// Caption defaults handed to the gallery builder.
    #[must_use]
    pub fn card_defaults(&self) -> crate::builder::CardDefaults {
        crate::builder::CardDefaults {
            title: self.text.default_title.clone(),
            desc: self.text.default_desc.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, DEFAULT_LOAD_TIMEOUT_MS, GalleryConfig};
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_object_yields_defaults() {
        let config = GalleryConfig::from_json("{}").expect("defaults are valid");
        assert_eq!(config, GalleryConfig::default());
        assert_eq!(config.timing.load_timeout_ms, DEFAULT_LOAD_TIMEOUT_MS);
        assert_eq!(config.selectors.card, ".project-card");
    }

    #[test]
    fn partial_sections_merge_with_defaults() {
        let config = GalleryConfig::from_json(
            r#"{"timing":{"load_timeout_ms":2500},"text":{"default_title":"Work"}}"#,
        )
        .expect("partial config");
        assert_eq!(config.timing.load_timeout_ms, 2500);
        assert_eq!(config.timing.hide_delay_ms, 16);
        assert_eq!(config.text.default_title, "Work");
        assert_eq!(config.text.error_alt, "Failed to load image");
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = GalleryConfig::from_json(r#"{"timing":{"load_timeout_ms":0}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::ZeroLoadTimeout));
    }

    #[test]
    fn blank_card_selector_is_rejected() {
        let err = GalleryConfig::from_json(r#"{"selectors":{"card":"  "}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::EmptySelector("card")));
    }

    #[test]
    fn malformed_json_is_reported() {
        let err = GalleryConfig::from_json("{timing:").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
        assert!(err.to_string().starts_with("invalid gallery config JSON"));
    }

    #[test]
    fn log_level_must_parse() {
        let err = GalleryConfig::from_json(r#"{"log_level":"chatty"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownLogLevel(level) if level == "chatty"));
        let config = GalleryConfig::from_json(r#"{"log_level":"debug"}"#).expect("debug");
        assert_eq!(config.level().expect("level"), tracing::Level::DEBUG);
    }
}
