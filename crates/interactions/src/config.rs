use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PageError, ValidationError};

/// CSS selectors describing the page markup the controller binds to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Selectors {
    /// In-page anchors intercepted for smooth scrolling.
    pub fragment_links: String,
    pub navbar: String,
    /// Links considered for active highlighting.
    pub nav_links: String,
    /// Sections tracked for active highlighting.
    pub sections: String,
    pub contact_form: String,
    /// Looked up inside the contact form.
    pub submit_button: String,
    pub tilt_cards: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            fragment_links: r##"a[href^="#"]"##.to_string(),
            navbar: ".navbar".to_string(),
            nav_links: ".navbar-nav .nav-link".to_string(),
            sections: "section[id]".to_string(),
            contact_form: ".contact-form".to_string(),
            submit_button: r#"button[type="submit"]"#.to_string(),
            tilt_cards: ".tilt-card".to_string(),
        }
    }
}

/// Tunables for every page behavior. Lengths are CSS pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    pub selectors: Selectors,

    // ── Smooth scroll ────────────────────────────────────────
    /// Subtracted from the target's offset so the fixed header does not cover it.
    pub header_offset_px: f64,

    // ── Navbar ───────────────────────────────────────────────
    /// The navbar switches to the scrolled background strictly above this offset.
    pub navbar_threshold_px: f64,
    pub navbar_background_top: String,
    pub navbar_background_scrolled: String,
    /// Delay for re-evaluating the navbar after the last resize event.
    pub resize_debounce_ms: u32,

    // ── Active link ──────────────────────────────────────────
    /// Added to the scroll offset before testing section extents.
    pub active_lookahead_px: f64,
    pub active_class: String,

    // ── Tilt ─────────────────────────────────────────────────
    /// Rotation at the card edges, in degrees.
    pub max_tilt_deg: f64,
    /// Forward translation while tilting.
    pub tilt_depth_px: f64,
    pub tilting_class: String,

    // ── Contact form ─────────────────────────────────────────
    /// Replaces the submit button contents once a submission goes through.
    pub submit_pending_html: String,
    pub missing_fields_message: String,
    pub invalid_email_message: String,

    /// `trace`, `debug`, `info`, `warn` or `error`.
    pub log_level: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            selectors: Selectors::default(),
            header_offset_px: 70.0,
            navbar_threshold_px: 50.0,
            navbar_background_top: "rgba(33, 37, 41, 0.95)".to_string(),
            navbar_background_scrolled: "rgba(33, 37, 41, 0.98)".to_string(),
            resize_debounce_ms: 250,
            active_lookahead_px: 100.0,
            active_class: "active".to_string(),
            max_tilt_deg: 12.0,
            tilt_depth_px: 8.0,
            tilting_class: "is-tilting".to_string(),
            submit_pending_html: r#"<i class="fas fa-spinner fa-spin me-2"></i>Sending..."#
                .to_string(),
            missing_fields_message: "Please fill in all fields.".to_string(),
            invalid_email_message: "Please enter a valid email address.".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl PageConfig {
    /// Parses a (possibly partial) JSON override; absent keys keep their defaults.
    pub fn from_json(text: &str) -> Result<Self, PageError> {
        let config: PageConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, PageError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), PageError> {
        let lengths = [
            ("header_offset_px", self.header_offset_px),
            ("navbar_threshold_px", self.navbar_threshold_px),
            ("active_lookahead_px", self.active_lookahead_px),
            ("max_tilt_deg", self.max_tilt_deg),
            ("tilt_depth_px", self.tilt_depth_px),
        ];
        for (name, value) in lengths {
            if !value.is_finite() {
                return Err(PageError::Config(format!("{name} must be finite")));
            }
        }

        let s = &self.selectors;
        let selectors = [
            ("selectors.fragment_links", &s.fragment_links),
            ("selectors.navbar", &s.navbar),
            ("selectors.nav_links", &s.nav_links),
            ("selectors.sections", &s.sections),
            ("selectors.contact_form", &s.contact_form),
            ("selectors.submit_button", &s.submit_button),
            ("selectors.tilt_cards", &s.tilt_cards),
        ];
        for (name, value) in selectors {
            if value.trim().is_empty() {
                return Err(PageError::Config(format!("{name} must not be empty")));
            }
        }

        for (name, class) in [
            ("active_class", &self.active_class),
            ("tilting_class", &self.tilting_class),
        ] {
            if class.is_empty() || class.contains(char::is_whitespace) {
                return Err(PageError::Config(format!(
                    "{name} must be a single class name"
                )));
            }
        }

        self.log_level()?;
        Ok(())
    }

    pub fn log_level(&self) -> Result<tracing::Level, PageError> {
        tracing::Level::from_str(self.log_level.trim())
            .map_err(|_| PageError::Config(format!("unknown log_level `{}`", self.log_level)))
    }

    /// Text of the blocking alert shown for a rejected submission.
    pub fn alert_message(&self, err: ValidationError) -> &str {
        match err {
            ValidationError::MissingField(_) => &self.missing_fields_message,
            ValidationError::InvalidEmail => &self.invalid_email_message,
        }
    }
}
