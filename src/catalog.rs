//! Localized validation messages with per-locale overrides
//!
//! A [`Catalog`] resolves a message key (`"required"`, `"min_length"`, ...)
//! to a human-readable template, substituting `{name}` placeholders from a
//! replacements list. Resolution order, most specific first:
//!
//! 1. custom overrides for the requested locale
//! 2. built-in table for the requested locale
//! 3. built-in English table
//! 4. caller-supplied fallback
//! 5. a generic `"Validation error."`
//!
//! There is no process-wide locale. Each catalog carries its own default
//! locale and is threaded through validation calls inside a
//! [`ValidationContext`](crate::context::ValidationContext), so concurrent
//! validations with different locales cannot interfere.
//!
//! # Examples
//!
//! ```
//! use formcheck::Catalog;
//!
//! let mut catalog = Catalog::new();
//! assert_eq!(
//!     catalog.message("required", &[], None, None),
//!     "This field is required."
//! );
//!
//! catalog.set_custom_translations("en", &[("required", "Don't leave me empty!")]);
//! assert_eq!(
//!     catalog.message("required", &[], None, None),
//!     "Don't leave me empty!"
//! );
//! ```

use std::collections::HashMap;

/// Message key/template pairs, keyed first by locale.
type Overrides = HashMap<String, HashMap<String, String>>;

/// A locale-aware message catalog with built-in tables and custom overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    default_locale: Option<String>,
    custom: Overrides,
}

impl Catalog {
    /// Create a catalog with the built-in tables and `en` as default locale.
    pub fn new() -> Self {
        Catalog::default()
    }

    /// The locale used when a message lookup does not name one.
    pub fn default_locale(&self) -> &str {
        self.default_locale.as_deref().unwrap_or("en")
    }

    /// Change the default locale.
    ///
    /// An unknown locale (no built-in table and no custom overrides) is
    /// rejected with a warning and the previous default is kept, mirroring
    /// the behaviour callers expect from a form library: a typo in a locale
    /// tag should degrade to English, not panic.
    pub fn set_locale(&mut self, locale: &str) {
        if self.known_locale(locale) {
            self.default_locale = Some(locale.to_string());
        } else {
            tracing::warn!(locale, "unknown locale, keeping current default");
        }
    }

    /// Merge custom templates for a locale, keyed by message key.
    ///
    /// Custom templates take precedence over the built-in tables and may
    /// introduce locales the built-in tables do not cover.
    pub fn set_custom_translations(&mut self, locale: &str, templates: &[(&str, &str)]) {
        let table = self.custom.entry(locale.to_string()).or_default();
        for (key, template) in templates {
            table.insert((*key).to_string(), (*template).to_string());
        }
    }

    /// Resolve a message key to a rendered message.
    ///
    /// `replacements` substitutes `{name}` placeholders in the template.
    /// `locale` defaults to the catalog's default locale; an unknown locale
    /// falls back to English. `fallback` is used when no table knows the key.
    ///
    /// # Examples
    ///
    /// ```
    /// use formcheck::Catalog;
    ///
    /// let catalog = Catalog::new();
    /// let message = catalog.message("step", &[("step", "3".to_string())], None, None);
    /// assert_eq!(message, "Must be a multiple of 3.");
    ///
    /// let message = catalog.message("min", &[("min", "2".to_string())], Some("es"), None);
    /// assert_eq!(message, "Debe ser al menos 2.");
    /// ```
    pub fn message(
        &self,
        key: &str,
        replacements: &[(&str, String)],
        locale: Option<&str>,
        fallback: Option<&str>,
    ) -> String {
        let requested = locale.unwrap_or_else(|| self.default_locale());
        let locale = if self.known_locale(requested) {
            requested
        } else {
            "en"
        };

        let template = self
            .custom
            .get(locale)
            .and_then(|table| table.get(key).map(String::as_str))
            .or_else(|| builtin_message(locale, key))
            .or_else(|| builtin_message("en", key))
            .or(fallback)
            .unwrap_or("Validation error.");

        render(template, replacements)
    }

    fn known_locale(&self, locale: &str) -> bool {
        has_builtin_table(locale) || self.custom.contains_key(locale)
    }
}

/// Substitute `{name}` placeholders in a template.
fn render(template: &str, replacements: &[(&str, String)]) -> String {
    let mut message = template.to_string();
    for (name, value) in replacements {
        message = message.replace(&format!("{{{name}}}"), value);
    }
    message
}

fn has_builtin_table(locale: &str) -> bool {
    matches!(locale, "en" | "es" | "tr")
}

fn builtin_message(locale: &str, key: &str) -> Option<&'static str> {
    match locale {
        "en" => en_message(key),
        "es" => es_message(key),
        "tr" => tr_message(key),
        _ => None,
    }
}

fn en_message(key: &str) -> Option<&'static str> {
    Some(match key {
        "required" => "This field is required.",
        "min_length" => "Must be at least {min} characters.",
        "max_length" => "Must be at most {max} characters.",
        "email" => "Invalid email format.",
        "is_numeric" => "Must be a number.",
        "step" => "Must be a multiple of {step}.",
        "min" => "Must be at least {min}.",
        "max" => "Must be at most {max}.",
        "pattern" => "Invalid format.",
        "url" => "Invalid URL.",
        "date" => "Invalid date.",
        "time" => "Invalid time.",
        "datetime" => "Invalid date/time.",
        "file" => "Invalid file type.",
        _ => return None,
    })
}

fn es_message(key: &str) -> Option<&'static str> {
    Some(match key {
        "required" => "Este campo es obligatorio.",
        "min_length" => "Debe tener al menos {min} caracteres.",
        "max_length" => "Debe tener como máximo {max} caracteres.",
        "email" => "Formato de correo electrónico no válido.",
        "is_numeric" => "Debe ser un número.",
        "step" => "Debe ser un múltiplo de {step}.",
        "min" => "Debe ser al menos {min}.",
        "max" => "Debe ser como máximo {max}.",
        "pattern" => "Formato no válido.",
        "url" => "URL no válida.",
        "date" => "Fecha no válida.",
        "time" => "Hora no válida.",
        "datetime" => "Fecha/hora no válida.",
        "file" => "Tipo de archivo no válido.",
        _ => return None,
    })
}

fn tr_message(key: &str) -> Option<&'static str> {
    Some(match key {
        "required" => "Bu alan zorunludur.",
        "min_length" => "En az {min} karakter olmalıdır.",
        "max_length" => "En fazla {max} karakter olmalıdır.",
        "email" => "Geçersiz e-posta formatı.",
        "is_numeric" => "Bir sayı olmalıdır.",
        "step" => "{step} katı olmalıdır.",
        "min" => "En az {min} olmalıdır.",
        "max" => "En fazla {max} olmalıdır.",
        "pattern" => "Geçersiz format.",
        "url" => "Geçersiz URL.",
        "date" => "Geçersiz tarih.",
        "time" => "Geçersiz saat.",
        "datetime" => "Geçersiz tarih/saat.",
        "file" => "Geçersiz dosya türü.",
        _ => return None,
    })
}
