//! Localized user-facing messages.
//!
//! Bundles are keyed by language tag (`en`, `en-gb`, `es`, ...). Lookup tries
//! the exact tag, then its primary language, then the default locale. A key
//! missing from every candidate bundle is returned as-is.

use crate::{OptimaError, OptimaResult};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Message key for a license lookup miss. Args: license id, organisation id.
pub const LICENSE_SEARCH_ERROR: &str = "license.search.error.message";
/// Message key for a created license. Args: license id, organisation id.
pub const LICENSE_CREATE: &str = "license.create.message";
/// Message key for an updated license. Args: license id, organisation id.
pub const LICENSE_UPDATE: &str = "license.update.message";
/// Message key for a deleted license. Args: license id, organisation id.
pub const LICENSE_DELETE: &str = "license.delete.message";

const DEFAULT_BUNDLES: &str = r#"
[en]
"license.search.error.message" = "Unable to find license with License id {0} and Organisation id {1}"
"license.create.message" = "License created {0} for the organisation {1}"
"license.update.message" = "License {0} updated for the organisation {1}"
"license.delete.message" = "Deleting license with id {0} for the organisation {1}"

[es]
"license.search.error.message" = "No se pudo encontrar la licencia {0} de la organización {1}"
"license.create.message" = "Licencia creada {0} para la organización {1}"
"license.update.message" = "Licencia {0} actualizada para la organización {1}"
"license.delete.message" = "Eliminando licencia {0} de la organización {1}"
"#;

/// Source of formatted, locale-aware messages.
pub trait MessageSource: Send + Sync {
    /// Formats the message for `key`, substituting `{0}`, `{1}`, ... with `args`.
    ///
    /// `locale` of `None` selects the default locale.
    fn get_message(&self, key: &str, args: &[&str], locale: Option<&str>) -> String;
}

/// In-memory message bundles.
#[derive(Debug, Clone)]
pub struct StaticMessageSource {
    bundles: HashMap<String, HashMap<String, String>>,
    default_locale: String,
}

impl StaticMessageSource {
    /// Creates a source with the built-in `en` and `es` bundles.
    #[must_use]
    pub fn with_defaults(default_locale: &str) -> Self {
        let bundles = parse_bundles(DEFAULT_BUNDLES).unwrap_or_else(|e| {
            warn!("Built-in message bundles failed to load: {}", e);
            HashMap::new()
        });
        debug!("Loaded built-in message bundles for {} locales", bundles.len());
        Self {
            bundles,
            default_locale: normalize(default_locale),
        }
    }

    /// Creates a source from a TOML document of `[locale]` tables.
    pub fn from_toml(content: &str, default_locale: &str) -> OptimaResult<Self> {
        let bundles = parse_bundles(content)?;
        debug!("Loaded message bundles for {} locales", bundles.len());
        Ok(Self {
            bundles,
            default_locale: normalize(default_locale),
        })
    }

    /// Overlays bundles from a TOML document on top of the current ones.
    pub fn merge_toml(mut self, content: &str) -> OptimaResult<Self> {
        for (locale, messages) in parse_bundles(content)? {
            debug!("Loaded {} messages for locale '{}'", messages.len(), locale);
            self.bundles.entry(locale).or_default().extend(messages);
        }
        Ok(self)
    }

    /// Returns the normalized default locale.
    #[must_use]
    pub fn default_locale(&self) -> &str {
        &self.default_locale
    }

    fn lookup(&self, key: &str, locale: Option<&str>) -> Option<&str> {
        let requested = locale.map_or_else(|| self.default_locale.clone(), normalize);
        let requested_tags = candidates(&requested);

        if let Some(message) = self.find(&requested_tags, key) {
            return Some(message);
        }

        let message = self.find(&candidates(&self.default_locale), key);
        if message.is_some() {
            debug!(
                "No '{}' message for locale '{}'; using default locale '{}'",
                key, requested, self.default_locale
            );
        }
        message
    }

    fn find(&self, tags: &[String], key: &str) -> Option<&str> {
        tags.iter()
            .find_map(|tag| self.bundles.get(tag).and_then(|b| b.get(key)))
            .map(String::as_str)
    }
}

impl MessageSource for StaticMessageSource {
    fn get_message(&self, key: &str, args: &[&str], locale: Option<&str>) -> String {
        match self.lookup(key, locale) {
            Some(template) => format_message(template, args),
            None => {
                warn!("No message bundle defines '{}'", key);
                key.to_string()
            }
        }
    }
}

fn parse_bundles(content: &str) -> OptimaResult<HashMap<String, HashMap<String, String>>> {
    let raw: HashMap<String, HashMap<String, String>> = toml::from_str(content)
        .map_err(|e| OptimaError::Configuration(format!("Invalid message bundle: {}", e)))?;

    Ok(raw
        .into_iter()
        .map(|(locale, messages)| (normalize(&locale), messages))
        .collect())
}

fn normalize(locale: &str) -> String {
    locale.trim().replace('_', "-").to_lowercase()
}

fn candidates(tag: &str) -> Vec<String> {
    let mut out = vec![tag.to_string()];
    if let Some((primary, _)) = tag.split_once('-') {
        out.push(primary.to_string());
    }
    out
}

/// Substitutes `{n}` placeholders with positional arguments.
#[must_use]
pub fn format_message(template: &str, args: &[&str]) -> String {
    args.iter()
        .enumerate()
        .fold(template.to_string(), |acc, (i, arg)| {
            acc.replace(&format!("{{{}}}", i), arg)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_locale_message() {
        let source = StaticMessageSource::with_defaults("en-GB");
        let msg = source.get_message(LICENSE_SEARCH_ERROR, &["L1", "O1"], None);
        assert_eq!(
            msg,
            "Unable to find license with License id L1 and Organisation id O1"
        );
    }

    #[test]
    fn test_primary_language_fallback() {
        let source = StaticMessageSource::with_defaults("en-GB");
        let msg = source.get_message(LICENSE_CREATE, &["L1", "O1"], Some("es_MX"));
        assert!(msg.starts_with("Licencia creada L1"));
    }

    #[test]
    fn test_unknown_locale_uses_default() {
        let source = StaticMessageSource::with_defaults("en-GB");
        let msg = source.get_message(LICENSE_DELETE, &["L1", "O1"], Some("fr-FR"));
        assert!(msg.starts_with("Deleting license with id L1"));
    }

    #[test]
    fn test_missing_key_returns_code() {
        let source = StaticMessageSource::with_defaults("en");
        assert_eq!(source.get_message("no.such.key", &[], None), "no.such.key");
    }

    #[test]
    fn test_merge_overrides_single_key() {
        let source = StaticMessageSource::with_defaults("en")
            .merge_toml("[en]\n\"license.update.message\" = \"Updated {0}\"\n")
            .unwrap();
        assert_eq!(source.get_message(LICENSE_UPDATE, &["L7"], None), "Updated L7");
        assert!(source
            .get_message(LICENSE_CREATE, &["L7", "O1"], None)
            .starts_with("License created"));
    }

    #[test]
    fn test_invalid_bundle_is_configuration_error() {
        let err = StaticMessageSource::from_toml("not = [valid", "en").unwrap_err();
        assert!(matches!(err, OptimaError::Configuration(_)));
    }

    #[test]
    fn test_built_in_bundles_cover_both_locales() {
        let source = StaticMessageSource::with_defaults("en");
        for key in [LICENSE_SEARCH_ERROR, LICENSE_CREATE, LICENSE_UPDATE, LICENSE_DELETE] {
            assert_ne!(source.get_message(key, &[], Some("en")), key);
            assert_ne!(source.get_message(key, &[], Some("es")), key);
        }
    }

    #[test]
    fn test_format_message_leaves_unmatched_placeholders() {
        assert_eq!(format_message("{0} and {1}", &["a"]), "a and {1}");
    }
}
