//! City name normalization service
//!
//! Canonicalizes city names so customers, geolocation rows and the
//! county lookup can be joined on the same key.

use unicode_normalization::UnicodeNormalization;

/// Normalize a city name to its join key.
///
/// Transformations:
/// - Canonical decomposition (NFD): "São Paulo" → "Sa\u{303}o Paulo"
/// - Drop every non-ASCII code point (accents and unrepresentable chars)
/// - Lowercase
///
/// # Examples
/// ```
/// use olistdash::services::normalizer::normalize_city_name;
///
/// assert_eq!(normalize_city_name("São Paulo"), "sao paulo");
/// assert_eq!(normalize_city_name("Ribeirão Preto"), "ribeirao preto");
/// ```
pub fn normalize_city_name(name: &str) -> String {
    name.nfd()
        .filter(char::is_ascii)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Title-case a normalized name for display ("sao jose dos campos" → "Sao Jose Dos Campos")
pub fn display_city_name(name: &str) -> String {
    name.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
