//! Diacritic stripping for geocoder input
//!
//! Geocoding backends match accented Latin input poorly, so the address line
//! is decomposed (NFD) and the combining marks are dropped before querying.

use unicode_normalization::UnicodeNormalization;

/// Strip combining diacritical marks, keeping base letters and case
pub fn normalize(text: &str) -> String {
    text.nfd().filter(|c| !is_mark(*c)).collect()
}

/// Address line sent to the geocoder: `"{street}, {city}, {state}"`
///
/// The house number is not part of the query; street-level resolution is
/// enough and an invalid number raises the miss rate.
pub fn compose_address_line(street: &str, city: &str, state: &str) -> String {
    format!("{}, {}, {}", street.trim(), city.trim(), state.trim())
}

fn is_mark(c: char) -> bool {
    ('\u{0300}'..='\u{036F}').contains(&c)
}
