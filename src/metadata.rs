use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};

pub const UNKNOWN_DATE: &str = "UnknownDate";
pub const UNKNOWN_LOC: &str = "UnknownLoc";

/// Case-folded variant spellings mapped to canonical punctuation-free
/// country tokens. Built once, never mutated.
static COUNTRY_VARIANTS: LazyLock<HashMap<String, &'static str>> = LazyLock::new(|| {
    let entries: &[(&str, &[&str])] = &[
        ("SierraLeone", &["sierra leone", "sierra-leone", "sierraleone"]),
        ("BurkinaFaso", &["burkina faso", "burkina-faso", "burkinafaso"]),
        ("CostaRica", &["costa rica", "costa-rica", "costarica"]),
        ("SouthAfrica", &["south africa", "south-africa", "southafrica"]),
        (
            "IvoryCoast",
            &[
                "cote d'ivoire",
                "côte d'ivoire",
                "cote divoire",
                "cote-d'ivoire",
                "ivory coast",
                "ivory-coast",
                "ivorycoast",
            ],
        ),
        ("Nigeria", &["nigeria"]),
        ("Guinea", &["guinea", "republic of guinea"]),
        ("Liberia", &["liberia"]),
        ("Mali", &["mali"]),
        ("Ghana", &["ghana"]),
        ("Benin", &["benin"]),
        ("Togo", &["togo"]),
        ("Germany", &["germany"]),
        (
            "UnitedKingdom",
            &["united kingdom", "united-kingdom", "uk", "great britain"],
        ),
        (
            "UnitedStates",
            &["usa", "united states", "united-states", "united states of america"],
        ),
    ];
    let mut map = HashMap::new();
    for (canonical, variants) in entries {
        for variant in *variants {
            map.insert((*variant).to_string(), *canonical);
        }
    }
    map
});

/// Map a human-entered country spelling to its canonical token. Unrecognized
/// names fall back to stripping spaces, hyphens, and commas; this never fails.
pub fn normalize_country(raw: &str) -> String {
    let trimmed = raw.trim();
    if let Some(canonical) = COUNTRY_VARIANTS.get(&trimmed.to_lowercase()) {
        return (*canonical).to_string();
    }
    trimmed.replace([' ', '-', ','], "")
}

/// Whether a country name (any variant spelling) is present in the canonical
/// table. Used for up-front configuration warnings only.
pub fn is_known_country(raw: &str) -> bool {
    COUNTRY_VARIANTS.contains_key(&raw.trim().to_lowercase())
}

/// Convert a collection-date string to a decimal year with three decimals.
///
/// A bare four-digit year maps to `"{year}.000"`. Otherwise formats are tried
/// in a fixed priority order: `%Y-%m-%d`, `%Y-%m`, `%d-%b-%Y`, `%b-%Y`.
/// Month-precision inputs resolve to the 15th of the month. `"missing"` (any
/// case) and anything unparseable yield the `UnknownDate` sentinel.
pub fn normalize_date(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("missing") {
        return UNKNOWN_DATE.to_string();
    }
    if trimmed.len() == 4 && trimmed.chars().all(|ch| ch.is_ascii_digit()) {
        return format!("{trimmed}.000");
    }

    let attempts = [
        (trimmed.to_string(), "%Y-%m-%d"),
        (format!("{trimmed}-15"), "%Y-%m-%d"),
        (trimmed.to_string(), "%d-%b-%Y"),
        (format!("15-{trimmed}"), "%d-%b-%Y"),
    ];
    for (candidate, format) in &attempts {
        if let Ok(date) = NaiveDate::parse_from_str(candidate, format) {
            return decimal_year(date);
        }
    }
    UNKNOWN_DATE.to_string()
}

fn decimal_year(date: NaiveDate) -> String {
    let total_days = if date.leap_year() { 366.0 } else { 365.0 };
    let value = f64::from(date.year()) + f64::from(date.ordinal()) / total_days;
    format!("{value:.3}")
}

/// Country token from a raw `geo_loc_name` value: the part before the first
/// colon, canonicalized. A value containing "missing" maps to `UnknownLoc`.
pub fn location_token(geo_loc: &str) -> String {
    if geo_loc.to_lowercase().contains("missing") {
        return UNKNOWN_LOC.to_string();
    }
    let country = geo_loc.split(':').next().unwrap_or("").trim();
    if country.is_empty() {
        return UNKNOWN_LOC.to_string();
    }
    normalize_country(country)
}

/// The `(country, date)` pair used both by `build_identifier` and the
/// metadata-completeness filter.
pub fn identifier_parts(qualifiers: &BTreeMap<String, String>) -> (String, String) {
    let location = qualifiers
        .get("geo_loc_name")
        .map(|geo| location_token(geo))
        .unwrap_or_else(|| UNKNOWN_LOC.to_string());
    let date = qualifiers
        .get("collection_date")
        .map(|raw| normalize_date(raw))
        .unwrap_or_else(|| UNKNOWN_DATE.to_string());
    (location, date)
}

/// Canonical record identifier: `{accession}_{country}_{date}`.
pub fn build_identifier(accession: &str, qualifiers: &BTreeMap<String, String>) -> String {
    let (location, date) = identifier_parts(qualifiers);
    format!("{accession}_{location}_{date}")
}
