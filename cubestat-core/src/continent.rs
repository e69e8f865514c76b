//! Country → continent lookup.
//!
//! The export's countries table is the primary source. A compiled-in ISO-2
//! table covers countries whose row carries no continent.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A country row from the export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    /// Export identifier, e.g. `China` or `USA`.
    pub id: String,
    pub name: String,
    /// Export continent identifier, e.g. `_Asia`. May be empty.
    pub continent_id: String,
    pub iso2: String,
}

/// Countries keyed by export id, built once per snapshot.
#[derive(Debug, Clone, Default)]
pub struct CountryTable {
    by_id: HashMap<String, Country>,
}

impl CountryTable {
    pub fn new(countries: impl IntoIterator<Item = Country>) -> Self {
        Self {
            by_id: countries.into_iter().map(|c| (c.id.clone(), c)).collect(),
        }
    }

    pub fn get(&self, country_id: &str) -> Option<&Country> {
        self.by_id.get(country_id)
    }

    /// Continent id for a country, falling back to the ISO-2 table.
    pub fn continent_of(&self, country_id: &str) -> Option<&str> {
        let country = self.by_id.get(country_id)?;
        if !country.continent_id.is_empty() {
            return Some(&country.continent_id);
        }
        fallback_continent(&country.iso2)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

const AFRICA: &[&str] = &[
    "DZ", "AO", "BJ", "BW", "BF", "BI", "CM", "CV", "CF", "TD", "KM", "CG", "CD", "DJ", "EG",
    "GQ", "ER", "SZ", "ET", "GA", "GM", "GH", "GN", "GW", "CI", "KE", "LS", "LR", "LY", "MG",
    "MW", "ML", "MR", "MU", "YT", "MA", "MZ", "NA", "NE", "NG", "RE", "RW", "ST", "SN", "SC",
    "SL", "SO", "ZA", "SS", "SD", "TZ", "TG", "TN", "UG", "EH", "ZM", "ZW",
];

const ASIA: &[&str] = &[
    "AF", "AM", "AZ", "BH", "BD", "BT", "BN", "KH", "CN", "CY", "GE", "HK", "IN", "ID", "IR",
    "IQ", "IL", "JP", "JO", "KZ", "KW", "KG", "LA", "LB", "MO", "MY", "MV", "MN", "MM", "NP",
    "KP", "OM", "PK", "PS", "PH", "QA", "SA", "SG", "KR", "LK", "SY", "TW", "TJ", "TH", "TR",
    "TM", "AE", "UZ", "VN", "YE",
];

const EUROPE: &[&str] = &[
    "AL", "AD", "AT", "BY", "BE", "BA", "BG", "HR", "CZ", "DK", "EE", "FI", "FR", "DE", "GR",
    "HU", "IS", "IE", "IT", "XK", "LV", "LI", "LT", "LU", "MT", "MD", "MC", "ME", "NL", "MK",
    "NO", "PL", "PT", "RO", "RU", "SM", "RS", "SK", "SI", "ES", "SE", "CH", "UA", "GB", "VA",
];

const NORTH_AMERICA: &[&str] = &[
    "AG", "BS", "BB", "BZ", "BM", "CA", "KY", "CR", "CU", "DM", "DO", "SV", "GL", "GD", "GT",
    "HT", "HN", "JM", "MX", "NI", "PA", "PR", "KN", "LC", "VC", "TT", "US",
];

const SOUTH_AMERICA: &[&str] = &[
    "AR", "BO", "BR", "CL", "CO", "EC", "GY", "PY", "PE", "SR", "UY", "VE",
];

const OCEANIA: &[&str] = &[
    "AS", "AU", "CK", "FJ", "PF", "GU", "KI", "MH", "FM", "NR", "NC", "NZ", "MP", "PW", "PG",
    "WS", "SB", "TO", "TV", "VU",
];

const CONTINENTS: &[(&str, &[&str])] = &[
    ("_Africa", AFRICA),
    ("_Asia", ASIA),
    ("_Europe", EUROPE),
    ("_North America", NORTH_AMERICA),
    ("_South America", SOUTH_AMERICA),
    ("_Oceania", OCEANIA),
];

/// Continent id for an ISO-2 country code, using the compiled-in table.
pub fn fallback_continent(iso2: &str) -> Option<&'static str> {
    let code = iso2.trim().to_uppercase();
    CONTINENTS
        .iter()
        .find(|(_, codes)| codes.contains(&code.as_str()))
        .map(|(continent, _)| *continent)
}
