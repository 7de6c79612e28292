//! Entity resolution and the species presence summary.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ReportError;
use crate::tables::{ConcessionRecord, EntityKeyed};

/// Return the single record identified by `id`.
///
/// # Errors
///
/// Returns [`ReportError::EntityNotFound`] when no record matches and
/// [`ReportError::AmbiguousEntity`] when more than one does.
pub fn resolve_entity<'a>(
    entities: &'a [ConcessionRecord],
    id: &str,
) -> Result<&'a ConcessionRecord, ReportError> {
    let mut matches = entities.iter().filter(|record| record.entity() == id);
    let Some(first) = matches.next() else {
        return Err(ReportError::EntityNotFound { id: id.to_string() });
    };
    let extra = matches.count();
    if extra > 0 {
        return Err(ReportError::AmbiguousEntity {
            id: id.to_string(),
            matches: extra + 1,
        });
    }
    Ok(first)
}

/// Which indicators have a positive documented count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "names", rename_all = "lowercase")]
pub enum IndicatorPresence {
    None,
    Single(String),
    Multiple(Vec<String>),
}

impl IndicatorPresence {
    /// Capitalized names of the present indicators.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        match self {
            Self::None => Vec::new(),
            Self::Single(name) => vec![name.as_str()],
            Self::Multiple(names) => names.iter().map(String::as_str).collect(),
        }
    }
}

impl fmt::Display for IndicatorPresence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none documented"),
            Self::Single(name) => write!(f, "only documented {name}s"),
            Self::Multiple(names) => {
                write!(f, "multiple ({}) documented animals", names.join(", "))
            }
        }
    }
}

/// Uppercase the first character and lowercase the rest.
#[must_use]
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    chars.next().map_or_else(String::new, |first| {
        first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect()
    })
}

/// Classify indicator counts, in iteration order. Zero counts are excluded.
///
/// # Errors
///
/// Returns [`ReportError::NegativeCount`] for any negative count.
pub fn indicator_presence<'a, I>(counts: I) -> Result<IndicatorPresence, ReportError>
where
    I: IntoIterator<Item = (&'a str, i64)>,
{
    let mut present = Vec::new();
    for (name, count) in counts {
        if count < 0 {
            return Err(ReportError::NegativeCount {
                name: name.to_string(),
                count,
            });
        }
        if count > 0 {
            present.push(capitalize(name));
        }
    }
    Ok(match present.len() {
        0 => IndicatorPresence::None,
        1 => IndicatorPresence::Single(present.remove(0)),
        _ => IndicatorPresence::Multiple(present),
    })
}

/// Species presence of `record`, restricted to the configured indicator names.
/// Indicators missing from the record count as zero.
///
/// # Errors
///
/// Returns [`ReportError::NegativeCount`] for any negative count.
pub fn species_presence(
    record: &ConcessionRecord,
    species: &[String],
) -> Result<IndicatorPresence, ReportError> {
    indicator_presence(species.iter().map(|name| {
        let count = record.species.get(name).copied().unwrap_or(0);
        (name.as_str(), count)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn record(name: &str) -> ConcessionRecord {
        ConcessionRecord {
            name: name.to_string(),
            area_km2: 120.0,
            total_fees: 60_000.0,
            outfitter: "Kwacha Outfitters".to_string(),
            species: BTreeMap::new(),
            population: None,
        }
    }

    #[test]
    fn resolves_unique_record() {
        let entities = vec![record("Block-7"), record("Block-8")];
        let found = resolve_entity(&entities, "Block-8").unwrap();
        assert_eq!(found.name, "Block-8");
    }

    #[test]
    fn missing_and_duplicate_ids_fail() {
        let entities = vec![record("Block-7"), record("Block-7"), record("Block-8")];
        assert_eq!(
            resolve_entity(&entities, "Block-9").unwrap_err(),
            ReportError::EntityNotFound {
                id: "Block-9".to_string()
            }
        );
        assert_eq!(
            resolve_entity(&entities, "Block-7").unwrap_err(),
            ReportError::AmbiguousEntity {
                id: "Block-7".to_string(),
                matches: 2
            }
        );
    }

    #[test]
    fn presence_phrasing_by_count() {
        let none = indicator_presence([("a", 0), ("b", 0)]).unwrap();
        assert_eq!(none, IndicatorPresence::None);
        assert_eq!(none.to_string(), "none documented");

        let single = indicator_presence([("a", 2), ("b", 0)]).unwrap();
        assert_eq!(single, IndicatorPresence::Single("A".to_string()));
        assert!(single.to_string().contains('A'));

        let multiple = indicator_presence([("a", 1), ("b", 3)]).unwrap();
        assert_eq!(multiple.to_string(), "multiple (A, B) documented animals");
        assert_eq!(multiple.names(), vec!["A", "B"]);
    }

    #[test]
    fn lion_only_reads_naturally() {
        let presence = indicator_presence([("LION", 1), ("PUKU", 0)]).unwrap();
        assert_eq!(presence.to_string(), "only documented Lions");
    }

    #[test]
    fn negative_counts_are_rejected() {
        let err = indicator_presence([("LION", 1), ("PUKU", -2)]).unwrap_err();
        assert_eq!(
            err,
            ReportError::NegativeCount {
                name: "PUKU".to_string(),
                count: -2
            }
        );
    }

    #[test]
    fn species_presence_uses_configured_order() {
        let mut rec = record("Block-7");
        rec.species.insert("PUKU".to_string(), 4);
        rec.species.insert("BUFFALO".to_string(), 1);
        rec.species.insert("CROCODILE".to_string(), 9);
        let species = vec!["PUKU".to_string(), "BUFFALO".to_string(), "LION".to_string()];
        let presence = species_presence(&rec, &species).unwrap();
        assert_eq!(
            presence,
            IndicatorPresence::Multiple(vec!["Puku".to_string(), "Buffalo".to_string()])
        );
    }

    #[test]
    fn capitalize_matches_title_case() {
        assert_eq!(capitalize("LEOPARD"), "Leopard");
        assert_eq!(capitalize("impala"), "Impala");
        assert_eq!(capitalize(""), "");
    }
}
