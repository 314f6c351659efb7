//! Leaderboard entry model
//!
//! Stored entries are `{name, score}` objects. Early releases persisted bare
//! numeric scores; those are upgraded to ANONYMOUS entries on read.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Name assigned to legacy and unnamed scores
pub const ANONYMOUS_NAME: &str = "ANONYMOUS";

/// One leaderboard entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry {
    pub name: String,
    pub score: f64,
}

impl Entry {
    pub fn new(name: impl Into<String>, score: f64) -> Self {
        Self {
            name: name.into(),
            score,
        }
    }

    /// Normalize a player-supplied name: trimmed, uppercased, ANONYMOUS
    /// when empty
    pub fn normalize_name(raw: &str) -> String {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            ANONYMOUS_NAME.to_string()
        } else {
            trimmed.to_uppercase()
        }
    }
}

impl<'de> Deserialize<'de> for Entry {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Stored {
            Named { name: String, score: f64 },
            // legacy format: bare numeric score
            Bare(f64),
        }

        Ok(match Stored::deserialize(deserializer)? {
            Stored::Named { name, score } => Entry { name, score },
            Stored::Bare(score) => Entry {
                name: ANONYMOUS_NAME.to_string(),
                score,
            },
        })
    }
}

/// A remote leaderboard document: an entry plus its submission time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteRecord {
    pub name: String,
    pub score: f64,
    pub timestamp: DateTime<Utc>,
}

impl RemoteRecord {
    pub fn entry(&self) -> Entry {
        Entry::new(self.name.clone(), self.score)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_entry_roundtrip() {
        let json = r#"{"name":"ACE","score":7.5}"#;
        let entry: Entry = serde_json::from_str(json).unwrap();
        assert_eq!(entry, Entry::new("ACE", 7.5));
    }

    #[test]
    fn test_legacy_bare_scores_upgrade() {
        let entries: Vec<Entry> = serde_json::from_str("[5.0, 3.0]").unwrap();
        assert_eq!(
            entries,
            vec![
                Entry::new(ANONYMOUS_NAME, 5.0),
                Entry::new(ANONYMOUS_NAME, 3.0),
            ]
        );
    }

    #[test]
    fn test_mixed_legacy_and_named() {
        let entries: Vec<Entry> =
            serde_json::from_str(r#"[{"name":"ACE","score":8.0}, 2.5]"#).unwrap();
        assert_eq!(entries[0].name, "ACE");
        assert_eq!(entries[1].name, ANONYMOUS_NAME);
        assert!((entries[1].score - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_name_normalization() {
        assert_eq!(Entry::normalize_name("  ace "), "ACE");
        assert_eq!(Entry::normalize_name(""), ANONYMOUS_NAME);
        assert_eq!(Entry::normalize_name("   "), ANONYMOUS_NAME);
    }
}
