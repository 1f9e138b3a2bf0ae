//! Curated keyword sets and the light stemmer used to match them.

use std::collections::{BTreeMap, HashSet};

use anyhow::{bail, Result};

/// One keyword the scorer looks for.
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordEntry {
    /// Canonical lowercase term; may be several words.
    pub term: String,
    /// How the term is written when suggested or inserted.
    pub display: String,
    pub high_value: bool,
    /// Informal spellings that can be upgraded to `display` in place.
    pub variants: Vec<String>,
}

impl KeywordEntry {
    pub fn new(display: &str, high_value: bool, variants: &[&str]) -> Self {
        Self {
            term: display.to_lowercase(),
            display: display.to_string(),
            high_value,
            variants: variants.iter().map(|v| v.to_lowercase()).collect(),
        }
    }

    /// Stemmed part sequence used for coverage matching.
    pub fn match_parts(&self) -> Vec<String> {
        self.term
            .split_whitespace()
            .flat_map(match_parts)
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct KeywordSet {
    pub name: String,
    pub entries: Vec<KeywordEntry>,
}

/// All keyword sets known to the service, by name.
#[derive(Debug, Clone, Default)]
pub struct KeywordCatalog {
    sets: BTreeMap<String, KeywordSet>,
}

/// The entries of the activated sets, deduplicated by term. This is what the
/// keyword scorer receives.
#[derive(Debug, Clone, Default)]
pub struct KeywordBank {
    pub set_names: Vec<String>,
    pub entries: Vec<KeywordEntry>,
}

impl KeywordCatalog {
    pub fn from_sets(sets: Vec<KeywordSet>) -> Self {
        Self {
            sets: sets.into_iter().map(|s| (s.name.clone(), s)).collect(),
        }
    }

    pub fn builtin() -> Self {
        Self::from_sets(vec![general_set(), technology_set(), business_set()])
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sets.keys().map(String::as_str)
    }

    /// Builds the bank for the named sets. Unknown names are an error.
    pub fn select(&self, names: &[String]) -> Result<KeywordBank> {
        let mut seen = HashSet::new();
        let mut entries = Vec::new();
        for name in names {
            let Some(set) = self.sets.get(name) else {
                bail!(
                    "unknown keyword set '{name}' (known: {})",
                    self.names().collect::<Vec<_>>().join(", ")
                );
            };
            for entry in &set.entries {
                if seen.insert(entry.term.clone()) {
                    entries.push(entry.clone());
                }
            }
        }
        Ok(KeywordBank {
            set_names: names.to_vec(),
            entries,
        })
    }
}

impl KeywordBank {
    pub fn new(entries: Vec<KeywordEntry>) -> Self {
        Self {
            set_names: vec!["custom".to_string()],
            entries,
        }
    }
}

fn general_set() -> KeywordSet {
    KeywordSet {
        name: "general".to_string(),
        entries: vec![
            KeywordEntry::new("leadership", true, &[]),
            KeywordEntry::new("communication", true, &[]),
            KeywordEntry::new("collaboration", true, &["teamwork"]),
            KeywordEntry::new("problem-solving", true, &[]),
            KeywordEntry::new("project management", true, &[]),
            KeywordEntry::new("team", false, &[]),
            KeywordEntry::new("analytical", false, &[]),
            KeywordEntry::new("detail-oriented", false, &[]),
            KeywordEntry::new("time management", false, &[]),
            KeywordEntry::new("critical thinking", false, &[]),
            KeywordEntry::new("organization", false, &[]),
            KeywordEntry::new("planning", false, &[]),
            KeywordEntry::new("research", false, &[]),
            KeywordEntry::new("writing", false, &[]),
            KeywordEntry::new("interpersonal skills", false, &["people skills"]),
            KeywordEntry::new("multitasking", false, &["multi-tasking"]),
            KeywordEntry::new("decision-making", false, &[]),
            KeywordEntry::new("presentation", false, &[]),
            KeywordEntry::new("negotiation", false, &[]),
            KeywordEntry::new("customer service", true, &["customer support"]),
            KeywordEntry::new("creativity", false, &[]),
        ],
    }
}

fn technology_set() -> KeywordSet {
    KeywordSet {
        name: "technology".to_string(),
        entries: vec![
            KeywordEntry::new("Python", true, &[]),
            KeywordEntry::new("Java", false, &[]),
            KeywordEntry::new("JavaScript", true, &["js"]),
            KeywordEntry::new("React", false, &["reactjs"]),
            KeywordEntry::new("Node", false, &["nodejs"]),
            KeywordEntry::new("SQL", true, &[]),
            KeywordEntry::new("NoSQL", false, &[]),
            KeywordEntry::new("AWS", true, &[]),
            KeywordEntry::new("Azure", false, &[]),
            KeywordEntry::new("cloud", true, &[]),
            KeywordEntry::new("Docker", true, &[]),
            KeywordEntry::new("Kubernetes", true, &["k8s"]),
            KeywordEntry::new("agile", true, &[]),
            KeywordEntry::new("Scrum", false, &[]),
            KeywordEntry::new("REST API", false, &["restful api"]),
            KeywordEntry::new("microservices", false, &[]),
            KeywordEntry::new("DevOps", false, &[]),
            KeywordEntry::new("CI/CD", false, &[]),
            KeywordEntry::new("Git", false, &[]),
            KeywordEntry::new("machine learning", true, &["ml"]),
            KeywordEntry::new("artificial intelligence", false, &["ai"]),
            KeywordEntry::new("data science", false, &[]),
            KeywordEntry::new("big data", false, &[]),
            KeywordEntry::new("frontend", false, &[]),
            KeywordEntry::new("backend", false, &[]),
            KeywordEntry::new("full stack", false, &[]),
            KeywordEntry::new("mobile", false, &[]),
            KeywordEntry::new("Android", false, &[]),
            KeywordEntry::new("iOS", false, &[]),
        ],
    }
}

fn business_set() -> KeywordSet {
    KeywordSet {
        name: "business".to_string(),
        entries: vec![
            KeywordEntry::new("management", true, &[]),
            KeywordEntry::new("leadership", true, &[]),
            KeywordEntry::new("strategy", true, &[]),
            KeywordEntry::new("analytics", false, &[]),
            KeywordEntry::new("operations", false, &[]),
            KeywordEntry::new("marketing", false, &[]),
            KeywordEntry::new("sales", false, &[]),
            KeywordEntry::new("finance", false, &[]),
            KeywordEntry::new("accounting", false, &[]),
            KeywordEntry::new("human resources", false, &["hr"]),
            KeywordEntry::new("consulting", false, &[]),
            KeywordEntry::new("project management", true, &[]),
            KeywordEntry::new("business development", false, &[]),
            KeywordEntry::new("client relations", false, &[]),
            KeywordEntry::new("stakeholder", true, &[]),
            KeywordEntry::new("ROI", false, &[]),
            KeywordEntry::new("KPI", false, &[]),
            KeywordEntry::new("metrics", false, &[]),
            KeywordEntry::new("growth", false, &[]),
            KeywordEntry::new("revenue", true, &[]),
            KeywordEntry::new("profit", false, &[]),
            KeywordEntry::new("market analysis", false, &[]),
            KeywordEntry::new("strategic planning", false, &[]),
            KeywordEntry::new("budget", true, &[]),
            KeywordEntry::new("forecasting", false, &[]),
        ],
    }
}

/// Light suffix stemmer. Only needs to make inflections of the same word
/// collide; it is not a linguistic stemmer.
pub fn stem(word: &str) -> String {
    let mut w = word.to_lowercase();
    if w.chars().count() <= 3 {
        return w;
    }
    if let Some(base) = w.strip_suffix("ies") {
        w = format!("{base}y");
    } else if let Some(base) = w.strip_suffix("sses") {
        w = format!("{base}ss");
    } else if let Some(base) = w.strip_suffix("ing").filter(|b| b.len() >= 3) {
        w = base.to_string();
    } else if let Some(base) = w.strip_suffix("ed").filter(|b| b.len() >= 3) {
        w = base.to_string();
    } else if w.ends_with('s') && !w.ends_with("ss") && !w.ends_with("us") && !w.ends_with("is")
    {
        w.pop();
    }
    if w.len() > 4 && w.ends_with('e') {
        w.pop();
    }
    w
}

/// Splits a token at `-`, `.` and `/` and stems each part, so
/// "problem-solving" and "problem solving" produce the same parts.
pub fn match_parts(token: &str) -> Vec<String> {
    token
        .split(['-', '.', '/'])
        .filter(|p| !p.is_empty())
        .map(stem)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stem_collapses_inflections() {
        assert_eq!(stem("managed"), stem("managing"));
        assert_eq!(stem("services"), stem("service"));
        assert_eq!(stem("strategies"), stem("strategy"));
        assert_eq!(stem("metrics"), stem("metric"));
    }

    #[test]
    fn test_stem_leaves_short_words() {
        assert_eq!(stem("aws"), "aws");
        assert_eq!(stem("SQL"), "sql");
    }

    #[test]
    fn test_match_parts_splits_joiners() {
        assert_eq!(match_parts("problem-solving"), vec!["problem", "solv"]);
        assert_eq!(match_parts("ci/cd"), vec!["ci", "cd"]);
    }

    #[test]
    fn test_entry_match_parts_cover_multiword_terms() {
        let e = KeywordEntry::new("project management", true, &[]);
        assert_eq!(e.match_parts(), vec![stem("project"), stem("management")]);
    }

    #[test]
    fn test_select_dedupes_shared_terms() {
        let catalog = KeywordCatalog::builtin();
        let bank = catalog
            .select(&["general".to_string(), "business".to_string()])
            .unwrap();
        let leadership = bank
            .entries
            .iter()
            .filter(|e| e.term == "leadership")
            .count();
        assert_eq!(leadership, 1);
    }

    #[test]
    fn test_select_rejects_unknown_set() {
        let catalog = KeywordCatalog::builtin();
        let err = catalog.select(&["finance".to_string()]).unwrap_err();
        assert!(err.to_string().contains("finance"));
    }

    #[test]
    fn test_builtin_has_three_sets() {
        let names: Vec<_> = KeywordCatalog::builtin().names().map(String::from).collect();
        assert_eq!(names, vec!["business", "general", "technology"]);
    }
}
