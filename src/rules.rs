//! Domain rule table: which chart kinds suit a column, given the domain the
//! dataset comes from, the column dtype and its cardinality.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::data::profile::Dtype;
use crate::error::RuleError;

/// Pie ceiling used by domains that do not set their own.
pub const DEFAULT_PIE_MAX_CATEGORIES: usize = 8;

// ---------------------------------------------------------------------------
// ChartKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Histogram,
    Boxplot,
    Bar,
    Pie,
    Line,
    Scatter,
}

impl ChartKind {
    pub const ALL: [ChartKind; 6] = [
        ChartKind::Histogram,
        ChartKind::Boxplot,
        ChartKind::Bar,
        ChartKind::Pie,
        ChartKind::Line,
        ChartKind::Scatter,
    ];

    /// Lowercase name used in file names and rule tables.
    pub fn as_str(self) -> &'static str {
        match self {
            ChartKind::Histogram => "histogram",
            ChartKind::Boxplot => "boxplot",
            ChartKind::Bar => "bar",
            ChartKind::Pie => "pie",
            ChartKind::Line => "line",
            ChartKind::Scatter => "scatter",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChartKind::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown chart kind `{s}`"))
    }
}

// ---------------------------------------------------------------------------
// Domain
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Generic,
    Education,
    Supermarket,
    Finance,
    Healthcare,
    Agriculture,
    Logistics,
}

impl Domain {
    pub const ALL: [Domain; 7] = [
        Domain::Generic,
        Domain::Education,
        Domain::Supermarket,
        Domain::Finance,
        Domain::Healthcare,
        Domain::Agriculture,
        Domain::Logistics,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Domain::Generic => "generic",
            Domain::Education => "education",
            Domain::Supermarket => "supermarket",
            Domain::Finance => "finance",
            Domain::Healthcare => "healthcare",
            Domain::Agriculture => "agriculture",
            Domain::Logistics => "logistics",
        }
    }

    /// Resolve a domain name, falling back to [`Domain::Generic`] for names
    /// that are not known.
    pub fn from_name(name: &str) -> Domain {
        Domain::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(name.trim()))
            .unwrap_or(Domain::Generic)
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Rule table
// ---------------------------------------------------------------------------

/// Candidate chart kinds of one domain, best first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainRules {
    pub numeric: Vec<ChartKind>,
    pub categorical: Vec<ChartKind>,
    /// Largest distinct-value count a pie chart is drawn for.  Applies both to
    /// suggesting pie and to rendering one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pie_max_categories: Option<usize>,
}

impl DomainRules {
    fn new(numeric: &[ChartKind], categorical: &[ChartKind], pie: Option<usize>) -> Self {
        DomainRules {
            numeric: numeric.to_vec(),
            categorical: categorical.to_vec(),
            pie_max_categories: pie,
        }
    }

    pub fn pie_ceiling(&self) -> usize {
        self.pie_max_categories.unwrap_or(DEFAULT_PIE_MAX_CATEGORIES)
    }
}

/// Validated mapping from [`Domain`] to its [`DomainRules`].
#[derive(Debug, Clone, PartialEq)]
pub struct RuleTable {
    rules: BTreeMap<Domain, DomainRules>,
}

impl RuleTable {
    /// Build a table, rejecting entries that could yield an empty or
    /// pie-only suggestion.
    pub fn new(rules: BTreeMap<Domain, DomainRules>) -> Result<Self, RuleError> {
        if !rules.contains_key(&Domain::Generic) {
            return Err(RuleError::MissingGeneric);
        }
        for (&domain, r) in &rules {
            for (dtype, list) in [("numeric", &r.numeric), ("categorical", &r.categorical)] {
                if list.is_empty() {
                    return Err(RuleError::EmptyList { domain, dtype });
                }
                for (i, kind) in list.iter().enumerate() {
                    if list[..i].contains(kind) {
                        return Err(RuleError::Duplicate {
                            domain,
                            dtype,
                            kind: *kind,
                        });
                    }
                }
            }
            if r.categorical.iter().all(|k| *k == ChartKind::Pie) {
                return Err(RuleError::PieOnly { domain });
            }
            if let Some(value) = r.pie_max_categories {
                if value < 2 {
                    return Err(RuleError::PieCeiling { domain, value });
                }
            }
        }
        Ok(RuleTable { rules })
    }

    /// Parse and validate a JSON table keyed by lowercase domain name:
    ///
    /// ```json
    /// { "generic": { "numeric": ["histogram"], "categorical": ["bar", "pie"],
    ///                "pie_max_categories": 8 } }
    /// ```
    pub fn from_json(text: &str) -> Result<Self, RuleError> {
        let rules: BTreeMap<Domain, DomainRules> = serde_json::from_str(text)?;
        Self::new(rules)
    }

    /// The rules shipped with the crate.
    pub fn builtin() -> Self {
        RuleTable {
            rules: builtin_rules(),
        }
    }

    /// Rules for `domain`, or the generic rules when the table has no entry.
    pub fn rules_for(&self, domain: Domain) -> &DomainRules {
        self.rules
            .get(&domain)
            .or_else(|| self.rules.get(&Domain::Generic))
            .unwrap_or(&FALLBACK_RULES)
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::builtin()
    }
}

// Unreachable for validated tables, which always hold a generic entry.
static FALLBACK_RULES: DomainRules = DomainRules {
    numeric: Vec::new(),
    categorical: Vec::new(),
    pie_max_categories: None,
};

fn builtin_rules() -> BTreeMap<Domain, DomainRules> {
    use ChartKind::*;
    BTreeMap::from([
        (Domain::Generic, DomainRules::new(&[Histogram, Boxplot], &[Bar, Pie], Some(8))),
        (Domain::Education, DomainRules::new(&[Histogram, Line], &[Bar], None)),
        (Domain::Supermarket, DomainRules::new(&[Line, Bar], &[Bar, Pie], Some(10))),
        (Domain::Finance, DomainRules::new(&[Line, Histogram], &[Bar], None)),
        (Domain::Healthcare, DomainRules::new(&[Line, Boxplot], &[Bar, Pie], Some(6))),
        (Domain::Agriculture, DomainRules::new(&[Line, Scatter], &[Bar], None)),
        (Domain::Logistics, DomainRules::new(&[Line, Bar], &[Bar, Pie], Some(8))),
    ])
}

// ---------------------------------------------------------------------------
// RuleEngine
// ---------------------------------------------------------------------------

/// Answers "which charts for this column?" from a [`RuleTable`].
#[derive(Debug, Clone, Default)]
pub struct RuleEngine {
    table: RuleTable,
}

impl RuleEngine {
    pub fn new(table: RuleTable) -> Self {
        RuleEngine { table }
    }

    pub fn table(&self) -> &RuleTable {
        &self.table
    }

    /// Ordered chart kinds for a column.  Never empty.
    pub fn suggest(&self, domain: Domain, dtype: Dtype, distinct: usize) -> Vec<ChartKind> {
        let rules = self.table.rules_for(domain);
        let candidates: Vec<ChartKind> = match dtype {
            Dtype::Numeric => rules.numeric.clone(),
            Dtype::Categorical => rules
                .categorical
                .iter()
                .copied()
                .filter(|k| *k != ChartKind::Pie || distinct <= rules.pie_ceiling())
                .collect(),
        };
        if candidates.is_empty() {
            vec![ChartKind::Bar]
        } else {
            candidates
        }
    }

    /// String-keyed lookup: unknown domains use the generic rules and
    /// unknown dtypes get a single bar chart.
    pub fn suggest_named(&self, domain: &str, dtype: &str, distinct: usize) -> Vec<ChartKind> {
        match dtype.parse::<Dtype>() {
            Ok(dtype) => self.suggest(Domain::from_name(domain), dtype, distinct),
            Err(_) => vec![ChartKind::Bar],
        }
    }

    /// Cardinality above which pie charts are not drawn for `domain`.
    pub fn pie_ceiling(&self, domain: Domain) -> usize {
        self.table.rules_for(domain).pie_ceiling()
    }
}
