use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::model::Column;

// ---------------------------------------------------------------------------
// Dtype – coarse column classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dtype {
    Numeric,
    Categorical,
}

impl Dtype {
    /// A column is numeric when it holds at least one value and every
    /// non-null value is an integer or a float.  Everything else, including
    /// booleans, dates and all-null columns, is categorical.
    pub fn classify(column: &Column) -> Dtype {
        let mut non_null = column.values.iter().filter(|v| !v.is_null()).peekable();
        if non_null.peek().is_some() && non_null.all(|v| v.is_numeric()) {
            Dtype::Numeric
        } else {
            Dtype::Categorical
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Dtype::Numeric => "numeric",
            Dtype::Categorical => "categorical",
        }
    }
}

impl fmt::Display for Dtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dtype {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "numeric" => Ok(Dtype::Numeric),
            "categorical" => Ok(Dtype::Categorical),
            other => Err(format!("unknown dtype `{other}`")),
        }
    }
}

// ---------------------------------------------------------------------------
// ColumnProfile – derived per visualization pass
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnProfile {
    pub name: String,
    pub dtype: Dtype,
    /// Number of distinct non-null values.
    pub distinct: usize,
}

impl ColumnProfile {
    pub fn of(column: &Column) -> Self {
        ColumnProfile {
            name: column.name.clone(),
            dtype: Dtype::classify(column),
            distinct: column.unique_values().len(),
        }
    }
}
