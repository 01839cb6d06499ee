//! Category selection for grouped export runs.
//!
//! A run either exports every product with stock ([`CategorySelector::None`])
//! or only the products inside one of two configured category subtrees. The
//! subtree itself is resolved by the ERP; this crate only maps a selector to
//! its root category id.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::stock::CategoryId;
use crate::ConfigError;

/// Which category subtree a run is restricted to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategorySelector {
    #[default]
    None,
    A,
    B,
}

impl fmt::Display for CategorySelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategorySelector::None => write!(f, "none"),
            CategorySelector::A => write!(f, "a"),
            CategorySelector::B => write!(f, "b"),
        }
    }
}

impl FromStr for CategorySelector {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(CategorySelector::None),
            "a" => Ok(CategorySelector::A),
            "b" => Ok(CategorySelector::B),
            other => Err(format!("unknown category selector '{other}' (expected none, a or b)")),
        }
    }
}

/// Root category ids for the `A` and `B` selectors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryRoots {
    pub a: Option<CategoryId>,
    pub b: Option<CategoryId>,
}

impl CategoryRoots {
    /// Returns the root category for `selector`, or `None` when the selector
    /// does not filter.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingCategoryRoot`] when `selector` asks for a
    /// subtree whose root id was never configured.
    pub fn root_for(&self, selector: CategorySelector) -> Result<Option<CategoryId>, ConfigError> {
        match selector {
            CategorySelector::None => Ok(None),
            CategorySelector::A => self
                .a
                .map(Some)
                .ok_or(ConfigError::MissingCategoryRoot(selector)),
            CategorySelector::B => self
                .b
                .map(Some)
                .ok_or(ConfigError::MissingCategoryRoot(selector)),
        }
    }
}
