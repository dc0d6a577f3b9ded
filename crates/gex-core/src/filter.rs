//! Exposure filter selection.
//!
//! The expiry and customer filters are closed option sets. Each value has a
//! query form (sent to the exposure endpoint) and a display label (used in
//! chart titles). Parsing accepts either form, case-insensitively.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Option expiry bucket for the exposure query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ExpiryFilter {
    /// Same-day expiration.
    #[serde(rename = "0dte", alias = "0DTE")]
    ZeroDte,
    /// Expiring within the current week.
    #[serde(rename = "weekly", alias = "Weekly")]
    Weekly,
    /// Expiring within the current month.
    #[serde(rename = "monthly", alias = "Monthly")]
    Monthly,
    /// No expiry restriction.
    #[default]
    #[serde(rename = "all", alias = "All")]
    All,
}

impl ExpiryFilter {
    /// Every selectable value, in menu order.
    pub const ALL_OPTIONS: [Self; 4] = [Self::ZeroDte, Self::Weekly, Self::Monthly, Self::All];

    /// Value sent as `expiry_filter` in the exposure query.
    pub fn query_value(&self) -> &'static str {
        match self {
            Self::ZeroDte => "0dte",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::All => "all",
        }
    }

    /// Human-readable label used in chart titles.
    pub fn label(&self) -> &'static str {
        match self {
            Self::ZeroDte => "0DTE",
            Self::Weekly => "Weekly",
            Self::Monthly => "Monthly",
            Self::All => "All",
        }
    }
}

impl fmt::Display for ExpiryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ExpiryFilter {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim();
        Self::ALL_OPTIONS
            .into_iter()
            .find(|opt| opt.query_value().eq_ignore_ascii_case(needle))
            .ok_or_else(|| CoreError::InvalidExpiry(s.to_string()))
    }
}

/// Customer segment for the exposure query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomerFilter {
    #[default]
    #[serde(alias = "All")]
    All,
    #[serde(alias = "Retail")]
    Retail,
    #[serde(alias = "Institutional")]
    Institutional,
}

impl CustomerFilter {
    pub const ALL_OPTIONS: [Self; 3] = [Self::All, Self::Retail, Self::Institutional];

    /// Value sent as `customer_filter`.
    pub fn query_value(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Retail => "retail",
            Self::Institutional => "institutional",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Retail => "Retail",
            Self::Institutional => "Institutional",
        }
    }
}

impl fmt::Display for CustomerFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CustomerFilter {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim();
        Self::ALL_OPTIONS
            .into_iter()
            .find(|opt| opt.query_value().eq_ignore_ascii_case(needle))
            .ok_or_else(|| CoreError::InvalidCustomer(s.to_string()))
    }
}

/// Current filter selection.
///
/// Copied out of the dashboard state at the start of each refresh cycle, so
/// a selection change mid-cycle only affects the next cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterSelection {
    #[serde(default)]
    pub expiry: ExpiryFilter,
    #[serde(default)]
    pub customer: CustomerFilter,
}

impl FilterSelection {
    pub fn new(expiry: ExpiryFilter, customer: CustomerFilter) -> Self {
        Self { expiry, customer }
    }

    /// Query parameters for the exposure endpoint.
    ///
    /// `customer_filter` is omitted when no customer segment is selected.
    pub fn query_pairs(&self) -> Vec<(&'static str, &'static str)> {
        let mut pairs = vec![("expiry_filter", self.expiry.query_value())];
        if self.customer != CustomerFilter::All {
            pairs.push(("customer_filter", self.customer.query_value()));
        }
        pairs
    }
}
