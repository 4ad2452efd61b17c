use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DonationType {
    Money,
    Food,
    Clothing,
    Toys,
    Books,
    Household,
    Other,
}

impl DonationType {
    pub const ALL: [DonationType; 7] = [
        DonationType::Money,
        DonationType::Food,
        DonationType::Clothing,
        DonationType::Toys,
        DonationType::Books,
        DonationType::Household,
        DonationType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DonationType::Money => "money",
            DonationType::Food => "food",
            DonationType::Clothing => "clothing",
            DonationType::Toys => "toys",
            DonationType::Books => "books",
            DonationType::Household => "household",
            DonationType::Other => "other",
        }
    }
}

impl fmt::Display for DonationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DonationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DonationType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown donation type '{}'", s))
    }
}

/// A stored donation, including the system-assigned fields
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Donation {
    pub id: i64,
    pub donor_name: String,
    pub donation_type: DonationType,
    pub quantity: f64,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Raw `donations` row as SQLite hands it back
#[derive(Debug, FromRow)]
pub(crate) struct DonationRow {
    pub id: i64,
    pub donor_name: String,
    pub donation_type: String,
    pub quantity: f64,
    pub date: String,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<DonationRow> for Donation {
    type Error = String;

    fn try_from(row: DonationRow) -> Result<Self, Self::Error> {
        Ok(Donation {
            id: row.id,
            donor_name: row.donor_name,
            donation_type: row.donation_type.parse()?,
            quantity: row.quantity,
            date: NaiveDate::parse_from_str(&row.date, DATE_FORMAT)
                .map_err(|e| format!("bad date '{}': {}", row.date, e))?,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

/// A fully validated donation that has not been stored yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewDonation {
    pub donor_name: String,
    pub donation_type: DonationType,
    pub quantity: f64,
    pub date: NaiveDate,
}

/// Partial update: `None` means "leave the stored value alone"
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DonationPatch {
    pub donor_name: Option<String>,
    pub donation_type: Option<DonationType>,
    pub quantity: Option<f64>,
    pub date: Option<NaiveDate>,
}

impl DonationPatch {
    pub fn is_empty(&self) -> bool {
        self.donor_name.is_none()
            && self.donation_type.is_none()
            && self.quantity.is_none()
            && self.date.is_none()
    }

    /// Supplied fields win; everything else is copied from `current`
    pub fn merge_onto(&self, current: &Donation) -> NewDonation {
        NewDonation {
            donor_name: self
                .donor_name
                .clone()
                .unwrap_or_else(|| current.donor_name.clone()),
            donation_type: self.donation_type.unwrap_or(current.donation_type),
            quantity: self.quantity.unwrap_or(current.quantity),
            date: self.date.unwrap_or(current.date),
        }
    }
}

/// Untrusted request body. Values stay loosely typed until validation.
///
/// JSON `null` deserializes to `None` and counts as an absent field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DonationInput {
    #[serde(default)]
    pub donor_name: Option<Value>,
    #[serde(default)]
    pub donation_type: Option<Value>,
    #[serde(default)]
    pub quantity: Option<Value>,
    #[serde(default)]
    pub date: Option<Value>,
}

impl DonationInput {
    pub fn is_empty(&self) -> bool {
        self.donor_name.is_none()
            && self.donation_type.is_none()
            && self.quantity.is_none()
            && self.date.is_none()
    }
}

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Fixed-width UTC timestamp, so string order in SQLite is time order
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| format!("bad timestamp '{}': {}", raw, e))
}
