use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{format_timestamp, parse_timestamp};
use crate::db::lot_repo::LotRow;
use crate::error::KaratError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LotKind {
    Stone,
    Diamond,
}

impl LotKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LotKind::Stone => "stone",
            LotKind::Diamond => "diamond",
        }
    }
}

impl fmt::Display for LotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for LotKind {
    type Err = KaratError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "stone" => Ok(LotKind::Stone),
            "diamond" => Ok(LotKind::Diamond),
            other => Err(KaratError::InvalidInput(format!(
                "unknown lot kind '{}'",
                other
            ))),
        }
    }
}

/// A received batch of stones or diamonds.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Lot {
    pub id: String,
    pub display_id: String,
    pub kind: LotKind,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
    pub total_quantity: i64,
    pub available_quantity: i64,
    pub total_weight_ct: f64,
    pub available_weight_ct: f64,
    pub received_at: DateTime<Utc>,
}

impl Lot {
    pub fn from_row(row: &LotRow) -> Result<Self, KaratError> {
        Ok(Self {
            id: row.id.clone(),
            display_id: row.display_id.clone(),
            kind: row.kind.parse()?,
            description: row.description.clone(),
            supplier: row.supplier.clone(),
            total_quantity: row.total_quantity,
            available_quantity: row.available_quantity,
            total_weight_ct: row.total_weight_ct,
            available_weight_ct: row.available_weight_ct,
            received_at: parse_timestamp(&row.received_at),
        })
    }

    pub fn to_row(&self) -> LotRow {
        LotRow {
            id: self.id.clone(),
            display_id: self.display_id.clone(),
            kind: self.kind.to_string(),
            description: self.description.clone(),
            supplier: self.supplier.clone(),
            total_quantity: self.total_quantity,
            available_quantity: self.available_quantity,
            total_weight_ct: self.total_weight_ct,
            available_weight_ct: self.available_weight_ct,
            received_at: format_timestamp(self.received_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parse() {
        assert_eq!("diamond".parse::<LotKind>().unwrap(), LotKind::Diamond);
        assert!("pearl".parse::<LotKind>().is_err());
    }

    #[test]
    fn test_from_row() {
        let mut row = LotRow {
            id: "l1".into(),
            display_id: "LOT-0001".into(),
            kind: "stone".into(),
            description: String::new(),
            supplier: None,
            total_quantity: 8,
            available_quantity: 6,
            total_weight_ct: 4.0,
            available_weight_ct: 3.0,
            received_at: "2026-01-01T00:00:00+00:00".into(),
        };
        let lot = Lot::from_row(&row).unwrap();
        assert_eq!(lot.kind, LotKind::Stone);
        assert_eq!(lot.available_quantity, 6);
        assert_eq!(lot.to_row().kind, "stone");

        row.kind = "pearl".into();
        assert!(Lot::from_row(&row).is_err());
    }
}
