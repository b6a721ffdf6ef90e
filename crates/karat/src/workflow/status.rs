//! Fine-grained job statuses and the aggregate order statuses.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::WorkflowError;

/// Status of a single manufacturing job.
///
/// The serialized form is the human-readable label, which is also what the
/// database stores.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum JobStatus {
    #[serde(rename = "New")]
    New,
    #[serde(rename = "Bag Created")]
    BagCreated,
    #[serde(rename = "Stone Selected")]
    StoneSelected,
    #[serde(rename = "Diamond Selected")]
    DiamondSelected,
    #[serde(rename = "Sent to Manufacturer")]
    SentToManufacturer,
    #[serde(rename = "In Production")]
    InProduction,
    #[serde(rename = "Received from Manufacturer")]
    ReceivedFromManufacturer,
    #[serde(rename = "QC Passed")]
    QcPassed,
    #[serde(rename = "QC Failed")]
    QcFailed,
    #[serde(rename = "Completed")]
    Completed,
}

impl JobStatus {
    /// Every status, in workflow order.
    pub const ALL: [JobStatus; 10] = [
        JobStatus::New,
        JobStatus::BagCreated,
        JobStatus::StoneSelected,
        JobStatus::DiamondSelected,
        JobStatus::SentToManufacturer,
        JobStatus::InProduction,
        JobStatus::ReceivedFromManufacturer,
        JobStatus::QcPassed,
        JobStatus::QcFailed,
        JobStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::New => "New",
            JobStatus::BagCreated => "Bag Created",
            JobStatus::StoneSelected => "Stone Selected",
            JobStatus::DiamondSelected => "Diamond Selected",
            JobStatus::SentToManufacturer => "Sent to Manufacturer",
            JobStatus::InProduction => "In Production",
            JobStatus::ReceivedFromManufacturer => "Received from Manufacturer",
            JobStatus::QcPassed => "QC Passed",
            JobStatus::QcFailed => "QC Failed",
            JobStatus::Completed => "Completed",
        }
    }

    /// Snake-case name, an alias of the label for command-line input.
    ///
    /// Only [`JobStatus::from_key`] accepts it; stored rows must use labels.
    pub fn key(&self) -> &'static str {
        match self {
            JobStatus::New => "new",
            JobStatus::BagCreated => "bag_created",
            JobStatus::StoneSelected => "stone_selected",
            JobStatus::DiamondSelected => "diamond_selected",
            JobStatus::SentToManufacturer => "sent_to_manufacturer",
            JobStatus::InProduction => "in_production",
            JobStatus::ReceivedFromManufacturer => "received_from_manufacturer",
            JobStatus::QcPassed => "qc_passed",
            JobStatus::QcFailed => "qc_failed",
            JobStatus::Completed => "completed",
        }
    }

    pub fn from_key(key: &str) -> Option<JobStatus> {
        JobStatus::ALL.iter().find(|s| s.key() == key).copied()
    }

    /// Returns true once no further workflow action applies.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        JobStatus::ALL
            .iter()
            .find(|status| status.as_str() == trimmed)
            .copied()
            .ok_or_else(|| WorkflowError::UnmappedStatus(s.to_string()))
    }
}

/// Aggregate status of a customer order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    New,
    Pending,
    Completed,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 3] = [OrderStatus::New, OrderStatus::Pending, OrderStatus::Completed];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::New => "New",
            OrderStatus::Pending => "Pending",
            OrderStatus::Completed => "Completed",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "New" => Ok(OrderStatus::New),
            "Pending" => Ok(OrderStatus::Pending),
            "Completed" => Ok(OrderStatus::Completed),
            _ => Err(WorkflowError::UnknownOrderStatus(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_labels_parse_back() {
        for status in JobStatus::ALL {
            assert_eq!(status.as_str().parse::<JobStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_status_parse_tolerates_whitespace() {
        assert_eq!(
            "  QC Failed ".parse::<JobStatus>().unwrap(),
            JobStatus::QcFailed
        );
    }

    #[test]
    fn test_status_parse_is_case_sensitive() {
        let err = "completed".parse::<JobStatus>().unwrap_err();
        assert_eq!(err, WorkflowError::UnmappedStatus("completed".to_string()));
    }

    #[test]
    fn test_keys_are_not_labels() {
        for status in JobStatus::ALL {
            assert_eq!(JobStatus::from_key(status.key()), Some(status));
            assert!(status.key().parse::<JobStatus>().is_err());
        }
        assert_eq!(JobStatus::from_key("QC Failed"), None);
    }

    #[test]
    fn test_status_serde_uses_labels() {
        let json = serde_json::to_string(&JobStatus::SentToManufacturer).unwrap();
        assert_eq!(json, "\"Sent to Manufacturer\"");

        let parsed: JobStatus = serde_json::from_str("\"Bag Created\"").unwrap();
        assert_eq!(parsed, JobStatus::BagCreated);
    }

    #[test]
    fn test_only_completed_is_terminal() {
        let terminal: Vec<_> = JobStatus::ALL.iter().filter(|s| s.is_terminal()).collect();
        assert_eq!(terminal, vec![&JobStatus::Completed]);
    }

    #[test]
    fn test_order_status_parse() {
        assert_eq!("Pending".parse::<OrderStatus>().unwrap(), OrderStatus::Pending);
        assert!(matches!(
            "Shipped".parse::<OrderStatus>(),
            Err(WorkflowError::UnknownOrderStatus(_))
        ));
    }
}
