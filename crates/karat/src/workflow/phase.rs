//! Coarse workflow phases and their display metadata.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::WorkflowError;

/// Workflow stage a job is in, derived from its status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum JobPhase {
    Stone,
    Diamond,
    Manufacturer,
    Qc,
    Complete,
}

impl JobPhase {
    /// Every phase, in the order a job moves through them.
    pub const ALL: [JobPhase; 5] = [
        JobPhase::Stone,
        JobPhase::Diamond,
        JobPhase::Manufacturer,
        JobPhase::Qc,
        JobPhase::Complete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobPhase::Stone => "stone",
            JobPhase::Diamond => "diamond",
            JobPhase::Manufacturer => "manufacturer",
            JobPhase::Qc => "qc",
            JobPhase::Complete => "complete",
        }
    }

    /// URL path segment of the screen handling this phase.
    pub fn route_segment(&self) -> &'static str {
        match self {
            JobPhase::Stone => "stone-selection",
            JobPhase::Diamond => "diamond-selection",
            JobPhase::Manufacturer => "manufacturer",
            JobPhase::Qc => "quality-check",
            JobPhase::Complete => "complete",
        }
    }

    /// Zero-based position in [`JobPhase::ALL`].
    pub fn index(&self) -> usize {
        match self {
            JobPhase::Stone => 0,
            JobPhase::Diamond => 1,
            JobPhase::Manufacturer => 2,
            JobPhase::Qc => 3,
            JobPhase::Complete => 4,
        }
    }
}

impl fmt::Display for JobPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for JobPhase {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "stone" => Ok(JobPhase::Stone),
            "diamond" => Ok(JobPhase::Diamond),
            "manufacturer" => Ok(JobPhase::Manufacturer),
            "qc" => Ok(JobPhase::Qc),
            "complete" => Ok(JobPhase::Complete),
            _ => Err(WorkflowError::UnknownPhase(s.to_string())),
        }
    }
}

/// Display metadata for a phase, consumed by progress displays.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct PhaseInfo {
    pub label: &'static str,
    pub description: &'static str,
    pub color: &'static str,
}

const STONE_INFO: PhaseInfo = PhaseInfo {
    label: "Stone Selection",
    description: "Select and allocate colored stones from lots",
    color: "#3b82f6",
};

const DIAMOND_INFO: PhaseInfo = PhaseInfo {
    label: "Diamond Selection",
    description: "Select and allocate diamonds from lots",
    color: "#8b5cf6",
};

const MANUFACTURER_INFO: PhaseInfo = PhaseInfo {
    label: "Manufacturing",
    description: "Piece is with the manufacturer",
    color: "#f59e0b",
};

const QC_INFO: PhaseInfo = PhaseInfo {
    label: "Quality Check",
    description: "Inspect the finished piece",
    color: "#06b6d4",
};

const COMPLETE_INFO: PhaseInfo = PhaseInfo {
    label: "Complete",
    description: "Job finished",
    color: "#22c55e",
};

/// Returns the display metadata of `phase`.
pub fn phase_info(phase: JobPhase) -> &'static PhaseInfo {
    match phase {
        JobPhase::Stone => &STONE_INFO,
        JobPhase::Diamond => &DIAMOND_INFO,
        JobPhase::Manufacturer => &MANUFACTURER_INFO,
        JobPhase::Qc => &QC_INFO,
        JobPhase::Complete => &COMPLETE_INFO,
    }
}
