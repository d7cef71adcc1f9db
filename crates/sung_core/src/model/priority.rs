//! Priority flags and the Sung Diagram region lookup.
//!
//! # Responsibility
//! - Define the three independent HIGH/LOW flags carried by every task.
//! - Map each of the 2^3 flag combinations to exactly one diagram region.
//!
//! # Invariants
//! - `PriorityFlags::region` and `SungRegion::flags` are mutual inverses.
//! - Persisted text values are `Low` / `High`.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use super::ValidationError;

/// Two-level priority used for importance, urgency and fitness.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    #[default]
    Low,
    High,
}

impl Priority {
    /// Stored and displayed form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::High => "High",
        }
    }

    pub fn is_high(self) -> bool {
        self == Self::High
    }

    fn from_bool(high: bool) -> Self {
        if high {
            Self::High
        } else {
            Self::Low
        }
    }
}

impl Display for Priority {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "high" => Ok(Self::High),
            _ => Err(ValidationError::InvalidPriority(value.to_string())),
        }
    }
}

/// The importance/urgency/fitness triple of one task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PriorityFlags {
    pub importance: Priority,
    pub urgency: Priority,
    pub fitness: Priority,
}

impl PriorityFlags {
    pub fn new(importance: Priority, urgency: Priority, fitness: Priority) -> Self {
        Self {
            importance,
            urgency,
            fitness,
        }
    }

    /// Diagram region this combination falls into.
    pub fn region(self) -> SungRegion {
        use Priority::{High, Low};
        match (self.importance, self.urgency, self.fitness) {
            (High, High, High) => SungRegion::DoNow,
            (High, High, Low) => SungRegion::ImportantUrgent,
            (High, Low, High) => SungRegion::ImportantFit,
            (Low, High, High) => SungRegion::UrgentFit,
            (High, Low, Low) => SungRegion::Important,
            (Low, High, Low) => SungRegion::Urgent,
            (Low, Low, High) => SungRegion::Fit,
            (Low, Low, Low) => SungRegion::LowPriority,
        }
    }
}

/// One of the eight areas of the three-circle diagram.
///
/// Declaration order is display order: the center first, low priority last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SungRegion {
    DoNow,
    ImportantUrgent,
    ImportantFit,
    UrgentFit,
    Important,
    Urgent,
    Fit,
    LowPriority,
}

impl SungRegion {
    pub const ALL: [SungRegion; 8] = [
        Self::DoNow,
        Self::ImportantUrgent,
        Self::ImportantFit,
        Self::UrgentFit,
        Self::Important,
        Self::Urgent,
        Self::Fit,
        Self::LowPriority,
    ];

    /// Flag combination that lands in this region.
    pub fn flags(self) -> PriorityFlags {
        let (importance, urgency, fitness) = match self {
            Self::DoNow => (true, true, true),
            Self::ImportantUrgent => (true, true, false),
            Self::ImportantFit => (true, false, true),
            Self::UrgentFit => (false, true, true),
            Self::Important => (true, false, false),
            Self::Urgent => (false, true, false),
            Self::Fit => (false, false, true),
            Self::LowPriority => (false, false, false),
        };
        PriorityFlags::new(
            Priority::from_bool(importance),
            Priority::from_bool(urgency),
            Priority::from_bool(fitness),
        )
    }

    /// Short code, e.g. `HHH` for the center.
    pub fn code(self) -> &'static str {
        match self {
            Self::DoNow => "HHH",
            Self::ImportantUrgent => "HH",
            Self::ImportantFit => "HF",
            Self::UrgentFit => "UF",
            Self::Important => "I",
            Self::Urgent => "U",
            Self::Fit => "F",
            Self::LowPriority => "LOW",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::DoNow => "Do Now",
            Self::ImportantUrgent => "Important & Urgent",
            Self::ImportantFit => "Important & Fit",
            Self::UrgentFit => "Urgent & Fit",
            Self::Important => "IMPORTANT: Plan",
            Self::Urgent => "URGENT: Delegate Next",
            Self::Fit => "FITNESS: Make Time",
            Self::LowPriority => "LOW Priority Tasks",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::DoNow => "High importance, high urgency and a good fit right now",
            Self::ImportantUrgent => "Important and urgent, but not a natural fit",
            Self::ImportantFit => "Important and a good fit, without time pressure",
            Self::UrgentFit => "Urgent and a good fit, but of limited importance",
            Self::Important => "Important only; schedule it",
            Self::Urgent => "Urgent only; hand it off where possible",
            Self::Fit => "A good fit only; make time when convenient",
            Self::LowPriority => "Low on every axis; kept outside the diagram",
        }
    }

    /// Parses a region code (case-insensitive).
    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim();
        Self::ALL
            .into_iter()
            .find(|region| region.code().eq_ignore_ascii_case(code))
    }
}

impl Display for SungRegion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
