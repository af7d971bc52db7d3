//! Request and task categories
//!
//! Both enums are closed sets whose wire values are a contract with
//! downstream consumers. `RequestCategory` is what intake classification
//! produces; `TaskCategory` adds `detail_gathering`, which is only ever
//! assigned to tasks the refinement stage appends.

use serde::{Deserialize, Serialize};

/// Category assigned to an incoming request by the intake stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RequestCategory {
    Planning,
    ProblemSolving,
    Project,
    Event,
    #[default]
    General,
}

impl RequestCategory {
    /// All categories, in classification priority order
    pub const ALL: [RequestCategory; 5] = [
        RequestCategory::Event,
        RequestCategory::Project,
        RequestCategory::ProblemSolving,
        RequestCategory::Planning,
        RequestCategory::General,
    ];
}

impl std::fmt::Display for RequestCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Planning => write!(f, "planning"),
            Self::ProblemSolving => write!(f, "problem_solving"),
            Self::Project => write!(f, "project"),
            Self::Event => write!(f, "event"),
            Self::General => write!(f, "general"),
        }
    }
}

impl std::str::FromStr for RequestCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "planning" => Ok(Self::Planning),
            "problem_solving" => Ok(Self::ProblemSolving),
            "project" => Ok(Self::Project),
            "event" => Ok(Self::Event),
            "general" => Ok(Self::General),
            _ => Err(format!("Unknown request category: {}", s)),
        }
    }
}

/// Category carried by an individual task
///
/// Tasks created by the planning stage inherit the request category; the
/// refinement stage marks its appended slot-filling tasks as
/// `DetailGathering` so the coordinator can type their actions accordingly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskCategory {
    Planning,
    ProblemSolving,
    Project,
    Event,
    General,
    DetailGathering,
}

impl TaskCategory {
    /// Whether this task was appended by refinement to gather a missing detail
    pub fn is_detail_gathering(self) -> bool {
        matches!(self, Self::DetailGathering)
    }
}

impl From<RequestCategory> for TaskCategory {
    fn from(category: RequestCategory) -> Self {
        match category {
            RequestCategory::Planning => Self::Planning,
            RequestCategory::ProblemSolving => Self::ProblemSolving,
            RequestCategory::Project => Self::Project,
            RequestCategory::Event => Self::Event,
            RequestCategory::General => Self::General,
        }
    }
}

impl std::fmt::Display for TaskCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Planning => write!(f, "planning"),
            Self::ProblemSolving => write!(f, "problem_solving"),
            Self::Project => write!(f, "project"),
            Self::Event => write!(f, "event"),
            Self::General => write!(f, "general"),
            Self::DetailGathering => write!(f, "detail_gathering"),
        }
    }
}
