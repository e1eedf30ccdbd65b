pub mod core_types;
pub mod error;

pub mod expectation;
pub mod fact_map;
pub mod matcher;
pub mod platform;
pub mod report;

pub mod config;
pub mod constants;
pub mod shutdown;
pub mod telemetry;

pub use constants::*;

pub mod types {
    pub use crate::core_types::{RunId, TargetDescriptor, TargetId};
    pub use crate::expectation::{Expectation, ExpectationTable, FactPath, Section};
    pub use crate::fact_map::FactMap;
    pub use crate::matcher::{FactPattern, Matcher};
    pub use crate::platform::{CpuFamily, OsVersion, PlatformClassifier, PlatformParams};
    pub use crate::report::{
        EvaluationResult, Outcome, Report, Summary, TargetReport, TargetSummary,
    };
}
