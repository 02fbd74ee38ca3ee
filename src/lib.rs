//! Student risk scoring for academic early warning.
//!
//! A snapshot of GPA, attendance and extracurricular activity is scored
//! under a [`RiskPolicy`] into bucketed sub-scores, a composite score and a
//! [`RiskCategory`]. The reporting classifications in [`classify`] threshold
//! the raw values directly and are independent of the composite score.

pub mod classify;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod policy;
pub mod risk;
pub mod source;
pub mod summary;

pub use classify::{attendance_category, grade_level_risk_tier, performance_category};
pub use error::RiskError;
pub use models::{
    AcademicYear, AttendanceRate, Gpa, ReportingPeriod, RiskAssessment, RiskCategory, ScoredStudent,
    Semester, StudentSnapshot,
};
pub use policy::{PolicyPreset, RiskPolicy};
pub use risk::{score, score_snapshots, score_snapshots_lenient};
pub use summary::summarize;
