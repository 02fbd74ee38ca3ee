//! Reporting classifications that threshold raw GPA and attendance directly.
//!
//! These are independent of the composite score and are never derived from it.

use crate::models::{AttendanceCategory, AttendanceRate, Gpa, PerformanceCategory, RiskTier};

pub fn attendance_category(rate: AttendanceRate) -> AttendanceCategory {
    let rate = rate.value();
    if rate >= 95.0 {
        AttendanceCategory::Excellent
    } else if rate >= 90.0 {
        AttendanceCategory::Good
    } else if rate >= 80.0 {
        AttendanceCategory::Fair
    } else if rate >= 70.0 {
        AttendanceCategory::Poor
    } else {
        AttendanceCategory::Critical
    }
}

pub fn performance_category(gpa: Gpa) -> PerformanceCategory {
    let gpa = gpa.value();
    if gpa >= 3.5 {
        PerformanceCategory::HighPerformer
    } else if gpa >= 2.5 {
        PerformanceCategory::AveragePerformer
    } else {
        PerformanceCategory::AtRisk
    }
}

/// Critical needs both a failing GPA and poor attendance; the lower tiers
/// trigger on either signal alone.
pub fn grade_level_risk_tier(gpa: Gpa, attendance_rate: AttendanceRate) -> RiskTier {
    let (gpa, rate) = (gpa.value(), attendance_rate.value());
    if gpa < 2.0 && rate < 75.0 {
        RiskTier::Critical
    } else if gpa < 2.5 || rate < 80.0 {
        RiskTier::High
    } else if gpa < 3.0 || rate < 85.0 {
        RiskTier::Moderate
    } else {
        RiskTier::Low
    }
}
