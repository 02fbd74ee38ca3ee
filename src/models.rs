use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::RiskError;

pub const GPA_MAX: f64 = 4.0;
pub const ATTENDANCE_MAX: f64 = 100.0;

/// One student's metrics for a single reporting period, as supplied by a
/// snapshot provider. `None` means the provider had no data for the field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentSnapshot {
    pub student_id: String,
    pub gpa: Option<f64>,
    pub attendance_rate: Option<f64>,
    pub activity_count: u32,
}

impl StudentSnapshot {
    pub fn new(
        student_id: impl Into<String>,
        gpa: f64,
        attendance_rate: f64,
        activity_count: u32,
    ) -> Self {
        Self {
            student_id: student_id.into(),
            gpa: Some(gpa),
            attendance_rate: Some(attendance_rate),
            activity_count,
        }
    }
}

/// A GPA on the 0.0-4.0 scale.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Gpa(f64);

impl Gpa {
    pub fn new(value: f64) -> Result<Self, RiskError> {
        if !value.is_finite() {
            return Err(RiskError::invalid("gpa", value, "must be a finite number"));
        }
        if value < 0.0 {
            return Err(RiskError::invalid("gpa", value, "must not be negative"));
        }
        if value > GPA_MAX {
            return Err(RiskError::invalid(
                "gpa",
                value,
                format!("exceeds the {GPA_MAX:.1} scale"),
            ));
        }
        Ok(Self(value))
    }

    pub fn required(value: Option<f64>) -> Result<Self, RiskError> {
        match value {
            Some(value) => Self::new(value),
            None => Err(RiskError::invalid("gpa", "missing", "no grades recorded for the period")),
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

/// An attendance percentage between 0 and 100.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct AttendanceRate(f64);

impl AttendanceRate {
    pub fn new(value: f64) -> Result<Self, RiskError> {
        if !value.is_finite() {
            return Err(RiskError::invalid(
                "attendance_rate",
                value,
                "must be a finite number",
            ));
        }
        if value < 0.0 {
            return Err(RiskError::invalid("attendance_rate", value, "must not be negative"));
        }
        if value > ATTENDANCE_MAX {
            return Err(RiskError::invalid(
                "attendance_rate",
                value,
                format!("exceeds {ATTENDANCE_MAX:.0} percent"),
            ));
        }
        Ok(Self(value))
    }

    pub fn required(value: Option<f64>) -> Result<Self, RiskError> {
        match value {
            Some(value) => Self::new(value),
            None => Err(RiskError::invalid(
                "attendance_rate",
                "missing",
                "no attendance recorded for the period",
            )),
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

/// Composite-score category. Variants are ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskCategory {
    #[serde(rename = "Low Risk")]
    Low,
    #[serde(rename = "Medium Risk")]
    Medium,
    #[serde(rename = "High Risk")]
    High,
    #[serde(rename = "Critical Risk")]
    Critical,
}

impl RiskCategory {
    pub const ALL: [RiskCategory; 4] = [
        RiskCategory::Low,
        RiskCategory::Medium,
        RiskCategory::High,
        RiskCategory::Critical,
    ];

    pub fn label(self) -> &'static str {
        match self {
            RiskCategory::Low => "Low Risk",
            RiskCategory::Medium => "Medium Risk",
            RiskCategory::High => "High Risk",
            RiskCategory::Critical => "Critical Risk",
        }
    }

    /// Follow-up expected for a student in this category.
    pub fn intervention(self) -> &'static str {
        match self {
            RiskCategory::Low => "Routine monitoring",
            RiskCategory::Medium => "Academic check-in",
            RiskCategory::High => "Intervention plan",
            RiskCategory::Critical => "Immediate intervention",
        }
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RiskAssessment {
    pub gpa_risk: u8,
    pub attendance_risk: u8,
    pub activity_risk: u8,
    pub composite_score: u8,
    pub risk_category: RiskCategory,
    /// `name@version` of the policy that produced this assessment.
    pub policy: String,
}

impl RiskAssessment {
    pub fn intervention(&self) -> &'static str {
        self.risk_category.intervention()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum AttendanceCategory {
    Excellent,
    Good,
    Fair,
    Poor,
    Critical,
}

impl AttendanceCategory {
    pub const ALL: [AttendanceCategory; 5] = [
        AttendanceCategory::Excellent,
        AttendanceCategory::Good,
        AttendanceCategory::Fair,
        AttendanceCategory::Poor,
        AttendanceCategory::Critical,
    ];
}

impl fmt::Display for AttendanceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AttendanceCategory::Excellent => "Excellent",
            AttendanceCategory::Good => "Good",
            AttendanceCategory::Fair => "Fair",
            AttendanceCategory::Poor => "Poor",
            AttendanceCategory::Critical => "Critical",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum PerformanceCategory {
    #[serde(rename = "High Performer")]
    HighPerformer,
    #[serde(rename = "Average Performer")]
    AveragePerformer,
    #[serde(rename = "At Risk")]
    AtRisk,
}

impl PerformanceCategory {
    pub const ALL: [PerformanceCategory; 3] = [
        PerformanceCategory::HighPerformer,
        PerformanceCategory::AveragePerformer,
        PerformanceCategory::AtRisk,
    ];
}

impl fmt::Display for PerformanceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PerformanceCategory::HighPerformer => "High Performer",
            PerformanceCategory::AveragePerformer => "Average Performer",
            PerformanceCategory::AtRisk => "At Risk",
        };
        f.write_str(label)
    }
}

/// Directly thresholded tier used for grade-level reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum RiskTier {
    Low,
    Moderate,
    High,
    Critical,
}

impl RiskTier {
    pub const ALL: [RiskTier; 4] = [
        RiskTier::Low,
        RiskTier::Moderate,
        RiskTier::High,
        RiskTier::Critical,
    ];
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RiskTier::Low => "Low",
            RiskTier::Moderate => "Moderate",
            RiskTier::High => "High",
            RiskTier::Critical => "Critical",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Semester {
    Fall,
    Spring,
    Summer,
}

impl Semester {
    pub fn as_str(self) -> &'static str {
        match self {
            Semester::Fall => "Fall",
            Semester::Spring => "Spring",
            Semester::Summer => "Summer",
        }
    }
}

impl FromStr for Semester {
    type Err = RiskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fall" => Ok(Semester::Fall),
            "spring" => Ok(Semester::Spring),
            "summer" => Ok(Semester::Summer),
            _ => Err(RiskError::invalid("semester", s, "expected Fall, Spring or Summer")),
        }
    }
}

impl fmt::Display for Semester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An academic year such as `2023-2024`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct AcademicYear {
    start: i32,
}

impl AcademicYear {
    pub fn starting(start: i32) -> Self {
        Self { start }
    }

    /// The academic year a date falls in. Years roll over on August 1st.
    pub fn containing(date: NaiveDate) -> Self {
        if date.month() >= 8 {
            Self::starting(date.year())
        } else {
            Self::starting(date.year() - 1)
        }
    }

    pub fn start(self) -> i32 {
        self.start
    }
}

impl FromStr for AcademicYear {
    type Err = RiskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            RiskError::invalid(
                "academic_year",
                s,
                "expected consecutive years like 2023-2024",
            )
        };
        let (first, second) = s.trim().split_once('-').ok_or_else(invalid)?;
        let first: i32 = first.parse().map_err(|_| invalid())?;
        let second: i32 = second.parse().map_err(|_| invalid())?;
        if second != first + 1 {
            return Err(invalid());
        }
        Ok(Self::starting(first))
    }
}

impl TryFrom<String> for AcademicYear {
    type Error = RiskError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AcademicYear> for String {
    fn from(value: AcademicYear) -> Self {
        value.to_string()
    }
}

impl fmt::Display for AcademicYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.start + 1)
    }
}

/// The window a batch of snapshots covers. `semester: None` spans the whole
/// academic year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportingPeriod {
    pub academic_year: AcademicYear,
    pub semester: Option<Semester>,
}

impl ReportingPeriod {
    pub fn new(academic_year: AcademicYear, semester: Option<Semester>) -> Self {
        Self {
            academic_year,
            semester,
        }
    }
}

impl fmt::Display for ReportingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.semester {
            Some(semester) => write!(f, "{} {}", self.academic_year, semester),
            None => write!(f, "{}", self.academic_year),
        }
    }
}

/// A validated snapshot together with its assessment and reporting tiers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredStudent {
    pub student_id: String,
    pub gpa: f64,
    pub attendance_rate: f64,
    pub activity_count: u32,
    pub assessment: RiskAssessment,
    pub attendance_category: AttendanceCategory,
    pub performance_category: PerformanceCategory,
    pub risk_tier: RiskTier,
}

#[derive(Debug)]
pub struct RejectedSnapshot {
    pub snapshot: StudentSnapshot,
    pub error: RiskError,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySummary {
    pub category: RiskCategory,
    pub count: usize,
    pub share: f64,
    pub avg_gpa: Option<f64>,
    pub avg_attendance: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttendanceBreakdown {
    pub category: AttendanceCategory,
    pub count: usize,
    pub avg_gpa: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelCount<T> {
    pub label: T,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskSummary {
    pub total: usize,
    pub categories: Vec<CategorySummary>,
    pub attendance: Vec<AttendanceBreakdown>,
    pub performance: Vec<LabelCount<PerformanceCategory>>,
    pub tiers: Vec<LabelCount<RiskTier>>,
}
