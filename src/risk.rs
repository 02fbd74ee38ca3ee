use std::cmp::Ordering;

use tracing::{debug, warn};

use crate::classify::{attendance_category, grade_level_risk_tier, performance_category};
use crate::error::RiskError;
use crate::models::{
    AttendanceRate, Gpa, RejectedSnapshot, RiskAssessment, ScoredStudent, StudentSnapshot,
};
use crate::policy::RiskPolicy;

/// Score a single snapshot under `policy`.
///
/// Missing or out-of-domain GPA and attendance values are rejected with
/// [`RiskError::InvalidInput`]; nothing is clamped. A policy whose sub-scores
/// cannot be summed into a `u8` is rejected with [`RiskError::InvalidPolicy`].
pub fn score(
    snapshot: &StudentSnapshot,
    policy: &RiskPolicy,
) -> Result<RiskAssessment, RiskError> {
    let gpa = Gpa::required(snapshot.gpa)?;
    let attendance = AttendanceRate::required(snapshot.attendance_rate)?;
    assess(gpa, attendance, snapshot.activity_count, policy)
}

fn assess(
    gpa: Gpa,
    attendance: AttendanceRate,
    activity_count: u32,
    policy: &RiskPolicy,
) -> Result<RiskAssessment, RiskError> {
    let gpa_risk = policy.gpa.score(gpa.value());
    let attendance_risk = policy.attendance.score(attendance.value());
    let activity_risk = policy.activity.score(activity_count);
    let composite_score = gpa_risk
        .checked_add(attendance_risk)
        .and_then(|sum| sum.checked_add(activity_risk))
        .ok_or_else(|| {
            RiskError::InvalidPolicy(format!(
                "{} sub-scores {gpa_risk} + {attendance_risk} + {activity_risk} exceed 255",
                policy.id()
            ))
        })?;

    Ok(RiskAssessment {
        gpa_risk,
        attendance_risk,
        activity_risk,
        composite_score,
        risk_category: policy.categories.categorize(composite_score),
        policy: policy.id(),
    })
}

fn score_student(
    snapshot: &StudentSnapshot,
    policy: &RiskPolicy,
) -> Result<ScoredStudent, RiskError> {
    let gpa = Gpa::required(snapshot.gpa)?;
    let attendance = AttendanceRate::required(snapshot.attendance_rate)?;
    let assessment = assess(gpa, attendance, snapshot.activity_count, policy)?;

    debug!(
        student_id = %snapshot.student_id,
        composite = assessment.composite_score,
        category = %assessment.risk_category,
        "scored snapshot"
    );

    Ok(ScoredStudent {
        student_id: snapshot.student_id.clone(),
        gpa: gpa.value(),
        attendance_rate: attendance.value(),
        activity_count: snapshot.activity_count,
        assessment,
        attendance_category: attendance_category(attendance),
        performance_category: performance_category(gpa),
        risk_tier: grade_level_risk_tier(gpa, attendance),
    })
}

/// Score every snapshot, stopping at the first invalid one.
///
/// Results are ranked by composite score, highest first, then by student id.
pub fn score_snapshots(
    snapshots: &[StudentSnapshot],
    policy: &RiskPolicy,
) -> Result<Vec<ScoredStudent>, RiskError> {
    let mut scored = Vec::with_capacity(snapshots.len());

    for snapshot in snapshots {
        let student = score_student(snapshot, policy).map_err(|error| RiskError::Snapshot {
            student_id: snapshot.student_id.clone(),
            source: Box::new(error),
        })?;
        scored.push(student);
    }

    rank(&mut scored);
    Ok(scored)
}

/// Score every valid snapshot and hand back the invalid ones with their errors.
pub fn score_snapshots_lenient(
    snapshots: &[StudentSnapshot],
    policy: &RiskPolicy,
) -> (Vec<ScoredStudent>, Vec<RejectedSnapshot>) {
    let mut scored = Vec::with_capacity(snapshots.len());
    let mut rejected = Vec::new();

    for snapshot in snapshots {
        match score_student(snapshot, policy) {
            Ok(student) => scored.push(student),
            Err(error) => {
                warn!(student_id = %snapshot.student_id, %error, "skipping invalid snapshot");
                rejected.push(RejectedSnapshot {
                    snapshot: snapshot.clone(),
                    error,
                });
            }
        }
    }

    rank(&mut scored);
    (scored, rejected)
}

fn rank(scored: &mut [ScoredStudent]) {
    scored.sort_by(|a, b| {
        match b.assessment.composite_score.cmp(&a.assessment.composite_score) {
            Ordering::Equal => a.student_id.cmp(&b.student_id),
            other => other,
        }
    });
}
