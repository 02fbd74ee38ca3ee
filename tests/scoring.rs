use academic_risk::models::{AttendanceCategory, PerformanceCategory, RiskTier};
use academic_risk::{
    score, score_snapshots, score_snapshots_lenient, source, summarize, PolicyPreset, RiskCategory,
    RiskPolicy, StudentSnapshot,
};

const COHORT: &str = "\
student_id,gpa,attendance_rate,activity_count
1001,3.45,92,1
1002,2.13,68,0
1003,3.91,99,4
1004,2.75,84.5,2
1005,,91,1
";

#[test]
fn scores_csv_cohort_under_policy_b() {
    let snapshots = source::read_snapshots(COHORT.as_bytes()).unwrap();
    let (scored, rejected) = score_snapshots_lenient(&snapshots, &RiskPolicy::policy_b());

    assert_eq!(rejected.len(), 1);
    assert_eq!(rejected[0].snapshot.student_id, "1005");

    let ranking: Vec<(&str, u8, RiskCategory)> = scored
        .iter()
        .map(|s| {
            (
                s.student_id.as_str(),
                s.assessment.composite_score,
                s.assessment.risk_category,
            )
        })
        .collect();
    assert_eq!(
        ranking,
        vec![
            ("1002", 10, RiskCategory::Critical),
            ("1004", 5, RiskCategory::Medium),
            ("1001", 4, RiskCategory::Medium),
            ("1003", 0, RiskCategory::Low),
        ]
    );

    let worst = &scored[0];
    assert_eq!(worst.attendance_category, AttendanceCategory::Critical);
    assert_eq!(worst.performance_category, PerformanceCategory::AtRisk);
    assert_eq!(worst.risk_tier, RiskTier::High);
}

#[test]
fn strict_batch_rejects_missing_gpa() {
    let snapshots = source::read_snapshots(COHORT.as_bytes()).unwrap();
    let err = score_snapshots(&snapshots, &RiskPolicy::policy_a()).unwrap_err();
    assert!(err.is_invalid_input());
    assert!(err.to_string().contains("1005"));
}

#[test]
fn presets_disagree_only_where_configured() {
    let snapshot = StudentSnapshot::new("1002", 2.13, 68.0, 0);
    let a = score(&snapshot, &RiskPolicy::preset(PolicyPreset::A)).unwrap();
    let b = score(&snapshot, &RiskPolicy::preset(PolicyPreset::B)).unwrap();

    assert_eq!(a.gpa_risk, b.gpa_risk);
    assert_eq!(a.attendance_risk, b.attendance_risk);
    assert_eq!(a.activity_risk, 2);
    assert_eq!(b.activity_risk, 3);
    assert_eq!(a.risk_category, RiskCategory::High);
    assert_eq!(b.risk_category, RiskCategory::Critical);
}

#[test]
fn summary_covers_scored_cohort() {
    let snapshots = source::read_snapshots(COHORT.as_bytes()).unwrap();
    let (scored, _) = score_snapshots_lenient(&snapshots, &RiskPolicy::policy_a());
    let summary = summarize(&scored);

    assert_eq!(summary.total, 4);
    let counts: Vec<usize> = summary.categories.iter().map(|c| c.count).collect();
    // Policy A has no Critical band.
    assert_eq!(counts, vec![1, 2, 1, 0]);
}

#[test]
fn custom_policy_from_json() {
    let mut strict = RiskPolicy::policy_b();
    strict.name = "strict".to_string();
    strict.version = 2;
    strict.categories.cutoffs[1].max_score = 3;
    let json = serde_json::to_string(&strict).unwrap();

    let policy = RiskPolicy::from_json(&json).unwrap();
    let assessment = score(&StudentSnapshot::new("1001", 3.45, 92.0, 1), &policy).unwrap();
    assert_eq!(assessment.composite_score, 4);
    assert_eq!(assessment.risk_category, RiskCategory::High);
    assert_eq!(assessment.policy, "strict@2");
}
