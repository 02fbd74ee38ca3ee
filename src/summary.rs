use std::collections::HashMap;
use std::hash::Hash;

use crate::models::{
    AttendanceBreakdown, AttendanceCategory, CategorySummary, LabelCount, PerformanceCategory,
    RiskCategory, RiskSummary, RiskTier, ScoredStudent,
};

#[derive(Default)]
struct Totals {
    count: usize,
    gpa: f64,
    attendance: f64,
}

impl Totals {
    fn add(&mut self, student: &ScoredStudent) {
        self.count += 1;
        self.gpa += student.gpa;
        self.attendance += student.attendance_rate;
    }

    fn avg_gpa(&self) -> Option<f64> {
        (self.count > 0).then(|| self.gpa / self.count as f64)
    }

    fn avg_attendance(&self) -> Option<f64> {
        (self.count > 0).then(|| self.attendance / self.count as f64)
    }
}

fn totals_by<K, F>(students: &[ScoredStudent], key: F) -> HashMap<K, Totals>
where
    K: Eq + Hash,
    F: Fn(&ScoredStudent) -> K,
{
    let mut map: HashMap<K, Totals> = HashMap::new();
    for student in students {
        map.entry(key(student)).or_default().add(student);
    }
    map
}

/// Aggregate scored students into per-category distributions.
///
/// Every category is listed in severity order, including empty ones.
pub fn summarize(students: &[ScoredStudent]) -> RiskSummary {
    let total = students.len();
    let by_category = totals_by(students, |s| s.assessment.risk_category);
    let by_attendance = totals_by(students, |s| s.attendance_category);
    let by_performance = totals_by(students, |s| s.performance_category);
    let by_tier = totals_by(students, |s| s.risk_tier);
    let empty = Totals::default();

    let categories = RiskCategory::ALL
        .iter()
        .map(|category| {
            let totals = by_category.get(category).unwrap_or(&empty);
            CategorySummary {
                category: *category,
                count: totals.count,
                share: if total == 0 {
                    0.0
                } else {
                    totals.count as f64 / total as f64
                },
                avg_gpa: totals.avg_gpa(),
                avg_attendance: totals.avg_attendance(),
            }
        })
        .collect();

    let attendance = AttendanceCategory::ALL
        .iter()
        .map(|category| {
            let totals = by_attendance.get(category).unwrap_or(&empty);
            AttendanceBreakdown {
                category: *category,
                count: totals.count,
                avg_gpa: totals.avg_gpa(),
            }
        })
        .collect();

    let performance = PerformanceCategory::ALL
        .iter()
        .map(|label| LabelCount {
            label: *label,
            count: by_performance.get(label).map_or(0, |t| t.count),
        })
        .collect();

    let tiers = RiskTier::ALL
        .iter()
        .map(|label| LabelCount {
            label: *label,
            count: by_tier.get(label).map_or(0, |t| t.count),
        })
        .collect();

    RiskSummary {
        total,
        categories,
        attendance,
        performance,
        tiers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StudentSnapshot;
    use crate::policy::RiskPolicy;
    use crate::risk::score_snapshots;

    fn scored() -> Vec<ScoredStudent> {
        let snapshots = vec![
            StudentSnapshot::new("s1", 3.9, 98.0, 3),
            StudentSnapshot::new("s2", 3.7, 96.0, 2),
            StudentSnapshot::new("s3", 2.7, 85.0, 1),
            StudentSnapshot::new("s4", 1.8, 65.0, 0),
        ];
        score_snapshots(&snapshots, &RiskPolicy::policy_b()).unwrap()
    }

    #[test]
    fn counts_every_student_once() {
        let summary = summarize(&scored());
        assert_eq!(summary.total, 4);
        assert_eq!(summary.categories.iter().map(|c| c.count).sum::<usize>(), 4);
        assert_eq!(summary.attendance.iter().map(|c| c.count).sum::<usize>(), 4);
        assert_eq!(summary.performance.iter().map(|c| c.count).sum::<usize>(), 4);
        assert_eq!(summary.tiers.iter().map(|c| c.count).sum::<usize>(), 4);
        let share: f64 = summary.categories.iter().map(|c| c.share).sum();
        assert!((share - 1.0).abs() < 1e-9);
    }

    #[test]
    fn averages_per_category() {
        let summary = summarize(&scored());
        let low = &summary.categories[0];
        assert_eq!(low.category, RiskCategory::Low);
        // s1: 0+0+0, s2: 0+0+1
        assert_eq!(low.count, 2);
        assert!((low.avg_gpa.unwrap() - 3.8).abs() < 1e-9);
        assert!((low.avg_attendance.unwrap() - 97.0).abs() < 1e-9);

        let excellent = &summary.attendance[0];
        assert_eq!(excellent.category, AttendanceCategory::Excellent);
        assert_eq!(excellent.count, 2);
    }

    #[test]
    fn empty_categories_are_listed() {
        let summary = summarize(&[]);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.categories.len(), 4);
        assert!(summary.categories.iter().all(|c| c.count == 0 && c.avg_gpa.is_none()));
        assert_eq!(summary.attendance.len(), 5);
        assert_eq!(summary.performance.len(), 3);
        assert_eq!(summary.tiers.len(), 4);
    }
}
