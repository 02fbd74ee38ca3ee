//! CSV snapshot provider.
//!
//! Expected header: `student_id,gpa,attendance_rate,activity_count`. Empty
//! `gpa` or `attendance_rate` cells are treated as missing; an empty
//! `activity_count` means the student has no activity records.

use std::io::Read;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use tracing::info;

use crate::error::RiskError;
use crate::models::StudentSnapshot;

#[derive(Debug, Deserialize)]
struct CsvRow {
    student_id: String,
    gpa: Option<f64>,
    attendance_rate: Option<f64>,
    activity_count: Option<i64>,
}

pub fn activity_count_from(raw: i64) -> Result<u32, RiskError> {
    u32::try_from(raw)
        .map_err(|_| RiskError::invalid("activity_count", raw, "must be a non-negative count"))
}

pub fn read_snapshots<R: Read>(input: R) -> anyhow::Result<Vec<StudentSnapshot>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(input);
    let mut snapshots = Vec::new();

    for (index, result) in reader.deserialize::<CsvRow>().enumerate() {
        // Header is line 1.
        let line = index + 2;
        let row = result.with_context(|| format!("failed to parse snapshot on line {line}"))?;
        let activity_count = activity_count_from(row.activity_count.unwrap_or(0))
            .with_context(|| format!("student {} on line {line}", row.student_id))?;

        snapshots.push(StudentSnapshot {
            student_id: row.student_id,
            gpa: row.gpa,
            attendance_rate: row.attendance_rate,
            activity_count,
        });
    }

    Ok(snapshots)
}

pub fn read_snapshots_path(path: &Path) -> anyhow::Result<Vec<StudentSnapshot>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let snapshots = read_snapshots(file)?;
    info!(count = snapshots.len(), path = %path.display(), "loaded snapshots from CSV");
    Ok(snapshots)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_complete_rows() {
        let data = "student_id,gpa,attendance_rate,activity_count\nS-1,3.45,92,1\nS-2,2.13,68,0\n";
        let snapshots = read_snapshots(data.as_bytes()).unwrap();
        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[0], StudentSnapshot::new("S-1", 3.45, 92.0, 1));
        assert_eq!(snapshots[1], StudentSnapshot::new("S-2", 2.13, 68.0, 0));
    }

    #[test]
    fn empty_cells_map_to_missing_or_zero() {
        let data = "student_id,gpa,attendance_rate,activity_count\nS-3,,88.5,\n";
        let snapshots = read_snapshots(data.as_bytes()).unwrap();
        assert_eq!(snapshots[0].gpa, None);
        assert_eq!(snapshots[0].attendance_rate, Some(88.5));
        assert_eq!(snapshots[0].activity_count, 0);
    }

    #[test]
    fn ignores_extra_columns() {
        let data = "student_id,full_name,gpa,attendance_rate,activity_count\n\
                    S-4,Avery Lee,3.1,97,2\n";
        let snapshots = read_snapshots(data.as_bytes()).unwrap();
        assert_eq!(snapshots[0], StudentSnapshot::new("S-4", 3.1, 97.0, 2));
    }

    #[test]
    fn rejects_negative_activity_count() {
        let data = "student_id,gpa,attendance_rate,activity_count\nS-5,3.0,90,-1\n";
        let err = read_snapshots(data.as_bytes()).unwrap_err();
        let risk = err.downcast_ref::<RiskError>().expect("risk error in chain");
        assert!(risk.is_invalid_input());
    }

    #[test]
    fn reports_line_of_malformed_row() {
        let data = "student_id,gpa,attendance_rate,activity_count\nS-6,3.0,90,1\nS-7,abc,90,1\n";
        let err = read_snapshots(data.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("line 3"));
    }
}
