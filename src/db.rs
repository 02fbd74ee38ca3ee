//! Postgres snapshot provider.
//!
//! Reads from an existing school records schema; this crate never creates or
//! migrates tables. Expected columns:
//!
//! - `students(student_id)`
//! - `grades(student_id, grade_point, academic_year, semester)`
//! - `attendance(student_id, status, academic_year, semester)`
//! - `extracurricular_activities(student_id, academic_year, is_active)`

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use tracing::info;

use crate::models::{ReportingPeriod, StudentSnapshot};
use crate::source::activity_count_from;

const SNAPSHOT_QUERY: &str = r#"
    SELECT s.student_id::text AS student_id,
           g.gpa,
           a.attendance_rate,
           COALESCE(e.activity_count, 0) AS activity_count
    FROM students s
    LEFT JOIN (
        SELECT student_id, AVG(grade_point)::float8 AS gpa
        FROM grades
        WHERE academic_year = $1 AND ($2::text IS NULL OR semester = $2)
        GROUP BY student_id
    ) g ON g.student_id = s.student_id
    LEFT JOIN (
        SELECT student_id,
               (100.0 * COUNT(*) FILTER (WHERE status IN ('Present', 'Late')) / COUNT(*))::float8
                   AS attendance_rate
        FROM attendance
        WHERE academic_year = $1 AND ($2::text IS NULL OR semester = $2)
        GROUP BY student_id
    ) a ON a.student_id = s.student_id
    LEFT JOIN (
        SELECT student_id, COUNT(*) AS activity_count
        FROM extracurricular_activities
        WHERE academic_year = $1 AND is_active
        GROUP BY student_id
    ) e ON e.student_id = s.student_id
    WHERE g.student_id IS NOT NULL OR a.student_id IS NOT NULL
    ORDER BY s.student_id
"#;

pub async fn connect(database_url: &str) -> anyhow::Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
        .context("failed to connect to Postgres")
}

/// One snapshot per student with grades or attendance in `period`.
///
/// Students without activity rows get a count of zero; students without
/// grades or attendance rows come back with that field missing.
pub async fn fetch_snapshots(
    pool: &PgPool,
    period: &ReportingPeriod,
) -> anyhow::Result<Vec<StudentSnapshot>> {
    let rows = sqlx::query(SNAPSHOT_QUERY)
        .bind(period.academic_year.to_string())
        .bind(period.semester.map(|semester| semester.as_str()))
        .fetch_all(pool)
        .await
        .with_context(|| format!("failed to fetch snapshots for {period}"))?;

    let mut snapshots = Vec::with_capacity(rows.len());

    for row in rows {
        let student_id: String = row.try_get("student_id")?;
        let activity_count: i64 = row.try_get("activity_count")?;
        let activity_count = activity_count_from(activity_count)
            .with_context(|| format!("student {student_id}"))?;

        snapshots.push(StudentSnapshot {
            gpa: row.try_get("gpa")?,
            attendance_rate: row.try_get("attendance_rate")?,
            student_id,
            activity_count,
        });
    }

    info!(count = snapshots.len(), %period, "fetched snapshots from Postgres");
    Ok(snapshots)
}
