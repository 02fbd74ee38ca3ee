//! Runs against a live Postgres when `DATABASE_URL` is set; skipped otherwise.
//! Tables are created in a throwaway schema and dropped afterwards.

use std::time::{SystemTime, UNIX_EPOCH};

use academic_risk::{db, AcademicYear, ReportingPeriod, Semester};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

const FIXTURE: &[&str] = &[
    "CREATE TABLE students (student_id INTEGER PRIMARY KEY)",
    "CREATE TABLE grades (student_id INTEGER, grade_point NUMERIC(3, 2), \
     academic_year TEXT, semester TEXT)",
    "CREATE TABLE attendance (student_id INTEGER, status TEXT, academic_year TEXT, semester TEXT)",
    "CREATE TABLE extracurricular_activities (student_id INTEGER, academic_year TEXT, \
     is_active BOOLEAN)",
    "INSERT INTO students VALUES (1), (2), (3), (4)",
    "INSERT INTO grades VALUES \
     (1, 3.0, '2023-2024', 'Fall'), (1, 4.0, '2023-2024', 'Fall'), \
     (2, 2.0, '2023-2024', 'Fall'), (2, 4.0, '2023-2024', 'Spring'), \
     (3, 3.8, '2022-2023', 'Fall')",
    "INSERT INTO attendance VALUES \
     (1, 'Present', '2023-2024', 'Fall'), (1, 'Late', '2023-2024', 'Fall'), \
     (1, 'Absent', '2023-2024', 'Fall'), (1, 'Present', '2023-2024', 'Fall'), \
     (2, 'Present', '2023-2024', 'Fall'), \
     (4, 'Absent', '2023-2024', 'Fall'), (4, 'Present', '2023-2024', 'Fall')",
    "INSERT INTO extracurricular_activities VALUES \
     (1, '2023-2024', TRUE), (1, '2023-2024', TRUE), (1, '2023-2024', FALSE), \
     (2, '2022-2023', TRUE)",
];

async fn fixture_pool(url: &str) -> anyhow::Result<(PgPool, String)> {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH)?.as_nanos();
    let schema = format!("academic_risk_test_{}_{nanos}", std::process::id());

    // One connection so search_path sticks for every query.
    let pool = PgPoolOptions::new().max_connections(1).connect(url).await?;
    sqlx::query(&format!("CREATE SCHEMA {schema}")).execute(&pool).await?;
    sqlx::query(&format!("SET search_path TO {schema}")).execute(&pool).await?;
    for statement in FIXTURE {
        sqlx::query(statement).execute(&pool).await?;
    }
    Ok((pool, schema))
}

#[tokio::test]
async fn fetches_period_snapshots() -> anyhow::Result<()> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping");
        return Ok(());
    };
    let (pool, schema) = fixture_pool(&url).await?;
    let year = AcademicYear::starting(2023);

    let fall = db::fetch_snapshots(&pool, &ReportingPeriod::new(year, Some(Semester::Fall))).await;
    let full_year = db::fetch_snapshots(&pool, &ReportingPeriod::new(year, None)).await;
    sqlx::query(&format!("DROP SCHEMA {schema} CASCADE"))
        .execute(&pool)
        .await?;
    let (fall, full_year) = (fall?, full_year?);

    // Student 3 has no records in the period.
    let ids: Vec<&str> = fall.iter().map(|s| s.student_id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "4"]);

    // Present and Late count as attended; inactive activities do not count.
    assert_eq!(fall[0].gpa, Some(3.5));
    assert_eq!(fall[0].attendance_rate, Some(75.0));
    assert_eq!(fall[0].activity_count, 2);

    // No activity rows in the year defaults to zero.
    assert_eq!(fall[1].gpa, Some(2.0));
    assert_eq!(fall[1].attendance_rate, Some(100.0));
    assert_eq!(fall[1].activity_count, 0);

    // Attendance without grades leaves GPA missing.
    assert_eq!(fall[2].gpa, None);
    assert_eq!(fall[2].attendance_rate, Some(50.0));

    // Without a semester the Spring grade is averaged in.
    assert_eq!(full_year[1].student_id, "2");
    assert_eq!(full_year[1].gpa, Some(3.0));

    Ok(())
}
