use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};

use academic_risk::models::{RiskSummary, StudentSnapshot};
use academic_risk::{
    attendance_category, db, grade_level_risk_tier, logging, performance_category, risk, source,
    summary, AcademicYear, AttendanceRate, Gpa, PolicyPreset, ReportingPeriod, RiskPolicy,
    ScoredStudent, Semester,
};

#[derive(Parser)]
#[command(name = "academic-risk")]
#[command(about = "Student risk scoring for academic early warning", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score students and list the highest composite risk first
    Score {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        policy: PolicyArgs,
        #[arg(long, default_value_t = 10)]
        limit: usize,
        /// Skip invalid snapshots instead of aborting
        #[arg(long)]
        skip_invalid: bool,
        #[arg(long)]
        json: bool,
    },
    /// Summarize risk distribution for a reporting period
    Summary {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        policy: PolicyArgs,
        #[arg(long)]
        skip_invalid: bool,
        #[arg(long)]
        json: bool,
    },
    /// Assess a single student from raw values
    Classify {
        #[arg(long)]
        gpa: f64,
        #[arg(long)]
        attendance: f64,
        #[arg(long, default_value_t = 0)]
        activities: u32,
        #[command(flatten)]
        policy: PolicyArgs,
        #[arg(long)]
        json: bool,
    },
    /// Print the built-in policies as JSON
    Policies,
}

#[derive(Args)]
struct SourceArgs {
    /// Academic year such as 2023-2024 (defaults to the current one)
    #[arg(long)]
    academic_year: Option<AcademicYear>,
    #[arg(long)]
    semester: Option<Semester>,
    /// Read snapshots from a CSV file instead of Postgres
    #[arg(long)]
    csv: Option<PathBuf>,
}

impl SourceArgs {
    fn period(&self) -> ReportingPeriod {
        let academic_year = self
            .academic_year
            .unwrap_or_else(|| AcademicYear::containing(Utc::now().date_naive()));
        ReportingPeriod::new(academic_year, self.semester)
    }

    async fn load(&self, period: &ReportingPeriod) -> anyhow::Result<Vec<StudentSnapshot>> {
        if let Some(path) = &self.csv {
            return source::read_snapshots_path(path);
        }

        let database_url = std::env::var("DATABASE_URL")
            .context("DATABASE_URL must be set unless --csv is given")?;
        let pool = db::connect(&database_url).await?;
        db::fetch_snapshots(&pool, period).await
    }
}

#[derive(Args)]
#[group(multiple = false)]
struct PolicyArgs {
    /// Built-in policy: a (3 categories) or b (4 categories, default)
    #[arg(long)]
    policy: Option<PolicyPreset>,
    /// JSON policy file, see `academic-risk policies` for the format
    #[arg(long)]
    policy_file: Option<PathBuf>,
}

impl PolicyArgs {
    fn load(&self) -> anyhow::Result<RiskPolicy> {
        let policy = match (&self.policy_file, self.policy) {
            (Some(path), _) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                RiskPolicy::from_json(&json)
                    .with_context(|| format!("invalid policy in {}", path.display()))?
            }
            (None, preset) => RiskPolicy::preset(preset.unwrap_or(PolicyPreset::B)),
        };
        info!(policy = %policy.id(), "using risk policy");
        Ok(policy)
    }
}

fn score_all(
    snapshots: &[StudentSnapshot],
    policy: &RiskPolicy,
    skip_invalid: bool,
) -> anyhow::Result<Vec<ScoredStudent>> {
    if !skip_invalid {
        return Ok(risk::score_snapshots(snapshots, policy)?);
    }

    let (scored, rejected) = risk::score_snapshots_lenient(snapshots, policy);
    if !rejected.is_empty() {
        warn!(skipped = rejected.len(), "invalid snapshots were skipped");
    }
    Ok(scored)
}

fn print_summary(period: &ReportingPeriod, summary: &RiskSummary) {
    println!("Risk distribution for {period} ({} students):", summary.total);
    for category in &summary.categories {
        match (category.avg_gpa, category.avg_attendance) {
            (Some(gpa), Some(attendance)) => println!(
                "- {}: {} ({:.1}%) avg GPA {:.2}, avg attendance {:.1}%",
                category.category,
                category.count,
                category.share * 100.0,
                gpa,
                attendance
            ),
            _ => println!("- {}: 0", category.category),
        }
    }

    println!();
    println!("Attendance categories:");
    for bucket in &summary.attendance {
        match bucket.avg_gpa {
            Some(gpa) => println!("- {}: {} avg GPA {:.2}", bucket.category, bucket.count, gpa),
            None => println!("- {}: 0", bucket.category),
        }
    }

    println!();
    println!("Performance categories:");
    for bucket in &summary.performance {
        println!("- {}: {}", bucket.label, bucket.count);
    }

    println!();
    println!("Risk tiers:");
    for bucket in &summary.tiers {
        println!("- {}: {}", bucket.label, bucket.count);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init("academic_risk=info");
    let cli = Cli::parse();

    match cli.command {
        Commands::Score {
            source,
            policy,
            limit,
            skip_invalid,
            json,
        } => {
            let policy = policy.load()?;
            let period = source.period();
            let snapshots = source.load(&period).await?;
            let scored = score_all(&snapshots, &policy, skip_invalid)?;
            let top = &scored[..scored.len().min(limit)];

            if json {
                println!("{}", serde_json::to_string_pretty(top)?);
                return Ok(());
            }

            if scored.is_empty() {
                println!("No students found for {period}.");
                return Ok(());
            }

            println!("Top students by composite risk ({period}, {}):", policy.id());
            for student in top {
                println!(
                    "- {} score {} {} ({}): GPA {:.2}, attendance {:.1}%, {} activities",
                    student.student_id,
                    student.assessment.composite_score,
                    student.assessment.risk_category,
                    student.assessment.intervention(),
                    student.gpa,
                    student.attendance_rate,
                    student.activity_count
                );
            }
        }
        Commands::Summary {
            source,
            policy,
            skip_invalid,
            json,
        } => {
            let policy = policy.load()?;
            let period = source.period();
            let snapshots = source.load(&period).await?;
            let scored = score_all(&snapshots, &policy, skip_invalid)?;
            let summary = summary::summarize(&scored);

            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print_summary(&period, &summary);
            }
        }
        Commands::Classify {
            gpa,
            attendance,
            activities,
            policy,
            json,
        } => {
            let policy = policy.load()?;
            let snapshot = StudentSnapshot::new("adhoc", gpa, attendance, activities);
            let assessment = risk::score(&snapshot, &policy)?;
            let (gpa, attendance) = (Gpa::new(gpa)?, AttendanceRate::new(attendance)?);

            if json {
                let value = serde_json::json!({
                    "assessment": assessment,
                    "attendance_category": attendance_category(attendance),
                    "performance_category": performance_category(gpa),
                    "risk_tier": grade_level_risk_tier(gpa, attendance),
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
                return Ok(());
            }

            println!(
                "Composite {} = GPA {} + attendance {} + activity {} under {}",
                assessment.composite_score,
                assessment.gpa_risk,
                assessment.attendance_risk,
                assessment.activity_risk,
                assessment.policy
            );
            println!(
                "Category: {} ({})",
                assessment.risk_category,
                assessment.intervention()
            );
            println!("Attendance: {}", attendance_category(attendance));
            println!("Performance: {}", performance_category(gpa));
            println!("Risk tier: {}", grade_level_risk_tier(gpa, attendance));
        }
        Commands::Policies => {
            println!("{}", serde_json::to_string_pretty(&RiskPolicy::presets())?);
        }
    }

    Ok(())
}
