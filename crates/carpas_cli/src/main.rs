//! `carpas` command-line entry point.
//!
//! # Responsibility
//! - Resolve settings, start logging, open the store.
//! - Dispatch one subcommand and print its result as text or JSON.
//! - Exit non-zero with a single error line on failure.

mod cli;
mod report;
mod seed;

use anyhow::{Context, Result};
use carpas_core::{init_logging, open_db_with_report, reset_store, RiskThresholds};
use clap::Parser;
use cli::{Cli, Command, ReportCommand, Settings};
use log::{debug, error, info};
use rusqlite::Connection;
use serde::Serialize;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_command module=cli status=error error={err:#}");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let settings = cli.settings()?;
    init_logging(&settings.log_level, &settings.log_dir).context("cannot start logging")?;

    if let Some(parent) = settings.database.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("cannot create {}", parent.display()))?;
    }
    let (mut conn, reconciled) = open_db_with_report(&settings.database)
        .with_context(|| format!("cannot open {}", settings.database.display()))?;
    if settings.sql_echo {
        conn.trace(Some(echo_sql as fn(&str)));
    }
    info!(
        "event=cli_command module=cli status=start command={}",
        command_name(&cli.command)
    );

    match cli.command {
        Command::Init => emit(&settings, &reconciled, report::render_reconcile),
        Command::Seed { reset, rng_seed } => {
            if reset {
                reset_store(&mut conn)?;
            }
            let counts = seed::seed_demo_data(&mut conn, rng_seed)?;
            emit(&settings, &counts, |counts| {
                format!(
                    "Demo data ready:\n- students_created: {}\n- courses_created: {}\n- enrollments_created: {}\n- attendance_set: {}\n- marks_created: {}",
                    counts.students_created,
                    counts.courses_created,
                    counts.enrollments_created,
                    counts.attendance_set,
                    counts.marks_created
                )
            })
        }
        Command::Students => {
            let students = report::list_students(&mut conn)?;
            emit(&settings, &students, |items| report::render_students(items))
        }
        Command::Courses => {
            let courses = report::list_courses(&mut conn)?;
            emit(&settings, &courses, |items| report::render_courses(items))
        }
        Command::Enrollments => {
            let enrollments = report::list_enrollments(&mut conn)?;
            emit(&settings, &enrollments, |items| {
                report::render_enrollments(items)
            })
        }
        Command::Report { report } => run_report(&settings, &mut conn, report),
    }
}

fn run_report(
    settings: &Settings,
    conn: &mut Connection,
    command: ReportCommand,
) -> Result<()> {
    match command {
        ReportCommand::Student { roll_no } => {
            let built = report::student_report(conn, &roll_no)?;
            emit(settings, &built, report::render_student_report)
        }
        ReportCommand::Course { code } => {
            let built = report::course_report(conn, &code)?;
            emit(settings, &built, report::render_course_report)
        }
        ReportCommand::AtRisk { attendance, marks } => {
            let thresholds = RiskThresholds {
                attendance_pct: attendance,
                marks_pct: marks,
            };
            let flagged = report::at_risk_report(conn, &thresholds)?;
            emit(settings, &flagged, |items| report::render_at_risk(items))
        }
    }
}

fn emit<T: Serialize>(
    settings: &Settings,
    value: &T,
    text: impl FnOnce(&T) -> String,
) -> Result<()> {
    if settings.json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", text(value).trim_end());
    }
    Ok(())
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Init => "init",
        Command::Seed { .. } => "seed",
        Command::Students => "students",
        Command::Courses => "courses",
        Command::Enrollments => "enrollments",
        Command::Report { report } => match report {
            ReportCommand::Student { .. } => "report_student",
            ReportCommand::Course { .. } => "report_course",
            ReportCommand::AtRisk { .. } => "report_at_risk",
        },
    }
}

fn echo_sql(sql: &str) {
    debug!(
        "event=sql_echo module=cli sql={}",
        sql.split_whitespace().collect::<Vec<_>>().join(" ")
    );
}
