//! Command-line arguments and resolved runtime settings.
//!
//! Every global flag has an environment fallback so the binary can be driven
//! from scripts without repeating paths.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

const DEFAULT_DATABASE: &str = "./data/carpas.db";
const LOG_DIR_NAME: &str = "logs";

/// CARPAS - college academic records and performance analysis
#[derive(Parser, Debug)]
#[command(name = "carpas")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// SQLite database file
    #[arg(long, global = true, env = "CARPAS_DATABASE", default_value = DEFAULT_DATABASE)]
    pub database: PathBuf,

    /// Directory for rolling log files [default: <database dir>/logs]
    #[arg(long, global = true, env = "CARPAS_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// trace|debug|info|warn|error [default: debug in debug builds, info otherwise]
    #[arg(long, global = true, env = "CARPAS_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Log every executed SQL statement at debug level
    #[arg(long, global = true, env = "CARPAS_SQL_ECHO")]
    pub sql_echo: bool,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create or upgrade the store and report repaired duplicates
    Init,

    /// Load deterministic demo data
    Seed {
        /// Delete every record before seeding
        #[arg(long)]
        reset: bool,

        /// Random seed for the generated data
        #[arg(long, default_value_t = 42)]
        rng_seed: u64,
    },

    /// List students by roll number
    Students,

    /// List courses by code
    Courses,

    /// List enrollments, newest first
    Enrollments,

    /// Performance reports
    Report {
        #[command(subcommand)]
        report: ReportCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum ReportCommand {
    /// Attendance and marks per enrollment of one student
    Student {
        /// Roll number of the student
        roll_no: String,
    },

    /// Class averages of one course
    Course {
        /// Course code (case-insensitive)
        code: String,
    },

    /// Enrollments below the attendance or marks threshold
    AtRisk {
        /// Attendance threshold in percent
        #[arg(long, default_value_t = 75.0)]
        attendance: f64,

        /// Marks threshold in percent
        #[arg(long, default_value_t = 40.0)]
        marks: f64,
    },
}

/// Global flags with defaults applied and paths made absolute.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub database: PathBuf,
    pub log_dir: PathBuf,
    pub log_level: String,
    pub sql_echo: bool,
    pub json: bool,
}

impl Cli {
    pub fn settings(&self) -> Result<Settings> {
        let cwd = std::env::current_dir().context("cannot resolve current directory")?;
        Ok(self.settings_relative_to(&cwd))
    }

    fn settings_relative_to(&self, cwd: &Path) -> Settings {
        let database = absolute(cwd, &self.database);
        let log_dir = match &self.log_dir {
            Some(dir) => absolute(cwd, dir),
            None => database
                .parent()
                .map(|parent| parent.join(LOG_DIR_NAME))
                .unwrap_or_else(|| cwd.join(LOG_DIR_NAME)),
        };
        let log_level = self
            .log_level
            .clone()
            .unwrap_or_else(|| carpas_core::default_log_level().to_string());

        Settings {
            database,
            log_dir,
            log_level,
            sql_echo: self.sql_echo,
            json: self.json,
        }
    }
}

fn absolute(cwd: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}
