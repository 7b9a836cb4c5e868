//! CLI entry point for the school statistics tools.
//!
//! Provides subcommands for listing catalog schools, showing one school's
//! dashboard tables, and comparing a school's exam score distribution with
//! the whole country.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use school_stats::analyzers::binner::{BinSpec, DEFAULT_BIN_WIDTH, DEFAULT_DOMAIN_MAX};
use school_stats::analyzers::jitter::JitterConfig;
use school_stats::analyzers::series::MissingReferencePolicy;
use school_stats::catalog::{School, SchoolCatalog};
use school_stats::config::Settings;
use school_stats::dashboard::{self, ExamKind, ExamView, SchoolFacts};
use school_stats::exams::{CENTRALIZED_EXAM, SchoolLevel};
use school_stats::fetch::{BasicClient, load_source};
use school_stats::geocode::{CachedGeocoder, Geocoder, NominatimClient};
use school_stats::output::{print_json, print_pretty, write_csv};
use school_stats::parser::parse_exam_csv;
use school_stats::report::{ExamSelection, build_report};
use std::ffi::OsStr;
use std::path::Path;
use tracing::{error, info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "school_stats")]
#[command(about = "Per-school education statistics and exam score comparisons", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum LevelArg {
    /// Grades 1-9
    Basic,
    /// Grades 10-12
    Secondary,
}

impl From<LevelArg> for SchoolLevel {
    fn from(level: LevelArg) -> Self {
        match level {
            LevelArg::Basic => SchoolLevel::Basic,
            LevelArg::Secondary => SchoolLevel::Secondary,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    State,
    Diagnostic,
}

impl From<KindArg> for ExamKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::State => ExamKind::State,
            KindArg::Diagnostic => ExamKind::Diagnostic,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List schools in the catalog
    Schools {
        /// School catalog JSON (defaults to SCHOOL_CATALOG_PATH)
        #[arg(short, long)]
        catalog: Option<String>,
    },
    /// Show the dashboard tables for one school
    School {
        /// School name as it appears in the catalog
        name: String,

        /// School catalog JSON (defaults to SCHOOL_CATALOG_PATH)
        #[arg(short, long)]
        catalog: Option<String>,

        /// Exam family to chart
        #[arg(short, long, value_enum)]
        kind: Option<KindArg>,

        /// Grade label, e.g. "9. klase"
        #[arg(short, long)]
        grade: Option<String>,

        /// Subject name, e.g. "Matemātika"
        #[arg(short, long)]
        subject: Option<String>,

        /// Seed for display jitter; random when omitted
        #[arg(long)]
        seed: Option<u64>,

        /// Keep years without a country value instead of failing
        #[arg(long, default_value_t = false)]
        allow_missing_reference: bool,

        /// Directory to write the tables to as CSV
        #[arg(short, long)]
        output_dir: Option<String>,
    },
    /// Compare a school's exam score distribution with the whole country
    Exams {
        /// Path or URL of the exam export CSV (defaults to EXAM_DATA_SOURCE)
        #[arg(long, value_name = "FILE_OR_URL")]
        source: Option<String>,

        /// School to analyze; lists schools when omitted
        #[arg(long)]
        school: Option<String>,

        /// School year; defaults to the latest year for the school
        #[arg(long)]
        year: Option<String>,

        /// Education level
        #[arg(long, value_enum, default_value = "secondary")]
        level: LevelArg,

        /// Exam name; lists exams when omitted
        #[arg(long)]
        exam: Option<String>,

        /// Histogram bin width in percentage points
        #[arg(long, default_value_t = DEFAULT_BIN_WIDTH)]
        bin_width: f64,

        /// CSV file to write the histogram rows to
        #[arg(short, long, default_value = "histogram.csv")]
        output: String,

        /// Skip looking up the school address on the map
        #[arg(long, default_value_t = false)]
        no_geocode: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file
    let settings = Settings::from_env();

    // Logging setup: colored stderr + JSON rolling log file
    let log_dir = Path::new(&settings.log_file)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&settings.log_file)
        .file_name()
        .unwrap_or(OsStr::new("school_stats.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Schools { catalog } => {
            let catalog = load_catalog(catalog.as_deref().unwrap_or(&settings.catalog_path))?;
            info!(total = catalog.len(), "Schools in catalog");
            for name in catalog.names() {
                info!(school = name, "School");
            }
        }
        Commands::School {
            name,
            catalog,
            kind,
            grade,
            subject,
            seed,
            allow_missing_reference,
            output_dir,
        } => {
            let catalog = load_catalog(catalog.as_deref().unwrap_or(&settings.catalog_path))?;
            let school = catalog.require(&name)?;
            let policy = if allow_missing_reference {
                MissingReferencePolicy::MarkUnplottable
            } else {
                MissingReferencePolicy::Fail
            };

            show_school(school, policy, output_dir.as_deref())?;

            match kind {
                Some(kind) => {
                    let mut rng = match seed {
                        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
                        None => ChaCha8Rng::from_entropy(),
                    };
                    show_exam(
                        school,
                        kind.into(),
                        grade.as_deref(),
                        subject.as_deref(),
                        policy,
                        &mut rng,
                        output_dir.as_deref(),
                    )?;
                }
                None => {
                    for kind in [ExamKind::State, ExamKind::Diagnostic] {
                        for grade in dashboard::exam_grades(school, kind) {
                            let subjects = dashboard::exam_subjects(school, kind, grade);
                            info!(?kind, grade, subjects = ?subjects, "Exam results available");
                        }
                    }
                }
            }
        }
        Commands::Exams {
            source,
            school,
            year,
            level,
            exam,
            bin_width,
            output,
            no_geocode,
        } => {
            let Some(source) = source.or(settings.exam_source.clone()) else {
                bail!("No exam export given; pass --source or set EXAM_DATA_SOURCE");
            };

            let client = BasicClient::new()?;
            let bytes = load_source(&client, &source).await?;
            let table = parse_exam_csv(bytes.as_slice())?.centralized();

            if table.skipped_rows() > 0 {
                warn!(skipped = table.skipped_rows(), "Some exam rows could not be read");
            }
            if table.is_empty() {
                bail!("No data available for '{CENTRALIZED_EXAM}' in {source}");
            }

            let Some(school) = school else {
                let schools = table.schools();
                info!(total = schools.len(), "Schools with centralized exam results");
                for name in schools {
                    info!(school = name, "School");
                }
                return Ok(());
            };

            if year.is_none() {
                info!(school = %school, years = ?table.years(&school), "Years with results");
            }
            let Some(year) = year.or_else(|| table.latest_year(&school).map(str::to_string)) else {
                bail!("No year data available for {school}");
            };
            let level = SchoolLevel::from(level);

            let Some(exam) = exam else {
                let exams = table.exams(&school, &year, level);
                if exams.is_empty() {
                    warn!(school = %school, year = %year, level = level.label(), "No exams for selection");
                }
                for name in exams {
                    info!(exam = %name, "Exam");
                }
                return Ok(());
            };

            let spec = BinSpec::new(bin_width, DEFAULT_DOMAIN_MAX)?;
            let selection = ExamSelection {
                school,
                year,
                level,
                exam,
            };
            let report = build_report(&table, selection, &spec)?;

            print_json(&report.school_summary)?;
            print_json(&report.country_summary)?;
            write_csv(&output, &report.histogram_rows())?;
            info!(output = %output, "Histogram written");

            match (&report.address, no_geocode) {
                (Some(address), false) => {
                    let geocoder = CachedGeocoder::new(NominatimClient::new(
                        &settings.nominatim_url,
                        &settings.user_agent,
                        settings.geocode_min_delay,
                    )?);
                    locate_school(&geocoder, address).await;
                }
                (None, _) => info!("No address on record for the selected school"),
                (_, true) => {}
            }
        }
    }

    Ok(())
}

fn load_catalog(path: &str) -> Result<SchoolCatalog> {
    let catalog = SchoolCatalog::load(path)?;
    info!(path, schools = catalog.len(), "School catalog loaded");
    Ok(catalog)
}

/// Logs the general information and wellbeing tables for `school`.
fn show_school(
    school: &School,
    policy: MissingReferencePolicy,
    output_dir: Option<&str>,
) -> Result<()> {
    let facts = SchoolFacts::from_school(school);
    print_pretty(&facts);
    print_json(&facts)?;

    let enrollment = dashboard::enrollment_rows(school)?;
    let attendance = dashboard::attendance_rows(school)?;
    let quartiles = dashboard::quartile_rows(school);
    print_json(&enrollment)?;
    print_json(&attendance)?;
    print_json(&quartiles)?;

    let satisfaction = match dashboard::satisfaction_series(school, policy) {
        Ok(points) => {
            print_json(&points)?;
            points
        }
        Err(e) => {
            warn!(error = %e, "Satisfaction series unavailable");
            Vec::new()
        }
    };

    if let Some(dir) = output_dir {
        write_csv(&format!("{dir}/enrollment.csv"), &enrollment)?;
        write_csv(&format!("{dir}/attendance.csv"), &attendance)?;
        write_csv(&format!("{dir}/quartiles.csv"), &quartiles)?;
        write_csv(&format!("{dir}/satisfaction.csv"), &satisfaction)?;
        info!(dir, "Dashboard tables written");
    }

    Ok(())
}

/// Logs one exam comparison series, or the choices left to make.
fn show_exam(
    school: &School,
    kind: ExamKind,
    grade: Option<&str>,
    subject: Option<&str>,
    policy: MissingReferencePolicy,
    rng: &mut ChaCha8Rng,
    output_dir: Option<&str>,
) -> Result<()> {
    let Some(grade) = grade else {
        info!(?kind, grades = ?dashboard::exam_grades(school, kind), "Choose a grade");
        return Ok(());
    };
    let Some(subject) = subject else {
        info!(?kind, grade, subjects = ?dashboard::exam_subjects(school, kind, grade), "Choose a subject");
        return Ok(());
    };

    let view = dashboard::exam_view(
        school,
        kind,
        grade,
        subject,
        policy,
        &JitterConfig::default(),
        rng,
    )
    .with_context(|| format!("Cannot chart {subject} for {grade}"))?;

    match view {
        ExamView::Series(points) => {
            print_json(&points)?;
            if let Some(dir) = output_dir {
                write_csv(&format!("{dir}/exam.csv"), &points)?;
            }
        }
        ExamView::Unavailable => {
            info!(grade, subject, "Exam data is not available for this school");
        }
    }

    Ok(())
}

/// Looks up `address` and logs where the school is; failures only warn.
#[tracing::instrument(skip(geocoder))]
async fn locate_school<G: Geocoder>(geocoder: &G, address: &str) {
    match geocoder.locate(address).await {
        Ok(Some(coords)) => info!(lat = coords.lat, lon = coords.lon, "School located"),
        Ok(None) => warn!("Could not place the school on the map from its address"),
        Err(e) => error!(error = %e, "Geocoding failed"),
    }
}
