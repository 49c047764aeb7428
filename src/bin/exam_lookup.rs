//! Exam Lookup - command-line access to published exam results
//!
//! Looks up a single student by exam number or prints the top students,
//! using the same dataset source and settings as the windowed app.

use anyhow::Result;
use clap::{Parser, Subcommand};
use exam_results::clock::format_full_datetime;
use exam_results::config::Settings;
use exam_results::leaderboard::{render, LeaderboardView};
use exam_results::loader::{DatasetLoader, DatasetSource};
use exam_results::panel::DetailPanel;
use exam_results::print::render_slip;
use exam_results::search::{apply, submit, FeedbackKind};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "exam-lookup")]
#[command(about = "Look up exam results and top students from a published dataset")]
struct Cli {
    /// Dataset URL or file path (overrides the config file)
    #[arg(short, long, env = "EXAM_RESULTS_SOURCE")]
    source: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the result for one exam number
    Lookup {
        /// Exam number to look up
        exam_number: String,
    },

    /// Show the top students by total score
    Top {
        /// Number of students to show (default from config)
        #[arg(short = 'n', long)]
        count: Option<usize>,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let settings = Settings::load_or_default();
    let source = cli.source.unwrap_or_else(|| settings.dataset_source.clone());
    let loader = DatasetLoader::from_source(DatasetSource::parse(&source));

    match cli.command {
        Commands::Lookup { exam_number } => {
            let outcome = submit(&exam_number, &loader);
            let mut panel = DetailPanel::new(settings.fail_keyword.as_str());
            let stamp = format_full_datetime(&chrono::Local::now());
            let feedback = apply(&outcome, &mut panel, stamp, Instant::now());

            if feedback.kind == FeedbackKind::Error {
                anyhow::bail!("{}", feedback.message);
            }
            print!("{}", render_slip(panel.view(), panel.stamp())?);
            if panel.view().status_fail {
                println!("(failed)");
            }
        }
        Commands::Top { count } => {
            let limit = count.unwrap_or(settings.leaderboard_size);
            let dataset = loader.ensure_loaded()?.dataset;
            match render(&dataset, limit) {
                LeaderboardView::Cards(cards) => {
                    println!(
                        "{:>4}  {:<10} {:<28} {:>10}  {:<14} {}",
                        "Rank", "Exam #", "Name", "Total", "Evaluation", "Department"
                    );
                    println!("{}", "-".repeat(84));
                    for card in cards {
                        println!(
                            "{:>4}  {:<10} {:<28} {:>10}  {:<14} {}",
                            format!("#{}", card.rank),
                            card.exam_number,
                            card.name,
                            card.total,
                            card.evaluation,
                            card.department
                        );
                    }
                }
                other => {
                    println!("{}", other.fallback_text().unwrap_or(""));
                }
            }
        }
    }

    Ok(())
}
