//! Pacebias CLI - Command-line interface for race pace bias scoring

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use pacebias::core::{
    classify_run, label_horse, window_from_records, AnalyzerConfig, BiasState, PaceBiasAnalyzer,
    RaceBiasReport, WindowConfig,
};
use pacebias::data::{
    parse_date, HistoryProvider, HorseHistoryIndex, RaceIdParts, RosterData, RosterProvider,
};
use pacebias::models::{HorseOutcome, PaceLabel, RaceCard};

/// Default data files (relative to project root)
const DEFAULT_HISTORY_PATH: &str = "data/history.csv";
const DEFAULT_ROSTER_PATH: &str = "data/roster.csv";

#[derive(Parser)]
#[command(name = "pacebias")]
#[command(author, version, about = "Race pace bias scoring CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Past race history CSV
    #[arg(long, env = "PACEBIAS_HISTORY", default_value = DEFAULT_HISTORY_PATH, global = true)]
    history: PathBuf,

    /// Race roster CSV
    #[arg(long, env = "PACEBIAS_ROSTER", default_value = DEFAULT_ROSTER_PATH, global = true)]
    roster: PathBuf,

    /// Horses whose history is read concurrently
    #[arg(short, long, default_value = "1", global = true)]
    jobs: usize,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a single race
    Score {
        /// Race id (YYYY + venue + kai + nichi + race)
        #[arg(short, long)]
        race: String,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Score every race of a date
    Day {
        /// Race date (YYYYMMDD format)
        #[arg(short, long, value_parser = parse_date_arg)]
        date: NaiveDate,

        /// Print the reports as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the look-back window behind one horse's label
    Horse {
        /// Horse id
        #[arg(long)]
        horse: String,

        /// Date of the target race (YYYYMMDD format)
        #[arg(short, long, value_parser = parse_date_arg)]
        date: NaiveDate,
    },

    /// List races for a date
    List {
        /// Race date (YYYYMMDD format)
        #[arg(short, long, value_parser = parse_date_arg)]
        date: NaiveDate,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so --json output stays clean
    let subscriber = FmtSubscriber::builder()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    let config = AnalyzerConfig {
        max_concurrency: cli.jobs.max(1),
        ..Default::default()
    };

    match cli.command {
        Commands::Score { race, json } => {
            score_race(&cli.history, &cli.roster, config, &race, json)?;
        }
        Commands::Day { date, json } => {
            score_day(&cli.history, &cli.roster, config, date, json)?;
        }
        Commands::Horse { horse, date } => {
            show_horse(&cli.history, &config.window, &horse, date)?;
        }
        Commands::List { date } => {
            list_races(&cli.roster, date)?;
        }
    }

    Ok(())
}

fn parse_date_arg(raw: &str) -> std::result::Result<NaiveDate, String> {
    parse_date(raw).ok_or_else(|| format!("invalid date {:?}, expected YYYYMMDD", raw))
}

fn load_history(path: &Path) -> Result<HorseHistoryIndex> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message("Loading race history...");

    let history = HorseHistoryIndex::load(path)
        .with_context(|| format!("Failed to load history from {:?}", path))?;

    pb.finish_and_clear();
    Ok(history)
}

fn load_roster(path: &Path) -> Result<RosterData> {
    RosterData::load(path).with_context(|| format!("Failed to load roster from {:?}", path))
}

fn score_race(
    history_path: &Path,
    roster_path: &Path,
    config: AnalyzerConfig,
    race_id: &str,
    json: bool,
) -> Result<()> {
    let roster = load_roster(roster_path)?;
    let Some(card) = roster.race(race_id) else {
        bail!("Race {} not found in {:?}", race_id, roster_path);
    };

    let analyzer = PaceBiasAnalyzer::new(load_history(history_path)?, config);
    let report = analyzer.analyze_race(&card);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        if let Some(parts) = RaceIdParts::parse(&card.race_id) {
            println!("{}: {} ({})", "Scoring".green(), parts.long_label(), card.date);
            println!();
        }
        print_report(&card, &report);
    }
    Ok(())
}

fn score_day(
    history_path: &Path,
    roster_path: &Path,
    config: AnalyzerConfig,
    date: NaiveDate,
    json: bool,
) -> Result<()> {
    let roster = load_roster(roster_path)?;
    let cards = roster.races_on(date);
    if cards.is_empty() {
        println!("{}", "No races found for this date.".yellow());
        return Ok(());
    }

    let analyzer = PaceBiasAnalyzer::new(load_history(history_path)?, config);

    let pb = ProgressBar::new(cards.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let mut reports = Vec::with_capacity(cards.len());
    for card in &cards {
        pb.set_message(card.race_id.clone());
        reports.push(analyzer.analyze_race(card));
        pb.inc(1);
    }
    pb.finish_and_clear();

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    println!("{}: {}", "Pace bias for".green(), date);
    println!();

    // Bias races first, lowest score first
    let mut bias_races: Vec<(&RaceCard, &RaceBiasReport)> = cards
        .iter()
        .zip(&reports)
        .filter(|(_, r)| r.score.state == BiasState::BiasPresent)
        .collect();
    bias_races.sort_by(|a, b| a.1.score.score.total_cmp(&b.1.score.score));

    println!("{}", "Bias races:".yellow().bold());
    if bias_races.is_empty() {
        println!("  {}", "none".dimmed());
    }
    for (card, report) in &bias_races {
        println!(
            "  {} {:<22} {:>6.1}  {}",
            report.score.pace_mark().unwrap_or(" "),
            race_title(card),
            report.score.score,
            card.race_name
        );
    }
    println!();

    for (card, report) in cards.iter().zip(&reports) {
        print_report(card, report);
    }

    let invalid = reports
        .iter()
        .filter(|r| r.score.state == BiasState::Invalid)
        .count();
    println!(
        "{} races, {} with bias, {} invalid",
        reports.len(),
        bias_races.len(),
        invalid
    );
    Ok(())
}

fn show_horse(history_path: &Path, window: &WindowConfig, horse_id: &str, date: NaiveDate) -> Result<()> {
    let history = load_history(history_path)?;
    let records = history
        .fetch_history(horse_id, date, window.effective_fetch_limit())
        .with_context(|| format!("Failed to read history for {}", horse_id))?;

    println!("{}: {} before {}", "Horse".green(), horse_id, date);
    println!();

    if records.is_empty() {
        println!("{}", "No past races found.".yellow());
    } else {
        println!("{:<12} {:<14} {:>6} {:>10}", "date", "passage", "front", "prominent");
        println!("{}", "-".repeat(46));
    }

    let mut counted = 0;
    for record in &records {
        let passage = record.corners.to_passage();
        match classify_run(&record.corners.present()) {
            Some(facts) if counted < window.qualifying_limit => {
                counted += 1;
                println!(
                    "{:<12} {:<14} {:>6} {:>10}",
                    record.date.to_string(),
                    passage,
                    yes_no(facts.is_front_runner),
                    yes_no(facts.stayed_prominent)
                );
            }
            Some(_) => {
                println!(
                    "{:<12} {:<14} {}",
                    record.date.to_string().dimmed(),
                    passage.dimmed(),
                    "outside window".dimmed()
                );
            }
            None => {
                println!(
                    "{:<12} {:<14} {}",
                    record.date.to_string().dimmed(),
                    "-".dimmed(),
                    "no corner data, skipped".dimmed()
                );
            }
        }
    }
    println!();

    let label = label_horse(horse_id, &window_from_records(&records, date, window));
    println!(
        "{} {} ({}) front={} prominent={} considered={}",
        "Label:".yellow().bold(),
        colored_label(label.label),
        label.label.description(),
        label.front_runner_count,
        label.prominent_count,
        label.considered
    );
    Ok(())
}

fn list_races(roster_path: &Path, date: NaiveDate) -> Result<()> {
    println!("{}: {}", "Listing races for".green(), date);
    println!();

    let roster = load_roster(roster_path)?;
    let cards = roster.races_on(date);

    if cards.is_empty() {
        println!("{}", "No races found for this date.".yellow());
        if let (Some(first), Some(last)) = (roster.dates().first(), roster.dates().last()) {
            println!("{}", format!("Roster covers {} to {}", first, last).dimmed());
        }
        return Ok(());
    }

    println!("{:<14} {:<22} {:>6}  {}", "race_id", "race", "runners", "name");
    println!("{}", "-".repeat(60));
    for card in &cards {
        println!(
            "{:<14} {:<22} {:>6}  {}",
            card.race_id,
            race_title(card),
            card.entries.len(),
            truncate_name(&card.race_name, 20)
        );
    }
    println!();
    println!("Total: {} races", cards.len());
    Ok(())
}

fn print_report(card: &RaceCard, report: &RaceBiasReport) {
    let state = match report.score.state {
        BiasState::BiasPresent => report.score.state.as_str().red().bold(),
        BiasState::None => report.score.state.as_str().normal(),
        BiasState::Invalid => report.score.state.as_str().dimmed(),
    };

    println!(
        "{} {} {}",
        race_title(card).cyan().bold(),
        card.race_name,
        report.score.pace_mark().unwrap_or("")
    );
    println!(
        "  score {:.1}  {}  A={} B={} C={}",
        report.score.score, state, report.score.a, report.score.b, report.score.c
    );

    for label in [PaceLabel::Front, PaceLabel::Prominent, PaceLabel::Partial] {
        let horses = report.horses_with_label(label);
        if horses.is_empty() {
            continue;
        }
        let names: Vec<&str> = horses.iter().map(|h| card.horse_name(&h.horse_id)).collect();
        println!("  {} {}", colored_label(label), names.join(", "));
    }

    for outcome in &report.horses {
        if let HorseOutcome::Unknown { horse_id, reason } = outcome {
            println!(
                "  {} {}: {}",
                "?".red(),
                card.horse_name(horse_id),
                reason.dimmed()
            );
        }
    }
    println!();
}

/// "東京 11R" style title, or the raw id when it does not parse
fn race_title(card: &RaceCard) -> String {
    RaceIdParts::parse(&card.race_id)
        .map(|p| p.short_label())
        .unwrap_or_else(|| card.race_id.clone())
}

fn colored_label(label: PaceLabel) -> colored::ColoredString {
    match label {
        PaceLabel::Front => label.code().red().bold(),
        PaceLabel::Prominent => label.code().yellow().bold(),
        PaceLabel::Partial => label.code().green(),
        PaceLabel::NoSignal => label.code().dimmed(),
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "-"
    }
}

/// Truncate name to fit display width
fn truncate_name(name: &str, max_len: usize) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= max_len {
        name.to_string()
    } else {
        chars[..max_len - 1].iter().collect::<String>() + "…"
    }
}
