//! End-to-end scoring from CSV fixtures

use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

use pacebias::core::{score_labels, AnalyzerConfig, BiasState, PaceBiasAnalyzer};
use pacebias::data::{HorseHistoryIndex, RosterData, RosterProvider};
use pacebias::models::PaceLabel;

const HISTORY_CSV: &str = "\
horse_id,date,passage
b1,20250410,3-3-3-3
b1,20250301,4-4-3-3
b1,20250201,8-8-8-8
b2,20250411,2-2-2-2
b2,20250302,3-4-4-4
b3,20250412,4-4-4-4
b3,20250303,2-3-2-2
b3,20250504,1-1-1-1
b3,20250601,1-1
n1,20250413,10-10-9-9
n1,20250304,6-5-5-5
a1,20250410,1-1-1-1
a1,20250301,2-1-1-1
a2,20250410,1-1
a2,20250301,1-1-1-1
a2,20250201,5-5-5-5
c1,20250410,3-3-3-3
c1,20250301,7-7-7-7
c2,20250410,9-9-9-9
c2,20250301,
c2,20250201,1-2-2-2
e2,20250410,
e2,20250301,0-0-0-0
";

const ROSTER_CSV: &str = "\
race_id,date,horse_id,race_name
202505020801,20250504,b1,Three Prominent
202505020801,20250504,b2,Three Prominent
202505020801,20250504,b3,Three Prominent
202505020801,20250504,n1,Three Prominent
202505020802,20250504,a1,Contested Lead
202505020802,20250504,a2,Contested Lead
202505020802,20250504,b1,Contested Lead
202505020802,20250504,n1,Contested Lead
202505020803,20250504,c1,Thin Field
202505020803,20250504,b2,Thin Field
202505020803,20250504,c2,Thin Field
202505020804,20250504,e1,Debutants
202505020804,20250504,e2,Debutants
";

fn fixture(name: &str, content: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("pacebias_{}_{}.csv", name, std::process::id()));
    fs::write(&path, content).unwrap();
    path
}

/// Fixture paths are per test; tests in this binary run in parallel
fn load(test: &str) -> (HorseHistoryIndex, RosterData) {
    let history_path = fixture(&format!("{}_history", test), HISTORY_CSV);
    let roster_path = fixture(&format!("{}_roster", test), ROSTER_CSV);
    let history = HorseHistoryIndex::load(&history_path).unwrap();
    let roster = RosterData::load(&roster_path).unwrap();
    fs::remove_file(history_path).ok();
    fs::remove_file(roster_path).ok();
    (history, roster)
}

fn race_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 5, 4).unwrap()
}

#[test]
fn test_three_prominent_without_front_runner() {
    let (history, roster) = load("test_three_prominent_without_front_runner");
    let analyzer = PaceBiasAnalyzer::with_defaults(history);
    let report = analyzer.analyze_race(&roster.race("202505020801").unwrap());

    assert_eq!((report.score.a, report.score.b, report.score.c), (0, 3, 0));
    assert!((report.score.score - 0.5).abs() < 1e-9);
    assert_eq!(report.score.state, BiasState::BiasPresent);
    assert_eq!(report.score.pace_mark(), Some("★"));
}

#[test]
fn test_race_day_results_are_ignored() {
    let (history, roster) = load("test_race_day_results_are_ignored");
    let analyzer = PaceBiasAnalyzer::with_defaults(history);
    let report = analyzer.analyze_race(&roster.race("202505020801").unwrap());

    // b3 front-ran on and after race day; only earlier runs count
    let b3 = report.horses[2].label().unwrap();
    assert_eq!(b3.horse_id, "b3");
    assert_eq!(b3.front_runner_count, 0);
    assert_eq!(b3.label, PaceLabel::Prominent);
}

#[test]
fn test_two_front_runners_one_prominent() {
    let (history, roster) = load("test_two_front_runners_one_prominent");
    let analyzer = PaceBiasAnalyzer::with_defaults(history);
    let report = analyzer.analyze_race(&roster.race("202505020802").unwrap());

    assert_eq!((report.score.a, report.score.b, report.score.c), (2, 1, 0));
    assert!((report.score.score - 1.5).abs() < 1e-9);
    assert_eq!(report.score.state, BiasState::BiasPresent);

    let fronts: Vec<_> = report
        .horses_with_label(PaceLabel::Front)
        .iter()
        .map(|h| h.horse_id.clone())
        .collect();
    assert_eq!(fronts, vec!["a1", "a2"]);
}

#[test]
fn test_one_prominent_two_partial() {
    let (history, roster) = load("test_one_prominent_two_partial");
    let analyzer = PaceBiasAnalyzer::with_defaults(history);
    let report = analyzer.analyze_race(&roster.race("202505020803").unwrap());

    assert_eq!((report.score.a, report.score.b, report.score.c), (0, 1, 2));
    assert!((report.score.score - -1.5).abs() < 1e-9);
    assert_eq!(report.score.state, BiasState::BiasPresent);

    // c2: blank passage skipped, front-ran once within the window
    let c2 = report.horses[2].label().unwrap();
    assert_eq!(c2.front_runner_count, 1);
    assert_eq!(c2.prominent_count, 1);
    assert_eq!(c2.considered, 3);
}

#[test]
fn test_unusable_history_is_invalid() {
    let (history, roster) = load("test_unusable_history_is_invalid");
    let analyzer = PaceBiasAnalyzer::with_defaults(history);
    let report = analyzer.analyze_race(&roster.race("202505020804").unwrap());

    assert_eq!((report.score.a, report.score.b, report.score.c), (0, 0, 0));
    assert_eq!(report.score.score, -3.5);
    assert_eq!(report.score.state, BiasState::Invalid);
    assert!(report.score.pace_mark().is_none());
    assert!(!report.score.is_degraded());
}

#[test]
fn test_roster_order_does_not_change_score() {
    let (history, roster) = load("test_roster_order_does_not_change_score");
    let analyzer = PaceBiasAnalyzer::with_defaults(history);

    let card = roster.race("202505020802").unwrap();
    let mut reversed = card.clone();
    reversed.entries.reverse();

    let forward = analyzer.analyze_race(&card);
    let backward = analyzer.analyze_race(&reversed);
    assert_eq!(forward.score, backward.score);
}

#[test]
fn test_day_matches_concurrent_run() {
    let (history, roster) = load("test_day_matches_concurrent_run");
    let cards = roster.races_on(race_day());
    assert_eq!(cards.len(), 4);

    let sequential = PaceBiasAnalyzer::with_defaults(history.clone());
    let concurrent = PaceBiasAnalyzer::new(
        history,
        AnalyzerConfig {
            max_concurrency: 4,
            ..Default::default()
        },
    );

    for card in &cards {
        assert_eq!(sequential.analyze_race(card), concurrent.analyze_race(card));
    }
}

#[test]
fn test_report_labels_match_direct_scoring() {
    let (history, roster) = load("test_report_labels_match_direct_scoring");
    let analyzer = PaceBiasAnalyzer::with_defaults(history);
    let report = analyzer.analyze_race(&roster.race("202505020803").unwrap());

    let direct = score_labels(report.horses.iter().filter_map(|h| h.label()).map(|h| h.label));
    assert_eq!(direct, report.score);
}
