use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};

use hitfive_data::import::ImportReport;
use hitfive_data::models::format_combo;

use crate::analysis::Analysis;
use crate::backtest::BacktestReport;
use crate::classify::{Category, Classification};
use crate::gaps::NumberStats;
use crate::pool::PoolSelection;
use crate::scoring::ScoredCombo;
use crate::summary::{pool_odds, DrawSummary, NumberProbability};

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn category_color(category: Category) -> Color {
    match category {
        Category::Hot => Color::Green,
        Category::Warm => Color::White,
        Category::Cold => Color::Red,
    }
}

fn format_numbers(numbers: &[u8]) -> String {
    if numbers.is_empty() {
        return "—".to_string();
    }
    numbers
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_optional<T: std::fmt::Display>(value: Option<T>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "—".to_string(),
    }
}

pub fn display_import_summary(report: &ImportReport) {
    println!("Import complete:");
    println!("  Rows read        : {}", report.total_records);
    println!("  Kept             : {}", report.kept);
    println!("  Duplicates       : {}", report.duplicates);
    if report.errors > 0 {
        println!("  Errors           : {}", report.errors);
    }
}

/// Per-number statistics, most frequent first.
pub fn stats_table(stats: &[NumberStats], classification: &Classification) -> Table {
    let mut table = new_table(vec!["Number", "Frequency", "Mean gap", "Current gap", "Longest gap", "Class"]);

    let mut sorted = stats.to_vec();
    sorted.sort_by(|a, b| b.frequency.cmp(&a.frequency).then(a.number.cmp(&b.number)));

    for stat in &sorted {
        let category = classification.category_of(stat.number);
        let class_cell = match category {
            Some(c) => Cell::new(c.to_string()).fg(category_color(c)),
            None => Cell::new("—"),
        };
        table.add_row(vec![
            Cell::new(format!("{:2}", stat.number)),
            Cell::new(stat.frequency),
            Cell::new(format_optional(stat.mean_gap.map(|g| format!("{:.2}", g)))),
            Cell::new(stat.current_gap),
            Cell::new(format_optional(stat.longest_gap)),
            class_cell,
        ]);
    }
    table
}

pub fn display_stats(stats: &[NumberStats], classification: &Classification, draws: usize) {
    println!("\nStatistics over {} draws\n", draws);
    println!("{}", stats_table(stats, classification));
    if let Some(t) = &classification.thresholds {
        println!(
            "Mean gap {:.2} ± {:.2}: hot < {:.2}, cold > {:.2}",
            t.avg, t.std, t.lower, t.upper
        );
    }
}

pub fn classification_table(classification: &Classification) -> Table {
    let mut table = new_table(vec!["Class", "Count", "Numbers"]);
    for category in [Category::Hot, Category::Warm, Category::Cold] {
        let numbers = classification.numbers(category);
        table.add_row(vec![
            Cell::new(category.to_string()).fg(category_color(category)),
            Cell::new(numbers.len()),
            Cell::new(format_numbers(numbers)),
        ]);
    }
    table
}

pub fn pool_table(selection: &PoolSelection) -> Table {
    let pool = selection.numbers();
    let mut table = new_table(vec!["Source", "Count", "Numbers"]);
    table.add_row(vec![
        Cell::new("Hot").fg(Color::Green),
        Cell::new(selection.hot.len()),
        Cell::new(format_numbers(&selection.hot)),
    ]);
    table.add_row(vec![
        Cell::new("Overdue").fg(Color::Red),
        Cell::new(selection.excessively_cold.len()),
        Cell::new(format_numbers(&selection.excessively_cold)),
    ]);
    let warm_label = match selection.warm_median_gap {
        Some(m) => format!("Warm (gap ≥ {:.1})", m),
        None => "Warm".to_string(),
    };
    table.add_row(vec![
        Cell::new(warm_label),
        Cell::new(selection.qualified_warm.len()),
        Cell::new(format_numbers(&selection.qualified_warm)),
    ]);
    let numbers: Vec<u8> = pool.iter().copied().collect();
    table.add_row(vec![
        Cell::new("Pool"),
        Cell::new(pool.len()),
        Cell::new(format_numbers(&numbers)),
    ]);
    table
}

pub fn display_pool(selection: &PoolSelection) {
    let size = selection.numbers().len();
    println!("\nPool selection\n");
    println!("{}", pool_table(selection));
    println!("Tickets to cover the pool: {}", pool_odds(size));
}

pub fn combos_table(combos: &[ScoredCombo]) -> Table {
    let mut table = new_table(vec!["#", "Numbers", "Sum", "Score"]);
    for (i, scored) in combos.iter().enumerate() {
        let sum: u32 = scored.combo.iter().map(|&n| n as u32).sum();
        table.add_row(vec![
            format!("{}", i + 1),
            format_combo(&scored.combo),
            sum.to_string(),
            format!("{:.4}", scored.score),
        ]);
    }
    table
}

pub fn display_combos(combos: &[ScoredCombo]) {
    if combos.is_empty() {
        println!("No combination passed the filters.");
        return;
    }
    println!("\nTop {} combinations\n", combos.len());
    println!("{}", combos_table(combos));
}

pub fn display_analysis(analysis: &Analysis) {
    display_stats(&analysis.stats, &analysis.classification, analysis.draws);
    display_classification(&analysis.classification);
    display_pool(&analysis.selection);
    println!(
        "{} of {} candidate combinations pass the filters",
        analysis.accepted, analysis.candidates
    );
    display_combos(&analysis.ranked);
}

pub fn backtest_table(report: &BacktestReport) -> Table {
    let mut table = new_table(vec!["Matches", "Draws", "Share"]);
    let total = report.len().max(1) as f64;
    for (matches, &count) in report.match_distribution.iter().enumerate() {
        table.add_row(vec![
            matches.to_string(),
            count.to_string(),
            format!("{:.1}%", 100.0 * count as f64 / total),
        ]);
    }
    table
}

pub fn display_backtest(report: &BacktestReport) {
    println!("\nPool backtest over {} draws\n", report.len());
    println!("Coverage (all numbers in pool): {:.2}%", report.coverage * 100.0);
    println!("Average pool matches per draw : {:.2}", report.mean_matches);
    println!("Average pool size             : {:.1}", report.mean_pool_size);
    println!("{}", backtest_table(report));
}

pub fn display_summary(summary: &DrawSummary) {
    println!("\nDraw summary\n");
    let mut table = new_table(vec!["Measure", "Value"]);
    table.add_row(vec!["Draws".to_string(), summary.draws.to_string()]);
    table.add_row(vec![
        "Single-ticket odds".to_string(),
        format!("1 in {}", summary.single_ticket_combinations),
    ]);
    table.add_row(vec![
        "Mean sum".to_string(),
        format_optional(summary.sum_mean.map(|m| format!("{:.2}", m))),
    ]);
    table.add_row(vec![
        "Sum std".to_string(),
        format_optional(summary.sum_std.map(|s| format!("{:.2}", s))),
    ]);
    table.add_row(vec![
        "Draws with a consecutive pair".to_string(),
        format!(
            "{} ({:.1}%)",
            summary.draws_with_consecutive_pair, summary.consecutive_pair_percent
        ),
    ]);
    println!("{table}");
}

/// Observed against uniform probability, largest deviation first.
pub fn probabilities_table(probs: &[NumberProbability]) -> Table {
    let mut table = new_table(vec!["Number", "Empirical", "Theoretical", "Ratio"]);

    let mut sorted = probs.to_vec();
    sorted.sort_by(|a, b| {
        let da = (a.empirical - a.theoretical).abs();
        let db = (b.empirical - b.theoretical).abs();
        db.partial_cmp(&da).unwrap_or(std::cmp::Ordering::Equal)
    });

    for prob in &sorted {
        let ratio = if prob.theoretical > 0.0 {
            prob.empirical / prob.theoretical
        } else {
            0.0
        };
        let color = if ratio >= 1.0 { Color::Green } else { Color::Red };
        table.add_row(vec![
            Cell::new(format!("{:2}", prob.number)),
            Cell::new(format!("{:.4}", prob.empirical)),
            Cell::new(format!("{:.4}", prob.theoretical)),
            Cell::new(format!("{:.2}", ratio)).fg(color),
        ]);
    }
    table
}

pub fn display_probabilities(probs: &[NumberProbability]) {
    println!("\nEmpirical probabilities\n");
    println!("{}", probabilities_table(probs));
}

pub fn display_classification(classification: &Classification) {
    println!("\nHot / warm / cold\n");
    println!("{}", classification_table(classification));
}
