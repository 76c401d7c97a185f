//! Terminal and JSON output for loadscope

use anyhow::Result;
use colored::*;
use gridload_model::{
    DailySeries, DashboardView, Dataset, HourlyPattern, KpiReport, ZoneAverage,
};
use serde::Serialize;

const BAR_WIDTH: usize = 40;

/// Pretty-printed JSON on stdout
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn section(title: &str) {
    println!();
    println!("{}", format!("=== {} ===", title).bright_cyan());
}

/// Load figure with thousands separators and one decimal; `n/a` when missing
pub fn format_load(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => group_thousands(v, 1),
        _ => "n/a".to_string(),
    }
}

/// Signed percentage with two decimals; `n/a` when undefined
pub fn format_percent(value: f64) -> String {
    if value.is_finite() {
        format!("{:+.2}%", value)
    } else {
        "n/a".to_string()
    }
}

fn group_thousands(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3 + 4);
    if value < 0.0 {
        grouped.push('-');
    }
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if let Some(frac_part) = frac_part {
        grouped.push('.');
        grouped.push_str(frac_part);
    }
    grouped
}

pub fn print_zones(dataset: &Dataset) {
    section("Dataset");
    println!("{:<16} {}", "Time column", dataset.time_column());
    println!("{:<16} {}", "Records", dataset.len());
    if let Some((start, end)) = dataset.time_bounds() {
        println!("{:<16} {} → {}", "Range", start, end);
    }

    section("Zones");
    if dataset.zones().is_empty() {
        println!("{} No numeric zone columns found", "WARN".yellow());
        return;
    }
    for (index, zone) in dataset.zones().iter().enumerate() {
        let present = dataset
            .records()
            .iter()
            .filter(|r| r.value(index).is_some())
            .count();
        println!("  {:<32} {:>8} values", zone, present);
    }
}

fn print_params(view: &DashboardView) {
    let window = match &view.params.window {
        Some(w) => format!("{} → {}", w.start(), w.end()),
        None => "all records".to_string(),
    };
    println!("{:<16} {}", "Window", window);
    println!("{:<16} {}", "Records", view.record_count);
    println!("{:<16} {}", "Resample", view.params.rule);
    let zones: Vec<&str> = view.params.selection.iter().collect();
    println!("{:<16} {}", "Selection", if zones.is_empty() { "-".to_string() } else { zones.join(", ") });
}

pub fn print_summary(view: &DashboardView) {
    section("Summary");
    print_params(view);

    match &view.kpi_target {
        Some(target) => println!(
            "{:<16} {} ({:?})",
            "KPI target",
            target.zones.join(" + "),
            target.source
        ),
        None => println!("{:<16} -", "KPI target"),
    }

    section("KPIs");
    match &view.kpis {
        KpiReport::NoData => println!("{} No data in the selected window", "WARN".yellow()),
        KpiReport::Computed(set) => {
            println!("{:<16} {} MW", "Peak", format_load(Some(set.peak)).bright_green());
            println!("{:<16} {} MW", "Trough", format_load(Some(set.trough)).bright_green());
            println!("{:<16} {} MW", "Mean", format_load(Some(set.mean)).bright_green());
            let change = format_percent(set.percent_change);
            let change = match set.percent_change() {
                Some(c) if c < 0.0 => change.red(),
                Some(_) => change.green(),
                None => change.dimmed(),
            };
            println!("{:<16} {}", "Change", change);
        },
    }
}

pub fn print_trend(view: &DashboardView) {
    section(&format!("Trend ({})", view.params.rule));
    let columns: Vec<(usize, &str)> = view
        .params
        .selection
        .iter()
        .filter_map(|zone| Some((view.resampled.zone_index(zone)?, zone)))
        .collect();

    if columns.is_empty() || view.resampled.is_empty() {
        println!("{} Nothing to show", "WARN".yellow());
        return;
    }

    let header: Vec<String> = columns.iter().map(|(_, z)| format!("{:>16}", z)).collect();
    println!("{:<20}{}", "Timestamp", header.join(""));
    println!("{}", "─".repeat(20 + 16 * columns.len()));

    for bucket in view.resampled.buckets() {
        let cells: Vec<String> = columns
            .iter()
            .map(|(index, _)| format!("{:>16}", format_load(bucket.value(*index))))
            .collect();
        println!(
            "{:<20}{}",
            bucket.timestamp.format("%Y-%m-%d %H:%M").to_string(),
            cells.join("")
        );
    }
}

fn print_ranked(title: &str, entries: &[ZoneAverage]) {
    section(title);
    if entries.is_empty() {
        println!("{} No zones", "WARN".yellow());
        return;
    }
    for (rank, entry) in entries.iter().enumerate() {
        println!(
            "{:>3}. {:<32} {:>14}",
            rank + 1,
            entry.zone,
            format_load(entry.average)
        );
    }
}

pub fn print_ranking(view: &DashboardView) {
    print_ranked(&format!("Top {} zones", view.params.top_n), &view.top_zones);
    print_ranked(&format!("Bottom {} zones", view.params.top_n), &view.bottom_zones);
}

fn bar(value: Option<f64>, max: f64) -> String {
    match value {
        Some(v) if max > 0.0 && v > 0.0 => {
            let len = ((v / max) * BAR_WIDTH as f64).round() as usize;
            "█".repeat(len.min(BAR_WIDTH))
        },
        _ => String::new(),
    }
}

pub fn print_daily(daily: Option<&DailySeries>) {
    let Some(daily) = daily else {
        section("Daily average");
        println!("{} No zones to aggregate", "WARN".yellow());
        return;
    };
    section(&format!("Daily average: {}", daily.zone));
    let max = daily
        .points
        .iter()
        .filter_map(|p| p.mean)
        .fold(0.0_f64, f64::max);
    for point in &daily.points {
        println!(
            "{}  {:>14}  {}",
            point.date,
            format_load(point.mean),
            bar(point.mean, max).blue()
        );
    }
}

pub fn print_hourly(hourly: Option<&HourlyPattern>) {
    let Some(hourly) = hourly else {
        section("Hourly profile");
        println!("{} No zones to aggregate", "WARN".yellow());
        return;
    };
    section(&format!("Hourly profile: {}", hourly.zone));
    let max = hourly
        .points
        .iter()
        .filter_map(|p| p.mean)
        .fold(0.0_f64, f64::max);
    for point in &hourly.points {
        println!(
            "{:02}:00  {:>14}  {}",
            point.hour,
            format_load(point.mean),
            bar(point.mean, max).blue()
        );
    }
}

type SectionPrinter = fn(&DashboardView);

/// Sections of the full report, in print order
const VIEW_SECTIONS: [(&str, SectionPrinter); 5] = [
    ("summary", print_summary),
    ("trend", print_trend),
    ("ranking", print_ranking),
    ("daily", |view| print_daily(view.daily.as_ref())),
    ("hourly", |view| print_hourly(view.hourly.as_ref())),
];

pub fn print_view(view: &DashboardView) {
    for (_, print) in VIEW_SECTIONS {
        print(view);
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    #[test]
    fn test_format_load() {
        assert_eq!(format_load(Some(1_234_567.89)), "1,234,567.9");
        assert_eq!(format_load(Some(999.94)), "999.9");
        assert_eq!(format_load(Some(-12_500.0)), "-12,500.0");
        assert_eq!(format_load(Some(0.0)), "0.0");
        assert_eq!(format_load(None), "n/a");
        assert_eq!(format_load(Some(f64::NAN)), "n/a");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(12.5), "+12.50%");
        assert_eq!(format_percent(-3.0), "-3.00%");
        assert_eq!(format_percent(f64::NAN), "n/a");
    }

    #[test]
    fn test_view_report_covers_every_command() {
        let names: Vec<&str> = VIEW_SECTIONS.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, vec!["summary", "trend", "ranking", "daily", "hourly"]);
    }

    #[test]
    fn test_bar_scaling() {
        assert_eq!(bar(Some(50.0), 100.0).chars().count(), BAR_WIDTH / 2);
        assert_eq!(bar(Some(100.0), 100.0).chars().count(), BAR_WIDTH);
        assert!(bar(None, 100.0).is_empty());
        assert!(bar(Some(10.0), 0.0).is_empty());
    }
}
