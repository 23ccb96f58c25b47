use crate::infra::{load_store, parse_date};
use chrono::NaiveDate;
use clap::Args;
use sales_dashboard::calendar::{format_display, AgencyCalendar, Clock, DateRange};
use sales_dashboard::error::AppError;
use sales_dashboard::reporting::router::{LeaderboardResponse, ZipHealthResponse};
use sales_dashboard::reporting::{LeaderboardService, ProducerMetrics, ZipMetrics};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct RangeArgs {
    /// First day of the range (YYYY-MM-DD). Defaults to this week's Monday.
    #[arg(long, value_parser = parse_date)]
    pub(crate) from: Option<NaiveDate>,
    /// Last day of the range (YYYY-MM-DD). Defaults to this week's Sunday.
    #[arg(long, value_parser = parse_date)]
    pub(crate) to: Option<NaiveDate>,
    /// Snapshot file or CSV directory; overrides APP_DATA_PATH
    #[arg(long)]
    pub(crate) data: Option<PathBuf>,
}

impl RangeArgs {
    pub(crate) fn resolve<C: Clock>(
        &self,
        calendar: &AgencyCalendar<C>,
    ) -> Result<DateRange, AppError> {
        let week = calendar.current_week();
        let range = DateRange::new(self.from.unwrap_or(week.from), self.to.unwrap_or(week.to))?;
        Ok(range)
    }
}

#[derive(Args, Debug)]
pub(crate) struct LeaderboardArgs {
    #[command(flatten)]
    pub(crate) range: RangeArgs,
    /// Emit JSON instead of a text table
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ZipHealthArgs {
    #[command(flatten)]
    pub(crate) range: RangeArgs,
    /// Emit JSON instead of a text table
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct CalendarArgs {
    /// Entry date to check against the 6 PM cutoff (defaults to today)
    #[arg(long)]
    pub(crate) date: Option<String>,
}

pub(crate) fn run_leaderboard(args: LeaderboardArgs) -> Result<(), AppError> {
    let calendar = AgencyCalendar::system();
    let range = args.range.resolve(&calendar)?;
    let store = load_store(args.range.data.clone())?;
    let service = LeaderboardService::new(Arc::new(store));
    let producers = service.producer_metrics(&range)?;

    if args.json {
        return print_json(&LeaderboardResponse {
            range,
            range_label: range.label(),
            producers,
        });
    }

    render_leaderboard(&range, &producers);
    Ok(())
}

pub(crate) fn run_zip_health(args: ZipHealthArgs) -> Result<(), AppError> {
    let calendar = AgencyCalendar::system();
    let range = args.range.resolve(&calendar)?;
    let store = load_store(args.range.data.clone())?;
    let service = LeaderboardService::new(Arc::new(store));
    let zips = service.zip_metrics(&range)?;

    if args.json {
        return print_json(&ZipHealthResponse {
            range,
            range_label: range.label(),
            zips,
        });
    }

    render_zip_health(&range, &zips);
    Ok(())
}

pub(crate) fn run_calendar(args: CalendarArgs) -> Result<(), AppError> {
    let calendar = AgencyCalendar::system();
    let today = calendar.today();
    let date = args.date.unwrap_or_else(|| today.to_string());

    println!("Agency calendar ({})", calendar.timezone().name());
    println!("Today: {} ({})", today, format_display(today));
    println!("Yesterday: {}", calendar.yesterday());
    println!("Default entry date: {}", calendar.default_entry_date());
    let status = if calendar.is_past_six_pm(&date) {
        "locked (past 6 PM)"
    } else {
        "open"
    };
    println!("Entries for {date}: {status}");
    Ok(())
}

fn print_json<T: Serialize>(body: &T) -> Result<(), AppError> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, body).map_err(std::io::Error::from)?;
    writeln!(stdout)?;
    Ok(())
}

pub(crate) fn leaderboard_lines(range: &DateRange, producers: &[ProducerMetrics]) -> Vec<String> {
    let mut lines = vec![format!("Producer leaderboard: {}", range.label())];
    if producers.is_empty() {
        lines.push("No activity logged in this range".to_string());
        return lines;
    }

    for (rank, row) in producers.iter().enumerate() {
        lines.push(format!(
            "{:>2}. {} | QHH {} | quotes {} | sales {} | items {} | premium ${:.2} | close {:.1}%",
            rank + 1,
            row.producer_name,
            row.qhh,
            row.quotes,
            row.sales,
            row.items,
            row.premium,
            row.close_rate
        ));
    }
    lines
}

fn render_leaderboard(range: &DateRange, producers: &[ProducerMetrics]) {
    for line in leaderboard_lines(range, producers) {
        println!("{line}");
    }
}

fn render_zip_health(range: &DateRange, zips: &[ZipMetrics]) {
    println!("Zip-code health: {}", range.label());
    if zips.is_empty() {
        println!("No zip-coded quotes in this range");
        return;
    }

    for zip in zips {
        println!(
            "- {} [{}]: {} quoted, {} sold, {:.1}% conversion, premium ${:.2}",
            zip.zip_code,
            zip.health.label(),
            zip.quotes,
            zip.sales,
            zip.conversion_rate,
            zip.premium
        );
    }
}
