use std::fmt::Write;

use ansi_term::Colour;
use chrono::NaiveDate;
use serde::Serialize;

use crate::{
    utils::{percentage::Percentage, time::format_date},
    worklog::{
        record::DayRecord,
        store::{LogResult, RemoveResult, SkipReason, Totals},
    },
};

pub const CHART_WIDTH: usize = 40;

#[derive(Debug, Serialize)]
pub struct SummaryView {
    pub total_earned: f64,
    pub total_to_earn: f64,
    pub overall: f64,
}

impl From<Totals> for SummaryView {
    fn from(totals: Totals) -> Self {
        Self {
            total_earned: totals.earned,
            total_to_earn: totals.to_earn,
            overall: totals.overall(),
        }
    }
}

pub fn render_log_result(record: &DayRecord, result: &LogResult, currency: &str) -> String {
    let date = format_date(record.date());
    match result {
        LogResult::Logged { hours, earned } => Colour::Green
            .paint(format!("Logged {hours} hours for {date} ({currency}{earned:.2})"))
            .to_string(),
        LogResult::Skipped(SkipReason::NonWorkingDay) => Colour::Yellow
            .paint(format!("{date} ({}) is a non-working day.", record.day_name()))
            .to_string(),
        LogResult::Skipped(SkipReason::AlreadyLogged) => Colour::Blue
            .paint(format!("{date} already has hours logged."))
            .to_string(),
    }
}

pub fn render_remove_result(date: NaiveDate, result: &RemoveResult) -> String {
    let date = format_date(date);
    match result {
        RemoveResult::Removed => Colour::Green
            .paint(format!("Log for {date} has been removed."))
            .to_string(),
        RemoveResult::NoOp => Colour::Blue
            .paint(format!("No hours were logged for {date}."))
            .to_string(),
    }
}

pub fn render_totals(totals: &Totals, currency: &str) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "Total Earned   {currency}{:.2}", totals.earned);
    let _ = writeln!(output, "Total To Earn  {currency}{:.2}", totals.to_earn);
    let _ = writeln!(output, "Overall        {currency}{:.2}", totals.overall());
    output
}

/// Number of cells given to the earned and to earn slices of a `width` wide bar.
pub fn chart_segments(totals: &Totals, width: usize) -> (usize, usize) {
    let overall = totals.overall();
    if overall <= 0. {
        return (0, 0);
    }
    let earned = ((totals.earned / overall) * width as f64).round() as usize;
    let earned = earned.min(width);
    (earned, width - earned)
}

/// Two slice proportion bar of earned against still to earn.
pub fn render_chart(totals: &Totals, width: usize) -> String {
    let (earned, to_earn) = chart_segments(totals, width);
    if earned + to_earn == 0 {
        return "Nothing to earn in this range.\n".into();
    }

    let overall = totals.overall();
    format!(
        "{}{}\n{} Earned {}   {} To Earn {}\n",
        Colour::Green.paint("█".repeat(earned)),
        Colour::Yellow.paint("█".repeat(to_earn)),
        Colour::Green.paint("■"),
        Percentage::of(totals.earned, overall),
        Colour::Yellow.paint("■"),
        Percentage::of(totals.to_earn, overall),
    )
}

pub fn render_table(records: &[DayRecord], currency: &str) -> String {
    let mut output = String::new();
    let _ = writeln!(
        output,
        "{:<10}  {:<9}  {:>12}  {:>11}  {:>10}  {:>10}",
        "Date", "Day", "Hours Worked", "Hourly Rate", "Earned", "To Earn"
    );
    for record in records {
        let line = format!(
            "{:<10}  {:<9}  {:>12.2}  {:>11}  {:>10}  {:>10}",
            format_date(record.date()),
            record.day_name(),
            record.hours_worked(),
            format!("{currency}{:.2}", record.hourly_rate()),
            format!("{currency}{:.2}", record.earned()),
            format!("{currency}{:.2}", record.to_earn()),
        );
        if record.is_logged() {
            let _ = writeln!(output, "{}", Colour::Green.paint(line));
        } else {
            let _ = writeln!(output, "{line}");
        }
    }
    output
}
