//! Call analytics command handlers.

use serde::Serialize;
use tabled::Tabled;

use opsdeck_core::format::format_short_duration;
use opsdeck_core::report::{
    CallAnalytics, HourlyVolume, MenuUsage, REPORT_FILE_NAME, WeeklyTrend, render_csv,
};

use crate::cli::{AnalyticsArgs, AnalyticsCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct HourlyRow {
    #[tabled(rename = "Hour")]
    hour: &'static str,
    #[tabled(rename = "Calls")]
    calls: u32,
    #[tabled(rename = "Answered")]
    answered: u32,
    #[tabled(rename = "Abandoned")]
    abandoned: u32,
}

impl From<&HourlyVolume> for HourlyRow {
    fn from(h: &HourlyVolume) -> Self {
        Self {
            hour: h.hour,
            calls: h.calls,
            answered: h.answered,
            abandoned: h.abandoned,
        }
    }
}

#[derive(Tabled)]
struct WeeklyRow {
    #[tabled(rename = "Day")]
    day: &'static str,
    #[tabled(rename = "Calls")]
    calls: u32,
    #[tabled(rename = "Avg Duration")]
    avg: String,
}

impl From<&WeeklyTrend> for WeeklyRow {
    fn from(w: &WeeklyTrend) -> Self {
        Self {
            day: w.day,
            calls: w.calls,
            avg: format_short_duration(w.avg_duration_secs),
        }
    }
}

#[derive(Tabled)]
struct UsageRow {
    #[tabled(rename = "Option")]
    option: &'static str,
    #[tabled(rename = "Share")]
    share: String,
}

impl From<&MenuUsage> for UsageRow {
    fn from(u: &MenuUsage) -> Self {
        Self {
            option: u.option,
            share: format!("{}%", u.share),
        }
    }
}

#[derive(Serialize)]
struct Headline {
    total_calls: u32,
    answer_rate: f64,
    peak_hour: Option<&'static str>,
    peak_calls: u32,
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: AnalyticsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let analytics = CallAnalytics::sample();

    let out = match args.command {
        AnalyticsCommand::Summary => {
            let peak = analytics.peak_hour();
            let headline = Headline {
                total_calls: analytics.total_calls(),
                answer_rate: (analytics.answer_rate() * 10.0).round() / 10.0,
                peak_hour: peak.map(|h| h.hour),
                peak_calls: peak.map_or(0, |h| h.calls),
            };
            output::render_single(
                &global.output,
                &headline,
                |h| {
                    [
                        format!("Total calls:  {}", h.total_calls),
                        format!("Answer rate:  {:.1}%", h.answer_rate),
                        format!(
                            "Peak hour:    {} ({} calls)",
                            h.peak_hour.unwrap_or("-"),
                            h.peak_calls
                        ),
                    ]
                    .join("\n")
                },
                |h| h.total_calls.to_string(),
            )
        }
        AnalyticsCommand::Hourly => output::render_list(
            &global.output,
            &analytics.hourly,
            |x| HourlyRow::from(x),
            |h| h.hour.to_owned(),
        ),
        AnalyticsCommand::Weekly => output::render_list(
            &global.output,
            &analytics.weekly,
            |x| WeeklyRow::from(x),
            |w| w.day.to_owned(),
        ),
        AnalyticsCommand::MenuUsage => output::render_list(
            &global.output,
            &analytics.menu_usage,
            |x| UsageRow::from(x),
            |u| u.option.to_owned(),
        ),
        AnalyticsCommand::Report { file } => {
            let csv = render_csv(&analytics.daily);
            return output::write_artifact(file.as_deref(), &csv, REPORT_FILE_NAME, global.quiet);
        }
    };

    output::print_output(&out, global.quiet);
    Ok(())
}
