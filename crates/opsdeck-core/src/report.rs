// ── Call analytics ──
//
// Sample series behind the analytics page and the daily CSV report. No
// call-detail records are collected, so these are fixed demo figures.

use chrono::NaiveDate;
use serde::Serialize;

use crate::format::format_short_duration;

pub const REPORT_FILE_NAME: &str = "call_analytics_report.csv";

const CSV_HEADER: &str = "Date,Total Calls,Answered,Abandoned,Avg Duration";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HourlyVolume {
    pub hour: &'static str,
    pub calls: u32,
    pub answered: u32,
    pub abandoned: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeeklyTrend {
    pub day: &'static str,
    pub calls: u32,
    pub avg_duration_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuUsage {
    pub option: &'static str,
    /// Share of all menu selections, in percent.
    pub share: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyReportRow {
    pub date: NaiveDate,
    pub total_calls: u32,
    pub answered: u32,
    pub abandoned: u32,
    pub avg_duration_secs: u64,
}

/// All series shown on the analytics page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallAnalytics {
    pub hourly: Vec<HourlyVolume>,
    pub weekly: Vec<WeeklyTrend>,
    pub menu_usage: Vec<MenuUsage>,
    pub daily: Vec<DailyReportRow>,
}

impl CallAnalytics {
    pub fn sample() -> Self {
        let hourly = [
            ("9AM", 45, 42, 3),
            ("10AM", 62, 58, 4),
            ("11AM", 78, 73, 5),
            ("12PM", 84, 79, 5),
            ("1PM", 91, 85, 6),
            ("2PM", 103, 95, 8),
            ("3PM", 87, 81, 6),
            ("4PM", 76, 71, 5),
            ("5PM", 68, 63, 5),
        ]
        .into_iter()
        .map(|(hour, calls, answered, abandoned)| HourlyVolume {
            hour,
            calls,
            answered,
            abandoned,
        })
        .collect();

        let weekly = [
            ("Mon", 456, 180),
            ("Tue", 523, 195),
            ("Wed", 489, 172),
            ("Thu", 612, 201),
            ("Fri", 578, 188),
            ("Sat", 234, 165),
            ("Sun", 123, 142),
        ]
        .into_iter()
        .map(|(day, calls, avg_duration_secs)| WeeklyTrend {
            day,
            calls,
            avg_duration_secs,
        })
        .collect();

        let menu_usage = [
            ("Sales (Press 1)", 45),
            ("Support (Press 2)", 30),
            ("Billing (Press 3)", 15),
            ("Other (Press 0)", 10),
        ]
        .into_iter()
        .map(|(option, share)| MenuUsage { option, share })
        .collect();

        let daily = [
            ((2024, 1, 15), 456, 423, 33, 222),
            ((2024, 1, 16), 523, 489, 34, 241),
            ((2024, 1, 17), 489, 458, 31, 208),
        ]
        .into_iter()
        .filter_map(|((y, m, d), total_calls, answered, abandoned, avg_duration_secs)| {
            Some(DailyReportRow {
                date: NaiveDate::from_ymd_opt(y, m, d)?,
                total_calls,
                answered,
                abandoned,
                avg_duration_secs,
            })
        })
        .collect();

        Self {
            hourly,
            weekly,
            menu_usage,
            daily,
        }
    }

    pub fn total_calls(&self) -> u32 {
        self.hourly.iter().map(|h| h.calls).sum()
    }

    /// Answered share of the hourly volume, in percent.
    pub fn answer_rate(&self) -> f64 {
        let total = self.total_calls();
        if total == 0 {
            return 0.0;
        }
        let answered: u32 = self.hourly.iter().map(|h| h.answered).sum();
        f64::from(answered) * 100.0 / f64::from(total)
    }

    pub fn peak_hour(&self) -> Option<&HourlyVolume> {
        self.hourly.iter().max_by_key(|h| h.calls)
    }
}

/// Render the daily report as CSV, one row per day, no trailing newline.
pub fn render_csv(rows: &[DailyReportRow]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(CSV_HEADER.to_owned());
    lines.extend(rows.iter().map(|r| {
        format!(
            "{},{},{},{},{}",
            r.date.format("%Y-%m-%d"),
            r.total_calls,
            r.answered,
            r.abandoned,
            format_short_duration(r.avg_duration_secs)
        )
    }));
    lines.join("\n")
}
