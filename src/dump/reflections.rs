// ABOUTME: Reflection dump: one aggregate note for a week, month or date range
// ABOUTME: Also lists days whose reflection is still missing

use super::{day_progress, run_counted, Summary};
use crate::api::ApiClient;
use crate::config::Config;
use crate::convert::reflection::{reflection_filename, ReflectionMode, ReflectionReport};
use crate::filter::DateRange;
use crate::model::DailyResult;
use crate::storage::{OutputDir, WriteDecision};
use crate::util::{days, month_bounds, week_bounds};
use crate::Result;
use chrono::NaiveDate;

/// Days covered by a reflection. Week and month modes expand the anchor date.
pub fn reflection_bounds(
    mode: ReflectionMode,
    range: &DateRange,
    today: NaiveDate,
) -> (NaiveDate, NaiveDate) {
    let (from, to) = range.bounded(today);
    match mode {
        ReflectionMode::Week => week_bounds(from),
        ReflectionMode::Month => month_bounds(from),
        ReflectionMode::Range => (from, to),
    }
}

/// Thread to read when none is given: monthly reflections summarize the weekly thread.
pub fn default_thread(mode: ReflectionMode, config: &Config) -> &str {
    match mode {
        ReflectionMode::Month => &config.weekly_thread,
        _ => &config.default_thread,
    }
}

#[derive(Debug, Clone)]
pub struct ReflectionRequest {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub mode: ReflectionMode,
    pub thread: String,
    pub skip_journals: bool,
}

fn fetch_days(
    client: &ApiClient,
    from: NaiveDate,
    to: NaiveDate,
    thread: &str,
    visible: bool,
) -> Result<Vec<(NaiveDate, DailyResult)>> {
    let pb = day_progress(days(from, to).count() as u64, visible);
    let mut results = Vec::new();

    for date in days(from, to) {
        pb.set_message(date.to_string());
        results.push((date, client.daily(date, thread)?));
        pb.inc(1);
    }

    pb.finish_and_clear();
    Ok(results)
}

/// Dates in `from..=to` without a reflection, or with an empty one.
pub fn missing_reflections(
    client: &ApiClient,
    from: NaiveDate,
    to: NaiveDate,
    thread: &str,
) -> Result<Vec<NaiveDate>> {
    Ok(fetch_days(client, from, to, thread, false)?
        .into_iter()
        .filter(|(_, day)| day.reflection.as_ref().map_or(true, |r| r.is_empty()))
        .map(|(date, _)| date)
        .collect())
}

pub fn dump_reflection(
    client: &ApiClient,
    request: &ReflectionRequest,
    output: Option<&OutputDir>,
) -> Result<Summary> {
    run_counted(|summary| {
        let results: Vec<DailyResult> =
            fetch_days(client, request.from, request.to, &request.thread, output.is_some())?
                .into_iter()
                .map(|(_, day)| day)
                .filter(|day| !day.is_empty())
                .collect();
        tracing::info!(
            days = results.len(),
            thread = %request.thread,
            "collected days with activity"
        );

        let report = ReflectionReport {
            days: &results,
            from: request.from,
            to: request.to,
            mode: request.mode,
            skip_journals: request.skip_journals || request.mode == ReflectionMode::Month,
        };
        let note = report.render();

        match output {
            Some(output) => {
                let path = reflection_filename(request.mode, request.from, request.to);
                let decision = output.write(&path, &note)?;
                if decision == WriteDecision::Written {
                    println!("Created {}", output.target(&path).display());
                }
                summary.record(decision);
            }
            None => print!("{}", note),
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_week_bounds_from_anchor() {
        let range = DateRange::new(Some(d(2024, 1, 10)), None);
        assert_eq!(
            reflection_bounds(ReflectionMode::Week, &range, d(2030, 1, 1)),
            (d(2024, 1, 8), d(2024, 1, 14))
        );
    }

    #[test]
    fn test_month_bounds_default_to_today() {
        assert_eq!(
            reflection_bounds(ReflectionMode::Month, &DateRange::default(), d(2024, 2, 10)),
            (d(2024, 2, 1), d(2024, 2, 29))
        );
    }

    #[test]
    fn test_range_bounds() {
        let range = DateRange::new(Some(d(2024, 1, 1)), Some(d(2024, 1, 3)));
        assert_eq!(
            reflection_bounds(ReflectionMode::Range, &range, d(2030, 1, 1)),
            (d(2024, 1, 1), d(2024, 1, 3))
        );
    }
}
