// ABOUTME: Event dump: daily notes fetched day by day, grouped into month files
// ABOUTME: Prints to stdout when no destination directory is given

use super::{day_progress, run_counted, Summary};
use crate::api::ApiClient;
use crate::convert::events::render_daily;
use crate::storage::{OutputDir, WriteDecision};
use crate::util::days;
use crate::Result;
use chrono::{Datelike, NaiveDate};
use std::path::PathBuf;

/// `{YYYY}/{MM}-{monthname}.md` for the month containing `date`.
pub fn month_filename(date: NaiveDate) -> PathBuf {
    PathBuf::from(date.year().to_string()).join(format!(
        "{:02}-{}.md",
        date.month(),
        date.format("%B").to_string().to_lowercase()
    ))
}

struct MonthBuffer {
    first_day: NaiveDate,
    notes: Vec<String>,
}

impl MonthBuffer {
    fn holds(&self, date: NaiveDate) -> bool {
        self.first_day.year() == date.year() && self.first_day.month() == date.month()
    }
}

fn flush(buffer: MonthBuffer, output: &OutputDir, summary: &mut Summary) -> Result<()> {
    let path = month_filename(buffer.first_day);
    let decision = output.write(&path, &buffer.notes.join("\n"))?;
    if decision == WriteDecision::Written {
        println!("Created {}", output.target(&path).display());
    }
    summary.record(decision);
    Ok(())
}

pub fn dump_events(
    client: &ApiClient,
    from: NaiveDate,
    to: NaiveDate,
    thread: &str,
    output: Option<&OutputDir>,
) -> Result<Summary> {
    run_counted(|summary| {
        let total = days(from, to).count() as u64;
        let pb = day_progress(total, output.is_some());
        let mut current: Option<MonthBuffer> = None;

        for date in days(from, to) {
            pb.set_message(date.to_string());
            let day = client.daily(date, thread)?;
            pb.inc(1);

            if day.is_empty() {
                tracing::debug!(%date, "no events");
                continue;
            }
            let note = render_daily(&day);

            let Some(output) = output else {
                println!("{}", note);
                continue;
            };

            match current.take() {
                Some(mut buffer) if buffer.holds(date) => {
                    buffer.notes.push(note);
                    current = Some(buffer);
                }
                finished => {
                    if let Some(done) = finished {
                        flush(done, output, summary)?;
                    }
                    current = Some(MonthBuffer {
                        first_day: date,
                        notes: vec![note],
                    });
                }
            }
        }

        if let (Some(buffer), Some(output)) = (current, output) {
            flush(buffer, output, summary)?;
        }

        pb.finish_and_clear();
        Ok(())
    })
}
