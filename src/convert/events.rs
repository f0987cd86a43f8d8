// ABOUTME: Markdown presenters for daily events (journals, habits, observation work)
// ABOUTME: Builds the per-day note used by event dumps and reflections

use super::clean_text;
use crate::model::{DailyResult, Event, HabitTracked, JournalAdded, ProjectedOutcome};
use crate::util::{
    escape_headings, find_clock_time, first_line, listize, wrap_preserving_linebreaks,
};
use chrono::{DateTime, FixedOffset, Timelike};

pub const DAILY_TIME_FORMAT: &str = "%H:%M";
pub const WEEKDAY_TIME_FORMAT: &str = "(%a) %H:%M";
const WRAP_WIDTH: usize = 80;

fn is_time(published: &DateTime<FixedOffset>, h: u32, m: u32, s: u32) -> bool {
    published.hour() == h && published.minute() == m && published.second() == s
}

/// Heading label for a journal entry.
///
/// 23:59:59 marks an end-of-day entry; midnight means the time is unknown.
pub fn journal_label(journal: &JournalAdded, time_format: &str) -> String {
    if is_time(&journal.published, 23, 59, 59) {
        return "At the end of the day...".into();
    }

    if is_time(&journal.published, 0, 0, 0) {
        return find_clock_time(&journal.comment)
            .map(str::to_string)
            .unwrap_or_else(|| "Sometime that day...".into());
    }

    journal.published.format(time_format).to_string()
}

pub fn render_journal(journal: &JournalAdded, time_format: &str) -> String {
    let mut out = format!("### {}\n\n", journal_label(journal, time_format));
    if !journal.tags.is_empty() {
        out.push_str(&format!("_Tags: {}_\n\n", journal.tags.join(", ")));
    }
    out.push_str(&clean_text(Some(&journal.comment)));
    out
}

/// One habit entry: the note, or `#tag` / `!tag` when none was given.
pub fn habit_entry(habit: &HabitTracked) -> String {
    let note = match habit.note.as_deref().map(str::trim) {
        Some(note) if !note.is_empty() => escape_headings(&note.replace('\n', " ")),
        _ => {
            let marker = if habit.occurred { '#' } else { '!' };
            format!("{}{}", marker, habit.habit.tagname)
        }
    };

    if habit.published.hour() == 0 && habit.published.minute() == 0 {
        note
    } else {
        format!("{}: {}", habit.published.format(DAILY_TIME_FORMAT), note)
    }
}

/// All habits of a day on a single line.
pub fn habit_line<'a>(habits: impl IntoIterator<Item = &'a HabitTracked>) -> String {
    habits
        .into_iter()
        .map(habit_entry)
        .collect::<Vec<_>>()
        .join(" | ")
}

fn date_label(date: Option<DateTime<FixedOffset>>) -> Option<String> {
    date.map(|d| d.format("%Y-%m-%d").to_string())
}

pub fn render_outcome(event: &Event) -> Option<String> {
    let name = |o: &ProjectedOutcome| {
        o.new_name
            .clone()
            .or_else(|| o.name.clone())
            .unwrap_or_else(|| o.event_stream_id.clone())
    };

    let line = match event {
        Event::ProjectedOutcomeMade(o) => match date_label(o.resolved_by) {
            Some(by) => format!("- **{}** (resolve by {})", name(o), by),
            None => format!("- **{}**", name(o)),
        },
        Event::ProjectedOutcomeRedefined(o) => match &o.old_name {
            Some(old) if o.new_name.is_some() => format!("- **{}** (was: *{}*)", name(o), old),
            _ => format!("- **{}** (redefined)", name(o)),
        },
        Event::ProjectedOutcomeRescheduled(o) => {
            match (date_label(o.old_resolved_by), date_label(o.new_resolved_by)) {
                (Some(old), Some(new)) => {
                    format!("- **{}** rescheduled from {} to {}", name(o), old, new)
                }
                (None, Some(new)) => format!("- **{}** rescheduled to {}", name(o), new),
                (Some(old), None) => format!("- **{}** rescheduled (was {})", name(o), old),
                (None, None) => format!("- **{}** rescheduled", name(o)),
            }
        }
        Event::ProjectedOutcomeClosed(o) => format!("- **{}** ✓", name(o)),
        _ => return None,
    };

    Some(line)
}

struct StreamWork {
    stream_id: String,
    situation: String,
    url: Option<String>,
    added: bool,
    closed: bool,
    events: usize,
}

/// Observation activity grouped by event stream, in first-seen order.
pub struct ObservationWork {
    streams: Vec<StreamWork>,
    count: usize,
}

impl ObservationWork {
    pub fn collect<'a>(events: impl IntoIterator<Item = &'a Event>) -> Self {
        let mut streams: Vec<StreamWork> = Vec::new();
        let mut count = 0;

        for event in events {
            let Some(observation) = event.as_observation() else {
                continue;
            };
            count += 1;

            let index = match streams
                .iter()
                .position(|s| s.stream_id == observation.event_stream_id)
            {
                Some(index) => index,
                None => {
                    streams.push(StreamWork {
                        stream_id: observation.event_stream_id.clone(),
                        situation: String::new(),
                        url: None,
                        added: false,
                        closed: false,
                        events: 0,
                    });
                    streams.len() - 1
                }
            };

            let stream = &mut streams[index];
            stream.events += 1;
            stream.added |= matches!(event, Event::ObservationMade(_));
            stream.closed |= matches!(event, Event::ObservationClosed(_));
            if observation.url.is_some() {
                stream.url = observation.url.clone();
            }
            let situation = observation.situation_text();
            if !situation.is_empty() {
                stream.situation = situation.to_string();
            }
        }

        ObservationWork { streams, count }
    }

    /// Number of observation events, not streams.
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn render(&self) -> String {
        self.streams
            .iter()
            .map(|s| {
                let stats = if s.closed {
                    " (closed)".to_string()
                } else if s.added {
                    " (added)".to_string()
                } else if s.events > 1 {
                    format!(" ({} updates)", s.events)
                } else {
                    String::new()
                };
                let label = first_line(s.situation.trim()).replace('\n', " ");
                match &s.url {
                    Some(url) => format!("- [{}]({}){}", label, url, stats),
                    None => format!("- {}{}", label, stats),
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Markdown note for one day. Sections without content are left out.
pub fn render_daily(day: &DailyResult) -> String {
    let mut sections = vec![format!("# {}", day.date.format("%-d %B (%A)"))];

    if let Some(plan) = &day.plan {
        if plan.has_focus() {
            sections.push(listize(plan.focus.as_deref().unwrap_or_default(), "- "));
        }
        if plan.has_want() {
            sections.push(format!(
                "## Want\n\n{}",
                listize(plan.want.as_deref().unwrap_or_default(), "- ")
            ));
        }
    }

    let habits: Vec<&HabitTracked> = day
        .events
        .iter()
        .filter_map(|e| match e {
            Event::HabitTracked(h) => Some(h),
            _ => None,
        })
        .collect();
    if !habits.is_empty() {
        sections.push(format!("## Habits\n\n{}", habit_line(habits)));
    }

    let work = ObservationWork::collect(&day.events);
    if work.count() > 0 {
        sections.push(format!(
            "## Work on observations ({})\n\n{}",
            work.count(),
            work.render()
        ));
    }

    let journals: Vec<String> = day
        .events
        .iter()
        .filter_map(|e| match e {
            Event::JournalAdded(j) => Some(render_journal(j, DAILY_TIME_FORMAT)),
            _ => None,
        })
        .collect();
    if !journals.is_empty() {
        sections.push(format!("## Journals\n\n{}", journals.join("\n\n")));
    }

    let outcomes: Vec<String> = day.events.iter().filter_map(render_outcome).collect();
    if !outcomes.is_empty() {
        sections.push(format!("## Projected outcomes\n\n{}", outcomes.join("\n")));
    }

    if let Some(reflection) = day.reflection.as_ref().filter(|r| !r.is_empty()) {
        let mut text = String::from("## Reflection");
        if reflection.has_good() {
            text.push_str(&format!(
                "\n\n{}",
                listize(reflection.good.as_deref().unwrap_or_default(), "- ")
            ));
        }
        if reflection.has_better() {
            text.push_str(&format!(
                "\n\n### Better\n\n{}",
                listize(reflection.better.as_deref().unwrap_or_default(), "- ")
            ));
        }
        if reflection.has_best() {
            text.push_str(&format!(
                "\n\n### Best\n\n{}",
                listize(reflection.best.as_deref().unwrap_or_default(), "- ")
            ));
        }
        sections.push(text);
    }

    let mut note = wrap_preserving_linebreaks(&sections.join("\n\n"), WRAP_WIDTH);
    note.push('\n');
    note
}
