// ABOUTME: Aggregates a range of daily results into one editable reflection note
// ABOUTME: Week, month and free-range variants with habit and observation summaries

use super::events::{render_journal, ObservationWork, WEEKDAY_TIME_FORMAT};
use crate::model::{not_empty, DailyResult, Event, HabitTracked, JournalAdded, Reflection};
use crate::util::{escape_headings, listize};
use chrono::{Datelike, NaiveDate, Weekday};
use std::path::PathBuf;

const CHECKBOX: &str = "- [ ] ";
const BREAKTHROUGH_TAG: &str = "breakthrough";
const MONTH_TIME_FORMAT: &str = "%-d %b, %H:%M";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReflectionMode {
    #[default]
    Range,
    Week,
    Month,
}

/// File name for a reflection covering `from..=to`.
pub fn reflection_filename(mode: ReflectionMode, from: NaiveDate, to: NaiveDate) -> PathBuf {
    let name = match mode {
        ReflectionMode::Week => {
            let week = from.iso_week();
            format!("{}-W{:02}.md", week.year(), week.week())
        }
        ReflectionMode::Month => format!("{}-{:02}.md", from.year(), from.month()),
        ReflectionMode::Range if from == to => format!("{}.md", from),
        ReflectionMode::Range => format!("{}_{}.md", from, to),
    };
    PathBuf::from(name)
}

fn long_date(date: NaiveDate) -> String {
    date.format("%-d %B (%A)").to_string()
}

#[derive(Default)]
struct HabitGroup {
    tag: String,
    count: usize,
    weekdays: Vec<Weekday>,
    notes: Vec<String>,
}

fn habit_groups<'a>(habits: impl IntoIterator<Item = &'a HabitTracked>) -> Vec<HabitGroup> {
    let mut groups: Vec<HabitGroup> = Vec::new();

    for tracked in habits {
        let tag = &tracked.habit.tagname;
        let index = match groups.iter().position(|g| &g.tag == tag) {
            Some(index) => index,
            None => {
                groups.push(HabitGroup {
                    tag: tag.clone(),
                    ..HabitGroup::default()
                });
                groups.len() - 1
            }
        };

        let group = &mut groups[index];
        if tracked.occurred {
            group.count += 1;
        }
        let weekday = tracked.published.weekday();
        if !group.weekdays.contains(&weekday) {
            group.weekdays.push(weekday);
        }
        if let Some(note) = tracked.note.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            group.notes.push(escape_headings(&note.replace('\n', " ")));
        }
    }

    for group in &mut groups {
        group.weekdays.sort_by_key(Weekday::num_days_from_monday);
    }
    groups
}

fn render_habit_group(group: &HabitGroup) -> String {
    let days = group
        .weekdays
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    let times = if group.count == 1 { "time" } else { "times" };

    let mut out = format!("- #{}: {} {} on {}", group.tag, group.count, times, days);
    for note in &group.notes {
        out.push_str(&format!("\n  - {}", note));
    }
    out
}

fn is_breakthrough(journal: &JournalAdded) -> bool {
    journal
        .tags
        .iter()
        .any(|t| t.eq_ignore_ascii_case(BREAKTHROUGH_TAG))
}

/// Reflection note over a set of days.
pub struct ReflectionReport<'a> {
    pub days: &'a [DailyResult],
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub mode: ReflectionMode,
    pub skip_journals: bool,
}

impl<'a> ReflectionReport<'a> {
    pub fn title(&self) -> String {
        if self.from == self.to {
            format!("Reflection on {}", long_date(self.from))
        } else {
            format!(
                "Reflection from {} to {}",
                long_date(self.from),
                long_date(self.to)
            )
        }
    }

    fn events(&self) -> impl Iterator<Item = &'a Event> {
        let days: &'a [DailyResult] = self.days;
        days.iter().flat_map(|d| d.events.iter())
    }

    fn journals(&self) -> impl Iterator<Item = &'a JournalAdded> {
        self.events().filter_map(|e| match e {
            Event::JournalAdded(j) => Some(j),
            _ => None,
        })
    }

    fn checklist<F>(&self, pick: F) -> String
    where
        F: Fn(&'a DailyResult) -> Option<&'a str>,
    {
        let days: &'a [DailyResult] = self.days;
        days.iter()
            .filter_map(pick)
            .map(|text| listize(text, CHECKBOX))
            .filter(|list| !list.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn render(&self) -> String {
        let mut sections = vec![format!("# {}", self.title())];

        let reflections = |pick: fn(&Reflection) -> Option<&str>| {
            self.checklist(move |d| {
                d.reflection
                    .as_ref()
                    .filter(|r| not_empty(pick(r)))
                    .and_then(pick)
            })
        };

        let good = reflections(|r| r.good.as_deref());
        if !good.is_empty() {
            sections.push(good);
        }
        let better = reflections(|r| r.better.as_deref());
        sections.push(if better.is_empty() {
            "## Better".to_string()
        } else {
            format!("## Better\n\n{}", better)
        });
        let best = reflections(|r| r.best.as_deref());
        sections.push(if best.is_empty() {
            "## Best".to_string()
        } else {
            format!("## Best\n\n{}", best)
        });

        if self.mode == ReflectionMode::Month {
            let breakthroughs: Vec<String> = self
                .journals()
                .filter(|j| is_breakthrough(j))
                .map(|j| render_journal(j, MONTH_TIME_FORMAT))
                .collect();
            if !breakthroughs.is_empty() {
                sections.push(format!("# Breakthroughs\n\n{}", breakthroughs.join("\n\n")));
            }
        }

        let focus = self.checklist(|d| {
            d.plan
                .as_ref()
                .filter(|p| p.has_focus())
                .and_then(|p| p.focus.as_deref())
        });
        let want = self.checklist(|d| {
            d.plan
                .as_ref()
                .filter(|p| p.has_want())
                .and_then(|p| p.want.as_deref())
        });
        if !focus.is_empty() || !want.is_empty() {
            let mut plans = String::from("# Plans");
            if !focus.is_empty() {
                plans.push_str(&format!("\n\n{}", focus));
            }
            if !want.is_empty() {
                plans.push_str(&format!("\n\n## Want\n\n{}", want));
            }
            sections.push(plans);
        }

        let groups = habit_groups(self.events().filter_map(|e| match e {
            Event::HabitTracked(h) => Some(h),
            _ => None,
        }));
        if !groups.is_empty() {
            let rendered: Vec<String> = groups.iter().map(render_habit_group).collect();
            sections.push(format!("# Habits\n\n{}", rendered.join("\n")));
        }

        let work = ObservationWork::collect(self.events());
        if work.count() > 0 {
            sections.push(format!(
                "# Work on observations ({})\n\n{}",
                work.count(),
                work.render()
            ));
        }

        if !self.skip_journals && self.mode != ReflectionMode::Month {
            let journals: Vec<String> = self
                .journals()
                .map(|j| render_journal(j, WEEKDAY_TIME_FORMAT))
                .collect();
            if !journals.is_empty() {
                sections.push(format!("# Journals\n\n{}", journals.join("\n\n")));
            }
        }

        let mut note = sections.join("\n\n");
        note.push('\n');
        note
    }
}
