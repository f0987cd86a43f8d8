// ABOUTME: Converts fetched records to deterministic Markdown documents
// ABOUTME: Observation files here; daily notes and reflections in submodules

pub mod events;
pub mod reflection;

use crate::model::Observation;
use crate::util::{escape_headings, first_line, slugify};
use std::path::PathBuf;

const SLUG_MAX_LEN: usize = 32;

/// A rendered document and the path it belongs at, relative to the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub path: PathBuf,
    pub title: String,
    pub body: String,
}

/// User-entered text: carriage returns dropped, outer blank space trimmed, headings escaped.
pub(crate) fn clean_text(text: Option<&str>) -> String {
    escape_headings(text.unwrap_or_default().replace('\r', "").trim())
}

/// Lines quoted with a leading `>`, in order, with the marker removed.
fn good_points<'a>(fields: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    fields
        .into_iter()
        .flat_map(str::lines)
        .filter_map(|line| line.trim_start().strip_prefix('>'))
        .map(|rest| rest.strip_prefix(' ').unwrap_or(rest).trim_end_matches('\r'))
        .filter(|point| !point.trim().is_empty())
        .map(str::to_string)
        .collect()
}

pub fn observation_filename(observation: &Observation) -> PathBuf {
    let slug = slugify(&observation.situation, SLUG_MAX_LEN);
    let name = if slug.is_empty() {
        format!("{}-{}.md", observation.pub_date, observation.id)
    } else {
        format!("{}-{}-{}.md", observation.pub_date, slug, observation.id)
    };
    PathBuf::from(name)
}

pub fn render_observation(observation: &Observation) -> Document {
    let mut body = format!("> Date: {}\n", observation.pub_date);
    if let Some(thread) = &observation.thread {
        body.push_str(&format!("> Thread: {}\n", thread));
    }
    if let Some(kind) = &observation.kind {
        body.push_str(&format!("> Type: {}\n", kind));
    }
    if let Some(stream) = &observation.event_stream_id {
        body.push_str(&format!("> Stream: {}\n", stream));
    }
    if observation.closed {
        body.push_str("> Status: closed\n");
    }

    let sections = [
        ("Situation (What happened?)", Some(observation.situation.as_str())),
        (
            "Interpretation (How you saw it, what you felt?)",
            observation.interpretation.as_deref(),
        ),
        (
            "Approach (How should you approach it in the future?)",
            observation.approach.as_deref(),
        ),
    ];

    for (heading, text) in sections {
        body.push_str(&format!("\n# {}\n\n", heading));
        let text = clean_text(text);
        if !text.is_empty() {
            body.push_str(&text);
            body.push('\n');
        }
    }

    let points = good_points(
        [
            Some(observation.situation.as_str()),
            observation.interpretation.as_deref(),
            observation.approach.as_deref(),
        ]
        .into_iter()
        .flatten()
        .chain(observation.updates.iter().map(|u| u.comment.as_str())),
    );
    if !points.is_empty() {
        body.push_str("\n# Good points\n\n");
        for point in points {
            body.push_str(&format!("- {}\n", point));
        }
    }

    if !observation.updates.is_empty() {
        body.push_str("\n# Updates\n");
        for update in &observation.updates {
            body.push_str(&format!(
                "\n## {}\n\n",
                update.published.format("%Y-%m-%d %H:%M")
            ));
            let comment = clean_text(Some(&update.comment));
            if !comment.is_empty() {
                body.push_str(&comment);
                body.push('\n');
            }
        }
    }

    Document {
        path: observation_filename(observation),
        title: first_line(observation.situation.trim()),
        body,
    }
}


#[cfg(test)]
mod snapshot_tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_observation_snapshot() {
        let obs = Observation {
            id: 7,
            url: None,
            pub_date: NaiveDate::from_ymd_opt(2024, 1, 12).unwrap(),
            thread: Some("big-picture".into()),
            kind: Some("insight".into()),
            situation: "Planning week felt calm".into(),
            interpretation: Some("Fewer meetings".into()),
            approach: None,
            event_stream_id: None,
            closed: false,
            updates: vec![],
        };

        insta::assert_snapshot!(render_observation(&obs).body, @r"
        > Date: 2024-01-12
        > Thread: big-picture
        > Type: insight

        # Situation (What happened?)

        Planning week felt calm

        # Interpretation (How you saw it, what you felt?)

        Fewer meetings

        # Approach (How should you approach it in the future?)
        ");
    }
}
