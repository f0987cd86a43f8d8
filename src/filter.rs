// ABOUTME: Compiles --from/--to/--year/--pk/--stream/--open/--closed into one predicate
// ABOUTME: Also derives the matching API query parameters

use crate::model::Observation;
use crate::{Error, Result};
use chrono::NaiveDate;

/// Closed date interval, unbounded on a missing side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        DateRange { from, to }
    }

    pub fn year(year: i32) -> Result<Self> {
        let from = NaiveDate::from_ymd_opt(year, 1, 1);
        let to = NaiveDate::from_ymd_opt(year, 12, 31);
        match (from, to) {
            (Some(from), Some(to)) => Ok(DateRange::new(Some(from), Some(to))),
            _ => Err(Error::Config(format!("year {} is out of range", year))),
        }
    }

    /// Combines the CLI date flags. `--year` takes precedence over `--from`/`--to`.
    pub fn from_flags(
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        year: Option<i32>,
    ) -> Result<Self> {
        match year {
            Some(year) => {
                if from.is_some() || to.is_some() {
                    tracing::warn!(year, "--year given, ignoring --from/--to");
                }
                DateRange::year(year)
            }
            None => Ok(DateRange::new(from, to)),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!((self.from, self.to), (Some(from), Some(to)) if from > to)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.map_or(true, |from| from <= date) && self.to.map_or(true, |to| date <= to)
    }

    /// Concrete bounds for day-by-day fetching: `from` defaults to `today`, `to` to `from`.
    pub fn bounded(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let from = self.from.unwrap_or(today);
        (from, self.to.unwrap_or(from))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Range(DateRange),
    Pk(u64),
    Stream(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Any,
    Open,
    Closed,
}

impl Status {
    pub fn from_flags(open: bool, closed: bool) -> Self {
        match (open, closed) {
            (true, false) => Status::Open,
            (false, true) => Status::Closed,
            _ => Status::Any,
        }
    }

    fn matches(self, closed: bool) -> bool {
        match self {
            Status::Any => true,
            Status::Open => !closed,
            Status::Closed => closed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservationFilter {
    pub selection: Selection,
    pub status: Status,
}

impl ObservationFilter {
    /// `pk` beats `stream`, and both beat the date range.
    pub fn new(range: DateRange, pk: Option<u64>, stream: Option<String>, status: Status) -> Self {
        let selection = match (pk, stream) {
            (Some(pk), _) => Selection::Pk(pk),
            (None, Some(stream)) => Selection::Stream(stream),
            (None, None) => Selection::Range(range),
        };

        if !matches!(selection, Selection::Range(_)) && range != DateRange::default() {
            tracing::warn!("exact selection given, ignoring date bounds");
        }

        ObservationFilter { selection, status }
    }

    pub fn matches(&self, observation: &Observation) -> bool {
        self.selects(observation) && self.status.matches(observation.closed)
    }

    /// Selection part of `matches`, ignoring open/closed status.
    pub fn selects(&self, observation: &Observation) -> bool {
        match &self.selection {
            Selection::Range(range) => range.contains(observation.pub_date),
            Selection::Pk(pk) => observation.id == *pk,
            Selection::Stream(stream) => {
                observation.event_stream_id.as_deref() == Some(stream.as_str())
            }
        }
    }

    /// True when no observation can possibly match, so nothing needs fetching.
    pub fn matches_nothing(&self) -> bool {
        matches!(&self.selection, Selection::Range(range) if range.is_empty())
    }

    /// Query parameters narrowing a list request to the same records.
    pub fn query(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();

        match &self.selection {
            Selection::Range(range) => {
                if let Some(from) = range.from {
                    params.push(("pub_date__gte", from.to_string()));
                }
                if let Some(to) = range.to {
                    params.push(("pub_date__lte", to.to_string()));
                }
            }
            Selection::Stream(stream) => params.push(("event_stream_id", stream.clone())),
            Selection::Pk(_) => {}
        }

        match self.status {
            Status::Open => params.push(("closed", "false".into())),
            Status::Closed => params.push(("closed", "true".into())),
            Status::Any => {}
        }

        params
    }
}
