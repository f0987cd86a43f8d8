// ABOUTME: Observation dump: one markdown file per matching observation
// ABOUTME: Streams pages lazily and applies the filter to every record

use super::{run_counted, Summary};
use crate::api::ApiClient;
use crate::convert::render_observation;
use crate::filter::{ObservationFilter, Selection};
use crate::model::Observation;
use crate::storage::{OutputDir, WriteDecision};
use crate::{Error, Result};

fn write_observation(
    observation: &Observation,
    output: &OutputDir,
    summary: &mut Summary,
) -> Result<()> {
    let doc = render_observation(observation);
    let decision = output.write(&doc.path, &doc.body)?;

    match decision {
        WriteDecision::Written => {
            tracing::debug!(id = observation.id, title = %doc.title, "rendered");
            println!("Created {}", output.target(&doc.path).display());
        }
        WriteDecision::SkippedExisting => {
            tracing::info!(id = observation.id, path = %doc.path.display(), "already dumped");
        }
    }

    summary.record(decision);
    Ok(())
}

pub fn dump_observations(
    client: &ApiClient,
    filter: &ObservationFilter,
    output: &OutputDir,
) -> Result<Summary> {
    run_counted(|summary| {
        if filter.matches_nothing() {
            tracing::warn!("empty date range, nothing to dump");
            return Ok(());
        }

        if let Selection::Pk(pk) = filter.selection {
            let observation = client.observation(pk)?;
            if filter.matches(&observation) {
                write_observation(&observation, output, summary)?;
            } else {
                tracing::info!(pk, "observation excluded by status filter");
            }
            return Ok(());
        }

        let mut fetched = 0usize;
        let mut matched = 0usize;
        for observation in client.observations(&filter.query())? {
            let observation = observation?;
            fetched += 1;
            if !filter.selects(&observation) {
                continue;
            }
            matched += 1;
            if filter.matches(&observation) {
                write_observation(&observation, output, summary)?;
            }
        }

        if let Selection::Stream(stream) = &filter.selection {
            if matched == 0 {
                return Err(Error::NotFound(format!("stream {}", stream)));
            }
        }

        tracing::info!(fetched, matched, "observation dump complete");
        Ok(())
    })
}
