// ABOUTME: Habit tag listing for quick reference while journaling
// ABOUTME: Writes `#tag, #tag` to stdout or a file, minus ignored habits

use crate::api::ApiClient;
use crate::model::Habit;
use crate::storage::write_atomic;
use crate::Result;
use std::path::Path;

pub fn habit_tags<'a>(habits: impl IntoIterator<Item = &'a Habit>, ignore: &[String]) -> String {
    habits
        .into_iter()
        .filter(|h| !ignore.iter().any(|i| i == &h.tagname))
        .map(|h| format!("#{}", h.tagname))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Lists habits to `output`; `-` means stdout.
pub fn list_habits(client: &ApiClient, ignore: &[String], output: &str) -> Result<()> {
    let habits = client.habits()?.collect::<Result<Vec<Habit>>>()?;
    tracing::info!(count = habits.len(), "fetched habits");
    let line = habit_tags(&habits, ignore);

    if output == "-" {
        println!("{}", line);
    } else {
        write_atomic(Path::new(output), format!("{}\n", line).as_bytes())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn habit(tag: &str) -> Habit {
        Habit {
            id: 1,
            name: tag.to_uppercase(),
            description: None,
            slug: tag.into(),
            tagname: tag.into(),
        }
    }

    #[test]
    fn test_habit_tags_skip_ignored() {
        let habits = [habit("running"), habit("meta"), habit("reading")];
        assert_eq!(
            habit_tags(&habits, &["meta".to_string()]),
            "#running, #reading"
        );
    }

    #[test]
    fn test_habit_tags_empty() {
        let none: Vec<Habit> = Vec::new();
        assert_eq!(habit_tags(&none, &[]), "");
    }
}
