use std::collections::HashMap;

use anyhow::Result;
use futures::StreamExt;

use crate::{
    api::{ApiClient, Category, TaskSnapshot},
    output::OutputHandler,
};

/// Latest snapshot per task, in the order tasks first appeared
#[derive(Debug, Default)]
pub struct RunTally {
    order: Vec<String>,
    latest: HashMap<String, TaskSnapshot>,
}

impl RunTally {
    pub fn record(&mut self, snapshot: TaskSnapshot) {
        if !self.latest.contains_key(&snapshot.id) {
            self.order.push(snapshot.id.clone());
        }
        self.latest.insert(snapshot.id.clone(), snapshot);
    }

    pub fn tasks(&self) -> impl Iterator<Item = &TaskSnapshot> {
        self.order.iter().filter_map(|id| self.latest.get(id))
    }

    pub fn count(&self, status: &str) -> usize {
        self.tasks().filter(|t| t.status == status).count()
    }

    pub fn unfinished(&self) -> Vec<&TaskSnapshot> {
        self.tasks().filter(|t| !t.is_terminal()).collect()
    }

    pub fn all_failed(&self) -> bool {
        !self.order.is_empty() && self.count("ERROR") == self.order.len()
    }
}

/// Pick the requested keys out of the server's list, keeping request order
pub fn select_categories(available: &[Category], keys: &[String]) -> Result<Vec<Category>> {
    keys.iter()
        .map(|key| {
            available
                .iter()
                .find(|c| c.api_value.eq_ignore_ascii_case(key))
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("Unknown category: {}", key))
        })
        .collect()
}

pub async fn list_categories(api: &ApiClient, out: &OutputHandler) -> Result<()> {
    let categories = api.list_categories().await?;
    out.print_header("Categories");
    out.print_categories(&categories);
    Ok(())
}

/// Run a batch to completion. Returns the final tally for the exit code.
pub async fn run_batch(api: &ApiClient, out: &OutputHandler, keys: &[String]) -> Result<RunTally> {
    let selected = if keys.is_empty() {
        None
    } else {
        Some(select_categories(&api.list_categories().await?, keys)?)
    };

    out.print_header("Batch run");
    let stream = api.start_batch(selected.as_deref()).await?;
    futures::pin_mut!(stream);

    let mut tally = RunTally::default();
    while let Some(item) = stream.next().await {
        match item {
            Ok(snapshot) => {
                out.print_snapshot(&snapshot);
                tally.record(snapshot);
            }
            Err(e) => {
                out.print_error(&format!("{:#}", e));
                break;
            }
        }
    }

    print_summary(out, &tally);
    Ok(tally)
}

fn print_summary(out: &OutputHandler, tally: &RunTally) {
    out.print_header(&format!(
        "Summary: {} done, {} failed",
        tally.count("DONE"),
        tally.count("ERROR")
    ));

    for task in tally.tasks() {
        match (&task.result, &task.error) {
            (Some(result), _) => {
                out.print_success(&format!(
                    "{}: {} ({}, {})",
                    task.category_name, result.image_url, result.source_name, result.source_url
                ));
                if out.verbose {
                    out.print_info(&result.caption);
                }
            }
            (None, Some(error)) => out.print_error(&format!("{}: {}", task.category_name, error)),
            (None, None) => {}
        }
    }

    for task in tally.unfinished() {
        out.print_warning(&format!(
            "{} stopped at {} before the stream ended",
            task.category_name, task.status
        ));
    }
    if tally.all_failed() {
        out.print_info("Every category failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(id: &str, status: &str, error: Option<&str>) -> TaskSnapshot {
        TaskSnapshot {
            id: id.to_string(),
            category_name: id.to_uppercase(),
            status: status.to_string(),
            error: error.map(str::to_string),
            result: None,
        }
    }

    #[test]
    fn tally_keeps_latest_status_in_first_seen_order() {
        let mut tally = RunTally::default();
        tally.record(snapshot("b", "PENDING", None));
        tally.record(snapshot("a", "PENDING", None));
        tally.record(snapshot("b", "GATHERING", None));
        tally.record(snapshot("b", "ERROR", Some("boom")));

        let ids: Vec<&str> = tally.tasks().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["b", "a"]);
        assert_eq!(tally.count("ERROR"), 1);
        assert_eq!(tally.unfinished().len(), 1);
        assert!(!tally.all_failed());

        tally.record(snapshot("a", "ERROR", Some("no articles")));
        assert!(tally.all_failed());
    }

    #[test]
    fn empty_tally_is_not_all_failed() {
        assert!(!RunTally::default().all_failed());
    }

    #[test]
    fn selects_requested_categories_in_order() {
        let available = vec![
            Category { name: "Top".into(), api_value: "top".into() },
            Category { name: "Science".into(), api_value: "science".into() },
        ];
        let selected = select_categories(&available, &["Science".to_string(), "top".to_string()]).unwrap();
        assert_eq!(selected[0].api_value, "science");
        assert_eq!(selected[1].api_value, "top");

        let err = select_categories(&available, &["weather".to_string()]).unwrap_err();
        assert_eq!(err.to_string(), "Unknown category: weather");
    }
}
