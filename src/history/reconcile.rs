//! TODO set reconciliation across revisions

use crate::models::{ReconciliationEvent, Revision, TodoStatus};
use crate::todo::TodoExtractor;
use std::collections::BTreeSet;
use tracing::debug;

/// Turn chronological `(revision, content)` pairs into TODO change events.
///
/// Each revision's TODO set is compared with the baseline: the set at the
/// most recent earlier revision whose content could be read, empty at the
/// start. Revisions with no content are skipped and leave the baseline
/// untouched. Revisions whose set matches the baseline produce no event.
pub fn reconcile<I>(extractor: &TodoExtractor, snapshots: I) -> Vec<ReconciliationEvent>
where
    I: IntoIterator<Item = (Revision, Option<String>)>,
{
    let mut baseline = BTreeSet::new();
    let mut events = Vec::new();

    for (revision, content) in snapshots {
        let Some(content) = content else {
            debug!("Skipping {} ({}): no snapshot", revision.short_id(), revision.path);
            continue;
        };

        let current = extractor.extract(&content);
        let added: Vec<String> = current.difference(&baseline).cloned().collect();
        let removed: Vec<String> = baseline.difference(&current).cloned().collect();

        if !added.is_empty() || !removed.is_empty() {
            debug!(
                "{}: +{} -{} TODOs",
                revision.short_id(),
                added.len(),
                removed.len()
            );
            events.push(ReconciliationEvent::new(revision, added, removed));
        }
        baseline = current;
    }

    events
}

/// TODO set after replaying `events` in order from an empty set.
pub fn replay<'a, I>(events: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a ReconciliationEvent>,
{
    let mut todos = BTreeSet::new();
    for event in events {
        for item in &event.todos {
            match item.status {
                TodoStatus::Added => todos.insert(item.todo.clone()),
                TodoStatus::Removed => todos.remove(&item.todo),
            };
        }
    }
    todos
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LogEntry;
    use chrono::{TimeZone, Utc};

    fn rev(id: &str, seconds: i64) -> Revision {
        let entry = LogEntry::new(id, "Dev", "dev@example.com", Utc.timestamp_opt(seconds, 0).unwrap(), id);
        Revision::from_entry(entry, "app.py".into())
    }

    fn snap(id: &str, seconds: i64, content: Option<&str>) -> (Revision, Option<String>) {
        (rev(id, seconds), content.map(str::to_string))
    }

    #[test]
    fn test_three_revisions() {
        let extractor = TodoExtractor::default();
        let events = reconcile(
            &extractor,
            vec![
                snap("r1", 1, Some("# TODO: a\n# TODO: b\n")),
                snap("r2", 2, Some("# TODO: b\n# TODO: c\n")),
                snap("r3", 3, Some("# TODO: c\n")),
            ],
        );

        assert_eq!(events.len(), 3);
        assert_eq!(events[0].added().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(events[0].removed().count(), 0);
        assert_eq!(events[1].added().collect::<Vec<_>>(), vec!["c"]);
        assert_eq!(events[1].removed().collect::<Vec<_>>(), vec!["a"]);
        assert_eq!(events[2].added().count(), 0);
        assert_eq!(events[2].removed().collect::<Vec<_>>(), vec!["b"]);
    }

    #[test]
    fn test_missing_snapshot_keeps_baseline() {
        let extractor = TodoExtractor::default();
        let events = reconcile(
            &extractor,
            vec![
                snap("r1", 1, Some("# TODO: a\n")),
                snap("r2", 2, None),
                snap("r3", 3, Some("# TODO: a\n# TODO: b\n")),
            ],
        );

        assert_eq!(events.len(), 2);
        assert_eq!(events[1].revision.id, "r3");
        assert_eq!(events[1].added().collect::<Vec<_>>(), vec!["b"]);
        assert_eq!(events[1].removed().count(), 0);
    }

    #[test]
    fn test_unchanged_revision_has_no_event() {
        let extractor = TodoExtractor::default();
        let events = reconcile(
            &extractor,
            vec![
                snap("r1", 1, Some("# TODO: a\n")),
                snap("r2", 2, Some("x = 1\n# TODO: a\n")),
            ],
        );
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].revision.id, "r1");
    }

    #[test]
    fn test_empty_file_removes_everything() {
        let extractor = TodoExtractor::default();
        let events = reconcile(
            &extractor,
            vec![snap("r1", 1, Some("# TODO: a\n")), snap("r2", 2, Some(""))],
        );
        assert_eq!(events[1].removed().collect::<Vec<_>>(), vec!["a"]);
    }

    #[test]
    fn test_no_todos_anywhere() {
        let extractor = TodoExtractor::default();
        let events = reconcile(&extractor, vec![snap("r1", 1, Some("print(1)\n"))]);
        assert!(events.is_empty());
        assert!(reconcile(&extractor, Vec::new()).is_empty());
    }

    #[test]
    fn test_replay_matches_last_snapshot() {
        let extractor = TodoExtractor::default();
        let contents = [
            "# TODO: a\n",
            "# TODO: a\n# TODO: b\n",
            "# TODO: c\n",
            "",
            "# TODO: a\n# TODO: d\n",
        ];
        let snapshots: Vec<_> = contents
            .iter()
            .enumerate()
            .map(|(i, c)| snap(&format!("r{i}"), i as i64, Some(c)))
            .collect();

        let events = reconcile(&extractor, snapshots.clone());
        let expected = extractor.extract(contents[contents.len() - 1]);
        assert_eq!(replay(&events), expected);

        // Same input, same output
        assert_eq!(reconcile(&extractor, snapshots), events);
    }

    #[test]
    fn test_event_sets_are_disjoint() {
        let extractor = TodoExtractor::default();
        let events = reconcile(
            &extractor,
            vec![
                snap("r1", 1, Some("# TODO: a\n# TODO: b\n")),
                snap("r2", 2, Some("# TODO: b\n# TODO: c\n")),
            ],
        );
        for event in &events {
            let added: BTreeSet<_> = event.added().collect();
            assert!(event.removed().all(|t| !added.contains(t)));
            assert!(!event.todos.is_empty());
        }
    }
}
