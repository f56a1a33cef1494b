//! The task graph shared by all builders in a pass
//!
//! Tasks are kept in insertion order and keyed by `<Kind>/<name>`. The graph
//! owns deduplication: builders only append.

use indexmap::map::Entry;
use indexmap::IndexMap;
use keel_common::{Error, Result};
use serde::{Serialize, Serializer};
use tracing::{debug, warn};

use crate::link::TaskKey;
use crate::task::{Task, TaskKind};

/// Insertion-ordered, name-deduplicated collection of tasks
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TaskGraph {
    tasks: IndexMap<TaskKey, Task>,
}

impl TaskGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a task
    ///
    /// Re-adding a task identical to the one already stored under its key is a
    /// no-op. Adding a different task under an existing key fails with
    /// [`Error::DuplicateTask`] and leaves the graph unchanged.
    pub fn add_task(&mut self, task: impl Into<Task>) -> Result<()> {
        let task = task.into();
        match self.tasks.entry(task.key()) {
            Entry::Vacant(entry) => {
                entry.insert(task);
                Ok(())
            }
            Entry::Occupied(entry) if *entry.get() == task => {
                debug!(task = %entry.key(), "task already present, merging");
                Ok(())
            }
            Entry::Occupied(entry) => Err(Error::duplicate_task(entry.key().to_string())),
        }
    }

    /// Look up a task by key
    pub fn get(&self, key: &TaskKey) -> Option<&Task> {
        self.tasks.get(key)
    }

    /// Look up a task of kind `T` by name
    pub fn find<T: TaskKind>(&self, name: &str) -> Option<&T> {
        self.tasks
            .get(&TaskKey::of::<T>(name))
            .and_then(T::from_task)
    }

    /// All tasks of kind `T`, in insertion order
    pub fn of_kind<'a, T: TaskKind + 'a>(&'a self) -> impl Iterator<Item = &'a T> {
        self.tasks.values().filter_map(T::from_task)
    }

    /// All tasks, in insertion order
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    /// All task keys, in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &TaskKey> {
        self.tasks.keys()
    }

    /// Number of tasks
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the graph holds no tasks
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Verify every link points at a task present in the graph
    ///
    /// Run once all builders of a pass have appended their tasks. Every
    /// dangling link is reported in a single [`Error::UnresolvedLink`].
    pub fn resolve(&self) -> Result<()> {
        let dangling: Vec<String> = self
            .tasks
            .iter()
            .flat_map(|(key, task)| {
                task.links()
                    .into_iter()
                    .filter(|target| !self.tasks.contains_key(target))
                    .map(move |target| format!("{key} -> {target}"))
            })
            .collect();

        if dangling.is_empty() {
            debug!(tasks = self.tasks.len(), "all links resolved");
            Ok(())
        } else {
            for link in &dangling {
                warn!(link = %link, "unresolved link");
            }
            Err(Error::UnresolvedLink { links: dangling })
        }
    }
}

impl Serialize for TaskGraph {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(self.tasks.values())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::Link;
    use crate::task::{SecurityGroup, SecurityGroupRule, Vpc};

    fn vpc(name: &str) -> Vpc {
        Vpc {
            name: name.to_string(),
            cidr: Some("10.0.0.0/16".to_string()),
        }
    }

    fn group(name: &str, vpc: &str) -> SecurityGroup {
        SecurityGroup {
            name: name.to_string(),
            vpc: Link::named(vpc),
            description: "test".to_string(),
            remove_extra_rules: vec![],
        }
    }

    #[test]
    fn test_tasks_keep_insertion_order() {
        let mut graph = TaskGraph::new();
        graph.add_task(group("b", "c")).unwrap();
        graph.add_task(vpc("c")).unwrap();
        graph.add_task(group("a", "c")).unwrap();

        let keys: Vec<String> = graph.keys().map(ToString::to_string).collect();
        assert_eq!(keys, vec!["SecurityGroup/b", "Vpc/c", "SecurityGroup/a"]);
    }

    #[test]
    fn test_identical_task_merges() {
        let mut graph = TaskGraph::new();
        graph.add_task(vpc("c")).unwrap();
        graph.add_task(vpc("c")).unwrap();
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn test_conflicting_task_is_rejected() {
        let mut graph = TaskGraph::new();
        graph.add_task(vpc("c")).unwrap();

        let conflicting = Vpc {
            name: "c".to_string(),
            cidr: None,
        };
        let err = graph.add_task(conflicting).unwrap_err();

        assert!(matches!(err, Error::DuplicateTask { ref key } if key == "Vpc/c"));
        assert_eq!(graph.find::<Vpc>("c").unwrap().cidr.as_deref(), Some("10.0.0.0/16"));
    }

    #[test]
    fn test_same_name_different_kind_coexist() {
        let mut graph = TaskGraph::new();
        graph.add_task(vpc("c")).unwrap();
        graph.add_task(group("c", "c")).unwrap();
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn test_resolve_succeeds_when_targets_exist() {
        let mut graph = TaskGraph::new();
        graph
            .add_task(SecurityGroupRule {
                egress: true,
                cidr: Some("0.0.0.0/0".to_string()),
                ..SecurityGroupRule::new("egress", Link::named("sg"))
            })
            .unwrap();
        graph.add_task(group("sg", "c")).unwrap();
        graph.add_task(vpc("c")).unwrap();

        assert!(graph.resolve().is_ok());
    }

    #[test]
    fn test_resolve_reports_all_dangling_links() {
        let mut graph = TaskGraph::new();
        graph
            .add_task(SecurityGroupRule {
                source_group: Some(Link::named("other")),
                ..SecurityGroupRule::new("rule", Link::named("sg"))
            })
            .unwrap();

        match graph.resolve().unwrap_err() {
            Error::UnresolvedLink { links } => assert_eq!(
                links,
                vec![
                    "SecurityGroupRule/rule -> SecurityGroup/sg",
                    "SecurityGroupRule/rule -> SecurityGroup/other",
                ]
            ),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_of_kind_filters() {
        let mut graph = TaskGraph::new();
        graph.add_task(vpc("c")).unwrap();
        graph.add_task(group("a", "c")).unwrap();
        graph.add_task(group("b", "c")).unwrap();

        let names: Vec<&str> = graph.of_kind::<SecurityGroup>().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_graph_serializes_as_task_list() {
        let mut graph = TaskGraph::new();
        graph.add_task(vpc("c")).unwrap();
        let json = serde_json::to_value(&graph).unwrap();
        assert_eq!(json, serde_json::json!([{ "kind": "Vpc", "name": "c", "cidr": "10.0.0.0/16" }]));
    }
}
