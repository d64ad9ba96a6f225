use std::collections::{HashMap, HashSet};

use crate::config::DirectoryConfig;

/// Label shown when a case has no queue history at all
pub const UNKNOWN_QUEUE: &str = "Unknown";

/// Lookup tables for queue identity, built once from config and shared read-only.
#[derive(Debug, Clone)]
pub struct QueueDirectory {
    labels: HashMap<String, String>,
    targets: HashSet<String>,
    problem_solver_labels: HashSet<String>,
    routing: ProblemSolverRouting,
    policy_url: String,
}

/// Two-way choice of the Problem Solver queue an unsure handler should use.
///
/// Keyed only on whether the case currently sits in the unloading delays
/// queue. Any third destination needs a business rule, not another row here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProblemSolverRouting {
    unloading_delays: String,
    /// `[otherwise, when_unloading_delays]`
    destinations: [String; 2],
}

impl ProblemSolverRouting {
    pub fn new(unloading_delays: &str, when_unloading_delays: &str, otherwise: &str) -> Self {
        Self {
            unloading_delays: unloading_delays.to_string(),
            destinations: [otherwise.to_string(), when_unloading_delays.to_string()],
        }
    }

    pub fn destination_for(&self, current_label: &str) -> &str {
        let in_unloading_delays = current_label == self.unloading_delays;
        &self.destinations[usize::from(in_unloading_delays)]
    }
}

impl QueueDirectory {
    pub fn from_config(config: &DirectoryConfig) -> Self {
        let mut labels = HashMap::new();
        let mut targets = HashSet::new();
        let mut problem_solver_labels = HashSet::new();

        for queue in &config.queues {
            let address = queue.address.trim();
            if address.is_empty() {
                continue;
            }
            if !queue.label.is_empty() {
                labels.insert(address.to_string(), queue.label.clone());
            }
            if queue.target {
                targets.insert(address.to_string());
            }
            if queue.problem_solver {
                let label = if queue.label.is_empty() {
                    address
                } else {
                    queue.label.as_str()
                };
                problem_solver_labels.insert(label.to_string());
            }
        }

        let routing = &config.routing;
        Self {
            labels,
            targets,
            problem_solver_labels,
            routing: ProblemSolverRouting::new(
                &routing.unloading_delays,
                &routing.when_unloading_delays,
                &routing.otherwise,
            ),
            policy_url: config.policy_url.clone(),
        }
    }

    /// Display label for a queue, the identifier itself when unlabelled
    pub fn label_for<'a>(&'a self, queue_id: &'a str) -> &'a str {
        self.labels.get(queue_id).map_or(queue_id, String::as_str)
    }

    /// Whether messages from this sender count toward the transfer flow
    pub fn is_target(&self, queue_id: &str) -> bool {
        self.targets.contains(queue_id)
    }

    pub fn is_problem_solver(&self, label: &str) -> bool {
        self.problem_solver_labels.contains(label)
    }

    pub fn routing(&self) -> &ProblemSolverRouting {
        &self.routing
    }

    pub fn policy_url(&self) -> &str {
        &self.policy_url
    }

    pub fn target_count(&self) -> usize {
        self.targets.len()
    }
}

impl Default for QueueDirectory {
    fn default() -> Self {
        Self::from_config(&DirectoryConfig::default())
    }
}

/// Directory over `queue-<name>@example.com` senders labelled `<NAME>`, for tests.
#[cfg(test)]
pub(crate) fn test_directory(names: &[&str], problem_solvers: &[&str]) -> QueueDirectory {
    use crate::config::{QueueConfig, RoutingConfig};

    let queues = names
        .iter()
        .map(|name| QueueConfig {
            address: test_address(name),
            label: name.to_uppercase(),
            target: true,
            problem_solver: problem_solvers.contains(name),
        })
        .collect();

    QueueDirectory::from_config(&DirectoryConfig {
        policy_url: "https://example.com/sop".to_string(),
        queues,
        routing: RoutingConfig {
            unloading_delays: "ULD".to_string(),
            when_unloading_delays: "PS-FL".to_string(),
            otherwise: "PS-R".to_string(),
        },
    })
}

#[cfg(test)]
pub(crate) fn test_address(name: &str) -> String {
    format!("queue-{}@example.com", name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QueueConfig;

    #[test]
    fn test_default_directory_lookups() {
        let dir = QueueDirectory::default();
        assert_eq!(dir.target_count(), 20);
        assert_eq!(
            dir.label_for("eu-roc-ob-unloading-delays@amazon.com"),
            "Unloading Delays"
        );
        assert!(dir.is_target("eu-roc-safety@amazon.com"));
        assert!(!dir.is_target("someone@amazon.com"));
        assert!(dir.is_problem_solver("Rail Problem Solver"));
        assert!(!dir.is_problem_solver("Safety"));
        assert_eq!(
            dir.policy_url(),
            "https://policy.a2z.com/docs/694472/publication"
        );
    }

    #[test]
    fn test_unknown_queue_uses_identifier() {
        let dir = QueueDirectory::default();
        assert_eq!(dir.label_for("new-queue@amazon.com"), "new-queue@amazon.com");
    }

    #[test]
    fn test_routing_table() {
        let dir = QueueDirectory::default();
        let routing = dir.routing();
        assert_eq!(routing.destination_for("Unloading Delays"), "DM FL Problem Solver");
        assert_eq!(routing.destination_for("Safety"), "DM R Problem Solver");
        assert_eq!(routing.destination_for(UNKNOWN_QUEUE), "DM R Problem Solver");
    }

    #[test]
    fn test_non_target_and_unlabelled_entries() {
        let mut config = DirectoryConfig::default();
        config.queues = vec![
            QueueConfig {
                address: "watch@example.com".to_string(),
                label: "Watcher".to_string(),
                target: false,
                problem_solver: false,
            },
            QueueConfig {
                address: "bare@example.com".to_string(),
                label: String::new(),
                target: true,
                problem_solver: true,
            },
            QueueConfig {
                address: "  ".to_string(),
                label: "Blank".to_string(),
                target: true,
                problem_solver: false,
            },
        ];
        let dir = QueueDirectory::from_config(&config);
        assert_eq!(dir.target_count(), 1);
        assert!(!dir.is_target("watch@example.com"));
        assert_eq!(dir.label_for("watch@example.com"), "Watcher");
        assert_eq!(dir.label_for("bare@example.com"), "bare@example.com");
        assert!(dir.is_problem_solver("bare@example.com"));
    }
}
