use serde::Serialize;

use super::directory::QueueDirectory;
use super::escalation::{EscalationResult, classify};
use super::flow::reduce;
use super::source::CaseSource;
use super::types::{Correspondence, TransferFlow};

/// Flow and escalation for one case at one point in time
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseAnalysis {
    pub case_id: String,
    pub flow: TransferFlow,
    pub transfer_count: usize,
    pub escalation: EscalationResult,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScanOutcome {
    /// The task has no case behind it (or the lookup failed)
    NoCase,
    Analyzed(CaseAnalysis),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    pub task_id: String,
    pub outcome: ScanOutcome,
}

impl ScanReport {
    pub fn analysis(&self) -> Option<&CaseAnalysis> {
        match &self.outcome {
            ScanOutcome::Analyzed(analysis) => Some(analysis),
            ScanOutcome::NoCase => None,
        }
    }
}

/// Reduce and classify an already fetched correspondence list
pub fn analyze(case_id: &str, records: &[Correspondence], directory: &QueueDirectory) -> CaseAnalysis {
    let flow = reduce(records, directory);
    let transfer_count = flow.transfer_count();
    let escalation = classify(transfer_count as i64, &flow, directory);

    CaseAnalysis {
        case_id: case_id.to_string(),
        flow,
        transfer_count,
        escalation,
    }
}

/// Look up the case behind a task, fetch its messages and analyze them.
///
/// Fetch failures never escape: a failed case lookup reports `NoCase`, and a
/// failed message fetch is analyzed as an empty list (0 transfers).
pub fn scan_task(source: &dyn CaseSource, task_id: &str, directory: &QueueDirectory) -> ScanReport {
    let case_id = match source.case_id_for_task(task_id) {
        Ok(Some(case_id)) => case_id,
        Ok(None) => {
            tracing::info!(task_id, "Task has no case");
            return no_case(task_id);
        }
        Err(e) => {
            tracing::error!(task_id, "Failed to fetch case ID: {}", e);
            return no_case(task_id);
        }
    };

    let records = source.correspondences(&case_id).unwrap_or_else(|e| {
        tracing::error!(case_id = %case_id, "Failed to fetch messages: {}", e);
        Vec::new()
    });

    let analysis = analyze(&case_id, &records, directory);
    log_analysis(&analysis);

    ScanReport {
        task_id: task_id.to_string(),
        outcome: ScanOutcome::Analyzed(analysis),
    }
}

fn no_case(task_id: &str) -> ScanReport {
    ScanReport {
        task_id: task_id.to_string(),
        outcome: ScanOutcome::NoCase,
    }
}

fn log_analysis(analysis: &CaseAnalysis) {
    let tier = analysis.escalation.tier;
    tracing::info!(
        case_id = %analysis.case_id,
        transfers = analysis.transfer_count,
        tier = tier.label(),
        current = %analysis.escalation.current_queue_label,
        "Transfer route scanned"
    );
    if let Some(guidance) = &analysis.escalation.guidance {
        tracing::warn!(
            case_id = %analysis.case_id,
            "{}: {} transfers. {}",
            tier.label(),
            analysis.transfer_count,
            guidance.headline
        );
    }
    for (i, entry) in analysis.flow.iter().enumerate() {
        tracing::debug!("{}. {} ({})", i + 1, entry.label, entry.queue_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cases::directory::{test_address, test_directory};
    use crate::cases::escalation::EscalationTier;
    use crate::cases::source::FetchError;
    use std::collections::HashMap;

    /// In-memory source: task -> case, case -> messages (or a failure)
    #[derive(Default)]
    struct FakeSource {
        cases: HashMap<String, String>,
        messages: HashMap<String, Vec<Correspondence>>,
        fail_lookup: bool,
    }

    impl CaseSource for FakeSource {
        fn case_id_for_task(&self, task_id: &str) -> Result<Option<String>, FetchError> {
            if self.fail_lookup {
                return Err(FetchError::Status {
                    url: format!("/wims/task/{}", task_id),
                    status: 500,
                });
            }
            Ok(self.cases.get(task_id).cloned())
        }

        fn correspondences(&self, case_id: &str) -> Result<Vec<Correspondence>, FetchError> {
            self.messages
                .get(case_id)
                .cloned()
                .ok_or_else(|| FetchError::Status {
                    url: format!("/wims/case/{}/messages", case_id),
                    status: 404,
                })
        }
    }

    fn dir() -> QueueDirectory {
        test_directory(&["a", "b", "c", "d", "e", "f", "g"], &[])
    }

    fn source_with(task: &str, case: &str, names: &[&str]) -> FakeSource {
        let mut source = FakeSource::default();
        source.cases.insert(task.to_string(), case.to_string());
        source.messages.insert(
            case.to_string(),
            names
                .iter()
                .enumerate()
                .map(|(i, n)| Correspondence::new(&test_address(n), i as i64 * 10))
                .rev()
                .collect(),
        );
        source
    }

    #[test]
    fn test_scan_seven_queues_is_critical() {
        let source = source_with("t1", "c1", &["a", "b", "c", "d", "e", "f", "g"]);
        let report = scan_task(&source, "t1", &dir());
        let analysis = report.analysis().unwrap();
        assert_eq!(analysis.case_id, "c1");
        assert_eq!(analysis.transfer_count, 6);
        assert_eq!(analysis.escalation.tier, EscalationTier::Critical);
        assert_eq!(analysis.flow.current().unwrap().label, "G");
    }

    #[test]
    fn test_scan_task_without_case() {
        let source = FakeSource::default();
        let report = scan_task(&source, "signal", &dir());
        assert_eq!(report.outcome, ScanOutcome::NoCase);
        assert_eq!(report.task_id, "signal");
    }

    #[test]
    fn test_scan_lookup_failure_is_no_case() {
        let source = FakeSource {
            fail_lookup: true,
            ..FakeSource::default()
        };
        assert_eq!(scan_task(&source, "t1", &dir()).outcome, ScanOutcome::NoCase);
    }

    #[test]
    fn test_scan_message_failure_is_zero_transfers() {
        let mut source = FakeSource::default();
        source.cases.insert("t1".to_string(), "c1".to_string());
        let report = scan_task(&source, "t1", &dir());
        let analysis = report.analysis().unwrap();
        assert_eq!(analysis.transfer_count, 0);
        assert!(analysis.flow.is_empty());
        assert_eq!(analysis.escalation.tier, EscalationTier::Normal);
    }

    #[test]
    fn test_analyze_matches_flow_count() {
        let records: Vec<Correspondence> = ["a", "b", "a"]
            .iter()
            .enumerate()
            .map(|(i, n)| Correspondence::new(&test_address(n), i as i64))
            .collect();
        let analysis = analyze("c9", &records, &dir());
        assert_eq!(analysis.transfer_count, 2);
        assert_eq!(analysis.escalation.transfer_count, 2);
        assert_eq!(analysis.escalation.tier, EscalationTier::Normal);
    }

    #[test]
    fn test_report_serializes_with_status_tag() {
        let source = source_with("t1", "c1", &["a", "b"]);
        let report = scan_task(&source, "t1", &dir());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["outcome"]["status"], "analyzed");
        assert_eq!(json["outcome"]["escalation"]["tier"], "NORMAL");
        assert_eq!(json["outcome"]["flow"][1]["label"], "B");
    }
}
