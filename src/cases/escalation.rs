use serde::Serialize;
use std::collections::HashMap;

use super::directory::{QueueDirectory, UNKNOWN_QUEUE};
use super::types::TransferFlow;

/// Note a handler can paste when sending a case on to a Problem Solver queue
pub const PROBLEM_SOLVER_NOTE: &str = "This case has been transferred between queues more than 3 times without resolution. Transferring to Problem Solver as last resort for proper handling and resolution.";

const AUDIT_NOTICE: &str = "Wrong transfers are audited by iTrace and may impact your performance.";

/// Escalation band for a transfer count, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EscalationTier {
    Normal,
    Moderate,
    High,
    Critical,
}

/// Semantic color of a tier or badge, resolved to a real color by the theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorToken {
    Clear,
    Active,
    Moderate,
    High,
    Critical,
    Neutral,
}

impl EscalationTier {
    /// Negative counts are treated as zero
    pub fn for_count(count: i64) -> Self {
        match count.max(0) {
            c if c > 5 => Self::Critical,
            c if c > 3 => Self::High,
            c if c > 2 => Self::Moderate,
            _ => Self::Normal,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Moderate => "MODERATE",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Self::Normal => "",
            Self::Moderate => "ℹ️",
            Self::High => "⚠️",
            Self::Critical => "🚨",
        }
    }

    pub fn color(self) -> ColorToken {
        match self {
            Self::Normal => ColorToken::Active,
            Self::Moderate => ColorToken::Moderate,
            Self::High => ColorToken::High,
            Self::Critical => ColorToken::Critical,
        }
    }
}

/// What the handler should do next, for tiers above NORMAL
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Guidance {
    pub headline: &'static str,
    pub action: &'static str,
    pub steps: Vec<String>,
    /// Transfer guidelines link, when the steps refer to it
    pub policy_url: Option<String>,
    /// HIGH only: the current queue is a Problem Solver and must resolve the case itself
    pub owns_case: bool,
    /// HIGH verify variant: Problem Solver queue to use when ownership is unclear
    pub recommended_destination: Option<String>,
    pub handoff_note: Option<&'static str>,
    pub audit_notice: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EscalationResult {
    pub tier: EscalationTier,
    pub transfer_count: usize,
    pub current_queue_label: String,
    pub is_current_queue_problem_solver: bool,
    pub guidance: Option<Guidance>,
}

impl EscalationResult {
    pub fn badge(&self) -> Badge {
        Badge::for_count(self.transfer_count)
    }

    /// Whether the warning popup should be raised for this result
    pub fn needs_warning(&self) -> bool {
        self.tier > EscalationTier::Normal
    }
}

/// Classify a transfer count into a tier with its guidance.
///
/// The current queue is the last flow entry; its Problem Solver membership
/// picks between the two HIGH variants.
pub fn classify(
    transfer_count: i64,
    flow: &TransferFlow,
    directory: &QueueDirectory,
) -> EscalationResult {
    let transfer_count = transfer_count.max(0);
    let tier = EscalationTier::for_count(transfer_count);
    let current_queue_label = flow
        .current()
        .map_or(UNKNOWN_QUEUE, |entry| entry.label.as_str())
        .to_string();
    let is_current_queue_problem_solver = directory.is_problem_solver(&current_queue_label);

    let guidance = match tier {
        EscalationTier::Normal => None,
        EscalationTier::Moderate => Some(review_guidance(directory)),
        EscalationTier::High if is_current_queue_problem_solver => {
            Some(own_case_guidance(directory))
        }
        EscalationTier::High => Some(verify_guidance(
            directory,
            directory.routing().destination_for(&current_queue_label),
        )),
        EscalationTier::Critical => Some(escalate_guidance()),
    };

    EscalationResult {
        tier,
        transfer_count: usize::try_from(transfer_count).unwrap_or(usize::MAX),
        current_queue_label,
        is_current_queue_problem_solver,
        guidance,
    }
}

fn escalate_guidance() -> Guidance {
    Guidance {
        headline: "Escalate Now",
        action: "Do NOT transfer. Escalate to Leadership",
        steps: vec![
            "Click \"Escalate\" in WIMS.".to_string(),
            "Include why it's still not resolved.".to_string(),
        ],
        policy_url: None,
        owns_case: false,
        recommended_destination: None,
        handoff_note: None,
        audit_notice: AUDIT_NOTICE,
    }
}

fn own_case_guidance(directory: &QueueDirectory) -> Guidance {
    Guidance {
        headline: "Own the Case",
        action: "Do NOT transfer. Resolve it here",
        steps: vec![
            "Read the full case history.".to_string(),
            "Check the Transfer Guidelines SOP.".to_string(),
            "You're a Problem Solver, trust your judgment. Take ownership and resolve.".to_string(),
            "If you need guidance, reaching out to leadership is always an option.".to_string(),
        ],
        policy_url: Some(directory.policy_url().to_string()),
        owns_case: true,
        recommended_destination: None,
        handoff_note: None,
        audit_notice: AUDIT_NOTICE,
    }
}

fn verify_guidance(directory: &QueueDirectory, destination: &str) -> Guidance {
    Guidance {
        headline: "Verify Before Transferring",
        action: "Check SOP. Don't guess the next queue",
        steps: vec![
            "Check the Transfer Guidelines SOP and identify the correct owner.".to_string(),
            "Is this the correct queue? Try to resolve it.".to_string(),
            "Another queue is clearly the owner? Transfer with a clear problem statement: what the issue is and why it belongs to that queue.".to_string(),
            format!("Not sure? Transfer to {}. Don't guess.", destination),
        ],
        policy_url: Some(directory.policy_url().to_string()),
        owns_case: false,
        recommended_destination: Some(destination.to_string()),
        handoff_note: Some(PROBLEM_SOLVER_NOTE),
        audit_notice: AUDIT_NOTICE,
    }
}

fn review_guidance(directory: &QueueDirectory) -> Guidance {
    Guidance {
        headline: "Review Before Acting",
        action: "Read carefully before acting",
        steps: vec![
            "Read the full case, don't skim.".to_string(),
            "Check the Transfer Guidelines SOP before replying.".to_string(),
            "Make your next action precise.".to_string(),
        ],
        policy_url: Some(directory.policy_url().to_string()),
        owns_case: false,
        recommended_destination: None,
        handoff_note: None,
        audit_notice: AUDIT_NOTICE,
    }
}

/// Compact header badge: `0T`, `2T`, `⚠️ 4T`...
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Badge {
    pub label: String,
    pub color: ColorToken,
}

impl Badge {
    pub fn for_count(count: usize) -> Self {
        let tier = EscalationTier::for_count(i64::try_from(count).unwrap_or(i64::MAX));
        let (label, color) = match tier {
            EscalationTier::Normal if count == 0 => ("0T".to_string(), ColorToken::Clear),
            EscalationTier::Normal => (format!("{}T", count), ColorToken::Active),
            _ => (format!("{} {}T", tier.icon(), count), tier.color()),
        };
        Self { label, color }
    }

    /// The task has no case behind it
    pub fn no_case() -> Self {
        Self {
            label: "—".to_string(),
            color: ColorToken::Neutral,
        }
    }
}

/// How often the case visited one queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueVisits {
    pub label: String,
    pub visits: usize,
    pub is_current: bool,
}

/// Per-label visit counts, most visited first (ties in first-seen order).
/// The label the case currently sits in is marked whatever its rank.
pub fn visit_frequencies(flow: &TransferFlow) -> Vec<QueueVisits> {
    let current = flow.current().map(|e| e.label.as_str());
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut table: Vec<QueueVisits> = Vec::new();

    for entry in flow {
        match index.get(entry.label.as_str()) {
            Some(&i) => table[i].visits += 1,
            None => {
                index.insert(entry.label.as_str(), table.len());
                table.push(QueueVisits {
                    label: entry.label.clone(),
                    visits: 1,
                    is_current: current == Some(entry.label.as_str()),
                });
            }
        }
    }

    // sort_by is stable, so equal counts stay in first-seen order
    table.sort_by(|a, b| b.visits.cmp(&a.visits));
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cases::directory::{test_address, test_directory};
    use crate::cases::flow::reduce;
    use crate::cases::types::Correspondence;
    use proptest::prelude::*;

    const QUEUES: [&str; 8] = ["uld", "b", "c", "d", "e", "f", "g", "ps"];

    fn dir() -> QueueDirectory {
        test_directory(&QUEUES, &["ps"])
    }

    fn flow_of(names: &[&str]) -> TransferFlow {
        let records: Vec<Correspondence> = names
            .iter()
            .enumerate()
            .map(|(i, name)| Correspondence::new(&test_address(name), i as i64))
            .collect();
        reduce(&records, &dir())
    }

    fn classify_flow(names: &[&str]) -> EscalationResult {
        let flow = flow_of(names);
        classify(flow.transfer_count() as i64, &flow, &dir())
    }

    #[test]
    fn test_tier_boundaries() {
        let expected = [
            (0, EscalationTier::Normal),
            (2, EscalationTier::Normal),
            (3, EscalationTier::Moderate),
            (4, EscalationTier::High),
            (5, EscalationTier::High),
            (6, EscalationTier::Critical),
            (40, EscalationTier::Critical),
        ];
        for (count, tier) in expected {
            assert_eq!(EscalationTier::for_count(count), tier, "count {}", count);
        }
    }

    #[test]
    fn test_negative_count_clamped() {
        let result = classify(-3, &TransferFlow::default(), &dir());
        assert_eq!(result.tier, EscalationTier::Normal);
        assert_eq!(result.transfer_count, 0);
    }

    #[test]
    fn test_empty_flow_is_normal_and_unknown() {
        let result = classify_flow(&[]);
        assert_eq!(result.tier, EscalationTier::Normal);
        assert_eq!(result.current_queue_label, UNKNOWN_QUEUE);
        assert!(!result.is_current_queue_problem_solver);
        assert!(result.guidance.is_none());
        assert!(!result.needs_warning());
    }

    #[test]
    fn test_two_transfers_is_normal() {
        let result = classify_flow(&["b", "b", "c", "c", "c", "d"]);
        assert_eq!(result.transfer_count, 2);
        assert_eq!(result.tier, EscalationTier::Normal);
        assert_eq!(result.current_queue_label, "D");
    }

    #[test]
    fn test_moderate_review() {
        let result = classify_flow(&["b", "c", "d", "e"]);
        assert_eq!(result.tier, EscalationTier::Moderate);
        let guidance = result.guidance.unwrap();
        assert_eq!(guidance.headline, "Review Before Acting");
        assert_eq!(guidance.policy_url.as_deref(), Some("https://example.com/sop"));
        assert!(!guidance.owns_case);
    }

    #[test]
    fn test_high_in_problem_solver_owns_case() {
        let result = classify_flow(&["b", "c", "d", "e", "f", "ps"]);
        assert_eq!(result.transfer_count, 5);
        assert_eq!(result.tier, EscalationTier::High);
        assert!(result.is_current_queue_problem_solver);
        let guidance = result.guidance.unwrap();
        assert_eq!(guidance.headline, "Own the Case");
        assert!(guidance.owns_case);
        assert_eq!(guidance.recommended_destination, None);
    }

    #[test]
    fn test_high_outside_problem_solver_verifies() {
        let result = classify_flow(&["ps", "c", "d", "e", "f", "g"]);
        assert_eq!(result.tier, EscalationTier::High);
        assert!(!result.is_current_queue_problem_solver);
        let guidance = result.guidance.unwrap();
        assert_eq!(guidance.headline, "Verify Before Transferring");
        assert!(!guidance.owns_case);
        assert_eq!(guidance.recommended_destination.as_deref(), Some("PS-R"));
        assert!(guidance.steps.iter().any(|s| s.contains("Transfer to PS-R")));
        assert_eq!(guidance.handoff_note, Some(PROBLEM_SOLVER_NOTE));
    }

    #[test]
    fn test_high_in_unloading_delays_routes_to_frontline() {
        let result = classify_flow(&["b", "c", "d", "e", "uld"]);
        assert_eq!(result.transfer_count, 4);
        let guidance = result.guidance.unwrap();
        assert_eq!(guidance.recommended_destination.as_deref(), Some("PS-FL"));
    }

    #[test]
    fn test_critical_ignores_current_queue() {
        for last in ["ps", "uld", "g"] {
            let result = classify_flow(&["b", "c", "d", "e", "f", "g", "b", last]);
            assert!(result.transfer_count > 5);
            assert_eq!(result.tier, EscalationTier::Critical);
            let guidance = result.guidance.unwrap();
            assert_eq!(guidance.headline, "Escalate Now");
            assert!(!guidance.owns_case);
            assert_eq!(guidance.audit_notice, AUDIT_NOTICE);
        }
    }

    #[test]
    fn test_badge_states() {
        assert_eq!(Badge::for_count(0), Badge { label: "0T".into(), color: ColorToken::Clear });
        assert_eq!(Badge::for_count(2), Badge { label: "2T".into(), color: ColorToken::Active });
        assert_eq!(Badge::for_count(3).label, "ℹ️ 3T");
        assert_eq!(Badge::for_count(5).color, ColorToken::High);
        assert_eq!(Badge::for_count(9).label, "🚨 9T");
        assert_eq!(Badge::no_case().color, ColorToken::Neutral);
    }

    #[test]
    fn test_visit_frequencies() {
        let flow = flow_of(&["b", "c", "b", "d", "c", "b", "e", "c"]);
        let table = visit_frequencies(&flow);
        let rows: Vec<(&str, usize, bool)> = table
            .iter()
            .map(|v| (v.label.as_str(), v.visits, v.is_current))
            .collect();
        assert_eq!(
            rows,
            [
                ("B", 3, false),
                ("C", 3, true),
                ("D", 1, false),
                ("E", 1, false)
            ]
        );
    }

    #[test]
    fn test_visit_frequencies_empty() {
        assert!(visit_frequencies(&TransferFlow::default()).is_empty());
    }

    proptest! {
        #[test]
        fn prop_tiers_are_monotonic(a in -10i64..100, b in -10i64..100) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(EscalationTier::for_count(lo) <= EscalationTier::for_count(hi));
        }

        #[test]
        fn prop_visits_sum_to_flow_length(names in prop::collection::vec(0usize..QUEUES.len(), 0..30)) {
            let picked: Vec<&str> = names.iter().map(|&i| QUEUES[i]).collect();
            let flow = flow_of(&picked);
            let table = visit_frequencies(&flow);
            prop_assert_eq!(table.iter().map(|v| v.visits).sum::<usize>(), flow.len());
            prop_assert_eq!(table.iter().filter(|v| v.is_current).count(), usize::from(!flow.is_empty()));
        }
    }
}
