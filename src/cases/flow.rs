use super::directory::QueueDirectory;
use super::types::{Correspondence, TransferFlow};

/// Rebuild the queue hand-off sequence for a case.
///
/// Messages are ordered by timestamp (stable, so equal timestamps keep list
/// order), senders outside the directory's target set are discarded, and
/// consecutive messages from the same queue collapse into one visit. Records
/// missing a sender or a timestamp are skipped.
pub fn reduce(records: &[Correspondence], directory: &QueueDirectory) -> TransferFlow {
    let mut timed: Vec<(i64, &str)> = records
        .iter()
        .filter_map(|r| Some((r.created_at?, r.from_address.as_deref()?)))
        .collect();
    timed.sort_by_key(|&(created_at, _)| created_at);

    let mut flow = TransferFlow::default();
    for (_, address) in timed {
        if directory.is_target(address) {
            flow.push_collapsed(address, directory.label_for(address));
        }
    }

    tracing::debug!(
        records = records.len(),
        visits = flow.len(),
        transfers = flow.transfer_count(),
        "Reduced transfer flow"
    );
    flow
}
