//! Audit trail support: which tables are audited, how snapshots are diffed,
//! how a recorded change is undone, and summaries over recorded entries.

mod rollback;
mod snapshot;
mod summary;
mod table;

pub use rollback::{plan_rollback, rollback_target, RollbackAction};
pub use snapshot::{diff_snapshots, SnapshotDiff};
pub use summary::{
    activity_breakdown, summarize_changes, ActivityBreakdown, ChangeSummary, MOST_CHANGED_LIMIT,
};
pub use table::AuditTable;
