//! Deploy coordination: existence checks and plan reconciliation.

pub mod existence;
pub mod reconciler;

pub use existence::network_exists;
pub use reconciler::{
    DownReport, NetworkOutcome, NetworkResult, Reconciler, ServiceResult, UpReport,
};
