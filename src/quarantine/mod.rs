pub mod manifest;
pub mod store;

pub use manifest::{QuarantineEntry, QuarantineManifest, SessionSummary};
pub use store::{
    PurgeReport, PurgedSession, QuarantineHealth, QuarantineSession, QuarantineStore,
    RestoreReport,
};
