//! Data plumbing: tabular frames, session loading, reference data

pub mod frame;
pub mod loader;
pub mod reference;

pub use frame::Frame;
pub use loader::{LapRecord, QualifyingEntry, RawLap};
pub use reference::{EventInfo, ReferenceData, TrackTraits};
