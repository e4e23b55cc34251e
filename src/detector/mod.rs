pub mod detector;
pub mod location;
pub mod mutation;
pub mod polling;
pub mod source;

pub use detector::{ChangeDetector, ChangeListener, DetectorHandle, SignalGate};
pub use location::{LocationProvider, SharedLocation};
pub use mutation::{MutationFeed, MutationFilter, MutationKind, MutationRecord, MutationSource};
pub use polling::PollingSource;
pub use source::{ChangeSignal, ChangeSink, ChangeSource, SignalOrigin};
