pub mod controller;
pub mod scan;
pub mod state;

pub use controller::LifecycleController;
pub use scan::{collect_matches, FailedFeature, MatchResult, ScanReport};
pub use state::{ActiveFeatureSet, FeatureEntry, FeatureState};
