pub mod context;
pub mod descriptor;
pub mod outcome;

pub use context::MatchContext;
pub use descriptor::{FeatureDescriptor, FeatureDescriptorBuilder, FeatureHandler};
pub use outcome::{FailureKind, FeatureFailure, FeatureOutcome};
