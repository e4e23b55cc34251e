mod enums;
mod pattern;
mod profile;

// 导出常用项
pub use enums::{MatchTarget, PatternSyntax};
pub use pattern::{PatternSpec, GLOB_PREFIX};
pub use profile::PatternProfile;
