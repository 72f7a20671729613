pub mod git;
pub mod hook;
pub mod usage;

pub use git::GitInfo;
pub use hook::HookJson;
pub use usage::{UsageSnapshot, UsageWindow};
