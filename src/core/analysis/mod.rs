mod balancer;
mod summary;

pub use balancer::{balance_classes, minority_count, DEFAULT_SEED};
pub use summary::{ClassCounts, SplitCounts};
