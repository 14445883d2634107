use serde::{Deserialize, Serialize};

/// Number of tasks per store-side state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreCounts {
    pub completed: usize,
    pub resolving: usize,
    pub resolved: usize,
}
