mod types;

pub use types::{LockfileError, Result};

// Re-export for convenience
pub use LockfileError as Error;
