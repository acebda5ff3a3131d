pub mod bulk;
pub mod summary;

pub use bulk::{calculate_batch, BatchFailure, BatchInput, BatchOutput, RoicCalculation};
pub use summary::{summarize, MethodSummary};
