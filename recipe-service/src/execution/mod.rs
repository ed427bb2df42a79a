// Execution Module
// Matrix expansion, run orchestration, and progress events

pub mod events;
pub mod executor;
pub mod matrix;

// Re-export key types
pub use events::{progress_channel, ProgressReceiver, ProgressSender, RunEvent};
pub use executor::{MatrixRunner, RunConfig, RunReport};
pub use matrix::{AxisSelection, BuildType, Linkage, MatrixCell, MatrixExpander, VersionScope};
