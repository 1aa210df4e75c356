pub mod cli;
pub mod config;
pub mod errors;
pub mod export;
pub mod flow;
pub mod log;
pub mod notify;
pub mod profile;
pub mod prompt;
pub mod provider;
pub mod render;
pub mod session;
pub mod ux;

pub use errors::{Result, SkinGenError};
pub use flow::{FlowState, Generation, SkinGen, Submission, SubmissionReport};
pub use profile::{Goal, RoutineResult, SkinProfile, SkinType};
pub use session::SessionUsage;
