pub mod clock;
pub mod coordinator;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod prompts;
pub mod reasoning;
pub mod reducer;
pub mod summary;

pub use clock::{Clock, SystemClock};
pub use coordinator::{log_background_failure, LoginTrigger, RunCoordinator};
pub use engine::{InsightEngine, InsightResult};
pub use error::AgentError;
pub use ledger::RunLedger;
pub use reasoning::{AnthropicBackend, ReasoningBackend};
pub use reducer::{ReductionWindow, SummaryReducer};
pub use summary::FinancialSummary;
