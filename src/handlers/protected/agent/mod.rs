pub mod run;
pub mod status;

pub use run::{run_analysis, run_variant};
pub use status::agent_status;
