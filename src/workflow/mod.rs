pub mod explain_flow;
pub mod session_ctx;

pub use explain_flow::{AnalysisOutcome, ExplainFlow};
pub use session_ctx::SessionCtx;
