pub mod analysis;
pub mod document;
pub mod session;

pub use analysis::{AnalysisRequest, Section, SectionMap};
pub use document::{Document, DocumentKind};
pub use session::{PendingDocument, SessionPhase, SessionState};
