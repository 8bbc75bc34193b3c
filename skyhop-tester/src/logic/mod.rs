pub mod reports;
pub mod session;
pub mod tester;

pub use session::{SessionPlan, SessionRunner, SessionSummary};
pub use tester::*;
