pub mod scenario;
pub mod util;

pub use util::{parse_now, parse_report, split_csv};
