pub mod agency;
pub mod matching;
pub mod run;
pub mod slug;

pub use agency::{Agency, AgencyError};
pub use matching::{CountMap, Coverage, extra_in_api, missing_from_api, validate_matching};
pub use run::{DocumentCount, Outcome, RunSummary};
pub use slug::slugify;
