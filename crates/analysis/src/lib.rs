//! Weekly commit aggregation: window boundaries, language classification,
//! per-week statistics and week-over-week comparison.

pub mod aggregate;
pub mod compare;
pub mod language;
pub mod locale;
pub mod models;
pub mod window;

pub use aggregate::aggregate;
pub use compare::compare;
pub use language::{classify, is_main_language, MAIN_LANGUAGES, OTHER_LANGUAGE};
pub use locale::Locale;
pub use models::{DailyCommit, RawCommit, RepoDetail, WeeklyComparison, WeeklyStats};
pub use window::WeekWindow;
