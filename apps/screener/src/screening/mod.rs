// Matching & ranking core.
// Data flows one way: extracted profile -> similarity + dimension scores
// -> aggregator -> ranking engine. Nothing here talks to the network directly;
// the extractor and embedding backend are injected as trait objects.

pub mod aggregator;
pub mod dimensions;
pub mod profile;
pub mod ranking;
pub mod requirement;
pub mod score;
pub mod similarity;

pub use profile::ExtractedProfile;
pub use ranking::{CancelSignal, RankedReport, RankingEngine, RunOutcome, ScreeningConfig};
pub use requirement::{EducationLevel, JobRequirement, Weights};
pub use score::{Dimension, DimensionScore, MatchResult, MatchStatus};
