pub mod catalog;
pub mod feedback;
pub mod recommendations;

pub use feedback::{FeedbackSink, InMemoryFeedbackSink};
pub use recommendations::{RecommendationOutcome, RecommendationService};
