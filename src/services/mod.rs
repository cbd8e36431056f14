pub mod providers;
pub mod ranker;
pub mod recommendations;

pub use providers::{MetadataProvider, OmdbProvider};
pub use ranker::recommend;
