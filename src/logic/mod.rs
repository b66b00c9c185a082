pub mod aggregation;
pub mod catalog;
pub mod evaluator;
pub mod mock;
pub mod ranker;
pub mod season;
pub mod soil;

pub use aggregation::WeatherService;
pub use catalog::Catalog;
pub use ranker::{CropAdvisor, RankingPolicy};
pub use season::ActiveSeasons;
