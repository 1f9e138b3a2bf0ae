pub mod aggregator;
pub mod grammar;
pub mod handlers;
pub mod keywords;
pub mod language;
pub mod normalizer;
pub mod pipeline;
pub mod scorer;
pub mod sections;
pub mod structure;
