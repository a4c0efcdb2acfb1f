pub mod scoring;
pub mod sections;
