pub mod backfill;
pub mod scoring;
