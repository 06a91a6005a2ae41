// handlers/mod.rs
//
// public:  service info and health (/ and /health)
// listing: filtered, sorted, paginated collection reads (/api/*)
pub mod listing;
pub mod public;
