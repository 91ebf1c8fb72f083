// Scan agents - universe selection, orchestration, ranking, scheduling
pub mod agents;

// Market data processing
pub mod market_data;
