// Scan agents
pub mod ranker;
pub mod scanner;
pub mod scheduler;
pub mod universe;

pub use ranker::rank_results;
pub use scanner::{MarketScanner, ScanCancellation, ScanSettings};
pub use scheduler::ScanScheduler;
pub use universe::{UniverseMember, UniverseSelector};
