pub mod analysis;
pub mod server;

pub use analysis::AnalysisService;
pub use server::ServerService;
