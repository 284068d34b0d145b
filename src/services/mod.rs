pub mod leaderboard;
pub mod polling;
pub mod server;
pub mod shutdown;

pub use leaderboard::Leaderboard;
pub use polling::PollingService;
pub use server::ServerService;
pub use shutdown::Shutdown;
