mod bridge;
mod cache;
mod directory;

pub use bridge::BridgeRepository;
pub use cache::AccessCache;
pub use directory::PrincipalDirectory;
