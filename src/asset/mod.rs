pub mod cache;
pub mod handle;
pub mod paths;

pub use cache::AssetCache;
pub use handle::Handle;
pub use paths::AssetPaths;
