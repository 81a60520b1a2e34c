pub mod auth;
pub mod registry;
pub mod storage;

pub use auth::Auth;
pub use registry::Registry;
pub use storage::Storage;
