pub mod app;
pub mod platform;
pub mod version;

pub use app::LogoShape;
pub use platform::Platform;
