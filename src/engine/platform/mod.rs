//! Host backends

pub mod connect;
#[cfg(windows)]
mod windows;
#[cfg(not(windows))]
mod unsupported;

pub use self::connect::ConnectServerArgs;
#[cfg(windows)]
pub use self::windows::WmiBackend as PlatformBackend;
#[cfg(not(windows))]
pub use self::unsupported::UnsupportedBackend as PlatformBackend;
