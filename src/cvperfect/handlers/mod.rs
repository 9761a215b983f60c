pub mod auth_proxy;
pub use self::auth_proxy::AuthProxy;

pub mod health;
pub use self::health::health;

pub mod pages;

pub mod plans;
pub use self::plans::plans;
