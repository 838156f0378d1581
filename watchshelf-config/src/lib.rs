//! Configuration for watchshelf.
//!
//! The configuration is a single TOML or JSON document; see [`ConfigLoader`]
//! for where it is looked up. `.env` files are honoured through
//! [`load_env_file`].

pub mod loader;
pub mod models;
pub mod validation;

pub use loader::{ConfigLoad, ConfigLoader, ConfigSource, load_env_file};
pub use models::{
    HostConfig, LedgerConfig, ScheduleConfig, ServerConfig, ShelfConfig, SimklConfig,
    StubsConfig, TargetsConfig,
};
pub use validation::{ConfigWarning, ConfigWarnings};
