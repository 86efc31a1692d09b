pub mod core {
    pub mod config;
    pub mod error;
    pub mod state;
    pub mod tracing_init;
}

pub mod models {
    pub mod user;
    pub mod work;
}

pub mod stores {
    pub mod blob;
    pub mod file_store;
    pub mod kv;
    pub mod memory_store;
}

pub mod services {
    pub mod auth;
    pub mod work_data;
}

pub mod utils {
    pub mod ids;
    pub mod latency;
    pub mod time;
}

pub use crate::core::config::Config;
pub use crate::core::error::{AuthError, StoreError};
pub use crate::core::state::Backend;
pub use crate::models::user::User;
pub use crate::models::work::{Color, NewWork, WorkData};
pub use crate::stores::kv::KeyValueStore;
