//! Printlab Server - photo print lab storefront backend
//!
//! # Module structure
//!
//! ```text
//! src/
//! ├── core/        # config, state, server, errors
//! ├── api/         # HTTP routes and handlers
//! ├── db/          # SQLite pool, models, repositories
//! ├── middleware/  # rate limiting
//! ├── recovery/    # orphaned upload recovery job
//! └── utils/       # errors, logging, time
//! ```

pub mod api;
pub mod core;
pub mod db;
pub mod middleware;
pub mod recovery;
pub mod utils;

// Re-export public types
pub use core::{Config, Server, ServerState};
pub use db::DbService;
pub use middleware::RateLimiter;
pub use recovery::{RecoveryJob, RecoveryReport};
pub use utils::{AppError, AppResult};

/// Load `.env` and initialize logging. Called once from main.
pub fn setup_environment() {
    dotenv::dotenv().ok();

    let log_dir = std::env::var("LOG_DIR").ok();
    utils::logger::init_logger_with_file(None, log_dir.as_deref());
}

pub fn print_banner() {
    println!(
        r#"
                _       __  __      __
   ____  _____(_)___  / /_/ /___ _/ /_
  / __ \/ ___/ / __ \/ __/ / __ `/ __ \
 / /_/ / /  / / / / / /_/ / /_/ / /_/ /
/ .___/_/  /_/_/ /_/\__/_/\__,_/_.___/
/_/
"#
    );
}
