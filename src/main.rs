use dotenv::dotenv;
use tracing::{error, info, warn};

use redinclusion_backend::app::app::App;
use redinclusion_backend::util::logger::Logger;

#[tokio::main]
async fn main() {
    // keep the guards alive for the whole process so file appenders flush
    let _logger = Logger::new().unwrap_or_else(|e| {
        let logger = Logger::console_only();
        warn!("File logging unavailable ({}), logging to console only", e);
        logger
    });

    info!("🚀 Starting RedInclusion Backend");

    match dotenv() {
        Ok(_) => info!("✅ Successfully loaded .env file"),
        Err(e) => warn!("⚠️ Failed to load .env file: {} (using system env vars)", e),
    }

    let app = match App::new().await {
        Ok(app) => app,
        Err(e) => {
            error!("Failed to initialise application: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = app.start().await {
        error!("Server stopped with error: {}", e);
        std::process::exit(1);
    }
}
