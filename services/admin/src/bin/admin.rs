//! services/admin/src/bin/admin.rs

use admin_lib::{
    adapters::{HttpClient, RestChatAdapter, RestClassAdapter, RestStudentAdapter},
    config::Config,
    console::Console,
    error::AppError,
};
use std::sync::Arc;
use student_admin_core::{ChatSession, StudentsController};
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    info!("Configuration loaded. API base URL: {}", config.api_base_url);

    // --- 2. Initialize Service Adapters ---
    let http = Arc::new(HttpClient::new(
        config.api_base_url.clone(),
        config.request_timeout,
    )?);
    let students = Arc::new(RestStudentAdapter::new(http.clone()));
    let classes = Arc::new(RestClassAdapter::new(http.clone()));
    let chat = match &config.chatbot_url {
        Some(endpoint) => {
            let adapter = RestChatAdapter::new(
                http.clone(),
                endpoint.clone(),
                config.chat_not_found_retries,
            );
            Some(ChatSession::new(Arc::new(adapter)))
        }
        None => {
            info!("CHATBOT_API not set; chat is disabled");
            None
        }
    };

    // --- 3. Run the Console ---
    let controller = StudentsController::new(students);
    let mut console = Console::new(
        controller,
        classes,
        chat,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    );
    console.run().await?;

    info!("Bye");
    Ok(())
}
