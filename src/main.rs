use agent_hub::init::app_init;
use agent_hub::routes::create_app_router_with_ui;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("🚀 Starting Multi-Agent System API...");
    dotenv::dotenv().ok();
    let (config, state) = app_init().await?;
    log::info!("✅ Application state initialized");
    let app = create_app_router_with_ui(state.clone(), &config.static_dir);

    // Start server
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    log::info!("");
    log::info!("🎉 Server started!");
    log::info!("📍 http://{}", addr);
    log::info!("🤖 Agents: http://{}/agents", addr);
    log::info!("👥 Teams: http://{}/teams", addr);
    log::info!("🔌 WebSocket: ws://{}/ws", addr);
    log::info!("💬 UI: http://{}/ui", addr);
    log::info!("❤️  Health: http://{}/health", addr);
    log::info!("");
    log::info!("🦙 Ollama: {}", state.ai_config.url);
    log::info!("🧠 Default model: {}", state.ai_config.default_model);
    log::info!("");

    axum::serve(listener, app).await?;

    Ok(())
}
