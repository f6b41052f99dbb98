use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use campus_assist::adapters::ai::{OpenAiConfig, OpenAiModel};
use campus_assist::adapters::http::{api_routes, ApiHandlers};
use campus_assist::adapters::knowledge::{
    HttpKnowledgeBase, KnowledgeConfig as SearchClientConfig, StaticKnowledgeBase,
};
use campus_assist::adapters::sms::LogSender;
use campus_assist::adapters::storage::{InMemoryStore, PostgresStore};
use campus_assist::application::handlers::{ProcessInboundHandler, StartTriggerHandler};
use campus_assist::config::{AppConfig, StorageBackend};
use campus_assist::domain::engine::ConversationEngine;
use campus_assist::domain::prompt::PromptComposer;
use campus_assist::ports::{ConversationStore, KnowledgeBase, LanguageModel, MessageSender};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    init_logging(&config);

    tracing::info!("Starting campus-assist");

    let store = build_store(&config).await?;
    let knowledge = build_knowledge(&config)?;
    let model = build_model(&config)?;

    let engine = Arc::new(ConversationEngine::new(
        store,
        knowledge,
        model,
        PromptComposer::new(&config.school),
        config.engine_config(),
    ));
    let gateway: Arc<dyn MessageSender> = Arc::new(LogSender::new());

    let handlers = ApiHandlers::new(
        Arc::new(ProcessInboundHandler::new(engine.clone(), gateway.clone())),
        Arc::new(StartTriggerHandler::new(engine, gateway)),
    );

    let app = api_routes(handlers)
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(TraceLayer::new_for_http());

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn build_store(config: &AppConfig) -> Result<Arc<dyn ConversationStore>, Box<dyn Error>> {
    match config.storage.backend {
        StorageBackend::Postgres => {
            let url = config
                .storage
                .database_url
                .as_deref()
                .expect("validated: postgres backend carries a database url");
            let pool = PgPoolOptions::new()
                .max_connections(config.storage.max_connections)
                .connect(url)
                .await?;
            sqlx::migrate!("./migrations").run(&pool).await?;
            tracing::info!("Connected to PostgreSQL");
            Ok(Arc::new(PostgresStore::new(pool)))
        }
        StorageBackend::Memory => {
            tracing::info!("Using in-memory conversation store");
            Ok(Arc::new(InMemoryStore::new()))
        }
    }
}

fn build_knowledge(config: &AppConfig) -> Result<Arc<dyn KnowledgeBase>, Box<dyn Error>> {
    if let Some(base_url) = config.knowledge.base_url.as_deref().filter(|u| !u.is_empty()) {
        let mut client_config =
            SearchClientConfig::new(base_url).with_timeout(config.knowledge.timeout());
        if let Some(key) = config.knowledge.api_key.as_deref().filter(|k| !k.is_empty()) {
            client_config = client_config.with_api_key(key);
        }
        tracing::info!(base_url, "Using HTTP knowledge base");
        Ok(Arc::new(HttpKnowledgeBase::new(client_config)?))
    } else {
        tracing::info!("No knowledge base configured; retrieval disabled");
        Ok(Arc::new(StaticKnowledgeBase::new()))
    }
}

fn build_model(config: &AppConfig) -> Result<Arc<dyn LanguageModel>, Box<dyn Error>> {
    let api_key = config
        .ai
        .openai_api_key
        .as_deref()
        .expect("validated: api key present");
    let model_config = OpenAiConfig::new(api_key)
        .with_model(&config.ai.model)
        .with_base_url(&config.ai.base_url)
        .with_timeout(config.ai.timeout());
    Ok(Arc::new(OpenAiModel::new(model_config)?))
}

fn init_logging(config: &AppConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.server.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    if config.is_production() {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
