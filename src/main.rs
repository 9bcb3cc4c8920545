use axum::{
    Router,
    routing::{get, post, put},
};
use time::Duration;
use tower_http::cors::CorsLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer, cookie::Key};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use finance_tracker_server::{
    auth,
    config::Config,
    constants::{SESSION_EXPIRY_DAYS, SESSION_NAME},
    database, expenses, finance, incomes, savings,
};

#[tokio::main]
async fn main() {
    // load environment variables
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env().expect("Invalid server configuration");

    let db = database::init_db(&config.data_path)
        .await
        .expect("Failed to initialize database");

    let store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(store)
        .with_secure(false)
        .with_name(SESSION_NAME)
        .with_expiry(Expiry::OnInactivity(Duration::days(SESSION_EXPIRY_DAYS)))
        .with_signed(
            Key::try_from(config.session_secret.as_bytes())
                .expect("SESSION_SECRET must provide at least 64 bytes of key material"),
        );

    let app = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        .route("/expenses", post(expenses::create).get(expenses::find))
        .route("/expenses/export", get(expenses::export))
        .route(
            "/expenses/{id}",
            put(expenses::update).delete(expenses::remove),
        )
        .route("/incomes", post(incomes::create).get(incomes::find))
        .route("/incomes/export", get(incomes::export))
        .route("/incomes/{id}", put(incomes::update).delete(incomes::remove))
        .route("/savings", post(savings::create).get(savings::find))
        .route("/savings/export", get(savings::export))
        .route("/savings/{id}", put(savings::update).delete(savings::remove))
        .route("/finance/balance", get(finance::balance))
        .route("/finance/summary", get(finance::summary))
        .layer(session_layer)
        .layer(CorsLayer::permissive())
        .with_state(db);

    let listener = tokio::net::TcpListener::bind(config.bind_address())
        .await
        .expect("Failed to bind server address");
    tracing::info!("Server running on http://{}", config.bind_address());

    axum::serve(listener, app).await.expect("Server error");
}
