use std::net::SocketAddr;
use std::sync::Arc;

use mongodb::Client;

use cryptoalert::{
    config::{self, StoreBackend},
    routes,
    services::{
        alert_trigger::AlertTrigger,
        db_init,
        message_templates::MessageTemplates,
        preference_store::{MemoryPreferenceStore, MongoPreferenceStore, PreferenceStore},
        price_feed::{CryptoCompareClient, PriceFeed},
        price_monitor,
        push::FcmClient,
        quantity_store::{MemoryQuantityStore, MongoQuantityStore, QuantityStore},
    },
    AppState,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let settings = config::load();

    let (prefs, quantities): (Arc<dyn PreferenceStore>, Arc<dyn QuantityStore>) =
        match settings.store_backend {
            StoreBackend::Mongo => {
                let client = Client::with_uri_str(&settings.mongodb_uri)
                    .await
                    .expect("Failed to connect to MongoDB");
                let db = client.database(&settings.mongodb_db);

                if let Err(e) = db_init::ensure_indexes(&db, &settings.tracked_quantities).await {
                    tracing::warn!("index setup failed: {}", e);
                }

                let prefs: Arc<dyn PreferenceStore> = Arc::new(MongoPreferenceStore::new(db.clone()));
                let quantities: Arc<dyn QuantityStore> = Arc::new(MongoQuantityStore::new(db));
                (prefs, quantities)
            }
            StoreBackend::Memory => {
                tracing::info!("using in-memory stores");
                let prefs: Arc<dyn PreferenceStore> = Arc::new(MemoryPreferenceStore::new());
                let quantities: Arc<dyn QuantityStore> = Arc::new(MemoryQuantityStore::new());
                (prefs, quantities)
            }
        };

    let templates = MessageTemplates::new(
        &settings.alert_title_template,
        &settings.alert_body_template,
    )
    .expect("invalid alert message templates");

    let sender = Arc::new(FcmClient::new(
        settings.push_endpoint.clone(),
        settings.push_auth_token.clone(),
    ));

    let trigger = AlertTrigger::from_parts(
        prefs.clone(),
        sender,
        settings.dispatch_concurrency,
        templates,
        settings.invocation_timeout,
    );

    let price_feed = if settings.simulate_mode {
        PriceFeed::Simulated {
            min: settings.simulate_min,
            max: settings.simulate_max,
        }
    } else {
        PriceFeed::Online(CryptoCompareClient::new(settings.price_api_url.clone()))
    };

    let state = AppState {
        settings: settings.clone(),
        prefs,
        quantities,
        trigger,
        price_feed,
    };

    price_monitor::spawn_price_monitor(state.clone());

    let app = routes::app(state);

    let ip = settings
        .host
        .parse::<std::net::IpAddr>()
        .expect("HOST must be an IP address");
    let addr = SocketAddr::from((ip, settings.port));
    tracing::info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
