//! Storefront server entry point.

use common::{Money, UserId};
use domain::{NewProduct, Role, Session, UserAccount};
use gateway::{Gateway, InMemoryGateway};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Resolves once the process receives SIGINT or SIGTERM.
#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    let mut interrupt = signal(SignalKind::interrupt()).expect("failed to install SIGINT handler");
    let mut terminate = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");

    let received = tokio::select! {
        _ = interrupt.recv() => "SIGINT",
        _ = terminate.recv() => "SIGTERM",
    };
    tracing::info!(signal = received, "shutting down the storefront");
}

#[cfg(not(unix))]
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install SIGINT handler");
    tracing::info!("shutting down the storefront");
}

/// Seeds the in-memory gateway with a small spice catalog and a signed-in
/// demo customer, so the server is usable straight after boot.
async fn seed_demo_data(gateway: &InMemoryGateway) -> UserId {
    for name in ["Whole Spices", "Ground Spices", "Blends"] {
        gateway
            .insert_category(name.to_string())
            .await
            .expect("seeding categories");
    }

    let products = [
        ("Turmeric Powder", "Ground Spices", 80, 40),
        ("Kashmiri Chilli", "Ground Spices", 120, 35),
        ("Saffron", "Whole Spices", 450, 6),
        ("Green Cardamom", "Whole Spices", 350, 20),
        ("Garam Masala", "Blends", 150, 25),
    ];
    for (name, category, price, stock) in products {
        gateway
            .insert_product(NewProduct {
                name: name.to_string(),
                description: format!("{name}, small-batch from Kerala growers"),
                price: Money::from_rupees(price),
                category: category.to_string(),
                stock,
                image_url: String::new(),
            })
            .await
            .expect("seeding products");
    }

    let customer = UserAccount {
        id: UserId::new(),
        email: "asha@example.com".to_string(),
        name: "Asha".to_string(),
        created_at: chrono::Utc::now(),
    };
    let customer_id = customer.id;
    gateway.add_user(customer);
    gateway.set_session(Some(Session {
        user_id: customer_id,
        email: "asha@example.com".to_string(),
        name: "Asha".to_string(),
        role: Role::Customer,
    }));
    customer_id
}

#[tokio::main]
async fn main() {
    let config = api::config::Config::from_env();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let prometheus_builder = metrics_exporter_prometheus::PrometheusBuilder::new();
    let metrics_handle = prometheus_builder
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    let gateway = InMemoryGateway::new();
    let customer_id = seed_demo_data(&gateway).await;

    let state = api::create_default_state(gateway, config.checkout);
    state.cart.login(customer_id).await;

    let app = api::create_app(state, metrics_handle);

    let addr = config.addr();
    tracing::info!(%addr, "starting storefront server");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    tracing::info!("server shut down gracefully");
}
