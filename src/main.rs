mod auth;
mod cart;
mod category;
mod order;
mod pool;
mod product;
mod user;
mod utils;

use axum::{Router, middleware};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use listenfd::ListenFd;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations/");

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // migrations run on a blocking connection before the pool comes up
    tokio::task::spawn_blocking(|| {
        let mut conn = axum_market::establish_connection();
        conn.run_pending_migrations(MIGRATIONS)
            .expect("failed to run migrations");
    })
    .await
    .expect("migration task panicked");

    let pool = pool::get_pool().await.expect("failed to create db pool");

    let api = Router::new()
        .merge(auth::routes::get_routes())
        .merge(user::routes::get_routes())
        .merge(product::routes::get_routes())
        .merge(category::routes::get_routes())
        .merge(cart::routes::get_routes())
        .with_state(pool);

    let app = Router::new()
        .nest("/api", api)
        .layer(middleware::from_fn(utils::log_req_res))
        .fallback(utils::handler_404);

    let mut listenfd = ListenFd::from_env();
    let listener = match listenfd.take_tcp_listener(0).expect("failed to take listener") {
        // if we are given a tcp listener on listen fd 0, we use that one
        Some(listener) => {
            listener
                .set_nonblocking(true)
                .expect("failed to set nonblocking");
            TcpListener::from_std(listener).expect("failed to adopt listener")
        }
        // otherwise fall back to local listening
        None => TcpListener::bind("127.0.0.1:3000")
            .await
            .expect("failed to bind"),
    };

    tracing::info!("listening on {}", listener.local_addr().expect("no local addr"));
    axum::serve(listener, app).await.expect("server error");
}
