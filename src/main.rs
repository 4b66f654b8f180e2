use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use dotenvy::dotenv;

use hrm_leave::config::Config;
use hrm_leave::db::init_db;
use hrm_leave::docs::ApiDoc;
use hrm_leave::routes;
use hrm_leave::service::LeaveService;
use hrm_leave::store::mysql::MySqlStore;
use hrm_leave::utils::employee_cache;
use hrm_leave::utils::employee_filter;

use tracing::info;
use tracing_appender::rolling;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "Hello World!"
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    let config = Config::from_env();

    // Rolling daily log
    let file_appender = rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let pool = init_db(&config.database_url).await;

    let pool_for_filter_warmup = pool.clone();
    let pool_for_cache_warmup = pool.clone();
    let server_addr = config.server_addr.clone();
    let config_data = config.clone();

    actix_web::rt::spawn(async move {
        if let Err(e) = employee_filter::warmup_employee_filter(&pool_for_filter_warmup, 100).await
        {
            eprintln!("Failed to warmup employee filter: {:?}", e);
        }
    });

    actix_web::rt::spawn(async move {
        // Warm up display names in batches of 250
        if let Err(e) = employee_cache::warmup_employee_cache(&pool_for_cache_warmup, 250).await {
            eprintln!("Failed to warmup employee name cache: {:?}", e);
        }
    });

    let service = LeaveService::new(MySqlStore::new(pool.clone()));
    let service_data = Data::new(service);

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(service_data.clone())
            .app_data(Data::new(config.clone()))
            .service(index)
            // Configure leave/attendance/employee routes with rate limiting
            .configure(|cfg| routes::configure(cfg, config_data.clone()))
    })
    .bind(server_addr)?
    .run()
    .await
}
