#[cfg(not(target_arch = "wasm32"))]
mod native {
    extern crate hearth;

    use std::sync::Mutex;

    use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
    use hearth::core::storage::FileStore;

    mod adapter {
        use actix_web::HttpRequest;
        use spin_sdk::http::{Method, Request};

        pub fn actix_to_spin_request(req: &HttpRequest, body: actix_web::web::Bytes) -> Request {
            let method = match req.method().as_str() {
                "GET" => Method::Get,
                "POST" => Method::Post,
                "PUT" => Method::Put,
                "DELETE" => Method::Delete,
                "HEAD" => Method::Head,
                "OPTIONS" => Method::Options,
                "PATCH" => Method::Patch,
                _ => Method::Get,
            };

            let uri = req.uri().to_string();

            let mut req_builder = Request::builder();
            let mut with_headers = req_builder.method(method).uri(&uri);
            for (name, value) in req.headers() {
                if let Ok(val_str) = value.to_str() {
                    with_headers = with_headers.header(name.as_str(), val_str);
                }
            }

            with_headers.body(body.to_vec()).build()
        }

        pub fn spin_to_actix_response(spin_resp: spin_sdk::http::Response) -> actix_web::HttpResponse {
            let status = *spin_resp.status();
            let body = spin_resp.body().to_vec();

            actix_web::HttpResponse::build(
                actix_web::http::StatusCode::from_u16(status)
                    .unwrap_or(actix_web::http::StatusCode::INTERNAL_SERVER_ERROR),
            )
            .content_type("application/json")
            .body(body)
        }
    }

    fn init_tracing() {
        use tracing_subscriber::layer::SubscriberExt as _;
        use tracing_subscriber::util::SubscriberInitExt as _;

        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "hearth=info".into()),
            )
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    pub async fn run() -> std::io::Result<()> {
        init_tracing();

        let data_dir = hearth::config::data_dir();
        let store = FileStore::open(&data_dir).map_err(std::io::Error::other)?;
        hearth::core::db::init_seed_data(&store).map_err(std::io::Error::other)?;

        // One request at a time touches the store
        let store = web::Data::new(Mutex::new(store));

        let bind = hearth::config::bind_address();
        tracing::info!(%bind, data_dir = %data_dir.display(), "server listening");

        HttpServer::new(move || {
            App::new()
                .app_data(store.clone())
                .default_service(web::route().to(handle_all))
        })
        .bind(bind)?
        .run()
        .await
    }

    async fn handle_all(req: HttpRequest, body: web::Bytes, store: web::Data<Mutex<FileStore>>) -> HttpResponse {
        let spin_req = adapter::actix_to_spin_request(&req, body);

        let store = match store.lock() {
            Ok(guard) => guard,
            Err(_) => {
                return HttpResponse::InternalServerError()
                    .json(serde_json::json!({"error": "Internal server error"}))
            }
        };

        match hearth::route(&*store, &spin_req) {
            Ok(spin_resp) => adapter::spin_to_actix_response(spin_resp),
            Err(e) => {
                tracing::error!(error = %e, path = req.path(), "request failed");
                HttpResponse::InternalServerError()
                    .json(serde_json::json!({"error": "Internal server error"}))
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    native::run().await
}

#[cfg(target_arch = "wasm32")]
fn main() {}
