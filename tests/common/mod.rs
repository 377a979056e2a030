#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use actix_web::http::StatusCode;
use actix_web::{get, web, App, HttpRequest, HttpResponse, HttpServer};

use frontier::clock::{Resolution, TimeWindow};
use frontier::source::{Candle, CandleSource, Credentials, Envelope, LocalSource};

pub const API_KEY: &str = "test-key";
pub const API_SECRET: &str = "test-secret";

/// Stands in for the exchange. Checks the signature on every request the same way the exchange
/// does and counts how many requests it has seen.
pub struct MockExchange {
    pub candles: HashMap<String, Vec<Candle>>,
    pub credentials: Credentials,
    pub status: Option<u16>,
    pub drop_result: bool,
    pub delay: Option<Duration>,
    pub hits: AtomicUsize,
    pub rejected: AtomicUsize,
}

impl MockExchange {
    pub fn new() -> Self {
        Self {
            candles: HashMap::new(),
            credentials: Credentials::new(API_KEY, API_SECRET),
            status: None,
            drop_result: false,
            delay: None,
            hits: AtomicUsize::new(0),
            rejected: AtomicUsize::new(0),
        }
    }

    pub fn with_candles(mut self, market: &str, candles: Vec<Candle>) -> Self {
        self.candles.insert(market.to_string(), candles);
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn rejected(&self) -> usize {
        self.rejected.load(Ordering::SeqCst)
    }
}

fn header(req: &HttpRequest, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}

#[get("/api/markets/{market}/candles")]
async fn market_candles(
    app: web::Data<MockExchange>,
    path: web::Path<(String,)>,
    req: HttpRequest,
) -> HttpResponse {
    app.hits.fetch_add(1, Ordering::SeqCst);

    if let Some(delay) = app.delay {
        actix_web::rt::time::sleep(delay).await;
    }

    if let Some(status) = app.status {
        let code = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return HttpResponse::build(code).finish();
    }

    let path_and_query = req
        .uri()
        .path_and_query()
        .map(|p| p.as_str().to_string())
        .unwrap_or_default();
    let signed = match (
        header(&req, "FTX-KEY"),
        header(&req, "FTX-SIGN"),
        header(&req, "FTX-TS"),
    ) {
        (Some(key), Some(sign), Some(ts)) => {
            let payload = format!("{ts}GET{path_and_query}");
            key == app.credentials.api_key && app.credentials.sign(&payload).ok() == Some(sign)
        }
        _ => false,
    };
    if !signed {
        app.rejected.fetch_add(1, Ordering::SeqCst);
        return HttpResponse::Unauthorized().json(Envelope::<Vec<Candle>> {
            success: Some(false),
            result: None,
            error: Some("Not logged in".to_string()),
        });
    }

    if app.drop_result {
        return HttpResponse::Ok().json(Envelope::<Vec<Candle>> {
            success: Some(false),
            result: None,
            error: Some("Something went wrong".to_string()),
        });
    }

    let (market,) = path.into_inner();
    match app.candles.get(&market) {
        Some(rows) => HttpResponse::Ok().json(Envelope {
            success: Some(true),
            result: Some(rows.clone()),
            error: None,
        }),
        None => HttpResponse::NotFound().json(Envelope::<Vec<Candle>> {
            success: Some(false),
            result: None,
            error: Some(format!("No such market: {market}")),
        }),
    }
}

/// Starts the exchange on a free local port in its own thread. Returns the base url, including
/// the `/api` prefix, and a handle to the shared state.
pub fn spawn_exchange(exchange: MockExchange) -> (String, web::Data<MockExchange>) {
    let data = web::Data::new(exchange);
    let server_data = data.clone();
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        actix_web::rt::System::new().block_on(async move {
            let server = HttpServer::new(move || {
                App::new()
                    .app_data(server_data.clone())
                    .service(market_candles)
            })
            .workers(1)
            .bind(("127.0.0.1", 0))?;
            let _ = tx.send(server.addrs()[0]);
            server.run().await
        })
    });

    let addr = rx.recv().expect("mock exchange failed to start");
    (format!("http://{addr}/api"), data)
}

pub fn generated_candles(
    markets: &[&str],
    resolution: Resolution,
    window: TimeWindow,
    seed: u64,
) -> Vec<(String, Vec<Candle>)> {
    let source = LocalSource::random(markets, resolution, window, seed).unwrap();
    markets
        .iter()
        .map(|m| {
            (
                m.to_string(),
                source.get_candles(m, resolution, window).unwrap(),
            )
        })
        .collect()
}

pub fn flat_candles(count: usize) -> Vec<Candle> {
    (0..count)
        .map(|i| Candle::new(100.0, 100.0 + i as f64, None))
        .collect()
}
