//! Fixtures shared by the unit tests: synthetic WAV files and a throwaway
//! upstream server to download them from.

use std::collections::HashMap;
use std::f32::consts::PI;
use std::io::Cursor;
use std::net::TcpListener;
use std::sync::{Arc, Mutex};

use actix_web::http::{header, StatusCode};
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};

/// A 16-bit PCM sine tone encoded as a complete WAV file.
pub fn tone_wav(freq: f32, secs: f32, sample_rate: u32, channels: u16) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut bytes = Vec::new();
    {
        let mut writer = hound::WavWriter::new(Cursor::new(&mut bytes), spec).unwrap();
        let frames = (secs * sample_rate as f32).round() as usize;
        for n in 0..frames {
            let t = n as f32 / sample_rate as f32;
            let value = ((2.0 * PI * freq * t).sin() * 0.5 * i16::MAX as f32) as i16;
            for _ in 0..channels {
                writer.write_sample(value).unwrap();
            }
        }
        writer.finalize().unwrap();
    }
    bytes
}

/// One request as the fixture saw it.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: String,
    pub authorization: Option<String>,
    pub body: Vec<u8>,
}

#[derive(Clone)]
struct Routes {
    responses: Arc<HashMap<String, (u16, Vec<u8>)>>,
    log: Arc<Mutex<Vec<Recorded>>>,
}

/// Answers by raw (still percent-encoded) path; anything unregistered is a 404.
pub struct Upstream {
    addr: std::net::SocketAddr,
    log: Arc<Mutex<Vec<Recorded>>>,
}

impl Upstream {
    /// Serves each body with a 200.
    pub async fn start(files: Vec<(&str, Vec<u8>)>) -> Self {
        Self::start_with_status(
            files
                .into_iter()
                .map(|(path, body)| (path, 200, body))
                .collect(),
        )
        .await
    }

    pub async fn start_with_status(responses: Vec<(&str, u16, Vec<u8>)>) -> Self {
        let routes = Routes {
            responses: Arc::new(
                responses
                    .into_iter()
                    .map(|(path, status, body)| (path.to_string(), (status, body)))
                    .collect(),
            ),
            log: Arc::default(),
        };
        let log = routes.log.clone();

        let listener = TcpListener::bind("127.0.0.1:0").expect("bind upstream fixture");
        let addr = listener.local_addr().expect("upstream fixture addr");

        let data = web::Data::new(routes);
        let server = HttpServer::new(move || {
            App::new()
                .app_data(data.clone())
                .default_service(web::to(serve))
        })
        .workers(1)
        .disable_signals()
        .listen(listener)
        .expect("listen upstream fixture")
        .run();
        actix_web::rt::spawn(server);

        Self { addr, log }
    }

    pub fn url(&self, path_and_query: &str) -> String {
        format!("http://{}{}", self.addr, path_and_query)
    }

    /// Paths requested so far, in arrival order.
    pub fn requested(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.path).collect()
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.log.lock().unwrap().clone()
    }
}

async fn serve(req: HttpRequest, body: web::Bytes, routes: web::Data<Routes>) -> HttpResponse {
    let path = req.uri().path().to_string();
    routes.log.lock().unwrap().push(Recorded {
        method: req.method().to_string(),
        path: path.clone(),
        query: req.uri().query().unwrap_or_default().to_string(),
        authorization: req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: body.to_vec(),
    });

    match routes.responses.get(&path) {
        Some((status, body)) => {
            let status = StatusCode::from_u16(*status).expect("valid fixture status");
            HttpResponse::build(status)
                .content_type("application/octet-stream")
                .body(body.clone())
        }
        None => HttpResponse::NotFound().finish(),
    }
}
