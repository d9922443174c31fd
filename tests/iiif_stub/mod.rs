use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, mpsc};
use std::thread;
use std::time::Duration;

use serde_json::json;

pub const PID: &str = "IE1164978";
pub const COOKIE_NAME: &str = "JSESSIONID";

#[allow(dead_code)]
#[derive(Debug, Clone)]
pub enum ManifestBehavior {
    /// A well-formed manifest with this many canvases, setting a session cookie.
    Pages(usize),
    /// Well-formed, but no cookie is set, so every image request is refused.
    PagesWithoutCookie(usize),
    /// JSON missing the canvas list.
    Malformed,
    NotJson,
    Status(u16),
}

#[derive(Debug, Clone)]
pub struct IiifStubConfig {
    pub manifest: ManifestBehavior,
    /// Image requests for this page index answer HTTP 500.
    pub failing_page: Option<usize>,
}

impl IiifStubConfig {
    pub fn pages(count: usize) -> Self {
        Self {
            manifest: ManifestBehavior::Pages(count),
            failing_page: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub url: String,
    pub cookie: Option<String>,
}

pub struct IiifStub {
    pub base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    shutdown_tx: Option<mpsc::Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl IiifStub {
    pub fn spawn(config: IiifStubConfig) -> Self {
        let server = tiny_http::Server::http("127.0.0.1:0").expect("start iiif stub server");
        let addr = server.server_addr();
        let base_url = format!("http://{addr}");

        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&requests);
        let sessions_issued = AtomicUsize::new(0);
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();
        let server_base = base_url.clone();

        let handle = thread::spawn(move || {
            loop {
                if shutdown_rx.try_recv().is_ok() {
                    break;
                }

                let request = match server.recv_timeout(Duration::from_millis(50)) {
                    Ok(Some(req)) => req,
                    Ok(None) => continue,
                    Err(_) => break,
                };

                let url = request.url().to_string();
                let cookie = request
                    .headers()
                    .iter()
                    .find(|h| h.field.equiv("Cookie"))
                    .map(|h| h.value.as_str().to_owned());
                recorded
                    .lock()
                    .expect("lock recorded requests")
                    .push(RecordedRequest {
                        url: url.clone(),
                        cookie: cookie.clone(),
                    });

                let path = url.split('?').next().unwrap_or(&url).to_owned();
                let manifest_path = format!("/presentation/{PID}/manifest");

                let response = if path == "/handle/10381/good" {
                    redirect(&format!("{server_base}/hop"))
                } else if path == "/hop" {
                    redirect(&format!(
                        "{server_base}/viewer?dps_func=stream&entity={PID}&mode=browse"
                    ))
                } else if path == "/handle/10381/unknown" {
                    redirect(&format!("{server_base}/viewer?mode=browse"))
                } else if path == "/handle/10381/direct" || path == "/viewer" {
                    html("<!doctype html><html><body>viewer</body></html>")
                } else if path == manifest_path {
                    manifest_response(&config.manifest, &server_base, &sessions_issued)
                } else if let Some(rest) = path.strip_prefix("/image/page") {
                    image_response(rest, cookie.as_deref(), config.failing_page)
                } else {
                    tiny_http::Response::from_string("not found").with_status_code(404)
                };

                let _ = request.respond(response);
            }
        });

        Self {
            base_url,
            requests,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    pub fn handle_url(&self, name: &str) -> String {
        format!("{}/handle/10381/{name}", self.base_url)
    }

    pub fn presentation_base(&self) -> String {
        format!("{}/presentation/", self.base_url)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().expect("lock recorded requests").clone()
    }

    /// Recorded requests whose path starts with `prefix`.
    pub fn requests_to(&self, prefix: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.url.starts_with(prefix))
            .collect()
    }
}

impl Drop for IiifStub {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

type StubResponse = tiny_http::Response<std::io::Cursor<Vec<u8>>>;

fn header(name: &str, value: &str) -> tiny_http::Header {
    tiny_http::Header::from_bytes(name.as_bytes(), value.as_bytes()).expect("build header")
}

fn redirect(location: &str) -> StubResponse {
    tiny_http::Response::from_string("")
        .with_status_code(302)
        .with_header(header("Location", location))
}

fn html(body: &str) -> StubResponse {
    tiny_http::Response::from_string(body).with_header(header("Content-Type", "text/html"))
}

fn manifest_response(
    behavior: &ManifestBehavior,
    base_url: &str,
    sessions_issued: &AtomicUsize,
) -> StubResponse {
    let (pages, set_cookie) = match behavior {
        ManifestBehavior::Pages(pages) => (*pages, true),
        ManifestBehavior::PagesWithoutCookie(pages) => (*pages, false),
        ManifestBehavior::Malformed => {
            return json_response(&json!({ "sequences": [{ "label": "no canvases key" }] }));
        }
        ManifestBehavior::NotJson => return html("<html>maintenance</html>"),
        ManifestBehavior::Status(status) => {
            return tiny_http::Response::from_string("error").with_status_code(*status);
        }
    };

    let canvases = (0..pages)
        .map(|i| {
            json!({
                "@id": format!("{base_url}/presentation/{PID}/canvas/{i}"),
                "@type": "sc:Canvas",
                "images": [{
                    "@type": "oa:Annotation",
                    "resource": {
                        "@id": format!("{base_url}/image/page{i}/full/full/0/default.jpg"),
                        "@type": "dctypes:Image",
                        "service": {
                            "@context": "http://iiif.io/api/image/2/context.json",
                            "@id": format!("{base_url}/image/page{i}"),
                        }
                    }
                }]
            })
        })
        .collect::<Vec<_>>();
    let manifest = json!({
        "@context": "http://iiif.io/api/presentation/2/context.json",
        "@id": format!("{base_url}/presentation/{PID}/manifest"),
        "@type": "sc:Manifest",
        "label": "Stub item",
        "sequences": [{ "@type": "sc:Sequence", "canvases": canvases }]
    });

    let mut response = json_response(&manifest);
    if set_cookie {
        let n = sessions_issued.fetch_add(1, Ordering::SeqCst) + 1;
        response = response.with_header(header(
            "Set-Cookie",
            &format!("{COOKIE_NAME}=session-{n}; Path=/; HttpOnly"),
        ));
    }
    response
}

fn json_response(value: &serde_json::Value) -> StubResponse {
    tiny_http::Response::from_string(value.to_string())
        .with_header(header("Content-Type", "application/json"))
}

/// `rest` is everything after `/image/page`, e.g. `0/full/max/0/default.jpg`.
fn image_response(rest: &str, cookie: Option<&str>, failing_page: Option<usize>) -> StubResponse {
    let has_session = cookie.is_some_and(|c| c.contains(&format!("{COOKIE_NAME}=")));
    if !has_session {
        return tiny_http::Response::from_string("forbidden").with_status_code(403);
    }

    let page = rest
        .split('/')
        .next()
        .and_then(|p| p.parse::<usize>().ok());
    if page.is_some() && page == failing_page {
        return tiny_http::Response::from_string("boom").with_status_code(500);
    }

    tiny_http::Response::from_data(format!("image page{rest}").into_bytes())
        .with_header(header("Content-Type", "image/jpeg"))
}
