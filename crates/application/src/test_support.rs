//! Test doubles for the gateway ports.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use agrisky_domain::{ApiRequest, AUTHORIZATION};
use serde_json::{Value, json};

use crate::gateway::Gateway;
use crate::ports::{HttpTransport, Navigator, Notifier, TransportError, TransportResponse};
use crate::session::{ACCESS_TOKEN_KEY, MemorySessionStorage, REFRESH_TOKEN_KEY, SessionState};

enum Scripted {
    Response(TransportResponse),
    Failure(TransportError),
}

/// Transport that replays queued responses per path and records every
/// request it was given.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<HashMap<String, VecDeque<Scripted>>>,
    delays: Mutex<HashMap<String, Duration>>,
    sent: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub fn respond(&self, path: &str, response: TransportResponse) {
        self.push(path, Scripted::Response(response));
    }

    pub fn fail(&self, path: &str, error: TransportError) {
        self.push(path, Scripted::Failure(error));
    }

    /// Delays every response on `path`, so concurrent callers overlap.
    pub fn delay(&self, path: &str, delay: Duration) {
        self.delays.lock().unwrap().insert(path.to_string(), delay);
    }

    pub fn sent(&self) -> Vec<ApiRequest> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_to(&self, path: &str) -> Vec<ApiRequest> {
        self.sent().into_iter().filter(|r| r.path == path).collect()
    }

    /// `Authorization` header of every request sent to `path`.
    pub fn authorizations(&self, path: &str) -> Vec<Option<String>> {
        self.sent_to(path)
            .iter()
            .map(|r| r.headers.get(AUTHORIZATION).map(String::from))
            .collect()
    }

    fn push(&self, path: &str, scripted: Scripted) {
        self.routes
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .push_back(scripted);
    }
}

impl HttpTransport for ScriptedTransport {
    fn execute(
        &self,
        request: &ApiRequest,
    ) -> Pin<Box<dyn Future<Output = Result<TransportResponse, TransportError>> + Send + '_>> {
        let request = request.clone();
        Box::pin(async move {
            self.sent.lock().unwrap().push(request.clone());
            let delay = self.delays.lock().unwrap().get(&request.path).copied();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            let next = self
                .routes
                .lock()
                .unwrap()
                .get_mut(&request.path)
                .and_then(VecDeque::pop_front);
            match next {
                Some(Scripted::Response(response)) => Ok(response),
                Some(Scripted::Failure(error)) => Err(error),
                None => Err(TransportError::Other(format!(
                    "no scripted response for {}",
                    request.path
                ))),
            }
        })
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn error(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn routes(&self) -> Vec<String> {
        self.routes.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: &str) {
        self.routes.lock().unwrap().push(route.to_string());
    }
}

/// A gateway wired to test doubles.
pub struct Harness {
    pub transport: Arc<ScriptedTransport>,
    pub storage: Arc<MemorySessionStorage>,
    pub notifier: Arc<RecordingNotifier>,
    pub navigator: Arc<RecordingNavigator>,
    pub gateway: Arc<Gateway>,
}

impl Harness {
    /// Gateway with no stored session.
    pub async fn anonymous() -> Self {
        Self::build(MemorySessionStorage::new(), true).await
    }

    /// Gateway whose durable storage already holds a token pair.
    pub async fn logged_in(access: &str, refresh: &str) -> Self {
        Self::logged_in_with(access, refresh, true).await
    }

    pub async fn logged_in_with(access: &str, refresh: &str, coalesce: bool) -> Self {
        let storage = MemorySessionStorage::with_entries([
            (ACCESS_TOKEN_KEY, access),
            (REFRESH_TOKEN_KEY, refresh),
        ]);
        Self::build(storage, coalesce).await
    }

    async fn build(storage: MemorySessionStorage, coalesce: bool) -> Self {
        let transport = Arc::new(ScriptedTransport::default());
        let storage = Arc::new(storage);
        let notifier = Arc::new(RecordingNotifier::default());
        let navigator = Arc::new(RecordingNavigator::default());
        let session = Arc::new(SessionState::load(storage.clone()).await.unwrap());
        let gateway = Gateway::new(
            transport.clone(),
            session,
            notifier.clone(),
            navigator.clone(),
        )
        .with_coalesced_refresh(coalesce);

        Self {
            transport,
            storage,
            notifier,
            navigator,
            gateway: Arc::new(gateway),
        }
    }
}

/// 200 response wrapping `data` in a success envelope.
pub fn envelope(data: Value) -> TransportResponse {
    TransportResponse::json(200, &json!({"code": 200, "message": "ok", "data": data}))
}

/// 401 response as sent for an expired token.
pub fn unauthorized() -> TransportResponse {
    TransportResponse::json(401, &json!({"msg": "Token has expired"}))
}
