//! Mock backend and in-memory fakes shared by the unit tests.

use std::{collections::HashMap, sync::Arc};

use anyhow::Result;
use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use shared::{
    domain::{ApplicationKey, JobId, ProfileId},
    protocol::{
        ApplicationRecord, ApplicationStatusRecord, JobHeadline, JobRecord, ProfileRecord,
        StatusUpdateRequest,
    },
};
use tokio::{
    net::TcpListener,
    sync::{Mutex, Notify},
};

use crate::{credential::Credential, error::ClientError, media::Blob, transport::RecruiterApi};

pub(crate) fn credential() -> Credential {
    Credential::bearer("test-token")
}

pub(crate) fn profile(id: i64, first: &str, last: &str) -> ProfileRecord {
    ProfileRecord {
        user_id: ProfileId(id),
        first_name: first.to_string(),
        last_name: last.to_string(),
        skills: Vec::new(),
    }
}

pub(crate) fn job_record(id: i64, title: &str) -> JobRecord {
    JobRecord {
        id: JobId(id),
        user_profile_id: ProfileId(1),
        title: title.to_string(),
        description: format!("{title} description"),
        company_name: "CyberHire".to_string(),
        location: "Calgary".to_string(),
        min_salary: Some(100_000),
        max_salary: Some(120_000),
        skills: Vec::new(),
        owner: Some(profile(1, "Rae", "Cruiter")),
    }
}

pub(crate) fn application_record(
    job_id: i64,
    profile_id: i64,
    first: &str,
    last: &str,
    status: &str,
) -> ApplicationRecord {
    ApplicationRecord {
        user_profile_id: ProfileId(profile_id),
        job_id: JobId(job_id),
        application_status_id: None,
        application_status: Some(ApplicationStatusRecord {
            id: None,
            status: status.to_string(),
        }),
        application_submitted_date: None,
        application_reviewed_date: None,
        application_offer_sent_date: None,
        application_rejected_date: None,
        rejection_feedback: None,
        applicant: profile(profile_id, first, last),
        job: Some(JobHeadline {
            title: format!("Job {job_id}"),
            location: "Calgary".to_string(),
        }),
    }
}

#[derive(Clone, Debug)]
pub(crate) enum FakeReply<T> {
    Ok(T),
    NotFound,
    Auth,
    Service(u16),
    Malformed,
}

impl<T: Clone> FakeReply<T> {
    fn resolve(&self, endpoint: &str) -> Result<T, ClientError> {
        match self {
            FakeReply::Ok(value) => Ok(value.clone()),
            FakeReply::NotFound => Err(ClientError::NotFound {
                endpoint: endpoint.to_string(),
            }),
            FakeReply::Auth => Err(ClientError::Auth {
                endpoint: endpoint.to_string(),
                detail: Some("token expired".to_string()),
            }),
            FakeReply::Service(status) => Err(ClientError::Service {
                endpoint: endpoint.to_string(),
                status: Some(*status),
                detail: "fake failure".to_string(),
            }),
            FakeReply::Malformed => Err(ClientError::malformed(endpoint, "expected a JSON array")),
        }
    }
}

/// Holds the first roster call until the test releases it.
pub(crate) struct RosterGate {
    pub entered: Arc<Notify>,
    pub release: Arc<Notify>,
    pub reply: FakeReply<Vec<JobRecord>>,
}

pub(crate) struct FakeApi {
    pub owned_jobs: Mutex<FakeReply<Vec<JobRecord>>>,
    pub applications: Mutex<HashMap<JobId, FakeReply<Vec<ApplicationRecord>>>>,
    pub pictures: Mutex<HashMap<ProfileId, FakeReply<Blob>>>,
    pub resumes: Mutex<HashMap<ProfileId, FakeReply<Blob>>>,
    pub status_reply: Mutex<FakeReply<()>>,
    pub roster_gate: Mutex<Option<RosterGate>>,
    pub calls: Mutex<Vec<String>>,
    pub status_updates: Mutex<Vec<(ApplicationKey, StatusUpdateRequest)>>,
}

impl FakeApi {
    pub(crate) fn new() -> Self {
        Self {
            owned_jobs: Mutex::new(FakeReply::Ok(Vec::new())),
            applications: Mutex::new(HashMap::new()),
            pictures: Mutex::new(HashMap::new()),
            resumes: Mutex::new(HashMap::new()),
            status_reply: Mutex::new(FakeReply::Ok(())),
            roster_gate: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
            status_updates: Mutex::new(Vec::new()),
        }
    }

    pub(crate) async fn with_jobs(self, jobs: Vec<JobRecord>) -> Self {
        *self.owned_jobs.lock().await = FakeReply::Ok(jobs);
        self
    }

    pub(crate) async fn with_applications(
        self,
        job_id: i64,
        reply: FakeReply<Vec<ApplicationRecord>>,
    ) -> Self {
        self.applications.lock().await.insert(JobId(job_id), reply);
        self
    }

    pub(crate) async fn with_picture(self, profile_id: i64, reply: FakeReply<Blob>) -> Self {
        self.pictures.lock().await.insert(ProfileId(profile_id), reply);
        self
    }

    pub(crate) async fn calls_matching(&self, prefix: &str) -> Vec<String> {
        self.calls
            .lock()
            .await
            .iter()
            .filter(|call| call.starts_with(prefix))
            .cloned()
            .collect()
    }

    async fn record(&self, call: String) {
        self.calls.lock().await.push(call);
    }
}

#[async_trait]
impl RecruiterApi for FakeApi {
    async fn list_owned_jobs(&self, _credential: &Credential) -> Result<Vec<JobRecord>, ClientError> {
        let endpoint = "GET /jobs/me";
        self.record(endpoint.to_string()).await;

        let gate = self.roster_gate.lock().await.take();
        if let Some(gate) = gate {
            gate.entered.notify_one();
            gate.release.notified().await;
            return gate.reply.resolve(endpoint);
        }

        self.owned_jobs.lock().await.resolve(endpoint)
    }

    async fn list_job_applications(
        &self,
        job_id: JobId,
        _credential: &Credential,
    ) -> Result<Vec<ApplicationRecord>, ClientError> {
        let endpoint = format!("GET /applications/{job_id}");
        self.record(endpoint.clone()).await;
        self.applications
            .lock()
            .await
            .get(&job_id)
            .cloned()
            .unwrap_or(FakeReply::NotFound)
            .resolve(&endpoint)
    }

    async fn fetch_profile_picture(
        &self,
        profile_id: ProfileId,
        _credential: &Credential,
    ) -> Result<Blob, ClientError> {
        let endpoint = format!("GET /users/profile/{profile_id}/profile_picture");
        self.record(endpoint.clone()).await;
        self.pictures
            .lock()
            .await
            .get(&profile_id)
            .cloned()
            .unwrap_or(FakeReply::NotFound)
            .resolve(&endpoint)
    }

    async fn fetch_resume(
        &self,
        profile_id: ProfileId,
        _credential: &Credential,
    ) -> Result<Blob, ClientError> {
        let endpoint = format!("GET /users/profile/{profile_id}/resume");
        self.record(endpoint.clone()).await;
        self.resumes
            .lock()
            .await
            .get(&profile_id)
            .cloned()
            .unwrap_or(FakeReply::NotFound)
            .resolve(&endpoint)
    }

    async fn update_application_status(
        &self,
        key: ApplicationKey,
        request: &StatusUpdateRequest,
        _credential: &Credential,
    ) -> Result<(), ClientError> {
        let endpoint = format!("PATCH /applications/{key}/");
        self.record(endpoint.clone()).await;
        self.status_reply.lock().await.resolve(&endpoint)?;

        self.status_updates
            .lock()
            .await
            .push((key, request.clone()));
        if let Some(FakeReply::Ok(records)) = self.applications.lock().await.get_mut(&key.job_id) {
            for record in records
                .iter_mut()
                .filter(|record| record.user_profile_id == key.profile_id)
            {
                record.application_status = Some(ApplicationStatusRecord {
                    id: None,
                    status: request.new_status.as_wire().to_string(),
                });
                record.rejection_feedback = request.rejection_feedback.clone();
            }
        }
        Ok(())
    }
}

#[derive(Clone)]
pub(crate) struct MockResponse {
    status: StatusCode,
    content_type: &'static str,
    body: Vec<u8>,
}

impl MockResponse {
    pub(crate) fn json(status: StatusCode, body: serde_json::Value) -> Self {
        Self {
            status,
            content_type: "application/json",
            body: body.to_string().into_bytes(),
        }
    }

    pub(crate) fn bytes(content_type: &'static str, body: &[u8]) -> Self {
        Self {
            status: StatusCode::OK,
            content_type,
            body: body.to_vec(),
        }
    }

    pub(crate) fn detail(status: StatusCode, detail: &str) -> Self {
        Self::json(status, serde_json::json!({ "detail": detail }))
    }
}

#[derive(Clone, Debug)]
pub(crate) struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

#[derive(Clone, Default)]
pub(crate) struct MockBackend {
    routes: Arc<Mutex<HashMap<(Method, String), MockResponse>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockBackend {
    pub(crate) async fn on(&self, method: Method, path: &str, response: MockResponse) {
        self.routes
            .lock()
            .await
            .insert((method, path.to_string()), response);
    }

    pub(crate) async fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().await.clone()
    }

    pub(crate) async fn hits(&self, method: Method, path: &str) -> usize {
        self.requests
            .lock()
            .await
            .iter()
            .filter(|request| request.method == method && request.path == path)
            .count()
    }

    pub(crate) async fn spawn(&self) -> Result<String> {
        std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let app = Router::new()
            .fallback(mock_handler)
            .with_state(self.clone());
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        Ok(format!("http://{addr}"))
    }
}

async fn mock_handler(
    State(mock): State<MockBackend>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let header_text = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    };
    mock.requests.lock().await.push(RecordedRequest {
        method: method.clone(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        authorization: header_text(header::AUTHORIZATION),
        content_type: header_text(header::CONTENT_TYPE),
        body: body.to_vec(),
    });

    let route = mock
        .routes
        .lock()
        .await
        .get(&(method, uri.path().to_string()))
        .cloned();
    match route {
        Some(response) => (
            response.status,
            [(header::CONTENT_TYPE, response.content_type)],
            response.body,
        )
            .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            [(header::CONTENT_TYPE, "application/json")],
            r#"{"detail":"Not Found"}"#,
        )
            .into_response(),
    }
}
