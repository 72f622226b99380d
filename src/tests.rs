//! Integration tests for the job board backend.

use std::sync::Arc;

use chrono::{Duration, Utc};
use reqwest::Client;
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::config::Config;
use crate::db::{init_database, Repository};
use crate::{create_router, AppState};

/// Test fixture for integration tests.
struct TestFixture {
    client: Client,
    base_url: String,
    _temp_dir: TempDir,
}

impl TestFixture {
    async fn new() -> Self {
        Self::with_psk(Some("test-api-key".to_string())).await
    }

    async fn with_psk(psk: Option<String>) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.sqlite");

        let pool = init_database(&db_path).await.expect("Failed to init DB");
        let repo = Arc::new(Repository::new(pool));

        let config = Config {
            api_psk: psk.clone(),
            db_path,
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            log_level: "warn".to_string(),
            dev_mode: false,
        };

        let state = AppState {
            repo,
            config: Arc::new(config),
        };

        let app = create_router(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");
        let base_url = format!("http://{}", addr);

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        let mut client_builder = Client::builder();
        if let Some(key) = psk {
            let mut headers = reqwest::header::HeaderMap::new();
            headers.insert("x-api-key", key.parse().unwrap());
            client_builder = client_builder.default_headers(headers);
        }

        TestFixture {
            client: client_builder.build().unwrap(),
            base_url,
            _temp_dir: temp_dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get_as(&self, path: &str, user: &str, role: &str) -> reqwest::RequestBuilder {
        self.client
            .get(self.url(path))
            .header("x-user-id", user)
            .header("x-user-role", role)
    }

    fn post_as(&self, path: &str, user: &str, role: &str, body: &Value) -> reqwest::RequestBuilder {
        self.client
            .post(self.url(path))
            .header("x-user-id", user)
            .header("x-user-role", role)
            .json(body)
    }

    fn put_as(&self, path: &str, user: &str, role: &str, body: &Value) -> reqwest::RequestBuilder {
        self.client
            .put(self.url(path))
            .header("x-user-id", user)
            .header("x-user-role", role)
            .json(body)
    }

    fn delete_as(&self, path: &str, user: &str, role: &str) -> reqwest::RequestBuilder {
        self.client
            .delete(self.url(path))
            .header("x-user-id", user)
            .header("x-user-role", role)
    }

    /// Create a posting as the given employer and return its id.
    async fn create_job(&self, employer: &str, title: &str, min: i64, max: i64) -> String {
        let expiration = (Utc::now() + Duration::days(30)).to_rfc3339();
        let body = json!({
            "jobTitle": title,
            "jobDescription": "A role worth applying to",
            "jobType": "Full-time",
            "minSalary": min,
            "maxSalary": max,
            "country": "Germany",
            "city": "Berlin",
            "experienceLevel": "Mid Level",
            "educationLevel": "Bachelor",
            "jobCategory": "Engineering",
            "expirationDate": expiration,
        });
        let resp = self
            .post_as("/api/jobs", employer, "employer", &body)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 201);
        let body: Value = resp.json().await.unwrap();
        body["data"]["id"].as_str().unwrap().to_string()
    }

    /// Apply to a job as the given candidate and return the application id.
    async fn apply(&self, candidate: &str, job_id: &str) -> String {
        let body = json!({ "jobId": job_id, "coverLetter": "I would love this role." });
        let resp = self
            .post_as("/api/applications", candidate, "candidate", &body)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 201);
        let body: Value = resp.json().await.unwrap();
        body["data"]["id"].as_str().unwrap().to_string()
    }
}

#[tokio::test]
async fn test_health_check() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_auth_missing_psk() {
    let fixture = TestFixture::new().await;

    // Client without the default api key header
    let bare = Client::new();
    let resp = bare.get(fixture.url("/api/jobs")).send().await.unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn test_auth_wrong_psk() {
    let fixture = TestFixture::new().await;

    let bare = Client::new();
    let resp = bare
        .get(fixture.url("/api/jobs"))
        .header("x-api-key", "wrong-key")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn test_identity_required_for_protected_routes() {
    let fixture = TestFixture::new().await;

    // PSK present (default header) but no identity headers
    let resp = fixture
        .client
        .get(fixture.url("/api/applications/mine"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn test_candidate_cannot_create_job() {
    let fixture = TestFixture::new().await;

    let body = json!({
        "jobTitle": "Nope",
        "jobDescription": "x",
        "jobType": "Full-time",
        "country": "Germany",
        "city": "Berlin",
        "experienceLevel": "Mid Level",
        "educationLevel": "Any",
        "jobCategory": "Engineering",
        "expirationDate": (Utc::now() + Duration::days(10)).to_rfc3339(),
    });
    let resp = fixture
        .post_as("/api/jobs", "c1", "candidate", &body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);
}

#[tokio::test]
async fn test_hiring_flow_updates_counters_and_history() {
    let fixture = TestFixture::new().await;
    let job_id = fixture.create_job("emp1", "Backend Engineer", 60_000, 90_000).await;
    let app_id = fixture.apply("cand1", &job_id).await;

    // duplicate application is rejected
    let dup = fixture
        .post_as(
            "/api/applications",
            "cand1",
            "candidate",
            &json!({ "jobId": job_id, "coverLetter": "again" }),
        )
        .send()
        .await
        .unwrap();
    assert_eq!(dup.status(), 409);

    // schedule an interview
    let resp = fixture
        .post_as(
            &format!("/api/applications/{}/interview", app_id),
            "emp1",
            "employer",
            &json!({
                "scheduledDate": (Utc::now() + Duration::days(3)).to_rfc3339(),
                "type": "online",
                "meetingLink": "https://meet.test/abc",
            }),
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["status"], "interview");
    assert!(body["data"]["interviewDetails"]["meetingLink"]
        .as_str()
        .unwrap()
        .contains("meet.test"));

    // hire
    let resp = fixture
        .put_as(
            &format!("/api/applications/{}/status", app_id),
            "emp1",
            "employer",
            &json!({ "status": "hired", "note": "Welcome aboard" }),
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["status"], "hired");
    // submitted + interview + hired
    assert_eq!(body["data"]["statusHistory"].as_array().unwrap().len(), 3);

    // counters on the job
    let resp = fixture
        .get_as(&format!("/api/jobs/{}", job_id), "emp1", "employer")
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["applicationsCount"], 1);
    assert_eq!(body["data"]["hiredCount"], 1);

    // employer stats reflect the hire
    let resp = fixture
        .get_as(&format!("/api/jobs/{}/stats", job_id), "emp1", "employer")
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["hired"], 1);
}

#[tokio::test]
async fn test_withdraw_blocked_after_decision() {
    let fixture = TestFixture::new().await;
    let job_id = fixture.create_job("emp1", "Data Engineer", 50_000, 80_000).await;
    let app_id = fixture.apply("cand1", &job_id).await;

    let resp = fixture
        .put_as(
            &format!("/api/applications/{}/status", app_id),
            "emp1",
            "employer",
            &json!({ "status": "hired" }),
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = fixture
        .post_as(
            &format!("/api/applications/{}/withdraw", app_id),
            "cand1",
            "candidate",
            &json!({ "reason": "changed my mind" }),
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["code"], "INVALID_TRANSITION");
}

#[tokio::test]
async fn test_withdraw_decrements_and_allows_reapply() {
    let fixture = TestFixture::new().await;
    let job_id = fixture.create_job("emp1", "Platform Engineer", 70_000, 95_000).await;
    let app_id = fixture.apply("cand1", &job_id).await;

    let resp = fixture
        .post_as(
            &format!("/api/applications/{}/withdraw", app_id),
            "cand1",
            "candidate",
            &json!({}),
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    // counter back to zero
    let resp = fixture
        .get_as(&format!("/api/jobs/{}", job_id), "cand1", "candidate")
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["applicationsCount"], 0);

    // the withdrawn application is gone from the candidate's view
    let resp = fixture
        .get_as(&format!("/api/applications/{}", app_id), "cand1", "candidate")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    // a fresh application goes through
    fixture.apply("cand1", &job_id).await;
}

#[tokio::test]
async fn test_apply_to_expired_job_rejected() {
    let fixture = TestFixture::new().await;
    let job_id = fixture.create_job("emp1", "Short-lived role", 1, 2).await;

    // close the posting
    let resp = fixture
        .put_as(
            &format!("/api/jobs/{}", job_id),
            "emp1",
            "employer",
            &json!({ "status": "Closed" }),
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = fixture
        .post_as(
            "/api/applications",
            "cand1",
            "candidate",
            &json!({ "jobId": job_id, "coverLetter": "late" }),
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn test_job_search_salary_overlap_and_sentinels() {
    let fixture = TestFixture::new().await;
    fixture.create_job("emp1", "Low band role", 30_000, 45_000).await;
    fixture.create_job("emp1", "High band role", 80_000, 120_000).await;

    // requested range overlaps only the high band
    let resp = fixture
        .client
        .get(fixture.url("/api/jobs?minSalary=90000&maxSalary=150000&category=All"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let items = body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["jobTitle"], "High band role");
    assert_eq!(body["data"]["pagination"]["totalItems"], 1);

    // sentinel-only query returns everything live
    let resp = fixture
        .client
        .get(fixture.url("/api/jobs?category=All&jobType="))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_candidate_profile_scoring_over_http() {
    let fixture = TestFixture::new().await;

    // full name alone lands at 10 percent
    let resp = fixture
        .put_as(
            "/api/candidates/me",
            "cand1",
            "candidate",
            &json!({ "personalInfo": { "fullName": "Jane Doe" } }),
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["completionPercentage"], 10);
    assert_eq!(body["data"]["isProfileComplete"], false);

    // a later partial update preserves the earlier field
    let resp = fixture
        .put_as(
            "/api/candidates/me",
            "cand1",
            "candidate",
            &json!({ "personalInfo": { "title": "Engineer" } }),
        )
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["personalInfo"]["fullName"], "Jane Doe");
    assert_eq!(body["data"]["completionPercentage"], 20);
}

#[tokio::test]
async fn test_employer_profile_scoring_over_http() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .put_as(
            "/api/employers/me",
            "emp1",
            "employer",
            &json!({ "companyInfo": { "companyName": "Acme", "logo": "/logo.png" } }),
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    // 1 + 1.5 of 11 slots
    assert_eq!(body["data"]["completionPercentage"], 23);
    assert_eq!(body["data"]["isProfileComplete"], false);

    // contact fields alone carry 3 unit slots
    let resp = fixture
        .put_as(
            "/api/employers/me",
            "emp2",
            "employer",
            &json!({ "contact": {
                "phone": "+49 30 1234",
                "email": "jobs@acme.test",
                "location": "Berlin",
            } }),
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["completionPercentage"], 27);
}

#[tokio::test]
async fn test_saved_jobs_roundtrip() {
    let fixture = TestFixture::new().await;
    let job_id = fixture.create_job("emp1", "Bookmarkable role", 40_000, 60_000).await;

    let resp = fixture
        .post_as(
            &format!("/api/saved-jobs/{}", job_id),
            "cand1",
            "candidate",
            &json!({}),
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);

    // saving twice conflicts
    let resp = fixture
        .post_as(
            &format!("/api/saved-jobs/{}", job_id),
            "cand1",
            "candidate",
            &json!({}),
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 409);

    let resp = fixture
        .get_as("/api/saved-jobs", "cand1", "candidate")
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 1);

    let resp = fixture
        .delete_as(&format!("/api/saved-jobs/{}", job_id), "cand1", "candidate")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = fixture
        .delete_as(&format!("/api/saved-jobs/{}", job_id), "cand1", "candidate")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn test_search_history_upserts_per_query() {
    let fixture = TestFixture::new().await;

    for _ in 0..2 {
        let resp = fixture
            .post_as(
                "/api/search-history",
                "cand1",
                "candidate",
                &json!({ "searchQuery": "Rust Engineer", "resultsCount": 5 }),
            )
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 201);
    }

    let resp = fixture
        .get_as("/api/search-history", "cand1", "candidate")
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let entries = body["data"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["searchQuery"], "rust engineer");
    assert_eq!(entries[0]["searchCount"], 2);

    // suggestions surface the normalized query
    let resp = fixture
        .client
        .get(fixture.url("/api/search-history/suggestions?q=rust"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"][0], "rust engineer");

    let resp = fixture
        .delete_as("/api/search-history", "cand1", "candidate")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"], 1);
}

#[tokio::test]
async fn test_job_delete_closes_instead_of_removing() {
    let fixture = TestFixture::new().await;
    let job_id = fixture.create_job("emp1", "Doomed role", 40_000, 60_000).await;
    let app_id = fixture.apply("cand1", &job_id).await;

    let resp = fixture
        .delete_as(&format!("/api/jobs/{}", job_id), "emp1", "employer")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["status"], "Closed");

    // the posting is still fetchable, just no longer open
    let resp = fixture
        .get_as(&format!("/api/jobs/{}", job_id), "cand1", "candidate")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["status"], "Closed");

    // existing applications keep their parent
    let resp = fixture
        .get_as(&format!("/api/applications/{}", app_id), "cand1", "candidate")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    // new applications are refused
    let resp = fixture
        .post_as(
            "/api/applications",
            "cand2",
            "candidate",
            &json!({ "jobId": job_id, "coverLetter": "too late" }),
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn test_saved_jobs_check_and_count() {
    let fixture = TestFixture::new().await;
    let job_id = fixture.create_job("emp1", "Countable role", 40_000, 60_000).await;

    let resp = fixture
        .get_as(&format!("/api/saved-jobs/{}/check", job_id), "cand1", "candidate")
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"], false);

    let resp = fixture
        .post_as(&format!("/api/saved-jobs/{}", job_id), "cand1", "candidate", &json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);

    let resp = fixture
        .get_as(&format!("/api/saved-jobs/{}/check", job_id), "cand1", "candidate")
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"], true);

    let resp = fixture
        .get_as("/api/saved-jobs/count", "cand1", "candidate")
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"], 1);

    // another candidate's count is untouched
    let resp = fixture
        .get_as("/api/saved-jobs/count", "cand2", "candidate")
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"], 0);
}

#[tokio::test]
async fn test_profile_delete_resets_completion() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .put_as(
            "/api/candidates/me",
            "cand1",
            "candidate",
            &json!({ "personalInfo": { "fullName": "Jane Doe" } }),
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = fixture
        .delete_as("/api/candidates/me", "cand1", "candidate")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = fixture
        .get_as("/api/candidates/me", "cand1", "candidate")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    // deleting again is a 404
    let resp = fixture
        .delete_as("/api/candidates/me", "cand1", "candidate")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn test_search_query_minimum_length() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .post_as(
            "/api/search-history",
            "cand1",
            "candidate",
            &json!({ "searchQuery": " r " }),
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_employer_cannot_touch_foreign_application() {
    let fixture = TestFixture::new().await;
    let job_id = fixture.create_job("emp1", "Guarded role", 50_000, 70_000).await;
    let app_id = fixture.apply("cand1", &job_id).await;

    let resp = fixture
        .put_as(
            &format!("/api/applications/{}/status", app_id),
            "emp2",
            "employer",
            &json!({ "status": "rejected" }),
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);
}

#[tokio::test]
async fn test_application_view_marked_on_employer_fetch() {
    let fixture = TestFixture::new().await;
    let job_id = fixture.create_job("emp1", "Watched role", 50_000, 70_000).await;
    let app_id = fixture.apply("cand1", &job_id).await;

    let resp = fixture
        .get_as(&format!("/api/applications/{}", app_id), "emp1", "employer")
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["viewedByEmployer"], true);

    // candidate fetches don't count as employer views
    let resp = fixture
        .get_as(&format!("/api/applications/{}", app_id), "cand1", "candidate")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}
