//! Router-level tests against an in-memory store and a temporary upload
//! directory.

use std::path::PathBuf;

use axum::{
  body::{Body, to_bytes},
  http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use tails_core::store::TailsStore;
use tails_store_sqlite::SqliteStore;
use tempfile::TempDir;
use tower::ServiceExt as _;

use crate::{AppState, ServerConfig, router};

const BOUNDARY: &str = "tails-test-boundary";
const PNG: &[u8] = b"\x89PNG\r\n\x1a\nnot-really-a-png";

struct TestApp {
  state: AppState<SqliteStore>,
  _dir:  TempDir,
}

impl TestApp {
  async fn new() -> Self {
    let dir = tempfile::tempdir().unwrap();
    let store = SqliteStore::open_in_memory().await.unwrap();
    let config = ServerConfig {
      host:             "127.0.0.1".to_string(),
      port:             8080,
      store_path:       PathBuf::from(":memory:"),
      upload_dir:       dir.path().to_path_buf(),
      jwt_secret:       "test-secret".to_string(),
      token_ttl_days:   7,
      max_upload_bytes: 1024,
      cors_origins:     vec![],
      google:           None,
    };
    let state = AppState::new(store, config).await.unwrap();
    Self { state, _dir: dir }
  }

  async fn raw(&self, req: Request<Body>) -> (StatusCode, Vec<u8>) {
    let resp = router(self.state.clone()).oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
  }

  async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
    let (status, bytes) = self.raw(req).await;
    let body = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
  }

  async fn json(
    &self,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
      builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let req = match body {
      Some(body) => builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap(),
      None => builder.body(Body::empty()).unwrap(),
    };
    self.send(req).await
  }

  async fn multipart(&self, uri: &str, token: &str, body: Vec<u8>) -> (StatusCode, Value) {
    let req = Request::builder()
      .method("POST")
      .uri(uri)
      .header(header::AUTHORIZATION, format!("Bearer {token}"))
      .header(
        header::CONTENT_TYPE,
        format!("multipart/form-data; boundary={BOUNDARY}"),
      )
      .body(Body::from(body))
      .unwrap();
    self.send(req).await
  }

  /// Register an account; returns `(token, user_id)`.
  async fn register(&self, email: &str) -> (String, i64) {
    let (status, body) = self
      .json(
        "POST",
        "/auth/register",
        None,
        Some(json!({ "email": email, "password": "hunter2hunter2", "name": "Tester" })),
      )
      .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    (
      body["token"].as_str().unwrap().to_owned(),
      body["user"]["id"].as_i64().unwrap(),
    )
  }

  async fn dog_type(&self) -> i64 {
    self.state.store.create_type("Dog".into()).await.unwrap().id
  }

  /// Create a listing with `images` PNG attachments.
  async fn create_listing(&self, token: &str, type_id: i64, images: usize) -> (StatusCode, Value) {
    let data = json!({
      "name": "Rex",
      "gender": "male",
      "dob": "2022-03-01",
      "vaccinated": "full",
      "address": { "city": "Austin" },
      "type_id": type_id,
    });
    let files: Vec<_> = (0..images)
      .map(|i| ("images", format!("rex{i}.png"), "image/png", PNG))
      .collect();
    self
      .multipart("/adoptables", token, multipart_body(Some(&data.to_string()), &files))
      .await
  }
}

fn multipart_body(data: Option<&str>, files: &[(&str, String, &str, &[u8])]) -> Vec<u8> {
  let mut body = Vec::new();
  if let Some(data) = data {
    body.extend_from_slice(
      format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"data\"\r\n\r\n{data}\r\n"
      )
      .as_bytes(),
    );
  }
  for (field, filename, content_type, bytes) in files {
    body.extend_from_slice(
      format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; \
         filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
      )
      .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(b"\r\n");
  }
  body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
  body
}

// ─── Auth ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn health_is_public() {
  let app = TestApp::new().await;
  let (status, body) = app.json("GET", "/health", None, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn register_login_and_me() {
  let app = TestApp::new().await;
  let (_, id) = app.register("Pat@Example.com").await;

  let (status, body) = app
    .json(
      "POST",
      "/auth/login",
      None,
      Some(json!({ "email": "pat@example.com", "password": "hunter2hunter2" })),
    )
    .await;
  assert_eq!(status, StatusCode::OK);
  let token = body["token"].as_str().unwrap();

  let (status, me) = app.json("GET", "/auth/me", Some(token), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(me["id"], id);
  assert_eq!(me["email"], "pat@example.com");
  assert_eq!(me["is_admin"], false);
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
  let app = TestApp::new().await;
  app.register("pat@example.com").await;
  let (status, body) = app
    .json(
      "POST",
      "/auth/register",
      None,
      Some(json!({ "email": "pat@example.com", "password": "longenough", "name": "Pat" })),
    )
    .await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert!(body["msg"].is_string());
}

#[tokio::test]
async fn short_password_is_rejected() {
  let app = TestApp::new().await;
  let (status, _) = app
    .json(
      "POST",
      "/auth/register",
      None,
      Some(json!({ "email": "pat@example.com", "password": "short", "name": "Pat" })),
    )
    .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn wrong_password_and_unknown_email_look_the_same() {
  let app = TestApp::new().await;
  app.register("pat@example.com").await;

  let (s1, b1) = app
    .json(
      "POST",
      "/auth/login",
      None,
      Some(json!({ "email": "pat@example.com", "password": "wrong-password" })),
    )
    .await;
  let (s2, b2) = app
    .json(
      "POST",
      "/auth/login",
      None,
      Some(json!({ "email": "nobody@example.com", "password": "wrong-password" })),
    )
    .await;
  assert_eq!(s1, StatusCode::UNAUTHORIZED);
  assert_eq!(s2, StatusCode::UNAUTHORIZED);
  assert_eq!(b1, b2);
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() {
  let app = TestApp::new().await;

  let (status, body) = app.json("GET", "/auth/me", None, None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
  assert!(body["msg"].is_string());

  let (status, _) = app.json("GET", "/pets", Some("not.a.jwt"), None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);

  let req = Request::builder()
    .uri("/adoption/my-applications")
    .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
    .body(Body::empty())
    .unwrap();
  let (status, _) = app.send(req).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn google_sign_in_is_404_when_not_configured() {
  let app = TestApp::new().await;
  let (status, _) = app.json("GET", "/auth/google", None, None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_json_is_a_400_with_msg() {
  let app = TestApp::new().await;
  let req = Request::builder()
    .method("POST")
    .uri("/auth/login")
    .header(header::CONTENT_TYPE, "application/json")
    .body(Body::from("{\"email\":"))
    .unwrap();
  let (status, body) = app.send(req).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["msg"].is_string());
}

// ─── Listings ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_listing_stores_and_serves_images() {
  let app = TestApp::new().await;
  let (token, id) = app.register("care@example.com").await;
  let dog = app.dog_type().await;

  let (status, listing) = app.create_listing(&token, dog, 2).await;
  assert_eq!(status, StatusCode::CREATED, "{listing}");
  assert_eq!(listing["caretaker_id"], id);
  assert_eq!(listing["status"], "available");
  assert_eq!(listing["type_name"], "Dog");
  let images = listing["images"].as_array().unwrap();
  assert_eq!(images.len(), 2);

  let name = images[0].as_str().unwrap();
  assert!(name.ends_with(".png"));
  let req = Request::builder()
    .uri(format!("/uploads/adoptables/{name}"))
    .body(Body::empty())
    .unwrap();
  let (status, bytes) = app.raw(req).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(bytes, PNG);
}

#[tokio::test]
async fn more_than_five_images_is_rejected() {
  let app = TestApp::new().await;
  let (token, _) = app.register("care@example.com").await;
  let dog = app.dog_type().await;

  let (status, body) = app.create_listing(&token, dog, 6).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["msg"].as_str().unwrap().contains('5'));
}

#[tokio::test]
async fn non_image_upload_is_rejected() {
  let app = TestApp::new().await;
  let (token, _) = app.register("care@example.com").await;
  let dog = app.dog_type().await;
  let data = json!({
    "name": "Rex", "gender": "male", "dob": "2022-03-01",
    "address": { "city": "Austin" }, "type_id": dog,
  });
  let files = [("images", "evil.html".to_owned(), "text/html", b"<script>".as_slice())];
  let (status, _) = app
    .multipart("/adoptables", &token, multipart_body(Some(&data.to_string()), &files))
    .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn only_caretaker_edits_listing() {
  let app = TestApp::new().await;
  let (owner, _) = app.register("care@example.com").await;
  let (other, _) = app.register("other@example.com").await;
  let dog = app.dog_type().await;
  let (_, listing) = app.create_listing(&owner, dog, 0).await;
  let uri = format!("/adoptables/{}", listing["id"]);

  let (status, _) = app
    .json("PUT", &uri, Some(&other), Some(json!({ "name": "Stolen" })))
    .await;
  assert_eq!(status, StatusCode::FORBIDDEN);
  let (status, _) = app.json("DELETE", &uri, Some(&other), None).await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  let (status, updated) = app
    .json("PUT", &uri, Some(&owner), Some(json!({ "name": "Max" })))
    .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(updated["name"], "Max");

  let (status, _) = app.json("DELETE", &uri, Some(&owner), None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);
  let (status, _) = app.json("GET", &uri, None, None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn search_is_public_and_paginated() {
  let app = TestApp::new().await;
  let (token, _) = app.register("care@example.com").await;
  let dog = app.dog_type().await;
  for _ in 0..3 {
    app.create_listing(&token, dog, 0).await;
  }

  let (status, page) = app
    .json("GET", "/adoptables?search=rex&gender=male&limit=2&page=2", None, None)
    .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(page["total"], 3);
  assert_eq!(page["total_pages"], 2);
  assert_eq!(page["items"].as_array().unwrap().len(), 1);

  let (_, page) = app.json("GET", "/adoptables?gender=female", None, None).await;
  assert_eq!(page["total"], 0);

  let (status, _) = app.json("GET", "/adoptables?gender=unicorn", None, None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ─── Adoption workflow ───────────────────────────────────────────────────────

#[tokio::test]
async fn apply_approve_puts_listing_on_hold() {
  let app = TestApp::new().await;
  let (caretaker, _) = app.register("care@example.com").await;
  let (adopter, adopter_id) = app.register("adopt@example.com").await;
  let dog = app.dog_type().await;
  let (_, listing) = app.create_listing(&caretaker, dog, 1).await;
  let listing_id = listing["id"].as_i64().unwrap();

  let (status, request) = app
    .json(
      "POST",
      "/adoption/apply",
      Some(&adopter),
      Some(json!({ "adoptable_id": listing_id, "message": "great yard" })),
    )
    .await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(request["status"], "pending");
  assert_eq!(request["adopter_id"], adopter_id);

  let (status, approved) = app
    .json(
      "PATCH",
      &format!("/adoption/status/{}", request["id"]),
      Some(&caretaker),
      Some(json!({ "status": "approved" })),
    )
    .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(approved["status"], "approved");

  let (_, listing) = app
    .json("GET", &format!("/adoptables/{listing_id}"), None, None)
    .await;
  assert_eq!(listing["status"], "hold");
}

#[tokio::test]
async fn reapplying_is_already_applied() {
  let app = TestApp::new().await;
  let (caretaker, _) = app.register("care@example.com").await;
  let (adopter, _) = app.register("adopt@example.com").await;
  let dog = app.dog_type().await;
  let (_, listing) = app.create_listing(&caretaker, dog, 0).await;
  let body = json!({ "adoptable_id": listing["id"], "message": "great yard" });

  app.json("POST", "/adoption/apply", Some(&adopter), Some(body.clone())).await;
  let (status, err) = app
    .json("POST", "/adoption/apply", Some(&adopter), Some(body))
    .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(err["msg"], "already applied");
}

#[tokio::test]
async fn applying_to_own_listing_is_400() {
  let app = TestApp::new().await;
  let (caretaker, _) = app.register("care@example.com").await;
  let dog = app.dog_type().await;
  let (_, listing) = app.create_listing(&caretaker, dog, 0).await;

  let (status, err) = app
    .json(
      "POST",
      "/adoption/apply",
      Some(&caretaker),
      Some(json!({ "adoptable_id": listing["id"] })),
    )
    .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(err["msg"], "cannot apply for your own pet");
}

#[tokio::test]
async fn only_caretaker_transitions_requests() {
  let app = TestApp::new().await;
  let (caretaker, _) = app.register("care@example.com").await;
  let (adopter, _) = app.register("adopt@example.com").await;
  let (outsider, _) = app.register("out@example.com").await;
  let dog = app.dog_type().await;
  let (_, listing) = app.create_listing(&caretaker, dog, 0).await;
  let (_, request) = app
    .json(
      "POST",
      "/adoption/apply",
      Some(&adopter),
      Some(json!({ "adoptable_id": listing["id"] })),
    )
    .await;
  let uri = format!("/adoption/status/{}", request["id"]);

  for token in [&adopter, &outsider] {
    let (status, err) = app
      .json("PATCH", &uri, Some(token), Some(json!({ "status": "approved" })))
      .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(err["msg"], "unauthorized or invalid");
  }

  let (_, listing) = app
    .json("GET", &format!("/adoptables/{}", listing["id"]), None, None)
    .await;
  assert_eq!(listing["status"], "available");
}

#[tokio::test]
async fn incoming_and_my_applications() {
  let app = TestApp::new().await;
  let (caretaker, _) = app.register("care@example.com").await;
  let (adopter, _) = app.register("adopt@example.com").await;
  let dog = app.dog_type().await;
  let (_, listing) = app.create_listing(&caretaker, dog, 1).await;
  app
    .json(
      "PUT",
      "/users/me/profile",
      Some(&adopter),
      Some(json!({ "housing_type": "house", "has_yard": true })),
    )
    .await;
  app
    .json(
      "POST",
      "/adoption/apply",
      Some(&adopter),
      Some(json!({ "adoptable_id": listing["id"], "message": "hi" })),
    )
    .await;

  let (_, mine) = app.json("GET", "/adoption/my-applications", Some(&adopter), None).await;
  assert_eq!(mine[0]["adoptable_name"], "Rex");
  assert_eq!(mine[0]["status"], "pending");
  assert!(mine[0]["cover_image"].is_string());

  let (_, incoming) = app.json("GET", "/adoption/incoming", Some(&caretaker), None).await;
  assert_eq!(incoming[0]["applicant_email"], "adopt@example.com");
  assert_eq!(incoming[0]["profile"]["housing_type"], "house");
}

// ─── Messages ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn messages_are_private_to_participants() {
  let app = TestApp::new().await;
  let (caretaker, _) = app.register("care@example.com").await;
  let (adopter, _) = app.register("adopt@example.com").await;
  let (outsider, _) = app.register("out@example.com").await;
  let dog = app.dog_type().await;
  let (_, listing) = app.create_listing(&caretaker, dog, 0).await;
  let (_, request) = app
    .json(
      "POST",
      "/adoption/apply",
      Some(&adopter),
      Some(json!({ "adoptable_id": listing["id"] })),
    )
    .await;
  let request_id = request["id"].as_i64().unwrap();

  let (status, _) = app
    .json(
      "POST",
      "/messages",
      Some(&adopter),
      Some(json!({ "request_id": request_id, "content": "Is he good with cats?" })),
    )
    .await;
  assert_eq!(status, StatusCode::CREATED);

  let (_, unread) = app.json("GET", "/messages/unread", Some(&caretaker), None).await;
  assert_eq!(unread["unread"], 1);

  let thread = format!("/messages?request_id={request_id}");
  let (status, _) = app.json("GET", &thread, Some(&outsider), None).await;
  assert_eq!(status, StatusCode::FORBIDDEN);
  let (status, _) = app
    .json(
      "POST",
      "/messages",
      Some(&outsider),
      Some(json!({ "request_id": request_id, "content": "hello?" })),
    )
    .await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  let (status, messages) = app.json("GET", &thread, Some(&caretaker), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(messages[0]["content"], "Is he good with cats?");

  let (_, unread) = app.json("GET", "/messages/unread", Some(&caretaker), None).await;
  assert_eq!(unread["unread"], 0);
}

// ─── Pets ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn medical_files_are_owner_only() {
  let app = TestApp::new().await;
  let (owner, _) = app.register("owner@example.com").await;
  let (other, _) = app.register("other@example.com").await;
  let dog = app.dog_type().await;

  let (status, pet) = app
    .json("POST", "/pets", Some(&owner), Some(json!({ "name": "Biscuit", "type_id": dog })))
    .await;
  assert_eq!(status, StatusCode::CREATED);
  let pet_id = pet["id"].as_i64().unwrap();

  let mut body = format!(
    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"description\"\r\n\r\nRabies shot\r\n"
  )
  .into_bytes();
  body.extend(multipart_body(None, &[(
    "file",
    "rabies.pdf".to_owned(),
    "application/pdf",
    b"%PDF-1.4".as_slice(),
  )]));

  let uri = format!("/pets/{pet_id}/medical");
  let (status, _) = app.multipart(&uri, &other, body.clone()).await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  let (status, file) = app.multipart(&uri, &owner, body).await;
  assert_eq!(status, StatusCode::CREATED, "{file}");
  assert_eq!(file["original_name"], "rabies.pdf");
  assert_eq!(file["description"], "Rabies shot");

  let download = format!("/pets/{pet_id}/medical/{}", file["id"]);
  let req = Request::builder()
    .uri(&download)
    .header(header::AUTHORIZATION, format!("Bearer {owner}"))
    .body(Body::empty())
    .unwrap();
  let (status, bytes) = app.raw(req).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(bytes, b"%PDF-1.4");

  let (status, _) = app.json("GET", &download, Some(&other), None).await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  // Medical files are never served statically.
  let req = Request::builder()
    .uri(format!("/uploads/medical/{}", file["filename"].as_str().unwrap()))
    .body(Body::empty())
    .unwrap();
  let (status, _) = app.raw(req).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn stats_round_trip_through_api() {
  let app = TestApp::new().await;
  let (owner, _) = app.register("owner@example.com").await;
  let dog = app.dog_type().await;
  let (_, pet) = app
    .json("POST", "/pets", Some(&owner), Some(json!({ "name": "Biscuit", "type_id": dog })))
    .await;
  let uri = format!("/pets/{}/stats", pet["id"]);

  let (status, _) = app
    .json(
      "POST",
      &uri,
      Some(&owner),
      Some(json!({ "metric": "weight", "value": 11.2, "recorded_on": "2024-05-01" })),
    )
    .await;
  assert_eq!(status, StatusCode::CREATED);
  let (status, _) = app
    .json(
      "POST",
      &uri,
      Some(&owner),
      Some(json!({ "metric": "weight", "value": -1.0, "recorded_on": "2024-05-02" })),
    )
    .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (_, stats) = app
    .json("GET", &format!("{uri}?metric=weight"), Some(&owner), None)
    .await;
  assert_eq!(stats.as_array().unwrap().len(), 1);
  assert_eq!(stats[0]["value"], 11.2);
}

// ─── Admin ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn admin_routes_require_admin_flag() {
  let app = TestApp::new().await;
  let (token, id) = app.register("boss@example.com").await;

  let (status, _) = app.json("GET", "/admin/dashboard", Some(&token), None).await;
  assert_eq!(status, StatusCode::FORBIDDEN);
  let (status, _) = app
    .json("POST", "/admin/types", Some(&token), Some(json!({ "name": "Cat" })))
    .await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  app.state.store.set_admin(id, true).await.unwrap();

  let (status, counts) = app.json("GET", "/admin/dashboard", Some(&token), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(counts["users"], 1);
  assert_eq!(counts["admins"], 1);

  let (status, cat) = app
    .json("POST", "/admin/types", Some(&token), Some(json!({ "name": "Cat" })))
    .await;
  assert_eq!(status, StatusCode::CREATED);
  let (status, _) = app
    .json("POST", "/admin/types", Some(&token), Some(json!({ "name": "cat" })))
    .await;
  assert_eq!(status, StatusCode::CONFLICT);

  let (status, _) = app
    .json(
      "POST",
      "/admin/breeds",
      Some(&token),
      Some(json!({ "type_id": cat["id"], "name": "Siamese" })),
    )
    .await;
  assert_eq!(status, StatusCode::CREATED);
  let (_, breeds) = app
    .json("GET", &format!("/types/{}/breeds", cat["id"]), None, None)
    .await;
  assert_eq!(breeds[0]["name"], "Siamese");
}

#[tokio::test]
async fn revoked_admin_loses_access_immediately() {
  let app = TestApp::new().await;
  let (admin, admin_id) = app.register("boss@example.com").await;
  let (_, user_id) = app.register("user@example.com").await;
  app.state.store.set_admin(admin_id, true).await.unwrap();

  let (status, promoted) = app
    .json(
      "PATCH",
      &format!("/admin/users/{user_id}"),
      Some(&admin),
      Some(json!({ "is_admin": true })),
    )
    .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(promoted["is_admin"], true);

  let (status, _) = app
    .json(
      "PATCH",
      &format!("/admin/users/{admin_id}"),
      Some(&admin),
      Some(json!({ "is_admin": false })),
    )
    .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  app.state.store.set_admin(admin_id, false).await.unwrap();
  let (status, _) = app.json("GET", "/admin/users", Some(&admin), None).await;
  assert_eq!(status, StatusCode::FORBIDDEN);
}
