// crates.io
use httpmock::prelude::*;
use time::format_description::well_known::Rfc3339;
// self
use github_app_broker::{
	_preludet::*, auth::CredentialKind, error::Error, flows::AuthMode, reqwest::Method,
	store::CredentialStore,
};

const EXCHANGE_PATH: &str = "/app/installations/7/access_tokens";
const RESOURCE_PATH: &str = "/repos/octocat/hello-world";

fn rfc3339(datetime: OffsetDateTime) -> String {
	datetime.format(&Rfc3339).expect("Timestamp fixture should format as RFC 3339.")
}

fn resource_url(server: &MockServer) -> Url {
	Url::parse(&server.url(RESOURCE_PATH)).expect("Mock resource URL should parse.")
}

#[tokio::test]
async fn executor_returns_the_parsed_json_body() {
	let server = MockServer::start_async().await;
	let (broker, store) = build_test_broker(&server.base_url());

	seed_credential(
		&store,
		CredentialKind::InstallationToken,
		"ghs_live",
		OffsetDateTime::now_utc() + Duration::minutes(30),
	)
	.await;

	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path(RESOURCE_PATH)
				.header("authorization", "token ghs_live")
				.header("accept", "application/vnd.github+json")
				.header_matches("user-agent", "^github-app-broker/");
			then.status(200)
				.header("content-type", "application/json")
				.json_body(serde_json::json!({ "full_name": "octocat/hello-world" }));
		})
		.await;
	let body =
		broker.get(resource_url(&server)).await.expect("Authorized request should succeed.");

	mock.assert_async().await;

	assert_eq!(body["full_name"], "octocat/hello-world");
}

#[tokio::test]
async fn executor_retries_once_with_a_refreshed_token() {
	let server = MockServer::start_async().await;
	let (broker, store) = build_test_broker(&server.base_url());

	// A stale-but-unexpired token the authority has already invalidated.
	seed_credential(
		&store,
		CredentialKind::InstallationToken,
		"ghs_stale",
		OffsetDateTime::now_utc() + Duration::minutes(30),
	)
	.await;

	let rejected = server
		.mock_async(|when, then| {
			when.method(GET).path(RESOURCE_PATH).header("authorization", "token ghs_stale");
			then.status(401);
		})
		.await;
	let exchange = server
		.mock_async(|when, then| {
			when.method(POST).path(EXCHANGE_PATH).header_matches("authorization", "^Bearer eyJ");
			then.status(201).header("content-type", "application/json").json_body(
				serde_json::json!({
					"token": "ghs_fresh",
					"expires_at": rfc3339(OffsetDateTime::now_utc() + Duration::hours(1)),
				}),
			);
		})
		.await;
	let accepted = server
		.mock_async(|when, then| {
			when.method(GET).path(RESOURCE_PATH).header("authorization", "token ghs_fresh");
			then.status(200)
				.header("content-type", "application/json")
				.json_body(serde_json::json!({ "full_name": "octocat/hello-world" }));
		})
		.await;
	let body = broker
		.get(resource_url(&server))
		.await
		.expect("The request should succeed after one forced token refresh.");

	rejected.assert_async().await;
	exchange.assert_async().await;
	accepted.assert_async().await;

	assert_eq!(body["full_name"], "octocat/hello-world");
}

#[tokio::test]
async fn executor_second_unauthorized_response_is_terminal() {
	let server = MockServer::start_async().await;
	let (broker, store) = build_test_broker(&server.base_url());

	seed_credential(
		&store,
		CredentialKind::InstallationToken,
		"ghs_stale",
		OffsetDateTime::now_utc() + Duration::minutes(30),
	)
	.await;

	let exchange = server
		.mock_async(|when, then| {
			when.method(POST).path(EXCHANGE_PATH);
			then.status(201).header("content-type", "application/json").json_body(
				serde_json::json!({
					"token": "ghs_fresh",
					"expires_at": rfc3339(OffsetDateTime::now_utc() + Duration::hours(1)),
				}),
			);
		})
		.await;
	let resource = server
		.mock_async(|when, then| {
			when.method(GET).path(RESOURCE_PATH).header_matches("authorization", "^token ");
			then.status(401);
		})
		.await;
	let error = broker
		.get(resource_url(&server))
		.await
		.expect_err("Two consecutive rejections should fail the request.");

	assert!(matches!(error, Error::Authorization { kind: CredentialKind::InstallationToken }));

	// Initial attempt plus exactly one retry; the refresh exchanged exactly once.
	resource.assert_calls_async(2).await;
	exchange.assert_calls_async(1).await;
}

#[tokio::test]
async fn tiers_are_cached_independently() {
	let server = MockServer::start_async().await;
	let (broker, store) = build_test_broker(&server.base_url());

	// Expired tier-1 slot next to a valid tier-2 slot.
	seed_credential(
		&store,
		CredentialKind::Assertion,
		"expired-assertion",
		OffsetDateTime::now_utc() - Duration::minutes(5),
	)
	.await;
	seed_credential(
		&store,
		CredentialKind::InstallationToken,
		"ghs_live",
		OffsetDateTime::now_utc() + Duration::minutes(30),
	)
	.await;

	let exchange = server
		.mock_async(|when, then| {
			when.method(POST).path(EXCHANGE_PATH);
			then.status(500);
		})
		.await;
	let _resource = server
		.mock_async(|when, then| {
			when.method(GET).path(RESOURCE_PATH).header("authorization", "token ghs_live");
			then.status(200)
				.header("content-type", "application/json")
				.json_body(serde_json::json!({ "full_name": "octocat/hello-world" }));
		})
		.await;

	broker
		.get(resource_url(&server))
		.await
		.expect("The valid tier-2 slot should carry the request on its own.");

	// The expired assertion never forced an exchange and was left untouched.
	exchange.assert_calls_async(0).await;

	let assertion = store
		.load(CredentialKind::Assertion)
		.await
		.expect("Loading the assertion slot should succeed.")
		.expect("Assertion slot should be populated.");

	assert_eq!(assertion.value.expose(), "expired-assertion");
}

#[tokio::test]
async fn a_non_unauthorized_error_is_not_retried() {
	let server = MockServer::start_async().await;
	let (broker, store) = build_test_broker(&server.base_url());

	seed_credential(
		&store,
		CredentialKind::InstallationToken,
		"ghs_live",
		OffsetDateTime::now_utc() + Duration::minutes(30),
	)
	.await;

	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path(RESOURCE_PATH);
			then.status(404).body("{\"message\":\"Not Found\"}");
		})
		.await;
	let error =
		broker.get(resource_url(&server)).await.expect_err("A 404 should fail the request.");
	let Error::Remote { status, .. } = error else {
		panic!("A 404 should surface as a remote error.");
	};

	assert_eq!(status, 404);

	mock.assert_async().await;
}

#[tokio::test]
async fn unauthenticated_requests_never_retry() {
	let server = MockServer::start_async().await;
	let (broker, _store) = build_test_broker(&server.base_url());
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path(RESOURCE_PATH);
			then.status(401);
		})
		.await;
	let error = broker
		.execute(Method::GET, resource_url(&server), None, AuthMode::None)
		.await
		.expect_err("A 401 without credentials should fail immediately.");

	assert!(matches!(error, Error::Remote { status: 401, .. }));

	mock.assert_async().await;
}

#[tokio::test]
async fn assertion_mode_sends_a_bearer_header() {
	let server = MockServer::start_async().await;
	let (broker, _store) = build_test_broker(&server.base_url());
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/app").header_matches("authorization", "^Bearer eyJ");
			then.status(200)
				.header("content-type", "application/json")
				.json_body(serde_json::json!({ "slug": "demo-app" }));
		})
		.await;
	let url = Url::parse(&server.url("/app")).expect("Mock app URL should parse.");
	let body = broker
		.execute(Method::GET, url, None, AuthMode::Assertion)
		.await
		.expect("App-level request should succeed with a freshly minted assertion.");

	mock.assert_async().await;

	assert_eq!(body["slug"], "demo-app");
}

#[tokio::test]
async fn an_empty_success_body_is_null() {
	let server = MockServer::start_async().await;
	let (broker, store) = build_test_broker(&server.base_url());

	seed_credential(
		&store,
		CredentialKind::InstallationToken,
		"ghs_live",
		OffsetDateTime::now_utc() + Duration::minutes(30),
	)
	.await;

	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path(RESOURCE_PATH).header("authorization", "token ghs_live");
			then.status(204);
		})
		.await;
	let body = broker
		.get(resource_url(&server))
		.await
		.expect("A bodiless success should not be a parse error.");

	mock.assert_async().await;

	assert_eq!(body, serde_json::Value::Null);
}

#[tokio::test]
async fn post_sends_the_json_body() {
	let server = MockServer::start_async().await;
	let (broker, store) = build_test_broker(&server.base_url());

	seed_credential(
		&store,
		CredentialKind::InstallationToken,
		"ghs_live",
		OffsetDateTime::now_utc() + Duration::minutes(30),
	)
	.await;

	let issues_path = "/repos/octocat/hello-world/issues";
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path(issues_path)
				.header("authorization", "token ghs_live")
				.json_body(serde_json::json!({ "title": "Found a bug" }));
			then.status(201)
				.header("content-type", "application/json")
				.json_body(serde_json::json!({ "number": 1347 }));
		})
		.await;
	let url = Url::parse(&server.url(issues_path)).expect("Mock issues URL should parse.");
	let body = broker
		.post(url, serde_json::json!({ "title": "Found a bug" }))
		.await
		.expect("Authorized creation should succeed.");

	mock.assert_async().await;

	assert_eq!(body["number"], 1347);
}
