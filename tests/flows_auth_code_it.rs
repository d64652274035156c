#![cfg(all(feature = "test", feature = "reqwest"))]

// crates.io
use httpmock::prelude::*;
// self
use baemin_integration::{
	_preludet::*,
	auth::{ProviderId, TokenRecord},
	error::ConfigError,
	flows::{KakaoUser, PkceCodeChallengeMethod},
};

const CLIENT_ID: &str = "kakao-client-it";

fn build_client(server: &MockServer) -> ReqwestTestClient {
	let base = server.url("");

	build_reqwest_test_client(
		mock_identity_descriptor(&base),
		mock_platform_descriptor(&base),
		CLIENT_ID,
	)
}

fn identity_token_body() -> &'static str {
	"{\"access_token\":\"kakao-access\",\"token_type\":\"bearer\",\"refresh_token\":\"kakao-refresh\",\"expires_in\":43199,\"scope\":\"profile_nickname\",\"refresh_token_expires_in\":5183999}"
}

#[tokio::test]
async fn start_authorization_builds_pkce_authorize_url() {
	let server = MockServer::start_async().await;
	let client = build_client(&server);
	let session = client.start_authorization();

	assert_eq!(session.code_challenge_method(), PkceCodeChallengeMethod::S256);
	assert_eq!(session.state.len(), 32);
	assert_eq!(session.code_verifier().len(), 54);
	assert!(session.validate_state(&session.state).is_ok());
	assert_eq!(session.redirect_uri, client.redirect_uri);

	let pairs: HashMap<_, _> = session.authorize_url.query_pairs().into_owned().collect();

	assert_eq!(session.authorize_url.path(), "/oauth/authorize");
	assert_eq!(pairs.get("response_type"), Some(&"code".into()));
	assert_eq!(pairs.get("client_id"), Some(&CLIENT_ID.into()));
	assert_eq!(pairs.get("redirect_uri"), Some(&"https://app.example.com/oauth".into()));
	assert_eq!(pairs.get("code_challenge_method"), Some(&"S256".into()));
	assert_eq!(pairs.get("code_challenge"), Some(&session.code_challenge().to_owned()));
	assert_eq!(pairs.get("deep_link_method"), Some(&"universal_link".into()));
	assert_eq!(pairs.get("state"), Some(&session.state));

	let other = client.start_authorization();

	assert_ne!(other.state, session.state, "Every session must carry a fresh state.");
	assert_ne!(other.code_verifier(), session.code_verifier());
}

#[tokio::test]
async fn exchange_code_sends_verifier_and_records_the_token() {
	let server = MockServer::start_async().await;
	let client = build_client(&server);
	let session = client.start_authorization();
	let verifier = session.code_verifier().to_owned();
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/oauth/token")
				.form_urlencoded_tuple("grant_type", "authorization_code")
				.form_urlencoded_tuple("code", "valid-code")
				.form_urlencoded_tuple("code_verifier", verifier.as_str())
				.form_urlencoded_tuple("client_id", CLIENT_ID)
				.form_urlencoded_tuple("redirect_uri", "https://app.example.com/oauth");
			then.status(200)
				.header("content-type", "application/json")
				.body(identity_token_body());
		})
		.await;
	let record = client
		.exchange_code(session, "valid-code")
		.await
		.expect("Authorization code exchange should succeed.");

	mock.assert_async().await;

	assert_eq!(record.provider.as_ref(), "mock-kakao");
	assert_eq!(record.access_token.expose(), "kakao-access");
	assert_eq!(record.refresh_token.as_ref().map(|secret| secret.expose()), Some("kakao-refresh"));
	assert_eq!(record.scope, vec!["profile_nickname".to_owned()]);
	assert!(record.expires_at.is_some_and(|expires_at| expires_at > record.issued_at));
}

#[tokio::test]
async fn exchange_code_accepts_the_full_redirect_url() {
	let server = MockServer::start_async().await;
	let client = build_client(&server);
	let session = client.start_authorization();
	let pasted = format!("https://app.example.com/oauth?code=pasted-code&state={}", session.state);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token").form_urlencoded_tuple("code", "pasted-code");
			then.status(200)
				.header("content-type", "application/json")
				.body(identity_token_body());
		})
		.await;

	client.exchange_code(session, &pasted).await.expect("Pasted redirect URL should be accepted.");

	mock.assert_async().await;
}

#[tokio::test]
async fn exchange_code_rejects_bad_input_without_calling_the_provider() {
	let server = MockServer::start_async().await;
	let client = build_client(&server);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token");
			then.status(200)
				.header("content-type", "application/json")
				.body(identity_token_body());
		})
		.await;
	let err = client
		.exchange_code(client.start_authorization(), "   ")
		.await
		.expect_err("Blank input must be rejected.");

	assert!(matches!(err, Error::Config(ConfigError::MissingAuthorizationCode)));

	let err = client
		.exchange_code(
			client.start_authorization(),
			"https://app.example.com/oauth?code=abc&state=forged",
		)
		.await
		.expect_err("A foreign state must be rejected.");

	assert!(matches!(err, Error::InvalidGrant { .. }));

	let err = client
		.exchange_code(
			client.start_authorization(),
			"https://app.example.com/oauth?error=access_denied&error_description=User%20denied",
		)
		.await
		.expect_err("A provider error in the redirect must be surfaced.");

	assert!(matches!(err, Error::InvalidGrant { ref reason } if reason == "User denied"));

	mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn exchange_code_classifies_invalid_grant_errors() {
	let server = MockServer::start_async().await;
	let client = build_client(&server);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token");
			then.status(400).header("content-type", "application/json").body(
				"{\"error\":\"invalid_grant\",\"error_description\":\"authorization code not found for code=stale-code\",\"error_code\":\"KOE320\"}",
			);
		})
		.await;
	let err = client
		.exchange_code(client.start_authorization(), "stale-code")
		.await
		.expect_err("Invalid grant errors should be classified.");

	mock.assert_async().await;

	assert!(matches!(err, Error::InvalidGrant { ref reason } if reason.contains("not found")));
}

#[tokio::test]
async fn exchange_code_requires_expires_in() {
	let server = MockServer::start_async().await;
	let client = build_client(&server);
	let _mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/token");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"kakao-access\",\"token_type\":\"bearer\"}");
		})
		.await;
	let err = client
		.exchange_code(client.start_authorization(), "valid-code")
		.await
		.expect_err("Tokens without a lifetime should be rejected.");

	assert!(matches!(err, Error::Config(ConfigError::MissingExpiresIn)));
}

#[tokio::test]
async fn fetch_user_info_sends_app_headers_and_reads_the_nickname() {
	let server = MockServer::start_async().await;
	let client = build_client(&server);
	let token = identity_token("kakao-access");
	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/v2/user/me")
				.query_param("secure_resource", "true")
				.header("authorization", "Bearer kakao-access")
				.header("accept-language", "en-US,en;q=0.9")
				.header("user-agent", "iph1_15.6.1");
			then.status(200).header("content-type", "application/json").body(
				"{\"id\":4242,\"connected_at\":\"2024-01-01T00:00:00Z\",\"kakao_account\":{\"profile\":{\"nickname\":\"배민이\"}}}",
			);
		})
		.await;
	let user = client.fetch_user_info(&token).await.expect("User info lookup should succeed.");

	mock.assert_async().await;

	assert_eq!(user, KakaoUser { id: 4242, nickname: Some("배민이".into()) });
	assert_eq!(user.account_id().expect("Account id should build.").as_ref(), "kakao_4242");
}

#[tokio::test]
async fn fetch_user_info_maps_rejected_tokens_to_unauthorized() {
	let server = MockServer::start_async().await;
	let client = build_client(&server);
	let _mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/v2/user/me");
			then.status(401)
				.header("content-type", "application/json")
				.body("{\"msg\":\"this access token does not exist\",\"code\":-401}");
		})
		.await;
	let err = client
		.fetch_user_info(&identity_token("revoked"))
		.await
		.expect_err("Rejected tokens should fail.");

	assert!(
		matches!(err, Error::Unauthorized { ref reason } if reason.contains("does not exist"))
	);
}

fn identity_token(access: &str) -> TokenRecord {
	TokenRecord::builder(ProviderId::new("mock-kakao").expect("Provider fixture should be valid."))
		.access_token(access)
		.expires_in(Duration::hours(12))
		.build()
		.expect("Identity token fixture should build.")
}
