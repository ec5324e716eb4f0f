use git_tweet_mashup::github::{GithubClient, ProjectSearch};
use git_tweet_mashup::http::{ApiError, RetryPolicy};
use git_tweet_mashup::mashup::Mashup;
use git_tweet_mashup::twitter::{Credentials, PostSearch, TwitterClient};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use url::Url;
use wiremock::matchers::{body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ONE_REPOSITORY: &str = include_str!("fixtures/one_repository.json");
const ONE_TWEET: &str = include_str!("fixtures/one_tweet.json");
const TOKEN: &str = include_str!("fixtures/token.json");
const ACCESS_TOKEN: &str = "AAAAAAAAAAAAAAAAAAAAAMLheAAAAAAA0%2BuSeid%2BULvsea4JtiGRiSDSJSI%3DEUifiRBkKG5E2XzMDjRfl76ZC9Ub0wnz4XsNiRVBChTYbJcE3F";

const FAST: RetryPolicy = RetryPolicy {
    retries: 3,
    delay_ms: 5,
};

fn credentials() -> Credentials {
    Credentials {
        consumer_key: "xvz1evFS4wEEPTGEFPHBog".to_string(),
        consumer_secret: "L8qq9PZyRg6ieKGEKhZolGC0vJWLw8iEJ88DRdyOg".to_string(),
    }
}

fn api(server: &MockServer) -> Url {
    Url::parse(&server.uri()).unwrap()
}

async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .and(header(
            "authorization",
            "Basic eHZ6MWV2RlM0d0VFUFRHRUZQSEJvZzpMOHFxOVBaeVJnNmllS0dFS2hab2xHQzB2SldMdzhpRUo4OERSZHlPZw==",
        ))
        .and(header(
            "content-type",
            "application/x-www-form-urlencoded;charset=UTF-8",
        ))
        .and(body_string("grant_type=client_credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_string(TOKEN))
        .expect(1)
        .mount(server)
        .await;
}

async fn connect(server: &MockServer) -> anyhow::Result<TwitterClient> {
    TwitterClient::connect(credentials(), api(server), 5, FAST, CancellationToken::new()).await
}

#[tokio::test]
async fn github_search_encodes_the_term() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/repositories"))
        .and(query_param("q", "async runtime"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ONE_REPOSITORY))
        .expect(1)
        .mount(&server)
        .await;

    let github = GithubClient::new(api(&server), FAST, CancellationToken::new()).unwrap();
    let body = github.search("async runtime").await.unwrap();
    assert_eq!(body, ONE_REPOSITORY);
}

#[tokio::test]
async fn github_validation_failure_is_a_client_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/repositories"))
        .respond_with(ResponseTemplate::new(422))
        .expect(1)
        .mount(&server)
        .await;

    let github = GithubClient::new(api(&server), FAST, CancellationToken::new()).unwrap();
    let err = github.search("x").await.unwrap_err();
    assert!(matches!(err, ApiError::ClientError { status: 422, .. }));
}

#[tokio::test]
async fn github_recovers_from_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/repositories"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search/repositories"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ONE_REPOSITORY))
        .mount(&server)
        .await;

    let github = GithubClient::new(api(&server), FAST, CancellationToken::new()).unwrap();
    assert_eq!(github.search("tokio").await.unwrap(), ONE_REPOSITORY);
}

#[tokio::test]
async fn twitter_authenticates_once_and_searches_with_bearer() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    Mock::given(method("GET"))
        .and(path("/1.1/search/tweets.json"))
        .and(query_param("result_type", "recent"))
        .and(query_param("count", "5"))
        .and(query_param("q", "tokio"))
        .and(header(
            "authorization",
            format!("Bearer {}", ACCESS_TOKEN).as_str(),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_string(ONE_TWEET))
        .expect(2)
        .mount(&server)
        .await;

    let twitter = connect(&server).await.unwrap();
    assert_eq!(twitter.token().access_token, ACCESS_TOKEN);
    assert_eq!(twitter.search_posts("tokio").await.unwrap(), ONE_TWEET);
    assert_eq!(twitter.search_posts("tokio").await.unwrap(), ONE_TWEET);
}

#[tokio::test]
async fn rejected_credentials_fail_construction() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    let err = connect(&server).await.err().unwrap();
    let api_error = err.downcast_ref::<ApiError>().unwrap();
    assert!(matches!(api_error, ApiError::ClientError { status: 403, .. }));
}

#[tokio::test]
async fn malformed_token_leaves_searches_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/1.1/search/tweets.json"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let twitter = connect(&server).await.unwrap();
    assert!(twitter.token().is_empty());
    let err = twitter.search_posts("tokio").await.unwrap_err();
    assert!(matches!(err, ApiError::ClientError { status: 401, .. }));
}

#[tokio::test]
async fn summary_against_both_apis() {
    let github_server = MockServer::start().await;
    let twitter_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/repositories"))
        .and(query_param("q", "runtime"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ONE_REPOSITORY))
        .mount(&github_server)
        .await;
    mount_token(&twitter_server).await;
    Mock::given(method("GET"))
        .and(path("/1.1/search/tweets.json"))
        .and(query_param("q", "tokio"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ONE_TWEET))
        .expect(1)
        .mount(&twitter_server)
        .await;

    let cancel = CancellationToken::new();
    let github = GithubClient::new(api(&github_server), FAST, cancel.clone()).unwrap();
    let twitter = TwitterClient::connect(credentials(), api(&twitter_server), 5, FAST, cancel)
        .await
        .unwrap();
    let mashup = Mashup::new(Box::new(github), Box::new(twitter), 10, 5);

    let summary: Value = serde_json::from_str(&mashup.summary("runtime").await.unwrap()).unwrap();
    let items = summary["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["full_name"], "tokio-rs/tokio");
    assert_eq!(items[0]["owner"]["type"], "Organization");
    assert_eq!(items[0]["tweets"].as_array().unwrap().len(), 1);
}
