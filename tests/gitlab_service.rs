//! GitLab service against a mocked REST API

use git_promote::error::{Error, ErrorKind};
use git_promote::platform::{GitLabService, PlatformService};
use git_promote::types::NewPullRequest;
use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;

fn service(server: &ServerGuard) -> GitLabService {
    GitLabService::with_api_base(
        "glpat-test".to_string(),
        "upstream".to_string(),
        "repo".to_string(),
        None,
        format!("{}/api/v4", server.url()),
    )
}

fn merge_request(iid: u64, author: &str) -> serde_json::Value {
    json!({
        "iid": iid,
        "web_url": format!("https://gitlab.com/upstream/repo/-/merge_requests/{iid}"),
        "source_branch": "develop",
        "target_branch": "develop",
        "title": format!("new pull request by {author}"),
        "author": { "username": author }
    })
}

fn new_request(head_owner: Option<&str>) -> NewPullRequest {
    NewPullRequest {
        head_owner: head_owner.map(ToString::to_string),
        head_branch: "develop".to_string(),
        base: "develop".to_string(),
        title: "new pull request by alice".to_string(),
        reviewers: vec!["bob".to_string()],
        labels: vec!["promotion".to_string(), "backend".to_string()],
    }
}

#[tokio::test]
async fn test_list_open_requests() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/v4/projects/upstream%2Frepo/merge_requests")
        .match_header("PRIVATE-TOKEN", "glpat-test")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("target_branch".into(), "develop".into()),
            Matcher::UrlEncoded("state".into(), "opened".into()),
        ]))
        .with_header("content-type", "application/json")
        .with_body(json!([merge_request(4, "alice"), merge_request(9, "carol")]).to_string())
        .create_async()
        .await;

    let open = service(&server).list_open_requests("develop").await.unwrap();

    mock.assert_async().await;
    assert_eq!(open.len(), 2);
    assert_eq!(open[0].number, 4);
    assert_eq!(open[0].author, "alice");
    assert_eq!(open[1].base_ref, "develop");
}

#[tokio::test]
async fn test_current_user() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/v4/user")
        .with_header("content-type", "application/json")
        .with_body(json!({"id": 1, "username": "alice"}).to_string())
        .create_async()
        .await;

    assert_eq!(service(&server).current_user().await.unwrap(), "alice");
}

#[tokio::test]
async fn test_rejected_token_is_an_auth_error() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/v4/user")
        .with_status(401)
        .create_async()
        .await;

    let err = service(&server).current_user().await.unwrap_err();
    assert!(matches!(err, Error::Auth(_)));
}

#[tokio::test]
async fn test_create_request_in_same_project() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/v4/users")
        .match_query(Matcher::UrlEncoded("username".into(), "bob".into()))
        .with_header("content-type", "application/json")
        .with_body(json!([{"id": 42, "username": "bob"}]).to_string())
        .create_async()
        .await;
    let create = server
        .mock("POST", "/api/v4/projects/upstream%2Frepo/merge_requests")
        .match_body(Matcher::PartialJson(json!({
            "source_branch": "develop",
            "target_branch": "develop",
            "title": "new pull request by alice",
            "reviewer_ids": [42],
            "labels": "promotion,backend"
        })))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(merge_request(12, "alice").to_string())
        .create_async()
        .await;

    let pr = service(&server)
        .create_request(&new_request(None))
        .await
        .unwrap();

    create.assert_async().await;
    assert_eq!(pr.number, 12);
    assert!(pr.html_url.ends_with("/merge_requests/12"));
}

#[tokio::test]
async fn test_create_request_from_fork_targets_upstream_project() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/v4/projects/upstream%2Frepo")
        .with_header("content-type", "application/json")
        .with_body(json!({"id": 77}).to_string())
        .create_async()
        .await;
    server
        .mock("GET", "/api/v4/users")
        .match_query(Matcher::Any)
        .with_header("content-type", "application/json")
        .with_body("[]")
        .create_async()
        .await;
    let create = server
        .mock("POST", "/api/v4/projects/alice%2Frepo/merge_requests")
        .match_body(Matcher::PartialJson(json!({"target_project_id": 77})))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(merge_request(5, "alice").to_string())
        .create_async()
        .await;

    let pr = service(&server)
        .create_request(&new_request(Some("alice")))
        .await
        .unwrap();

    create.assert_async().await;
    assert_eq!(pr.number, 5);
}

#[tokio::test]
async fn test_api_failure_is_a_platform_error() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/v4/projects/upstream%2Frepo/merge_requests/3")
        .with_status(500)
        .create_async()
        .await;

    let err = service(&server).get_request(3).await.unwrap_err();
    assert!(matches!(err, Error::GitLabApi(_)));
    assert_eq!(err.kind(), Some(ErrorKind::Platform));
}

#[tokio::test]
async fn test_list_open_requests_follows_every_page() {
    let mut server = Server::new_async().await;
    let path = "/api/v4/projects/upstream%2Frepo/merge_requests";
    let first = server
        .mock("GET", path)
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("target_branch".into(), "develop".into()),
            Matcher::UrlEncoded("page".into(), "1".into()),
        ]))
        .with_header("content-type", "application/json")
        .with_header("x-next-page", "2")
        .with_body(json!([merge_request(3, "carol")]).to_string())
        .create_async()
        .await;
    let second = server
        .mock("GET", path)
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("target_branch".into(), "develop".into()),
            Matcher::UrlEncoded("page".into(), "2".into()),
        ]))
        .with_header("content-type", "application/json")
        .with_header("x-next-page", "")
        .with_body(json!([merge_request(150, "alice")]).to_string())
        .create_async()
        .await;

    let open = service(&server).list_open_requests("develop").await.unwrap();

    first.assert_async().await;
    second.assert_async().await;
    assert_eq!(
        open.iter().map(|pr| pr.number).collect::<Vec<_>>(),
        vec![3, 150]
    );
}
