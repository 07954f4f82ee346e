//! HTTP-level tests for `HttpWorkflowClient` against a mock backend.

use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use greenlight_client::{
    ClientError, FilterExpression, HttpWorkflowClient, ListQuery, WorkflowStore,
};
use greenlight_model::{
    build_template, ApprovalStep, AssociationPayload, WorkflowOperation, WorkflowPayload,
    WORKFLOW_ENGINE,
};

fn sample_payload(name: &str) -> WorkflowPayload {
    WorkflowPayload {
        name: name.to_string(),
        description: String::new(),
        engine: WORKFLOW_ENGINE.to_string(),
        template: build_template(&[ApprovalStep {
            roles: vec!["role-1".to_string()],
            users: vec![],
        }]),
    }
}

fn workflow_body(id: &str, name: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "description": "",
        "engine": WORKFLOW_ENGINE,
        "template": {
            "name": "MultiStepApprovalTemplate",
            "steps": [
                { "step": 1, "options": [ { "entity": "roles", "values": ["role-1"] } ] }
            ]
        }
    })
}

#[tokio::test]
async fn list_workflows_sends_paging_and_filter() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/workflows"))
        .and(query_param("limit", "10"))
        .and(query_param("offset", "20"))
        .and(query_param("filter", "name co \"approval\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "totalResults": 1,
            "count": 1,
            "workflows": [
                { "id": "wf-1", "name": "Manager Approval", "engine": WORKFLOW_ENGINE }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpWorkflowClient::new(server.uri());
    let query = ListQuery::page(10, 20)
        .with_filter(FilterExpression::contains("name", "approval"));

    let listing = client.list_workflows(&query).await.unwrap();
    assert_eq!(listing.total_results, 1);
    assert_eq!(listing.workflows[0].name, "Manager Approval");
}

#[tokio::test]
async fn add_workflow_posts_payload_and_parses_details() {
    let server = MockServer::start().await;
    let payload = sample_payload("Manager Approval");

    Mock::given(method("POST"))
        .and(path("/workflows"))
        .and(body_json(&payload))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(workflow_body("wf-1", "Manager Approval")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpWorkflowClient::new(server.uri());
    let created = client.add_workflow(&payload).await.unwrap();

    assert_eq!(created.id, "wf-1");
    assert_eq!(created.template.steps.len(), 1);
}

#[tokio::test]
async fn get_workflow_maps_404_to_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/workflows/wf-missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = HttpWorkflowClient::new(server.uri());
    let err = client.get_workflow("wf-missing").await.unwrap_err();

    assert!(err.is_not_found(), "expected NotFound, got {:?}", err);
}

#[tokio::test]
async fn update_workflow_treats_non_200_as_error() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/workflows/wf-1"))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({})))
        .mount(&server)
        .await;

    let client = HttpWorkflowClient::new(server.uri());
    let err = client
        .update_workflow("wf-1", &sample_payload("Manager Approval"))
        .await
        .unwrap_err();

    match err {
        ClientError::Api { status, .. } => assert_eq!(status, 202),
        other => panic!("expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn api_errors_surface_structured_description() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/workflows"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "description": "A workflow with this name already exists.",
            "message": "Bad Request"
        })))
        .mount(&server)
        .await;

    let client = HttpWorkflowClient::new(server.uri());
    let err = client
        .add_workflow(&sample_payload("Duplicate"))
        .await
        .unwrap_err();

    match err {
        ClientError::Api { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "A workflow with this name already exists.");
        }
        other => panic!("expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn api_errors_without_body_use_generic_fallback() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/workflows/wf-1"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = HttpWorkflowClient::new(server.uri());
    let err = client.delete_workflow("wf-1").await.unwrap_err();

    match err {
        ClientError::Api { status, message } => {
            assert_eq!(status, 500);
            assert!(!message.is_empty());
        }
        other => panic!("expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn association_round_trip() {
    let server = MockServer::start().await;
    let payload = AssociationPayload::for_operation("wf-1", WorkflowOperation::AddUser);

    Mock::given(method("POST"))
        .and(path("/workflow-associations"))
        .and(body_json(&payload))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "assoc-1",
            "associationName": "Association for ADD_USER",
            "operation": "ADD_USER",
            "workflowId": "wf-1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/workflow-associations/assoc-1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpWorkflowClient::new(server.uri());

    let created = client.add_association(&payload).await.unwrap();
    assert_eq!(created.id, "assoc-1");
    assert_eq!(created.known_operation(), Some(WorkflowOperation::AddUser));

    client.delete_association("assoc-1").await.unwrap();
}

#[tokio::test]
async fn list_associations_filters_by_workflow_id() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/workflow-associations"))
        .and(query_param("filter", "workflowId eq wf-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "totalResults": 2,
            "count": 2,
            "workflowAssociations": [
                {
                    "id": "assoc-1",
                    "associationName": "Association for ADD_USER",
                    "operation": "ADD_USER",
                    "workflowId": "wf-1"
                },
                {
                    "id": "assoc-2",
                    "associationName": "Association for ADD_ROLE",
                    "operation": "ADD_ROLE",
                    "workflowId": "wf-1"
                }
            ]
        })))
        .mount(&server)
        .await;

    let client = HttpWorkflowClient::new(server.uri());
    let query = ListQuery::filtered(FilterExpression::eq("workflowId", "wf-1"));

    let listing = client.list_associations(&query).await.unwrap();
    assert_eq!(listing.workflow_associations.len(), 2);
    assert_eq!(listing.workflow_associations[1].operation, "ADD_ROLE");
}
