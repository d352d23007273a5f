use serde_json::json;
use vizier_core::{
    CLIENT_VERSION, VizierClient,
    config::ClientConfig,
    endpoints::{DeleteInputs, GetModel, ListInputs, Predict, SearchInputs},
    status::{Outcome, codes},
    types::{Concept, ImageRef, Input, SearchBy},
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, header, method, path, query_param},
};

const API_KEY: &str = "test-key";

async fn setup() -> (MockServer, VizierClient) {
    let server = MockServer::start().await;
    let client = VizierClient::http(&server.uri(), API_KEY).expect("mock server URI is valid");
    (server, client)
}

#[tokio::test]
async fn test_add_concepts_keeps_order() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/v2/concepts/"))
        .and(header("authorization", "Key test-key"))
        .and(header("x-clarifai-client", CLIENT_VERSION))
        .and(body_json(json!({ "concepts": [{ "id": "foo" }, { "id": "bar" }] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": { "code": 10000, "description": "Ok" },
            "concepts": [
                { "id": "foo", "name": "foo", "app_id": "app", "created_at": "2017-01-17T22:21:15.155948Z" },
                { "id": "bar", "name": "bar", "app_id": "app", "created_at": "2017-01-17T22:21:15.155948Z" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = client
        .add_concepts([Concept::new("foo"), Concept::new("bar")])
        .await
        .unwrap();

    assert_eq!(response.outcome(), Outcome::Successful);
    assert_eq!(response.http_code(), Some(200));
    let ids: Vec<_> = response.get().iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, ["foo", "bar"]);
}

#[tokio::test]
async fn test_batch_predict_with_mixed_status() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/v2/models/general/outputs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": { "code": 10010, "description": "Mixed Success" },
            "outputs": [
                {
                    "id": "o1",
                    "status": { "code": 30002, "description": "Download failed" },
                    "input": { "id": "in-1", "data": { "image": { "url": "https://broken.example.com/x.jpg" } } },
                    "data": {}
                },
                {
                    "id": "o2",
                    "status": { "code": 10000, "description": "Ok" },
                    "input": { "id": "in-2", "data": { "image": { "url": "https://samples.example.com/metro-north.jpg" } } },
                    "data": { "concepts": [{ "id": "ai_HLmqFqBf", "name": "train", "value": 0.99 }] }
                }
            ]
        })))
        .mount(&server)
        .await;

    let response = client
        .predict(
            "general",
            [
                Input::image_url("https://broken.example.com/x.jpg"),
                Input::image_url("https://samples.example.com/metro-north.jpg"),
            ],
        )
        .await
        .unwrap();

    assert_eq!(response.outcome(), Outcome::MixedSuccess);
    assert!(response.outcome().is_ok());

    let outputs = response.get();
    assert_eq!(outputs.len(), 2);
    assert_eq!(outputs[0].status.code, codes::INPUT_DOWNLOAD_FAILED);
    assert!(outputs[0].predictions.is_empty());
    assert_eq!(outputs[1].status.code, codes::SUCCESS);
    assert_eq!(outputs[1].concepts().next().unwrap().name.as_deref(), Some("train"));
}

#[tokio::test]
async fn test_predict_sends_output_config() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/v2/models/general/outputs"))
        .and(body_json(json!({
            "inputs": [{ "data": { "image": { "url": "https://samples.example.com/dog.jpg" } } }],
            "model": { "output_info": { "output_config": { "min_value": 0.5, "max_concepts": 2 } } }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": { "code": 10000 },
            "outputs": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = client
        .execute(
            &Predict::new("general")
                .input(Input::image_url("https://samples.example.com/dog.jpg"))
                .min_value(0.5)
                .max_concepts(2),
        )
        .await
        .unwrap();

    assert!(response.is_successful());
    assert!(response.get().is_empty());
}

#[tokio::test]
async fn test_not_found_is_a_failure() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v2/models/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "status": { "code": 21200, "description": "Model does not exist", "details": "Model 'missing' not found" }
        })))
        .mount(&server)
        .await;

    let response = client.execute(&GetModel::new("missing")).await.unwrap();

    assert_eq!(response.outcome(), Outcome::Failure);
    assert_eq!(response.http_code(), Some(404));
    let status = response.status().unwrap();
    assert_eq!(status.code, 21200);
    assert_eq!(status.details.as_deref(), Some("Model 'missing' not found"));
    assert_eq!(response.get().id, "");
}

#[tokio::test]
async fn test_unparseable_success_is_a_network_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v2/inputs/status"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let response = client.input_count().await.unwrap();

    assert_eq!(response.outcome(), Outcome::NetworkError);
    assert_eq!(response.http_code(), Some(200));
    assert_eq!(response.raw_body(), "<html>gateway</html>");
    assert!(response.failure_reason().is_some());
}

#[tokio::test]
async fn test_html_gateway_error_is_a_network_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v2/inputs/status"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;

    let response = client.input_count().await.unwrap();

    assert_eq!(response.outcome(), Outcome::NetworkError);
    assert_eq!(response.http_code(), Some(502));
    assert!(response.status().is_none());
    assert_eq!(response.raw_body(), "<html>Bad Gateway</html>");
}

#[tokio::test]
async fn test_array_body_is_a_network_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/v2/models/general/outputs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([1, 2, 3])))
        .mount(&server)
        .await;

    let predict = Predict::new("general").input(Input::image_url("https://samples.example.com/dog.jpg"));
    let response = client.execute(&predict).await.unwrap();

    assert_eq!(response.outcome(), Outcome::NetworkError);
    assert_eq!(response.http_code(), Some(200));
    assert!(response.get().is_empty());
}

#[tokio::test]
async fn test_connection_refused_is_a_network_error() {
    let client = VizierClient::http("http://127.0.0.1:1", API_KEY).unwrap();

    let response = client.get_concept("dog").await.unwrap();

    assert!(response.is_network_error());
    assert_eq!(response.http_code(), None);
    assert_eq!(response.raw_body(), "");
}

#[tokio::test]
async fn test_list_inputs_pagination_in_query() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v2/inputs"))
        .and(query_param("page", "2"))
        .and(query_param("per_page", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": { "code": 10000 },
            "inputs": [{
                "id": "in-1",
                "data": { "image": { "url": "https://samples.example.com/dog.jpg" }, "metadata": { "owner": "kim" } },
                "status": { "code": 30000, "description": "Download complete" }
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = client.execute(&ListInputs::page(2, 10)).await.unwrap();

    assert!(response.is_successful());
    let input = &response.get()[0];
    assert_eq!(input.id.as_deref(), Some("in-1"));
    assert_eq!(input.metadata.as_ref().unwrap()["owner"], "kim");
    assert_eq!(input.status.as_ref().unwrap().code, codes::INPUT_DOWNLOAD_SUCCESS);
}

#[tokio::test]
async fn test_delete_inputs_sends_a_body() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/v2/inputs"))
        .and(body_json(json!({ "ids": ["a", "b"] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": { "code": 10000, "description": "Ok" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = client
        .delete_inputs(DeleteInputs::Ids(vec!["a".into(), "b".into()]))
        .await
        .unwrap();

    assert!(response.is_successful());
}

#[tokio::test]
async fn test_search_paginates_in_the_body() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/v2/searches"))
        .and(body_json(json!({
            "query": { "ands": [
                { "output": { "input": { "data": { "image": { "url": "https://samples.example.com/car.jpg" } } } } },
                { "input": { "data": { "concepts": [{ "name": "red", "value": 0.0 }] } } }
            ] },
            "pagination": { "page": 1, "per_page": 5 }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": { "code": 10000 },
            "id": "search-id",
            "hits": [
                { "score": 0.75, "input": { "id": "car-1" } },
                { "score": 0.5, "input": { "id": "car-2" } }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let search = SearchInputs::new([
        SearchBy::visually_similar(ImageRef::Url("https://samples.example.com/car.jpg".into()), None)
            .unwrap(),
        SearchBy::tagged_concept_name("red").negated(),
    ])
    .pagination(vizier_core::request::Pagination::new(1, 5));

    let response = client.execute(&search).await.unwrap();

    let ids: Vec<_> = response
        .get()
        .iter()
        .map(|hit| hit.input.id.clone().unwrap_or_default())
        .collect();
    assert_eq!(ids, ["car-1", "car-2"]);
}

#[tokio::test]
async fn test_connect_from_config() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/concepts/dog"))
        .and(header("authorization", "Key config-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": { "code": 10000 },
            "concept": { "id": "dog", "name": "dog" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = ClientConfig::new("config-key").with_base_url(server.uri());
    let client = VizierClient::connect(&config).await.unwrap();

    let response = client.get_concept("dog").await.unwrap();
    assert_eq!(response.get().id, "dog");
}
