use super::{Endpoint, PatchAction, field};
use crate::{
    request::{ApiRequest, Pagination, RequestError},
    types::Concept,
};
use http::Method;
use serde_json::{Value, json};

#[derive(Debug, Clone)]
pub struct GetConcept {
    pub concept_id: String,
}

impl GetConcept {
    pub fn new(concept_id: impl Into<String>) -> Self {
        Self {
            concept_id: concept_id.into(),
        }
    }
}

impl Endpoint for GetConcept {
    type Output = Concept;

    fn request(&self) -> Result<ApiRequest, RequestError> {
        Ok(
            ApiRequest::new(Method::GET, "/v2/concepts/{concept_id}", "GetConcept")
                .path_param("concept_id", &self.concept_id),
        )
    }

    fn decode(&self, body: &Value) -> Result<Concept, serde_json::Error> {
        field(body, "concept")
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListConcepts {
    pub pagination: Option<Pagination>,
}

impl ListConcepts {
    pub fn page(page: u32, per_page: u32) -> Self {
        Self {
            pagination: Some(Pagination::new(page, per_page)),
        }
    }
}

impl Endpoint for ListConcepts {
    type Output = Vec<Concept>;

    fn request(&self) -> Result<ApiRequest, RequestError> {
        Ok(ApiRequest::new(Method::GET, "/v2/concepts", "ListConcepts").pagination(self.pagination))
    }

    fn decode(&self, body: &Value) -> Result<Vec<Concept>, serde_json::Error> {
        field(body, "concepts")
    }
}

/// Creates concepts in the application. The answer lists them in the order they were sent.
#[derive(Debug, Clone, Default)]
pub struct AddConcepts {
    pub concepts: Vec<Concept>,
}

impl AddConcepts {
    pub fn new(concepts: impl IntoIterator<Item = Concept>) -> Self {
        Self {
            concepts: concepts.into_iter().collect(),
        }
    }
}

impl Endpoint for AddConcepts {
    type Output = Vec<Concept>;

    fn request(&self) -> Result<ApiRequest, RequestError> {
        Ok(ApiRequest::new(Method::POST, "/v2/concepts/", "PostConcepts")
            .body(json!({ "concepts": self.concepts })))
    }

    fn decode(&self, body: &Value) -> Result<Vec<Concept>, serde_json::Error> {
        field(body, "concepts")
    }
}

/// Renames concepts (or changes other attributes) of existing concepts.
#[derive(Debug, Clone, Default)]
pub struct ModifyConcepts {
    pub action: PatchAction,
    pub concepts: Vec<Concept>,
}

impl ModifyConcepts {
    pub fn overwrite(concepts: impl IntoIterator<Item = Concept>) -> Self {
        Self {
            action: PatchAction::Overwrite,
            concepts: concepts.into_iter().collect(),
        }
    }
}

impl Endpoint for ModifyConcepts {
    type Output = Vec<Concept>;

    fn request(&self) -> Result<ApiRequest, RequestError> {
        Ok(ApiRequest::new(Method::PATCH, "/v2/concepts", "PatchConcepts")
            .body(json!({ "action": self.action, "concepts": self.concepts })))
    }

    fn decode(&self, body: &Value) -> Result<Vec<Concept>, serde_json::Error> {
        field(body, "concepts")
    }
}

/// Finds concepts by name. `*` works as a wildcard.
#[derive(Debug, Clone, Default)]
pub struct SearchConcepts {
    pub name: String,
    pub language: Option<String>,
    pub pagination: Option<Pagination>,
}

impl SearchConcepts {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }
}

impl Endpoint for SearchConcepts {
    type Output = Vec<Concept>;

    fn request(&self) -> Result<ApiRequest, RequestError> {
        let mut query = json!({ "name": self.name });
        if let Some(language) = &self.language {
            query["language"] = json!(language);
        }

        let mut body = json!({ "concept_query": query });
        if let Some(pagination) = self.pagination {
            body["pagination"] = json!(pagination);
        }

        Ok(ApiRequest::new(Method::POST, "/v2/concepts/searches", "PostConceptsSearches").body(body))
    }

    fn decode(&self, body: &Value) -> Result<Vec<Concept>, serde_json::Error> {
        field(body, "concepts")
    }
}
