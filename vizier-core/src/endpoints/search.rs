use super::{Endpoint, field};
use crate::{
    request::{ApiRequest, Pagination, RequestError},
    types::{SearchBy, SearchHit},
};
use http::Method;
use serde_json::{Value, json};

/// Searches the application's inputs. All clauses must match.
#[derive(Debug, Clone, Default)]
pub struct SearchInputs {
    pub clauses: Vec<SearchBy>,
    pub language: Option<String>,
    pub pagination: Option<Pagination>,
}

impl SearchInputs {
    pub fn new(clauses: impl IntoIterator<Item = SearchBy>) -> Self {
        Self {
            clauses: clauses.into_iter().collect(),
            ..Default::default()
        }
    }

    pub fn and(mut self, clause: SearchBy) -> Self {
        self.clauses.push(clause);
        self
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

impl Endpoint for SearchInputs {
    type Output = Vec<SearchHit>;

    fn request(&self) -> Result<ApiRequest, RequestError> {
        let ands: Vec<Value> = self.clauses.iter().map(SearchBy::to_json).collect();

        let mut query = json!({ "ands": ands });
        if let Some(language) = &self.language {
            query["language"] = json!(language);
        }

        // Searches are paginated in the body, not in the query string.
        let mut body = json!({ "query": query });
        if let Some(pagination) = self.pagination {
            body["pagination"] = json!(pagination);
        }

        Ok(ApiRequest::new(Method::POST, "/v2/searches", "PostSearches").body(body))
    }

    fn decode(&self, body: &Value) -> Result<Vec<SearchHit>, serde_json::Error> {
        field(body, "hits")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ImageRef, Media, MediaSource};

    #[test]
    fn clauses_are_combined_in_ands() {
        let request = SearchInputs::new([SearchBy::tagged_concept_id("dog")])
            .and(SearchBy::image_url("https://samples.example.com/dog.jpg"))
            .pagination(Pagination::new(1, 10))
            .request()
            .unwrap();

        assert!(request.pagination.is_none());
        assert_eq!(
            request.body,
            Some(json!({
                "query": { "ands": [
                    { "input": { "data": { "concepts": [{ "id": "dog", "value": 1.0 }] } } },
                    { "input": { "data": { "image": { "url": "https://samples.example.com/dog.jpg" } } } }
                ] },
                "pagination": { "page": 1, "per_page": 10 }
            }))
        );
    }

    #[test]
    fn reads_hits() {
        let search = SearchInputs::new([
            SearchBy::visually_similar(ImageRef::InputId("abc".into()), None).unwrap(),
        ]);
        let hits = search
            .decode(&json!({
                "status": { "code": 10000 },
                "id": "search-1",
                "hits": [{
                    "score": 0.75,
                    "input": { "id": "in-9", "data": { "image": { "url": "https://samples.example.com/cat.jpg" } } }
                }]
            }))
            .unwrap();

        assert_eq!(hits[0].score, 0.75);
        assert_eq!(hits[0].input.id.as_deref(), Some("in-9"));
        assert_eq!(
            hits[0].input.media,
            Some(Media::Image(crate::types::MediaFile {
                source: MediaSource::Url("https://samples.example.com/cat.jpg".into()),
                crop: None,
                allow_duplicate_url: false,
            }))
        );
    }
}
