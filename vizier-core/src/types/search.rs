use super::{Concept, Crop, GeoPoint, Input, input::WireMedia};
use crate::request::RequestError;
use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// The image a visual search compares against.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageRef {
    Url(String),
    Bytes(Vec<u8>),
    /// An input already stored in the application.
    InputId(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceUnit {
    Miles,
    Kilometers,
    Radians,
    Degrees,
}

impl DistanceUnit {
    fn limit_type(self) -> &'static str {
        match self {
            DistanceUnit::Miles => "withinMiles",
            DistanceUnit::Kilometers => "withinKilometers",
            DistanceUnit::Radians => "withinRadians",
            DistanceUnit::Degrees => "withinDegrees",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Clause {
    TaggedConcept(Concept),
    PredictedConcept(Concept),
    ImageUrl(String),
    Visual(ImageRef, Option<Crop>),
    Metadata(Map<String, Value>),
    GeoRadius(GeoPoint, DistanceUnit, f32),
    GeoBox(GeoPoint, GeoPoint),
}

/// One criterion of an input search. Several clauses are combined with AND.
///
/// Concept clauses match either annotations the user tagged (`tagged_*`) or concepts the
/// application's model predicted (`predicted_*`). A negated concept clause matches inputs
/// *not* associated with the concept.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchBy(Clause);

impl SearchBy {
    pub fn tagged_concept_id(id: impl Into<String>) -> Self {
        Self(Clause::TaggedConcept(Concept::new(id).present()))
    }

    pub fn tagged_concept_name(name: impl Into<String>) -> Self {
        Self(Clause::TaggedConcept(
            Concept::new("").with_name(name).present(),
        ))
    }

    pub fn predicted_concept_id(id: impl Into<String>) -> Self {
        Self(Clause::PredictedConcept(Concept::new(id).present()))
    }

    pub fn predicted_concept_name(name: impl Into<String>) -> Self {
        Self(Clause::PredictedConcept(
            Concept::new("").with_name(name).present(),
        ))
    }

    /// Inputs whose image was added from exactly this URL.
    pub fn image_url(url: impl Into<String>) -> Self {
        Self(Clause::ImageUrl(url.into()))
    }

    /// Inputs visually similar to an image, optionally restricted to a region of it.
    ///
    /// A crop cannot be applied to an already stored input, so `ImageRef::InputId` with a crop
    /// is rejected.
    pub fn visually_similar(image: ImageRef, crop: Option<Crop>) -> Result<Self, RequestError> {
        if let (ImageRef::InputId(id), Some(_)) = (&image, crop) {
            return Err(RequestError::InvalidSearch(format!(
                "cannot crop stored input '{id}' in a visual search"
            )));
        }
        Ok(Self(Clause::Visual(image, crop)))
    }

    pub fn metadata(metadata: Map<String, Value>) -> Self {
        Self(Clause::Metadata(metadata))
    }

    pub fn within(center: GeoPoint, unit: DistanceUnit, distance: f32) -> Self {
        Self(Clause::GeoRadius(center, unit, distance))
    }

    /// Inputs located in the rectangle spanned by two opposite corners.
    pub fn in_box(corner: GeoPoint, opposite: GeoPoint) -> Self {
        Self(Clause::GeoBox(corner, opposite))
    }

    /// Turns a concept clause into its negation. Other clauses are returned unchanged.
    pub fn negated(self) -> Self {
        match self.0 {
            Clause::TaggedConcept(c) => Self(Clause::TaggedConcept(c.absent())),
            Clause::PredictedConcept(c) => Self(Clause::PredictedConcept(c.absent())),
            other => Self(other),
        }
    }

    /// The `And` object this clause contributes to `query.ands`.
    pub fn to_json(&self) -> Value {
        match &self.0 {
            Clause::TaggedConcept(c) => json!({ "input": { "data": { "concepts": [concept(c)] } } }),
            Clause::PredictedConcept(c) => {
                json!({ "output": { "data": { "concepts": [concept(c)] } } })
            }
            Clause::ImageUrl(url) => json!({ "input": { "data": { "image": { "url": url } } } }),
            Clause::Visual(ImageRef::InputId(id), _) => json!({ "output": { "input": { "id": id } } }),
            Clause::Visual(image, crop) => {
                let mut wire = match image {
                    ImageRef::Url(url) => WireMedia {
                        url: Some(url.clone()),
                        ..Default::default()
                    },
                    ImageRef::Bytes(bytes) => WireMedia {
                        base64: Some(STANDARD.encode(bytes)),
                        ..Default::default()
                    },
                    ImageRef::InputId(_) => WireMedia::default(),
                };
                wire.crop = crop.map(Crop::to_array);
                json!({ "output": { "input": { "data": { "image": wire } } } })
            }
            Clause::Metadata(metadata) => json!({ "input": { "data": { "metadata": metadata } } }),
            Clause::GeoRadius(center, unit, distance) => json!({
                "input": { "data": { "geo": {
                    "geo_point": center,
                    "geo_limit": { "type": unit.limit_type(), "value": distance }
                } } }
            }),
            Clause::GeoBox(corner, opposite) => json!({
                "input": { "data": { "geo": {
                    "geo_box": [{ "geo_point": corner }, { "geo_point": opposite }]
                } } }
            }),
        }
    }
}

// Name-only clauses carry an empty id, which must not reach the wire.
fn concept(concept: &Concept) -> Value {
    let mut value = json!(concept);
    if concept.id.is_empty()
        && let Some(object) = value.as_object_mut()
    {
        object.remove("id");
    }
    value
}

/// An input matched by a search, with its similarity score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchHit {
    pub score: f32,
    pub input: Input,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concept_clauses_target_tags_or_predictions() {
        assert_eq!(
            SearchBy::tagged_concept_id("dog").to_json(),
            json!({ "input": { "data": { "concepts": [{ "id": "dog", "value": 1.0 }] } } })
        );
        assert_eq!(
            SearchBy::predicted_concept_name("cat").negated().to_json(),
            json!({ "output": { "data": { "concepts": [{ "name": "cat", "value": 0.0 }] } } })
        );
    }

    #[test]
    fn visual_search_by_url_with_crop() {
        let clause = SearchBy::visually_similar(
            ImageRef::Url("https://samples.example.com/car.jpg".to_string()),
            Some(Crop::new(0.25, 0.25, 0.75, 0.75)),
        )
        .unwrap();

        assert_eq!(
            clause.to_json(),
            json!({ "output": { "input": { "data": { "image": {
                "url": "https://samples.example.com/car.jpg",
                "crop": [0.25, 0.25, 0.75, 0.75]
            } } } } })
        );
    }

    #[test]
    fn visual_search_by_input_id() {
        let clause = SearchBy::visually_similar(ImageRef::InputId("abc".into()), None).unwrap();
        assert_eq!(clause.to_json(), json!({ "output": { "input": { "id": "abc" } } }));
    }

    #[test]
    fn cropping_a_stored_input_is_rejected() {
        let result = SearchBy::visually_similar(
            ImageRef::InputId("abc".into()),
            Some(Crop::new(0.0, 0.0, 0.5, 0.5)),
        );
        assert!(matches!(result, Err(RequestError::InvalidSearch(_))));
    }

    #[test]
    fn geo_clauses() {
        let center = GeoPoint::new(59.0, 29.75);
        assert_eq!(
            SearchBy::within(center, DistanceUnit::Kilometers, 500.0).to_json(),
            json!({ "input": { "data": { "geo": {
                "geo_point": { "longitude": 59.0, "latitude": 29.75 },
                "geo_limit": { "type": "withinKilometers", "value": 500.0 }
            } } } })
        );

        let json = SearchBy::in_box(GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 1.0)).to_json();
        assert_eq!(json["input"]["data"]["geo"]["geo_box"].as_array().unwrap().len(), 2);
    }
}
