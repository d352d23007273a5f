//! # Endpoints
//!
//! One type per API call. An endpoint knows how to describe itself as an [`ApiRequest`] and
//! how to read its payload out of a successful answer; everything in between (transport,
//! status classification) is shared and lives in [`crate::client`].
//!
//! ```no_run
//! # use vizier_core::{VizierClient, endpoints::Predict, types::Input};
//! # async fn run(client: VizierClient) -> Result<(), vizier_core::request::RequestError> {
//! let response = client
//!     .execute(&Predict::new("general").input(Input::image_url("https://samples.example.com/metro-north.jpg")))
//!     .await?;
//!
//! for output in response.get() {
//!     for concept in output.concepts() {
//!         println!("{:?} {:?}", concept.name, concept.value);
//!     }
//! }
//! # Ok(())
//! # }
//! ```
mod concepts;
mod feedback;
mod inputs;
mod models;
mod predict;
mod search;
mod workflows;

pub use concepts::{AddConcepts, GetConcept, ListConcepts, ModifyConcepts, SearchConcepts};
pub use feedback::ModelFeedback;
pub use inputs::{
    AddInputs, DeleteInput, DeleteInputs, GetInput, GetInputCount, ListInputs, PatchInputs,
};
pub use models::{GetModel, GetModelOutputInfo, ListModels, TrainModel};
pub use predict::{Predict, PredictOptions};
pub use search::SearchInputs;
pub use workflows::WorkflowPredict;

use crate::request::{ApiRequest, RequestError};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

/// A single API call and the shape of its answer.
pub trait Endpoint {
    /// The payload extracted from the answer. `Default` is used whenever no payload can be read.
    type Output: Default;

    fn request(&self) -> Result<ApiRequest, RequestError>;

    /// Reads the payload from the parsed answer body.
    fn decode(&self, body: &Value) -> Result<Self::Output, serde_json::Error>;
}

/// How a PATCH combines the sent values with the stored ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchAction {
    #[default]
    Merge,
    Remove,
    Overwrite,
}

/// Reads `key` from an answer body. A missing or `null` key yields the default value.
fn field<T: DeserializeOwned + Default>(body: &Value, key: &str) -> Result<T, serde_json::Error> {
    match body.get(key) {
        None | Some(Value::Null) => Ok(T::default()),
        Some(value) => <T as Deserialize>::deserialize(value),
    }
}
