//! # API Entities
//!
//! Plain data types mirroring the API's JSON schema. They are built from a response payload
//! (or by the caller, for requests) and carry no connection to the client.
//!
//! Every type serializes to the exact wire shape: optional fields are omitted rather than
//! written as `null`, and keys use the API's snake_case names.
mod concept;
mod feedback;
mod input;
mod model;
mod prediction;
mod search;
mod workflow;

pub use concept::Concept;
pub use feedback::{FeedbackEvent, FeedbackInfo, RegionFeedback, RegionFeedbackKind};
pub use input::{Crop, GeoPoint, Input, InputCount, Media, MediaFile, MediaSource};
pub use model::{
    EvaluationStatus, Model, ModelType, ModelVersion, OutputConfig, OutputInfo, TrainingStatus,
};
pub use prediction::{
    Color, Demographics, Detection, Embedding, FaceDetection, FaceEmbedding, Focus, Frame, Logo,
    ModelOutput, Prediction, W3cColor,
};
pub use search::{DistanceUnit, ImageRef, SearchBy, SearchHit};
pub use workflow::{Workflow, WorkflowPredictResult, WorkflowResult};

pub(crate) use prediction::decode_outputs;
