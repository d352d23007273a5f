//! # Built-in Protobuf Schema
//!
//! The gRPC transport needs descriptors to transcode JSON into Protobuf. This module builds a
//! `DescriptorPool` for the `clarifai.api.V2` service covering every RPC the crate calls, so no
//! `protoc` step or descriptor file is required.
//!
//! The messages mirror the JSON wire shape used by the HTTP API (proto field names equal the
//! snake_case JSON keys). A descriptor set compiled from the official proto files can be used
//! instead through [`crate::transport::GrpcTransport::with_file_descriptor`].
use prost_reflect::{DescriptorError, DescriptorPool};
use prost_types::{
    DescriptorProto, FieldDescriptorProto, FileDescriptorProto, MethodDescriptorProto,
    OneofDescriptorProto, ServiceDescriptorProto,
    field_descriptor_proto::{Label, Type},
};

pub const PACKAGE: &str = "clarifai.api";
pub const SERVICE: &str = "clarifai.api.V2";
const FILE_NAME: &str = "clarifai/api/service.proto";

/// Builds a descriptor pool containing the well-known types and the `clarifai.api` package.
pub fn descriptor_pool() -> Result<DescriptorPool, DescriptorError> {
    let mut pool = DescriptorPool::global();
    pool.add_file_descriptor_proto(file_descriptor())?;
    Ok(pool)
}

/// The `clarifai/api/service.proto` file descriptor.
pub fn file_descriptor() -> FileDescriptorProto {
    FileDescriptorProto {
        name: Some(FILE_NAME.to_string()),
        package: Some(PACKAGE.to_string()),
        dependency: vec![
            "google/protobuf/struct.proto".to_string(),
            "google/protobuf/timestamp.proto".to_string(),
        ],
        message_type: messages(),
        service: vec![service()],
        syntax: Some("proto3".to_string()),
        ..Default::default()
    }
}

#[derive(Clone, Copy)]
enum Kind {
    String,
    Bytes,
    Bool,
    Uint32,
    Float,
    Timestamp,
    Struct,
    Message(&'static str),
}

fn field(name: &str, number: i32, kind: Kind) -> FieldDescriptorProto {
    let (ty, type_name) = match kind {
        Kind::String => (Type::String, None),
        Kind::Bytes => (Type::Bytes, None),
        Kind::Bool => (Type::Bool, None),
        Kind::Uint32 => (Type::Uint32, None),
        Kind::Float => (Type::Float, None),
        Kind::Timestamp => (Type::Message, Some(".google.protobuf.Timestamp".to_string())),
        Kind::Struct => (Type::Message, Some(".google.protobuf.Struct".to_string())),
        Kind::Message(name) => (Type::Message, Some(format!(".{PACKAGE}.{name}"))),
    };

    FieldDescriptorProto {
        name: Some(name.to_string()),
        number: Some(number),
        label: Some(Label::Optional as i32),
        r#type: Some(ty as i32),
        type_name,
        ..Default::default()
    }
}

fn repeated(name: &str, number: i32, kind: Kind) -> FieldDescriptorProto {
    FieldDescriptorProto {
        label: Some(Label::Repeated as i32),
        ..field(name, number, kind)
    }
}

fn message(name: &str, field: Vec<FieldDescriptorProto>) -> DescriptorProto {
    DescriptorProto {
        name: Some(name.to_string()),
        field,
        ..Default::default()
    }
}

// Concept.value needs explicit presence: a value of 0 means "negative" and must not be
// dropped as a proto3 default.
fn concept() -> DescriptorProto {
    let value = FieldDescriptorProto {
        proto3_optional: Some(true),
        oneof_index: Some(0),
        ..field("value", 3, Kind::Float)
    };

    DescriptorProto {
        oneof_decl: vec![OneofDescriptorProto {
            name: Some("_value".to_string()),
            options: None,
        }],
        ..message(
            "Concept",
            vec![
                field("id", 1, Kind::String),
                field("name", 2, Kind::String),
                value,
                field("created_at", 4, Kind::Timestamp),
                field("language", 5, Kind::String),
                field("app_id", 6, Kind::String),
            ],
        )
    }
}

fn messages() -> Vec<DescriptorProto> {
    use Kind::*;

    let paged = |name: &str| {
        message(
            name,
            vec![field("page", 1, Uint32), field("per_page", 2, Uint32)],
        )
    };

    vec![
        message(
            "Status",
            vec![
                field("code", 1, Uint32),
                field("description", 2, String),
                field("details", 3, String),
            ],
        ),
        paged("Pagination"),
        concept(),
        message(
            "GeoPoint",
            vec![field("longitude", 1, Float), field("latitude", 2, Float)],
        ),
        message(
            "GeoLimit",
            vec![field("type", 1, String), field("value", 2, Float)],
        ),
        message(
            "GeoBoxedPoint",
            vec![field("geo_point", 1, Message("GeoPoint"))],
        ),
        message(
            "Geo",
            vec![
                field("geo_point", 1, Message("GeoPoint")),
                field("geo_limit", 2, Message("GeoLimit")),
                repeated("geo_box", 3, Message("GeoBoxedPoint")),
            ],
        ),
        message(
            "Image",
            vec![
                field("url", 1, String),
                field("base64", 2, Bytes),
                repeated("crop", 3, Float),
                field("allow_duplicate_url", 4, Bool),
            ],
        ),
        message(
            "Video",
            vec![
                field("url", 1, String),
                field("base64", 2, Bytes),
                field("allow_duplicate_url", 3, Bool),
            ],
        ),
        message("W3C", vec![field("hex", 1, String), field("name", 2, String)]),
        message(
            "Color",
            vec![
                field("raw_hex", 1, String),
                field("w3c", 2, Message("W3C")),
                field("value", 3, Float),
            ],
        ),
        message(
            "Embedding",
            vec![
                repeated("vector", 1, Float),
                field("num_dimensions", 2, Uint32),
            ],
        ),
        message(
            "BoundingBox",
            vec![
                field("top_row", 1, Float),
                field("left_col", 2, Float),
                field("bottom_row", 3, Float),
                field("right_col", 4, Float),
            ],
        ),
        message(
            "RegionInfo",
            vec![
                field("bounding_box", 1, Message("BoundingBox")),
                field("feedback", 2, String),
            ],
        ),
        message(
            "Focus",
            vec![field("density", 1, Float), field("value", 2, Float)],
        ),
        message(
            "FaceAppearance",
            vec![repeated("concepts", 1, Message("Concept"))],
        ),
        message(
            "Face",
            vec![
                field("age_appearance", 1, Message("FaceAppearance")),
                field("gender_appearance", 2, Message("FaceAppearance")),
                field("multicultural_appearance", 3, Message("FaceAppearance")),
            ],
        ),
        message(
            "Region",
            vec![
                field("id", 1, String),
                field("region_info", 2, Message("RegionInfo")),
                field("data", 3, Message("Data")),
                field("value", 4, Float),
            ],
        ),
        message(
            "FrameInfo",
            vec![field("index", 1, Uint32), field("time", 2, Uint32)],
        ),
        message(
            "Frame",
            vec![
                field("id", 1, String),
                field("frame_info", 2, Message("FrameInfo")),
                field("data", 3, Message("Data")),
            ],
        ),
        message(
            "Data",
            vec![
                field("image", 1, Message("Image")),
                field("video", 2, Message("Video")),
                repeated("concepts", 3, Message("Concept")),
                field("metadata", 4, Struct),
                field("geo", 5, Message("Geo")),
                repeated("colors", 6, Message("Color")),
                repeated("embeddings", 7, Message("Embedding")),
                repeated("regions", 8, Message("Region")),
                repeated("frames", 9, Message("Frame")),
                field("focus", 10, Message("Focus")),
                field("face", 11, Message("Face")),
            ],
        ),
        message(
            "Input",
            vec![
                field("id", 1, String),
                field("data", 2, Message("Data")),
                field("created_at", 3, Timestamp),
                field("modified_at", 4, Timestamp),
                field("status", 5, Message("Status")),
            ],
        ),
        message(
            "OutputConfig",
            vec![
                field("concepts_mutually_exclusive", 1, Bool),
                field("closed_environment", 2, Bool),
                field("min_value", 3, Float),
                field("max_concepts", 4, Uint32),
                repeated("select_concepts", 5, Message("Concept")),
                field("language", 6, String),
            ],
        ),
        message(
            "OutputInfo",
            vec![
                field("data", 1, Message("Data")),
                field("output_config", 2, Message("OutputConfig")),
                field("message", 3, String),
                field("type", 4, String),
                field("type_ext", 5, String),
            ],
        ),
        message("EvalMetrics", vec![field("status", 1, Message("Status"))]),
        message(
            "ModelVersion",
            vec![
                field("id", 1, String),
                field("created_at", 2, Timestamp),
                field("status", 3, Message("Status")),
                field("total_input_count", 4, Uint32),
                field("metrics", 5, Message("EvalMetrics")),
            ],
        ),
        message(
            "Model",
            vec![
                field("id", 1, String),
                field("name", 2, String),
                field("created_at", 3, Timestamp),
                field("app_id", 4, String),
                field("output_info", 5, Message("OutputInfo")),
                field("model_version", 6, Message("ModelVersion")),
            ],
        ),
        message(
            "Output",
            vec![
                field("id", 1, String),
                field("status", 2, Message("Status")),
                field("created_at", 3, Timestamp),
                field("model", 4, Message("Model")),
                field("input", 5, Message("Input")),
                field("data", 6, Message("Data")),
            ],
        ),
        message(
            "Hit",
            vec![field("score", 1, Float), field("input", 2, Message("Input"))],
        ),
        message(
            "And",
            vec![
                field("input", 1, Message("Input")),
                field("output", 2, Message("Output")),
                field("negate", 3, Bool),
            ],
        ),
        message(
            "Query",
            vec![
                repeated("ands", 1, Message("And")),
                field("language", 2, String),
            ],
        ),
        message(
            "ConceptQuery",
            vec![field("name", 1, String), field("language", 2, String)],
        ),
        message(
            "FeedbackInfo",
            vec![
                field("end_user_id", 1, String),
                field("session_id", 2, String),
                field("event_type", 3, String),
                field("output_id", 4, String),
            ],
        ),
        message(
            "Workflow",
            vec![
                field("id", 1, String),
                field("app_id", 2, String),
                field("created_at", 3, Timestamp),
            ],
        ),
        message(
            "WorkflowResult",
            vec![
                field("id", 1, String),
                field("status", 2, Message("Status")),
                field("created_at", 3, Timestamp),
                field("input", 4, Message("Input")),
                repeated("outputs", 5, Message("Output")),
            ],
        ),
        message(
            "InputCount",
            vec![
                field("processed", 1, Uint32),
                field("to_process", 2, Uint32),
                field("errors", 3, Uint32),
                field("processing", 4, Uint32),
            ],
        ),
        // Requests
        message("GetConceptRequest", vec![field("concept_id", 1, String)]),
        paged("ListConceptsRequest"),
        message(
            "PostConceptsRequest",
            vec![repeated("concepts", 1, Message("Concept"))],
        ),
        message(
            "PatchConceptsRequest",
            vec![
                repeated("concepts", 1, Message("Concept")),
                field("action", 2, String),
            ],
        ),
        message(
            "PostConceptsSearchesRequest",
            vec![
                field("concept_query", 1, Message("ConceptQuery")),
                field("pagination", 2, Message("Pagination")),
            ],
        ),
        message(
            "PostInputsRequest",
            vec![repeated("inputs", 1, Message("Input"))],
        ),
        message("GetInputRequest", vec![field("input_id", 1, String)]),
        paged("ListInputsRequest"),
        message(
            "PatchInputsRequest",
            vec![
                repeated("inputs", 1, Message("Input")),
                field("action", 2, String),
            ],
        ),
        message("DeleteInputRequest", vec![field("input_id", 1, String)]),
        message(
            "DeleteInputsRequest",
            vec![repeated("ids", 1, String), field("delete_all", 2, Bool)],
        ),
        message("GetInputCountRequest", vec![]),
        message(
            "GetModelRequest",
            vec![field("model_id", 1, String), field("version_id", 2, String)],
        ),
        paged("ListModelsRequest"),
        message(
            "PostModelVersionsRequest",
            vec![field("model_id", 1, String)],
        ),
        message(
            "PostModelOutputsRequest",
            vec![
                field("model_id", 1, String),
                field("version_id", 2, String),
                repeated("inputs", 3, Message("Input")),
                field("model", 4, Message("Model")),
            ],
        ),
        message(
            "PostSearchesRequest",
            vec![
                field("query", 1, Message("Query")),
                field("pagination", 2, Message("Pagination")),
            ],
        ),
        message(
            "PostWorkflowResultsRequest",
            vec![
                field("workflow_id", 1, String),
                repeated("inputs", 2, Message("Input")),
                field("output_config", 3, Message("OutputConfig")),
            ],
        ),
        message(
            "PostModelFeedbackRequest",
            vec![
                field("model_id", 1, String),
                field("version_id", 2, String),
                field("input", 3, Message("Input")),
                field("feedback_info", 4, Message("FeedbackInfo")),
            ],
        ),
        // Responses
        message("BaseResponse", vec![field("status", 1, Message("Status"))]),
        message(
            "SingleConceptResponse",
            vec![
                field("status", 1, Message("Status")),
                field("concept", 2, Message("Concept")),
            ],
        ),
        message(
            "MultiConceptResponse",
            vec![
                field("status", 1, Message("Status")),
                repeated("concepts", 2, Message("Concept")),
            ],
        ),
        message(
            "SingleInputResponse",
            vec![
                field("status", 1, Message("Status")),
                field("input", 2, Message("Input")),
            ],
        ),
        message(
            "MultiInputResponse",
            vec![
                field("status", 1, Message("Status")),
                repeated("inputs", 2, Message("Input")),
            ],
        ),
        message(
            "SingleInputCountResponse",
            vec![
                field("status", 1, Message("Status")),
                field("counts", 2, Message("InputCount")),
            ],
        ),
        message(
            "SingleModelResponse",
            vec![
                field("status", 1, Message("Status")),
                field("model", 2, Message("Model")),
            ],
        ),
        message(
            "MultiModelResponse",
            vec![
                field("status", 1, Message("Status")),
                repeated("models", 2, Message("Model")),
            ],
        ),
        message(
            "MultiOutputResponse",
            vec![
                field("status", 1, Message("Status")),
                repeated("outputs", 2, Message("Output")),
            ],
        ),
        message(
            "MultiSearchResponse",
            vec![
                field("status", 1, Message("Status")),
                field("id", 2, String),
                repeated("hits", 3, Message("Hit")),
            ],
        ),
        message(
            "PostWorkflowResultsResponse",
            vec![
                field("status", 1, Message("Status")),
                field("workflow", 2, Message("Workflow")),
                repeated("results", 3, Message("WorkflowResult")),
            ],
        ),
    ]
}

/// `(rpc, input message, output message)` for every method of the `V2` service.
pub const METHODS: &[(&str, &str, &str)] = &[
    ("GetConcept", "GetConceptRequest", "SingleConceptResponse"),
    ("ListConcepts", "ListConceptsRequest", "MultiConceptResponse"),
    ("PostConcepts", "PostConceptsRequest", "MultiConceptResponse"),
    ("PatchConcepts", "PatchConceptsRequest", "MultiConceptResponse"),
    (
        "PostConceptsSearches",
        "PostConceptsSearchesRequest",
        "MultiConceptResponse",
    ),
    ("PostInputs", "PostInputsRequest", "MultiInputResponse"),
    ("GetInput", "GetInputRequest", "SingleInputResponse"),
    ("ListInputs", "ListInputsRequest", "MultiInputResponse"),
    ("PatchInputs", "PatchInputsRequest", "MultiInputResponse"),
    ("DeleteInput", "DeleteInputRequest", "BaseResponse"),
    ("DeleteInputs", "DeleteInputsRequest", "BaseResponse"),
    (
        "GetInputCount",
        "GetInputCountRequest",
        "SingleInputCountResponse",
    ),
    ("GetModel", "GetModelRequest", "SingleModelResponse"),
    ("ListModels", "ListModelsRequest", "MultiModelResponse"),
    ("GetModelOutputInfo", "GetModelRequest", "SingleModelResponse"),
    (
        "PostModelVersions",
        "PostModelVersionsRequest",
        "SingleModelResponse",
    ),
    (
        "PostModelOutputs",
        "PostModelOutputsRequest",
        "MultiOutputResponse",
    ),
    ("PostSearches", "PostSearchesRequest", "MultiSearchResponse"),
    (
        "PostWorkflowResults",
        "PostWorkflowResultsRequest",
        "PostWorkflowResultsResponse",
    ),
    ("PostModelFeedback", "PostModelFeedbackRequest", "BaseResponse"),
];

fn service() -> ServiceDescriptorProto {
    ServiceDescriptorProto {
        name: Some("V2".to_string()),
        method: METHODS
            .iter()
            .map(|(name, input, output)| MethodDescriptorProto {
                name: Some(name.to_string()),
                input_type: Some(format!(".{PACKAGE}.{input}")),
                output_type: Some(format!(".{PACKAGE}.{output}")),
                ..Default::default()
            })
            .collect(),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_a_valid_pool_with_every_method() {
        let pool = descriptor_pool().unwrap();
        let service = pool.get_service_by_name(SERVICE).unwrap();

        assert_eq!(service.methods().count(), METHODS.len());
        for (name, input, output) in METHODS {
            let method = service.methods().find(|m| m.name() == *name).unwrap();
            assert_eq!(method.input().name(), *input);
            assert_eq!(method.output().name(), *output);
            assert!(!method.is_client_streaming() && !method.is_server_streaming());
        }
    }

    #[test]
    fn concept_value_tracks_presence() {
        let pool = descriptor_pool().unwrap();
        let concept = pool.get_message_by_name("clarifai.api.Concept").unwrap();
        let value = concept.get_field_by_name("value").unwrap();

        assert!(value.supports_presence());
        assert_eq!(value.json_name(), "value");
    }
}
