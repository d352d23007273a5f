//! # CLI
//!
//! This module defines the command-line interface of `vizier` using `clap`.
//!
//! Connection settings are global options with environment fallbacks, so they can be given
//! once per shell session instead of on every call.
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use vizier_core::{
    config::{API_KEY_ENV, BASE_URL_ENV, TRANSPORT_ENV, TransportKind},
    types::ModelType,
};

#[derive(Parser)]
#[command(name = "vizier", version, about = "Command-line client for the Vizier vision API")]
pub struct Cli {
    /// API key used to authorize every call
    #[arg(long, env = API_KEY_ENV, hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Base URL of the API (e.g. https://api.clarifai.com)
    #[arg(long, env = BASE_URL_ENV, global = true)]
    pub base_url: Option<String>,

    /// Wire protocol: 'http' or 'grpc'
    #[arg(long, env = TRANSPORT_ENV, global = true)]
    pub transport: Option<TransportKind>,

    /// JSON config file with 'api_key', 'base_url' and 'transport'
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Print debug logs to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a model on one or more images
    ///
    /// Each input is either an http(s) URL or a path to a local file.
    ///
    /// ## Examples:
    ///
    /// ```bash
    /// vizier predict general https://samples.example.com/metro-north.jpg --max-concepts 5
    /// ```
    Predict {
        /// Model ID
        model_id: String,
        /// Image URLs or file paths
        #[arg(required = true)]
        inputs: Vec<String>,
        /// Model version ID
        #[arg(long)]
        version: Option<String>,
        /// How to read the predictions (concept, color, embed, detect-concept, ...)
        #[arg(long)]
        model_type: Option<ModelType>,
        #[command(flatten)]
        output: OutputArgs,
        /// Only return these concept IDs
        #[arg(long = "select")]
        select_concepts: Vec<String>,
        /// Language of the concept names
        #[arg(long)]
        language: Option<String>,
    },

    /// Run a workflow on an image
    Workflow {
        /// Workflow ID
        workflow_id: String,
        /// Image URL or file path
        input: String,
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Search the application's inputs. All given clauses must match
    Search(SearchArgs),

    /// Manage concepts
    Concepts {
        #[command(subcommand)]
        sub: ConceptCommands,
    },

    /// Manage inputs
    Inputs {
        #[command(subcommand)]
        sub: InputCommands,
    },

    /// Inspect and train models
    Models {
        #[command(subcommand)]
        sub: ModelCommands,
    },
}

#[derive(Args)]
pub struct OutputArgs {
    /// Minimum prediction value to return
    #[arg(long)]
    pub min_value: Option<f32>,
    /// Maximum number of concepts to return
    #[arg(long)]
    pub max_concepts: Option<u32>,
}

#[derive(Args)]
pub struct PageArgs {
    #[arg(long)]
    pub page: Option<u32>,
    #[arg(long, requires = "page")]
    pub per_page: Option<u32>,
}

#[derive(Args)]
pub struct SearchArgs {
    /// Inputs tagged with this concept name
    #[arg(long = "concept")]
    pub concepts: Vec<String>,
    /// Inputs not tagged with this concept name
    #[arg(long = "not-concept")]
    pub not_concepts: Vec<String>,
    /// Inputs the model predicted this concept name for
    #[arg(long = "predicted")]
    pub predicted: Vec<String>,
    /// Inputs visually similar to this image URL or file
    #[arg(long = "similar-to")]
    pub similar_to: Option<String>,
    /// Inputs whose metadata contains this JSON object
    #[arg(long, value_parser = parse_object)]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
    /// Language of the concept names
    #[arg(long)]
    pub language: Option<String>,
    #[command(flatten)]
    pub page: PageArgs,
}

#[derive(Subcommand)]
pub enum ConceptCommands {
    /// Show a single concept
    Get { concept_id: String },
    /// List the application's concepts
    List {
        #[command(flatten)]
        page: PageArgs,
    },
    /// Create concepts from their IDs
    Add {
        #[arg(required = true)]
        concept_ids: Vec<String>,
    },
    /// Search concepts by name. Supports the '*' wildcard
    Search {
        name: String,
        #[arg(long)]
        language: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum InputCommands {
    /// Add images to the application
    Add {
        /// Image URLs or file paths
        #[arg(required = true)]
        inputs: Vec<String>,
        /// Tag every input with this concept ID
        #[arg(long = "concept")]
        concepts: Vec<String>,
        /// Attach this JSON object as metadata
        #[arg(long, value_parser = parse_object)]
        metadata: Option<serde_json::Map<String, serde_json::Value>>,
        /// Accept URLs that were already added
        #[arg(long)]
        allow_duplicates: bool,
    },
    /// Show a single input
    Get { input_id: String },
    /// List the application's inputs
    List {
        #[command(flatten)]
        page: PageArgs,
    },
    /// Delete inputs by ID, or every input with '--all'
    Delete {
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        input_ids: Vec<String>,
        #[arg(long)]
        all: bool,
    },
    /// Show how many inputs are processed, pending or failed
    Count,
}

#[derive(Subcommand)]
pub enum ModelCommands {
    /// Show a model, optionally at a given version
    Get {
        model_id: String,
        #[arg(long)]
        version: Option<String>,
    },
    /// List the application's models
    List {
        #[command(flatten)]
        page: PageArgs,
    },
    /// Show the output info (concepts and configuration) of a model
    Info { model_id: String },
    /// Train a new version of a model
    Train { model_id: String },
}

fn parse_object(value: &str) -> Result<serde_json::Map<String, serde_json::Value>, String> {
    match serde_json::from_str(value).map_err(|e| format!("Invalid JSON: {e}"))? {
        serde_json::Value::Object(map) => Ok(map),
        other => Err(format!("Expected a JSON object, got '{other}'")),
    }
}
