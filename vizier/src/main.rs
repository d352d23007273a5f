//! # Vizier CLI Entry Point
//!
//! The main executable for the Vizier tool. This file drives the application lifecycle:
//!
//! 1. **Initialization**: Parses command-line arguments using [`cli::Cli`] and sets up logging.
//! 2. **Configuration**: Merges the config file, environment and flags into a `ClientConfig`.
//! 3. **Execution**: Builds the endpoint for the chosen command and runs it with `VizierClient`.
//! 4. **Presentation**: Prints the outcome and payload, exiting non-zero on failures.

mod cli;
mod formatter;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Commands, ConceptCommands, InputCommands, ModelCommands, PageArgs, SearchArgs};
use formatter::FormattedString;
use serde::Serialize;
use std::process;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use vizier_core::{
    VizierClient,
    config::{API_KEY_ENV, ClientConfig, ConfigError},
    endpoints::{
        AddConcepts, AddInputs, DeleteInputs, GetModel, ListConcepts, ListInputs, ListModels,
        Predict, SearchConcepts, SearchInputs, WorkflowPredict,
    },
    request::{Pagination, RequestError},
    response::ApiResponse,
    transport::AnyTransport,
    types::{Concept, ImageRef, Input, SearchBy},
};

type Client = VizierClient<AnyTransport>;

#[tokio::main]
async fn main() {
    let args = Cli::parse();
    init_tracing(args.verbose);

    let config = or_exit(resolve_config(&args));
    let client = or_exit(VizierClient::connect(&config).await);

    match args.command {
        Commands::Predict {
            model_id,
            inputs,
            version,
            model_type,
            output,
            select_concepts,
            language,
        } => {
            let mut predict = Predict::new(model_id).inputs(load_inputs(&inputs));
            if let Some(version) = version {
                predict = predict.version(version);
            }
            if let Some(model_type) = model_type {
                predict = predict.model_type(model_type);
            }
            if let Some(min_value) = output.min_value {
                predict = predict.min_value(min_value);
            }
            if let Some(max_concepts) = output.max_concepts {
                predict = predict.max_concepts(max_concepts);
            }
            if !select_concepts.is_empty() {
                predict = predict.select_concepts(select_concepts.into_iter().map(Concept::new));
            }
            if let Some(language) = language {
                predict = predict.language(language);
            }
            print_response(client.execute(&predict).await);
        }
        Commands::Workflow {
            workflow_id,
            input,
            output,
        } => {
            let mut workflow = WorkflowPredict::new(workflow_id).input(or_exit(load_input(&input)));
            if let Some(min_value) = output.min_value {
                workflow = workflow.min_value(min_value);
            }
            if let Some(max_concepts) = output.max_concepts {
                workflow = workflow.max_concepts(max_concepts);
            }
            print_response(client.execute(&workflow).await);
        }
        Commands::Search(search) => run_search(&client, search).await,
        Commands::Concepts { sub } => run_concepts(&client, sub).await,
        Commands::Inputs { sub } => run_inputs(&client, sub).await,
        Commands::Models { sub } => run_models(&client, sub).await,
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "vizier=debug,vizier_core=debug"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with_writer(std::io::stderr)
        .init();
}

/// The config file, if any, provides the defaults. Flags and environment variables win.
fn resolve_config(args: &Cli) -> Result<ClientConfig, ConfigError> {
    let mut config = match &args.config {
        Some(path) => ClientConfig::load(path)?,
        None => ClientConfig::new(
            args.api_key
                .clone()
                .ok_or(ConfigError::MissingApiKey(API_KEY_ENV))?,
        ),
    };

    if let Some(api_key) = &args.api_key {
        config.api_key = api_key.clone();
    }
    if let Some(base_url) = &args.base_url {
        config.base_url = base_url.clone();
    }
    if let Some(transport) = args.transport {
        config.transport = transport;
    }

    debug!(base_url = %config.base_url, transport = %config.transport, "resolved configuration");
    Ok(config)
}

async fn run_search(client: &Client, args: SearchArgs) {
    let mut clauses: Vec<SearchBy> = Vec::new();
    clauses.extend(args.concepts.into_iter().map(SearchBy::tagged_concept_name));
    clauses.extend(
        args.not_concepts
            .into_iter()
            .map(|name| SearchBy::tagged_concept_name(name).negated()),
    );
    clauses.extend(args.predicted.into_iter().map(SearchBy::predicted_concept_name));
    if let Some(image) = args.similar_to {
        let image = if is_url(&image) {
            ImageRef::Url(image)
        } else {
            ImageRef::Bytes(or_exit(read_file(&image)))
        };
        clauses.push(or_exit(SearchBy::visually_similar(image, None)));
    }
    if let Some(metadata) = args.metadata {
        clauses.push(SearchBy::metadata(metadata));
    }

    let mut search = SearchInputs::new(clauses);
    if let Some(language) = args.language {
        search = search.language(language);
    }
    if let Some(pagination) = pagination(&args.page) {
        search = search.pagination(pagination);
    }
    print_response(client.execute(&search).await);
}

async fn run_concepts(client: &Client, command: ConceptCommands) {
    match command {
        ConceptCommands::Get { concept_id } => print_response(client.get_concept(concept_id).await),
        ConceptCommands::List { page } => print_response(
            client
                .execute(&ListConcepts {
                    pagination: pagination(&page),
                })
                .await,
        ),
        ConceptCommands::Add { concept_ids } => print_response(
            client
                .execute(&AddConcepts::new(concept_ids.into_iter().map(Concept::new)))
                .await,
        ),
        ConceptCommands::Search { name, language } => {
            let mut search = SearchConcepts::new(name);
            if let Some(language) = language {
                search = search.language(language);
            }
            print_response(client.execute(&search).await)
        }
    }
}

async fn run_inputs(client: &Client, command: InputCommands) {
    match command {
        InputCommands::Add {
            inputs,
            concepts,
            metadata,
            allow_duplicates,
        } => {
            let inputs = load_inputs(&inputs).into_iter().map(|input| {
                let mut input = input
                    .allow_duplicate_url(allow_duplicates)
                    .with_concepts(concepts.iter().map(|id| Concept::new(id.as_str()).present()));
                if let Some(metadata) = &metadata {
                    input = input.with_metadata(metadata.clone());
                }
                input
            });
            print_response(client.execute(&AddInputs::new(inputs)).await)
        }
        InputCommands::Get { input_id } => print_response(client.get_input(input_id).await),
        InputCommands::List { page } => print_response(
            client
                .execute(&ListInputs {
                    pagination: pagination(&page),
                })
                .await,
        ),
        InputCommands::Delete { input_ids, all } => {
            let selection = if all {
                DeleteInputs::All
            } else {
                DeleteInputs::Ids(input_ids)
            };
            print_response(client.delete_inputs(selection).await)
        }
        InputCommands::Count => print_response(client.input_count().await),
    }
}

async fn run_models(client: &Client, command: ModelCommands) {
    match command {
        ModelCommands::Get { model_id, version } => {
            let mut get = GetModel::new(model_id);
            if let Some(version) = version {
                get = get.version(version);
            }
            print_response(client.execute(&get).await)
        }
        ModelCommands::List { page } => print_response(
            client
                .execute(&ListModels {
                    pagination: pagination(&page),
                })
                .await,
        ),
        ModelCommands::Info { model_id } => print_response(client.model_output_info(model_id).await),
        ModelCommands::Train { model_id } => print_response(client.train_model(model_id).await),
    }
}

fn pagination(args: &PageArgs) -> Option<Pagination> {
    args.page
        .map(|page| Pagination::new(page, args.per_page.unwrap_or(20)))
}

fn is_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

fn read_file(path: &str) -> anyhow::Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("Failed to read '{path}'"))
}

fn load_input(value: &str) -> anyhow::Result<Input> {
    if is_url(value) {
        Ok(Input::image_url(value))
    } else {
        Ok(Input::image_bytes(read_file(value)?))
    }
}

fn load_inputs(values: &[String]) -> Vec<Input> {
    values.iter().map(|value| or_exit(load_input(value))).collect()
}

fn print_response<T: Serialize>(result: Result<ApiResponse<T>, RequestError>) {
    let response = or_exit(result);
    let formatted = FormattedString::from(&response);

    if response.outcome().is_ok() {
        println!("{formatted}");
    } else {
        eprintln!("{formatted}");
        process::exit(1);
    }
}

fn or_exit<T, E: Into<FormattedString>>(result: Result<T, E>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => {
            let formatted: FormattedString = err.into();
            eprintln!("{formatted}");
            process::exit(1);
        }
    }
}
