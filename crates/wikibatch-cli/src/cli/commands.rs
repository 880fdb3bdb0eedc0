use super::config::{EntitiesTask, RunConfig, SparqlTask, Task};
use anyhow::Context;
use serde_json::Value;
use std::{fs, path::Path};
use wikibatch::{ApiClient, ParamValue, Params, Query, QueryRequest, SparqlClient};

/// Runs the configured task and returns its result as pretty-printed JSON.
pub async fn run(config: RunConfig) -> anyhow::Result<String> {
    tracing::info!(
        max_concurrency = config.dispatcher.max_concurrency,
        cache = config.dispatcher.cache_results,
        "Starting run"
    );
    match config.task {
        Task::Sparql(task) => run_sparql(task).await,
        Task::Entities(task) => run_entities(task).await,
    }
}

async fn run_sparql(task: SparqlTask) -> anyhow::Result<String> {
    let template = fs::read_to_string(&task.query_file)
        .with_context(|| format!("failed to read query file {}", task.query_file.display()))?;

    let mut params = match &task.params_file {
        Some(path) => read_params_file(path)?,
        None => Params::new(),
    };
    for (name, value) in task.params.iter() {
        params.insert(name, value.clone());
    }

    let request = match task.split {
        Some(spec) => QueryRequest::Split {
            template,
            spec,
            params,
        },
        None => {
            let mut builder = Query::builder(template).params(params);
            if let Some(name) = task.name {
                builder = builder.name(name);
            }
            QueryRequest::Single(builder.build()?)
        }
    };

    let mut client = SparqlClient::with_http(task.endpoint, task.client)?;
    let output = client.query(request).await?;

    tracing::info!(
        cached = client.dispatcher().cache().len(),
        "SPARQL request complete"
    );
    Ok(serde_json::to_string_pretty(&output)?)
}

async fn run_entities(task: EntitiesTask) -> anyhow::Result<String> {
    let mut client = ApiClient::with_http(task.endpoint, task.client)?;
    let entities = client.get_entities(&task.ids, "json", task.extra).await?;

    tracing::info!(
        requested = task.ids.len(),
        found = entities.len(),
        "Entity lookup complete"
    );
    Ok(serde_json::to_string_pretty(&entities)?)
}

/// Reads a JSON object of parameters. Values must be strings or arrays of
/// strings.
fn read_params_file(path: &Path) -> anyhow::Result<Params> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read params file {}", path.display()))?;
    parse_params(&raw).with_context(|| format!("invalid params file {}", path.display()))
}

fn parse_params(raw: &str) -> anyhow::Result<Params> {
    let Value::Object(map) = serde_json::from_str::<Value>(raw)? else {
        anyhow::bail!("expected a JSON object");
    };
    map.into_iter()
        .map(|(name, value)| -> anyhow::Result<(String, ParamValue)> {
            Ok((name, ParamValue::try_from(value)?))
        })
        .collect()
}
