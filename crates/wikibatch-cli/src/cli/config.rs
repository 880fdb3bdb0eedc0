use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use wikibatch::{
    ApiClientConfig, ApiEndpoint, DEFAULT_MAX_CONCURRENCY, DEFAULT_MAX_VALUES, DEFAULT_PREFIX,
    DispatcherConfig, ParamValue, Params, RequestMethod, SparqlClientConfig, SparqlEndpoint,
    SplitSpec, WIKIDATA_API, WIKIDATA_SPARQL,
};

/// Command-line arguments for the `wikibatch` binary.
///
/// Shared flags may appear before or after the subcommand. Every flag with
/// an environment variable can also be set from a `.env` file.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "wikibatch",
    version,
    about = "Split, run, and reassemble large SPARQL and Wikidata entity requests"
)]
pub struct CliArgs {
    /// Maximum number of requests in flight at once.
    ///
    /// Environment variable: `MAX_CONCURRENCY`
    #[arg(long, env = "MAX_CONCURRENCY", default_value_t = DEFAULT_MAX_CONCURRENCY, global = true)]
    pub max_concurrency: usize,

    /// Do not serve or store results in the in-memory cache.
    #[arg(long, default_value_t = false, global = true)]
    pub no_cache: bool,

    /// `User-Agent` sent with every request. Wikimedia services ask for one
    /// that identifies the tool and a contact.
    ///
    /// Environment variable: `USER_AGENT`
    #[arg(long, env = "USER_AGENT", global = true)]
    pub user_agent: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run a SPARQL query template, optionally split by one of its parameters.
    Sparql(SparqlArgs),
    /// Fetch entities through the `wbgetentities` API.
    Entities(EntitiesArgs),
}

#[derive(Args, Debug, Clone)]
pub struct SparqlArgs {
    /// Query service URL.
    ///
    /// Environment variable: `SPARQL_ENDPOINT`
    #[arg(long, env = "SPARQL_ENDPOINT", default_value_t = String::from(WIKIDATA_SPARQL))]
    pub endpoint: String,

    /// File holding the query template. `{name}` is a placeholder; `{{` and
    /// `}}` are literal braces.
    #[arg(long)]
    pub query_file: PathBuf,

    /// JSON object of parameters: string or array-of-strings values.
    #[arg(long)]
    pub params_file: Option<PathBuf>,

    /// Name of the query, used as the result key when not merging.
    #[arg(long)]
    pub name: Option<String>,

    /// Scalar parameter, repeatable.
    #[arg(long = "param", value_name = "NAME=VALUE")]
    pub params: Vec<String>,

    /// List parameter with comma-separated values, repeatable.
    #[arg(long = "list-param", value_name = "NAME=A,B,C")]
    pub list_params: Vec<String>,

    /// Parameter whose values are split across several queries.
    #[arg(long)]
    pub split_by: Option<String>,

    /// Values per query when splitting. Omit it, or pass 0, for a single
    /// query.
    #[arg(long, requires = "split_by")]
    pub chunk_size: Option<usize>,

    /// Prefix added to each split value.
    #[arg(long, default_value_t = String::from(DEFAULT_PREFIX))]
    pub prefix: String,

    /// Merge sub-results into one document instead of keying them by name.
    #[arg(long, default_value_t = false)]
    pub merge: bool,

    /// Print plain `variable -> value` rows.
    #[arg(long, default_value_t = false)]
    pub simplify: bool,

    /// `get`, `post-form`, or `post-direct`.
    #[arg(long, default_value_t = String::from("get"))]
    pub method: String,
}

#[derive(Args, Debug, Clone)]
pub struct EntitiesArgs {
    /// Action API URL.
    ///
    /// Environment variable: `API_URL`
    #[arg(long, env = "API_URL", default_value_t = String::from(WIKIDATA_API))]
    pub api_url: String,

    /// Comma-separated item or property ids.
    #[arg(long, value_delimiter = ',', required = true)]
    pub ids: Vec<String>,

    /// Languages to return labels, descriptions and aliases in.
    #[arg(long, value_delimiter = ',')]
    pub languages: Vec<String>,

    /// Parts of each entity to return (`labels`, `claims`, `sitelinks/urls`, ...).
    #[arg(long, value_delimiter = ',')]
    pub props: Vec<String>,

    /// Ids sent per request.
    #[arg(long, default_value_t = DEFAULT_MAX_VALUES)]
    pub max_values: usize,
}

/// Validated settings for one run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub dispatcher: DispatcherConfig,
    pub task: Task,
}

#[derive(Debug, Clone)]
pub enum Task {
    Sparql(SparqlTask),
    Entities(EntitiesTask),
}

#[derive(Debug, Clone)]
pub struct SparqlTask {
    pub endpoint: SparqlEndpoint,
    pub client: SparqlClientConfig,
    pub query_file: PathBuf,
    pub params_file: Option<PathBuf>,
    pub name: Option<String>,
    /// Parameters from the command line; they override the params file.
    pub params: Params,
    pub split: Option<SplitSpec>,
}

#[derive(Debug, Clone)]
pub struct EntitiesTask {
    pub endpoint: ApiEndpoint,
    pub client: ApiClientConfig,
    pub ids: Vec<String>,
    pub extra: Params,
}

impl TryFrom<CliArgs> for RunConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.max_concurrency == 0 {
            bail!("MAX_CONCURRENCY must be greater than 0");
        }
        let dispatcher = DispatcherConfig::new(args.max_concurrency, !args.no_cache)?;

        let task = match args.command {
            Command::Sparql(sparql) => {
                Task::Sparql(sparql_task(sparql, dispatcher, args.user_agent)?)
            }
            Command::Entities(entities) => {
                Task::Entities(entities_task(entities, dispatcher, args.user_agent)?)
            }
        };

        Ok(Self { dispatcher, task })
    }
}

fn sparql_task(
    args: SparqlArgs,
    dispatcher: DispatcherConfig,
    user_agent: Option<String>,
) -> anyhow::Result<SparqlTask> {
    let method: RequestMethod = args.method.parse()?;
    let mut endpoint = SparqlEndpoint::new(args.endpoint).method(method);
    if let Some(user_agent) = user_agent {
        endpoint = endpoint.user_agent(user_agent);
    }

    let mut params = Params::new();
    for raw in &args.params {
        let (name, value) = split_assignment(raw)?;
        params.insert(name, value);
    }
    for raw in &args.list_params {
        let (name, values) = split_assignment(raw)?;
        let values: Vec<&str> = values
            .split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .collect();
        params.insert(name, ParamValue::from(values));
    }

    let split = match args.split_by {
        Some(param) => {
            if args.params_file.is_none() && params.get(&param).is_none() {
                bail!("--split-by `{param}` is not among the --param/--list-param values");
            }
            let mut spec = SplitSpec::new(param).prefix(args.prefix);
            if let Some(chunk_size) = args.chunk_size {
                spec = spec.chunk_size(chunk_size);
            }
            if let Some(name) = &args.name {
                spec = spec.name(name.as_str());
            }
            Some(spec)
        }
        None => None,
    };

    Ok(SparqlTask {
        endpoint,
        client: SparqlClientConfig {
            merge_results: args.merge,
            simplify: args.simplify,
            dispatcher,
        },
        query_file: args.query_file,
        params_file: args.params_file,
        name: args.name,
        params,
        split,
    })
}

fn entities_task(
    args: EntitiesArgs,
    dispatcher: DispatcherConfig,
    user_agent: Option<String>,
) -> anyhow::Result<EntitiesTask> {
    if args.max_values == 0 {
        bail!("--max-values must be greater than 0");
    }

    let ids: Vec<String> = args
        .ids
        .iter()
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .collect();
    if ids.is_empty() {
        bail!("--ids must name at least one entity");
    }

    let mut endpoint = ApiEndpoint::new(args.api_url);
    if let Some(user_agent) = user_agent {
        endpoint = endpoint.user_agent(user_agent);
    }

    let mut extra = Params::new();
    if !args.languages.is_empty() {
        extra.insert("languages", args.languages);
    }
    if !args.props.is_empty() {
        extra.insert("props", args.props);
    }

    Ok(EntitiesTask {
        endpoint,
        client: ApiClientConfig {
            max_values: args.max_values,
            dispatcher,
        },
        ids,
        extra,
    })
}

fn split_assignment(raw: &str) -> anyhow::Result<(&str, &str)> {
    let (name, value) = raw
        .split_once('=')
        .with_context(|| format!("expected NAME=VALUE, got `{raw}`"))?;
    let name = name.trim();
    if name.is_empty() {
        bail!("parameter name is empty in `{raw}`");
    }
    Ok((name, value))
}
