//! Poster command-line interface.
//!
//! Resources are kept in a JSON store file (see `storePath` in the config).
//! Logging goes to stderr through `env_logger`; `RUST_LOG` overrides the
//! level selected by `--verbose`.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use poster::config::{load_config_file, PosterConfig};
use poster::executor::{Poster, RunOptions, RunOutput};
use poster::models::{template, Environment, Header, HttpMethod, Request, Variable};
use poster::store::{FileStore, Store};
use serde::Serialize;
use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "poster")]
#[command(about = "Reusable HTTP requests with environment-scoped variables")]
struct Cli {
    /// Config file (defaults to ~/.config/poster/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Store file, overriding the config
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Print response headers and body, and enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one or more stored requests in order
    #[command(visible_alias = "exec")]
    Run {
        /// Request names
        #[arg(required = true)]
        names: Vec<String>,

        /// Run in this environment instead of each request's default
        #[arg(short, long = "env")]
        environment: Option<String>,

        /// Add or overwrite a header (key:value)
        #[arg(short = 'H', long = "header", value_parser = parse_header)]
        headers: Vec<Header>,

        /// Overwrite the request body
        #[arg(short = 'd', long = "data")]
        body: Option<String>,

        /// Override a variable for this run (name=value)
        #[arg(short = 'V', long = "variable", value_parser = parse_variable)]
        variables: Vec<(String, String)>,
    },
    /// Create a resource
    #[command(visible_alias = "add")]
    Create {
        #[command(subcommand)]
        resource: CreateCommand,
    },
    /// Show resources as JSON
    Get {
        #[command(subcommand)]
        resource: GetCommand,
    },
    /// Delete a resource
    #[command(visible_alias = "rm")]
    Delete {
        #[command(subcommand)]
        resource: DeleteCommand,
    },
    /// Print a resource template as JSON
    Template {
        /// Resource kind
        kind: TemplateKind,
    },
}

#[derive(Subcommand)]
enum CreateCommand {
    /// Create a request
    #[command(visible_alias = "req")]
    Request {
        /// HTTP method
        method: HttpMethod,
        /// URL, possibly containing :placeholders
        url: String,
        /// Request name
        #[arg(short, long)]
        name: String,
        /// Default environment
        #[arg(short, long = "env", default_value = "global")]
        environment: String,
        /// Request body
        #[arg(short = 'd', long = "data", default_value = "")]
        body: String,
        /// Request header (key:value)
        #[arg(short = 'H', long = "header", value_parser = parse_header)]
        headers: Vec<Header>,
    },
    /// Create an environment
    #[command(visible_alias = "env")]
    Environment {
        /// Environment name
        name: String,
    },
    /// Create a variable with a fixed value
    #[command(visible_alias = "cv")]
    ConstVariable {
        /// Variable name
        name: String,
        /// Value
        value: String,
        /// Environment the variable belongs to
        #[arg(short, long = "env", default_value = "global")]
        environment: String,
    },
    /// Create a variable generated by a shell command
    #[command(visible_alias = "sv")]
    ScriptVariable {
        /// Variable name
        name: String,
        /// Shell command whose stdout becomes the value
        command: String,
        /// Environment the variable belongs to
        #[arg(short, long = "env", default_value = "global")]
        environment: String,
        /// Minutes before the value is regenerated
        #[arg(short, long, default_value_t = 0)]
        timeout: i64,
    },
    /// Create a variable extracted from another request's response
    #[command(visible_alias = "rv")]
    RequestVariable {
        /// Variable name
        name: String,
        /// Request whose response provides the value
        request: String,
        /// JSONPath into the response body; omit for the raw body
        #[arg(default_value = "")]
        json_path: String,
        /// Environment the variable belongs to
        #[arg(short, long = "env", default_value = "global")]
        environment: String,
        /// Environment to run the request in (defaults to --env)
        #[arg(long)]
        request_env: Option<String>,
        /// Minutes before the value is regenerated
        #[arg(short, long, default_value_t = 0)]
        timeout: i64,
    },
}

#[derive(Subcommand)]
enum GetCommand {
    /// Show one request, or all of them
    #[command(visible_alias = "requests")]
    Request {
        name: Option<String>,
        /// Only requests defaulting to this environment
        #[arg(short, long = "env")]
        environment: Option<String>,
    },
    /// Show one environment, or all of them
    #[command(visible_alias = "environments")]
    Environment { name: Option<String> },
    /// Show variables, optionally filtered by name and environment
    #[command(visible_alias = "variables")]
    Variable {
        name: Option<String>,
        #[arg(short, long = "env")]
        environment: Option<String>,
    },
}

#[derive(Subcommand)]
enum DeleteCommand {
    /// Delete a request
    Request { name: String },
    /// Delete an environment nothing references
    Environment { name: String },
    /// Delete a variable
    Variable {
        name: String,
        #[arg(short, long = "env", default_value = "global")]
        environment: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum TemplateKind {
    Request,
    Environment,
    ConstVariable,
    ScriptVariable,
    RequestVariable,
}

/// Parses a `key:value` header override.
fn parse_header(raw: &str) -> Result<Header, String> {
    Header::parse(raw).ok_or_else(|| format!("invalid header {:?}, expected key:value", raw))
}

/// Parses a `name=value` variable override, trimming spaces and tabs.
fn parse_variable(raw: &str) -> Result<(String, String), String> {
    let invalid = || format!("invalid variable {:?}, expected name=value", raw);
    let (name, value) = raw.split_once('=').ok_or_else(invalid)?;
    let name = name.trim_matches([' ', '\t']);
    if name.is_empty() {
        return Err(invalid());
    }
    Ok((name.to_string(), value.trim_matches([' ', '\t']).to_string()))
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn default_config_path() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config/poster/config.json"))
}

fn load_settings(cli: &Cli) -> Result<PosterConfig> {
    let mut config = match cli.config.clone().or_else(default_config_path) {
        Some(path) => load_config_file(&path)
            .with_context(|| format!("could not load config {}", path.display()))?,
        None => PosterConfig::default(),
    };
    if let Some(store) = &cli.store {
        config.store_path = store.clone();
    }
    Ok(config)
}

fn open(config: PosterConfig) -> Result<Poster<FileStore>> {
    if let Some(parent) = config.store_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("could not create {}", parent.display()))?;
        }
    }
    let store = FileStore::open(&config.store_path)
        .with_context(|| format!("could not open store {}", config.store_path.display()))?;
    Ok(Poster::new(store, config)?)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_output(output: &RunOutput, verbose: bool) -> Result<()> {
    for warning in &output.warnings {
        eprintln!("warning: {}", warning);
    }
    eprintln!("< {}", output.response.status_line());
    if verbose {
        for (key, value) in &output.response.headers {
            eprintln!("< {}: {}", key, value);
        }
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(&output.response.body)?;
        stdout.flush()?;
    }
    Ok(())
}

fn cmd_run(
    poster: &mut Poster<FileStore>,
    names: &[String],
    options: &RunOptions,
    verbose: bool,
) -> Result<()> {
    for name in names {
        let output = poster
            .run(name, options)
            .with_context(|| format!("could not run {}", name))?;
        print_output(&output, verbose)?;
    }
    Ok(())
}

fn cmd_create(poster: &mut Poster<FileStore>, resource: CreateCommand) -> Result<()> {
    match resource {
        CreateCommand::Request {
            method,
            url,
            name,
            environment,
            body,
            headers,
        } => {
            let mut request = Request::new(&name, method, url, environment).with_body(body);
            request.headers = headers;
            poster
                .create_request(request)
                .with_context(|| format!("could not save request {}", name))
        }
        CreateCommand::Environment { name } => poster
            .create_environment(Environment::new(&name))
            .with_context(|| format!("could not save environment {}", name)),
        CreateCommand::ConstVariable {
            name,
            value,
            environment,
        } => poster
            .create_variable(Variable::constant(&name, value, environment))
            .with_context(|| format!("could not save variable {}", name)),
        CreateCommand::ScriptVariable {
            name,
            command,
            environment,
            timeout,
        } => poster
            .create_variable(Variable::script(&name, command, environment).with_timeout(timeout))
            .with_context(|| format!("could not save variable {}", name)),
        CreateCommand::RequestVariable {
            name,
            request,
            json_path,
            environment,
            request_env,
            timeout,
        } => {
            let request_env = request_env.unwrap_or_else(|| environment.clone());
            let variable =
                Variable::from_request(&name, request, request_env, json_path, environment)
                    .with_timeout(timeout);
            poster
                .create_variable(variable)
                .with_context(|| format!("could not save variable {}", name))
        }
    }
}

fn cmd_get(poster: &Poster<FileStore>, resource: GetCommand) -> Result<()> {
    let store = poster.store();
    match resource {
        GetCommand::Request { name: Some(name), .. } => print_json(&store.request(&name)?),
        GetCommand::Request {
            name: None,
            environment: Some(env),
        } => print_json(&store.requests_by_environment(&env)?),
        GetCommand::Request {
            name: None,
            environment: None,
        } => print_json(&store.requests()?),
        GetCommand::Environment { name: Some(name) } => print_json(&store.environment(&name)?),
        GetCommand::Environment { name: None } => print_json(&store.environments()?),
        GetCommand::Variable { name, environment } => {
            let variables = match (name, environment) {
                (Some(name), Some(env)) => vec![store.variable(&name, &env)?],
                (Some(name), None) => store.variables_by_name(&name)?,
                (None, Some(env)) => store.variables_by_environment(&env)?,
                (None, None) => store.variables()?,
            };
            print_json(&variables)
        }
    }
}

fn cmd_delete(poster: &mut Poster<FileStore>, resource: DeleteCommand) -> Result<()> {
    match resource {
        DeleteCommand::Request { name } => poster
            .delete_request(&name)
            .with_context(|| format!("could not delete request {}", name)),
        DeleteCommand::Environment { name } => poster
            .delete_environment(&name)
            .with_context(|| format!("could not delete environment {}", name)),
        DeleteCommand::Variable { name, environment } => poster
            .delete_variable(&name, &environment)
            .with_context(|| format!("could not delete variable {}", name)),
    }
}

fn cmd_template(kind: TemplateKind) -> Result<()> {
    match kind {
        TemplateKind::Request => print_json(&template::request_template()),
        TemplateKind::Environment => print_json(&template::environment_template()),
        TemplateKind::ConstVariable => print_json(&template::const_variable_template()),
        TemplateKind::ScriptVariable => print_json(&template::script_variable_template()),
        TemplateKind::RequestVariable => print_json(&template::request_variable_template()),
    }
}

fn dispatch(cli: Cli) -> Result<()> {
    if let Command::Template { kind } = cli.command {
        return cmd_template(kind);
    }

    let config = load_settings(&cli)?;
    let mut poster = open(config)?;
    let verbose = cli.verbose;

    match cli.command {
        Command::Run {
            names,
            environment,
            headers,
            body,
            variables,
        } => {
            let options = RunOptions {
                environment,
                headers,
                body,
                variables: variables.into_iter().collect::<HashMap<_, _>>(),
            };
            cmd_run(&mut poster, &names, &options, verbose)
        }
        Command::Create { resource } => cmd_create(&mut poster, resource),
        Command::Get { resource } => cmd_get(&poster, resource),
        Command::Delete { resource } => cmd_delete(&mut poster, resource),
        Command::Template { .. } => Err(anyhow!("unreachable template command")),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = dispatch(cli) {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}
