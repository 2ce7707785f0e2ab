//! The process context: cached store, HTTP client and configuration.

use super::client::HttpClient;
use super::normalize::normalize_url;
use super::{ResolvedRequest, RunOptions, RunOutput};
use crate::cache::{Cache, CachedStore, MemoryCache};
use crate::config::{ConfigError, PosterConfig};
use crate::error::Error;
use crate::models::{Environment, Header, HttpResponse, Request, Variable, VariableType};
use crate::store::Store;
use crate::variables::{
    generate, GenerationChain, GenerationError, GeneratorBackend, ScriptRunner, VariableScope,
};
use chrono::Utc;

/// Owns everything a run needs.
///
/// All reads and writes go through one [`CachedStore`], so values regenerated
/// during a run are visible to later lookups in the same process.
#[derive(Debug)]
pub struct Poster<S, C = MemoryCache> {
    store: CachedStore<S, C>,
    client: HttpClient,
    scripts: ScriptRunner,
    config: PosterConfig,
}

impl<S: Store> Poster<S, MemoryCache> {
    /// Creates a context over `store` with an in-memory cache.
    ///
    /// # Errors
    ///
    /// Returns `Config` if `config` is invalid and `Request` if the HTTP
    /// client cannot be built.
    pub fn new(store: S, config: PosterConfig) -> Result<Self, Error> {
        Self::with_cache(store, MemoryCache::new(), config)
    }
}

impl<S: Store, C: Cache> Poster<S, C> {
    /// Creates a context over `store` with the given cache.
    pub fn with_cache(store: S, cache: C, config: PosterConfig) -> Result<Self, Error> {
        config.validate().map_err(ConfigError::Invalid)?;
        let client = HttpClient::new(&config)?;
        let scripts = ScriptRunner::new(config.shell.clone(), config.shell_args.clone());
        Ok(Self {
            store: CachedStore::with_cache(store, cache),
            client,
            scripts,
            config,
        })
    }

    /// Returns the cached store.
    pub fn store(&self) -> &CachedStore<S, C> {
        &self.store
    }

    /// Returns the configuration.
    pub fn config(&self) -> &PosterConfig {
        &self.config
    }

    /// Validates and saves a new environment.
    pub fn create_environment(&mut self, environment: Environment) -> Result<(), Error> {
        environment.validate()?;
        self.store.save_environments(&[environment])?;
        Ok(())
    }

    /// Validates and saves a new request.
    pub fn create_request(&mut self, request: Request) -> Result<(), Error> {
        request.validate()?;
        self.store.save_requests(&[request])?;
        Ok(())
    }

    /// Validates and saves a new variable.
    pub fn create_variable(&mut self, variable: Variable) -> Result<(), Error> {
        variable.validate()?;
        self.store.save_variables(&[variable])?;
        Ok(())
    }

    /// Validates and replaces an existing request.
    pub fn update_request(&mut self, request: Request) -> Result<(), Error> {
        request.validate()?;
        self.store.update_request(&request)?;
        Ok(())
    }

    /// Validates and replaces an existing variable.
    pub fn update_variable(&mut self, variable: Variable) -> Result<(), Error> {
        variable.validate()?;
        self.store.update_variable(&variable)?;
        Ok(())
    }

    /// Deletes a request.
    pub fn delete_request(&mut self, name: &str) -> Result<(), Error> {
        Ok(self.store.delete_request(name)?)
    }

    /// Deletes an environment that nothing references.
    pub fn delete_environment(&mut self, name: &str) -> Result<(), Error> {
        Ok(self.store.delete_environment(name)?)
    }

    /// Deletes a variable.
    pub fn delete_variable(&mut self, name: &str, environment: &str) -> Result<(), Error> {
        Ok(self.store.delete_variable(name, environment)?)
    }

    /// Runs the stored request `name`.
    ///
    /// Overrides in `options` are applied for this run only and are never
    /// persisted. Variable overrides also apply to every sub-request run by a
    /// request variable, and tolerated failures from any depth are returned in
    /// [`RunOutput::warnings`].
    ///
    /// # Errors
    ///
    /// Returns `Store` if the request or environment does not exist,
    /// `Generation` if a referenced variable cannot be generated, and
    /// `Request` if the resolved request cannot be sent.
    pub fn run(&mut self, name: &str, options: &RunOptions) -> Result<RunOutput, Error> {
        let mut request = self.store.request(name)?;
        let environment = match &options.environment {
            Some(env) => self.store.environment(env)?.name,
            None => request.environment.clone(),
        };

        request.update_headers(&options.headers);
        if let Some(body) = &options.body {
            request.update_body(body.clone());
        }

        let mut chain = GenerationChain::with_overrides(options.variables.clone());
        let mut output = self.run_in(request, &environment, &mut chain)?;
        output.warnings = chain.take_warnings();
        Ok(output)
    }

    /// Resolves and sends a prepared request in `environment`.
    ///
    /// Tolerated failures are recorded on `chain`, not in the output.
    fn run_in(
        &mut self,
        request: Request,
        environment: &str,
        chain: &mut GenerationChain,
    ) -> Result<RunOutput, Error> {
        let mut scope = VariableScope::load(&self.store, environment)?
            .with_overrides(chain.overrides().clone());

        self.generate_variables(&request, &mut scope, chain)?;
        let resolved = self.resolve(&request, &scope)?;

        log::debug!("Sending request:\n{}", format_request_log(&resolved));
        let response = self.client.send(
            resolved.method,
            &resolved.url,
            &resolved.headers,
            &resolved.body,
        )?;
        log::debug!(
            "Received {} for {} in {:?}",
            response.status_line(),
            request.name,
            response.duration
        );

        Ok(RunOutput {
            name: request.name,
            environment: environment.to_string(),
            request: resolved,
            response,
            warnings: Vec::new(),
        })
    }

    /// Brings every non-const variable referenced by `request` up to date.
    ///
    /// Regenerated values are persisted and written back into `scope`.
    /// Tolerated failures are recorded on `chain`; any other failure aborts.
    fn generate_variables(
        &mut self,
        request: &Request,
        scope: &mut VariableScope,
        chain: &mut GenerationChain,
    ) -> Result<(), Error> {
        for name in scope.variables_in_request(request) {
            if scope.is_overridden(&name) {
                continue;
            }
            let (var_name, var_env) = match scope.variable(&name) {
                Some(v) if v.kind() != VariableType::Const => (v.name.clone(), v.environment.clone()),
                _ => continue,
            };

            // A sub-request earlier in this loop may already have refreshed it.
            let mut variable = self.store.variable(&var_name, &var_env)?;
            match generate(&mut variable, self, chain, Utc::now()) {
                Ok(true) => {
                    self.store.update_variable(&variable)?;
                    scope.insert(variable);
                }
                Ok(false) => scope.insert(variable),
                Err(e) if e.is_tolerated() => {
                    log::warn!("Keeping previous value of {}: {}", var_name, e);
                    chain.warn(e);
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok(())
    }

    /// Substitutes `scope` into the request and normalizes its URL.
    fn resolve(&self, request: &Request, scope: &VariableScope) -> Result<ResolvedRequest, Error> {
        let url = normalize_url(
            &scope.replace_variables(&request.url),
            &self.config.default_scheme,
        )?;
        let headers = request
            .headers
            .iter()
            .map(|h| {
                Header::new(
                    scope.replace_variables(&h.key),
                    scope.replace_variables(&h.value),
                )
            })
            .collect();

        Ok(ResolvedRequest {
            method: request.method,
            url,
            headers,
            body: scope.replace_variables(&request.body),
        })
    }
}

impl<S: Store, C: Cache> GeneratorBackend for Poster<S, C> {
    fn run_script(&self, command: &str) -> Result<String, GenerationError> {
        self.scripts.run(command)
    }

    fn run_request(
        &mut self,
        request: &str,
        environment: &str,
        chain: &mut GenerationChain,
    ) -> Result<HttpResponse, GenerationError> {
        let sub_request = self.store.request(request)?;
        self.store.environment(environment)?;

        match self.run_in(sub_request, environment, chain) {
            Ok(output) => Ok(output.response),
            Err(Error::Generation(e)) => Err(e),
            Err(e) => Err(GenerationError::Request {
                request: request.to_string(),
                source: Box::new(e),
            }),
        }
    }
}

fn format_request_log(request: &ResolvedRequest) -> String {
    let mut message = format!("> {} {}\n", request.method, request.url);
    for header in &request.headers {
        message.push_str(&format!("> {}: {}\n", header.key, header.value));
    }
    message
}
