//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, RequestArgs, Service};
use crate::client::Client;
use crate::config::ClientConfig;
use crate::error::{Result, ResultExt};
use crate::formats::{Format, FormatHandler, JSON, LIJSON, NDJSON, PGN, TEXT};
use crate::http::{Reply, Request, Requestor};
use crate::types::{Body, Method, Params};
use futures::TryStreamExt;
use serde_json::Value;
use tracing::debug;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        let config = self.load_config()?;
        debug!("Using {config:?}");
        let client = Client::with_config(&config)?;
        let requestor = match self.cli.service {
            Service::Api => client.api(),
            Service::Tablebase => client.tablebase(),
            Service::Explorer => client.explorer(),
        };

        match &self.cli.command {
            Commands::Get { path, request } => {
                self.dispatch(requestor, Method::GET, path, request, None)
                    .await
            }
            Commands::Post {
                path,
                request,
                form,
                json,
                text,
            } => {
                let body = Self::build_body(form, json.as_deref(), text.as_deref())?;
                self.dispatch(requestor, Method::POST, path, request, body)
                    .await
            }
        }
    }

    /// Config file, then environment, then command-line flags
    fn load_config(&self) -> Result<ClientConfig> {
        let config = match &self.cli.config {
            Some(path) => ClientConfig::from_json_file(path)?,
            None => ClientConfig::default(),
        };
        let mut config = config.merge_env()?;

        if let Some(url) = &self.cli.base_url {
            config.base_url.clone_from(url);
        }
        if let Some(token) = &self.cli.token {
            config.token = Some(token.clone());
        }
        Ok(config)
    }

    fn build_body(
        form: &[(String, String)],
        json: Option<&str>,
        text: Option<&str>,
    ) -> Result<Option<Body>> {
        if let Some(json) = json {
            let value: Value = serde_json::from_str(json).context("Invalid --json body")?;
            return Ok(Some(Body::Json(value)));
        }
        if let Some(text) = text {
            return Ok(Some(Body::Text(text.to_string())));
        }
        if form.is_empty() {
            return Ok(None);
        }
        Ok(Some(Body::Form(form.iter().cloned().collect())))
    }

    async fn dispatch(
        &self,
        requestor: &Requestor,
        method: Method,
        path: &str,
        args: &RequestArgs,
        body: Option<Body>,
    ) -> Result<()> {
        let params: Params = args.params.iter().cloned().collect();

        match Format::from(args.format) {
            Format::Json => {
                let request = Self::build_request(JSON, args, params, body);
                self.execute(requestor, method, path, request, |v| self.print_json(v))
                    .await
            }
            Format::Lijson => {
                let request = Self::build_request(LIJSON, args, params, body);
                self.execute(requestor, method, path, request, |v| self.print_json(v))
                    .await
            }
            Format::Ndjson => {
                let request = Self::build_request(NDJSON, args, params, body);
                self.execute(requestor, method, path, request, |v| self.print_json(v))
                    .await
            }
            Format::Pgn => {
                let request = Self::build_request(PGN, args, params, body);
                self.execute(requestor, method, path, request, |game| {
                    println!("{game}\n");
                    Ok(())
                })
                .await
            }
            Format::Text => {
                let request = Self::build_request(TEXT, args, params, body);
                self.execute(requestor, method, path, request, |line| {
                    println!("{line}");
                    Ok(())
                })
                .await
            }
        }
    }

    fn build_request<H: FormatHandler>(
        fmt: H,
        args: &RequestArgs,
        params: Params,
        body: Option<Body>,
    ) -> Request<H> {
        let request = Request::with_format(fmt)
            .streaming(args.stream)
            .params(params);
        match body {
            Some(body) => request.body(body),
            None => request,
        }
    }

    /// Send the request and emit every decoded unit in arrival order
    async fn execute<H, F>(
        &self,
        requestor: &Requestor,
        method: Method,
        path: &str,
        request: Request<H>,
        emit: F,
    ) -> Result<()>
    where
        H: FormatHandler,
        F: Fn(&H::Output) -> Result<()>,
    {
        let mut count = 0usize;
        match requestor.request(method, path, request).await? {
            Reply::Single(unit) => {
                emit(&unit)?;
                count += 1;
            }
            Reply::Stream(mut units) => {
                while let Some(unit) = units.try_next().await? {
                    emit(&unit)?;
                    count += 1;
                }
            }
        }
        debug!("{method} {path}: {count} unit(s)");
        Ok(())
    }

    /// Output a JSON value
    fn print_json(&self, value: &Value) -> Result<()> {
        let out = if self.cli.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        println!("{out}");
        Ok(())
    }
}
