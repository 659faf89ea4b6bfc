//! `hydra-cli rest <route> [payloadFile]`.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use hydra_core::message::{load_json_file, CLI_ROUTE};
use hydra_core::output::{render_json, render_text};
use hydra_core::{parse_route, Envelope, Route};
use hydra_registry::{make_api_request, Registry, RegistryStore};
use serde_json::{Map, Value};

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct RestArgs {
    /// Address of the form `[instance@]serviceName:[method]/path`.
    pub route: String,
    /// JSON file sent as the request body.
    #[arg(value_name = "payloadFile")]
    pub payload: Option<PathBuf>,
}

/// A validated API request, ready to be sent.
#[derive(Debug, Clone)]
pub struct RestRequest {
    pub route: Route,
    pub envelope: Envelope,
}

/// Validate the route and payload and build the request envelope.
///
/// Runs before any store connection: a malformed route, a payload given
/// for a method that takes none, or an unreadable payload file aborts here.
pub fn prepare(args: &RestArgs) -> anyhow::Result<RestRequest> {
    let route = args.route.as_str();
    let parsed = parse_route(route)?;

    if args.payload.is_some() && !parsed.method.accepts_payload() {
        anyhow::bail!("Can't use HTTP {} with a payload", parsed.method);
    }

    let body = match &args.payload {
        Some(path) => load_json_file(path)?,
        None => Value::Object(Map::new()),
    };

    Ok(RestRequest {
        envelope: Envelope::new(route, CLI_ROUTE, body),
        route: parsed,
    })
}

/// Forward the request to the service and print its response.
pub async fn run<S, W>(registry: &Registry<S>, request: &RestRequest, out: &mut W) -> anyhow::Result<()>
where
    S: RegistryStore,
    W: Write,
{
    let response = make_api_request(registry, &request.envelope, &request.route).await?;
    let rendered = match &response {
        Value::String(text) => render_text(text),
        other => render_json(other),
    };
    writeln!(out, "{rendered}")?;
    Ok(())
}
