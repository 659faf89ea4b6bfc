//! UMF route addresses.
//!
//! A route names a destination service, optionally a specific instance,
//! an HTTP method and a path:
//!
//! ```text
//! [instance[-subId]@]serviceName:[METHOD]/path
//! [METHOD]serviceName:/path
//! ```
//!
//! e.g. `users:/v1/users`, `users:[post]/v1/users`, `[post]users:/v1/users`,
//! `9b1f0c@users:[delete]/v1/users/7`. The method may be given in front of
//! the address or in front of the path, not both.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Errors produced while parsing a route address.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    #[error("route field has invalid number of routable segments: {0}")]
    MissingSegments(String),

    #[error("route field is missing a service name: {0}")]
    MissingService(String),

    #[error("route field has ill-formed HTTP method verb in segment: {0}")]
    IllFormedMethod(String),

    #[error("route field has unsupported HTTP method: {0}")]
    UnknownMethod(String),

    #[error("route field is missing an API path: {0}")]
    MissingPath(String),
}

/// HTTP method carried by a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "get",
            Method::Post => "post",
            Method::Put => "put",
            Method::Patch => "patch",
            Method::Delete => "delete",
            Method::Head => "head",
            Method::Options => "options",
        }
    }

    /// Whether a request body is meaningful for this method.
    pub fn accepts_payload(&self) -> bool {
        matches!(self, Method::Post | Method::Put | Method::Patch)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "get" => Ok(Method::Get),
            "post" => Ok(Method::Post),
            "put" => Ok(Method::Put),
            "patch" => Ok(Method::Patch),
            "delete" => Ok(Method::Delete),
            "head" => Ok(Method::Head),
            "options" => Ok(Method::Options),
            _ => Err(RouteError::UnknownMethod(s.to_string())),
        }
    }
}

/// A parsed route address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    /// Target instance id, when the route addresses one instance directly.
    pub instance: Option<String>,
    /// Sub-identifier following the instance id (`instance-subId@...`).
    pub sub_id: Option<String>,
    pub service_name: String,
    /// Defaults to [`Method::Get`] when the route carries no `[METHOD]`.
    pub method: Method,
    pub path: String,
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(instance) = &self.instance {
            write!(f, "{instance}")?;
            if let Some(sub_id) = &self.sub_id {
                write!(f, "-{sub_id}")?;
            }
            write!(f, "@")?;
        }
        write!(f, "{}:[{}]{}", self.service_name, self.method, self.path)
    }
}

impl FromStr for Route {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_route(s)
    }
}

/// Parse a route address into its instance, service, method and path.
pub fn parse_route(route: &str) -> Result<Route, RouteError> {
    let (head, rest) = route
        .split_once(':')
        .ok_or_else(|| RouteError::MissingSegments(route.to_string()))?;

    let (leading_method, head) = match head.strip_prefix('[') {
        Some(bracketed) => {
            let (verb, head) = bracketed
                .split_once(']')
                .ok_or_else(|| RouteError::IllFormedMethod(route.to_string()))?;
            (Some(parse_method(verb)?), head)
        }
        None => (None, head),
    };

    let (instance, sub_id, service_name) = match head.split_once('@') {
        Some((target, service)) => {
            let (instance, sub_id) = match target.split_once('-') {
                Some((instance, sub_id)) => (instance, Some(sub_id)),
                None => (target, None),
            };
            let instance = Some(instance).filter(|i| !i.is_empty());
            let sub_id = sub_id.filter(|s| !s.is_empty());
            (instance, sub_id, service)
        }
        None => (None, None, head),
    };

    if service_name.trim().is_empty() {
        return Err(RouteError::MissingService(route.to_string()));
    }
    if head.contains(['[', ']']) {
        return Err(RouteError::IllFormedMethod(route.to_string()));
    }

    let (method, path) = match rest.strip_prefix('[') {
        Some(_) if leading_method.is_some() => {
            return Err(RouteError::IllFormedMethod(route.to_string()))
        }
        Some(bracketed) => {
            let (verb, path) = bracketed
                .split_once(']')
                .ok_or_else(|| RouteError::IllFormedMethod(route.to_string()))?;
            (parse_method(verb)?, path)
        }
        None => (leading_method.unwrap_or_default(), rest),
    };

    if path.is_empty() {
        return Err(RouteError::MissingPath(route.to_string()));
    }

    Ok(Route {
        instance: instance.map(str::to_string),
        sub_id: sub_id.map(str::to_string),
        service_name: service_name.to_string(),
        method,
        path: path.to_string(),
    })
}

/// Method inside `[...]`; empty brackets mean the default.
fn parse_method(verb: &str) -> Result<Method, RouteError> {
    if verb.is_empty() {
        Ok(Method::default())
    } else {
        verb.parse()
    }
}
