//! # DeepLinkRegistry
//!
//! Ordered list of compiled routes. A URI is matched against each route in
//! registration order; the first match wins. The matched destination is then
//! wrapped in its declared container chain to produce a full tree.

use crate::error::{DeepLinkError, DeepLinkResult};
use crate::param::ParamSpec;
use crate::pattern::RoutePattern;
use crate::segment::{self, PathSegment};
use crate::uri::{self, DeepLinkUri};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use waymark_core::query;
use waymark_core::{Destination, NodeRef, ParamValue};

/// Declaration of one deep-linkable route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeepLinkRoute {
    /// Path template such as `profile/{userId}`.
    pub pattern: String,
    /// Route id of the produced [`Destination`].
    pub destination: String,
    #[serde(default)]
    pub params: Vec<ParamSpec>,
    /// Root-first container chain leading to the destination.
    #[serde(default)]
    pub path_segments: Vec<PathSegment>,
}

impl DeepLinkRoute {
    pub fn new(pattern: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            destination: destination.into(),
            params: Vec::new(),
            path_segments: Vec::new(),
        }
    }

    pub fn param(mut self, spec: ParamSpec) -> Self {
        self.params.push(spec);
        self
    }

    pub fn segment(mut self, segment: PathSegment) -> Self {
        self.path_segments.push(segment);
        self
    }

    fn param_spec(&self, name: &str) -> Option<&ParamSpec> {
        self.params.iter().find(|p| p.name == name)
    }
}

#[derive(Debug, Clone)]
struct CompiledRoute {
    pattern: RoutePattern,
    route: DeepLinkRoute,
}

#[derive(Debug, Clone, Default)]
pub struct DeepLinkRegistry {
    routes: Vec<CompiledRoute>,
    allowed_schemes: Vec<String>,
}

impl DeepLinkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only accept URIs with one of these schemes. Empty accepts any.
    pub fn with_allowed_schemes<I, S>(mut self, schemes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.set_allowed_schemes(schemes);
        self
    }

    pub fn set_allowed_schemes<I, S>(&mut self, schemes: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.allowed_schemes = schemes
            .into_iter()
            .map(|s| s.as_ref().to_ascii_lowercase())
            .collect();
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn routes(&self) -> impl Iterator<Item = &DeepLinkRoute> {
        self.routes.iter().map(|c| &c.route)
    }

    /// Validate and append a route. Later registrations never shadow
    /// earlier ones.
    pub fn register(&mut self, route: DeepLinkRoute) -> DeepLinkResult<()> {
        let pattern = RoutePattern::parse(&route.pattern)?;

        for (i, spec) in route.params.iter().enumerate() {
            if route.params[..i].iter().any(|p| p.name == spec.name) {
                return Err(DeepLinkError::invalid_pattern(
                    &route.pattern,
                    format!("parameter `{}` declared twice", spec.name),
                ));
            }
        }
        for segment in &route.path_segments {
            segment
                .check()
                .map_err(|reason| DeepLinkError::invalid_pattern(&route.pattern, reason))?;
        }

        tracing::debug!(
            pattern = %route.pattern,
            route = %route.destination,
            "Deep link registered"
        );
        self.routes.push(CompiledRoute { pattern, route });
        Ok(())
    }

    /// Match `uri` and convert its parameters into a [`Destination`].
    pub fn match_uri(&self, uri: &str) -> DeepLinkResult<Destination> {
        let parsed = DeepLinkUri::parse(uri);
        let (compiled, captures) = self.find(uri, &parsed)?;
        extract(&compiled.route, captures, &parsed)
    }

    /// Match `uri` and rebuild the full tree leading to its destination.
    pub fn resolve(&self, uri: &str) -> DeepLinkResult<NodeRef> {
        let parsed = DeepLinkUri::parse(uri);
        let (compiled, captures) = self.find(uri, &parsed)?;
        let destination = extract(&compiled.route, captures, &parsed)?;

        tracing::debug!(%uri, %destination, pattern = %compiled.route.pattern, "Deep link resolved");

        let tree = segment::reconstruct(&compiled.route.path_segments, destination)?;
        query::validate(&tree)?;
        Ok(Arc::new(tree))
    }

    /// Render a URI for `destination` from the first route that produces it.
    ///
    /// Path placeholders come from the destination's arguments; remaining
    /// declared arguments go to the query string in declaration order.
    pub fn create_uri(&self, destination: &Destination, scheme: &str) -> Option<String> {
        let compiled = self
            .routes
            .iter()
            .find(|c| c.route.destination == destination.route)?;
        let route = &compiled.route;

        let path = compiled.pattern.render(|name| {
            let value = destination.arg(name)?;
            encode(route, name, value)
        })?;

        let path_names = compiled.pattern.param_names();
        let mut query = Vec::new();
        for spec in route.params.iter().filter(|spec| !path_names.contains(&spec.name)) {
            if let Some(value) = destination.arg(&spec.name) {
                query.push((spec.name.as_str(), spec.serializer_kind.encode(value)?));
            }
        }

        Some(uri::format_uri(scheme, &path, query))
    }

    pub fn try_create_uri(&self, destination: &Destination, scheme: &str) -> DeepLinkResult<String> {
        self.create_uri(destination, scheme)
            .ok_or_else(|| DeepLinkError::NoRouteForDestination {
                route: destination.route.clone(),
            })
    }

    fn find(
        &self,
        uri: &str,
        parsed: &DeepLinkUri,
    ) -> DeepLinkResult<(&CompiledRoute, Vec<(String, String)>)> {
        let no_match = || DeepLinkError::NoMatchingRoute {
            uri: uri.to_string(),
        };

        if !self.allowed_schemes.is_empty() {
            let allowed = parsed
                .scheme
                .as_ref()
                .is_some_and(|s| self.allowed_schemes.contains(s));
            if !allowed {
                tracing::trace!(%uri, scheme = ?parsed.scheme, "Scheme not allowed");
                return Err(no_match());
            }
        }

        for compiled in &self.routes {
            let captures = compiled.pattern.captures(&parsed.path)?;
            tracing::trace!(
                %uri,
                pattern = %compiled.route.pattern,
                matched = captures.is_some(),
                "Deep link attempt"
            );
            if let Some(captures) = captures {
                return Ok((compiled, captures));
            }
        }
        Err(no_match())
    }
}

fn encode(route: &DeepLinkRoute, name: &str, value: &ParamValue) -> Option<String> {
    match route.param_spec(name) {
        Some(spec) => spec.serializer_kind.encode(value),
        None => Some(value.to_string()),
    }
}

fn extract(
    route: &DeepLinkRoute,
    captures: Vec<(String, String)>,
    parsed: &DeepLinkUri,
) -> DeepLinkResult<Destination> {
    let captures: BTreeMap<String, String> = captures.into_iter().collect();
    let mut args = BTreeMap::new();

    for spec in &route.params {
        let raw = captures
            .get(&spec.name)
            .map(String::as_str)
            .or_else(|| parsed.query_value(&spec.name));
        match raw {
            Some(raw) => {
                let value = spec.serializer_kind.decode(&spec.name, raw)?;
                args.insert(spec.name.clone(), value);
            }
            None if spec.required => {
                return Err(DeepLinkError::MissingRequiredParameter {
                    route: route.destination.clone(),
                    name: spec.name.clone(),
                });
            }
            None => {
                if let Some(default) = &spec.default {
                    args.insert(spec.name.clone(), default.clone());
                }
            }
        }
    }

    for (name, raw) in captures {
        args.entry(name).or_insert(ParamValue::String(raw));
    }

    Ok(Destination {
        route: route.destination.clone(),
        args,
    })
}
