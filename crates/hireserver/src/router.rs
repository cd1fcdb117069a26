//! Method and path pattern dispatch table.
//!
//! Patterns are `/`-separated. A `:name` segment binds one path segment
//! under `name`; a trailing `*` binds whatever remains (possibly nothing)
//! under `"*"`. Routes are tried in registration order and the first match
//! wins.

use actix_web::http::Method;
use std::collections::HashMap;

pub type Params = HashMap<String, String>;

pub const WILDCARD: &str = "*";

#[derive(Debug, Clone)]
pub struct Route<H> {
    pub method: Method,
    pub pattern: String,
    pub handler: H,
}

#[derive(Debug, Clone)]
pub struct Router<H> {
    routes: Vec<Route<H>>,
}

impl<H> Router<H> {
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    pub fn route(mut self, method: Method, pattern: impl Into<String>, handler: H) -> Self {
        self.routes.push(Route {
            method,
            pattern: pattern.into(),
            handler,
        });
        self
    }

    pub fn routes(&self) -> &[Route<H>] {
        &self.routes
    }

    /// First route matching `method` and `path`, with its bound params
    pub fn find(&self, method: &Method, path: &str) -> Option<(&H, Params)> {
        self.routes
            .iter()
            .filter(|route| route.method == *method)
            .find_map(|route| parse_params(path, &route.pattern).map(|p| (&route.handler, p)))
    }
}

impl<H> Default for Router<H> {
    fn default() -> Self {
        Self::new()
    }
}

/// Match `pathname` against `pattern`
///
/// Returns `None` on a literal mismatch or when the segment counts differ
/// and the pattern has no trailing wildcard.
pub fn parse_params(pathname: &str, pattern: &str) -> Option<Params> {
    let path: Vec<&str> = pathname.split('/').filter(|s| !s.is_empty()).collect();
    let pattern: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();

    let wildcard = pattern.last() == Some(&WILDCARD);
    let fixed = if wildcard { pattern.len() - 1 } else { pattern.len() };

    if path.len() < fixed || (!wildcard && path.len() != fixed) {
        return None;
    }

    let mut params = Params::new();
    for (segment, expected) in path.iter().zip(&pattern[..fixed]) {
        match expected.strip_prefix(':') {
            Some(name) => {
                params.insert(name.to_string(), segment.to_string());
            }
            None if segment == expected => {}
            None => return None,
        }
    }

    if wildcard {
        params.insert(WILDCARD.to_string(), path[fixed..].join("/"));
    }

    Some(params)
}
