use std::collections::HashMap;
use crate::dispatcher::Handler;
use crate::error::RouteError;
use crate::http_type::Method;

/// A pattern segment starting with this marker binds a named parameter.
pub const CAPTURE_MARKER: char = ':';

pub struct Route {
    method: Method,
    pattern: String,
    handler: Handler,
    templated: bool,
}

impl Route {
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn handler(&self) -> Handler {
        self.handler
    }

    // 두 번째 패스 전용. 세그먼트 수가 다르면 바로 탈락.
    fn capture(&self, path: &str) -> Option<HashMap<String, String>> {
        let pattern_segments: Vec<&str> = self.pattern.split('/').collect();
        let path_segments: Vec<&str> = path.split('/').collect();
        if pattern_segments.len() != path_segments.len() {
            return None;
        }

        let mut params = HashMap::new();
        for (expected, actual) in pattern_segments.iter().zip(path_segments.iter()) {
            match expected.strip_prefix(CAPTURE_MARKER) {
                Some(name) => {
                    params.insert(name.to_string(), actual.to_string());
                }
                None if expected == actual => {}
                None => return None,
            }
        }

        Some(params)
    }
}

/// The route that won plus the parameters its pattern captured.
pub struct RouteMatch<'a> {
    pub route: &'a Route,
    pub params: HashMap<String, String>,
}

/// Registration-ordered routes. Built once before serving and never mutated afterwards.
#[derive(Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, method: Method, pattern: &str, handler: Handler) -> Result<(), RouteError> {
        if !pattern.starts_with('/') {
            return Err(RouteError::InvalidPattern(pattern.to_string()));
        }
        if method == Method::Unsupported {
            return Err(RouteError::UnsupportedMethod);
        }

        let templated = is_templated(pattern);
        if templated && pattern.split('/').any(|segment| segment == ":") {
            return Err(RouteError::EmptyCaptureName(pattern.to_string()));
        }

        if self.routes.iter().any(|r| r.method == method && r.pattern == pattern) {
            return Err(RouteError::Duplicate { method, pattern: pattern.to_string() });
        }

        self.routes.push(Route {
            method,
            pattern: pattern.to_string(),
            handler,
            templated,
        });
        Ok(())
    }

    /// Exact routes are tried first, then templated ones. Within a pass the
    /// earliest registration wins, so an exact route always beats a templated
    /// one no matter which was added first.
    pub fn find(&self, method: Method, path: &str) -> Option<RouteMatch<'_>> {
        let exact = self.routes
            .iter()
            .filter(|r| !r.templated && r.method == method)
            .find(|r| r.pattern == path);
        if let Some(route) = exact {
            return Some(RouteMatch { route, params: HashMap::new() });
        }

        self.routes
            .iter()
            .filter(|r| r.templated && r.method == method)
            .find_map(|route| route.capture(path).map(|params| RouteMatch { route, params }))
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

fn is_templated(pattern: &str) -> bool {
    pattern.split('/').any(|segment| segment.starts_with(CAPTURE_MARKER))
}
