use std::collections::HashMap;
use anyhow::anyhow;
use bytes::Bytes;
use crate::http_type::Method;

/// One parsed request. Created per connection and dropped with it.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub path: String,
    pub version: String,
    /// Keys are lower-cased by the parser.
    pub headers: HashMap<String, String>,
    /// Filled only when a templated route matched.
    pub params: HashMap<String, String>,
    /// Whatever followed the blank line in the single read.
    pub body: Bytes,
}

impl HttpRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub(crate) fn set_params(&mut self, params: HashMap<String, String>) {
        self.params = params;
    }
}

// 러스트에서는 모든 필드를 한번에 초기화해야 하므로, 파싱 도중 알게 되는 값은 Builder로 모은다.
#[derive(Default)]
pub struct HttpRequestBuilder {
    method: Option<Method>,
    path: Option<String>,
    version: Option<String>,
    headers: HashMap<String, String>,
    body: Option<Bytes>,
}

impl HttpRequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build(self) -> anyhow::Result<HttpRequest> {
        let method = self.method.ok_or_else(|| anyhow!("missing method."))?;
        let path = self.path.ok_or_else(|| anyhow!("missing path."))?;

        Ok(HttpRequest {
            method,
            path,
            version: self.version.unwrap_or_default(),
            headers: self.headers,
            params: HashMap::new(),
            body: self.body.unwrap_or_default(),
        })
    }

    pub fn method(&mut self, method: Method) -> &mut Self {
        self.method.replace(method);
        self
    }

    pub fn path(&mut self, path: impl Into<String>) -> &mut Self {
        self.path = Some(path.into());
        self
    }

    pub fn version(&mut self, version: impl Into<String>) -> &mut Self {
        self.version = Some(version.into());
        self
    }

    /// Later duplicates of the same key replace earlier ones.
    pub fn header(&mut self, key: &str, value: impl Into<String>) -> &mut Self {
        self.headers.insert(key.to_ascii_lowercase(), value.into());
        self
    }

    pub fn body(&mut self, body: impl Into<Bytes>) -> &mut Self {
        self.body = Some(body.into());
        self
    }
}
