use std::fmt;
use std::str::FromStr;

/// Request method. Tokens outside the nine known names become `Unsupported`
/// instead of failing the parse.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    GET,
    POST,
    HEAD,
    PUT,
    DELETE,
    CONNECT,
    OPTIONS,
    TRACE,
    PATCH,
    Unsupported,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
            Method::HEAD => "HEAD",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
            Method::CONNECT => "CONNECT",
            Method::OPTIONS => "OPTIONS",
            Method::TRACE => "TRACE",
            Method::PATCH => "PATCH",
            Method::Unsupported => "UNSUPPORTED",
        }
    }

    /// Permissive lookup used by the request parser.
    pub fn from_token(token: &str) -> Method {
        token.parse().unwrap_or(Method::Unsupported)
    }
}

// From<&str> 대신 FromStr을 구현해서 "GET".parse()로 쓸 수 있게 한다.
impl FromStr for Method {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GET"     => Ok(Method::GET),
            "POST"    => Ok(Method::POST),
            "HEAD"    => Ok(Method::HEAD),
            "PUT"     => Ok(Method::PUT),
            "DELETE"  => Ok(Method::DELETE),
            "CONNECT" => Ok(Method::CONNECT),
            "OPTIONS" => Ok(Method::OPTIONS),
            "TRACE"   => Ok(Method::TRACE),
            "PATCH"   => Ok(Method::PATCH),
            _         => Err(()),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_methods_parse() {
        for name in ["GET", "POST", "HEAD", "PUT", "DELETE", "CONNECT", "OPTIONS", "TRACE", "PATCH"] {
            let method = Method::from_token(name);
            assert_ne!(method, Method::Unsupported);
            assert_eq!(method.as_str(), name);
        }
    }

    #[test]
    fn unknown_method_is_sentinel() {
        assert_eq!(Method::from_token("BREW"), Method::Unsupported);
        // method tokens are case-sensitive on the wire
        assert_eq!(Method::from_token("get"), Method::Unsupported);
    }
}
