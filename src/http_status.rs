/// Standard status codes the server knows how to name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpStatus {
    // 1XX
    Continue = 100,
    SwitchingProtocols = 101,
    Processing = 102,
    EarlyHints = 103,

    // 2XX
    OK = 200,
    Created = 201,
    Accepted = 202,
    NonAuthoritativeInformation = 203,
    NoContent = 204,
    ResetContent = 205,
    PartialContent = 206,
    MultiStatus = 207,
    AlreadyReported = 208,
    ImUsed = 226,

    // 3XX
    MultipleChoices = 300,
    MovedPermanently = 301,
    Found = 302,
    SeeOther = 303,
    NotModified = 304,
    UseProxy = 305,
    TemporaryRedirect = 307,
    PermanentRedirect = 308,

    // 4XX
    BadRequest = 400,
    Unauthorized = 401,
    PaymentRequired = 402,
    Forbidden = 403,
    NotFound = 404,
    MethodNotAllowed = 405,
    NotAcceptable = 406,
    ProxyAuthenticationRequired = 407,
    RequestTimeout = 408,
    Conflict = 409,
    Gone = 410,
    LengthRequired = 411,
    PreconditionFailed = 412,
    PayloadTooLarge = 413,
    UriTooLong = 414,
    UnsupportedMediaType = 415,
    RangeNotSatisfiable = 416,
    ExpectationFailed = 417,
    ImATeapot = 418,
    MisdirectedRequest = 421,
    UnprocessableEntity = 422,
    Locked = 423,
    FailedDependency = 424,
    TooEarly = 425,
    UpgradeRequired = 426,
    PreconditionRequired = 428,
    TooManyRequests = 429,
    RequestHeaderFieldsTooLarge = 431,
    UnavailableForLegalReasons = 451,

    // 5XX
    InternalServerError = 500,
    NotImplemented = 501,
    BadGateway = 502,
    ServiceUnavailable = 503,
    GatewayTimeout = 504,
    HttpVersionNotSupported = 505,
    VariantAlsoNegotiates = 506,
    InsufficientStorage = 507,
    LoopDetected = 508,
    NotExtended = 510,
    NetworkAuthenticationRequired = 511,
}

const ALL: [HttpStatus; 62] = [
    HttpStatus::Continue,
    HttpStatus::SwitchingProtocols,
    HttpStatus::Processing,
    HttpStatus::EarlyHints,
    HttpStatus::OK,
    HttpStatus::Created,
    HttpStatus::Accepted,
    HttpStatus::NonAuthoritativeInformation,
    HttpStatus::NoContent,
    HttpStatus::ResetContent,
    HttpStatus::PartialContent,
    HttpStatus::MultiStatus,
    HttpStatus::AlreadyReported,
    HttpStatus::ImUsed,
    HttpStatus::MultipleChoices,
    HttpStatus::MovedPermanently,
    HttpStatus::Found,
    HttpStatus::SeeOther,
    HttpStatus::NotModified,
    HttpStatus::UseProxy,
    HttpStatus::TemporaryRedirect,
    HttpStatus::PermanentRedirect,
    HttpStatus::BadRequest,
    HttpStatus::Unauthorized,
    HttpStatus::PaymentRequired,
    HttpStatus::Forbidden,
    HttpStatus::NotFound,
    HttpStatus::MethodNotAllowed,
    HttpStatus::NotAcceptable,
    HttpStatus::ProxyAuthenticationRequired,
    HttpStatus::RequestTimeout,
    HttpStatus::Conflict,
    HttpStatus::Gone,
    HttpStatus::LengthRequired,
    HttpStatus::PreconditionFailed,
    HttpStatus::PayloadTooLarge,
    HttpStatus::UriTooLong,
    HttpStatus::UnsupportedMediaType,
    HttpStatus::RangeNotSatisfiable,
    HttpStatus::ExpectationFailed,
    HttpStatus::ImATeapot,
    HttpStatus::MisdirectedRequest,
    HttpStatus::UnprocessableEntity,
    HttpStatus::Locked,
    HttpStatus::FailedDependency,
    HttpStatus::TooEarly,
    HttpStatus::UpgradeRequired,
    HttpStatus::PreconditionRequired,
    HttpStatus::TooManyRequests,
    HttpStatus::RequestHeaderFieldsTooLarge,
    HttpStatus::UnavailableForLegalReasons,
    HttpStatus::InternalServerError,
    HttpStatus::NotImplemented,
    HttpStatus::BadGateway,
    HttpStatus::ServiceUnavailable,
    HttpStatus::GatewayTimeout,
    HttpStatus::HttpVersionNotSupported,
    HttpStatus::VariantAlsoNegotiates,
    HttpStatus::InsufficientStorage,
    HttpStatus::LoopDetected,
    HttpStatus::NotExtended,
    HttpStatus::NetworkAuthenticationRequired,
];

impl HttpStatus {
    pub fn code(self) -> u16 {
        self as u16
    }

    pub fn reason(self) -> &'static str {
        match self {
            HttpStatus::Continue => "Continue",
            HttpStatus::SwitchingProtocols => "Switching Protocols",
            HttpStatus::Processing => "Processing",
            HttpStatus::EarlyHints => "Early Hints",
            HttpStatus::OK => "OK",
            HttpStatus::Created => "Created",
            HttpStatus::Accepted => "Accepted",
            HttpStatus::NonAuthoritativeInformation => "Non-Authoritative Information",
            HttpStatus::NoContent => "No Content",
            HttpStatus::ResetContent => "Reset Content",
            HttpStatus::PartialContent => "Partial Content",
            HttpStatus::MultiStatus => "Multi-Status",
            HttpStatus::AlreadyReported => "Already Reported",
            HttpStatus::ImUsed => "IM Used",
            HttpStatus::MultipleChoices => "Multiple Choices",
            HttpStatus::MovedPermanently => "Moved Permanently",
            HttpStatus::Found => "Found",
            HttpStatus::SeeOther => "See Other",
            HttpStatus::NotModified => "Not Modified",
            HttpStatus::UseProxy => "Use Proxy",
            HttpStatus::TemporaryRedirect => "Temporary Redirect",
            HttpStatus::PermanentRedirect => "Permanent Redirect",
            HttpStatus::BadRequest => "Bad Request",
            HttpStatus::Unauthorized => "Unauthorized",
            HttpStatus::PaymentRequired => "Payment Required",
            HttpStatus::Forbidden => "Forbidden",
            HttpStatus::NotFound => "Not Found",
            HttpStatus::MethodNotAllowed => "Method Not Allowed",
            HttpStatus::NotAcceptable => "Not Acceptable",
            HttpStatus::ProxyAuthenticationRequired => "Proxy Authentication Required",
            HttpStatus::RequestTimeout => "Request Timeout",
            HttpStatus::Conflict => "Conflict",
            HttpStatus::Gone => "Gone",
            HttpStatus::LengthRequired => "Length Required",
            HttpStatus::PreconditionFailed => "Precondition Failed",
            HttpStatus::PayloadTooLarge => "Payload Too Large",
            HttpStatus::UriTooLong => "URI Too Long",
            HttpStatus::UnsupportedMediaType => "Unsupported Media Type",
            HttpStatus::RangeNotSatisfiable => "Range Not Satisfiable",
            HttpStatus::ExpectationFailed => "Expectation Failed",
            HttpStatus::ImATeapot => "I'm a teapot",
            HttpStatus::MisdirectedRequest => "Misdirected Request",
            HttpStatus::UnprocessableEntity => "Unprocessable Entity",
            HttpStatus::Locked => "Locked",
            HttpStatus::FailedDependency => "Failed Dependency",
            HttpStatus::TooEarly => "Too Early",
            HttpStatus::UpgradeRequired => "Upgrade Required",
            HttpStatus::PreconditionRequired => "Precondition Required",
            HttpStatus::TooManyRequests => "Too Many Requests",
            HttpStatus::RequestHeaderFieldsTooLarge => "Request Header Fields Too Large",
            HttpStatus::UnavailableForLegalReasons => "Unavailable For Legal Reasons",
            HttpStatus::InternalServerError => "Internal Server Error",
            HttpStatus::NotImplemented => "Not Implemented",
            HttpStatus::BadGateway => "Bad Gateway",
            HttpStatus::ServiceUnavailable => "Service Unavailable",
            HttpStatus::GatewayTimeout => "Gateway Timeout",
            HttpStatus::HttpVersionNotSupported => "HTTP Version Not Supported",
            HttpStatus::VariantAlsoNegotiates => "Variant Also Negotiates",
            HttpStatus::InsufficientStorage => "Insufficient Storage",
            HttpStatus::LoopDetected => "Loop Detected",
            HttpStatus::NotExtended => "Not Extended",
            HttpStatus::NetworkAuthenticationRequired => "Network Authentication Required",
        }
    }

    pub fn from_code(code: u16) -> Option<HttpStatus> {
        ALL.iter().copied().find(|status| status.code() == code)
    }
}

/// `"<code> <reason>"` for the status line. Unknown codes are reported as 500.
pub fn status_line(code: u16) -> String {
    let status = HttpStatus::from_code(code).unwrap_or(HttpStatus::InternalServerError);
    format!("{} {}", status.code(), status.reason())
}

impl From<HttpStatus> for u16 {
    fn from(value: HttpStatus) -> Self {
        value.code()
    }
}
