//! Fixed literals of the GraphQL multipart protocols.
//!
//! None of these change at runtime; protocol variants only choose between them.

/// Separator between data lines inside one part (an empty line).
pub const DATA_LINE_SEPARATOR: &str = "\r\n\r\n";

/// Keep-alive line sent periodically by subscription servers.
pub const HEARTBEAT: &str = "{}";

/// Case-sensitive prefix of a part's content type line.
pub const CONTENT_TYPE_PREFIX: &str = "content-type:";

/// The only content type accepted for a part.
pub const APPLICATION_JSON: &str = "application/json";

/// Media type of a multipart response.
pub const MULTIPART_MIXED: &str = "multipart/mixed";

/// Boundary advertised in the `Accept` header.
pub const DEFAULT_BOUNDARY: &str = "graphql";

/// Negotiation tokens carried as `Content-Type` parameters.
pub mod specs {
    /// Incremental delivery (`@defer`) of a single operation
    pub const DEFER: &str = "deferSpec=20220824";
    /// Subscription events over a long-lived response
    pub const SUBSCRIPTION: &str = "subscriptionSpec=1.0";
}

/// JSON keys recognized inside a part.
pub mod keys {
    /// Array of GraphQL error objects
    pub const ERRORS: &str = "errors";
    /// Message of a GraphQL error object
    pub const MESSAGE: &str = "message";
    /// Subscription event body
    pub const PAYLOAD: &str = "payload";
    /// Operation result data
    pub const DATA: &str = "data";
    /// Deferred fragment results
    pub const INCREMENTAL: &str = "incremental";
    /// Whether more parts follow
    pub const HAS_NEXT: &str = "hasNext";
    /// Protocol extensions attached to a result
    pub const EXTENSIONS: &str = "extensions";
}

/// HTTP header names used during negotiation.
pub mod headers {
    use http::header::HeaderName;

    /// `Accept`
    pub const ACCEPT: HeaderName = http::header::ACCEPT;
    /// `Content-Type`
    pub const CONTENT_TYPE: HeaderName = http::header::CONTENT_TYPE;
}
