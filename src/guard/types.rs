//! Guard decision outcomes

/// What the request-path hook did to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectOutcome {
    /// URI outside the protected target; request untouched.
    OutOfScope,
    /// The login call itself; never injected or intercepted.
    LoginEndpoint,
    /// No credential could be obtained; the request proceeds
    /// unauthenticated and login is retried on the next eligible
    /// request.
    Unauthenticated,
    /// The request headers carry the session credential.
    Injected,
}

/// What the response-path hook concluded from a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseOutcome {
    /// URI outside the protected target; nothing inspected.
    OutOfScope,
    /// Response to the login call itself; exempt from invalidation.
    LoginEndpoint,
    /// No invalidation signal; the cached credential is kept.
    Kept,
    /// The cached credential was dropped; the next eligible request
    /// re-authenticates instead of retrying a rejected credential.
    Invalidated(InvalidationReason),
}

/// Why a cached credential was dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidationReason {
    /// The target answered 401 or 403.
    Rejected {
        /// The response status code
        status: u16,
    },
    /// A redirect pointed back into the login flow.
    LoginRedirect {
        /// The redirect target
        location: String,
    },
}
