//! Request hooks
//!
//! Hooks observe every submission without altering it. Pre-request hooks
//! run before the request is signed and dispatched; post-request hooks run
//! with the response before it is interpreted. Both run even when the
//! response turns out to be an error.
//!
//! Hooks are registered on the [`ApiClient`](crate::ApiClient) before it is
//! used; there is no removal API.
//!
//! # Example
//!
//! ```
//! use kraken_rest::hooks::Hooks;
//!
//! let hooks = Hooks::new()
//!     .on_pre_request(|ctx| {
//!         println!("{} {}", ctx.method, ctx.path);
//!     })
//!     .on_post_request(|response, ctx| {
//!         println!("{} -> {}", ctx.path, response.status);
//!     });
//! assert_eq!(hooks.len(), 2);
//! ```

use serde_json::{Map as JsonMap, Value as JsonValue};
use std::fmt;
use std::sync::Arc;

use crate::transport::{HttpResponse, Method};

/// Everything the pipeline knows about a request when hooks run
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub method: Method,
    /// Endpoint path, without base URL or query string
    pub path: String,
    /// Body fields, including the injected nonce
    pub body: JsonMap<String, JsonValue>,
    pub query: JsonMap<String, JsonValue>,
    /// Headers; post-request hooks also see the authentication headers
    pub headers: Vec<(String, String)>,
    pub files: Vec<JsonValue>,
    pub authenticate: bool,
}

/// Type alias for hook callbacks
pub type PreRequestHook = Arc<dyn Fn(&RequestContext) + Send + Sync>;
pub type PostRequestHook = Arc<dyn Fn(&HttpResponse, &RequestContext) + Send + Sync>;

/// Ordered hook lists
#[derive(Clone, Default)]
pub struct Hooks {
    pre_request: Vec<PreRequestHook>,
    post_request: Vec<PostRequestHook>,
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("pre_request", &self.pre_request.len())
            .field("post_request", &self.post_request.len())
            .finish()
    }
}

impl Hooks {
    /// Create a new empty hooks container
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a pre-request hook
    pub fn on_pre_request<F>(mut self, f: F) -> Self
    where
        F: Fn(&RequestContext) + Send + Sync + 'static,
    {
        self.add_pre_request(f);
        self
    }

    /// Append a post-request hook
    pub fn on_post_request<F>(mut self, f: F) -> Self
    where
        F: Fn(&HttpResponse, &RequestContext) + Send + Sync + 'static,
    {
        self.add_post_request(f);
        self
    }

    pub fn add_pre_request<F>(&mut self, f: F)
    where
        F: Fn(&RequestContext) + Send + Sync + 'static,
    {
        self.pre_request.push(Arc::new(f));
    }

    pub fn add_post_request<F>(&mut self, f: F)
    where
        F: Fn(&HttpResponse, &RequestContext) + Send + Sync + 'static,
    {
        self.post_request.push(Arc::new(f));
    }

    /// Total number of registered hooks
    pub fn len(&self) -> usize {
        self.pre_request.len() + self.post_request.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn run_pre_request(&self, ctx: &RequestContext) {
        for hook in &self.pre_request {
            hook(ctx);
        }
    }

    pub(crate) fn run_post_request(&self, response: &HttpResponse, ctx: &RequestContext) {
        for hook in &self.post_request {
            hook(response, ctx);
        }
    }
}
