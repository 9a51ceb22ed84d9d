//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (added by the binary)
//! 2. CORS (catalog pages may be hosted on another origin)
//! 3. `TraceLayer` (request span)
//! 4. Request ID (recorded into the request span)
//! 5. Body limit (uploads)

pub mod request_id;

pub use request_id::request_id_middleware;
