//! Provider-facing resolvers (endpoints + response hooks) and the Keycloak specialization.
//!
//! `resolver` defines [`EndpointResolver`], the HTTP-client-agnostic seam the core client
//! uses to locate endpoints and interpret provider responses. `keycloak` implements it for
//! realm-scoped Keycloak servers and adds logout, introspection, and userinfo decoding.

pub mod keycloak;
pub mod resolver;

pub use keycloak::*;
pub use resolver::*;
