//! GraphQL API mirroring the REST surface
//!
//! Queries and mutations are resolved against the same services as the REST
//! handlers, with the same role checks. The authenticated user, when the
//! request carries a valid transport token, is injected into the request
//! data by the HTTP handler.

mod schema;
mod types;

pub use schema::{build_schema, graphql_handler, LibrariumSchema};
