//! Data Transfer Objects for REST request/response serialization.
//!
//! Request DTOs know how to build the matching upstream body; response
//! DTOs pick the fields the sandbox UI shows out of upstream records.

pub mod common_dto;
pub mod contract_dto;
pub mod datatype_dto;
pub mod message_dto;
pub mod token_dto;

pub use common_dto::*;
pub use contract_dto::*;
pub use datatype_dto::*;
pub use message_dto::*;
pub use token_dto::*;
