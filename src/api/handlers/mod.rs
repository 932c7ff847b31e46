//! REST endpoint handlers organized by resource.

pub mod common;
pub mod contracts;
pub mod datatypes;
pub mod messages;
pub mod system;
pub mod tokens;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes under `/api`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(common::routes())
        .merge(messages::routes())
        .merge(tokens::routes())
        .merge(contracts::routes())
        .merge(datatypes::routes())
}
