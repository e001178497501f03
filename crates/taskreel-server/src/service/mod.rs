// SPDX-License-Identifier: Apache-2.0

//! Core operations behind the HTTP surface. Every function takes the
//! resolved caller identity explicitly and returns `ApiError` on any
//! rule violation; handlers only translate to and from the wire.

use taskreel_api::ApiError;
use taskreel_store::StoreError;

pub mod tasks;
pub mod users;
pub mod videos;

pub(crate) fn store_err(e: StoreError) -> ApiError {
    ApiError::internal(format!("store failure: {e}"))
}
