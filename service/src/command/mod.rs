//! [`Command`] definition.

pub mod create_chairs;
pub mod create_estates;
pub mod request_estate_document;
pub mod reset_data;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    create_chairs::CreateChairs, create_estates::CreateEstates,
    request_estate_document::RequestEstateDocument, reset_data::ResetData,
};
