/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Template catalog errors.

use thiserror::Error;

/// Errors raised while loading or validating a template catalog.
#[derive(Debug, Error)]
pub enum DictionaryError {
    /// Catalog JSON could not be parsed.
    #[error("invalid catalog json: {0}")]
    Json(#[from] serde_json::Error),

    /// Catalog file could not be read.
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    /// Two templates share an id.
    #[error("duplicate template id: {0}")]
    DuplicateTemplate(u32),

    /// A Constant field has no constant value.
    #[error("template {template_id}: constant field {field_id} has no value")]
    MissingConstant {
        /// Template id.
        template_id: u32,
        /// Field id.
        field_id: u32,
    },

    /// A field combines a wire type and operator that cannot work together.
    #[error("template {template_id}: field {field_id}: {reason}")]
    InvalidField {
        /// Template id.
        template_id: u32,
        /// Field id.
        field_id: u32,
        /// Why the descriptor is rejected.
        reason: String,
    },
}
