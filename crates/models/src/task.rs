use serde::{Deserialize, Serialize};

use crate::errors::{FieldErrors, ModelError};
use crate::resource::Resource;
use crate::validation::{decode, optional_bool, require_text, Fields};

/// Task-manager record. Unknown fields are kept in `extra` and stored as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(flatten)]
    pub extra: Fields,
}

impl Resource for Task {
    const COLLECTION: &'static str = "tasks";
    const LABEL: &'static str = "Task";

    fn validate(fields: Fields) -> Result<Self, ModelError> {
        let mut errors = FieldErrors::new();
        require_text(&fields, "title", &mut errors);
        optional_bool(&fields, "completed", &mut errors);
        decode(fields, errors)
    }
}
