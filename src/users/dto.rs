use serde::Deserialize;

use crate::validation::{non_empty, require, Validate, ValidationError};

/// Request body for user creation.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: Option<String>,
}

impl Validate for CreateUserRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        let name = require("name", self.name.as_ref())?;
        non_empty("name", name)
    }
}
