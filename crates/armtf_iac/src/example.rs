//! REST API example files.
//!
//! Examples follow the swagger `x-ms-examples` layout:
//!
//! ```json
//! {
//!   "parameters": { "api-version": "2022-01-01", "parameters": { "location": "westus" } },
//!   "responses": { "200": { "body": { "id": "/subscriptions/..." } } }
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use armtf_core::extract_response_id;

use crate::error::IacResult;

/// Status codes checked first when looking for the created resource.
const CREATED_STATUS_CODES: [&str; 2] = ["200", "201"];

/// A "create resource" request/response example.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiExample {
    #[serde(default)]
    pub parameters: Map<String, Value>,
    #[serde(default)]
    pub responses: Map<String, Value>,
}

impl ApiExample {
    /// Load an example from a JSON file.
    pub fn load(path: &Path) -> IacResult<Self> {
        debug!("Loading example from {:?}", path);
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> IacResult<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// The `api-version` request parameter.
    pub fn api_version(&self) -> Option<&str> {
        self.parameters.get("api-version").and_then(Value::as_str)
    }

    /// The request body: the first object-valued parameter.
    pub fn request_body(&self) -> Option<&Value> {
        self.parameters.values().find(|value| value.is_object())
    }

    /// Id of the created resource, taken from the success responses.
    pub fn resource_id(&self) -> Option<String> {
        let preferred = CREATED_STATUS_CODES
            .iter()
            .filter_map(|code| self.responses.get(*code));
        let others = self
            .responses
            .iter()
            .filter(|(code, _)| !CREATED_STATUS_CODES.contains(&code.as_str()))
            .map(|(_, response)| response);

        preferred
            .chain(others)
            .map(extract_response_id)
            .find(|id| !id.is_empty())
    }
}
