//! Terraform configuration generation from API examples.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info};

use armtf_core::{transform, ResourceId, TransformRules};

use crate::error::{IacError, IacResult};
use crate::example::ApiExample;
use crate::hcl;

/// Label of the generated resource block, also the root path of its body.
pub const RESOURCE_LABEL: &str = "test";

/// File the configuration is written to.
pub const CONFIG_FILE: &str = "main.tf";

const PROVIDER_BLOCKS: &str = r#"terraform {
  required_providers {
    azapi = {
      source = "Azure/azapi"
    }
  }
}

provider "azapi" {
}
"#;

/// An `azapi_resource` block.
#[derive(Debug, Clone, PartialEq)]
pub struct AzapiResource {
    pub label: String,
    pub resource_type: String,
    pub api_version: String,
    pub name: String,
    pub parent_id: String,
    pub body: Value,
}

impl AzapiResource {
    /// Render the resource block.
    pub fn render(&self, raw_payload: bool) -> String {
        let mut out = format!("resource \"azapi_resource\" {} {{\n", hcl::quote(&self.label));
        out.push_str(&format!(
            "  type      = {}\n",
            hcl::quote(&format!("{}@{}", self.resource_type, self.api_version))
        ));
        if !self.parent_id.is_empty() {
            out.push_str(&format!("  parent_id = {}\n", hcl::quote(&self.parent_id)));
        }
        out.push_str(&format!("  name      = {}\n", hcl::quote(&self.name)));

        if raw_payload {
            let json = serde_json::to_string_pretty(&self.body).unwrap_or_else(|_| "{}".to_string());
            out.push_str(&format!(
                "  body      = <<BODY\n{}\nBODY\n",
                hcl::escape_template(&json)
            ));
        } else {
            out.push_str(&format!("  body = jsonencode({})\n", hcl::render(&self.body, 1)));
        }

        out.push_str("}\n");
        out
    }
}

/// Generates Terraform configuration for the resource an example creates.
#[derive(Debug, Clone)]
pub struct ConfigGenerator {
    rules: TransformRules,
}

impl Default for ConfigGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigGenerator {
    /// Create a generator that strips the read-only envelope fields.
    pub fn new() -> Self {
        let rules = ["id", "name", "type"]
            .iter()
            .fold(TransformRules::new(), |rules, field| {
                rules.remove(format!("{}.{}", RESOURCE_LABEL, field))
            });
        Self { rules }
    }

    /// Layer user rules over the defaults.
    pub fn with_rules(mut self, rules: TransformRules) -> Self {
        self.rules.merge(rules);
        self
    }

    /// Build the resource block for an example.
    pub fn resource(&self, example: &ApiExample) -> IacResult<AzapiResource> {
        let id = example
            .resource_id()
            .ok_or_else(|| IacError::InvalidExample("no resource id in responses".to_string()))?;
        let resource_id = ResourceId::parse(&id)
            .ok_or_else(|| IacError::InvalidExample(format!("malformed resource id: {}", id)))?;
        let resource_type = resource_id
            .resource_type()
            .ok_or_else(|| IacError::InvalidExample(format!("cannot derive resource type from {}", id)))?;
        let api_version = example
            .api_version()
            .ok_or_else(|| IacError::InvalidExample("missing api-version parameter".to_string()))?;

        let empty = Value::Object(Default::default());
        let body = example.request_body().unwrap_or(&empty);
        let body = transform(body, &self.rules, RESOURCE_LABEL)
            .map(|body| body.into_owned())
            .unwrap_or_else(|| Value::Object(Default::default()));

        debug!("Generating {} {} under {:?}", resource_type, resource_id.name(), resource_id.parent_id());

        Ok(AzapiResource {
            label: RESOURCE_LABEL.to_string(),
            resource_type,
            api_version: api_version.to_string(),
            name: resource_id.name().to_string(),
            parent_id: resource_id.parent_id(),
            body,
        })
    }

    /// Render the full configuration file for an example.
    pub fn render(&self, example: &ApiExample, raw_payload: bool) -> IacResult<String> {
        let resource = self.resource(example)?;
        Ok(format!("{}\n{}", PROVIDER_BLOCKS, resource.render(raw_payload)))
    }

    /// Write the configuration into `working_dir`.
    pub fn write(
        &self,
        example: &ApiExample,
        working_dir: &Path,
        overwrite: bool,
        raw_payload: bool,
    ) -> IacResult<PathBuf> {
        let path = working_dir.join(CONFIG_FILE);
        if path.exists() && !overwrite {
            return Err(IacError::ConfigExists(path));
        }

        let content = self.render(example, raw_payload)?;
        fs::create_dir_all(working_dir)?;
        fs::write(&path, content)?;

        info!("Wrote Terraform configuration to {:?}", path);
        Ok(path)
    }
}
