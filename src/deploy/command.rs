//! Deploy command construction.

use std::fmt;

use crate::config::DeploymentDescriptor;

/// A fully resolved external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl DeployCommand {
    /// `asadmin deploy --force <bool> --contextroot <root> --name <name> <archive>`
    pub fn from_descriptor(descriptor: &DeploymentDescriptor) -> Self {
        Self {
            program: descriptor.program.clone(),
            args: vec![
                "deploy".to_string(),
                "--force".to_string(),
                descriptor.force.to_string(),
                "--contextroot".to_string(),
                descriptor.context_root.clone(),
                "--name".to_string(),
                descriptor.name.clone(),
                descriptor.archive_path.clone(),
            ],
        }
    }
}

impl fmt::Display for DeployCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}
