//! Provider lookup table

use heaven_core::domain::deployment::DeploymentRequest;

use super::{Capabilities, ElasticBeanstalk, Provider, ProviderSettings};
use crate::error::ProviderError;

/// Builds a provider for one run
pub type ProviderConstructor = fn(
    DeploymentRequest,
    Capabilities,
    ProviderSettings,
) -> Result<Box<dyn Provider>, ProviderError>;

static PROVIDERS: &[(&str, ProviderConstructor)] = &[(
    ElasticBeanstalk::NAME,
    ElasticBeanstalk::boxed as ProviderConstructor,
)];

/// Finds the constructor registered under `name`
pub fn lookup(name: &str) -> Option<ProviderConstructor> {
    PROVIDERS
        .iter()
        .find(|(registered, _)| *registered == name)
        .map(|(_, constructor)| *constructor)
}

/// Builds the provider registered under `name`
pub fn build(
    name: &str,
    request: DeploymentRequest,
    capabilities: Capabilities,
    settings: ProviderSettings,
) -> Result<Box<dyn Provider>, ProviderError> {
    let constructor = lookup(name).ok_or_else(|| ProviderError::UnknownProvider(name.to_string()))?;
    constructor(request, capabilities, settings)
}

/// Names of all registered providers
pub fn names() -> impl Iterator<Item = &'static str> {
    PROVIDERS.iter().map(|(name, _)| *name)
}
