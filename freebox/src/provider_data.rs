//! Provider data structure passed to resources and data sources

use crate::api::Client;
use std::any::Any;
use std::sync::Arc;
use tfplug::types::Diagnostic;

#[derive(Clone, Debug)]
pub struct FreeboxProviderData {
    pub client: Arc<Client>,
}

impl FreeboxProviderData {
    pub fn new(client: Client) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    /// Recovers the provider data handed to a resource or data source.
    /// `None` means the provider has not been configured yet, which is not an
    /// error until the instance needs the API.
    pub fn from_configure(
        provider_data: Option<Arc<dyn Any + Send + Sync>>,
    ) -> (Option<Self>, Vec<Diagnostic>) {
        match provider_data {
            Some(data) => match data.downcast_ref::<FreeboxProviderData>() {
                Some(provider_data) => (Some(provider_data.clone()), vec![]),
                None => (
                    None,
                    vec![Diagnostic::error(
                        "Invalid provider data",
                        "Expected FreeboxProviderData, the provider returned another type",
                    )],
                ),
            },
            None => (None, vec![]),
        }
    }
}

/// Diagnostic for an operation that needs the API before ConfigureProvider ran
pub fn not_configured() -> Diagnostic {
    Diagnostic::error(
        "Provider not configured",
        "Provider data was not properly configured",
    )
}
