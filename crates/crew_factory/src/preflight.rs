//! Credential checks shared by orchestrators that call external services

use contracts::{ContractError, Credentials, RenderedCrew};
use tracing::debug;

/// Fail when a key the crew needs is absent
///
/// The inference key is always required; the search key only when some task
/// can use web search.
pub fn check_credentials(credentials: &Credentials, crew: &RenderedCrew) -> Result<(), ContractError> {
    credentials.require_inference_key()?;
    if crew.uses_search() {
        credentials.require_search_key()?;
    }
    debug!(crew = %crew.name, model = %credentials.model, "credentials present");
    Ok(())
}
