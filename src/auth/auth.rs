use crate::error::{CollabError, CollabResult};
use crate::models::Principal;

pub fn is_elevated(principal: &Principal) -> bool {
    principal.role.is_elevated()
}

pub fn ensure_elevated(principal: &Principal, denial: &str) -> CollabResult<()> {
    if is_elevated(principal) {
        return Ok(());
    }
    Err(CollabError::Forbidden(denial.to_string()))
}
