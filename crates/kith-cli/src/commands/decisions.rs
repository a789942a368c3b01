// Decision commands
//
// Each one resolves the presented credential first, exactly as a request
// handler would.

use super::describe_failure;
use crate::context::CliContext;
use anyhow::{anyhow, Result};
use kith_core::{EntryId, UserName};

/// Name of the user holding `credential`.
pub fn whoami(ctx: &CliContext, credential: Option<&str>) -> Result<String> {
    ctx.service
        .whoami(credential)
        .map(|name| name.to_string())
        .map_err(|e| anyhow!(describe_failure(&e)))
}

/// Content of `entry`, read as the holder of `credential`.
pub fn read_entry(ctx: &CliContext, credential: Option<&str>, entry: &str) -> Result<String> {
    ctx.service
        .read_entry(credential, &EntryId::from(entry))
        .map_err(|e| anyhow!(describe_failure(&e)))
}

/// Send a friend request from the holder of `credential` to `name`.
pub fn friend_request(ctx: &CliContext, credential: Option<&str>, name: &str) -> Result<String> {
    let outcome = ctx
        .service
        .send_friend_request(credential, &UserName::from(name))
        .map_err(|e| anyhow!(describe_failure(&e)))?;

    Ok(if outcome.appended {
        format!("friend request sent to {}", outcome.target)
    } else {
        format!("friend request to {} already pending", outcome.target)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> CliContext {
        CliContext::reference()
    }

    #[test]
    fn test_whoami() {
        assert_eq!(whoami(&context(), Some("Bearer 789")).unwrap(), "Charlie");
        let err = whoami(&context(), Some("789")).unwrap_err().to_string();
        assert!(err.starts_with("malformed_credential (400)"), "{err}");
    }

    #[test]
    fn test_read_entry() {
        let ctx = context();
        assert_eq!(read_entry(&ctx, Some("Bearer 456"), "2").unwrap(), "I have a secret to tell...");
        let err = read_entry(&ctx, Some("Bearer 456"), "1").unwrap_err().to_string();
        assert!(err.starts_with("denied (401)"), "{err}");
    }

    #[test]
    fn test_friend_request() {
        let ctx = context();
        assert_eq!(
            friend_request(&ctx, Some("Bearer 123"), "Edward").unwrap(),
            "friend request sent to Edward"
        );
        let err = friend_request(&ctx, Some("Bearer 123"), "Nobody").unwrap_err().to_string();
        assert!(err.starts_with("not_found (404)"), "{err}");
    }
}
