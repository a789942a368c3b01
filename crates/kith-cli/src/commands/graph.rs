// Friendship graph inspection

use crate::context::CliContext;
use anyhow::{bail, Result};
use kith_core::UserName;
use kith_social::{path_between, FriendshipGraph};
use kith_store::IdentityStore;

/// Shortest chain of friendships between two users, rendered as
/// `A -> B -> C`, or a note that none exists.
pub fn connected(ctx: &CliContext, from: &str, to: &str) -> Result<String> {
    let graph = FriendshipGraph::from_users(&ctx.store.users());
    let (from, to) = (UserName::from(from), UserName::from(to));
    for name in [&from, &to] {
        if !graph.contains(name) {
            bail!("unknown user {name}");
        }
    }

    Ok(match path_between(&from, &to, &graph) {
        Some(path) => path
            .iter()
            .map(UserName::as_str)
            .collect::<Vec<_>>()
            .join(" -> "),
        None => format!("{from} and {to} are not connected"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connected_renders_path() {
        let ctx = CliContext::reference();
        assert_eq!(
            connected(&ctx, "Alice", "Edward").unwrap(),
            "Alice -> Bob -> Charlie -> Edward"
        );
        assert_eq!(
            connected(&ctx, "Alice", "Dennis").unwrap(),
            "Alice and Dennis are not connected"
        );
        assert!(connected(&ctx, "Alice", "Mallory").is_err());
    }
}
