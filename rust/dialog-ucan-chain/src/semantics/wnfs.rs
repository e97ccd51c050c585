//! Leveled access to public WNFS paths.
//!
//! A capability is encoded as
//! `{ "wnfs": "<user>/public/<path...>", "cap": "<LEVEL>" }`, for example
//! `{ "wnfs": "alice/public/photos", "cap": "OVERWRITE" }`. Access to a
//! directory covers everything under it, and every level includes the ones
//! below it.

use crate::capability::{Capability, CapabilitySemantics, DelegationOutcome};
use ipld_core::ipld::Ipld;
use std::{fmt, str::FromStr};

const PUBLIC: &str = "public";

/// Access levels, weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WnfsLevel {
    /// Add new revisions.
    Revise,
    /// Mark entries deleted while keeping history.
    SoftDelete,
    /// Replace history.
    Overwrite,
    /// Everything.
    SuperUser,
}

impl WnfsLevel {
    /// The name used on the wire.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Revise => "REVISE",
            Self::SoftDelete => "SOFT_DELETE",
            Self::Overwrite => "OVERWRITE",
            Self::SuperUser => "SUPER_USER",
        }
    }
}

impl FromStr for WnfsLevel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "REVISE" => Ok(Self::Revise),
            "SOFT_DELETE" => Ok(Self::SoftDelete),
            "OVERWRITE" => Ok(Self::Overwrite),
            "SUPER_USER" => Ok(Self::SuperUser),
            _ => Err(()),
        }
    }
}

impl fmt::Display for WnfsLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Access at `level` to `path` in `user`'s public file system.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WnfsPublicCapability {
    /// Owner of the file system.
    pub user: String,
    /// Path segments below `public`. Empty means the whole public tree.
    pub path: Vec<String>,
    /// Granted level.
    pub level: WnfsLevel,
}

impl WnfsPublicCapability {
    /// Builds a capability from a `/`-separated `path` below `public`.
    pub fn new(user: impl Into<String>, path: &str, level: WnfsLevel) -> Self {
        Self {
            user: user.into(),
            path: segments(path),
            level,
        }
    }

    fn resource(&self) -> String {
        let mut resource = format!("{}/{PUBLIC}", self.user);
        for segment in &self.path {
            resource.push('/');
            resource.push_str(segment);
        }
        resource
    }
}

impl From<WnfsPublicCapability> for Capability {
    fn from(capability: WnfsPublicCapability) -> Self {
        Capability::new()
            .with("wnfs", Ipld::String(capability.resource()))
            .with_str("cap", capability.level.as_str())
    }
}

fn segments(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(String::from)
        .collect()
}

/// [`CapabilitySemantics`] for [`WnfsPublicCapability`].
#[derive(Debug, Clone, Copy, Default)]
pub struct WnfsPublicSemantics;

impl CapabilitySemantics<WnfsPublicCapability> for WnfsPublicSemantics {
    fn try_parsing(&self, capability: &Capability) -> Option<WnfsPublicCapability> {
        let level = capability.get_str("cap")?.parse().ok()?;
        let (user, rest) = capability.get_str("wnfs")?.split_once('/')?;
        if user.is_empty() {
            return None;
        }

        let path = match rest.split_once('/') {
            Some((PUBLIC, path)) => path,
            None if rest == PUBLIC => "",
            _ => return None,
        };

        Some(WnfsPublicCapability::new(user, path, level))
    }

    fn try_delegating(
        &self,
        parent: &WnfsPublicCapability,
        child: &WnfsPublicCapability,
    ) -> DelegationOutcome<WnfsPublicCapability> {
        if parent.user != child.user {
            return DelegationOutcome::Unrelated;
        }

        if child.path.starts_with(&parent.path) {
            if child.level > parent.level {
                return DelegationOutcome::escalation(
                    format!("{} exceeds the delegated {}", child.level, parent.level),
                    child.clone(),
                );
            }
            return DelegationOutcome::Granted(child.clone());
        }

        if parent.path.starts_with(&child.path) {
            return DelegationOutcome::escalation(
                format!("{} is above the delegated {}", child.resource(), parent.resource()),
                child.clone(),
            );
        }

        DelegationOutcome::Unrelated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use super::WnfsLevel::*;

    fn wnfs(user: &str, path: &str, level: WnfsLevel) -> WnfsPublicCapability {
        WnfsPublicCapability::new(user, path, level)
    }

    #[test]
    fn it_parses_resources_and_levels() {
        let raw = Capability::new()
            .with_str("wnfs", "alice/public/photos/vacation")
            .with_str("cap", "SOFT_DELETE");

        assert_eq!(
            WnfsPublicSemantics.try_parsing(&raw),
            Some(wnfs("alice", "photos/vacation", SoftDelete))
        );
    }

    #[test]
    fn it_parses_the_public_root() {
        let raw = Capability::new()
            .with_str("wnfs", "alice/public")
            .with_str("cap", "SUPER_USER");

        assert_eq!(
            WnfsPublicSemantics.try_parsing(&raw),
            Some(wnfs("alice", "", SuperUser))
        );
    }

    #[test]
    fn it_rejects_private_paths_and_unknown_levels() {
        let private = Capability::new()
            .with_str("wnfs", "alice/private/photos")
            .with_str("cap", "REVISE");
        let unknown = Capability::new()
            .with_str("wnfs", "alice/public/photos")
            .with_str("cap", "OWN");
        let anonymous = Capability::new()
            .with_str("wnfs", "/public/photos")
            .with_str("cap", "REVISE");

        assert_eq!(WnfsPublicSemantics.try_parsing(&private), None);
        assert_eq!(WnfsPublicSemantics.try_parsing(&unknown), None);
        assert_eq!(WnfsPublicSemantics.try_parsing(&anonymous), None);
    }

    #[test]
    fn it_parses_what_it_encodes() {
        let capability = wnfs("alice", "photos/vacation", Overwrite);
        assert_eq!(
            WnfsPublicSemantics.try_parsing(&capability.clone().into()),
            Some(capability)
        );
    }

    #[test]
    fn it_grants_narrower_paths_and_levels() {
        let parent = wnfs("alice", "photos", Overwrite);
        let child = wnfs("alice", "photos/vacation", Revise);

        assert_eq!(
            WnfsPublicSemantics.try_delegating(&parent, &child),
            DelegationOutcome::Granted(child.clone())
        );
        assert_eq!(
            WnfsPublicSemantics.try_delegating(&parent, &parent),
            DelegationOutcome::Granted(parent.clone())
        );
    }

    #[test]
    fn it_flags_higher_levels() {
        let parent = wnfs("alice", "photos", SoftDelete);
        let child = wnfs("alice", "photos/vacation", SuperUser);

        let outcome = WnfsPublicSemantics.try_delegating(&parent, &child);
        assert!(matches!(
            outcome,
            DelegationOutcome::Escalation(ref escalation) if escalation.capability == child
        ));
    }

    #[test]
    fn it_flags_wider_paths() {
        let parent = wnfs("alice", "photos/vacation", SuperUser);
        let child = wnfs("alice", "photos", Revise);

        assert!(matches!(
            WnfsPublicSemantics.try_delegating(&parent, &child),
            DelegationOutcome::Escalation(_)
        ));
    }

    #[test]
    fn it_ignores_other_users_and_sibling_paths() {
        let parent = wnfs("alice", "photos", SuperUser);

        assert_eq!(
            WnfsPublicSemantics.try_delegating(&parent, &wnfs("bob", "photos", Revise)),
            DelegationOutcome::Unrelated
        );
        assert_eq!(
            WnfsPublicSemantics.try_delegating(&parent, &wnfs("alice", "music", Revise)),
            DelegationOutcome::Unrelated
        );
    }

    #[test]
    fn it_compares_whole_segments() {
        let parent = wnfs("alice", "photo", SuperUser);
        let child = wnfs("alice", "photos", Revise);

        assert_eq!(
            WnfsPublicSemantics.try_delegating(&parent, &child),
            DelegationOutcome::Unrelated
        );
    }
}
