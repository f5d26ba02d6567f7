use std::fmt;

/// Who is releasing a claimed item back to the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseActor {
    /// The reviewer holding the claim.
    Reviewer(String),
    /// An administrator overriding someone else's claim.
    Admin(String),
}

impl ReleaseActor {
    pub fn id(&self) -> &str {
        match self {
            ReleaseActor::Reviewer(id) | ReleaseActor::Admin(id) => id,
        }
    }
}

impl fmt::Display for ReleaseActor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReleaseActor::Reviewer(id) => write!(f, "{id}"),
            ReleaseActor::Admin(id) => write!(f, "admin:{id}"),
        }
    }
}
