use serenity::model::id::UserId;

/// Outcome of checking a command invoker against the configured owner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerCheck {
    Allowed,
    NotConfigured,
    Denied,
}

impl OwnerCheck {
    /// The refusal shown to the invoker, if any
    pub fn refusal(self) -> Option<&'static str> {
        match self {
            OwnerCheck::Allowed => None,
            OwnerCheck::NotConfigured => Some("Owner ID not configured."),
            OwnerCheck::Denied => Some("You do not have permission to use this command."),
        }
    }
}

pub fn check_owner(invoker: UserId, owner: Option<UserId>) -> OwnerCheck {
    match owner {
        None => OwnerCheck::NotConfigured,
        Some(owner) if owner == invoker => OwnerCheck::Allowed,
        Some(_) => OwnerCheck::Denied,
    }
}
