//! Target-user set.

use std::collections::HashSet;

/// The users whose skull reactions get replaced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Membership {
    users: HashSet<u64>,
}

impl Membership {
    pub fn new(users: impl IntoIterator<Item = u64>) -> Self {
        Self {
            users: users.into_iter().collect(),
        }
    }

    pub fn contains(&self, user_id: u64) -> bool {
        self.users.contains(&user_id)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
