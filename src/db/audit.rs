use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Identity and audit values applied to a row before it is written.
///
/// Every insert takes a fresh `Stamp` built from the acting user; updates and
/// tombstones reuse its `at`/`actor` for the `updated_*` and `deleted_*`
/// columns. Nothing reads the acting user from ambient request state.
#[derive(Debug, Clone, Copy)]
pub struct Stamp {
    pub id: Uuid,
    pub at: DateTime<Utc>,
    pub actor: Uuid,
}

impl Stamp {
    pub fn new(actor: Uuid) -> Self {
        Self {
            id: Uuid::now_v7(),
            at: Utc::now(),
            actor,
        }
    }

    /// A stamp for the next row of the same save: new identity, same time and actor.
    pub fn next(&self) -> Self {
        Self {
            id: Uuid::now_v7(),
            ..*self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_keeps_time_and_actor() {
        let actor = Uuid::now_v7();
        let first = Stamp::new(actor);
        let second = first.next();
        assert_ne!(first.id, second.id);
        assert_eq!(first.at, second.at);
        assert_eq!(second.actor, actor);
    }
}
