//! Clan membership predicate.
//!
//! Maternal generation inheritance and orphan detection only apply inside
//! the tracked family line. Spouses marrying in are recorded but are not
//! expected to be connected, so the test is injectable rather than baked
//! into the engine.

use std::sync::Arc;

use crate::models::Individual;

/// Decides whether an individual belongs to the tracked family line.
pub trait ClanMembership: Send + Sync {
    fn is_member(&self, individual: &Individual) -> bool;
}

/// Membership by surname substring (e.g. every surname containing "Đặng").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurnameContains(pub String);

impl ClanMembership for SurnameContains {
    fn is_member(&self, individual: &Individual) -> bool {
        individual.surname.contains(self.0.as_str())
    }
}

impl<F> ClanMembership for F
where
    F: Fn(&Individual) -> bool + Send + Sync,
{
    fn is_member(&self, individual: &Individual) -> bool {
        self(individual)
    }
}

/// Shared, type-erased clan predicate.
pub type Clan = Arc<dyn ClanMembership>;

/// Builds the default surname predicate.
pub fn surname_contains(fragment: impl Into<String>) -> Clan {
    Arc::new(SurnameContains(fragment.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(surname: &str) -> Individual {
        let mut p = Individual::new("X");
        p.surname = surname.to_string();
        p
    }

    #[test]
    fn test_surname_contains() {
        let clan = surname_contains("Đặng");
        assert!(clan.is_member(&person("Đặng")));
        assert!(clan.is_member(&person("Đặng Văn")));
        assert!(!clan.is_member(&person("Nguyễn")));
        assert!(!clan.is_member(&person("")));
    }

    #[test]
    fn test_closure_predicate() {
        let clan: Clan = Arc::new(|p: &Individual| p.phai.is_some());
        let mut member = person("Lê");
        member.phai = Some("Nhất".to_string());
        assert!(clan.is_member(&member));
        assert!(!clan.is_member(&person("Lê")));
    }
}
