//! Recipient resolution: turns a [`TargetingMode`] into the concrete list of opted-in accounts.

use crate::directory::{self, AccountFilter, AccountSummary, DirectoryError, UserIdMatch};
use crate::entity::user::Role;
use sea_orm::DatabaseConnection;

/// Which accounts a role-based (bulk) alert goes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoleScope {
    Clients,
    All,
}

/// How the recipients of one alert are chosen.
///
/// Explicit targets bypass role filtering entirely; an explicitly targeted admin receives the
/// alert. The opt-in flag applies in every mode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TargetingMode {
    ExplicitSingle(i32),
    ExplicitMulti(Vec<i32>),
    RoleBased(RoleScope),
}

impl TargetingMode {
    pub fn filter(&self) -> AccountFilter {
        let base = AccountFilter::opted_in();
        match self {
            TargetingMode::ExplicitSingle(id) => base.with_user_ids(UserIdMatch::Exact(*id)),
            TargetingMode::ExplicitMulti(ids) => {
                base.with_user_ids(UserIdMatch::AnyOf(ids.clone()))
            }
            TargetingMode::RoleBased(RoleScope::Clients) => base.with_role(Role::Client),
            TargetingMode::RoleBased(RoleScope::All) => base,
        }
    }

    pub fn is_explicit(&self) -> bool {
        !matches!(self, TargetingMode::RoleBased(_))
    }
}

/// Resolves the eligible recipients for `mode`, in directory order.
///
/// An empty result is not an error; the caller reports zero counts.
#[tracing::instrument(skip(db))]
pub async fn resolve_recipients(
    db: &DatabaseConnection,
    mode: &TargetingMode,
) -> Result<Vec<AccountSummary>, DirectoryError> {
    let recipients = directory::find_accounts(db, &mode.filter()).await?;
    tracing::debug!(
        explicit = mode.is_explicit(),
        count = recipients.len(),
        "Resolved alert recipients"
    );
    Ok(recipients)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_mode_requires_opt_in() {
        for mode in [
            TargetingMode::ExplicitSingle(1),
            TargetingMode::ExplicitMulti(vec![1, 2]),
            TargetingMode::RoleBased(RoleScope::Clients),
            TargetingMode::RoleBased(RoleScope::All),
        ] {
            assert_eq!(mode.filter().email_alerts_enabled, Some(true), "{mode:?}");
        }
    }

    #[test]
    fn explicit_modes_skip_role_filter() {
        assert_eq!(TargetingMode::ExplicitSingle(3).filter().role, None);
        assert_eq!(TargetingMode::ExplicitMulti(vec![3]).filter().role, None);
    }

    #[test]
    fn role_modes() {
        let clients = TargetingMode::RoleBased(RoleScope::Clients).filter();
        assert_eq!(clients.role, Some(Role::Client));
        assert_eq!(clients.user_ids, None);

        let all = TargetingMode::RoleBased(RoleScope::All).filter();
        assert_eq!(all, AccountFilter::opted_in());
    }
}
