use crate::application::ApplicationError;
use crate::domain::model::{Caller, Itinerary, Role};

/// 旅程の所有者であることを確認する
pub(crate) fn ensure_owner(caller: &Caller, itinerary: &Itinerary) -> Result<(), ApplicationError> {
    if !itinerary.is_owned_by(caller.user_id()) {
        return Err(ApplicationError::Forbidden(format!(
            "旅程の所有者ではありません: {}",
            itinerary.id()
        )));
    }
    Ok(())
}

/// 旅程の所有者または管理者であることを確認する
pub(crate) fn ensure_owner_or_admin(
    caller: &Caller,
    itinerary: &Itinerary,
) -> Result<(), ApplicationError> {
    if caller.is_administrator() {
        return Ok(());
    }
    ensure_owner(caller, itinerary)
}

/// 指定されたロールであることを確認する
pub(crate) fn ensure_role(caller: &Caller, role: Role) -> Result<(), ApplicationError> {
    if caller.role() != role {
        return Err(ApplicationError::Forbidden(format!(
            "この操作には{}ロールが必要です",
            role
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{ItineraryId, UserId};

    #[test]
    fn test_owner_check() {
        let visitor = UserId::new();
        let itinerary = Itinerary::new(ItineraryId::new(), visitor);

        assert!(ensure_owner(&Caller::visitor(visitor), &itinerary).is_ok());
        assert!(matches!(
            ensure_owner(&Caller::visitor(UserId::new()), &itinerary),
            Err(ApplicationError::Forbidden(_))
        ));
    }

    #[test]
    fn test_administrator_passes_owner_or_admin() {
        let itinerary = Itinerary::new(ItineraryId::new(), UserId::new());
        let admin = Caller::new(UserId::new(), Role::Administrator);

        assert!(ensure_owner_or_admin(&admin, &itinerary).is_ok());
        assert!(ensure_owner(&admin, &itinerary).is_err());
    }

    #[test]
    fn test_role_check() {
        let manager = Caller::new(UserId::new(), Role::ActivityManager);
        assert!(ensure_role(&manager, Role::ActivityManager).is_ok());
        assert!(ensure_role(&manager, Role::Visitor).is_err());
    }
}
