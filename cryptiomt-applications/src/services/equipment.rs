//! Equipment operations

use super::require_non_blank;
use crate::auth::{CallerIdentity, Operation, Scope};
use crate::{ApplicationResult, InventoryApplication};
use chrono::Utc;
use cryptiomt_core::{
    CustomerId, Equipment, EquipmentId, EquipmentPatch, EquipmentStats, NewEquipment,
};
use tracing::{debug, info};

impl InventoryApplication {
    async fn equipment_in_scope(&self, scope: &Scope) -> ApplicationResult<Vec<Equipment>> {
        let mut equipment = match scope {
            Scope::Unrestricted => self.store.list_equipment(None).await?,
            Scope::Customer(id) => self.store.list_equipment(Some(id)).await?,
            Scope::Nothing => return Ok(Vec::new()),
        };
        equipment.retain(|e| scope.admits(&e.customer_id));
        Ok(equipment)
    }

    /// Devices belonging to `customer_id`, restricted to what the caller may see
    pub async fn list_customer_equipment(
        &self,
        identity: Option<&CallerIdentity>,
        customer_id: &CustomerId,
    ) -> ApplicationResult<Vec<Equipment>> {
        let (_, scope) = self
            .gateway
            .check(identity, Operation::ListEquipment, Some(customer_id))
            .await?;

        let equipment = self
            .equipment_in_scope(&scope.intersect(Some(customer_id)))
            .await?;
        debug!("Listed {} devices for customer {}", equipment.len(), customer_id);
        Ok(equipment)
    }

    pub async fn add_equipment(
        &self,
        identity: Option<&CallerIdentity>,
        input: NewEquipment,
    ) -> ApplicationResult<Equipment> {
        let (principal, _) = self
            .gateway
            .check(identity, Operation::WriteEquipment, None)
            .await?;

        require_non_blank("device_name", &input.device_name)?;
        require_non_blank("operating_system", &input.operating_system)?;

        let equipment = Equipment::new(input, Utc::now());
        self.store.insert_equipment(&equipment).await?;

        info!(
            "Equipment {} added to customer {} by {}",
            equipment.id,
            equipment.customer_id,
            principal.summary()
        );
        Ok(equipment)
    }

    pub async fn update_equipment(
        &self,
        identity: Option<&CallerIdentity>,
        id: &EquipmentId,
        patch: EquipmentPatch,
    ) -> ApplicationResult<Equipment> {
        let (principal, _) = self
            .gateway
            .check(identity, Operation::WriteEquipment, None)
            .await?;

        if let Some(name) = &patch.device_name {
            require_non_blank("device_name", name)?;
        }
        if let Some(os) = &patch.operating_system {
            require_non_blank("operating_system", os)?;
        }

        let equipment = self.store.patch_equipment(id, &patch, Utc::now()).await?;
        info!("Equipment {} updated by {}", id, principal.summary());
        Ok(equipment)
    }

    pub async fn delete_equipment(
        &self,
        identity: Option<&CallerIdentity>,
        id: &EquipmentId,
    ) -> ApplicationResult<()> {
        let (principal, _) = self
            .gateway
            .check(identity, Operation::WriteEquipment, None)
            .await?;

        self.store.delete_equipment(id).await?;
        info!("Equipment {} deleted by {}", id, principal.summary());
        Ok(())
    }

    /// Aggregate counts for one customer, or across all customers when none is given
    pub async fn equipment_stats(
        &self,
        identity: Option<&CallerIdentity>,
        customer_id: Option<&CustomerId>,
    ) -> ApplicationResult<EquipmentStats> {
        let (_, scope) = self
            .gateway
            .check(identity, Operation::EquipmentStats, customer_id)
            .await?;

        let equipment = self.equipment_in_scope(&scope.intersect(customer_id)).await?;
        Ok(EquipmentStats::from_equipment(&equipment))
    }
}

#[cfg(test)]
mod tests {
    use crate::services::test_support::{app, customer, new_device, staff};
    use crate::{ApplicationError, CallerIdentity};
    use cryptiomt_core::{AdminRole, EquipmentId, EquipmentPatch, EquipmentStatus};

    #[tokio::test]
    async fn test_analyst_adds_equipment() {
        let app = app();
        let analyst = staff(&app, "u1", AdminRole::Analyst).await;
        let owner = customer(&app, "Mercy", None).await;

        let device = app
            .add_equipment(Some(&analyst), new_device(&owner.id, "ws-001"))
            .await
            .unwrap();

        assert_eq!(device.status, EquipmentStatus::Active);
        assert_eq!(device.created_at, device.updated_at);
        assert_eq!(device.last_seen, Some(device.created_at));
        assert_eq!(device.risk_score, None);
    }

    #[tokio::test]
    async fn test_portal_user_sees_only_own_devices() {
        let app = app();
        let admin = staff(&app, "admin", AdminRole::Admin).await;
        let own = customer(&app, "Mercy", Some("portal_mercy")).await;
        let other = customer(&app, "Zenith", None).await;

        for (owner, name) in [(&own, "a"), (&own, "b"), (&other, "c")] {
            app.add_equipment(Some(&admin), new_device(&owner.id, name))
                .await
                .unwrap();
        }

        let portal = CallerIdentity::new("portal_mercy");
        let visible = app
            .list_customer_equipment(Some(&portal), &own.id)
            .await
            .unwrap();
        assert_eq!(visible.len(), 2);
        assert!(visible.iter().all(|e| e.customer_id == own.id));

        let err = app
            .list_customer_equipment(Some(&portal), &other.id)
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::Unauthorized { .. }));

        let all_for_other = app
            .list_customer_equipment(Some(&admin), &other.id)
            .await
            .unwrap();
        assert_eq!(all_for_other.len(), 1);
    }

    #[tokio::test]
    async fn test_update_and_delete_equipment() {
        let app = app();
        let admin = staff(&app, "admin", AdminRole::Admin).await;
        let owner = customer(&app, "Mercy", None).await;
        let device = app
            .add_equipment(Some(&admin), new_device(&owner.id, "ws-001"))
            .await
            .unwrap();

        let updated = app
            .update_equipment(
                Some(&admin),
                &device.id,
                EquipmentPatch {
                    status: Some(EquipmentStatus::Inactive),
                    location: Some("Ward 3".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.status, EquipmentStatus::Inactive);
        assert_eq!(updated.location.as_deref(), Some("Ward 3"));
        assert!(updated.updated_at >= device.updated_at);
        assert_eq!(updated.created_at, device.created_at);

        app.delete_equipment(Some(&admin), &device.id).await.unwrap();
        let err = app
            .delete_equipment(Some(&admin), &device.id)
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::NotFound { .. }));

        let err = app
            .update_equipment(Some(&admin), &EquipmentId::from("gone"), EquipmentPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_stats_without_customer_spans_all_customers() {
        let app = app();
        let admin = staff(&app, "admin", AdminRole::Admin).await;
        let a = customer(&app, "Alpha", None).await;
        let b = customer(&app, "Beta", None).await;

        for (owner, score) in [(&a, Some(9.0)), (&a, Some(2.0)), (&b, None)] {
            let device = app
                .add_equipment(Some(&admin), new_device(&owner.id, "dev"))
                .await
                .unwrap();
            let mut scored = device.clone();
            scored.risk_score = score;
            app.store().delete_equipment(&device.id).await.unwrap();
            app.store().insert_equipment(&scored).await.unwrap();
        }

        let newcomer = CallerIdentity::new("u2");
        let stats = app.equipment_stats(Some(&newcomer), None).await.unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.active, 3);
        assert_eq!(stats.by_type.get("workstation"), Some(&3));
        assert_eq!(stats.risk_distribution.critical, 1);
        assert_eq!(stats.risk_distribution.low, 1);

        let scoped = app.equipment_stats(Some(&newcomer), Some(&b.id)).await.unwrap();
        assert_eq!(scoped.total, 1);
    }

    #[tokio::test]
    async fn test_blank_device_name_is_rejected() {
        let app = app();
        let admin = staff(&app, "admin", AdminRole::Admin).await;
        let owner = customer(&app, "Mercy", None).await;

        let err = app
            .add_equipment(Some(&admin), new_device(&owner.id, " "))
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::Validation { ref field, .. } if field == "device_name"));
    }

    #[tokio::test]
    async fn test_anonymous_equipment_calls_are_unauthenticated() {
        let app = app();
        let owner = customer(&app, "Mercy", None).await;

        let results = [
            app.list_customer_equipment(None, &owner.id).await.map(|_| ()),
            app.add_equipment(None, new_device(&owner.id, "x")).await.map(|_| ()),
            app.delete_equipment(None, &EquipmentId::from("x")).await,
            app.equipment_stats(None, None).await.map(|_| ()),
        ];
        for result in results {
            assert!(matches!(
                result,
                Err(ApplicationError::Unauthenticated { .. })
            ));
        }
        assert!(app.store().list_equipment(None).await.unwrap().is_empty());
    }
}
