//! Risk bucketing and inventory statistics

use crate::types::{Equipment, EquipmentStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Severity bucket derived from a numeric risk score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Bucket a score with the fixed thresholds `< 3`, `< 6`, `< 8`, else critical.
    ///
    /// Returns `None` for a missing score and for a score of exactly zero,
    /// which the inventory treats as "not yet assessed".
    pub fn from_score(score: Option<f64>) -> Option<Self> {
        let score = score.filter(|s| *s != 0.0 && !s.is_nan())?;
        Some(if score < 3.0 {
            RiskLevel::Low
        } else if score < 6.0 {
            RiskLevel::Medium
        } else if score < 8.0 {
            RiskLevel::High
        } else {
            RiskLevel::Critical
        })
    }
}

/// Count of devices per risk bucket
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct RiskDistribution {
    pub low: u64,
    pub medium: u64,
    pub high: u64,
    pub critical: u64,
}

impl RiskDistribution {
    fn record(&mut self, level: RiskLevel) {
        match level {
            RiskLevel::Low => self.low += 1,
            RiskLevel::Medium => self.medium += 1,
            RiskLevel::High => self.high += 1,
            RiskLevel::Critical => self.critical += 1,
        }
    }
}

/// Aggregate view over a set of devices
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct EquipmentStats {
    pub total: u64,
    pub active: u64,
    pub inactive: u64,
    pub maintenance: u64,
    /// Device count keyed by device type name
    pub by_type: BTreeMap<String, u64>,
    pub risk_distribution: RiskDistribution,
}

impl EquipmentStats {
    pub fn from_equipment<'a, I>(equipment: I) -> Self
    where
        I: IntoIterator<Item = &'a Equipment>,
    {
        let mut stats = Self::default();
        for item in equipment {
            stats.total += 1;
            match item.status {
                EquipmentStatus::Active => stats.active += 1,
                EquipmentStatus::Inactive => stats.inactive += 1,
                EquipmentStatus::Maintenance => stats.maintenance += 1,
            }
            *stats
                .by_type
                .entry(item.device_type.as_str().to_string())
                .or_insert(0) += 1;
            if let Some(level) = RiskLevel::from_score(item.risk_score) {
                stats.risk_distribution.record(level);
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CustomerId, DeviceType, NewEquipment};
    use chrono::Utc;

    fn device(device_type: DeviceType, status: EquipmentStatus, score: Option<f64>) -> Equipment {
        let mut equipment = Equipment::new(
            NewEquipment {
                customer_id: CustomerId::from("c1"),
                device_name: "dev".to_string(),
                device_type,
                operating_system: "os".to_string(),
                os_version: "1".to_string(),
                ip_address: None,
                mac_address: None,
                location: None,
                department: None,
                owner: None,
            },
            Utc::now(),
        );
        equipment.status = status;
        equipment.risk_score = score;
        equipment
    }

    #[test]
    fn test_thresholds() {
        assert_eq!(RiskLevel::from_score(Some(2.9)), Some(RiskLevel::Low));
        assert_eq!(RiskLevel::from_score(Some(3.0)), Some(RiskLevel::Medium));
        assert_eq!(RiskLevel::from_score(Some(5.99)), Some(RiskLevel::Medium));
        assert_eq!(RiskLevel::from_score(Some(6.0)), Some(RiskLevel::High));
        assert_eq!(RiskLevel::from_score(Some(8.0)), Some(RiskLevel::Critical));
        assert_eq!(RiskLevel::from_score(Some(10.0)), Some(RiskLevel::Critical));
    }

    #[test]
    fn test_unscored_devices_are_not_bucketed() {
        assert_eq!(RiskLevel::from_score(None), None);
        assert_eq!(RiskLevel::from_score(Some(0.0)), None);
    }

    #[test]
    fn test_stats_aggregation() {
        let items = vec![
            device(DeviceType::Server, EquipmentStatus::Active, Some(9.1)),
            device(DeviceType::Server, EquipmentStatus::Maintenance, Some(1.0)),
            device(DeviceType::Iot, EquipmentStatus::Inactive, None),
            device(DeviceType::Laptop, EquipmentStatus::Active, Some(0.0)),
        ];

        let stats = EquipmentStats::from_equipment(&items);

        assert_eq!(stats.total, 4);
        assert_eq!(stats.active, 2);
        assert_eq!(stats.inactive, 1);
        assert_eq!(stats.maintenance, 1);
        assert_eq!(stats.by_type.get("server"), Some(&2));
        assert_eq!(stats.by_type.get("iot"), Some(&1));
        assert_eq!(stats.risk_distribution.critical, 1);
        assert_eq!(stats.risk_distribution.low, 1);
        assert_eq!(
            stats.risk_distribution.medium + stats.risk_distribution.high,
            0
        );
    }

    #[test]
    fn test_empty_stats() {
        let stats = EquipmentStats::from_equipment(std::iter::empty());
        assert_eq!(stats, EquipmentStats::default());
    }
}
