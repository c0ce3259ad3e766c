use arbiter_quantities::{energy::KilowattHours, power::Kilowatts};
use bon::Builder;
use serde::{Deserialize, Serialize};

use crate::core::DispatchError;

/// Physical limits of the storage asset.
#[must_use]
#[derive(Copy, Clone, Debug, Builder, Serialize)]
pub struct StorageParameters {
    /// Maximum charging and discharging power.
    pub power_rating: Kilowatts,

    /// Nameplate energy rating the state-of-energy bounds refer to.
    pub energy_capacity: KilowattHours,

    /// Fraction of the grid energy that ends up stored, `(0, 1]`.
    pub charge_efficiency: f64,

    /// Fraction of the stored energy that reaches the grid, `(0, 1]`.
    pub discharge_efficiency: f64,

    /// Lower state-of-energy bound as a fraction of the capacity.
    pub soc_low: f64,

    /// Upper state-of-energy bound as a fraction of the capacity.
    pub soc_high: f64,
}

impl StorageParameters {
    pub fn min_energy(&self) -> KilowattHours {
        self.energy_capacity * self.soc_low
    }

    pub fn max_energy(&self) -> KilowattHours {
        self.energy_capacity * self.soc_high
    }

    /// Reject parameters that cannot describe a physical storage.
    ///
    /// Building the model does not call this, so `soc_low > soc_high` slips through to the solver
    /// as an infeasibility unless the caller validates first.
    pub fn validate(&self) -> Result<(), DispatchError> {
        for (name, value) in [
            ("power_rating", self.power_rating.into_inner()),
            ("energy_capacity", self.energy_capacity.into_inner()),
        ] {
            // `OrderedFloat` orders NaN above everything, so compare the bare value:
            if !(value.is_finite() && value > 0.0) {
                return Err(invalid(name, format!("{value} is not a positive number")));
            }
        }
        for (name, efficiency) in [
            ("charge_efficiency", self.charge_efficiency),
            ("discharge_efficiency", self.discharge_efficiency),
        ] {
            if !(efficiency > 0.0 && efficiency <= 1.0) {
                return Err(invalid(name, format!("{efficiency} is outside of (0, 1]")));
            }
        }
        for (name, fraction) in [("soc_low", self.soc_low), ("soc_high", self.soc_high)] {
            if !(0.0..=1.0).contains(&fraction) {
                return Err(invalid(name, format!("{fraction} is outside of [0, 1]")));
            }
        }
        if self.soc_low > self.soc_high {
            return Err(invalid(
                "soc_low",
                format!("{} exceeds soc_high of {}", self.soc_low, self.soc_high),
            ));
        }
        Ok(())
    }
}

fn invalid(name: &'static str, reason: String) -> DispatchError {
    DispatchError::InvalidParameter { name, reason }
}

/// Storage parameters as they come from the scenario, any of them possibly absent.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageSection {
    #[serde(rename = "power_rating_kilowatts")]
    pub power_rating: Option<Kilowatts>,

    #[serde(rename = "energy_capacity_kilowatt_hours")]
    pub energy_capacity: Option<KilowattHours>,

    pub charge_efficiency: Option<f64>,
    pub discharge_efficiency: Option<f64>,
    pub soc_low: Option<f64>,
    pub soc_high: Option<f64>,
}

impl TryFrom<&StorageSection> for StorageParameters {
    type Error = DispatchError;

    fn try_from(section: &StorageSection) -> Result<Self, Self::Error> {
        Ok(Self {
            power_rating: section
                .power_rating
                .ok_or(DispatchError::MissingParameter("power_rating_kilowatts"))?,
            energy_capacity: section
                .energy_capacity
                .ok_or(DispatchError::MissingParameter("energy_capacity_kilowatt_hours"))?,
            charge_efficiency: section
                .charge_efficiency
                .ok_or(DispatchError::MissingParameter("charge_efficiency"))?,
            discharge_efficiency: section
                .discharge_efficiency
                .ok_or(DispatchError::MissingParameter("discharge_efficiency"))?,
            soc_low: section.soc_low.ok_or(DispatchError::MissingParameter("soc_low"))?,
            soc_high: section.soc_high.ok_or(DispatchError::MissingParameter("soc_high"))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn parameters() -> StorageParameters {
        StorageParameters::builder()
            .power_rating(Kilowatts::from(10.0))
            .energy_capacity(KilowattHours::from(20.0))
            .charge_efficiency(0.95)
            .discharge_efficiency(0.9)
            .soc_low(0.1)
            .soc_high(0.9)
            .build()
    }

    #[test]
    fn test_energy_bounds() {
        let parameters = parameters();
        assert_abs_diff_eq!(parameters.min_energy().into_inner(), 2.0);
        assert_abs_diff_eq!(parameters.max_energy().into_inner(), 18.0);
    }

    #[test]
    fn test_validate_ok() -> Result<(), DispatchError> {
        parameters().validate()
    }

    #[test]
    fn test_validate_inverted_soc_bounds() {
        let inverted = StorageParameters { soc_low: 0.8, soc_high: 0.2, ..parameters() };
        assert!(matches!(
            inverted.validate(),
            Err(DispatchError::InvalidParameter { name: "soc_low", .. }),
        ));
    }

    #[test]
    fn test_validate_not_a_number() {
        let nan_rating =
            StorageParameters { power_rating: Kilowatts::from(f64::NAN), ..parameters() };
        assert!(matches!(
            nan_rating.validate(),
            Err(DispatchError::InvalidParameter { name: "power_rating", .. }),
        ));
        let infinite_capacity = StorageParameters {
            energy_capacity: KilowattHours::from(f64::INFINITY),
            ..parameters()
        };
        assert!(matches!(
            infinite_capacity.validate(),
            Err(DispatchError::InvalidParameter { name: "energy_capacity", .. }),
        ));
        let zero_rating = StorageParameters { power_rating: Kilowatts::ZERO, ..parameters() };
        assert!(zero_rating.validate().is_err());
    }

    #[test]
    fn test_validate_efficiency() {
        let zero_discharge = StorageParameters { discharge_efficiency: 0.0, ..parameters() };
        assert!(matches!(
            zero_discharge.validate(),
            Err(DispatchError::InvalidParameter { name: "discharge_efficiency", .. }),
        ));
        let excess_charge = StorageParameters { charge_efficiency: 1.2, ..parameters() };
        assert!(matches!(
            excess_charge.validate(),
            Err(DispatchError::InvalidParameter { name: "charge_efficiency", .. }),
        ));
    }

    #[test]
    fn test_missing_parameter() {
        let section = StorageSection {
            power_rating: Some(Kilowatts::from(10.0)),
            energy_capacity: Some(KilowattHours::from(20.0)),
            charge_efficiency: Some(1.0),
            discharge_efficiency: Some(1.0),
            soc_low: Some(0.0),
            soc_high: None,
        };
        assert!(matches!(
            StorageParameters::try_from(&section),
            Err(DispatchError::MissingParameter("soc_high")),
        ));
    }
}
