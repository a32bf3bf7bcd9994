use serde::{Deserialize, Serialize};

use crate::error::ParameterError;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub u64);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(SubmissionId);

/// The nine water-quality measurements sent to the prediction service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterKey {
    Ph,
    Hardness,
    Solids,
    Chloramines,
    Sulfate,
    Conductivity,
    OrganicCarbon,
    Trihalomethanes,
    Turbidity,
}

impl ParameterKey {
    pub const ALL: [ParameterKey; 9] = [
        ParameterKey::Ph,
        ParameterKey::Hardness,
        ParameterKey::Solids,
        ParameterKey::Chloramines,
        ParameterKey::Sulfate,
        ParameterKey::Conductivity,
        ParameterKey::OrganicCarbon,
        ParameterKey::Trihalomethanes,
        ParameterKey::Turbidity,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    /// Canonical wire field name.
    pub const fn field_name(self) -> &'static str {
        match self {
            ParameterKey::Ph => "ph",
            ParameterKey::Hardness => "hardness",
            ParameterKey::Solids => "solids",
            ParameterKey::Chloramines => "chloramines",
            ParameterKey::Sulfate => "sulfate",
            ParameterKey::Conductivity => "conductivity",
            ParameterKey::OrganicCarbon => "organic_carbon",
            ParameterKey::Trihalomethanes => "trihalomethanes",
            ParameterKey::Turbidity => "turbidity",
        }
    }

    pub fn descriptor(self) -> &'static ParameterDescriptor {
        &PARAMETERS[self.index()]
    }
}

impl std::fmt::Display for ParameterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.field_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterDescriptor {
    pub key: ParameterKey,
    pub display_name: &'static str,
    pub unit: &'static str,
    pub min: f64,
    pub max: f64,
    pub default: f64,
}

impl ParameterDescriptor {
    /// Clamps a finite or infinite value into `[min, max]`. NaN is passed through
    /// unchanged so callers can decide how to reject it.
    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            return value;
        }
        value.clamp(self.min, self.max)
    }

    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

/// Registry of every parameter, indexed by `ParameterKey::index`.
pub static PARAMETERS: [ParameterDescriptor; 9] = [
    ParameterDescriptor {
        key: ParameterKey::Ph,
        display_name: "pH",
        unit: "",
        min: 0.0,
        max: 14.0,
        default: 7.0,
    },
    ParameterDescriptor {
        key: ParameterKey::Hardness,
        display_name: "Hardness",
        unit: "mg/L",
        min: 50.0,
        max: 300.0,
        default: 150.0,
    },
    ParameterDescriptor {
        key: ParameterKey::Solids,
        display_name: "Total solids",
        unit: "ppm",
        min: 2000.0,
        max: 50000.0,
        default: 10000.0,
    },
    ParameterDescriptor {
        key: ParameterKey::Chloramines,
        display_name: "Chloramines",
        unit: "ppm",
        min: 0.0,
        max: 15.0,
        default: 7.0,
    },
    ParameterDescriptor {
        key: ParameterKey::Sulfate,
        display_name: "Sulfate",
        unit: "mg/L",
        min: 50.0,
        max: 500.0,
        default: 250.0,
    },
    ParameterDescriptor {
        key: ParameterKey::Conductivity,
        display_name: "Conductivity",
        unit: "μS/cm",
        min: 100.0,
        max: 1000.0,
        default: 500.0,
    },
    ParameterDescriptor {
        key: ParameterKey::OrganicCarbon,
        display_name: "Organic carbon",
        unit: "ppm",
        min: 0.0,
        max: 30.0,
        default: 15.0,
    },
    ParameterDescriptor {
        key: ParameterKey::Trihalomethanes,
        display_name: "Trihalomethanes",
        unit: "μg/L",
        min: 0.0,
        max: 120.0,
        default: 60.0,
    },
    ParameterDescriptor {
        key: ParameterKey::Turbidity,
        display_name: "Turbidity",
        unit: "NTU",
        min: 0.0,
        max: 10.0,
        default: 5.0,
    },
];

/// Current value of every parameter. Each value stays inside its descriptor's range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterSet {
    values: [f64; 9],
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self::defaults()
    }
}

impl ParameterSet {
    pub fn defaults() -> Self {
        let mut values = [0.0; 9];
        for descriptor in &PARAMETERS {
            values[descriptor.key.index()] = descriptor.default;
        }
        Self { values }
    }

    pub fn get(&self, key: ParameterKey) -> f64 {
        self.values[key.index()]
    }

    /// Stores `value` clamped to the key's range and returns what was stored.
    /// NaN is rejected and leaves the current value in place.
    pub fn set(&mut self, key: ParameterKey, value: f64) -> Result<f64, ParameterError> {
        if value.is_nan() {
            return Err(ParameterError::NotANumber { key });
        }
        let clamped = key.descriptor().clamp(value);
        self.values[key.index()] = clamped;
        Ok(clamped)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ParameterKey, f64)> + '_ {
        ParameterKey::ALL
            .into_iter()
            .map(move |key| (key, self.values[key.index()]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_is_indexed_by_key_and_well_formed() {
        for (index, descriptor) in PARAMETERS.iter().enumerate() {
            assert_eq!(descriptor.key.index(), index);
            assert!(descriptor.min < descriptor.max, "{}", descriptor.key);
            assert!(descriptor.contains(descriptor.default), "{}", descriptor.key);
        }
    }

    #[test]
    fn field_names_match_serialized_keys() {
        for key in ParameterKey::ALL {
            assert_eq!(
                serde_json::to_value(key).expect("serialize"),
                serde_json::Value::from(key.field_name())
            );
        }
    }

    #[test]
    fn defaults_match_registry() {
        let set = ParameterSet::defaults();
        assert_eq!(set.get(ParameterKey::Ph), 7.0);
        assert_eq!(set.get(ParameterKey::Solids), 10000.0);
        assert_eq!(set.get(ParameterKey::Turbidity), 5.0);
        assert_eq!(set.iter().count(), 9);
    }

    #[test]
    fn set_clamps_and_rejects_nan() {
        let mut set = ParameterSet::defaults();
        assert_eq!(set.set(ParameterKey::Ph, 20.0).expect("clamp"), 14.0);
        assert_eq!(
            set.set(ParameterKey::Hardness, f64::NEG_INFINITY).expect("clamp"),
            50.0
        );
        assert!(matches!(
            set.set(ParameterKey::Ph, f64::NAN),
            Err(ParameterError::NotANumber {
                key: ParameterKey::Ph
            })
        ));
        assert_eq!(set.get(ParameterKey::Ph), 14.0);
    }
}
