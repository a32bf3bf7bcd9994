use shared::{
    domain::{ParameterKey, ParameterSet},
    error::ParameterError,
};

/// Current parameter values for one session.
#[derive(Debug, Clone, Default)]
pub struct ParameterStore {
    values: ParameterSet,
}

impl ParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: ParameterKey) -> f64 {
        self.values.get(key)
    }

    /// Clamps `value` into the key's range and stores it. NaN is rejected and
    /// the previous value kept.
    pub fn update(&mut self, key: ParameterKey, value: f64) -> Result<f64, ParameterError> {
        match self.values.set(key, value) {
            Ok(stored) => {
                if stored != value {
                    tracing::debug!(parameter = %key, requested = value, stored, "clamped parameter update");
                }
                Ok(stored)
            }
            Err(err) => {
                tracing::warn!(parameter = %key, "{err}");
                Err(err)
            }
        }
    }

    /// Copy of every value, detached from later edits.
    pub fn snapshot(&self) -> ParameterSet {
        self.values
    }

    pub fn reset(&mut self) {
        self.values = ParameterSet::defaults();
    }

    pub fn iter(&self) -> impl Iterator<Item = (ParameterKey, f64)> + '_ {
        self.values.iter()
    }
}
