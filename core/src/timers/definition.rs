//! Building runtime timers and counters from config definitions

use std::time::Duration;

use cadence_types::{CounterDefinition, TargetDefinition, TimerDefinition};

use crate::error::{ConfigError, TimingError};
use crate::rate::RateCounter;
use crate::units::millis_to_nanos;

use super::observable::ObservableTargetTimer;
use super::target::TargetSpec;

fn millis(ms: u64) -> Result<i64, TimingError> {
    millis_to_nanos(i64::try_from(ms).map_err(|_| TimingError::Overflow)?)
}

impl TryFrom<&TargetDefinition> for TargetSpec {
    type Error = TimingError;

    fn try_from(def: &TargetDefinition) -> Result<Self, Self::Error> {
        let spec = match *def {
            TargetDefinition::Fixed { ms } => TargetSpec::Fixed(millis(ms)?),
            TargetDefinition::Random { min_ms, max_ms } => TargetSpec::Random {
                lower: millis(min_ms)?,
                upper: millis(max_ms)?,
            },
        };
        spec.validate()?;
        Ok(spec)
    }
}

pub(crate) fn build_timer(def: &TimerDefinition) -> Result<ObservableTargetTimer, ConfigError> {
    let spec = TargetSpec::try_from(&def.target).map_err(|e| ConfigError::InvalidDefinition {
        id: def.id.clone(),
        reason: e.to_string(),
    })?;
    Ok(ObservableTargetTimer::from_spec(spec)?)
}

pub(crate) fn build_counter(def: &CounterDefinition) -> Result<RateCounter, ConfigError> {
    if def.frame_ms == 0 {
        return Err(ConfigError::InvalidDefinition {
            id: def.id.clone(),
            reason: "frame_ms must be positive".to_string(),
        });
    }
    Ok(RateCounter::new(Duration::from_millis(def.frame_ms))?)
}
