//! Schedule checks and accrual shared by the contract producers.
//!
//! Date generation belongs to the caller: contracts receive their schedules
//! as lists of event times. These helpers only check that a schedule is
//! usable and turn consecutive times into accrual fractions.

use std::cmp::Ordering;

use timetable_core::daycounts::Thirty360US;
use timetable_core::event::EventTime;

use crate::error::{ContractError, ContractResult};

/// Converts a list of dates, instants or year fractions into event times.
pub fn event_times<I, T>(times: I) -> Vec<EventTime>
where
    I: IntoIterator<Item = T>,
    T: Into<EventTime>,
{
    times.into_iter().map(Into::into).collect()
}

/// Checks that a schedule is non-empty and strictly increasing.
///
/// # Errors
///
/// - `EmptySchedule` if `times` is empty
/// - `Timetable(MixedTimeRepresentation)` if kinds are mixed
/// - `InvalidSpec` if a time does not follow its predecessor
pub fn check_schedule(field: &str, times: &[EventTime]) -> ContractResult<()> {
    if times.is_empty() {
        return Err(ContractError::empty_schedule(field));
    }
    for (i, pair) in times.windows(2).enumerate() {
        if pair[1].try_cmp(&pair[0])? != Ordering::Greater {
            return Err(ContractError::invalid_spec(format!(
                "{field}[{}] ({}) does not follow {field}[{i}] ({})",
                i + 1,
                pair[1],
                pair[0]
            )));
        }
    }
    Ok(())
}

/// Checks that `earlier` does not come after `later`.
///
/// # Errors
///
/// Fails on mixed kinds or when `earlier > later`.
pub fn check_not_after(
    what: &str,
    earlier: EventTime,
    later: EventTime,
) -> ContractResult<()> {
    if earlier.try_cmp(&later)? == Ordering::Greater {
        return Err(ContractError::invalid_spec(format!(
            "{what}: {earlier} is after {later}"
        )));
    }
    Ok(())
}

/// Accrual fraction from `start` to `end` under 30/360 US.
///
/// # Errors
///
/// Fails when the two times use different representations.
pub fn accrual(start: EventTime, end: EventTime) -> ContractResult<f64> {
    Ok(EventTime::accrual_fraction(start, end, &Thirty360US)?)
}

/// Legacy year-fraction coupon times: `n = ceil(maturity * freq)` periods
/// ending at `maturity`, with any short stub at the front.
///
/// ```rust
/// use timetable_contracts::schedule::year_schedule;
///
/// let times = year_schedule(2.1, 2).unwrap();
/// assert_eq!(times.len(), 5);
/// assert!((times[0] - 0.1).abs() < 1e-12);
/// assert!((times[4] - 2.1).abs() < 1e-12);
/// ```
///
/// # Errors
///
/// Returns `InvalidSpec` for a non-positive maturity or zero frequency.
pub fn year_schedule(maturity: f64, freq: u32) -> ContractResult<Vec<f64>> {
    if !(maturity.is_finite() && maturity > 0.0) || freq == 0 {
        return Err(ContractError::invalid_spec(format!(
            "cannot schedule maturity {maturity} at frequency {freq}"
        )));
    }
    let freq = f64::from(freq);
    let periods = (maturity * freq).ceil();
    let stub = maturity * freq - periods + 1.0;
    Ok((0..periods as usize)
        .map(|i| (i as f64 + stub) / freq)
        .collect())
}
