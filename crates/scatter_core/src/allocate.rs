//! Splits a sample budget across mixture components.

use crate::config::MixtureComponent;
use crate::error::ParameterError;

/// Resolves how many samples each component receives.
///
/// The result is aligned with `components`; components with `weight <= 0`
/// always get 0. If any eligible component carries an explicit
/// `sample_count`, the explicit counts are used as-is. Otherwise
/// `total_samples` is split by weight with round-half-to-even, and the last
/// eligible component absorbs whatever rounding left over.
pub fn allocate_samples(
    components: &[MixtureComponent],
    total_samples: Option<u32>,
) -> Result<Vec<usize>, ParameterError> {
    let eligible: Vec<usize> = components
        .iter()
        .enumerate()
        .filter(|(_, c)| c.is_eligible())
        .map(|(i, _)| i)
        .collect();
    if eligible.is_empty() {
        return Err(ParameterError::NoEligibleComponents);
    }

    let mut counts = vec![0usize; components.len()];
    let explicit = eligible
        .iter()
        .any(|&i| components[i].sample_count > 0);

    if explicit {
        for &i in &eligible {
            counts[i] = components[i].sample_count as usize;
        }
    } else {
        let total = match total_samples {
            Some(total) if total > 0 => total as i64,
            _ => return Err(ParameterError::MissingTotalSamples),
        };
        let weight_sum: f64 = eligible.iter().map(|&i| components[i].weight).sum();
        if !(weight_sum > 0.0) {
            return Err(ParameterError::NonPositiveWeightSum);
        }

        let mut assigned = 0i64;
        for (position, &i) in eligible.iter().enumerate() {
            let raw = if position + 1 == eligible.len() {
                total - assigned
            } else {
                (total as f64 * (components[i].weight / weight_sum)).round_ties_even() as i64
            };
            let count = raw.max(0);
            counts[i] = count as usize;
            assigned += count;
        }
    }

    if counts.iter().all(|&n| n == 0) {
        return Err(ParameterError::NoSamples);
    }
    Ok(counts)
}
