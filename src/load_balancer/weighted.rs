//! Indexed and weighted-random target selection.

use rand::Rng;

use crate::load_balancer::{Target, TargetError};

/// Select a target using the thread-local random source.
///
/// A non-negative `weight_index` picks the target at that position. A
/// negative one draws a weighted-random target.
pub fn select_target(targets: &[Target], weight_index: isize) -> Result<&Target, TargetError> {
    select_target_with(targets, weight_index, &mut rand::thread_rng())
}

/// Select a target drawing from the given random source.
pub fn select_target_with<'a, R: Rng + ?Sized>(
    targets: &'a [Target],
    weight_index: isize,
    rng: &mut R,
) -> Result<&'a Target, TargetError> {
    if targets.is_empty() {
        return Err(TargetError::NoTargetsConfigured);
    }

    if weight_index >= 0 {
        let index = weight_index as usize;
        return targets.get(index).ok_or(TargetError::OutOfRange {
            index,
            len: targets.len(),
        });
    }

    let total: u64 = targets.iter().map(|t| u64::from(t.weight)).sum();
    if total == 0 {
        return Ok(&targets[rng.gen_range(0..targets.len())]);
    }

    let draw = rng.gen_range(0..total);
    let mut cumulative = 0u64;
    for target in targets {
        cumulative += u64::from(target.weight);
        if cumulative > draw {
            return Ok(target);
        }
    }
    // cumulative == total > draw, so the loop always returns
    Ok(&targets[targets.len() - 1])
}
