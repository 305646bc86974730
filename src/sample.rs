//! The weighted-sampling walk over a rule's continuations.

use crate::rng::Rng;
use crate::table::Rule;

/// Draw a continuation character from `rule` using `rng`.
///
/// If `rule` is `None` (the context has never been observed), returns 0
/// (end-of-string) unconditionally — an unknown context is not an error.
///
/// Otherwise draws `r` uniformly from `[0, weight_total]` (inclusive of
/// `weight_total`, hence `next_bounded(weight_total + 1)`) and walks the
/// continuations in storage order, subtracting each weight from `r` until a
/// continuation's band contains it. If `r` lands exactly on `weight_total`
/// — the one value no continuation's band covers — sampling falls through
/// to end-of-string. This residual end-of-string probability, even for
/// rules with no explicit 0 continuation, is a deliberate part of the
/// contract, not a bug.
pub fn sample(rule: Option<&Rule>, rng: &mut dyn Rng) -> u32 {
    let rule = match rule {
        Some(r) => r,
        None => return 0,
    };
    // Draws are bounded to u32; a rule whose total has climbed past u32::MAX
    // clamps its effective range rather than overflow the draw.
    let total = rule.weight_total.min(u32::MAX as u64 - 1) as u32;
    let mut r = rng.next_bounded(total + 1);
    for cont in rule.continuations() {
        if r < cont.weight {
            return cont.ch;
        }
        r -= cont.weight;
    }
    0
}
