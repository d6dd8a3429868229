//! Randomized group machinery: product replacement and the cycle-type witness test used by
//! alternating/symmetric recognition.
//!
//! Everything here takes the random source as an explicit [`rand::Rng`] argument, so callers can
//! inject seeded generators for reproducible runs.
use rand::Rng;

use crate::perm::Perm;

/// Default number of pool slots, excluding the accumulator.
pub(crate) const DEFAULT_POOL: usize = 11;
/// Default number of warm-up draws scrambling a freshly seeded pool.
pub(crate) const DEFAULT_WARMUPS: usize = 50;

/// A product replacement pool.
///
/// The pool holds pseudo-random group elements evolved by a random walk on generating tuples,
/// plus one accumulator slot at the end. Each draw replaces a random slot with its product with
/// another random slot (or its inverse), folds the result into the accumulator on a random side,
/// and returns the accumulator.
pub(crate) struct PrPool {
    slots: Vec<Perm>,
}

impl PrPool {
    /// Seed a pool by cycling the generator list over `pool_size` slots, then scramble it with
    /// `warmups` discarded draws.
    pub(crate) fn new<R: Rng>(
        generators: &[Perm],
        pool_size: usize,
        warmups: usize,
        rng: &mut R,
    ) -> PrPool {
        // a draw needs two distinct non-accumulator slots
        let pool_size = pool_size.max(2);
        let mut slots = Vec::with_capacity(pool_size + 1);
        for index in 0..pool_size {
            if generators.is_empty() {
                slots.push(Perm::identity());
            } else {
                slots.push(generators[index % generators.len()].clone());
            }
        }
        // accumulator
        slots.push(Perm::identity());

        let mut pool = PrPool { slots };
        for _ in 0..warmups {
            pool.draw(rng);
        }
        pool
    }

    /// Draw the next pseudo-random element.
    pub(crate) fn draw<R: Rng>(&mut self, rng: &mut R) -> Perm {
        let acc = self.slots.len() - 1;
        let s = rng.gen_range(0..acc);
        let mut t = rng.gen_range(0..acc - 1);
        if t == s {
            t = acc - 1;
        }
        let exponent: i64 = if rng.gen::<bool>() { 1 } else { -1 };
        if rng.gen::<bool>() {
            self.slots[s] = self.slots[s].prod(&self.slots[t].pow(exponent));
            self.slots[acc] = self.slots[acc].prod(&self.slots[s]);
        } else {
            self.slots[s] = self.slots[t].pow(exponent).prod(&self.slots[s]);
            self.slots[acc] = self.slots[s].prod(&self.slots[acc]);
        }
        self.slots[acc].clone()
    }
}

/// Whether an element witnesses a giant group.
///
/// A transitive group of degree n containing a cycle of prime length p with n/2 < p < n-2
/// contains the alternating group (Jordan). The degree is passed explicitly since the element may
/// be stored with trailing fixed points trimmed.
pub(crate) fn is_giant_witness(perm: &Perm, degree: usize) -> bool {
    for cycle in perm.cycles() {
        let length = cycle.count();
        if length > degree / 2 && length + 2 < degree && is_prime(length) {
            return true;
        }
    }
    false
}

fn is_prime(n: usize) -> bool {
    if n < 2 {
        return false;
    }
    let mut d = 2;
    while d * d <= n {
        if n % d == 0 {
            return false;
        }
        d += 1;
    }
    true
}

/// Number of draws needed to push the one-sided error of the recognition test below `eps`.
///
/// A witness cycle occurs in a random element of a giant group with probability at least
/// d_n = c_n·ln 2 / ln n, so `trials` failures bound the false-negative probability by
/// (1 - d_n)^trials <= eps. The constants are from the randomized recognition literature.
pub(crate) fn recognition_trials(eps: f64, degree: usize) -> usize {
    let c_n = if degree < 17 { 0.34 } else { 0.57 };
    let d_n = c_n * std::f64::consts::LN_2 / (degree as f64).ln();
    ((-eps.ln() / d_n).ceil() as usize).max(1)
}
