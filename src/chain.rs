//! Stabilizer chains and the coset arithmetic built on them.
use std::collections::BTreeSet;

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, ToPrimitive, Zero};

use crate::orbit::{orbit_data, OrbitData};
use crate::perm::Perm;
use crate::El;

/// One level of a stabilizer chain.
///
/// A level fixes one base point: it records the orbit of that point under the level's generators,
/// a transversal element per orbit point, and the generators themselves (which stabilize every
/// base point of the levels above).
pub(crate) struct Level {
    pub(crate) base: El,
    /// Orbit of the base point in breadth-first order; the base comes first.
    pub(crate) orbit: Vec<El>,
    /// Maps each domain point to its position in `orbit`.
    pub(crate) position: Vec<Option<usize>>,
    /// `transversal[i]` maps the base point to `orbit[i]`; `transversal[0]` is the identity.
    pub(crate) transversal: Vec<Perm>,
    pub(crate) gens: Vec<Perm>,
}

/// A stabilizer chain: nested subgroups each fixing one more base point than the last.
///
/// The trivial group has an empty chain.
pub(crate) struct Chain {
    pub(crate) levels: Vec<Level>,
}

/// The Schreier generators of the stabilizer of an orbit's root.
///
/// For every orbit point β with transversal element u and every generator g, the element
/// u · g · u'⁻¹ (u' the transversal element of g(β)) fixes the root. The distinct nontrivial ones
/// generate the full point stabilizer (Schreier's lemma); deduplication through an ordered set
/// keeps the result deterministic.
pub(crate) fn schreier_generators(
    gens: &[Perm],
    data: &OrbitData,
    transversal: &[Perm],
) -> Vec<Perm> {
    let mut stab_gens = BTreeSet::new();
    for (index, &point) in data.orbit.iter().enumerate() {
        let to_point = &transversal[index];
        for gen in gens {
            let image = gen.image(point);
            let to_image = match data.position[image as usize] {
                Some(image_index) => &transversal[image_index],
                None => unreachable!("generator image left the orbit"),
            };
            let stab_gen = to_point.prod(gen).prod(&to_image.inv());
            if !stab_gen.is_identity() {
                stab_gens.insert(stab_gen);
            }
        }
    }
    stab_gens.into_iter().collect()
}

/// Build the stabilizer chain for a generating set.
///
/// Each level picks the smallest point moved by the current generators, computes its orbit and
/// transversal, and passes the distinct nontrivial Schreier generators down as the next level's
/// generating set, until only the identity remains. An explicit loop rather than recursion, so
/// long chains (degrees in the hundreds) cost no stack depth.
pub(crate) fn build(degree: usize, generators: &[Perm]) -> Chain {
    let mut levels = Vec::new();
    let mut gens: Vec<Perm> = generators
        .iter()
        .filter(|gen| !gen.is_identity())
        .cloned()
        .collect();

    while !gens.is_empty() && levels.len() < degree {
        let base = match (0..degree as El).find(|&point| gens.iter().any(|g| g.image(point) != point))
        {
            Some(base) => base,
            None => break,
        };
        let data = orbit_data(degree, &gens, base);
        let transversal = data.full_transversal(&gens);
        let next = schreier_generators(&gens, &data, &transversal);
        levels.push(Level {
            base,
            orbit: data.orbit,
            position: data.position,
            transversal,
            gens,
        });
        gens = next;
    }

    Chain { levels }
}

impl Chain {
    /// The group order: the product of the orbit lengths of every level.
    pub(crate) fn order(&self) -> BigUint {
        let mut order = BigUint::one();
        for level in &self.levels {
            order *= BigUint::from(level.orbit.len());
        }
        order
    }

    /// Sift an element through the chain.
    ///
    /// Peels one transversal factor per level off the residual, top level first. Returns the
    /// factors and the orbit index each one was found at, or `None` when the element is not a
    /// member (its base image falls outside a level's orbit, or a nontrivial residual remains).
    fn sift(&self, g: &Perm) -> Option<(Vec<Perm>, Vec<usize>)> {
        let mut residual = g.clone();
        let mut factors = Vec::with_capacity(self.levels.len());
        let mut digits = Vec::with_capacity(self.levels.len());
        for level in &self.levels {
            let image = residual.image(level.base);
            let index = match level.position.get(image as usize) {
                Some(&Some(index)) => index,
                _ => return None,
            };
            let factor = &level.transversal[index];
            residual = residual.prod(&factor.inv());
            debug_assert_eq!(residual.image(level.base), level.base);
            factors.push(factor.clone());
            digits.push(index);
        }
        if residual.is_identity() {
            Some((factors, digits))
        } else {
            None
        }
    }

    pub(crate) fn contains(&self, g: &Perm) -> bool {
        self.sift(g).is_some()
    }

    /// Decompose a member into transversal factors, one per level, outermost level first.
    ///
    /// The product of the factors in reverse order reconstructs the element.
    pub(crate) fn decompose(&self, g: &Perm) -> Option<Vec<Perm>> {
        self.sift(g).map(|(factors, _)| factors)
    }

    /// The rank of a member in `[0, order)`.
    ///
    /// The orbit index of the transversal factor at each level is a digit of a mixed-radix
    /// number, most significant digit at the outermost level. The resulting order on elements is
    /// an artifact of the base and transversal ordering, not canonical, but [`Chain::unrank`] is
    /// its exact inverse.
    pub(crate) fn rank(&self, g: &Perm) -> Option<BigUint> {
        let (_, digits) = self.sift(g)?;
        let mut rank = BigUint::zero();
        for (level, digit) in self.levels.iter().zip(digits) {
            rank = rank * BigUint::from(level.orbit.len()) + BigUint::from(digit);
        }
        Some(rank)
    }

    /// The member with the given rank, or `None` when the rank is not below the order.
    ///
    /// Decodes the mixed-radix digits as an explicit digit array, then multiplies the selected
    /// transversal factors, innermost level applying first.
    pub(crate) fn unrank(&self, rank: &BigUint) -> Option<Perm> {
        if *rank >= self.order() {
            return None;
        }
        let mut digits = vec![0; self.levels.len()];
        let mut rest = rank.clone();
        for (index, level) in self.levels.iter().enumerate().rev() {
            let (quotient, digit) = rest.div_rem(&BigUint::from(level.orbit.len()));
            digits[index] = match digit.to_usize() {
                Some(digit) => digit,
                None => unreachable!("mixed-radix digit exceeds its orbit length"),
            };
            rest = quotient;
        }
        debug_assert!(rest.is_zero());

        let mut element = Perm::identity();
        for (level, &digit) in self.levels.iter().zip(digits.iter()).rev() {
            element = element.prod(&level.transversal[digit]);
        }
        Some(element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(images: &[El]) -> Perm {
        Perm::from_images(images.to_vec()).unwrap()
    }

    #[test]
    fn chain_of_trivial_group_is_empty() {
        let chain = build(4, &[]);
        assert!(chain.levels.is_empty());
        assert_eq!(chain.order(), BigUint::from(1u32));
        assert!(chain.contains(&Perm::identity()));
        assert!(!chain.contains(&p(&[1, 0])));
        assert_eq!(chain.unrank(&BigUint::from(0u32)), Some(Perm::identity()));
        assert_eq!(chain.unrank(&BigUint::from(1u32)), None);
    }

    #[test]
    fn chain_levels_fix_previous_bases() {
        let chain = build(5, &[p(&[1, 2, 3, 4, 0]), p(&[1, 0, 2, 3, 4])]);
        assert_eq!(chain.order(), BigUint::from(120u32));
        for (depth, level) in chain.levels.iter().enumerate() {
            for gen in &level.gens {
                for fixed in &chain.levels[..depth] {
                    assert_eq!(gen.image(fixed.base), fixed.base);
                }
            }
            assert_eq!(level.transversal[0], Perm::identity());
            for (index, &point) in level.orbit.iter().enumerate() {
                assert_eq!(level.transversal[index].image(level.base), point);
            }
        }
    }

    #[test]
    fn decompose_reconstructs_member() {
        let chain = build(5, &[p(&[1, 2, 3, 4, 0]), p(&[1, 0, 2, 3, 4])]);
        let member = p(&[2, 0, 4, 1, 3]);
        let factors = chain.decompose(&member).unwrap();
        let product = factors
            .iter()
            .rev()
            .fold(Perm::identity(), |acc, factor| acc.prod(factor));
        assert_eq!(product, member);
    }
}
