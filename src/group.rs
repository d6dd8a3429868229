//! Permutation groups given by generators.
use std::cell::{OnceCell, RefCell};
use std::collections::BTreeSet;
use std::fmt;

use num_bigint::BigUint;
use num_traits::One;
use rand::Rng;

use crate::chain::{self, Chain};
use crate::error::Error;
use crate::orbit::{self, OrbitData, SchreierEntry};
use crate::perm::Perm;
use crate::random::{self, PrPool, DEFAULT_POOL, DEFAULT_WARMUPS};
use crate::El;

/// A finite permutation group, given by a list of generators acting on {0, ..., degree-1}.
///
/// A group is immutable after construction: operations that conceptually modify it (stabilizers,
/// normal closures, commutators, direct products) return a new group. Derived structures — the
/// stabilizer chain, the orbit partition of the domain, the order and the abelian flag — are
/// computed on first use and cached for the lifetime of the group. The product replacement pool
/// is the one deliberately mutable piece of derived state; it evolves with every draw and can be
/// re-seeded explicitly.
pub struct PermutationGroup {
    degree: usize,
    generators: Vec<Perm>,
    chain: OnceCell<Chain>,
    orbits: OnceCell<Vec<Vec<El>>>,
    abelian: OnceCell<bool>,
    order: OnceCell<BigUint>,
    pool: RefCell<Option<PrPool>>,
}

impl PermutationGroup {
    /// Create a group from a list of generators.
    ///
    /// The degree is the largest degree among the generators. An empty generator list yields the
    /// trivial group of degree 0.
    pub fn new(generators: Vec<Perm>) -> PermutationGroup {
        let degree = generators.iter().map(Perm::degree).max().unwrap_or(0);
        Self::from_parts(generators, degree)
    }

    /// Create a group acting on an explicitly given domain size.
    ///
    /// Use this when the group acts on more points than the generators move (the extra points are
    /// fixed, but participate in orbit and block computations). Fails when the requested degree
    /// is smaller than some generator requires; the domain is never silently truncated.
    pub fn with_degree(generators: Vec<Perm>, degree: usize) -> Result<PermutationGroup, Error> {
        let required = generators.iter().map(Perm::degree).max().unwrap_or(0);
        if degree < required {
            return Err(Error::DegreeTooSmall {
                given: degree,
                required,
            });
        }
        Ok(Self::from_parts(generators, degree))
    }

    pub(crate) fn from_parts(generators: Vec<Perm>, degree: usize) -> PermutationGroup {
        assert!(degree <= El::max_value() as usize);
        PermutationGroup {
            degree,
            generators,
            chain: OnceCell::new(),
            orbits: OnceCell::new(),
            abelian: OnceCell::new(),
            order: OnceCell::new(),
            pool: RefCell::new(None),
        }
    }

    /// The size of the domain this group acts on.
    pub fn degree(&self) -> usize {
        self.degree
    }

    /// The generators the group was constructed from.
    pub fn generators(&self) -> &[Perm] {
        &self.generators
    }

    fn chain(&self) -> &Chain {
        self.chain
            .get_or_init(|| chain::build(self.degree, &self.generators))
    }

    fn orbit_data(&self, point: El) -> OrbitData {
        assert!(
            (point as usize) < self.degree,
            "point {} outside the domain of degree {}",
            point,
            self.degree
        );
        orbit::orbit_data(self.degree, &self.generators, point)
    }

    /// The group order.
    pub fn order(&self) -> &BigUint {
        self.order.get_or_init(|| self.chain().order())
    }

    /// The base points of the stabilizer chain.
    pub fn base(&self) -> Vec<El> {
        self.chain().levels.iter().map(|level| level.base).collect()
    }

    /// Whether the group is abelian.
    ///
    /// It suffices to check that every pair of generators commutes.
    pub fn is_abelian(&self) -> bool {
        *self.abelian.get_or_init(|| {
            self.generators.iter().enumerate().all(|(index, a)| {
                self.generators[index + 1..]
                    .iter()
                    .all(|b| a.prod(b) == b.prod(a))
            })
        })
    }

    /// The orbit of a point, in breadth-first discovery order.
    ///
    /// Panics if the point is outside the domain.
    pub fn orbit(&self, point: El) -> Vec<El> {
        self.orbit_data(point).orbit
    }

    /// The partition of the whole domain into orbits.
    ///
    /// Each orbit is sorted ascending and orbits are ordered by smallest element. Computed once
    /// and cached; transitivity and primitivity queries reuse it.
    pub fn orbits(&self) -> &[Vec<El>] {
        self.orbits.get_or_init(|| {
            let mut seen = vec![false; self.degree];
            let mut orbits = Vec::new();
            for point in 0..self.degree {
                if seen[point] {
                    continue;
                }
                let mut orbit = self.orbit_data(point as El).orbit;
                for &reached in &orbit {
                    seen[reached as usize] = true;
                }
                orbit.sort_unstable();
                orbits.push(orbit);
            }
            orbits
        })
    }

    /// One representative point per orbit: the smallest.
    pub fn orbit_reps(&self) -> Vec<El> {
        self.orbits().iter().map(|orbit| orbit[0]).collect()
    }

    /// Whether the group has a single orbit covering the whole domain.
    pub fn is_transitive(&self) -> bool {
        self.orbits().len() == 1
    }

    /// The Schreier vector of a point: for every domain point, which generator first reached it
    /// in the breadth-first closure of the orbit.
    ///
    /// The exact entries depend on the generator order; the root entry is always
    /// [`SchreierEntry::Root`] and walking entries backward reconstructs the orbit transversal.
    /// Panics if the point is outside the domain.
    pub fn schreier_vector(&self, point: El) -> Vec<SchreierEntry> {
        self.orbit_data(point).schreier
    }

    /// A transversal element per orbit point: `result[i]` maps `point` to `orbit(point)[i]`.
    ///
    /// Panics if the point is outside the domain.
    pub fn orbit_transversal(&self, point: El) -> Vec<Perm> {
        self.orbit_data(point).full_transversal(&self.generators)
    }

    /// Like [`orbit_transversal`][Self::orbit_transversal], but pairs every transversal element
    /// with the orbit point it maps the root to.
    pub fn orbit_transversal_pairs(&self, point: El) -> Vec<(El, Perm)> {
        let data = self.orbit_data(point);
        let transversal = data.full_transversal(&self.generators);
        data.orbit.iter().copied().zip(transversal).collect()
    }

    /// A group element mapping `alpha` to `beta`, or `None` when `beta` is not in the orbit of
    /// `alpha`.
    ///
    /// Panics if `alpha` is outside the domain.
    pub fn orbit_rep(&self, alpha: El, beta: El) -> Option<Perm> {
        self.orbit_data(alpha)
            .transversal_to(&self.generators, beta)
    }

    /// The pointwise stabilizer of a point, as a new group over the same domain.
    ///
    /// Computed by a single Schreier step on the group's generators; the result carries its own
    /// lazily built chain, so stabilizer calls chain naturally.
    ///
    /// Panics if the point is outside the domain.
    pub fn stabilizer(&self, point: El) -> PermutationGroup {
        let data = self.orbit_data(point);
        let transversal = data.full_transversal(&self.generators);
        let gens = chain::schreier_generators(&self.generators, &data, &transversal);
        PermutationGroup::from_parts(gens, self.degree)
    }

    /// The transversals of every stabilizer chain level, outermost level first.
    ///
    /// Each level lists one coset representative per orbit point of its base, identity first.
    pub fn coset_repr(&self) -> Vec<Vec<Perm>> {
        self.chain()
            .levels
            .iter()
            .map(|level| level.transversal.clone())
            .collect()
    }

    /// The generating sets of the proper stabilizer levels of the chain (everything below the
    /// group itself), outermost first.
    pub fn stabilizers_gens(&self) -> Vec<Vec<Perm>> {
        self.chain()
            .levels
            .iter()
            .skip(1)
            .map(|level| level.gens.clone())
            .collect()
    }

    /// Decompose a permutation into transversal factors, one per chain level, outermost level
    /// first. The product of the factors in reverse order reconstructs the permutation.
    ///
    /// Returns `None` when the permutation is not a member; this is a defined result, not an
    /// error.
    pub fn coset_decomposition(&self, g: &Perm) -> Option<Vec<Perm>> {
        if g.degree() > self.degree {
            return None;
        }
        self.chain().decompose(g)
    }

    /// Whether the permutation is a member of this group.
    pub fn has_element(&self, g: &Perm) -> bool {
        g.degree() <= self.degree && self.chain().contains(g)
    }

    /// The rank of a member in `[0, order)`, or `None` for non-members.
    ///
    /// Ranks are a mixed-radix reading of the coset decomposition (most significant digit at the
    /// outermost chain level). The induced order on elements is an artifact of the base and
    /// transversal ordering — not canonical — but it is a total bijection onto `[0, order)` and
    /// [`coset_unrank`][Self::coset_unrank] inverts it exactly.
    pub fn coset_rank(&self, g: &Perm) -> Option<BigUint> {
        if g.degree() > self.degree {
            return None;
        }
        self.chain().rank(g)
    }

    /// The member with the given rank, or `None` when the rank is not below the order.
    pub fn coset_unrank(&self, rank: &BigUint) -> Option<Perm> {
        self.chain().unrank(rank)
    }

    /// Iterator over all group elements in rank order.
    ///
    /// The first element is the identity. Driven by [`coset_unrank`][Self::coset_unrank], so the
    /// full enumeration costs one unranking per element and no storage of the element set.
    pub fn elements(&self) -> Elements<'_> {
        Elements {
            group: self,
            next: BigUint::default(),
        }
    }

    /// Whether this group is a subgroup of `other`.
    ///
    /// Groups of different degrees are never comparable, matching group equality.
    pub fn is_subgroup(&self, other: &PermutationGroup) -> bool {
        self.degree == other.degree
            && self
                .generators
                .iter()
                .all(|gen| other.has_element(gen))
    }

    /// Whether this group is normalized by `other`: every conjugate of a generator of `self` by
    /// a generator of `other` is again a member of `self`.
    ///
    /// This checks invariance under conjugation only; it does not check that `self` is contained
    /// in `other`.
    pub fn is_normal(&self, other: &PermutationGroup) -> bool {
        other.generators.iter().all(|g| {
            self.generators
                .iter()
                .all(|h| self.has_element(&conjugate(h, g)))
        })
    }

    /// The smallest subgroup normal in this group containing the given permutations.
    ///
    /// Repeatedly conjugates the candidate generators by the group's generators, adding every
    /// conjugate that fails membership, until closed.
    ///
    /// Panics if a candidate moves a point outside the domain.
    pub fn normal_closure(&self, generators: &[Perm]) -> PermutationGroup {
        assert!(
            generators.iter().all(|gen| gen.degree() <= self.degree),
            "normal closure generators must act within the group's domain"
        );
        let mut closure = PermutationGroup::from_parts(generators.to_vec(), self.degree);
        loop {
            let mut added: Vec<Perm> = Vec::new();
            for g in &self.generators {
                for h in closure.generators() {
                    let conjugated = conjugate(h, g);
                    if !closure.has_element(&conjugated) && !added.contains(&conjugated) {
                        added.push(conjugated);
                    }
                }
            }
            if added.is_empty() {
                return closure;
            }
            let mut gens = closure.generators().to_vec();
            gens.extend(added);
            closure = PermutationGroup::from_parts(gens, self.degree);
        }
    }

    /// The commutator subgroup.
    ///
    /// The normal closure of the pairwise generator commutators [a,b] = a⁻¹·b⁻¹·a·b; the
    /// pairwise commutators alone need not be closed under the group.
    pub fn commutator(&self) -> PermutationGroup {
        let mut commutators = BTreeSet::new();
        for a in &self.generators {
            for b in &self.generators {
                let commutator = a.inv().prod(&b.inv()).prod(a).prod(b);
                if !commutator.is_identity() {
                    commutators.insert(commutator);
                }
            }
        }
        let commutators: Vec<Perm> = commutators.into_iter().collect();
        self.normal_closure(&commutators)
    }

    /// Whether the group is solvable: the derived series reaches the trivial group.
    ///
    /// The series is cut off as soon as the order stops shrinking, so at most log2(order)
    /// commutator steps are taken.
    pub fn is_solvable(&self) -> bool {
        let mut order = self.order().clone();
        if order.is_one() {
            return true;
        }
        let mut derived = self.commutator();
        loop {
            let derived_order = derived.order().clone();
            if derived_order.is_one() {
                return true;
            }
            if derived_order == order {
                return false;
            }
            order = derived_order;
            derived = derived.commutator();
        }
    }

    /// The finest block system in which the given points share a block.
    ///
    /// Returns one entry per domain point: the smallest point of its block. Union-find over
    /// point pairs: seed points are merged, then images of merged pairs under every generator are
    /// merged until closed. With fewer than two seed points the result is the discrete partition.
    ///
    /// Panics if a seed point is outside the domain.
    pub fn minimal_block(&self, points: &[El]) -> Vec<El> {
        assert!(
            points.iter().all(|&point| (point as usize) < self.degree),
            "block seed points must lie in the domain"
        );
        let mut parent: Vec<El> = (0..self.degree as El).collect();

        fn find(parent: &mut [El], mut point: El) -> El {
            while parent[point as usize] != point {
                let grandparent = parent[parent[point as usize] as usize];
                parent[point as usize] = grandparent;
                point = grandparent;
            }
            point
        }

        let mut pending: Vec<(El, El)> = points
            .iter()
            .skip(1)
            .map(|&point| (points[0], point))
            .collect();
        while let Some((a, b)) = pending.pop() {
            let root_a = find(&mut parent, a);
            let root_b = find(&mut parent, b);
            if root_a == root_b {
                continue;
            }
            // smaller point becomes the block label
            let (low, high) = if root_a < root_b {
                (root_a, root_b)
            } else {
                (root_b, root_a)
            };
            parent[high as usize] = low;
            for gen in &self.generators {
                pending.push((gen.image(root_a), gen.image(root_b)));
            }
        }

        (0..self.degree as El)
            .map(|point| find(&mut parent, point))
            .collect()
    }

    /// Whether the group is primitive: transitive with no nontrivial block system.
    ///
    /// Checks, for one representative per orbit of the stabilizer of point 0, that the minimal
    /// block system joining 0 with the representative is the whole domain.
    ///
    /// Panics if the group is not transitive; primitivity is only defined for transitive groups.
    pub fn is_primitive(&self) -> bool {
        assert!(
            self.is_transitive(),
            "primitivity is only defined for transitive groups"
        );
        self.primitive_over(&self.stabilizer(0))
    }

    /// Randomized variant of [`is_primitive`][Self::is_primitive]: instead of the exact
    /// stabilizer, a group generated by a few random stabilizer members picks the seed points.
    ///
    /// A subgroup of the stabilizer only refines its orbits, so this tests at least the points
    /// the exact variant tests; the answer is always correct, randomness only affects how many
    /// block computations run.
    ///
    /// Panics if the group is not transitive.
    pub fn is_primitive_randomized<R: Rng>(&self, rng: &mut R) -> bool {
        assert!(
            self.is_transitive(),
            "primitivity is only defined for transitive groups"
        );
        let samples = self.generators.len().max(1);
        let gens = (0..samples).map(|_| self.random_stab(0, rng)).collect();
        self.primitive_over(&PermutationGroup::from_parts(gens, self.degree))
    }

    fn primitive_over(&self, stabilizer: &PermutationGroup) -> bool {
        let whole: Vec<El> = vec![0; self.degree];
        stabilizer
            .orbits()
            .iter()
            .all(|orbit| orbit[0] == 0 || self.minimal_block(&[0, orbit[0]]) == whole)
    }

    /// The largest proper divisor of the degree.
    ///
    /// Nontrivial block systems cut the domain into at least two equal blocks, so their block
    /// size is at most this.
    pub fn max_div(&self) -> usize {
        let degree = self.degree;
        if degree < 2 {
            return 1;
        }
        for divisor in 2..=degree {
            if degree % divisor == 0 {
                return degree / divisor;
            }
        }
        1
    }

    /// The direct product of two groups, acting on the disjoint union of their domains.
    ///
    /// The degree is the sum of the factors' degrees; the second factor's generators are shifted
    /// past the first factor's domain.
    pub fn direct_product(&self, other: &PermutationGroup) -> PermutationGroup {
        let offset = self.degree as El;
        let mut gens = self.generators.clone();
        for gen in &other.generators {
            let images = (0..self.degree + other.degree)
                .map(|point| {
                    if point < self.degree {
                        point as El
                    } else {
                        gen.image(point as El - offset) + offset
                    }
                })
                .collect();
            gens.push(Perm::from_images_unchecked(images));
        }
        PermutationGroup::from_parts(gens, self.degree + other.degree)
    }

    /// Draw a pseudo-random group element by product replacement.
    ///
    /// The pool is seeded from the generators on first use (pool size 11, 50 warm-up draws) and
    /// evolves with every draw. The distribution approaches uniform as the pool mixes; use
    /// [`random_pr_init`][Self::random_pr_init] to re-seed with explicit parameters.
    pub fn random_pr<R: Rng>(&self, rng: &mut R) -> Perm {
        let mut slot = self.pool.borrow_mut();
        let pool = slot.get_or_insert_with(|| {
            PrPool::new(&self.generators, DEFAULT_POOL, DEFAULT_WARMUPS, rng)
        });
        pool.draw(rng)
    }

    /// Discard the product replacement pool and seed a fresh one with the given pool size and
    /// warm-up draw count.
    pub fn random_pr_init<R: Rng>(&self, pool_size: usize, warmups: usize, rng: &mut R) {
        *self.pool.borrow_mut() = Some(PrPool::new(&self.generators, pool_size, warmups, rng));
    }

    /// A random element of the stabilizer of a point.
    ///
    /// Draws one random group element and sifts it through the point's transversal: for a draw g
    /// mapping the point to β, the returned element is g·h⁻¹ with h the transversal element to β,
    /// which fixes the point.
    ///
    /// Panics if the point is outside the domain.
    pub fn random_stab<R: Rng>(&self, point: El, rng: &mut R) -> Perm {
        let data = self.orbit_data(point);
        let draw = self.random_pr(rng);
        let beta = draw.image(point);
        let to_beta = match data.transversal_to(&self.generators, beta) {
            Some(to_beta) => to_beta,
            None => unreachable!("a group element left the orbit of its point"),
        };
        draw.prod(&to_beta.inv())
    }

    /// Monte-Carlo recognition of the natural symmetric or alternating group.
    ///
    /// Draws product replacement elements looking for a cycle of prime length p with
    /// n/2 < p < n-2; a transitive group containing one contains the alternating group, so `true`
    /// is exact. `false` means no witness appeared in the `N_eps` draws derived from `eps`, and
    /// carries a one-sided false-negative probability of at most `eps` — callers must treat a
    /// `false` on a giant group as possible, if unlikely.
    ///
    /// Groups of degree below 8 (where no witness length exists) and intransitive groups answer
    /// `false` immediately.
    pub fn is_alt_sym<R: Rng>(&self, eps: f64, rng: &mut R) -> bool {
        if self.degree < 8 || !self.is_transitive() {
            return false;
        }
        let trials = random::recognition_trials(eps, self.degree);
        (0..trials).any(|_| random::is_giant_witness(&self.random_pr(rng), self.degree))
    }

    /// Run the [`is_alt_sym`][Self::is_alt_sym] classifier over an explicit element sequence
    /// instead of random draws, for deterministic replay in tests.
    pub fn is_alt_sym_with<I>(&self, draws: I) -> bool
    where
        I: IntoIterator<Item = Perm>,
    {
        if self.degree < 8 || !self.is_transitive() {
            return false;
        }
        draws
            .into_iter()
            .any(|draw| random::is_giant_witness(&draw, self.degree))
    }
}

/// The conjugate h^g = g⁻¹·h·g.
fn conjugate(h: &Perm, g: &Perm) -> Perm {
    g.inv().prod(h).prod(g)
}

/// Group equality: equal degree, equal order and containment of one in the other.
impl PartialEq for PermutationGroup {
    fn eq(&self, other: &PermutationGroup) -> bool {
        self.degree == other.degree && self.order() == other.order() && self.is_subgroup(other)
    }
}

impl Eq for PermutationGroup {}

impl fmt::Debug for PermutationGroup {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("PermutationGroup")
            .field("degree", &self.degree)
            .field("generators", &self.generators)
            .finish()
    }
}

/// Iterator over all elements of a group in rank order. See
/// [`PermutationGroup::elements`].
pub struct Elements<'a> {
    group: &'a PermutationGroup,
    next: BigUint,
}

impl<'a> Iterator for Elements<'a> {
    type Item = Perm;

    fn next(&mut self) -> Option<Perm> {
        let element = self.group.coset_unrank(&self.next)?;
        self.next += 1u32;
        Some(element)
    }
}
