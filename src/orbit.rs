//! Orbits, Schreier vectors and transversals.
use crate::perm::Perm;
use crate::El;

/// One entry of a Schreier vector.
///
/// A Schreier vector compactly encodes, for every point of an orbit, which generator first
/// reached it during the breadth-first closure of the orbit root. Walking entries backward from a
/// point to the root recovers a transversal element mapping the root to that point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchreierEntry {
    /// The point was not reached from the root.
    Unreached,
    /// The point is the orbit root.
    Root,
    /// The point was first reached by applying the generator with this index.
    Generator(usize),
}

/// Orbit of a root point under a generating set, together with the bookkeeping needed to
/// reconstruct transversal elements.
pub(crate) struct OrbitData {
    /// Orbit points in breadth-first discovery order; the root comes first.
    pub(crate) orbit: Vec<El>,
    /// Maps each domain point to its position in `orbit`.
    pub(crate) position: Vec<Option<usize>>,
    pub(crate) schreier: Vec<SchreierEntry>,
}

/// Breadth-first closure of `root` under a generating set.
///
/// Closure under the generators alone suffices: each inverse is a power of its generator, so
/// every point reachable using inverses is reachable without them. This keeps Schreier entries
/// plain generator indices.
pub(crate) fn orbit_data(degree: usize, gens: &[Perm], root: El) -> OrbitData {
    debug_assert!((root as usize) < degree);
    let mut orbit = vec![root];
    let mut position = vec![None; degree];
    let mut schreier = vec![SchreierEntry::Unreached; degree];
    position[root as usize] = Some(0);
    schreier[root as usize] = SchreierEntry::Root;

    let mut head = 0;
    while head < orbit.len() {
        let point = orbit[head];
        head += 1;
        for (index, gen) in gens.iter().enumerate() {
            let image = gen.image(point);
            debug_assert!((image as usize) < degree);
            if position[image as usize].is_none() {
                position[image as usize] = Some(orbit.len());
                schreier[image as usize] = SchreierEntry::Generator(index);
                orbit.push(image);
            }
        }
    }

    OrbitData {
        orbit,
        position,
        schreier,
    }
}

impl OrbitData {
    /// The transversal element mapping the root to `point`, reconstructed by walking the Schreier
    /// vector back to the root. Returns `None` when the point is outside the orbit.
    pub(crate) fn transversal_to(&self, gens: &[Perm], point: El) -> Option<Perm> {
        if point as usize >= self.schreier.len() {
            return None;
        }
        let mut path = Vec::new();
        let mut current = point;
        loop {
            match self.schreier[current as usize] {
                SchreierEntry::Unreached => return None,
                SchreierEntry::Root => break,
                SchreierEntry::Generator(index) => {
                    path.push(index);
                    current = gens[index].preimage(current);
                }
            }
        }
        // the generator nearest the root applies first
        let mut transversal = Perm::identity();
        for &index in path.iter().rev() {
            transversal = transversal.prod(&gens[index]);
        }
        Some(transversal)
    }

    /// Transversal elements for every orbit point, indexed like `orbit`.
    ///
    /// Materialized by forward propagation (`t_child = t_parent · gen`), one product per orbit
    /// point, so the whole orbit is amortized linear instead of one backward walk per point.
    pub(crate) fn full_transversal(&self, gens: &[Perm]) -> Vec<Perm> {
        let mut transversal = vec![Perm::identity(); self.orbit.len()];
        for (index, &point) in self.orbit.iter().enumerate().skip(1) {
            let gen = match self.schreier[point as usize] {
                SchreierEntry::Generator(gen) => gen,
                _ => unreachable!("non-root orbit point without a Schreier entry"),
            };
            let parent = gens[gen].preimage(point);
            let parent_index = match self.position[parent as usize] {
                Some(parent_index) => parent_index,
                None => unreachable!("Schreier parent outside its own orbit"),
            };
            debug_assert!(parent_index < index);
            transversal[index] = transversal[parent_index].prod(&gens[gen]);
        }
        transversal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(images: &[El]) -> Perm {
        Perm::from_images(images.to_vec()).unwrap()
    }

    #[test]
    fn orbit_of_fixed_point_is_singleton() {
        let gens = [p(&[1, 0, 2, 3])];
        let data = orbit_data(4, &gens, 3);
        assert_eq!(data.orbit, vec![3]);
        assert_eq!(data.schreier[3], SchreierEntry::Root);
        assert_eq!(data.schreier[0], SchreierEntry::Unreached);
        assert_eq!(data.transversal_to(&gens, 0), None);
    }

    #[test]
    fn orbit_closure_and_positions() {
        // 6-cycle, orbit walks the whole domain in rotation order
        let gens = [p(&[1, 2, 3, 4, 5, 0])];
        let data = orbit_data(6, &gens, 2);
        assert_eq!(data.orbit, vec![2, 3, 4, 5, 0, 1]);
        for (index, &point) in data.orbit.iter().enumerate() {
            assert_eq!(data.position[point as usize], Some(index));
        }
    }

    #[test]
    fn transversals_map_root_to_point() {
        let gens = [p(&[1, 2, 3, 4, 5, 0]), p(&[5, 4, 3, 2, 1, 0])];
        let data = orbit_data(6, &gens, 2);
        let transversal = data.full_transversal(&gens);
        for (index, &point) in data.orbit.iter().enumerate() {
            assert_eq!(transversal[index].image(2), point);
            assert_eq!(data.transversal_to(&gens, point).unwrap().image(2), point);
        }
    }
}
