//! Permutations of finite sets.
use std::cmp::max;
use std::fmt;

use crate::error::Error;
use crate::El;

/// A permutation of a finite set.
///
/// A permutation rearranges the elements of a finite set. It is a bijection from a set to the same
/// set.
///
/// In firn these sets are always {0, ..., n-1} for some n of the integer type [`El`]; n is called
/// the *degree* of the permutation. Every permutation is implicitly extended to the set of all
/// [`El`] by fixing the points past its degree, so any permutation can be applied to any point and
/// any two permutations can be composed or compared.
///
/// Internally a permutation is stored as the slice of images of {0, ..., n-1} in *minimal form*:
/// trailing fixed points are trimmed at construction. Minimal form makes equality, ordering and
/// hashing across degrees plain slice operations.
///
/// Values are immutable; every operation produces a new permutation.
///
/// Products follow the convention where applying `a.prod(&b)` is the same as applying `a` first,
/// followed by `b`. This is the convention used by the computer algebra system GAP and in much of
/// the computational group theory literature; all coset arithmetic in this crate is stated in
/// terms of it.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Perm {
    images: Box<[El]>,
}

impl Perm {
    /// The identity permutation.
    ///
    /// This is the degree-0 permutation.
    pub fn identity() -> Perm {
        Perm::default()
    }

    /// Create a permutation from the images of 0..n.
    ///
    /// Fails when the sequence is not a bijection on 0..n, i.e. when it repeats an image or
    /// contains an image outside the range.
    pub fn from_images(images: Vec<El>) -> Result<Perm, Error> {
        assert!(images.len() <= El::max_value() as usize);
        let mut seen = vec![false; images.len()];
        for &image in images.iter() {
            let index = image as usize;
            if index >= images.len() {
                return Err(Error::ImageOutOfRange {
                    image,
                    degree: images.len(),
                });
            }
            if seen[index] {
                return Err(Error::DuplicateImage { image });
            }
            seen[index] = true;
        }
        Ok(Self::from_images_unchecked(images))
    }

    /// Create a permutation from a list of cycles.
    ///
    /// The degree is the largest point mentioned plus one; unmentioned points are fixed. Fails
    /// when a point appears more than once across the cycles.
    pub fn from_cycles(cycles: &[Vec<El>]) -> Result<Perm, Error> {
        let degree = cycles
            .iter()
            .flat_map(|cycle| cycle.iter())
            .map(|&point| point as usize + 1)
            .max()
            .unwrap_or(0);
        let mut images: Vec<El> = (0..degree).map(|index| index as El).collect();
        let mut seen = vec![false; degree];
        for cycle in cycles {
            for (position, &point) in cycle.iter().enumerate() {
                if seen[point as usize] {
                    return Err(Error::RepeatedCyclePoint { point });
                }
                seen[point as usize] = true;
                images[point as usize] = cycle[(position + 1) % cycle.len()];
            }
        }
        Ok(Self::from_images_unchecked(images))
    }

    /// Build a permutation from images known to be a bijection, trimming to minimal form.
    pub(crate) fn from_images_unchecked(mut images: Vec<El>) -> Perm {
        while let Some(&last) = images.last() {
            if last as usize != images.len() - 1 {
                break;
            }
            images.pop();
        }
        Perm {
            images: images.into_boxed_slice(),
        }
    }

    /// The size of the set this permutation acts on.
    ///
    /// In minimal form this is one past the largest moved point, or 0 for the identity.
    pub fn degree(&self) -> usize {
        self.images.len()
    }

    /// The images of 0..degree.
    pub fn images(&self) -> &[El] {
        &self.images
    }

    /// Whether this is the identity permutation.
    pub fn is_identity(&self) -> bool {
        self.images.is_empty()
    }

    /// The image of a point.
    ///
    /// Points past the degree are fixed.
    pub fn image(&self, point: El) -> El {
        self.images.get(point as usize).copied().unwrap_or(point)
    }

    /// The preimage of a point: the `q` with `self.image(q) == point`.
    pub fn preimage(&self, point: El) -> El {
        for (index, &image) in self.images.iter().enumerate() {
            if image == point {
                return index as El;
            }
        }
        point
    }

    /// The inverse of this permutation.
    pub fn inv(&self) -> Perm {
        let mut images = vec![0; self.degree()];
        for (index, &image) in self.images.iter().enumerate() {
            images[image as usize] = index as El;
        }
        // no trimming needed, the support of the inverse is the support of the original
        Perm {
            images: images.into_boxed_slice(),
        }
    }

    /// The product of this permutation with another one.
    ///
    /// Applying the product is the same as applying `self` first, followed by `right`.
    pub fn prod(&self, right: &Perm) -> Perm {
        let degree = max(self.degree(), right.degree());
        let images = (0..degree)
            .map(|point| right.image(self.image(point as El)))
            .collect();
        Self::from_images_unchecked(images)
    }

    /// A power of this permutation.
    ///
    /// Negative exponents are powers of the inverse. This performs exponentiation by squaring.
    pub fn pow(&self, exponent: i64) -> Perm {
        let mut base = if exponent < 0 { self.inv() } else { self.clone() };
        let mut exponent = exponent.unsigned_abs();
        let mut result = Perm::identity();
        while exponent > 0 {
            if exponent & 1 == 1 {
                result = result.prod(&base);
            }
            exponent >>= 1;
            if exponent > 0 {
                base = base.prod(&base);
            }
        }
        result
    }

    /// Return the cycle starting at an element.
    ///
    /// Returns a 1-cycle when the element is not in the support of this permutation.
    pub fn cycle_at(&self, el: El) -> Cycle {
        Cycle {
            perm: self,
            pos: Some(el),
            start: el,
        }
    }

    /// Returns an iterator over all proper cycles of this permutation.
    ///
    /// The returned iterator does not produce any 1-cycles.
    pub fn cycles(&self) -> Cycles {
        Cycles {
            perm: self,
            seen: vec![false; self.degree()],
            pos: 0,
        }
    }
}

impl fmt::Display for Perm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut empty = true;
        for cycle in self.cycles() {
            empty = false;
            fmt::Display::fmt(&cycle, f)?;
        }
        if empty {
            f.write_str("()")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Perm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Iterator over the elements of a permutation's cycle.
#[derive(Clone)]
pub struct Cycle<'a> {
    perm: &'a Perm,
    pos: Option<El>,
    start: El,
}

impl<'a> Iterator for Cycle<'a> {
    type Item = El;

    fn next(&mut self) -> Option<El> {
        self.pos.map(|pos| {
            let next = self.perm.image(pos);
            self.pos = if next == self.start { None } else { Some(next) };

            pos
        })
    }
}

impl<'a> fmt::Display for Cycle<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut first = true;
        for el in self.clone() {
            f.write_str(if first { "(" } else { " " })?;
            first = false;
            fmt::Display::fmt(&el, f)?;
        }
        f.write_str(if first { "()" } else { ")" })
    }
}

impl<'a> fmt::Debug for Cycle<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Iterator over the proper cycles of a permutation.
#[derive(Clone)]
pub struct Cycles<'a> {
    perm: &'a Perm,
    seen: Vec<bool>,
    pos: El,
}

impl<'a> Iterator for Cycles<'a> {
    type Item = Cycle<'a>;

    fn next(&mut self) -> Option<Cycle<'a>> {
        loop {
            // We can't see a cycle for the first time on the last element, so we can stop one early
            // and avoid a potential overflow
            if self.pos as usize >= self.perm.degree() {
                return None;
            } else if self.seen[self.pos as usize] || self.perm.image(self.pos) == self.pos {
                self.pos += 1;
            } else {
                let cycle = self.perm.cycle_at(self.pos);
                for el in cycle.clone() {
                    self.seen[el as usize] = true;
                }
                return Some(cycle);
            }
        }
    }
}
