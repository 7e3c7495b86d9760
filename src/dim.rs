use std::fmt::{self, Debug, Formatter};
use std::hash::Hash;

/// Array dimension trait.
pub trait Dim: Copy + Debug + Default + Eq + Hash + Send + Sync {
    /// Dimension size if known statically, or `None` if deferred.
    const SIZE: Option<usize>;

    /// Creates an array dimension with the given size.
    ///
    /// Returns `None` if the size is not matching a constant-sized dimension,
    /// or if the size is zero for a deferred dimension.
    fn try_from_size(size: usize) -> Option<Self>;

    /// Returns the number of elements in the dimension.
    fn size(self) -> usize;
}

/// Type-level constant.
#[derive(Clone, Copy, Default, Eq, Hash, PartialEq)]
pub struct Const<const N: usize>;

/// Dimension type with size deferred to construction.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Dyn(pub usize);

impl<const N: usize> Debug for Const<N> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Const").field(&N).finish()
    }
}

impl<const N: usize> Dim for Const<N> {
    const SIZE: Option<usize> = Some(N);

    fn try_from_size(size: usize) -> Option<Self> {
        (size == N).then_some(Self)
    }

    fn size(self) -> usize {
        N
    }
}

impl Dim for Dyn {
    const SIZE: Option<usize> = None;

    fn try_from_size(size: usize) -> Option<Self> {
        (size > 0).then_some(Self(size))
    }

    fn size(self) -> usize {
        self.0
    }
}

/// Returns `true` if a dimension with the given static size accepts `bound`.
pub(crate) const fn fits(size: Option<usize>, bound: usize) -> bool {
    match size {
        Some(n) => n == bound,
        None => bound > 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_size() {
        assert_eq!(Const::<4>::try_from_size(4), Some(Const));
        assert_eq!(Const::<4>::try_from_size(3), None);
        assert_eq!(Const::<0>::try_from_size(0), Some(Const));

        assert_eq!(Dyn::try_from_size(7), Some(Dyn(7)));
        assert_eq!(Dyn::try_from_size(0), None);

        assert_eq!(Const::<3>.size(), 3);
        assert_eq!(Dyn(5).size(), 5);
        assert_eq!(format!("{:?}", Const::<3>), "Const(3)");
    }

    #[test]
    fn test_fits() {
        const { assert!(fits(Some(4), 4)) };

        assert!(!fits(Some(4), 5));
        assert!(fits(None, 1));
        assert!(!fits(None, 0));
    }
}
