use std::cmp::Ordering;
use std::iter::FusedIterator;

use crate::check;
use crate::shape::Shape;
use crate::view::{View, ViewMut};

/// Iterator over the outermost dimension of an array view.
///
/// Each step gives the array view for the next index, or a reference to the
/// element for a one-dimensional view. Besides sequential iteration, the
/// iterator supports random access relative to its position.
pub struct AxisIter<'a, T, S: Shape> {
    view: View<'a, T, S>,
    index: usize,
    end: usize,
}

/// Mutable iterator over the outermost dimension of an array view.
pub struct AxisIterMut<'a, T, S: Shape> {
    view: ViewMut<'a, T, S>,
    index: usize,
    end: usize,
}

impl<'a, T, S: Shape> AxisIter<'a, T, S> {
    pub(crate) fn new(view: View<'a, T, S>) -> Self {
        Self { view, index: 0, end: view.size() }
    }

    /// Moves the iterator by the given signed number of positions.
    ///
    /// The position is not checked, so that the iterator can be moved past the
    /// end or before the start. The iterator then gives no more items.
    pub fn advance(&mut self, offset: isize) {
        self.index = self.index.wrapping_add_signed(offset);
    }

    /// Returns the signed distance from the other iterator position.
    pub fn distance(&self, other: &Self) -> isize {
        (self.index as isize).wrapping_sub(other.index as isize)
    }

    /// Returns the item at the given offset from the current position,
    /// without moving the iterator.
    ///
    /// # Panics
    ///
    /// Panics if the resulting index is out of bounds for the array view.
    #[track_caller]
    pub fn get(&self, offset: isize) -> S::Item<'a, T> {
        match self.view.try_at(self.index.wrapping_add_signed(offset)) {
            Ok(item) => item,
            Err(error) => check::violation("AxisIter::get", error),
        }
    }

    /// Returns the current position, counted from the start of the dimension.
    pub fn position(&self) -> usize {
        self.index
    }

    /// Returns the array view that is iterated over.
    pub fn view(&self) -> View<'a, T, S> {
        self.view
    }
}

impl<'a, T, S: Shape> AxisIterMut<'a, T, S> {
    pub(crate) fn new(view: ViewMut<'a, T, S>) -> Self {
        let end = view.size();

        Self { view, index: 0, end }
    }

    /// Returns the current position, counted from the start of the dimension.
    pub fn position(&self) -> usize {
        self.index
    }
}

macro_rules! impl_axis_iter {
    ($type:ty, $item:ident, $at:ident) => {
        impl<'a, T, S: Shape> DoubleEndedIterator for $type {
            fn next_back(&mut self) -> Option<Self::Item> {
                if self.index >= self.end {
                    None
                } else {
                    self.end -= 1;

                    unsafe { Some(self.view.$at(self.end)) }
                }
            }
        }

        impl<'a, T, S: Shape> ExactSizeIterator for $type {}
        impl<'a, T, S: Shape> FusedIterator for $type {}

        impl<'a, T, S: Shape> Iterator for $type {
            type Item = S::$item<'a, T>;

            fn next(&mut self) -> Option<Self::Item> {
                if self.index >= self.end {
                    None
                } else {
                    self.index += 1;

                    unsafe { Some(self.view.$at(self.index - 1)) }
                }
            }

            fn nth(&mut self, n: usize) -> Option<Self::Item> {
                self.index = self.index.saturating_add(n);
                self.next()
            }

            fn size_hint(&self) -> (usize, Option<usize>) {
                let len = self.end.saturating_sub(self.index);

                (len, Some(len))
            }
        }
    };
}

impl_axis_iter!(AxisIter<'a, T, S>, Item, at_unchecked);
impl_axis_iter!(AxisIterMut<'a, T, S>, ItemMut, at_mut_unchecked);

impl<'a, T, S: Shape> Clone for AxisIter<'a, T, S> {
    fn clone(&self) -> Self {
        Self { view: self.view, index: self.index, end: self.end }
    }
}

impl<'a, T, S: Shape> PartialEq for AxisIter<'a, T, S> {
    fn eq(&self, other: &Self) -> bool {
        self.partial_cmp(other) == Some(Ordering::Equal)
    }
}

impl<'a, T, S: Shape> PartialOrd for AxisIter<'a, T, S> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.view.raw_parts() == other.view.raw_parts() {
            Some(self.index.cmp(&other.index))
        } else {
            None
        }
    }
}
