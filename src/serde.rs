use serde::ser::{SerializeSeq, Serializer};
use serde::Serialize;

use crate::format::Nested;
use crate::shape::{Extents, Shape};
use crate::view::{View, ViewMut};

impl<T: Serialize, E: Extents> Serialize for Nested<'_, T, E> {
    fn serialize<R: Serializer>(&self, serializer: R) -> Result<R::Ok, R::Error> {
        match self.outer() {
            Some(outer) => {
                let mut seq = serializer.serialize_seq(Some(outer.len()))?;

                for nested in outer {
                    seq.serialize_element(&nested)?;
                }

                seq.end()
            }
            None => self.scalar().serialize(serializer),
        }
    }
}

impl<T: Serialize, S: Shape> Serialize for View<'_, T, S> {
    fn serialize<R: Serializer>(&self, serializer: R) -> Result<R::Ok, R::Error> {
        match self.raw_parts() {
            (Some(ptr), shape) => Nested::new(ptr, shape).serialize(serializer),
            (None, _) => serializer.serialize_seq(Some(0))?.end(),
        }
    }
}

impl<T: Serialize, S: Shape> Serialize for ViewMut<'_, T, S> {
    fn serialize<R: Serializer>(&self, serializer: R) -> Result<R::Ok, R::Error> {
        self.as_view().serialize(serializer)
    }
}
