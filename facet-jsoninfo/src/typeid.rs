use core::any::TypeId;
use core::cmp::Ordering;
use core::fmt::{self, Debug};
use core::hash::{Hash, Hasher};

/// `TypeId` equivalent usable in const contexts.
///
/// This is the registry's cache key: every [`Shape`](crate::Shape) carries
/// one, and two shapes describe the same type iff their ids compare equal.
#[derive(Copy, Clone)]
pub struct ConstTypeId {
    type_id_fn: fn() -> TypeId,
}

impl ConstTypeId {
    /// Create a [`ConstTypeId`] for a type.
    #[must_use]
    pub const fn of<T>() -> Self
    where
        T: ?Sized + 'static,
    {
        ConstTypeId {
            type_id_fn: TypeId::of::<T>,
        }
    }

    /// Get the underlying [`TypeId`] for this `ConstTypeId`.
    #[inline]
    pub fn get(self) -> TypeId {
        (self.type_id_fn)()
    }
}

impl Debug for ConstTypeId {
    #[inline]
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        Debug::fmt(&self.get(), formatter)
    }
}

impl PartialEq for ConstTypeId {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.get() == other.get()
    }
}

impl PartialEq<TypeId> for ConstTypeId {
    #[inline]
    fn eq(&self, other: &TypeId) -> bool {
        self.get() == *other
    }
}

impl Eq for ConstTypeId {}

impl PartialOrd for ConstTypeId {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(Ord::cmp(self, other))
    }
}

impl Ord for ConstTypeId {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        Ord::cmp(&self.get(), &other.get())
    }
}

impl Hash for ConstTypeId {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Must agree with `Eq`: the same generic fn can be instantiated in
        // several codegen units, so its address is not a stable key.
        self.get().hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of(id: ConstTypeId) -> u64 {
        let mut hasher = DefaultHasher::new();
        id.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn same_type_same_id() {
        assert_eq!(ConstTypeId::of::<u32>(), ConstTypeId::of::<u32>());
        assert_eq!(
            hash_of(ConstTypeId::of::<Vec<u8>>()),
            hash_of(ConstTypeId::of::<Vec<u8>>())
        );
        assert_eq!(ConstTypeId::of::<str>(), TypeId::of::<str>());
    }

    #[test]
    fn different_types_differ() {
        assert_ne!(ConstTypeId::of::<u32>(), ConstTypeId::of::<i32>());
        assert_ne!(ConstTypeId::of::<Box<u8>>(), ConstTypeId::of::<u8>());
    }
}
