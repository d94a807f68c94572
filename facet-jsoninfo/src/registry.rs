use alloc::sync::Arc;
use std::collections::HashMap;

use parking_lot::RwLock;

use crate::{ConstTypeId, Describe, FieldEnumerator, Shape, ShapeFields, TypeInfo, trace};

/// Memoizes a [`TypeInfo`] per type.
///
/// Pointers are transparent: `T`, `Box<T>`, `&Arc<T>` all map to the same
/// entry. Once a `TypeInfo` has been returned for a type, every later lookup
/// returns the same `Arc` (check with [`Arc::ptr_eq`]). Entries are never
/// evicted; the key space is the set of types the program asks about.
///
/// Lookups only take a read lock. A miss computes the `TypeInfo` with no lock
/// held and then publishes it; if another thread published the same type in
/// the meantime, its entry wins and the local copy is dropped.
pub struct Registry<E = ShapeFields> {
    types: RwLock<HashMap<ConstTypeId, Arc<TypeInfo>>>,
    enumerator: E,
}

impl Registry {
    /// An empty registry using [`ShapeFields`] with default settings.
    pub fn new() -> Self {
        Self::with_enumerator(ShapeFields::new())
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: FieldEnumerator> Registry<E> {
    /// An empty registry resolving struct fields with `enumerator`.
    pub fn with_enumerator(enumerator: E) -> Self {
        Self {
            types: RwLock::new(HashMap::new()),
            enumerator,
        }
    }

    /// The field enumerator this registry was built with.
    pub fn enumerator(&self) -> &E {
        &self.enumerator
    }

    /// Returns the metadata for `T`.
    #[inline]
    pub fn type_info<T: Describe + ?Sized>(&self) -> Arc<TypeInfo> {
        self.type_info_for_shape(T::SHAPE)
    }

    /// Returns the metadata for the type of `value`.
    #[inline]
    pub fn type_info_of_val<T: Describe + ?Sized>(&self, _value: &T) -> Arc<TypeInfo> {
        self.type_info_for_shape(T::SHAPE)
    }

    /// Returns the metadata for `shape`, computing it on first use.
    pub fn type_info_for_shape(&self, shape: &'static Shape) -> Arc<TypeInfo> {
        let shape = shape.canonical();

        if let Some(info) = self.types.read().get(&shape.id) {
            return Arc::clone(info);
        }

        trace!("computing type info for {}", shape);
        let computed = Arc::new(TypeInfo::compute(shape, &self.enumerator));

        let mut types = self.types.write();
        let published = types.entry(shape.id).or_insert_with(|| {
            trace!("publishing type info for {}", shape);
            Arc::clone(&computed)
        });
        Arc::clone(published)
    }

    /// Returns the metadata for `shape` if it was already computed.
    pub fn get(&self, shape: &'static Shape) -> Option<Arc<TypeInfo>> {
        self.types.read().get(&shape.canonical().id).cloned()
    }

    /// Number of types with published metadata.
    pub fn len(&self) -> usize {
        self.types.read().len()
    }

    /// Check if no metadata was computed yet.
    pub fn is_empty(&self) -> bool {
        self.types.read().is_empty()
    }
}

impl<E> core::fmt::Debug for Registry<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Registry")
            .field("types", &self.types.read().len())
            .finish_non_exhaustive()
    }
}
