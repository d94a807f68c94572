use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::Any;
use core::fmt;

use parking_lot::RwLock;

use crate::field_info::sort_and_mark;
use crate::{FieldEnumerator, FieldInfo, Shape, SlotError};

/// A type-erased, shareable value: an extension record or a cached schema.
pub type Opaque = Arc<dyn Any + Send + Sync>;

/// JSON serialization metadata for one type.
///
/// Built once per type by a [`Registry`](crate::Registry) and shared from then
/// on. The field list is frozen at construction; extensions and the schema
/// slot can be filled in later by whoever holds the `TypeInfo`, each behind
/// its own lock.
pub struct TypeInfo {
    shape: &'static Shape,
    fields: Vec<FieldInfo>,
    multiple_fields: bool,
    extensions: RwLock<Vec<Opaque>>,
    schema: RwLock<Option<Opaque>>,
}

impl TypeInfo {
    /// Computes the metadata for `shape`, which must already be canonical.
    pub(crate) fn compute(shape: &'static Shape, enumerator: &dyn FieldEnumerator) -> Self {
        let (fields, multiple_fields) = if shape.as_struct().is_some() {
            let mut fields = enumerator.append_fields(Vec::with_capacity(16), &[], shape);
            let multiple = sort_and_mark(&mut fields);
            (fields, multiple)
        } else {
            (Vec::new(), false)
        };

        Self {
            shape,
            fields,
            multiple_fields,
            extensions: RwLock::new(Vec::new()),
            schema: RwLock::new(None),
        }
    }

    /// The type this is about, with pointers stripped.
    #[inline]
    pub fn shape(&self) -> &'static Shape {
        self.shape
    }

    /// All serializable fields, sorted by wire name.
    ///
    /// Empty for anything that is not a struct.
    #[inline]
    pub fn fields(&self) -> &[FieldInfo] {
        &self.fields
    }

    /// Whether two or more fields share a wire name.
    #[inline]
    pub fn multiple_fields(&self) -> bool {
        self.multiple_fields
    }

    /// Wire names of all fields, in the order of [`Self::fields`].
    ///
    /// A shared wire name appears once per field carrying it.
    pub fn field_names(&self) -> Vec<&'static str> {
        self.fields.iter().map(|field| field.wire_name).collect()
    }

    /// Every field serialized under `wire_name`, shallowest first.
    pub fn fields_named(&self, wire_name: &str) -> &[FieldInfo] {
        let start = self.fields.partition_point(|f| f.wire_name < wire_name);
        let len = self.fields[start..]
            .iter()
            .take_while(|f| f.wire_name == wire_name)
            .count();
        &self.fields[start..start + len]
    }

    /// The field serialized under `wire_name`. When several fields share it,
    /// the shallowest one declared first wins.
    pub fn field(&self, wire_name: &str) -> Option<&FieldInfo> {
        self.fields_named(wire_name).first()
    }

    /// Appends an extension record.
    pub fn add_extension(&self, ext: Opaque) {
        self.extensions.write().push(ext);
    }

    /// A snapshot of all extension records, in insertion order.
    pub fn extensions(&self) -> Vec<Opaque> {
        self.extensions.read().clone()
    }

    /// The extension records of type `E`, in insertion order.
    pub fn extensions_of<E: Any + Send + Sync>(&self) -> Vec<Arc<E>> {
        self.extensions
            .read()
            .iter()
            .filter_map(|ext| Arc::clone(ext).downcast::<E>().ok())
            .collect()
    }

    /// The cached schema, if one was set.
    pub fn schema(&self) -> Option<Opaque> {
        self.schema.read().clone()
    }

    /// The cached schema as an `S`.
    ///
    /// `Ok(None)` if no schema was set yet.
    pub fn schema_as<S: Any + Send + Sync>(&self) -> Result<Option<Arc<S>>, SlotError> {
        match self.schema() {
            None => Ok(None),
            Some(schema) => schema
                .downcast::<S>()
                .map(Some)
                .map_err(|_| SlotError::TypeMismatch {
                    expected: core::any::type_name::<S>(),
                }),
        }
    }

    /// Replaces the cached schema. The last writer wins.
    pub fn set_schema(&self, schema: Opaque) {
        *self.schema.write() = Some(schema);
    }

    /// Returns the cached schema, computing and storing it if there is none.
    ///
    /// `init` runs without the lock held, so concurrent callers may both
    /// compute; the first one stored is returned to everyone.
    pub fn schema_or_init(&self, init: impl FnOnce() -> Opaque) -> Opaque {
        if let Some(schema) = self.schema() {
            return schema;
        }
        let computed = init();
        Arc::clone(self.schema.write().get_or_insert(computed))
    }
}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeInfo")
            .field("shape", &self.shape)
            .field("fields", &self.field_names())
            .field("multiple_fields", &self.multiple_fields)
            .field("extensions", &self.extensions.read().len())
            .field("schema", &self.schema.read().is_some())
            .finish()
    }
}
