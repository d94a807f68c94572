use core::fmt;

use crate::ConstTypeId;

/// Allows querying the [`Shape`] of a type, which the [`Registry`](crate::Registry)
/// turns into a cached [`TypeInfo`](crate::TypeInfo).
///
/// Scalars, collections and smart pointers from `core`/`alloc`/`std` are
/// covered by this crate. Structs describe themselves, either by hand or with
/// [`describe_struct!`](crate::describe_struct):
///
/// ```
/// use facet_jsoninfo::{Describe, Field, Shape, shape_of};
///
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// const POINT_FIELDS: &[Field] = &[
///     Field::new("x", shape_of::<i32>),
///     Field::new("y", shape_of::<i32>).rename("why"),
/// ];
///
/// impl Describe for Point {
///     const SHAPE: &'static Shape = &Shape::structure::<Point>("Point", POINT_FIELDS);
/// }
/// ```
pub trait Describe {
    /// The shape of this type.
    const SHAPE: &'static Shape;
}

/// Returns the shape of `T`.
///
/// Mostly useful as a `fn() -> &'static Shape` pointer in [`Field::new`],
/// which lets a struct mention itself through a pointer without a const cycle.
#[inline]
pub fn shape_of<T: Describe + ?Sized>() -> &'static Shape {
    T::SHAPE
}

/// Describes a type: its identity plus what kind of value it is.
#[derive(Clone, Copy)]
pub struct Shape {
    /// Unique type identifier. Two shapes describe the same type iff their ids are equal.
    pub id: ConstTypeId,

    /// Name of the type without generic parameters, e.g. `Vec` or `Point`.
    pub type_identifier: &'static str,

    /// What kind of type this is.
    pub def: Def,
}

impl Shape {
    /// A scalar: serialized as a single JSON value, no fields.
    pub const fn scalar<T: ?Sized + 'static>(type_identifier: &'static str) -> Self {
        Self {
            id: ConstTypeId::of::<T>(),
            type_identifier,
            def: Def::Scalar,
        }
    }

    /// A type this crate knows nothing about.
    pub const fn opaque<T: ?Sized + 'static>(type_identifier: &'static str) -> Self {
        Self {
            id: ConstTypeId::of::<T>(),
            type_identifier,
            def: Def::Opaque,
        }
    }

    /// A homogeneous sequence of `item`.
    pub const fn list<T: ?Sized + 'static>(
        type_identifier: &'static str,
        item: fn() -> &'static Shape,
    ) -> Self {
        Self {
            id: ConstTypeId::of::<T>(),
            type_identifier,
            def: Def::List(item),
        }
    }

    /// A slice of `item`.
    pub const fn slice<T: ?Sized + 'static>(item: fn() -> &'static Shape) -> Self {
        Self {
            id: ConstTypeId::of::<T>(),
            type_identifier: "[]",
            def: Def::Slice(item),
        }
    }

    /// A fixed-size array of `len` times `item`.
    pub const fn array<T: ?Sized + 'static>(item: fn() -> &'static Shape, len: usize) -> Self {
        Self {
            id: ConstTypeId::of::<T>(),
            type_identifier: "[_; N]",
            def: Def::Array(ArrayDef { item, len }),
        }
    }

    /// A key-value map.
    pub const fn map<T: ?Sized + 'static>(
        type_identifier: &'static str,
        key: fn() -> &'static Shape,
        value: fn() -> &'static Shape,
    ) -> Self {
        Self {
            id: ConstTypeId::of::<T>(),
            type_identifier,
            def: Def::Map(MapDef { key, value }),
        }
    }

    /// An optional value of `inner`.
    pub const fn option<T: ?Sized + 'static>(
        type_identifier: &'static str,
        inner: fn() -> &'static Shape,
    ) -> Self {
        Self {
            id: ConstTypeId::of::<T>(),
            type_identifier,
            def: Def::Option(inner),
        }
    }

    /// A pointer to `pointee`. Pointers are transparent to the registry.
    pub const fn pointer<T: ?Sized + 'static>(
        type_identifier: &'static str,
        known: KnownPointer,
        pointee: fn() -> &'static Shape,
    ) -> Self {
        Self {
            id: ConstTypeId::of::<T>(),
            type_identifier,
            def: Def::Pointer(PointerDef { known, pointee }),
        }
    }

    /// A struct with named fields, listed in declaration order.
    pub const fn structure<T: ?Sized + 'static>(
        type_identifier: &'static str,
        fields: &'static [Field],
    ) -> Self {
        Self {
            id: ConstTypeId::of::<T>(),
            type_identifier,
            def: Def::Struct(StructType { fields }),
        }
    }

    /// Strips every layer of pointer indirection: `Box<Arc<&T>>` becomes `T`.
    ///
    /// This is the identity the registry caches under.
    pub fn canonical(&'static self) -> &'static Shape {
        let mut shape = self;
        while let Def::Pointer(ptr) = shape.def {
            shape = ptr.pointee();
        }
        shape
    }

    /// Returns the struct definition, if this shape is a struct.
    #[inline]
    pub fn as_struct(&self) -> Option<&StructType> {
        match &self.def {
            Def::Struct(st) => Some(st),
            _ => None,
        }
    }

    /// Returns true if this shape is a pointer.
    #[inline]
    pub fn is_pointer(&self) -> bool {
        matches!(self.def, Def::Pointer(_))
    }

    /// Check if this shape is of the given type
    #[inline]
    pub fn is_type<T: ?Sized + 'static>(&self) -> bool {
        self.id == ConstTypeId::of::<T>()
    }
}

impl PartialEq for Shape {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Shape {}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.def {
            Def::List(item) => write!(f, "{}<{}>", self.type_identifier, item()),
            Def::Slice(item) => write!(f, "[{}]", item()),
            Def::Array(array) => write!(f, "[{}; {}]", array.item(), array.len),
            Def::Option(inner) => write!(f, "{}<{}>", self.type_identifier, inner()),
            Def::Map(map) => write!(
                f,
                "{}<{}, {}>",
                self.type_identifier,
                map.key(),
                map.value()
            ),
            Def::Pointer(ptr) => match ptr.known {
                KnownPointer::SharedRef | KnownPointer::MutRef => {
                    write!(f, "{}{}", self.type_identifier, ptr.pointee())
                }
                _ => write!(f, "{}<{}>", self.type_identifier, ptr.pointee()),
            },
            Def::Scalar | Def::Struct(_) | Def::Opaque => f.write_str(self.type_identifier),
        }
    }
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Shape({self})")
    }
}

/// The kind of a type, as far as JSON field resolution cares.
#[derive(Clone, Copy, Debug)]
pub enum Def {
    /// Booleans, numbers, strings and the like.
    Scalar,

    /// `Vec<T>`
    List(fn() -> &'static Shape),

    /// `[T]`
    Slice(fn() -> &'static Shape),

    /// `[T; N]`
    Array(ArrayDef),

    /// `HashMap<K, V>`, `BTreeMap<K, V>`
    Map(MapDef),

    /// `Option<T>`
    Option(fn() -> &'static Shape),

    /// `Box<T>`, `Rc<T>`, `Arc<T>`, `&T`, `&mut T`
    Pointer(PointerDef),

    /// A struct with named fields.
    Struct(StructType),

    /// Anything else.
    Opaque,
}

/// Item shape and length of a fixed-size array.
#[derive(Clone, Copy, Debug)]
pub struct ArrayDef {
    /// shape of the items
    pub item: fn() -> &'static Shape,
    /// number of items
    pub len: usize,
}

impl ArrayDef {
    /// Returns the shape of the items
    #[inline]
    pub fn item(&self) -> &'static Shape {
        (self.item)()
    }
}

/// Key and value shapes of a map.
#[derive(Clone, Copy, Debug)]
pub struct MapDef {
    /// shape of the keys
    pub key: fn() -> &'static Shape,
    /// shape of the values
    pub value: fn() -> &'static Shape,
}

impl MapDef {
    /// Returns the shape of the keys
    #[inline]
    pub fn key(&self) -> &'static Shape {
        (self.key)()
    }

    /// Returns the shape of the values
    #[inline]
    pub fn value(&self) -> &'static Shape {
        (self.value)()
    }
}

/// Describes a single level of indirection.
#[derive(Clone, Copy, Debug)]
pub struct PointerDef {
    /// Which pointer this is.
    pub known: KnownPointer,
    /// shape of the pointed-to type
    pub pointee: fn() -> &'static Shape,
}

impl PointerDef {
    /// Returns the shape of the pointed-to type
    #[inline]
    pub fn pointee(&self) -> &'static Shape {
        (self.pointee)()
    }
}

/// Pointers this crate knows how to see through.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum KnownPointer {
    /// `Box<T>`
    Box,
    /// `Rc<T>`
    Rc,
    /// `Arc<T>`
    Arc,
    /// `&T`
    SharedRef,
    /// `&mut T`
    MutRef,
}

/// Fields of a struct type.
#[derive(Clone, Copy, Debug)]
pub struct StructType {
    /// all fields, in declaration order
    pub fields: &'static [Field],
}

/// Bit flags for the serialization attributes of a [`Field`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FieldFlags(u8);

impl FieldFlags {
    /// No flags set.
    pub const EMPTY: Self = Self(0);

    /// Never serialized nor deserialized.
    pub const SKIP: Self = Self(1 << 0);

    /// The field's own fields are promoted into the parent object.
    pub const FLATTEN: Self = Self(1 << 1);

    /// Omitted from output when the value is empty.
    pub const OMIT_EMPTY: Self = Self(1 << 2);

    /// Scalar value is encoded inside a JSON string.
    pub const STRING: Self = Self(1 << 3);

    /// Returns true if every flag in `other` is also set in `self`.
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns the union of both flag sets.
    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl fmt::Debug for FieldFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(FieldFlags, &str); 4] = [
            (FieldFlags::SKIP, "SKIP"),
            (FieldFlags::FLATTEN, "FLATTEN"),
            (FieldFlags::OMIT_EMPTY, "OMIT_EMPTY"),
            (FieldFlags::STRING, "STRING"),
        ];
        let mut set = f.debug_set();
        for (flag, name) in NAMES {
            if self.contains(flag) {
                set.entry(&format_args!("{name}"));
            }
        }
        set.finish()
    }
}

/// Describes a field in a struct, as declared.
#[derive(Clone, Copy, Debug)]
pub struct Field {
    /// name of the field in the source
    pub name: &'static str,

    /// shape of the inner type
    ///
    /// the layer of indirection allows for cyclic type definitions
    pub shape: fn() -> &'static Shape,

    /// wire name, if different from `name`
    pub rename: Option<&'static str>,

    /// serialization attributes
    pub flags: FieldFlags,
}

impl Field {
    /// A plain field serialized under its own name.
    pub const fn new(name: &'static str, shape: fn() -> &'static Shape) -> Self {
        Self {
            name,
            shape,
            rename: None,
            flags: FieldFlags::EMPTY,
        }
    }

    /// Serialize under `wire_name` instead of the field name.
    pub const fn rename(mut self, wire_name: &'static str) -> Self {
        self.rename = Some(wire_name);
        self
    }

    /// Exclude the field from serialization.
    pub const fn skip(mut self) -> Self {
        self.flags = self.flags.union(FieldFlags::SKIP);
        self
    }

    /// Promote the fields of this (struct-typed) field into the parent.
    pub const fn flatten(mut self) -> Self {
        self.flags = self.flags.union(FieldFlags::FLATTEN);
        self
    }

    /// Omit the field when its value is empty.
    pub const fn omit_empty(mut self) -> Self {
        self.flags = self.flags.union(FieldFlags::OMIT_EMPTY);
        self
    }

    /// Encode the scalar value inside a JSON string.
    pub const fn string(mut self) -> Self {
        self.flags = self.flags.union(FieldFlags::STRING);
        self
    }

    /// Returns the shape of the inner type
    #[inline]
    pub fn shape(&self) -> &'static Shape {
        (self.shape)()
    }

    /// The name this field has on the wire.
    #[inline]
    pub fn wire_name(&self) -> &'static str {
        self.rename.unwrap_or(self.name)
    }

    /// Returns true if the field should be skipped.
    #[inline]
    pub fn is_skipped(&self) -> bool {
        self.flags.contains(FieldFlags::SKIP)
    }

    /// Returns true if this field is flattened.
    #[inline]
    pub fn is_flattened(&self) -> bool {
        self.flags.contains(FieldFlags::FLATTEN)
    }
}

/// Implements [`Describe`] for a non-generic struct from a list of [`Field`]s.
///
/// ```
/// use facet_jsoninfo::{Field, describe_struct, shape_of};
///
/// struct Account {
///     id: u64,
///     label: String,
/// }
///
/// describe_struct!(Account {
///     Field::new("id", shape_of::<u64>).string(),
///     Field::new("label", shape_of::<String>).omit_empty(),
/// });
/// ```
#[macro_export]
macro_rules! describe_struct {
    ($ty:ident { $($field:expr),* $(,)? }) => {
        impl $crate::Describe for $ty {
            const SHAPE: &'static $crate::Shape = {
                const FIELDS: &[$crate::Field] = &[$($field),*];
                &$crate::Shape::structure::<$ty>(stringify!($ty), FIELDS)
            };
        }
    };
}
