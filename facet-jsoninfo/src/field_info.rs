use alloc::vec::Vec;
use core::cmp::Ordering;
use std::collections::HashSet;

use crate::{ConstTypeId, Field, FieldFlags, Shape, debug};

/// Default bound on nested flattening, see [`ShapeFields::with_max_depth`].
pub const MAX_FLATTEN_DEPTH: usize = 32;

/// One serializable field of a struct, after flattening.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldInfo {
    /// Name of the field in its declaring struct.
    pub name: &'static str,

    /// Name of the field on the wire.
    pub wire_name: &'static str,

    /// Declaration index at each level, from the root struct down through
    /// flattened fields to this one. `[2, 0]` is field 0 of the struct
    /// flattened in as field 2.
    pub index: Vec<usize>,

    /// Shape of the field's value.
    pub shape: &'static Shape,

    /// True if the field was promoted from a flattened struct.
    pub embedded: bool,

    /// Omitted from output when the value is empty.
    pub omit_empty: bool,

    /// Scalar value is encoded inside a JSON string.
    pub as_string: bool,

    /// True if another field of the same type has the same wire name.
    pub multiple_fields: bool,
}

impl FieldInfo {
    /// Builds the entry for `field`, declared at position `position` of a
    /// struct reached through `parent_index`.
    pub fn new(field: &Field, parent_index: &[usize], position: usize) -> Self {
        let mut index = Vec::with_capacity(parent_index.len() + 1);
        index.extend_from_slice(parent_index);
        index.push(position);
        Self {
            name: field.name,
            wire_name: field.wire_name(),
            embedded: !parent_index.is_empty(),
            index,
            shape: field.shape(),
            omit_empty: field.flags.contains(FieldFlags::OMIT_EMPTY),
            as_string: field.flags.contains(FieldFlags::STRING),
            multiple_fields: false,
        }
    }

    /// How many flattened structs this field was promoted through.
    #[inline]
    pub fn depth(&self) -> usize {
        self.index.len().saturating_sub(1)
    }
}

/// The order fields are kept in: wire name, then shallower before deeper,
/// then declaration order.
pub fn cmp_sortable(a: &FieldInfo, b: &FieldInfo) -> Ordering {
    a.wire_name
        .cmp(b.wire_name)
        .then_with(|| a.index.len().cmp(&b.index.len()))
        .then_with(|| a.index.cmp(&b.index))
}

/// Sorts `fields` and flags every entry whose wire name is shared.
///
/// Returns true if any wire name is shared.
pub(crate) fn sort_and_mark(fields: &mut [FieldInfo]) -> bool {
    fields.sort_by(cmp_sortable);

    let mut multiple = false;
    for i in 1..fields.len() {
        if fields[i - 1].wire_name == fields[i].wire_name {
            debug!(
                "wire name {:?} shared by {:?} and {:?}",
                fields[i].wire_name, fields[i - 1].index, fields[i].index
            );
            fields[i - 1].multiple_fields = true;
            fields[i].multiple_fields = true;
            multiple = true;
        }
    }
    multiple
}

/// Produces the serializable fields of a struct.
///
/// Implementations must be deterministic for a given shape, and must
/// terminate on recursive types.
pub trait FieldEnumerator {
    /// Appends the fields of `shape` to `fields` and returns the list.
    ///
    /// `parent_index` is the locator of the struct `shape` was reached
    /// through; it prefixes the `index` of every appended field.
    fn append_fields(
        &self,
        fields: Vec<FieldInfo>,
        parent_index: &[usize],
        shape: &'static Shape,
    ) -> Vec<FieldInfo>;
}

/// Field enumerator driven by [`Field`] declarations.
///
/// Skipped fields are left out. Flattened fields whose value is a struct
/// (possibly behind pointers) have their own fields promoted in their place,
/// recursively. A flatten is not promoted, and the field is kept as a
/// regular field instead, when it would:
///
/// - re-enter a struct currently being flattened,
/// - go deeper than the configured bound,
/// - flatten a struct type already flattened at the same depth elsewhere in
///   the walk. Only the first occurrence (in declaration order) is promoted,
///   so a type flattening the same struct twice per level stays linear in
///   size rather than doubling at every level.
#[derive(Clone, Copy, Debug)]
pub struct ShapeFields {
    max_depth: usize,
}

impl ShapeFields {
    /// An enumerator with the default depth bound, [`MAX_FLATTEN_DEPTH`].
    pub const fn new() -> Self {
        Self {
            max_depth: MAX_FLATTEN_DEPTH,
        }
    }

    /// Sets how many levels of flattening are followed.
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// The configured depth bound.
    pub const fn max_depth(&self) -> usize {
        self.max_depth
    }

    fn walk(&self, state: &mut WalkState<'_>, shape: &'static Shape) {
        let shape = shape.canonical();
        let Some(st) = shape.as_struct() else {
            return;
        };

        state.visiting.push(shape.id);
        let depth = state.visiting.len();
        for (position, field) in st.fields.iter().enumerate() {
            if field.is_skipped() {
                continue;
            }

            if field.is_flattened() {
                let inner = field.shape().canonical();
                if inner.as_struct().is_some() {
                    if state.visiting.contains(&inner.id) {
                        debug!(
                            "not flattening {}.{}: {} is already being flattened",
                            shape, field.name, inner
                        );
                    } else if depth > self.max_depth {
                        debug!(
                            "not flattening {}.{}: deeper than {} levels",
                            shape, field.name, self.max_depth
                        );
                    } else if !state.flattened.insert((depth, inner.id)) {
                        debug!(
                            "not flattening {}.{}: {} already flattened at depth {}",
                            shape, field.name, inner, depth
                        );
                    } else {
                        state.parent_index.push(position);
                        self.walk(state, inner);
                        state.parent_index.pop();
                        continue;
                    }
                }
            }

            state
                .fields
                .push(FieldInfo::new(field, &state.parent_index, position));
        }
        state.visiting.pop();
    }
}

struct WalkState<'a> {
    fields: &'a mut Vec<FieldInfo>,
    parent_index: Vec<usize>,
    visiting: Vec<ConstTypeId>,
    /// (depth, struct) pairs already promoted
    flattened: HashSet<(usize, ConstTypeId)>,
}

impl Default for ShapeFields {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldEnumerator for ShapeFields {
    fn append_fields(
        &self,
        mut fields: Vec<FieldInfo>,
        parent_index: &[usize],
        shape: &'static Shape,
    ) -> Vec<FieldInfo> {
        let mut state = WalkState {
            fields: &mut fields,
            parent_index: parent_index.to_vec(),
            visiting: Vec::new(),
            flattened: HashSet::new(),
        };
        self.walk(&mut state, shape);
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Describe, describe_struct, shape_of};

    struct Inner;
    describe_struct!(Inner {
        Field::new("b", shape_of::<u8>),
        Field::new("a", shape_of::<u8>),
    });

    struct Outer;
    describe_struct!(Outer {
        Field::new("z", shape_of::<u8>),
        Field::new("inner", shape_of::<Box<Inner>>).flatten(),
        Field::new("hidden", shape_of::<u8>).skip(),
        Field::new("a", shape_of::<u8>),
    });

    fn wire_names(fields: &[FieldInfo]) -> Vec<&'static str> {
        fields.iter().map(|f| f.wire_name).collect()
    }

    #[test]
    fn flatten_promotes_in_declaration_order() {
        let fields = ShapeFields::new().append_fields(Vec::new(), &[], Outer::SHAPE);
        assert_eq!(wire_names(&fields), ["z", "b", "a", "a"]);
        assert_eq!(fields[1].index, [1, 0]);
        assert!(fields[1].embedded);
        assert_eq!(fields[3].index, [3]);
        assert!(!fields[3].embedded);
    }

    #[test]
    fn parent_index_prefixes_locators() {
        let fields = ShapeFields::new().append_fields(Vec::new(), &[7], Inner::SHAPE);
        assert_eq!(fields[0].index, [7, 0]);
        assert_eq!(fields[1].index, [7, 1]);
    }

    #[test]
    fn sort_puts_shallow_fields_first_and_marks_collisions() {
        let mut fields = ShapeFields::new().append_fields(Vec::new(), &[], Outer::SHAPE);
        assert!(sort_and_mark(&mut fields));
        assert_eq!(wire_names(&fields), ["a", "a", "b", "z"]);
        assert_eq!(fields[0].index, [3]);
        assert_eq!(fields[1].index, [1, 1]);
        assert!(fields[0].multiple_fields && fields[1].multiple_fields);
        assert!(!fields[2].multiple_fields && !fields[3].multiple_fields);
    }

    struct Leaf;
    describe_struct!(Leaf {
        Field::new("v", shape_of::<u8>),
    });

    struct Mid;
    describe_struct!(Mid {
        Field::new("a", shape_of::<Leaf>).flatten(),
        Field::new("b", shape_of::<Leaf>).flatten(),
    });

    struct Top;
    describe_struct!(Top {
        Field::new("x", shape_of::<Mid>).flatten(),
        Field::new("y", shape_of::<Box<Mid>>).flatten(),
    });

    #[test]
    fn repeated_flatten_at_same_depth_is_promoted_once() {
        let fields = ShapeFields::new().append_fields(Vec::new(), &[], Top::SHAPE);
        assert_eq!(wire_names(&fields), ["v", "b", "y"]);
        assert_eq!(fields[0].index, [0, 0, 0]);
        assert_eq!(fields[1].index, [0, 1]);
        assert!(fields[1].shape.is_type::<Leaf>());
        assert_eq!(fields[2].index, [1]);
    }

    #[test]
    fn depth_saturates_on_empty_index() {
        let mut fields = ShapeFields::new().append_fields(Vec::new(), &[], Inner::SHAPE);
        assert_eq!(fields[0].depth(), 0);
        fields[0].index.clear();
        assert_eq!(fields[0].depth(), 0);
    }

    #[test]
    fn depth_zero_disables_flattening() {
        let fields = ShapeFields::new()
            .with_max_depth(0)
            .append_fields(Vec::new(), &[], Outer::SHAPE);
        assert_eq!(wire_names(&fields), ["z", "inner", "a"]);
    }
}
