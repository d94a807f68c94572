//! [`Describe`] implementations for `core`, `alloc` and `std` types.

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use std::collections::HashMap;

use crate::{Describe, KnownPointer, Shape, shape_of};

macro_rules! impl_describe_for_scalar {
    ($($type:ty),* $(,)?) => {
        $(
            impl Describe for $type {
                const SHAPE: &'static Shape = &Shape::scalar::<$type>(stringify!($type));
            }
        )*
    };
}

impl_describe_for_scalar!(
    bool, char, u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64, str,
    String, (),
);

impl<T: Describe + 'static> Describe for Vec<T> {
    const SHAPE: &'static Shape = &Shape::list::<Vec<T>>("Vec", shape_of::<T>);
}

impl<T: Describe + 'static> Describe for [T] {
    const SHAPE: &'static Shape = &Shape::slice::<[T]>(shape_of::<T>);
}

impl<T: Describe + 'static, const N: usize> Describe for [T; N] {
    const SHAPE: &'static Shape = &Shape::array::<[T; N]>(shape_of::<T>, N);
}

impl<K, V, S> Describe for HashMap<K, V, S>
where
    K: Describe + 'static,
    V: Describe + 'static,
    S: 'static,
{
    const SHAPE: &'static Shape =
        &Shape::map::<HashMap<K, V, S>>("HashMap", shape_of::<K>, shape_of::<V>);
}

impl<K, V> Describe for BTreeMap<K, V>
where
    K: Describe + 'static,
    V: Describe + 'static,
{
    const SHAPE: &'static Shape =
        &Shape::map::<BTreeMap<K, V>>("BTreeMap", shape_of::<K>, shape_of::<V>);
}

impl<T: Describe + 'static> Describe for Option<T> {
    const SHAPE: &'static Shape = &Shape::option::<Option<T>>("Option", shape_of::<T>);
}

impl<T: Describe + ?Sized + 'static> Describe for Box<T> {
    const SHAPE: &'static Shape =
        &Shape::pointer::<Box<T>>("Box", KnownPointer::Box, shape_of::<T>);
}

impl<T: Describe + ?Sized + 'static> Describe for Rc<T> {
    const SHAPE: &'static Shape = &Shape::pointer::<Rc<T>>("Rc", KnownPointer::Rc, shape_of::<T>);
}

impl<T: Describe + ?Sized + 'static> Describe for Arc<T> {
    const SHAPE: &'static Shape =
        &Shape::pointer::<Arc<T>>("Arc", KnownPointer::Arc, shape_of::<T>);
}

// Lifetimes are erased from the id: `&'a T` is keyed as `&'static T`.
impl<T: Describe + ?Sized + 'static> Describe for &T {
    const SHAPE: &'static Shape =
        &Shape::pointer::<&'static T>("&", KnownPointer::SharedRef, shape_of::<T>);
}

impl<T: Describe + ?Sized + 'static> Describe for &mut T {
    const SHAPE: &'static Shape =
        &Shape::pointer::<&'static mut T>("&mut ", KnownPointer::MutRef, shape_of::<T>);
}
