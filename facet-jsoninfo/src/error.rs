/// Errors from typed access to the opaque slots of a [`TypeInfo`](crate::TypeInfo).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotError {
    /// The slot holds a value, but not of the requested type.
    TypeMismatch {
        /// Name of the type that was asked for.
        expected: &'static str,
    },
}

impl core::fmt::Display for SlotError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SlotError::TypeMismatch { expected } => {
                write!(f, "Slot holds a value that is not a {expected}")
            }
        }
    }
}

impl core::error::Error for SlotError {}
