//! Object references between the export and import tables.

#[cfg(feature = "serde")]
use serde::Serialize;

/// A reference to an object of the package or one it imports.
///
/// On disk a reference is a single signed integer: negative values point into the import table,
/// positive values into the export table (both one-based) and zero is the null reference.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "table", content = "index", rename_all = "lowercase"))]
pub enum ObjectRef {
    /// Refers to nothing
    #[default]
    Null,

    /// Zero-based index into the import table
    Import(u32),

    /// Zero-based index into the export table
    Export(u32),
}

impl ObjectRef {
    /// Resolves a raw reference as stored in the package
    pub const fn resolve(raw: i32) -> Self {
        if raw < 0 {
            // -(raw + 1) cannot overflow, even for i32::MIN
            ObjectRef::Import((-(raw + 1)) as u32)
        } else if raw > 0 {
            ObjectRef::Export((raw - 1) as u32)
        } else {
            ObjectRef::Null
        }
    }

    /// The raw value this reference is stored as
    ///
    /// Returns `None` when the index does not fit a raw reference: imports above `i32::MAX`,
    /// exports above `i32::MAX - 1`.
    pub const fn to_raw(self) -> Option<i32> {
        match self {
            ObjectRef::Null => Some(0),
            ObjectRef::Import(index) if index <= i32::MAX as u32 => Some(-(index as i32) - 1),
            ObjectRef::Export(index) if index < i32::MAX as u32 => Some(index as i32 + 1),
            _ => None,
        }
    }

    /// Zero-based table index, `-1` for the null reference
    pub const fn index(self) -> i32 {
        match self {
            ObjectRef::Null => -1,
            ObjectRef::Import(index) | ObjectRef::Export(index) => index as i32,
        }
    }

    /// Whether this reference points into the import table
    pub const fn is_import(self) -> bool {
        matches!(self, ObjectRef::Import(_))
    }

    pub const fn is_null(self) -> bool {
        matches!(self, ObjectRef::Null)
    }
}

impl From<i32> for ObjectRef {
    fn from(raw: i32) -> Self {
        ObjectRef::resolve(raw)
    }
}

impl std::fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ObjectRef::Null => write!(f, "null"),
            ObjectRef::Import(index) => write!(f, "import:{index}"),
            ObjectRef::Export(index) => write!(f, "export:{index}"),
        }
    }
}
