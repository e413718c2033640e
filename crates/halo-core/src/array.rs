//! Caller-owned field arrays and named array collections.

use indexmap::IndexMap;

use crate::element::{Element, ElementKind};
use crate::error::ArrayError;

/// Typed storage behind a [`FieldArray`].
///
/// Numeric variants mirror [`ElementKind`]. `Strings` holds per-tuple
/// labels a pipeline may carry alongside numeric data; the exchange cannot
/// move it and skips such arrays.
#[derive(Clone, Debug, PartialEq)]
pub enum ArrayData {
    /// 32-bit floats.
    F32(Vec<f32>),
    /// 64-bit floats.
    F64(Vec<f64>),
    /// 8-bit signed integers.
    I8(Vec<i8>),
    /// 16-bit signed integers.
    I16(Vec<i16>),
    /// 32-bit signed integers.
    I32(Vec<i32>),
    /// 64-bit signed integers.
    I64(Vec<i64>),
    /// 8-bit unsigned integers.
    U8(Vec<u8>),
    /// 16-bit unsigned integers.
    U16(Vec<u16>),
    /// 32-bit unsigned integers.
    U32(Vec<u32>),
    /// 64-bit unsigned integers.
    U64(Vec<u64>),
    /// Text values. Not exchangeable.
    Strings(Vec<String>),
}

impl ArrayData {
    /// The numeric kind, or `None` for non-numeric storage.
    pub fn kind(&self) -> Option<ElementKind> {
        Some(match self {
            Self::F32(_) => ElementKind::F32,
            Self::F64(_) => ElementKind::F64,
            Self::I8(_) => ElementKind::I8,
            Self::I16(_) => ElementKind::I16,
            Self::I32(_) => ElementKind::I32,
            Self::I64(_) => ElementKind::I64,
            Self::U8(_) => ElementKind::U8,
            Self::U16(_) => ElementKind::U16,
            Self::U32(_) => ElementKind::U32,
            Self::U64(_) => ElementKind::U64,
            Self::Strings(_) => return None,
        })
    }

    /// Human-readable type name, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self.kind() {
            Some(kind) => kind.name(),
            None => "string",
        }
    }

    /// Number of stored values (tuples × components).
    pub fn len(&self) -> usize {
        match self {
            Self::F32(v) => v.len(),
            Self::F64(v) => v.len(),
            Self::I8(v) => v.len(),
            Self::I16(v) => v.len(),
            Self::I32(v) => v.len(),
            Self::I64(v) => v.len(),
            Self::U8(v) => v.len(),
            Self::U16(v) => v.len(),
            Self::U32(v) => v.len(),
            Self::U64(v) => v.len(),
            Self::Strings(v) => v.len(),
        }
    }

    /// Returns `true` if no values are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Zero-filled numeric storage of `kind` holding `len` values.
    pub fn zeroed(kind: ElementKind, len: usize) -> Self {
        crate::dispatch_element!(kind, T => T::wrap(vec![T::default(); len]))
    }
}

/// A named, typed array with a fixed number of components per tuple.
///
/// Tuple `t`, component `c` lives at `data[t * components + c]`. Tuples
/// follow the x-fastest layout of the extent the array is attached to.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldArray {
    name: String,
    components: usize,
    data: ArrayData,
}

impl FieldArray {
    /// Create an array, checking that `data` divides into whole tuples.
    pub fn new(
        name: impl Into<String>,
        components: usize,
        data: ArrayData,
    ) -> Result<Self, ArrayError> {
        let name = name.into();
        if components == 0 {
            return Err(ArrayError::ZeroComponents { name });
        }
        if data.len() % components != 0 {
            return Err(ArrayError::RaggedLength {
                name,
                len: data.len(),
                components,
            });
        }
        Ok(Self {
            name,
            components,
            data,
        })
    }

    /// Build a numeric array from typed values.
    pub fn from_values<T: Element>(
        name: impl Into<String>,
        components: usize,
        values: Vec<T>,
    ) -> Result<Self, ArrayError> {
        Self::new(name, components, T::wrap(values))
    }

    /// Array name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Components per tuple.
    pub fn components(&self) -> usize {
        self.components
    }

    /// Number of tuples.
    pub fn tuples(&self) -> usize {
        self.data.len() / self.components
    }

    /// Underlying storage.
    pub fn data(&self) -> &ArrayData {
        &self.data
    }

    /// Mutable access to the underlying storage.
    pub fn data_mut(&mut self) -> &mut ArrayData {
        &mut self.data
    }

    /// Numeric element kind, if any.
    pub fn kind(&self) -> Option<ElementKind> {
        self.data.kind()
    }

    /// Typed view of the values, if the array holds `T`.
    pub fn values<T: Element>(&self) -> Option<&[T]> {
        T::slice(&self.data)
    }

    /// Check that the array holds exactly `tuples` tuples.
    pub fn expect_tuples(&self, tuples: usize) -> Result<(), ArrayError> {
        if self.tuples() != tuples {
            return Err(ArrayError::LengthMismatch {
                name: self.name.clone(),
                expected: tuples,
                actual: self.tuples(),
            });
        }
        Ok(())
    }
}

/// An ordered collection of arrays keyed by name.
///
/// Insertion order is preserved: the exchange walks arrays in this order
/// on every rank, which keeps message tags aligned.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FieldData {
    arrays: IndexMap<String, FieldArray>,
}

impl FieldData {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an array, replacing any existing array of the same name in
    /// place. Returns the replaced array.
    pub fn insert(&mut self, array: FieldArray) -> Option<FieldArray> {
        self.arrays.insert(array.name.clone(), array)
    }

    /// Look up an array by name.
    pub fn get(&self, name: &str) -> Option<&FieldArray> {
        self.arrays.get(name)
    }

    /// Mutable lookup by name.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut FieldArray> {
        self.arrays.get_mut(name)
    }

    /// Number of arrays.
    pub fn len(&self) -> usize {
        self.arrays.len()
    }

    /// Returns `true` if there are no arrays.
    pub fn is_empty(&self) -> bool {
        self.arrays.is_empty()
    }

    /// Arrays in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &FieldArray> {
        self.arrays.values()
    }

    /// Array names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.arrays.keys().map(String::as_str)
    }
}

impl FromIterator<FieldArray> for FieldData {
    fn from_iter<I: IntoIterator<Item = FieldArray>>(iter: I) -> Self {
        let mut data = Self::new();
        for array in iter {
            data.insert(array);
        }
        data
    }
}
