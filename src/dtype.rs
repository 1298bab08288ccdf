//! Element type tags and the tagged borrowed-slice union they dispatch over.

use std::mem;

use crate::error::IoError;

/// Element type of a NetCDF variable.
///
/// `Real` is the platform-sized "float-or-double" alias used by simulation
/// codes that pick their floating-point width at build time; it is resolved
/// to [`Float`](NcType::Float) or [`Double`](NcType::Double) at declaration
/// time from the buffer's element size, before any backend call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NcType {
    Bool,
    Byte,
    UByte,
    Char,
    Short,
    UShort,
    Int,
    UInt,
    Int64,
    UInt64,
    Float,
    Double,
    Real,
}

impl NcType {
    /// Resolve the `Real` alias from an element size in bytes.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::UnresolvedReal`] if `elem_size` matches neither
    /// `f32` nor `f64`.
    pub fn resolve_real(name: &str, elem_size: usize) -> Result<NcType, IoError> {
        if elem_size == mem::size_of::<f64>() {
            Ok(NcType::Double)
        } else if elem_size == mem::size_of::<f32>() {
            Ok(NcType::Float)
        } else {
            Err(IoError::UnresolvedReal {
                name: name.to_string(),
                elem_size,
            })
        }
    }
}

/// A borrowed, read-only source buffer tagged with its element type.
///
/// The session stores these without copying: the caller keeps ownership and
/// the data must stay valid and unchanged until the session's `write()`
/// completes. The `'a` lifetime enforces validity at compile time; the
/// session additionally rejects two variables built over the same address.
///
/// `Char` carries a whole string rather than a numeric slice; it is stored
/// in the file as a 1-D byte array over a counted record dimension.
#[derive(Debug, Clone, Copy)]
pub enum DataSlice<'a> {
    Bool(&'a [bool]),
    Byte(&'a [i8]),
    UByte(&'a [u8]),
    Char(&'a str),
    Short(&'a [i16]),
    UShort(&'a [u16]),
    Int(&'a [i32]),
    UInt(&'a [u32]),
    Int64(&'a [i64]),
    UInt64(&'a [u64]),
    Float(&'a [f32]),
    Double(&'a [f64]),
}

impl DataSlice<'_> {
    /// Number of elements in the buffer.
    pub fn len(&self) -> usize {
        match self {
            DataSlice::Bool(v) => v.len(),
            DataSlice::Byte(v) => v.len(),
            DataSlice::UByte(v) => v.len(),
            DataSlice::Char(s) => s.len(),
            DataSlice::Short(v) => v.len(),
            DataSlice::UShort(v) => v.len(),
            DataSlice::Int(v) => v.len(),
            DataSlice::UInt(v) => v.len(),
            DataSlice::Int64(v) => v.len(),
            DataSlice::UInt64(v) => v.len(),
            DataSlice::Float(v) => v.len(),
            DataSlice::Double(v) => v.len(),
        }
    }

    /// True if the buffer holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Size of one element in bytes.
    pub fn elem_size(&self) -> usize {
        match self {
            DataSlice::Bool(_) => mem::size_of::<bool>(),
            DataSlice::Byte(_) => mem::size_of::<i8>(),
            DataSlice::UByte(_) | DataSlice::Char(_) => mem::size_of::<u8>(),
            DataSlice::Short(_) => mem::size_of::<i16>(),
            DataSlice::UShort(_) => mem::size_of::<u16>(),
            DataSlice::Int(_) => mem::size_of::<i32>(),
            DataSlice::UInt(_) => mem::size_of::<u32>(),
            DataSlice::Int64(_) => mem::size_of::<i64>(),
            DataSlice::UInt64(_) => mem::size_of::<u64>(),
            DataSlice::Float(_) => mem::size_of::<f32>(),
            DataSlice::Double(_) => mem::size_of::<f64>(),
        }
    }

    /// The concrete type tag implied by the slice variant.
    pub fn nc_type(&self) -> NcType {
        match self {
            DataSlice::Bool(_) => NcType::Bool,
            DataSlice::Byte(_) => NcType::Byte,
            DataSlice::UByte(_) => NcType::UByte,
            DataSlice::Char(_) => NcType::Char,
            DataSlice::Short(_) => NcType::Short,
            DataSlice::UShort(_) => NcType::UShort,
            DataSlice::Int(_) => NcType::Int,
            DataSlice::UInt(_) => NcType::UInt,
            DataSlice::Int64(_) => NcType::Int64,
            DataSlice::UInt64(_) => NcType::UInt64,
            DataSlice::Float(_) => NcType::Float,
            DataSlice::Double(_) => NcType::Double,
        }
    }

    /// Address of the first element, used for the deferred-write alias check.
    pub(crate) fn addr(&self) -> usize {
        match self {
            DataSlice::Bool(v) => v.as_ptr() as usize,
            DataSlice::Byte(v) => v.as_ptr() as usize,
            DataSlice::UByte(v) => v.as_ptr() as usize,
            DataSlice::Char(s) => s.as_ptr() as usize,
            DataSlice::Short(v) => v.as_ptr() as usize,
            DataSlice::UShort(v) => v.as_ptr() as usize,
            DataSlice::Int(v) => v.as_ptr() as usize,
            DataSlice::UInt(v) => v.as_ptr() as usize,
            DataSlice::Int64(v) => v.as_ptr() as usize,
            DataSlice::UInt64(v) => v.as_ptr() as usize,
            DataSlice::Float(v) => v.as_ptr() as usize,
            DataSlice::Double(v) => v.as_ptr() as usize,
        }
    }

    /// Resolve a declared type tag against this buffer.
    ///
    /// `Real` resolves by element size; every other tag must match the slice
    /// variant exactly.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::UnresolvedReal`] or [`IoError::TypeMismatch`].
    pub(crate) fn resolve(&self, name: &str, tag: NcType) -> Result<NcType, IoError> {
        let resolved = match tag {
            NcType::Real => NcType::resolve_real(name, self.elem_size())?,
            other => other,
        };
        let found = self.nc_type();
        if resolved != found {
            return Err(IoError::TypeMismatch {
                name: name.to_string(),
                expected: resolved,
                found,
            });
        }
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_real_double_width() {
        assert_eq!(NcType::resolve_real("x", 8).unwrap(), NcType::Double);
    }

    #[test]
    fn resolve_real_float_width() {
        assert_eq!(NcType::resolve_real("x", 4).unwrap(), NcType::Float);
    }

    #[test]
    fn resolve_real_other_width_fails() {
        for size in [0usize, 1, 2, 16] {
            let err = NcType::resolve_real("x", size).unwrap_err();
            assert!(matches!(err, IoError::UnresolvedReal { elem_size, .. } if elem_size == size));
        }
    }

    #[test]
    fn slice_len_and_empty() {
        let v = [1.0f64, 2.0, 3.0];
        let slice = DataSlice::Double(&v);
        assert_eq!(slice.len(), 3);
        assert!(!slice.is_empty());

        let empty: [i32; 0] = [];
        assert!(DataSlice::Int(&empty).is_empty());
    }

    #[test]
    fn char_len_counts_bytes() {
        assert_eq!(DataSlice::Char("hello").len(), 5);
    }

    #[test]
    fn nc_type_matches_variant() {
        let f = [1.0f32];
        let d = [1.0f64];
        let i = [1i32];
        assert_eq!(DataSlice::Float(&f).nc_type(), NcType::Float);
        assert_eq!(DataSlice::Double(&d).nc_type(), NcType::Double);
        assert_eq!(DataSlice::Int(&i).nc_type(), NcType::Int);
    }

    #[test]
    fn resolve_real_tag_against_double_slice() {
        let d = [1.0f64, 2.0];
        let ty = DataSlice::Double(&d).resolve("phi", NcType::Real).unwrap();
        assert_eq!(ty, NcType::Double);
    }

    #[test]
    fn resolve_real_tag_against_float_slice() {
        let f = [1.0f32, 2.0];
        let ty = DataSlice::Float(&f).resolve("phi", NcType::Real).unwrap();
        assert_eq!(ty, NcType::Float);
    }

    #[test]
    fn resolve_real_tag_against_int_slice_fails() {
        // An i32 buffer has float width, but the variant does not match the
        // resolved tag; the sizeof trick alone would have accepted it.
        let i = [1i32, 2];
        let err = DataSlice::Int(&i).resolve("phi", NcType::Real).unwrap_err();
        assert!(matches!(err, IoError::TypeMismatch { .. }));
    }

    #[test]
    fn resolve_real_tag_against_short_slice_fails_on_width() {
        let s = [1i16, 2];
        let err = DataSlice::Short(&s).resolve("phi", NcType::Real).unwrap_err();
        assert!(matches!(err, IoError::UnresolvedReal { elem_size: 2, .. }));
    }

    #[test]
    fn resolve_concrete_mismatch_fails() {
        let d = [1.0f64];
        let err = DataSlice::Double(&d).resolve("n", NcType::Int).unwrap_err();
        assert!(matches!(
            err,
            IoError::TypeMismatch {
                expected: NcType::Int,
                found: NcType::Double,
                ..
            }
        ));
    }

    #[test]
    fn addr_distinguishes_buffers() {
        let a = [1.0f64, 2.0];
        let b = [1.0f64, 2.0];
        assert_ne!(DataSlice::Double(&a).addr(), DataSlice::Double(&b).addr());
        assert_eq!(DataSlice::Double(&a).addr(), DataSlice::Double(&a).addr());
    }
}
