//! Ordered dimension lists as passed by callers to `add_variable`.

/// One requested axis: a name and a declared extent.
///
/// A positive extent is a fixed length. A negative extent marks a
/// character-array/record axis whose magnitude is the counted extent of the
/// text to be written; the backend dimension is created unbounded. Zero is
/// rejected when the dimension is declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimSpec {
    pub(crate) name: String,
    pub(crate) extent: i64,
}

impl DimSpec {
    /// The axis name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared extent (negative for character/record axes).
    pub fn extent(&self) -> i64 {
        self.extent
    }
}

/// An ordered list of requested dimensions for one variable.
///
/// Order matters: it defines the on-disk axis order of the variable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dimensions {
    dims: Vec<DimSpec>,
}

impl Dimensions {
    /// Create an empty dimension list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an axis.
    pub fn add(&mut self, name: impl Into<String>, extent: i64) {
        self.dims.push(DimSpec {
            name: name.into(),
            extent,
        });
    }

    /// Builder-style [`add`](Self::add).
    pub fn with(mut self, name: impl Into<String>, extent: i64) -> Self {
        self.add(name, extent);
        self
    }

    /// Number of axes.
    pub fn len(&self) -> usize {
        self.dims.len()
    }

    /// True if no axes were requested.
    pub fn is_empty(&self) -> bool {
        self.dims.is_empty()
    }

    /// Iterate over the axes in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &DimSpec> {
        self.dims.iter()
    }
}
