/// The response path of a field-level error, in the order the fields were
/// traversed: alternating response keys and list indices.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Default)]
pub struct ErrorPath(Vec<ErrorPathSegment>);

impl std::ops::Deref for ErrorPath {
    type Target = Vec<ErrorPathSegment>;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::ops::DerefMut for ErrorPath {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone)]
pub enum ErrorPathSegment {
    Field(Box<str>),
    Index(usize),
}

impl From<Vec<ErrorPathSegment>> for ErrorPath {
    fn from(segments: Vec<ErrorPathSegment>) -> Self {
        ErrorPath(segments)
    }
}

impl FromIterator<ErrorPathSegment> for ErrorPath {
    fn from_iter<T: IntoIterator<Item = ErrorPathSegment>>(iter: T) -> Self {
        ErrorPath(iter.into_iter().collect())
    }
}

impl From<&str> for ErrorPathSegment {
    fn from(field: &str) -> Self {
        ErrorPathSegment::Field(field.into())
    }
}

impl From<String> for ErrorPathSegment {
    fn from(field: String) -> Self {
        ErrorPathSegment::Field(field.into_boxed_str())
    }
}

impl From<usize> for ErrorPathSegment {
    fn from(index: usize) -> Self {
        ErrorPathSegment::Index(index)
    }
}

impl ErrorPath {
    pub fn push(&mut self, segment: impl Into<ErrorPathSegment>) {
        self.0.push(segment.into());
    }

    #[must_use]
    pub fn child(&self, segment: impl Into<ErrorPathSegment>) -> ErrorPath {
        let mut path = self.clone();
        path.push(segment);
        path
    }
}

impl serde::Serialize for ErrorPath {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.0)
    }
}

impl serde::Serialize for ErrorPathSegment {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ErrorPathSegment::Field(field) => serializer.serialize_str(field),
            ErrorPathSegment::Index(index) => serializer.serialize_u64(*index as u64),
        }
    }
}

impl std::fmt::Display for ErrorPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            match segment {
                ErrorPathSegment::Field(field) => f.write_str(field)?,
                ErrorPathSegment::Index(index) => write!(f, "{index}")?,
            }
        }
        Ok(())
    }
}
