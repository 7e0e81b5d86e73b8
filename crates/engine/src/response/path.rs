use async_graphql_value::Name;
use error::{ErrorPath, ErrorPathSegment};

/// The position of a field in the response tree.
///
/// Backed by a persistent vector: extending the path for a child shares the
/// ancestors instead of copying them.
#[derive(Debug, Clone, Default)]
pub struct QueryPath(im::Vector<QueryPathSegment>);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryPathSegment {
    Field(Name),
    Index(usize),
}

impl QueryPath {
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn child(&self, segment: impl Into<QueryPathSegment>) -> QueryPath {
        let mut path = self.clone();
        path.0.push_back(segment.into());
        path
    }

    pub fn last(&self) -> Option<&QueryPathSegment> {
        self.0.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &QueryPathSegment> {
        self.0.iter()
    }
}

impl From<Name> for QueryPathSegment {
    fn from(name: Name) -> Self {
        QueryPathSegment::Field(name)
    }
}

impl From<usize> for QueryPathSegment {
    fn from(index: usize) -> Self {
        QueryPathSegment::Index(index)
    }
}

impl From<&QueryPath> for ErrorPath {
    fn from(path: &QueryPath) -> Self {
        path.iter()
            .map(|segment| match segment {
                QueryPathSegment::Field(name) => ErrorPathSegment::from(name.as_str()),
                QueryPathSegment::Index(index) => ErrorPathSegment::from(*index),
            })
            .collect()
    }
}
