use crate::{
  error::MarbleError,
  marble::{ErrorMarker, MarbleParser, MarbleValue, ValueMap},
  notification::MarbleSequence,
};

/// A diagram together with what its tokens and `#` stand for.
///
/// Plain `&str` converts into `Marbles` with literal tokens and the error
/// type's default marker.
///
/// ```rust
/// use rxmarble::{marble::ValueMap, testing::marbles};
///
/// let values = ValueMap::from([('a', 1), ('b', 2)]);
/// let input = marbles("-a-b-#").values(&values).error("Number too high!");
/// assert_eq!(input.diagram(), "-a-b-#");
/// ```
#[derive(Debug, Clone)]
pub struct Marbles<'a, T, E> {
  diagram: &'a str,
  values: Option<&'a ValueMap<T>>,
  error: Option<E>,
}

/// Starts a [`Marbles`] from `diagram`.
pub fn marbles<'a, T, E>(diagram: &'a str) -> Marbles<'a, T, E> {
  Marbles { diagram, values: None, error: None }
}

impl<'a, T, E> Marbles<'a, T, E> {
  /// Resolves tokens through `values` before their literal meaning.
  pub fn values(mut self, values: &'a ValueMap<T>) -> Self {
    self.values = Some(values);
    self
  }

  /// Value raised by `#`.
  pub fn error(mut self, error: E) -> Self {
    self.error = Some(error);
    self
  }

  pub fn diagram(&self) -> &'a str { self.diagram }

  pub(crate) fn value_map(&self) -> Option<&'a ValueMap<T>> { self.values }

  pub(crate) fn parse(self, parser: &MarbleParser) -> Result<MarbleSequence<T, E>, MarbleError>
  where
    T: MarbleValue + Clone,
    E: ErrorMarker,
  {
    parser.parse_sequence(self.diagram, self.values, self.error)
  }
}

impl<'a, T, E> From<&'a str> for Marbles<'a, T, E> {
  fn from(diagram: &'a str) -> Self { marbles(diagram) }
}
