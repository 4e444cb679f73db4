use std::{
  collections::BTreeMap,
  convert::Infallible,
  fmt::{self, Debug},
};

/// Placeholder characters of a diagram mapped to the values they emit.
///
/// ```rust
/// use rxmarble::marble::ValueMap;
///
/// let values = ValueMap::from([('a', 1), ('b', 2)]);
/// assert_eq!(values.get('a'), Some(&1));
/// assert_eq!(values.get('z'), None);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct ValueMap<T>(BTreeMap<char, T>);

impl<T> ValueMap<T> {
  pub fn new() -> Self { Self(BTreeMap::new()) }

  pub fn insert(&mut self, token: char, value: T) -> Option<T> { self.0.insert(token, value) }

  pub fn get(&self, token: char) -> Option<&T> { self.0.get(&token) }

  pub fn len(&self) -> usize { self.0.len() }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  /// Reverse lookup used when rendering a timeline back into a diagram.
  pub fn token_of(&self, value: &T) -> Option<char>
  where
    T: PartialEq,
  {
    self.0.iter().find(|(_, v)| *v == value).map(|(k, _)| *k)
  }
}

impl<T> Default for ValueMap<T> {
  fn default() -> Self { Self::new() }
}

impl<T: Debug> Debug for ValueMap<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.debug_map().entries(&self.0).finish() }
}

impl<T, const N: usize> From<[(char, T); N]> for ValueMap<T> {
  fn from(entries: [(char, T); N]) -> Self { Self(BTreeMap::from(entries)) }
}

impl<T> FromIterator<(char, T)> for ValueMap<T> {
  fn from_iter<I: IntoIterator<Item = (char, T)>>(iter: I) -> Self { Self(iter.into_iter().collect()) }
}

/// Values a bare diagram token can stand for without a [`ValueMap`] entry.
///
/// `char` and `String` take the token itself; integer types take decimal
/// digits. Types returning `None` must be supplied through a value map.
pub trait MarbleValue: Sized {
  fn from_token(token: char) -> Option<Self>;

  /// Inverse of `from_token`, used to render timelines as diagrams.
  fn to_token(&self) -> Option<char>;
}

impl MarbleValue for char {
  fn from_token(token: char) -> Option<Self> { Some(token) }

  fn to_token(&self) -> Option<char> { Some(*self) }
}

impl MarbleValue for String {
  fn from_token(token: char) -> Option<Self> { Some(token.to_string()) }

  fn to_token(&self) -> Option<char> {
    let mut chars = self.chars();
    match (chars.next(), chars.next()) {
      (Some(c), None) => Some(c),
      _ => None,
    }
  }
}

macro_rules! digit_marble_value {
  ($($t:ty),*) => {
    $(
      impl MarbleValue for $t {
        fn from_token(token: char) -> Option<Self> {
          token.to_digit(10).and_then(|d| <$t>::try_from(d).ok())
        }

        fn to_token(&self) -> Option<char> {
          u32::try_from(*self).ok().and_then(|d| char::from_digit(d, 10))
        }
      }
    )*
  };
}

digit_marble_value!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);

macro_rules! float_marble_value {
  ($($t:ty),*) => {
    $(
      impl MarbleValue for $t {
        fn from_token(token: char) -> Option<Self> { token.to_digit(10).map(|d| d as $t) }

        fn to_token(&self) -> Option<char> {
          if self.fract() == 0. && (0. ..10.).contains(self) {
            char::from_digit(*self as u32, 10)
          } else {
            None
          }
        }
      }
    )*
  };
}

float_marble_value!(f32, f64);

/// Error types able to stand for a bare `#` when no error value is given.
pub trait ErrorMarker: Sized {
  fn error_marker() -> Option<Self>;
}

impl ErrorMarker for &'static str {
  fn error_marker() -> Option<Self> { Some("error") }
}

impl ErrorMarker for String {
  fn error_marker() -> Option<Self> { Some("error".to_owned()) }
}

impl ErrorMarker for () {
  fn error_marker() -> Option<Self> { Some(()) }
}

impl ErrorMarker for Infallible {
  fn error_marker() -> Option<Self> { None }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[rxmarble_macro::test]
  fn literal_tokens() {
    assert_eq!(char::from_token('x'), Some('x'));
    assert_eq!(String::from_token('x'), Some("x".to_owned()));
    assert_eq!(i32::from_token('7'), Some(7));
    assert_eq!(i32::from_token('a'), None);
    assert_eq!(usize::from_token('0'), Some(0));
  }

  #[rxmarble_macro::test]
  fn tokens_render_back() {
    assert_eq!('q'.to_token(), Some('q'));
    assert_eq!(9u8.to_token(), Some('9'));
    assert_eq!(10u8.to_token(), None);
    assert_eq!((-1i32).to_token(), None);
    assert_eq!("ab".to_owned().to_token(), None);
    assert_eq!(3.0f64.to_token(), Some('3'));
    assert_eq!(0.5f64.to_token(), None);
  }

  #[rxmarble_macro::test]
  fn reverse_lookup() {
    let values: ValueMap<i32> = [('a', 1), ('b', 2)].into_iter().collect();
    assert_eq!(values.token_of(&2), Some('b'));
    assert_eq!(values.token_of(&3), None);
    assert_eq!(format!("{values:?}"), "{'a': 1, 'b': 2}");
  }

  #[rxmarble_macro::test]
  fn error_markers() {
    assert_eq!(<&str>::error_marker(), Some("error"));
    assert_eq!(Infallible::error_marker(), None);
  }
}
