//! Scope modeling helpers used when building authorization requests.

// crates.io
use serde::{Deserializer, Serializer, de::Error as DeError, ser::SerializeSeq};
// self
use crate::_prelude::*;

/// Errors emitted when validating scopes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum ScopeValidationError {
	/// Empty scope entries are not allowed.
	#[error("Scope entries cannot be empty.")]
	Empty,
	/// Scopes cannot contain embedded whitespace characters.
	#[error("Scope contains whitespace: {scope}.")]
	ContainsWhitespace {
		/// The offending scope string.
		scope: String,
	},
}

/// Ordered, deduplicated list of OAuth scopes.
///
/// Unlike a sorted set, the list keeps the first-seen order so `openid` stays in front of
/// provider defaults when the two are merged. Duplicates are dropped on insertion.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct ScopeList(Vec<String>);
impl ScopeList {
	/// Creates a validated scope list from any iterator.
	pub fn new<I, S>(scopes: I) -> Result<Self, ScopeValidationError>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let mut list = Self::default();

		list.extend(scopes)?;

		Ok(list)
	}

	/// Appends scopes that are not already present, preserving order.
	pub fn extend<I, S>(&mut self, scopes: I) -> Result<(), ScopeValidationError>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		for scope in scopes {
			let owned = validate(scope.into())?;

			if !self.contains(&owned) {
				self.0.push(owned);
			}
		}

		Ok(())
	}

	/// Returns a new list holding `self` followed by the unseen entries of `other`.
	pub fn merged(&self, other: &ScopeList) -> ScopeList {
		let mut merged = self.clone();

		for scope in other.iter() {
			if !merged.contains(scope) {
				merged.0.push(scope.to_owned());
			}
		}

		merged
	}

	/// Number of distinct scopes.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns true if no scopes are defined.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Returns true if the list contains the provided scope.
	pub fn contains(&self, scope: &str) -> bool {
		self.0.iter().any(|candidate| candidate == scope)
	}

	/// Iterator over scopes in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.0.iter().map(|s| s.as_str())
	}

	/// Joins the scopes with the provided separator, returning `None` for an empty list.
	pub fn join(&self, separator: char) -> Option<String> {
		if self.is_empty() {
			return None;
		}

		let mut buf = String::new();

		for (idx, value) in self.iter().enumerate() {
			if idx > 0 {
				buf.push(separator);
			}

			buf.push_str(value);
		}

		Some(buf)
	}

	/// Returns the underlying slice of scope strings.
	pub fn as_slice(&self) -> &[String] {
		&self.0
	}
}
impl Debug for ScopeList {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("ScopeList").field(&self.0).finish()
	}
}
impl Display for ScopeList {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0.join(" "))
	}
}
impl TryFrom<Vec<String>> for ScopeList {
	type Error = ScopeValidationError;

	fn try_from(value: Vec<String>) -> Result<Self, Self::Error> {
		Self::new(value)
	}
}
impl FromStr for ScopeList {
	type Err = ScopeValidationError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		if s.is_empty() {
			return Ok(Self::default());
		}
		if s.chars().all(char::is_whitespace) {
			return Err(ScopeValidationError::Empty);
		}

		Self::new(s.split_whitespace())
	}
}
impl Serialize for ScopeList {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		let mut seq = serializer.serialize_seq(Some(self.0.len()))?;

		for scope in self.0.iter() {
			seq.serialize_element(scope)?;
		}

		seq.end()
	}
}
impl<'de> Deserialize<'de> for ScopeList {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let values = <Vec<String>>::deserialize(deserializer)?;

		ScopeList::new(values).map_err(DeError::custom)
	}
}

fn validate(scope: String) -> Result<String, ScopeValidationError> {
	if scope.is_empty() {
		return Err(ScopeValidationError::Empty);
	}
	if scope.chars().any(char::is_whitespace) {
		return Err(ScopeValidationError::ContainsWhitespace { scope });
	}

	Ok(scope)
}
