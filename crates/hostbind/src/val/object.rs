use indexmap::IndexMap;

use super::HostValue;

/// An object with key-value pairs, as seen by the host
///
/// Keys are strings and keep their insertion order, which is the order a
/// host enumerates them in and the order map decoding iterates in.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Object(pub(crate) IndexMap<String, HostValue>);

impl Object {
	/// Create a new empty object
	pub fn new() -> Self {
		Object(IndexMap::new())
	}

	/// Get the value of a key
	pub fn get(&self, key: &str) -> Option<&HostValue> {
		self.0.get(key)
	}

	/// Get a mutable reference to the value of a key
	pub fn get_mut(&mut self, key: &str) -> Option<&mut HostValue> {
		self.0.get_mut(key)
	}

	/// Check if the object has the given key
	pub fn contains_key(&self, key: &str) -> bool {
		self.0.contains_key(key)
	}

	/// Insert a key-value pair into the object
	pub fn insert(&mut self, key: impl Into<String>, value: HostValue) -> Option<HostValue> {
		self.0.insert(key.into(), value)
	}

	/// Remove a key-value pair from the object, keeping the order of the rest
	pub fn remove(&mut self, key: &str) -> Option<HostValue> {
		self.0.shift_remove(key)
	}

	/// Get an iterator over the key-value pairs in the object
	pub fn iter(&self) -> indexmap::map::Iter<'_, String, HostValue> {
		self.0.iter()
	}

	/// Get an iterator over the keys in the object
	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.0.keys().map(String::as_str)
	}

	/// Get the number of key-value pairs in the object
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Check if the object is empty
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Get the inner map
	pub fn inner(&self) -> &IndexMap<String, HostValue> {
		&self.0
	}
}

impl From<IndexMap<String, HostValue>> for Object {
	fn from(v: IndexMap<String, HostValue>) -> Self {
		Self(v)
	}
}

impl<K: Into<String>> FromIterator<(K, HostValue)> for Object {
	fn from_iter<I: IntoIterator<Item = (K, HostValue)>>(iter: I) -> Self {
		Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
	}
}

impl IntoIterator for Object {
	type Item = (String, HostValue);
	type IntoIter = indexmap::map::IntoIter<String, HostValue>;

	fn into_iter(self) -> Self::IntoIter {
		self.0.into_iter()
	}
}

impl<'a> IntoIterator for &'a Object {
	type Item = (&'a String, &'a HostValue);
	type IntoIter = indexmap::map::Iter<'a, String, HostValue>;

	fn into_iter(self) -> Self::IntoIter {
		self.0.iter()
	}
}
