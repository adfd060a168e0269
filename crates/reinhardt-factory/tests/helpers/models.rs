//! Test models.
//!
//! Each model records what a strategy did to it, so tests can tell built,
//! created and stubbed objects apart.

#![allow(dead_code)]

use std::sync::Arc;

use reinhardt_factory::prelude::*;

/// Plain object with four optional attributes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TestObject {
	pub one: Option<serde_json::Value>,
	pub two: Option<serde_json::Value>,
	pub three: Option<serde_json::Value>,
	pub four: Option<serde_json::Value>,
}

impl Model for TestObject {
	fn from_attributes(mut attributes: Attributes) -> FactoryResult<Self> {
		Ok(Self {
			one: attributes.take_opt("one")?,
			two: attributes.take_opt("two")?,
			three: attributes.take_opt("three")?,
			four: attributes.take_opt("four")?,
		})
	}
}

/// Model keeping every attribute it is given; `create` assigns an id.
#[derive(Debug, Clone, Default)]
pub struct TestModel {
	pub id: Option<i64>,
	pub fields: Attributes,
}

impl TestModel {
	pub fn field(&self, name: &str) -> Option<&Value> {
		self.fields.get(name)
	}
}

impl Model for TestModel {
	fn from_attributes(attributes: Attributes) -> FactoryResult<Self> {
		Ok(Self {
			id: None,
			fields: attributes,
		})
	}

	fn create(attributes: Attributes) -> FactoryResult<Self> {
		let mut model = Self::from_attributes(attributes)?;
		model.id = Some(1);
		Ok(model)
	}
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct User {
	pub username: String,
	pub email: String,
	pub is_staff: bool,
	pub groups: Vec<String>,
	pub saved: bool,
}

impl Model for User {
	fn from_attributes(mut attributes: Attributes) -> FactoryResult<Self> {
		Ok(Self {
			username: attributes.take("username")?,
			email: attributes.take("email")?,
			is_staff: attributes.take_opt("is_staff")?.unwrap_or(false),
			groups: Vec::new(),
			saved: false,
		})
	}

	fn create(attributes: Attributes) -> FactoryResult<Self> {
		let mut user = Self::from_attributes(attributes)?;
		user.saved = true;
		Ok(user)
	}
}

#[derive(Debug, Clone)]
pub struct Post {
	pub title: String,
	pub author: Arc<User>,
	pub saved: bool,
}

impl Model for Post {
	fn from_attributes(mut attributes: Attributes) -> FactoryResult<Self> {
		Ok(Self {
			title: attributes.take("title")?,
			author: attributes.take_object("author")?,
			saved: false,
		})
	}

	fn create(attributes: Attributes) -> FactoryResult<Self> {
		let mut post = Self::from_attributes(attributes)?;
		post.saved = true;
		Ok(post)
	}
}
