//! Converts the YAML collaborator's own value type into [`Node`], the only
//! place in this crate that knows `serde_yaml` exists.

use schema_ld_core::Error;
use schema_ld_syntax::{Mapping, Node, Number};

pub fn parse(text: &str) -> Result<Node, Error> {
	let value: serde_yaml::Value =
		serde_yaml::from_str(text).map_err(|e| Error::Syntax(e.to_string()))?;
	to_node(value)
}

/// Renders a [`Node`] back out as YAML text, for printing a resolved
/// document from the command line.
pub fn to_string(node: &Node) -> Result<String, Error> {
	serde_yaml::to_string(&from_node(node)).map_err(|e| Error::Syntax(e.to_string()))
}

fn from_node(node: &Node) -> serde_yaml::Value {
	match node {
		Node::Null => serde_yaml::Value::Null,
		Node::Bool(b) => serde_yaml::Value::Bool(*b),
		Node::Number(Number::Int(i)) => serde_yaml::Value::Number((*i).into()),
		Node::Number(Number::Float(f)) => serde_yaml::Value::Number((*f).into()),
		Node::String(s) => serde_yaml::Value::String(s.clone()),
		Node::Sequence(items) => serde_yaml::Value::Sequence(items.iter().map(from_node).collect()),
		Node::Mapping(map) => {
			let mut out = serde_yaml::Mapping::new();
			for (k, v) in map {
				out.insert(serde_yaml::Value::String(k.clone()), from_node(v));
			}
			serde_yaml::Value::Mapping(out)
		}
	}
}

fn to_node(value: serde_yaml::Value) -> Result<Node, Error> {
	Ok(match value {
		serde_yaml::Value::Null => Node::Null,
		serde_yaml::Value::Bool(b) => Node::Bool(b),
		serde_yaml::Value::Number(n) => {
			if let Some(i) = n.as_i64() {
				Node::Number(Number::Int(i))
			} else if let Some(f) = n.as_f64() {
				Node::Number(Number::Float(f))
			} else {
				return Err(Error::Syntax(format!("unrepresentable number: {n:?}")));
			}
		}
		serde_yaml::Value::String(s) => Node::String(s),
		serde_yaml::Value::Sequence(items) => {
			let mut out = Vec::with_capacity(items.len());
			for item in items {
				out.push(to_node(item)?);
			}
			Node::Sequence(out)
		}
		serde_yaml::Value::Mapping(map) => {
			let mut out = Mapping::new();
			for (k, v) in map {
				let key = k
					.as_str()
					.ok_or_else(|| Error::Syntax("mapping keys must be strings".to_string()))?
					.to_string();
				out.insert(key, to_node(v)?);
			}
			Node::Mapping(out)
		}
		serde_yaml::Value::Tagged(tagged) => to_node(tagged.value)?,
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_nested_mappings_and_sequences() {
		let node = parse("a:\n  b: 1\n  c: [x, y]\n").unwrap();
		let map = node.as_mapping().unwrap();
		let inner = map.get("a").unwrap().as_mapping().unwrap();
		assert_eq!(inner.get("b"), Some(&Node::Number(Number::Int(1))));
		assert_eq!(inner.get("c").unwrap().string_elements(), vec!["x", "y"]);
	}

	#[test]
	fn malformed_yaml_is_a_syntax_error() {
		assert!(parse("a: [unterminated").is_err());
	}

	#[test]
	fn round_trips_through_yaml_text() {
		let node = parse("a:\n  b: 1\n  c: [x, y]\n").unwrap();
		let text = to_string(&node).unwrap();
		assert_eq!(parse(&text).unwrap(), node);
	}
}
