use std::fmt;

use serde_json::Value;

/// Traversal stops descending past this depth. Malformed documents can nest
/// arbitrarily; a runaway branch is skipped instead of failing the walk.
pub const MAX_TRAVERSAL_DEPTH: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathStep {
    Key(String),
    Index(usize),
}

/// A structural path into the document tree, printed and parsed in the
/// `layers[0].t.d` form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NodePath(Vec<PathStep>);

impl NodePath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.0
    }

    pub fn child_key(&self, key: &str) -> Self {
        let mut steps = self.0.clone();
        steps.push(PathStep::Key(key.to_string()));
        Self(steps)
    }

    pub fn child_index(&self, index: usize) -> Self {
        let mut steps = self.0.clone();
        steps.push(PathStep::Index(index));
        Self(steps)
    }

    pub fn parse(text: &str) -> Option<Self> {
        let mut steps = Vec::new();
        if text.is_empty() {
            return Some(Self(steps));
        }
        for part in text.split('.') {
            let (name, mut rest) = match part.find('[') {
                Some(pos) => (&part[..pos], &part[pos..]),
                None => (part, ""),
            };
            if name.is_empty() {
                return None;
            }
            steps.push(PathStep::Key(name.to_string()));
            while let Some(tail) = rest.strip_prefix('[') {
                let end = tail.find(']')?;
                let index: usize = tail[..end].parse().ok()?;
                steps.push(PathStep::Index(index));
                rest = &tail[end + 1..];
            }
            if !rest.is_empty() {
                return None;
            }
        }
        Some(Self(steps))
    }

    /// Re-locates the node this path described when it was built. `None`
    /// means the tree has been reshaped since; callers surface that as a
    /// stale reference instead of touching the wrong node.
    pub fn resolve<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        let mut current = root;
        for step in &self.0 {
            current = match step {
                PathStep::Key(key) => current.get(key.as_str())?,
                PathStep::Index(index) => current.get(*index)?,
            };
        }
        Some(current)
    }

    pub fn resolve_mut<'a>(&self, root: &'a mut Value) -> Option<&'a mut Value> {
        let mut current = root;
        for step in &self.0 {
            current = match step {
                PathStep::Key(key) => current.get_mut(key.as_str())?,
                PathStep::Index(index) => current.get_mut(*index)?,
            };
        }
        Some(current)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for step in &self.0 {
            match step {
                PathStep::Key(key) => {
                    if !first {
                        f.write_str(".")?;
                    }
                    f.write_str(key)?;
                }
                PathStep::Index(index) => write!(f, "[{index}]")?,
            }
            first = false;
        }
        Ok(())
    }
}

/// A located animatable property: the owning node plus the key it was found
/// under. Handles are resolved against the live tree at use time, never held
/// as references into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyHandle {
    pub owner: NodePath,
    pub key: String,
}

impl PropertyHandle {
    pub fn resolve<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        self.owner.resolve(root)?.get(self.key.as_str())
    }

    pub fn resolve_mut<'a>(&self, root: &'a mut Value) -> Option<&'a mut Value> {
        self.owner.resolve_mut(root)?.get_mut(self.key.as_str())
    }

    pub fn path(&self) -> String {
        let owner = self.owner.to_string();
        if owner.is_empty() {
            self.key.clone()
        } else {
            format!("{owner}.{key}", key = self.key)
        }
    }
}

/// Depth-bounded recursive walk collecting every key/value pair the
/// predicate accepts. Matched nodes are not descended into.
pub fn find_properties<F>(root: &Value, predicate: F) -> Vec<PropertyHandle>
where
    F: Fn(&str, &Value) -> bool,
{
    let mut hits = Vec::new();
    walk(root, &NodePath::root(), 0, &predicate, &mut hits);
    hits
}

fn walk<F>(node: &Value, path: &NodePath, depth: usize, predicate: &F, hits: &mut Vec<PropertyHandle>)
where
    F: Fn(&str, &Value) -> bool,
{
    if depth >= MAX_TRAVERSAL_DEPTH {
        tracing::debug!(path = %path, "depth bound reached, not descending");
        return;
    }
    match node {
        Value::Object(map) => {
            for (key, value) in map {
                if predicate(key, value) {
                    hits.push(PropertyHandle {
                        owner: path.clone(),
                        key: key.clone(),
                    });
                } else if value.is_object() || value.is_array() {
                    walk(value, &path.child_key(key), depth + 1, predicate, hits);
                }
            }
        }
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                if item.is_object() || item.is_array() {
                    walk(item, &path.child_index(index), depth + 1, predicate, hits);
                }
            }
        }
        _ => {}
    }
}
