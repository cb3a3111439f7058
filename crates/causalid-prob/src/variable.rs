//! Named graph variables.

use std::borrow::Borrow;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// A named variable of a causal graph.
///
/// Equality, ordering and hashing all go through the name, so a `Variable`
/// can be looked up in sets and maps by `&str`. The name is stored as
/// `Arc<str>` so clones are a reference count increment.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Variable(Arc<str>);

/// Ordered set of variables. Ordered so that every rendering and every
/// enumeration built from it is deterministic.
pub type VarSet = BTreeSet<Variable>;

impl Variable {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", &*self.0)
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for Variable {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Variable {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Variable {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Variable {
    fn from(value: String) -> Self {
        Self(Arc::from(value))
    }
}

impl From<&Variable> for Variable {
    fn from(value: &Variable) -> Self {
        value.clone()
    }
}

/// Builds a [`VarSet`] from anything that yields names.
pub fn var_set<I, S>(names: I) -> VarSet
where
    I: IntoIterator<Item = S>,
    S: Into<Variable>,
{
    names.into_iter().map(Into::into).collect()
}

/// Comma-joined names, in iteration order.
pub fn display_vars<'a, I>(vars: I) -> String
where
    I: IntoIterator<Item = &'a Variable>,
{
    let mut out = String::new();
    for (i, v) in vars.into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(v.name());
    }
    out
}

#[cfg(feature = "serde")]
mod serde_impl {
    use super::Variable;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    // Arc<str> needs serde's `rc` feature; serialize the plain name instead.
    impl Serialize for Variable {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            serializer.serialize_str(self.name())
        }
    }

    impl<'de> Deserialize<'de> for Variable {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: Deserializer<'de>,
        {
            String::deserialize(deserializer).map(Variable::from)
        }
    }
}
