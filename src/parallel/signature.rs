//! Function signatures and extra-argument binding
//!
//! A mapped function declares an ordered list of parameter names. One of them
//! is the data argument that receives each item; the rest are filled from the
//! extra positional and keyword arguments supplied with the call.

use crate::error::{ArgumentError, MapError};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;

/// Ordered parameter names of a mapped function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    params: Vec<String>,
}

impl Signature {
    pub fn new<I, S>(params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            params: params.into_iter().map(Into::into).collect(),
        }
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.params.iter().any(|p| p == name)
    }
}

/// Extra arguments passed to every invocation alongside the item
#[derive(Debug, Clone, Default)]
pub struct Args {
    positional: Vec<Value>,
    keyword: Vec<(String, Value)>,
}

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: Value) {
        self.positional.push(value);
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.keyword.push((name.into(), value));
    }

    /// Positional plus keyword count
    pub fn len(&self) -> usize {
        self.positional.len() + self.keyword.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bind the extras to the signature's parameters, leaving out `data_arg`
    ///
    /// Checks run in order: parameter names must be unique, the data argument
    /// must be a declared parameter, extras + 1 must equal the declared arity,
    /// and every keyword must land on a distinct free parameter.
    pub fn bind(&self, signature: &Signature, data_arg: &str) -> Result<BoundArgs, MapError> {
        let params = signature.params();
        if let Some(dup) = params
            .iter()
            .enumerate()
            .find_map(|(i, p)| params[..i].contains(p).then_some(p))
        {
            return Err(MapError::InvalidBinding(format!(
                "parameter '{dup}' is declared more than once"
            )));
        }

        if !signature.contains(data_arg) {
            return Err(MapError::UnknownDataArgument {
                name: data_arg.to_string(),
                params: signature.params().to_vec(),
            });
        }

        let supplied = self.len() + 1;
        if supplied != signature.arity() {
            return Err(MapError::ArityMismatch {
                expected: signature.arity(),
                supplied,
            });
        }

        let mut values = HashMap::with_capacity(self.len());
        let free = signature.params().iter().filter(|p| p.as_str() != data_arg);
        for (name, value) in free.zip(self.positional.iter()) {
            values.insert(name.clone(), value.clone());
        }

        for (name, value) in &self.keyword {
            if name == data_arg {
                return Err(MapError::InvalidBinding(format!(
                    "keyword '{name}' is the data argument"
                )));
            }
            if !signature.contains(name) {
                return Err(MapError::InvalidBinding(format!(
                    "unexpected keyword argument '{name}'"
                )));
            }
            if values.insert(name.clone(), value.clone()).is_some() {
                return Err(MapError::InvalidBinding(format!(
                    "multiple values for argument '{name}'"
                )));
            }
        }

        Ok(BoundArgs { values })
    }
}

/// Extra arguments resolved to parameter names
#[derive(Debug, Clone, Default)]
pub struct BoundArgs {
    values: HashMap<String, Value>,
}

impl BoundArgs {
    /// Read a bound argument as `V`
    pub fn get<V: DeserializeOwned>(&self, name: &str) -> Result<V, ArgumentError> {
        let value = self
            .values
            .get(name)
            .ok_or_else(|| ArgumentError::Missing(name.to_string()))?;
        serde_json::from_value(value.clone()).map_err(|source| ArgumentError::WrongType {
            name: name.to_string(),
            source,
        })
    }

    pub fn raw(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

pub(crate) fn to_value<V: Serialize>(value: V) -> Result<Value, MapError> {
    Ok(serde_json::to_value(value)?)
}
