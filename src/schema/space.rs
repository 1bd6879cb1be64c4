//! Parameter space types: candidate values, the space itself, and decoded
//! parameter assignments handed to fitness functions.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// A concrete candidate value for a parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl ParamValue {
    /// Numeric view of the value. Integers widen to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Int(v) => Some(*v as f64),
            ParamValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ParamValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(v) => write!(f, "{v}"),
            ParamValue::Int(v) => write!(f, "{v}"),
            ParamValue::Float(v) => write!(f, "{v}"),
            ParamValue::Text(v) => f.write_str(v),
        }
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        ParamValue::Int(v as i64)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Text(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Text(v)
    }
}

/// Candidate values for one parameter.
///
/// Deserializes from either a list or a bare scalar; a scalar becomes a
/// single-candidate (fixed) parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Candidates(Vec<ParamValue>);

#[derive(Deserialize)]
#[serde(untagged)]
enum CandidatesRepr {
    List(Vec<ParamValue>),
    Scalar(ParamValue),
}

impl<'de> Deserialize<'de> for Candidates {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Ok(match CandidatesRepr::deserialize(deserializer)? {
            CandidatesRepr::List(values) => Candidates(values),
            CandidatesRepr::Scalar(value) => Candidates(vec![value]),
        })
    }
}

impl Candidates {
    pub fn values(&self) -> &[ParamValue] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<V: Into<ParamValue>> FromIterator<V> for Candidates {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Candidates(iter.into_iter().map(Into::into).collect())
    }
}

/// Discretized search space: parameter name to its ordered candidates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterSpace {
    params: BTreeMap<String, Candidates>,
}

impl ParameterSpace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert (or replace) a parameter's candidate list.
    pub fn insert<N, I, V>(&mut self, name: N, values: I)
    where
        N: Into<String>,
        I: IntoIterator<Item = V>,
        V: Into<ParamValue>,
    {
        self.params.insert(name.into(), values.into_iter().collect());
    }

    /// Builder form of [`ParameterSpace::insert`].
    pub fn with<N, I, V>(mut self, name: N, values: I) -> Self
    where
        N: Into<String>,
        I: IntoIterator<Item = V>,
        V: Into<ParamValue>,
    {
        self.insert(name, values);
        self
    }

    /// Add a parameter that always takes `value`.
    pub fn with_fixed<N: Into<String>, V: Into<ParamValue>>(self, name: N, value: V) -> Self {
        self.with(name, [value])
    }

    pub fn get(&self, name: &str) -> Option<&Candidates> {
        self.params.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Candidates)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Partition into variable parameters (more than one candidate) and the
    /// fixed assignment of single-candidate parameters.
    ///
    /// Variable candidate counts must be powers of two.
    pub fn partition(
        &self,
    ) -> Result<(BTreeMap<String, Vec<ParamValue>>, ParameterAssignment), ConfigError> {
        let mut variable = BTreeMap::new();
        let mut fixed = ParameterAssignment::default();

        for (name, candidates) in &self.params {
            match candidates.len() {
                0 => {
                    return Err(ConfigError::EmptyParameter {
                        parameter: name.clone(),
                    });
                }
                1 => fixed.insert(name.clone(), candidates.0[0].clone()),
                count if !count.is_power_of_two() => {
                    return Err(ConfigError::NotPowerOfTwo {
                        parameter: name.clone(),
                        count,
                    });
                }
                _ => {
                    variable.insert(name.clone(), candidates.0.clone());
                }
            }
        }

        Ok((variable, fixed))
    }
}

/// `count` evenly spaced values from `start` to `end`, both inclusive.
///
/// A single value is only meaningful for a degenerate range.
pub fn evenly_spaced(start: f64, end: f64, count: usize) -> Result<Vec<f64>, ConfigError> {
    match count {
        0 => Err(ConfigError::InvalidRange { start, end, count }),
        1 if start == end => Ok(vec![start]),
        1 => Err(ConfigError::InvalidRange { start, end, count }),
        _ => {
            let interval = (end - start) / (count - 1) as f64;
            Ok((0..count).map(|i| start + i as f64 * interval).collect())
        }
    }
}

/// A full parameter combination: every parameter name to its concrete value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterAssignment(BTreeMap<String, ParamValue>);

impl ParameterAssignment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: String, value: ParamValue) {
        self.0.insert(name, value);
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.0.get(name)
    }

    /// Numeric lookup, the common case inside fitness functions.
    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(ParamValue::as_f64)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Overlay every entry of `other` onto this assignment.
    pub fn merge(&mut self, other: &ParameterAssignment) {
        for (name, value) in &other.0 {
            self.0.insert(name.clone(), value.clone());
        }
    }
}

impl fmt::Display for ParameterAssignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name} = {value}")?;
        }
        Ok(())
    }
}

impl<N: Into<String>, V: Into<ParamValue>> FromIterator<(N, V)> for ParameterAssignment {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(n, v)| (n.into(), v.into()))
                .collect(),
        )
    }
}
