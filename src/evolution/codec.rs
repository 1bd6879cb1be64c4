//! Binary encoding of candidate-value indices.
//!
//! Each variable parameter with `2^n` candidates is encoded as an `n`-bit
//! chromosome whose unsigned value indexes the candidate list.

use std::collections::BTreeMap;

use rand::Rng;

use crate::schema::{
    Chromosome, ConfigError, Individual, ParamValue, ParameterAssignment, ParameterSpace,
};

/// Number of bits needed to index `count` candidates, i.e. `ceil(log2(count))`.
pub fn chromosome_width(count: usize) -> usize {
    if count <= 1 {
        0
    } else {
        (usize::BITS - (count - 1).leading_zeros()) as usize
    }
}

/// Random index in `[0, max_index]` rendered as a zero-padded chromosome.
pub fn encode_index<R: Rng + ?Sized>(rng: &mut R, max_index: usize) -> Chromosome {
    let width = chromosome_width(max_index.saturating_add(1));
    let index = rng.gen_range(0..=max_index);
    Chromosome::from_index(index, width)
}

/// Candidate list and chromosome width of one variable parameter.
#[derive(Debug, Clone)]
pub struct GeneSpec {
    pub candidates: Vec<ParamValue>,
    pub width: usize,
}

impl GeneSpec {
    /// Highest valid candidate index.
    pub fn max_index(&self) -> usize {
        self.candidates.len() - 1
    }
}

/// Maps chromosomes to candidate values for every variable parameter.
#[derive(Debug, Clone, Default)]
pub struct ChromosomeCodec {
    genes: BTreeMap<String, GeneSpec>,
}

impl ChromosomeCodec {
    /// Build from variable parameters. Each must have `2^n` candidates, n >= 1.
    pub fn new(variable: BTreeMap<String, Vec<ParamValue>>) -> Result<Self, ConfigError> {
        let mut genes = BTreeMap::new();
        for (parameter, candidates) in variable {
            let count = candidates.len();
            if count < 2 || !count.is_power_of_two() {
                return Err(ConfigError::NotPowerOfTwo { parameter, count });
            }
            let width = chromosome_width(count);
            genes.insert(parameter, GeneSpec { candidates, width });
        }
        Ok(Self { genes })
    }

    /// Split a parameter space into a codec for its variable parameters and
    /// the fixed assignment of the rest.
    pub fn from_space(space: &ParameterSpace) -> Result<(Self, ParameterAssignment), ConfigError> {
        let (variable, fixed) = space.partition()?;
        Ok((Self::new(variable)?, fixed))
    }

    /// Variable parameters in name order.
    pub fn genes(&self) -> impl Iterator<Item = (&str, &GeneSpec)> {
        self.genes.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn gene(&self, parameter: &str) -> Option<&GeneSpec> {
        self.genes.get(parameter)
    }

    pub fn width(&self, parameter: &str) -> Option<usize> {
        self.genes.get(parameter).map(|g| g.width)
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// Total encoded bits per individual.
    pub fn total_bits(&self) -> usize {
        self.genes.values().map(|g| g.width).sum()
    }

    /// Candidate value selected by `chromosome` for `parameter`.
    pub fn decode(&self, parameter: &str, chromosome: &Chromosome) -> Result<&ParamValue, CodecError> {
        let gene = self
            .genes
            .get(parameter)
            .ok_or_else(|| CodecError::UnknownParameter {
                parameter: parameter.to_string(),
            })?;
        let index = chromosome.to_index();
        gene.candidates
            .get(index)
            .ok_or_else(|| CodecError::IndexOutOfRange {
                parameter: parameter.to_string(),
                index,
                candidates: gene.candidates.len(),
            })
    }

    /// Decode every gene of `individual` and merge in `fixed`.
    pub fn decode_individual(
        &self,
        individual: &Individual,
        fixed: &ParameterAssignment,
    ) -> Result<ParameterAssignment, CodecError> {
        let mut assignment = ParameterAssignment::new();
        for (parameter, chromosome) in individual.genes() {
            let value = self.decode(parameter, chromosome)?;
            assignment.insert(parameter.to_string(), value.clone());
        }
        assignment.merge(fixed);
        Ok(assignment)
    }

    /// Check that `individual` carries exactly this codec's parameters at the
    /// expected widths.
    pub fn check_shape(&self, individual: &Individual) -> Result<(), ShapeMismatch> {
        for (parameter, gene) in &self.genes {
            match individual.get(parameter) {
                None => return Err(ShapeMismatch::MissingParameter(parameter.clone())),
                Some(chromosome) if chromosome.len() != gene.width => {
                    return Err(ShapeMismatch::WrongWidth {
                        parameter: parameter.clone(),
                        expected: gene.width,
                        found: chromosome.len(),
                    });
                }
                Some(_) => {}
            }
        }
        if let Some((extra, _)) = individual
            .genes()
            .find(|(name, _)| !self.genes.contains_key(*name))
        {
            return Err(ShapeMismatch::UnexpectedParameter(extra.to_string()));
        }
        Ok(())
    }
}

/// Decoding failures.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("Parameter {parameter} is not a variable parameter of this space")]
    UnknownParameter { parameter: String },
    #[error("Parameter {parameter}: index {index} out of range for {candidates} candidates")]
    IndexOutOfRange {
        parameter: String,
        index: usize,
        candidates: usize,
    },
}

/// How an individual's encoding differs from the codec's.
#[derive(Debug, thiserror::Error)]
pub enum ShapeMismatch {
    #[error("missing parameter {0}")]
    MissingParameter(String),
    #[error("unexpected parameter {0}")]
    UnexpectedParameter(String),
    #[error("parameter {parameter} has {found} bits, expected {expected}")]
    WrongWidth {
        parameter: String,
        expected: usize,
        found: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn test_codec() -> (ChromosomeCodec, ParameterAssignment) {
        let space = ParameterSpace::new()
            .with("a", [1, 2, 4, 8])
            .with("b", [10, 20])
            .with_fixed("c", 2.5);
        ChromosomeCodec::from_space(&space).unwrap()
    }

    #[test]
    fn test_chromosome_width() {
        assert_eq!(chromosome_width(1), 0);
        assert_eq!(chromosome_width(2), 1);
        assert_eq!(chromosome_width(4), 2);
        assert_eq!(chromosome_width(64), 6);
        assert_eq!(chromosome_width(128), 7);
        assert_eq!(chromosome_width(3), 2);
    }

    #[test]
    fn test_encode_index_width() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..100 {
            let chromosome = encode_index(&mut rng, 7);
            assert_eq!(chromosome.len(), 3);
            assert!(chromosome.to_index() <= 7);
        }
    }

    #[test]
    fn test_decode() {
        let (codec, fixed) = test_codec();
        assert_eq!(codec.width("a"), Some(2));
        assert_eq!(codec.width("b"), Some(1));
        assert_eq!(codec.total_bits(), 3);

        let value = codec.decode("a", &"11".parse().unwrap()).unwrap();
        assert_eq!(value, &ParamValue::Int(8));

        let individual: Individual = [
            ("a", "01".parse::<Chromosome>().unwrap()),
            ("b", "1".parse().unwrap()),
        ]
        .into_iter()
        .collect();
        let assignment = codec.decode_individual(&individual, &fixed).unwrap();
        assert_eq!(assignment.get_f64("a"), Some(2.0));
        assert_eq!(assignment.get_f64("b"), Some(20.0));
        assert_eq!(assignment.get_f64("c"), Some(2.5));
        assert_eq!(assignment.len(), 3);
    }

    #[test]
    fn test_decode_out_of_range() {
        let (codec, _) = test_codec();
        let err = codec.decode("a", &"100".parse().unwrap()).unwrap_err();
        assert!(matches!(
            err,
            CodecError::IndexOutOfRange {
                index: 4,
                candidates: 4,
                ..
            }
        ));
        assert!(matches!(
            codec.decode("zzz", &"1".parse().unwrap()),
            Err(CodecError::UnknownParameter { .. })
        ));
    }

    #[test]
    fn test_check_shape() {
        let (codec, _) = test_codec();
        let good: Individual = [
            ("a", Chromosome::from_index(0, 2)),
            ("b", Chromosome::from_index(1, 1)),
        ]
        .into_iter()
        .collect();
        assert!(codec.check_shape(&good).is_ok());

        let narrow: Individual = [
            ("a", Chromosome::from_index(0, 1)),
            ("b", Chromosome::from_index(1, 1)),
        ]
        .into_iter()
        .collect();
        assert!(matches!(
            codec.check_shape(&narrow),
            Err(ShapeMismatch::WrongWidth { expected: 2, found: 1, .. })
        ));

        let mut extra = good.clone();
        extra.insert("z", Chromosome::from_index(0, 1));
        assert!(matches!(
            codec.check_shape(&extra),
            Err(ShapeMismatch::UnexpectedParameter(_))
        ));
    }
}
