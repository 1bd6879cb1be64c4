//! Bounded archive of the best (lowest-fitness) parameter combinations.

use crate::schema::{ArchiveEntry, ParameterAssignment};

/// Top-K record of the lowest fitness values seen across a whole run.
///
/// Fitness values and parameter combinations are kept as parallel lists in
/// insertion order; the same combination never occupies two slots.
#[derive(Debug, Clone, Default)]
pub struct TopFitArchive {
    capacity: usize,
    fitness: Vec<f64>,
    params: Vec<ParameterAssignment>,
}

impl TopFitArchive {
    /// Create a new archive holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            fitness: Vec::with_capacity(capacity),
            params: Vec::with_capacity(capacity),
        }
    }

    /// Offer a scored combination. Returns whether it was stored.
    ///
    /// While below capacity any new combination is appended. Once full, it
    /// replaces the current worst entry only if strictly better.
    pub fn offer(&mut self, fitness: f64, params: &ParameterAssignment) -> bool {
        if self.contains(params) {
            return false;
        }

        if self.fitness.len() < self.capacity {
            self.fitness.push(fitness);
            self.params.push(params.clone());
            return true;
        }

        match self.worst_index() {
            Some(worst) if self.fitness[worst] > fitness => {
                self.fitness.remove(worst);
                self.params.remove(worst);
                self.fitness.push(fitness);
                self.params.push(params.clone());
                true
            }
            _ => false,
        }
    }

    /// Index of the first maximum fitness.
    fn worst_index(&self) -> Option<usize> {
        let mut worst: Option<usize> = None;
        for (i, &f) in self.fitness.iter().enumerate() {
            if worst.is_none_or(|w| f > self.fitness[w]) {
                worst = Some(i);
            }
        }
        worst
    }

    pub fn contains(&self, params: &ParameterAssignment) -> bool {
        self.params.iter().any(|p| p == params)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.fitness.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fitness.is_empty()
    }

    /// Fitness values in insertion order.
    pub fn fitness_values(&self) -> &[f64] {
        &self.fitness
    }

    /// Parameter combinations in insertion order.
    pub fn parameter_sets(&self) -> &[ParameterAssignment] {
        &self.params
    }

    /// Lowest fitness held.
    pub fn best(&self) -> Option<f64> {
        self.fitness.iter().copied().reduce(f64::min)
    }

    /// Highest fitness held.
    pub fn worst(&self) -> Option<f64> {
        self.worst_index().map(|i| self.fitness[i])
    }

    /// Entries ascending by fitness; ties keep insertion order.
    pub fn entries(&self) -> Vec<ArchiveEntry> {
        let mut entries: Vec<ArchiveEntry> = self
            .fitness
            .iter()
            .zip(&self.params)
            .map(|(&fitness, params)| ArchiveEntry {
                fitness,
                params: params.clone(),
            })
            .collect();
        entries.sort_by(|a, b| a.fitness.total_cmp(&b.fitness));
        entries
    }
}
