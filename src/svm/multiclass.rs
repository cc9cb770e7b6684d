//! One-vs-one multiclass SVM
//!
//! A binary SVM is trained for every pair of classes present in the training
//! data. Prediction lets each pair vote for one of its two classes and picks
//! the class with the most votes, the lowest class index on ties.

use crate::cache::KernelCache;
use crate::core::{
    validate_labels, FeatureMatrix, LabelVector, Result, Sample, SolverConfig, SparseVector,
};
use crate::kernel::Kernel;
use crate::svm::binary::BinarySvm;
use log::{debug, info};
use ndarray::Array1;
use std::collections::HashMap;
use std::sync::Arc;

/// Trains a one-vs-one ensemble of binary SVMs
pub struct OneVsOneSvm<K: Kernel> {
    kernel: Arc<K>,
    config: SolverConfig,
}

impl<K: Kernel> OneVsOneSvm<K> {
    pub fn new(kernel: K, config: SolverConfig) -> Self {
        Self {
            kernel: Arc::new(kernel),
            config,
        }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Train on dense rows labelled with class indices below `n_classes`
    pub fn fit(
        &self,
        data: &FeatureMatrix,
        labels: &LabelVector,
        n_classes: usize,
    ) -> Result<TrainedOneVsOne<K>> {
        validate_labels(data, labels, n_classes)?;

        let rows: Vec<SparseVector> = data.rows().into_iter().map(SparseVector::from_dense).collect();
        let mut members: Vec<Vec<usize>> = vec![Vec::new(); n_classes];
        for (i, &label) in labels.iter().enumerate() {
            members[label].push(i);
        }
        let present: Vec<usize> = (0..n_classes).filter(|&c| !members[c].is_empty()).collect();

        let trainer = BinarySvm::with_shared_kernel(Arc::clone(&self.kernel), self.config.clone());
        let mut support = SupportSet::default();
        let mut pairs = Vec::new();

        for (a_pos, &a) in present.iter().enumerate() {
            for &b in &present[a_pos + 1..] {
                let indices: Vec<usize> = members[a].iter().chain(&members[b]).copied().collect();
                let samples: Vec<Sample> = indices
                    .iter()
                    .map(|&i| {
                        let label = if labels[i] == a { 1.0 } else { -1.0 };
                        Sample::new(rows[i].clone(), label)
                    })
                    .collect();

                let mut cache = KernelCache::with_memory_limit(self.config.cache_size, samples.len());
                let model = trainer.train_with_cache(&samples, &mut cache)?;
                debug!(
                    "Pair {a} vs {b}: {} samples, {} support vectors, {} iterations",
                    samples.len(),
                    model.n_support_vectors(),
                    model.iterations()
                );

                let coefficients = model
                    .support_indices()
                    .iter()
                    .zip(model.coefficients())
                    .map(|(&local, &coef)| {
                        let global = indices[local];
                        (support.slot(global, &rows[global]), coef)
                    })
                    .collect();
                pairs.push(PairModel {
                    positive: a,
                    negative: b,
                    coefficients,
                    bias: model.bias(),
                });
            }
        }

        info!(
            "Trained {} pairwise SVMs over {} classes with {} distinct support vectors",
            pairs.len(),
            present.len(),
            support.vectors.len()
        );

        Ok(TrainedOneVsOne {
            kernel: Arc::clone(&self.kernel),
            n_classes,
            fallback: present.first().copied().unwrap_or(0),
            support: support.vectors,
            support_norms: support.norms,
            pairs,
        })
    }
}

/// Training rows that are support vectors of at least one pair
#[derive(Default)]
struct SupportSet {
    vectors: Vec<SparseVector>,
    norms: Vec<f64>,
    slots: HashMap<usize, usize>,
}

impl SupportSet {
    /// Slot of training row `index`, adding it on first use
    fn slot(&mut self, index: usize, row: &SparseVector) -> usize {
        let vectors = &mut self.vectors;
        let norms = &mut self.norms;
        *self.slots.entry(index).or_insert_with(|| {
            vectors.push(row.clone());
            norms.push(row.norm_squared());
            vectors.len() - 1
        })
    }
}

/// Decision function of one class pair over the shared support set
#[derive(Debug, Clone)]
struct PairModel {
    positive: usize,
    negative: usize,
    /// `(support slot, αᵢyᵢ)`
    coefficients: Vec<(usize, f64)>,
    bias: f64,
}

impl PairModel {
    fn decision(&self, kernel_values: &[f64]) -> f64 {
        self.coefficients
            .iter()
            .map(|&(slot, coef)| coef * kernel_values[slot])
            .sum::<f64>()
            + self.bias
    }
}

/// Trained one-vs-one classifier
pub struct TrainedOneVsOne<K: Kernel> {
    kernel: Arc<K>,
    n_classes: usize,
    /// Answer when no pair could be trained
    fallback: usize,
    support: Vec<SparseVector>,
    support_norms: Vec<f64>,
    pairs: Vec<PairModel>,
}

impl<K: Kernel> TrainedOneVsOne<K> {
    /// Pairwise decision values in `(a, b)` order, `a < b`
    pub fn decision_values(&self, x: &SparseVector) -> Vec<f64> {
        let kernel_values = self.kernel_values(x);
        self.pairs.iter().map(|p| p.decision(&kernel_values)).collect()
    }

    /// Votes received by each class
    pub fn votes(&self, x: &SparseVector) -> Vec<usize> {
        let kernel_values = self.kernel_values(x);
        let mut votes = vec![0; self.n_classes];
        for pair in &self.pairs {
            if pair.decision(&kernel_values) > 0.0 {
                votes[pair.positive] += 1;
            } else {
                votes[pair.negative] += 1;
            }
        }
        votes
    }

    pub fn predict_one(&self, x: &SparseVector) -> usize {
        if self.pairs.is_empty() {
            return self.fallback;
        }
        let votes = self.votes(x);
        let mut best = 0;
        for (class, &count) in votes.iter().enumerate() {
            if count > votes[best] {
                best = class;
            }
        }
        best
    }

    pub fn predict(&self, data: &FeatureMatrix) -> LabelVector {
        data.rows()
            .into_iter()
            .map(|row| self.predict_one(&SparseVector::from_dense(row)))
            .collect::<Array1<usize>>()
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn n_pairs(&self) -> usize {
        self.pairs.len()
    }

    /// Distinct training rows used by any pair
    pub fn n_support_vectors(&self) -> usize {
        self.support.len()
    }

    fn kernel_values(&self, x: &SparseVector) -> Vec<f64> {
        let x_norm = x.norm_squared();
        self.support
            .iter()
            .zip(self.support_norms.iter())
            .map(|(sv, &norm)| self.kernel.compute_with_norms(sv, x, norm, x_norm))
            .collect()
    }
}
