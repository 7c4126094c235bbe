use crate::domain::{Constraint, ConstraintType};
use std::collections::BTreeMap;

/// Sparse affine expression `Σ coeff·x[index] + constant` over model variables
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LinearExpr {
    pub terms: BTreeMap<usize, f64>,
    pub constant: f64,
}

impl LinearExpr {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn from_const(v: f64) -> Self {
        let mut e = Self::zero();
        e.constant = v;
        e
    }

    pub fn from_var(index: usize, c: f64) -> Self {
        let mut e = Self::zero();
        if c != 0.0 {
            e.terms.insert(index, c);
        }
        e
    }

    pub fn is_constant(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn add_term(&mut self, index: usize, c: f64) {
        *self.terms.entry(index).or_insert(0.0) += c;
        self.terms.retain(|_, c| *c != 0.0);
    }

    pub fn add_inplace(&mut self, other: &LinearExpr) {
        self.constant += other.constant;
        for (&k, &v) in other.terms.iter() {
            *self.terms.entry(k).or_insert(0.0) += v;
        }
        self.terms.retain(|_, c| *c != 0.0);
    }

    pub fn sub_inplace(&mut self, other: &LinearExpr) {
        self.constant -= other.constant;
        for (&k, &v) in other.terms.iter() {
            *self.terms.entry(k).or_insert(0.0) -= v;
        }
        self.terms.retain(|_, c| *c != 0.0);
    }

    pub fn scale(&self, k: f64) -> Self {
        let mut e = Self::zero();
        e.constant = self.constant * k;
        for (&n, &c) in self.terms.iter() {
            if c * k != 0.0 {
                e.terms.insert(n, c * k);
            }
        }
        e
    }

    pub fn sub(mut self, other: LinearExpr) -> LinearExpr {
        self.sub_inplace(&other);
        self
    }

    /// Value at a solved point
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.constant
            + self
                .terms
                .iter()
                .map(|(&i, &c)| c * values.get(i).copied().unwrap_or(0.0))
                .sum::<f64>()
    }

    /// Dense row for a model with `num_vars` columns, moving the constant to the bound
    pub fn into_constraint(
        self,
        constraint_type: ConstraintType,
        num_vars: usize,
    ) -> Constraint {
        let mut coefficients = vec![0.0; num_vars];
        for (i, c) in self.terms {
            if let Some(slot) = coefficients.get_mut(i) {
                *slot = c;
            }
        }
        Constraint::new(constraint_type, coefficients, -self.constant)
    }

    /// Dense coefficient vector, ignoring the constant
    pub fn to_dense(&self, num_vars: usize) -> Vec<f64> {
        let mut coefficients = vec![0.0; num_vars];
        for (&i, &c) in &self.terms {
            if let Some(slot) = coefficients.get_mut(i) {
                *slot = c;
            }
        }
        coefficients
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_sub() {
        let a = LinearExpr::from_var(0, 1.0);
        let b = LinearExpr::from_var(1, 2.0);
        let c = a.sub(b);
        assert_eq!(c.terms[&0], 1.0);
        assert_eq!(c.terms[&1], -2.0);
    }

    #[test]
    fn test_cancellation_drops_terms() {
        let mut a = LinearExpr::from_var(0, 3.0);
        a.sub_inplace(&LinearExpr::from_var(0, 3.0));
        assert!(a.is_constant());
    }

    #[test]
    fn test_into_constraint_moves_constant() {
        // 2·x0 + 5 <= 0  ⇒  2·x0 <= -5
        let mut e = LinearExpr::from_var(0, 2.0);
        e.constant = 5.0;
        let c = e.into_constraint(ConstraintType::LessThanOrEqual, 3);
        assert_eq!(c.coefficients, vec![2.0, 0.0, 0.0]);
        assert_eq!(c.bound, -5.0);
    }

    #[test]
    fn test_evaluate() {
        let mut e = LinearExpr::from_var(0, 2.0);
        e.add_term(2, 10.0);
        e.constant = 1.0;
        assert_eq!(e.evaluate(&[1.0, 7.0, 0.5]), 8.0);
    }
}
