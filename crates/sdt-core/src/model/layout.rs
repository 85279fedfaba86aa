//! Named layout of the flat unconstrained parameter vector.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::math;

/// Map from the sampler's unconstrained scale to a parameter's support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transform {
    /// Real-valued parameter, sampled as is.
    Identity,
    /// Positive parameter, sampled as its logarithm.
    Log,
}

impl Transform {
    /// Apply the transform to an unconstrained value.
    #[inline]
    pub fn constrain(&self, u: f64) -> f64 {
        match self {
            Transform::Identity => u,
            Transform::Log => math::exp(u),
        }
    }

    /// Inverse of [`Transform::constrain`].
    #[inline]
    pub fn unconstrain(&self, x: f64) -> f64 {
        match self {
            Transform::Identity => x,
            Transform::Log => math::ln(x),
        }
    }
}

/// A named block of parameters with a shape (scalar, vector, or matrix).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterBlock {
    /// Block name, e.g. `"stim_effect_d"` or `"d_prime"`.
    pub name: String,
    /// Shape; empty for scalars, row-major for matrices.
    pub shape: Vec<usize>,
    /// Transform applied to every element.
    pub transform: Transform,
    /// Offset of the first element in the flat vector.
    pub offset: usize,
}

impl ParameterBlock {
    /// Number of scalar elements.
    pub fn len(&self) -> usize {
        self.shape.iter().product()
    }

    /// True for zero-sized blocks.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flat index range of the block.
    pub fn range(&self) -> core::ops::Range<usize> {
        self.offset..self.offset + self.len()
    }

    fn element_name(&self, i: usize) -> String {
        match self.shape.as_slice() {
            [] => self.name.clone(),
            [_] => format!("{}[{}]", self.name, i),
            [_, cols] => format!("{}[{},{}]", self.name, i / cols, i % cols),
            _ => format!("{}[{}]", self.name, i),
        }
    }
}

/// Ordered list of parameter blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterLayout {
    blocks: Vec<ParameterBlock>,
    dim: usize,
}

impl ParameterLayout {
    /// Empty layout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a block; returns its offset.
    pub fn push(&mut self, name: &str, shape: &[usize], transform: Transform) -> usize {
        let offset = self.dim;
        let block = ParameterBlock {
            name: String::from(name),
            shape: shape.to_vec(),
            transform,
            offset,
        };
        self.dim += block.len();
        self.blocks.push(block);
        offset
    }

    /// Total number of scalar parameters.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// All blocks in order.
    pub fn blocks(&self) -> &[ParameterBlock] {
        &self.blocks
    }

    /// Look up a block by name.
    pub fn block(&self, name: &str) -> Option<&ParameterBlock> {
        self.blocks.iter().find(|b| b.name == name)
    }

    /// Offset of a block by name.
    pub fn offset(&self, name: &str) -> Option<usize> {
        self.block(name).map(|b| b.offset)
    }

    /// Element-wise names (`d_prime[0,3]`, `alpha_p[2]`, `sigma_d`, ...).
    pub fn flat_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.dim);
        for block in &self.blocks {
            for i in 0..block.len() {
                names.push(block.element_name(i));
            }
        }
        names
    }

    /// Map an unconstrained position to parameter values on their support.
    pub fn constrain(&self, position: &[f64]) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.dim);
        for block in &self.blocks {
            out.extend(position[block.range()].iter().map(|&u| block.transform.constrain(u)));
        }
        out
    }

    /// Map constrained parameter values (as stored in a posterior) back to
    /// the sampler's unconstrained scale.
    pub fn unconstrain(&self, values: &[f64]) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.dim);
        for block in &self.blocks {
            out.extend(values[block.range()].iter().map(|&x| block.transform.unconstrain(x)));
        }
        out
    }
}
