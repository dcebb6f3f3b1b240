use hgemm_runtime::tensor::{MatrixLayout, TensorHandle};

use super::{FormattedConfigError, MatmulIdent, MatmulSetupError};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// Description of a matmul problem to solve, regardless of actual data
pub struct MatmulProblem {
    pub m: usize,
    pub n: usize,
    pub k: usize,
    pub lhs_layout: MatrixLayout,
    pub rhs_layout: MatrixLayout,
    pub out_layout: MatrixLayout,
}

impl MatmulProblem {
    /// Problem described by the operand handles of `out = lhs @ rhs`.
    ///
    /// Fails when the shapes don't agree.
    pub fn from_handles(
        lhs: &TensorHandle,
        rhs: &TensorHandle,
        out: &TensorHandle,
    ) -> Result<Self, MatmulSetupError> {
        let [m, k] = lhs.shape();
        let [rhs_k, n] = rhs.shape();
        let out_shape = out.shape();

        if rhs_k != k || out_shape != [m, n] {
            let (lhs_shape, rhs_shape) = (lhs.shape(), rhs.shape());
            return Err(MatmulSetupError::InvalidProblem(FormattedConfigError::new(
                move || {
                    format!(
                        "Can't multiply lhs {lhs_shape:?} by rhs {rhs_shape:?} into out {out_shape:?}"
                    )
                },
            )));
        }

        Ok(Self {
            m,
            n,
            k,
            lhs_layout: lhs.layout(),
            rhs_layout: rhs.layout(),
            out_layout: out.layout(),
        })
    }

    /// Returns the shape of the identified tensor, inferred by the problem definition
    pub fn shape(&self, ident: MatmulIdent) -> [usize; 2] {
        match ident {
            MatmulIdent::Lhs => [self.m, self.k],
            MatmulIdent::Rhs => [self.k, self.n],
            MatmulIdent::Out => [self.m, self.n],
        }
    }

    /// Returns the layout of the identified tensor
    pub fn layout(&self, ident: MatmulIdent) -> MatrixLayout {
        match ident {
            MatmulIdent::Lhs => self.lhs_layout,
            MatmulIdent::Rhs => self.rhs_layout,
            MatmulIdent::Out => self.out_layout,
        }
    }
}
