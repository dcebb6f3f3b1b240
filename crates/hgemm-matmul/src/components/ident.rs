#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
/// Identifier for all three tensors in a matmul
///
/// Useful to specialize some functions depending on the tensor
pub enum MatmulIdent {
    Lhs,
    Rhs,
    Out,
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
/// Identifier for the regions of the staging memory
pub enum StageIdent {
    Lhs,
    Rhs,
}
