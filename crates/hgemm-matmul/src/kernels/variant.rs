use core::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::components::{MatrixLayout, TileGeometry};

use super::{
    Algorithm, NaiveAlgorithm, Opt1Algorithm, Opt2Algorithm, PrefetchAlgorithm, SharedAlgorithm,
    SharedWarpAlgorithm, SharedWarpBufAlgorithm, SharedWarpBufVecAlgorithm,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// The HGEMM kernel to launch, from the simplest to the most optimized.
pub enum KernelVariant {
    /// No shared staging.
    #[serde(rename = "wmma_naive")]
    WmmaNaive,
    /// Shared staging only.
    #[serde(rename = "wmma_shared")]
    WmmaShared,
    /// Shared staging and warp tiling.
    #[serde(rename = "wmma_shared_warp")]
    WmmaSharedWarp,
    /// Adds double buffering.
    #[serde(rename = "wmma_shared_warp_buf")]
    WmmaSharedWarpBuf,
    /// Adds vectorized cooperative loads.
    #[serde(rename = "wmma_shared_warp_buf_vec")]
    WmmaSharedWarpBufVec,
    /// Vectorized cooperative loads of 8 elements.
    #[serde(rename = "wmma_opt_1")]
    WmmaOpt1,
    /// Adds Hilbert scheduling and a staged epilogue.
    #[serde(rename = "wmma_opt_2")]
    WmmaOpt2,
    /// Adds register prefetch.
    #[serde(rename = "wmma_prefetch")]
    WmmaPrefetch,
}

impl KernelVariant {
    /// Every variant, from the simplest to the most optimized.
    pub const fn all() -> [Self; 8] {
        [
            Self::WmmaNaive,
            Self::WmmaShared,
            Self::WmmaSharedWarp,
            Self::WmmaSharedWarpBuf,
            Self::WmmaSharedWarpBufVec,
            Self::WmmaOpt1,
            Self::WmmaOpt2,
            Self::WmmaPrefetch,
        ]
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::WmmaNaive => "wmma_naive",
            Self::WmmaShared => "wmma_shared",
            Self::WmmaSharedWarp => "wmma_shared_warp",
            Self::WmmaSharedWarpBuf => "wmma_shared_warp_buf",
            Self::WmmaSharedWarpBufVec => "wmma_shared_warp_buf_vec",
            Self::WmmaOpt1 => "wmma_opt_1",
            Self::WmmaOpt2 => "wmma_opt_2",
            Self::WmmaPrefetch => "wmma_prefetch",
        }
    }

    pub fn geometry(&self) -> TileGeometry {
        match self {
            Self::WmmaNaive => <NaiveAlgorithm as Algorithm>::geometry(),
            Self::WmmaShared => <SharedAlgorithm as Algorithm>::geometry(),
            Self::WmmaSharedWarp => <SharedWarpAlgorithm as Algorithm>::geometry(),
            Self::WmmaSharedWarpBuf => <SharedWarpBufAlgorithm as Algorithm>::geometry(),
            Self::WmmaSharedWarpBufVec => <SharedWarpBufVecAlgorithm as Algorithm>::geometry(),
            Self::WmmaOpt1 => <Opt1Algorithm as Algorithm>::geometry(),
            Self::WmmaOpt2 => <Opt2Algorithm as Algorithm>::geometry(),
            Self::WmmaPrefetch => <PrefetchAlgorithm as Algorithm>::geometry(),
        }
    }

    /// Operand layouts (lhs, rhs) the variant reads with vector loads.
    ///
    /// Any layout is accepted at launch.
    pub const fn preferred_layouts(&self) -> (MatrixLayout, MatrixLayout) {
        match self {
            Self::WmmaNaive => (MatrixLayout::RowMajor, MatrixLayout::ColMajor),
            _ => (MatrixLayout::ColMajor, MatrixLayout::RowMajor),
        }
    }
}

impl Display for KernelVariant {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Name that doesn't match any [KernelVariant].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariantError(pub String);

impl Display for UnknownVariantError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Unknown kernel variant {:?}", self.0)
    }
}

impl core::error::Error for UnknownVariantError {}

impl FromStr for KernelVariant {
    type Err = UnknownVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .into_iter()
            .find(|variant| variant.name() == s)
            .ok_or_else(|| UnknownVariantError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_roundtrip() {
        for variant in KernelVariant::all() {
            assert_eq!(variant.to_string().parse::<KernelVariant>(), Ok(variant));
        }
        assert_eq!(
            "wmma_opt_3".parse::<KernelVariant>(),
            Err(UnknownVariantError("wmma_opt_3".into()))
        );
    }

    #[test]
    fn geometries() {
        let blocks: Vec<_> = KernelVariant::all()
            .iter()
            .map(|variant| {
                let g = variant.geometry();
                (g.block_m, g.block_n, g.block_k)
            })
            .collect();

        assert_eq!(
            blocks,
            [
                (64, 64, 16),
                (128, 64, 64),
                (128, 128, 32),
                (128, 128, 32),
                (256, 256, 32),
                (256, 256, 32),
                (256, 256, 32),
                (256, 256, 16),
            ]
        );
    }

    #[test]
    fn serde_uses_variant_names() {
        #[derive(Deserialize)]
        struct Entry {
            variant: KernelVariant,
        }

        let entry: Entry = toml::from_str("variant = \"wmma_opt_2\"").unwrap();
        assert_eq!(entry.variant, KernelVariant::WmmaOpt2);
    }
}
