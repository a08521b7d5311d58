// ============================================================
// Layer 2 — Backend Selection
// ============================================================
// The use cases are generic over Burn's AutodiffBackend; this enum
// picks the concrete one at run time.
//
//   wgpu → Autodiff<Wgpu>     (GPU through WebGPU)
//   cpu  → Autodiff<NdArray>  (portable, used by the tests)

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub type WgpuBackend = burn::backend::Autodiff<burn::backend::Wgpu>;
pub type CpuBackend  = burn::backend::Autodiff<burn::backend::NdArray>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Wgpu,
    Cpu,
}
