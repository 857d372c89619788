//! Compile-time backend selection.
//!
//! `cuda` wins over `wgpu`; without either feature masks are evaluated on the
//! `ndarray` CPU backend.

pub mod burn_backend_types {
    use cfg_if::cfg_if;

    cfg_if! {
        if #[cfg(feature = "cuda")] {
            pub type EvalBackend = burn::backend::Cuda;
            pub type EvalDevice = burn::backend::cuda::CudaDevice;
            pub const NAME: &str = "cuda";
        } else if #[cfg(feature = "wgpu")] {
            pub type EvalBackend = burn::backend::Wgpu;
            pub type EvalDevice = burn::backend::wgpu::WgpuDevice;
            pub const NAME: &str = "wgpu";
        } else {
            pub type EvalBackend = burn::backend::NdArray;
            pub type EvalDevice = burn::backend::ndarray::NdArrayDevice;
            pub const NAME: &str = "ndarray";
        }
    }
}
