// ============================================================
// Layer 5 — Global Gradient Norm Clipping
// ============================================================
// Burn's GradientClippingConfig::Norm clips each parameter tensor
// on its own. Here every gradient is scaled by one shared factor:
//
//   global_norm = sqrt(Σ_p ||g_p||²)
//   g_p        *= min(1, max_norm / global_norm)
//
// so the update direction is kept and the norm of the whole
// gradient vector is at most max_norm.
//
// Both passes walk the model with a ModuleVisitor and look the
// gradients up by ParamId, the way burn-optim's own converters do.

use std::marker::PhantomData;

use burn::{
    module::{AutodiffModule, ModuleVisitor, Param},
    optim::GradientsParams,
    prelude::*,
    tensor::backend::AutodiffBackend,
};

struct SquaredNorm<'a, B: AutodiffBackend> {
    grads: &'a GradientsParams,
    total: Option<Tensor<B::InnerBackend, 1>>,
}

impl<B: AutodiffBackend> ModuleVisitor<B> for SquaredNorm<'_, B> {
    fn visit_float<const D: usize>(&mut self, param: &Param<Tensor<B, D>>) {
        let Some(grad) = self.grads.get::<B::InnerBackend, D>(param.id) else {
            return;
        };
        let sq = grad.powf_scalar(2.0).sum();
        self.total = Some(match self.total.take() {
            Some(total) => total + sq,
            None        => sq,
        });
    }
}

struct Scale<'a, B: AutodiffBackend> {
    grads:   &'a mut GradientsParams,
    factor:  f64,
    _marker: PhantomData<B>,
}

impl<B: AutodiffBackend> ModuleVisitor<B> for Scale<'_, B> {
    fn visit_float<const D: usize>(&mut self, param: &Param<Tensor<B, D>>) {
        let Some(grad) = self.grads.remove::<B::InnerBackend, D>(param.id) else {
            return;
        };
        self.grads.register::<B::InnerBackend, D>(param.id, grad.mul_scalar(self.factor));
    }
}

/// L2 norm of all of `model`'s gradients taken together.
pub fn global_grad_norm<B, M>(model: &M, grads: &GradientsParams) -> f64
where
    B: AutodiffBackend,
    M: AutodiffModule<B>,
{
    let mut visitor = SquaredNorm::<B> { grads, total: None };
    model.visit(&mut visitor);
    visitor
        .total
        .map_or(0.0, |t| t.into_scalar().elem::<f64>())
        .sqrt()
}

/// Rescale `grads` so their global norm is at most `max_norm`.
/// Gradients already inside the bound are returned unchanged.
pub fn clip_global_norm<B, M>(model: &M, mut grads: GradientsParams, max_norm: f64) -> GradientsParams
where
    B: AutodiffBackend,
    M: AutodiffModule<B>,
{
    let norm = global_grad_norm::<B, M>(model, &grads);
    if !norm.is_finite() || norm <= max_norm {
        return grads;
    }

    let factor = max_norm / norm;
    tracing::debug!("Clipping gradients: global norm {:.3} → {:.3}", norm, max_norm);
    let mut scale = Scale::<B> { grads: &mut grads, factor, _marker: PhantomData };
    model.visit(&mut scale);
    grads
}
