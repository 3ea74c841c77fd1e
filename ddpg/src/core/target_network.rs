//! Target network synchronization by Polyak averaging.
//!
//! ```text
//! θ_target = ρ * θ_online + (1 - ρ) * θ_target
//! ```
//!
//! Applied element-wise to every float parameter. With a small rate (0.001 for
//! Hopper) the target tracks the online network slowly, so the bootstrapped
//! TD-target does not chase every gradient step. Target parameters never
//! receive gradients of their own.

use burn::module::{Module, ModuleMapper, Param};
use burn::prelude::*;

// ============================================================================
// Soft Update Implementation via ModuleMapper
// ============================================================================

/// Collects every float parameter of a module, flattened, in traversal order.
///
/// Two modules built from the same config traverse identically, so the
/// online and target parameters can be matched by position.
struct ParamExtractor<B: Backend> {
    params: Vec<Tensor<B, 1>>,
}

impl<B: Backend> ModuleMapper<B> for ParamExtractor<B> {
    fn map_float<const D: usize>(&mut self, param: Param<Tensor<B, D>>) -> Param<Tensor<B, D>> {
        let val = param.val();
        let total_size: usize = val.dims().iter().product();
        self.params.push(val.detach().reshape([total_size]));
        param
    }
}

/// Interpolates each target parameter toward its online counterpart.
struct PolyakMapper<B: Backend> {
    online_params: Vec<Tensor<B, 1>>,
    rate: f32,
    index: usize,
}

impl<B: Backend> ModuleMapper<B> for PolyakMapper<B> {
    fn map_float<const D: usize>(&mut self, param: Param<Tensor<B, D>>) -> Param<Tensor<B, D>> {
        let idx = self.index;
        self.index += 1;

        let Some(online) = self.online_params.get(idx) else {
            // Architectures differ; leave the parameter untouched
            return param;
        };

        let target_val = param.val();
        let shape = target_val.dims();
        let total_size: usize = shape.iter().product();
        let target_flat = target_val.detach().reshape([total_size]);

        let blended = online.clone().mul_scalar(self.rate) + target_flat.mul_scalar(1.0 - self.rate);
        Param::initialized(param.id.clone(), blended.reshape(shape))
    }
}

/// Move `target` toward `online` by `rate` and return the updated target.
///
/// `rate == 1.0` copies the online parameters exactly; `rate == 0.0` returns
/// the target unchanged.
pub fn soft_update<B, M>(online: &M, target: M, rate: f32) -> M
where
    B: Backend,
    M: Module<B>,
{
    if (rate - 1.0).abs() < f32::EPSILON {
        return hard_copy(online);
    }
    if rate.abs() < f32::EPSILON {
        return target;
    }

    let mut extractor = ParamExtractor { params: Vec::new() };
    let _ = online.clone().map(&mut extractor);

    let mut updater = PolyakMapper {
        online_params: extractor.params,
        rate,
        index: 0,
    };
    target.map(&mut updater)
}

/// Exact copy of the online parameters.
pub fn hard_copy<B, M>(online: &M) -> M
where
    B: Backend,
    M: Module<B>,
{
    online.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use burn::nn::{Linear, LinearConfig};

    type TestBackend = NdArray<f32>;

    fn values(t: Tensor<TestBackend, 2>) -> Vec<f32> {
        t.into_data().to_vec::<f32>().unwrap()
    }

    #[test]
    fn test_rate_zero_returns_target() {
        let device = Default::default();
        let online = LinearConfig::new(4, 4).init::<TestBackend>(&device);
        let target = LinearConfig::new(4, 4).init::<TestBackend>(&device);
        let before = values(target.weight.val());

        let updated = soft_update::<TestBackend, _>(&online, target, 0.0);
        assert_eq!(values(updated.weight.val()), before);
    }

    #[test]
    fn test_rate_one_copies_online() {
        let device = Default::default();
        let online = LinearConfig::new(4, 4).init::<TestBackend>(&device);
        let target = LinearConfig::new(4, 4).init::<TestBackend>(&device);

        let updated = soft_update::<TestBackend, _>(&online, target, 1.0);
        assert_eq!(values(updated.weight.val()), values(online.weight.val()));
    }

    #[test]
    fn test_interpolation_weights_and_bias() {
        let device = Default::default();
        let online = LinearConfig::new(8, 4).init::<TestBackend>(&device);
        let target = LinearConfig::new(8, 4).init::<TestBackend>(&device);

        let online_w = values(online.weight.val());
        let target_w = values(target.weight.val());
        let online_b = online.bias.as_ref().unwrap().val().into_data().to_vec::<f32>().unwrap();
        let target_b = target.bias.as_ref().unwrap().val().into_data().to_vec::<f32>().unwrap();

        let rate = 0.3f32;
        let updated = soft_update::<TestBackend, _>(&online, target, rate);

        let updated_w = values(updated.weight.val());
        for i in 0..online_w.len() {
            let expected = rate * online_w[i] + (1.0 - rate) * target_w[i];
            assert!((updated_w[i] - expected).abs() < 1e-6, "weight {}", i);
        }

        let updated_b = updated.bias.as_ref().unwrap().val().into_data().to_vec::<f32>().unwrap();
        for i in 0..online_b.len() {
            let expected = rate * online_b[i] + (1.0 - rate) * target_b[i];
            assert!((updated_b[i] - expected).abs() < 1e-6, "bias {}", i);
        }
    }

    #[test]
    fn test_small_rate_repeated_converges() {
        let device = Default::default();
        let online = LinearConfig::new(3, 3).init::<TestBackend>(&device);
        let mut target = LinearConfig::new(3, 3).init::<TestBackend>(&device);

        for _ in 0..2000 {
            target = soft_update::<TestBackend, _>(&online, target, 0.01);
        }
        let online_w = values(online.weight.val());
        let target_w = values(target.weight.val());
        for (o, t) in online_w.iter().zip(target_w.iter()) {
            assert!((o - t).abs() < 1e-4);
        }
    }

    #[test]
    fn test_online_untouched() {
        let device = Default::default();
        let online: Linear<TestBackend> = LinearConfig::new(4, 2).init(&device);
        let target: Linear<TestBackend> = LinearConfig::new(4, 2).init(&device);
        let before = values(online.weight.val());

        let _ = soft_update::<TestBackend, _>(&online, target, 0.5);
        assert_eq!(values(online.weight.val()), before);
    }
}
