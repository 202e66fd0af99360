// Performance metrics

mod provider;
mod sampler;

pub use provider::*;
pub use sampler::*;
