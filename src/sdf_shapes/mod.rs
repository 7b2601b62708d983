pub mod morph;
pub mod primitives;
pub mod raymarch;
pub mod sdf_object;
pub mod shifter;

pub use morph::{MORPH_CYCLE_LENGTH, MorphPhase, Primitive};
pub use raymarch::{
    NORMAL_EPSILON, RaymarchHit, RaymarchResult, RaymarchSettings, RaymarchStatus,
    compute_normal, raymarch,
};
pub use sdf_object::{DistanceField, SceneSample};
pub use shifter::{SHIFTER_COUNT, Shifter, default_shifters, nearest_shifter};
