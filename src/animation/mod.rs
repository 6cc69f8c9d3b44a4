pub(crate) mod bezier;
pub(crate) mod color;
pub(crate) mod ease;
pub(crate) mod keyframe;
pub(crate) mod resolve;
