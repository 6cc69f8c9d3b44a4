//! Motionboard samples keyframe animations on artboard designs and renders them into frames.
//!
//! The same sampler drives live preview and export, so a scrubbed preview and an exported video
//! agree on every frame:
//!
//! - Describe a scene as [`DesignElement`]s plus an [`AnimationMap`]
//! - Resolve the animated state at any time with [`resolve`] / [`resolve_scene`]
//! - Paint frames with a [`FrameRenderer`]
//! - Export a whole [`Project`] with an [`ExportDriver`] into any [`FrameSink`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod animation;
mod assets;
mod encode;
mod export;
mod foundation;
mod render;
mod scene;

pub use crate::foundation::core::{Affine, BezPath, Canvas, FrameIndex, Point, Rect, Rgba8Premul, Vec2};
pub use crate::foundation::error::{MotionError, MotionResult};

pub use crate::animation::bezier::{Handle, Segment, cubic_bezier, eval_handle_segment};
pub use crate::animation::color::{Rgb, hex_to_rgb, lerp_hex, parse_paint, parse_paint_premul, rgb_to_hex};
pub use crate::animation::ease::{Ease, ease};
pub use crate::animation::keyframe::{Keyframe, KeyframeValue, PropertyTrack, sample_keyframes};
pub use crate::animation::resolve::{
    AnimatableProperty, AnimationMap, ElementAnimation, PropertyPatch, resolve, resolve_patch,
    resolve_scene,
};

pub use crate::scene::background::{BackgroundConfig, BackgroundLayer, ColorStop, LayerKind};
pub use crate::scene::element::{
    BlendMode, DesignElement, ElementKind, GroupProps, ImageProps, LineCap, LineJoin, LineProps,
    RectangleProps, Shadow, TextAlign, TextProps, walk,
};
pub use crate::scene::project::{FontRef, Project};

pub use crate::assets::cache::ImageCache;
pub use crate::assets::decode::{PreparedImage, decode_any, decode_image, looks_like_svg, rasterize_svg};
pub use crate::assets::source::{AssetSource, FsAssetSource, MemoryAssetSource, load_bytes};
pub use crate::assets::text::{TextBrushRgba8, TextLayoutEngine};

pub use crate::render::background::paint_background;
pub use crate::render::blur::{blur_params, blur_rgba8_premul};
pub use crate::render::composite::{composite_over_rgba8_premul, fill_rgba8, shadow_silhouette};
pub use crate::render::frame::{FrameRGBA, FrameRenderer, Scene};

pub use crate::encode::ffmpeg::{
    FFMPEG_ENV, FfmpegSink, FfmpegSinkOpts, ensure_parent_dir, ffmpeg_binary, is_ffmpeg_on_path,
};
pub use crate::encode::png::{PngSequenceSink, encode_png};
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};

pub use crate::export::config::{ExportFormat, RenderConfig};
pub use crate::export::driver::{
    CancelToken, EncoderOptions, ExportDriver, ExportOptions, ExportOutput, ExportProgress,
    ExportStatus, export_project,
};
