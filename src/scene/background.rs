use crate::scene::element::BlendMode;

fn default_one() -> f64 {
    1.0
}

/// Artboard background, painted before any element.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BackgroundConfig {
    /// A disabled background leaves the surface transparent.
    pub enabled: bool,
    /// Layers composited bottom to top.
    pub layers: Vec<BackgroundLayer>,
}

impl BackgroundConfig {
    /// Enabled background with one solid layer.
    pub fn solid(color: impl Into<String>) -> Self {
        Self {
            enabled: true,
            layers: vec![BackgroundLayer {
                kind: LayerKind::Solid,
                color_stops: vec![ColorStop {
                    color: color.into(),
                    position: 0.0,
                }],
                angle: 0.0,
                blend_mode: BlendMode::Normal,
                opacity: 1.0,
            }],
        }
    }
}

/// One background layer.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackgroundLayer {
    /// Fill kind.
    #[serde(rename = "type")]
    pub kind: LayerKind,
    /// Gradient stops; a solid layer uses the first stop's color.
    #[serde(default)]
    pub color_stops: Vec<ColorStop>,
    /// CSS gradient angle in degrees (`0` points up, `90` points right). Linear gradients only.
    #[serde(default)]
    pub angle: f64,
    /// How the layer composites over the layers beneath it.
    #[serde(default)]
    pub blend_mode: BlendMode,
    /// Layer opacity in `[0, 1]`.
    #[serde(default = "default_one")]
    pub opacity: f64,
}

/// Background layer fill kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayerKind {
    /// Uniform color.
    Solid,
    /// Linear gradient along `angle`.
    LinearGradient,
    /// Elliptical gradient from the center to the farthest corner.
    RadialGradient,
}

/// Gradient stop.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ColorStop {
    /// Stop color.
    pub color: String,
    /// Position along the gradient in `[0, 1]`.
    #[serde(default)]
    pub position: f64,
}
