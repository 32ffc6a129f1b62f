use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::color::LuminanceWeights;
use crate::error::CoreError;
use crate::palette::{PALETTE_DEFAULT, Palette};

/// Configuration complète d'un rendu.
///
/// Sérialisable en TOML. Chaque champ a une valeur par défaut saine ; la CLI
/// écrase ensuite ce qui a été passé explicitement.
///
/// # Example
/// ```
/// use gg_core::config::{ColorDepth, RenderConfig};
/// let config = RenderConfig::default();
/// assert_eq!(config.color_depth, ColorDepth::None);
/// assert!(config.width.is_none());
/// ```
#[allow(clippy::struct_excessive_bools)]
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct RenderConfig {
    // === Palette ===
    /// Glyphes, du plus clair au plus dense.
    pub palette: String,
    /// Inverser la luminance (texte clair sur fond sombre).
    pub invert: bool,

    // === Contours ===
    /// Remplacer les cellules à fort gradient par un glyphe directionnel.
    pub edges: bool,
    /// N'afficher que les contours ; le reste est vide.
    pub edges_only: bool,
    /// Magnitude minimale de gradient pour un contour [0.0, 2.0].
    pub edge_threshold: f32,

    // === Couleur ===
    /// Profondeur de couleur ANSI.
    pub color_depth: ColorDepth,
    /// Colorer le fond de la cellule plutôt que le glyphe.
    pub fill: bool,
    /// Forcer le chemin niveaux de gris.
    pub grayscale: bool,
    /// Poids R/G/B pour la luminance, normalisés par `clamp_all`.
    pub luminance: LuminanceWeights,

    // === Géométrie ===
    /// Miroir gauche/droite en plus de l'orientation EXIF.
    pub flip_x: bool,
    /// Miroir haut/bas en plus de l'orientation EXIF.
    pub flip_y: bool,
    /// Centrer horizontalement dans le terminal.
    pub center_x: bool,
    /// Centrer verticalement dans le terminal.
    pub center_y: bool,
    /// Encadrer la grille.
    pub border: bool,
    /// Effacer l'écran avant le rendu.
    pub clear_screen: bool,

    // === Dimensions ===
    /// Largeur imposée en cellules.
    pub width: Option<u32>,
    /// Hauteur imposée en cellules.
    pub height: Option<u32>,
    /// Ajustement à la taille du terminal.
    pub fit: FitMode,
    /// Largeur du terminal, détectée si absente.
    pub term_width: Option<u32>,
    /// Hauteur du terminal, détectée si absente.
    pub term_height: Option<u32>,

    // === Sortie ===
    /// Terminal, HTML ou XHTML.
    pub output: OutputMode,
    /// Markup sans en-tête ni pied de document.
    pub markup_raw: bool,
    /// Options du document HTML/XHTML.
    pub html: HtmlOptions,
    /// Informations source/sortie et barre de progression sur stderr.
    pub verbose: bool,
}

/// ANSI color depth for terminal output.
///
/// # Example
/// ```
/// use gg_core::config::ColorDepth;
/// assert!(!ColorDepth::None.is_color());
/// assert!(ColorDepth::Ansi8.is_color());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub enum ColorDepth {
    /// Glyphes seuls.
    #[default]
    None,
    /// 8 couleurs + gras.
    Ansi4,
    /// Palette 256 couleurs.
    Ansi8,
    /// 24 bits.
    TrueColor,
}

impl ColorDepth {
    /// Whether escapes are emitted at all.
    #[must_use]
    pub fn is_color(self) -> bool {
        self != Self::None
    }

    /// Parse the numeric form used on the command line: 0, 4, 8 or 24.
    ///
    /// # Errors
    /// [`CoreError::Config`] for any other value.
    ///
    /// # Example
    /// ```
    /// use gg_core::config::ColorDepth;
    /// assert_eq!(ColorDepth::from_bits(24).unwrap(), ColorDepth::TrueColor);
    /// assert!(ColorDepth::from_bits(16).is_err());
    /// ```
    pub fn from_bits(bits: u8) -> Result<Self, CoreError> {
        match bits {
            0 => Ok(Self::None),
            4 => Ok(Self::Ansi4),
            8 => Ok(Self::Ansi8),
            24 => Ok(Self::TrueColor),
            other => Err(CoreError::Config(format!(
                "profondeur de couleur {other} (attendu 0, 4, 8 ou 24)"
            ))),
        }
    }
}

/// How the grid is sized against the terminal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub enum FitMode {
    /// Ignore the terminal.
    #[default]
    Off,
    /// Fill the terminal height, then shrink to its width if needed.
    Auto,
    /// Fill the terminal width.
    Width,
    /// Fill the terminal height.
    Height,
}

/// Output document kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub enum OutputMode {
    /// ANSI text.
    #[default]
    Terminal,
    /// HTML document.
    Html,
    /// XHTML document.
    Xhtml,
}

impl OutputMode {
    /// HTML or XHTML.
    #[must_use]
    pub fn is_markup(self) -> bool {
        self != Self::Terminal
    }
}

/// HTML/XHTML document options.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct HtmlOptions {
    /// Contenu de `<title>`.
    pub title: String,
    /// Taille de police en points.
    pub font_size: u32,
    /// Texte en gras.
    pub bold: bool,
    /// Page sombre (fond noir) au lieu de claire.
    pub dark_background: bool,
}

impl Default for HtmlOptions {
    fn default() -> Self {
        Self {
            title: "glyphgrid".to_string(),
            font_size: 4,
            bold: false,
            dark_background: false,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            palette: PALETTE_DEFAULT.to_string(),
            invert: false,
            edges: false,
            edges_only: false,
            edge_threshold: 0.4,
            color_depth: ColorDepth::None,
            fill: false,
            grayscale: false,
            luminance: LuminanceWeights::default(),
            flip_x: false,
            flip_y: false,
            center_x: false,
            center_y: false,
            border: false,
            clear_screen: false,
            width: None,
            height: None,
            fit: FitMode::Off,
            term_width: None,
            term_height: None,
            output: OutputMode::Terminal,
            markup_raw: false,
            html: HtmlOptions::default(),
            verbose: false,
        }
    }
}

impl RenderConfig {
    /// Clamp all numeric fields to their valid ranges.
    /// Called after TOML deserialization and after CLI overrides.
    pub fn clamp_all(&mut self) {
        self.edge_threshold = self.edge_threshold.clamp(0.0, 2.0);
        self.luminance = self.luminance.normalized();
        self.html.font_size = self.html.font_size.clamp(1, 72);
        if self.edges_only {
            self.edges = true;
        }
    }

    /// Checks that cannot be repaired by clamping.
    ///
    /// # Errors
    /// [`CoreError::Config`] for an empty palette,
    /// [`CoreError::InvalidDimensions`] for an explicit zero width or height.
    ///
    /// # Example
    /// ```
    /// use gg_core::config::RenderConfig;
    /// let mut c = RenderConfig::default();
    /// assert!(c.validate().is_ok());
    /// c.width = Some(0);
    /// assert!(c.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.palette.is_empty() {
            return Err(CoreError::Config("palette vide".into()));
        }
        if self.width == Some(0) || self.height == Some(0) {
            return Err(CoreError::InvalidDimensions {
                width: self.width.unwrap_or_default(),
                height: self.height.unwrap_or_default(),
            });
        }
        Ok(())
    }

    /// Palette built from `palette`.
    ///
    /// # Errors
    /// [`CoreError::Config`] if the palette string is empty.
    pub fn build_palette(&self) -> Result<Palette, CoreError> {
        Palette::new(&self.palette)
    }
}

/// Structure TOML intermédiaire pour désérialisation avec valeurs optionnelles.
#[derive(Deserialize)]
struct ConfigFile {
    render: Option<RenderSection>,
    layout: Option<LayoutSection>,
    html: Option<HtmlSection>,
}

/// Render section of the TOML config, all fields optional for partial override.
#[derive(Deserialize)]
struct RenderSection {
    palette: Option<String>,
    invert: Option<bool>,
    edges: Option<bool>,
    edges_only: Option<bool>,
    edge_threshold: Option<f32>,
    color_depth: Option<ColorDepth>,
    fill: Option<bool>,
    grayscale: Option<bool>,
    red: Option<f32>,
    green: Option<f32>,
    blue: Option<f32>,
    verbose: Option<bool>,
}

/// Layout section of the TOML config, all fields optional.
#[derive(Deserialize)]
struct LayoutSection {
    width: Option<u32>,
    height: Option<u32>,
    fit: Option<FitMode>,
    term_width: Option<u32>,
    term_height: Option<u32>,
    flip_x: Option<bool>,
    flip_y: Option<bool>,
    center_x: Option<bool>,
    center_y: Option<bool>,
    border: Option<bool>,
    clear_screen: Option<bool>,
}

/// HTML section of the TOML config, all fields optional.
#[derive(Deserialize)]
struct HtmlSection {
    output: Option<OutputMode>,
    raw: Option<bool>,
    title: Option<String>,
    font_size: Option<u32>,
    bold: Option<bool>,
    dark_background: Option<bool>,
}

/// Charge un fichier TOML et fusionne avec les valeurs par défaut.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
///
/// # Example
/// ```
/// use gg_core::config::load_config;
/// let path = std::env::temp_dir().join("glyphgrid-doc-load.toml");
/// std::fs::write(&path, "[layout]\nborder = true\n").unwrap();
/// let config = load_config(&path).unwrap();
/// assert!(config.border);
/// # std::fs::remove_file(&path).ok();
/// ```
pub fn load_config(path: &Path) -> Result<RenderConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {}", path.display()))?;
    log::debug!("configuration chargée depuis {}", path.display());
    parse_config(&content)
        .with_context(|| format!("Erreur de parsing TOML dans {}", path.display()))
}

/// Fusionne un document TOML avec les valeurs par défaut.
///
/// # Errors
/// Returns an error if the document is not valid TOML for this schema.
///
/// # Example
/// ```
/// use gg_core::config::{parse_config, ColorDepth};
/// let c = parse_config("[render]\ncolor_depth = \"Ansi8\"\n").unwrap();
/// assert_eq!(c.color_depth, ColorDepth::Ansi8);
/// ```
#[allow(clippy::too_many_lines)]
pub fn parse_config(content: &str) -> Result<RenderConfig> {
    let file: ConfigFile = toml::from_str(content)?;
    let mut config = RenderConfig::default();

    if let Some(r) = file.render {
        if let Some(v) = r.palette {
            config.palette = v;
        }
        if let Some(v) = r.invert {
            config.invert = v;
        }
        if let Some(v) = r.edges {
            config.edges = v;
        }
        if let Some(v) = r.edges_only {
            config.edges_only = v;
        }
        if let Some(v) = r.edge_threshold {
            config.edge_threshold = v;
        }
        if let Some(v) = r.color_depth {
            config.color_depth = v;
        }
        if let Some(v) = r.fill {
            config.fill = v;
        }
        if let Some(v) = r.grayscale {
            config.grayscale = v;
        }
        if let Some(v) = r.red {
            config.luminance.red = v;
        }
        if let Some(v) = r.green {
            config.luminance.green = v;
        }
        if let Some(v) = r.blue {
            config.luminance.blue = v;
        }
        if let Some(v) = r.verbose {
            config.verbose = v;
        }
    }

    if let Some(l) = file.layout {
        if l.width.is_some() {
            config.width = l.width;
        }
        if l.height.is_some() {
            config.height = l.height;
        }
        if let Some(v) = l.fit {
            config.fit = v;
        }
        if l.term_width.is_some() {
            config.term_width = l.term_width;
        }
        if l.term_height.is_some() {
            config.term_height = l.term_height;
        }
        if let Some(v) = l.flip_x {
            config.flip_x = v;
        }
        if let Some(v) = l.flip_y {
            config.flip_y = v;
        }
        if let Some(v) = l.center_x {
            config.center_x = v;
        }
        if let Some(v) = l.center_y {
            config.center_y = v;
        }
        if let Some(v) = l.border {
            config.border = v;
        }
        if let Some(v) = l.clear_screen {
            config.clear_screen = v;
        }
    }

    if let Some(h) = file.html {
        if let Some(v) = h.output {
            config.output = v;
        }
        if let Some(v) = h.raw {
            config.markup_raw = v;
        }
        if let Some(v) = h.title {
            config.html.title = v;
        }
        if let Some(v) = h.font_size {
            config.html.font_size = v;
        }
        if let Some(v) = h.bold {
            config.html.bold = v;
        }
        if let Some(v) = h.dark_background {
            config.html.dark_background = v;
        }
    }

    config.clamp_all();
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_document_yields_defaults() {
        assert_eq!(parse_config("").unwrap(), RenderConfig::default());
    }

    #[test]
    fn partial_sections_override_only_their_fields() {
        let c = parse_config(
            r#"
            [render]
            invert = true
            edge_threshold = 9.0

            [layout]
            width = 40
            fit = "Auto"

            [html]
            output = "Xhtml"
            title = "demo"
            "#,
        )
        .unwrap();
        assert!(c.invert);
        assert_eq!(c.edge_threshold, 2.0);
        assert_eq!(c.width, Some(40));
        assert_eq!(c.height, None);
        assert_eq!(c.fit, FitMode::Auto);
        assert_eq!(c.output, OutputMode::Xhtml);
        assert_eq!(c.html.title, "demo");
        assert_eq!(c.html.font_size, 4);
        assert_eq!(c.palette, PALETTE_DEFAULT);
    }

    #[test]
    fn weights_are_normalized_after_loading() {
        let c = parse_config("[render]\nred = 1.0\ngreen = 1.0\nblue = 2.0\n").unwrap();
        assert_eq!(c.luminance.blue, 0.5);
    }

    #[test]
    fn edges_only_implies_edges() {
        let c = parse_config("[render]\nedges_only = true\n").unwrap();
        assert!(c.edges);
    }

    #[test]
    fn unknown_enum_value_is_rejected() {
        assert!(parse_config("[render]\ncolor_depth = \"Ansi16\"\n").is_err());
    }

    #[test]
    fn load_config_reads_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "[layout]\nborder = true").unwrap();
        let c = load_config(f.path()).unwrap();
        assert!(c.border);
    }

    #[test]
    fn load_config_reports_missing_file() {
        let err = load_config(Path::new("/nonexistent/glyphgrid.toml")).unwrap_err();
        assert!(err.to_string().contains("Impossible de lire"));
    }
}
