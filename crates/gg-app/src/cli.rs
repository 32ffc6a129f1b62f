use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use gg_core::config::{ColorDepth, FitMode, OutputMode, RenderConfig};
use gg_core::palette::{PALETTE_BLOCKS, PALETTE_COMPACT, PALETTE_DEFAULT};

/// glyphgrid: renders images as character grids for terminals, HTML and XHTML.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Images à convertir (chemins, ou `-` pour l'entrée standard).
    #[arg(required = true)]
    pub files: Vec<String>,

    /// Fichier de configuration TOML, appliqué sous les options CLI.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Écrire dans ce fichier au lieu de la sortie standard.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Palette, du plus clair au plus dense.
    #[arg(long)]
    pub chars: Option<String>,

    /// Palette prédéfinie.
    #[arg(long, value_enum, conflicts_with = "chars")]
    pub palette: Option<PaletteArg>,

    /// Inverser la palette (texte clair sur fond sombre).
    #[arg(short, long, default_value_t = false)]
    pub invert: bool,

    /// Glyphes directionnels sur les contours.
    #[arg(long, default_value_t = false)]
    pub edges: bool,

    /// Contours seulement, le reste est laissé vide.
    #[arg(long, default_value_t = false)]
    pub edges_only: bool,

    /// Seuil de magnitude des contours (0 à 2).
    #[arg(long)]
    pub edge_threshold: Option<f32>,

    /// Couleurs, profondeur détectée depuis COLORTERM/TERM.
    #[arg(long, default_value_t = false)]
    pub colors: bool,

    /// Profondeur de couleur explicite : 4, 8 ou 24 bits.
    #[arg(long, value_parser = clap::value_parser!(u8).range(4..=24))]
    pub color_depth: Option<u8>,

    /// Colorer le fond des cellules.
    #[arg(long, default_value_t = false)]
    pub fill: bool,

    /// Forcer le rendu en niveaux de gris.
    #[arg(long, default_value_t = false)]
    pub grayscale: bool,

    /// Poids du rouge dans la luminance.
    #[arg(long)]
    pub red: Option<f32>,

    /// Poids du vert dans la luminance.
    #[arg(long)]
    pub green: Option<f32>,

    /// Poids du bleu dans la luminance.
    #[arg(long)]
    pub blue: Option<f32>,

    /// Miroir horizontal.
    #[arg(long, default_value_t = false)]
    pub flipx: bool,

    /// Miroir vertical.
    #[arg(long, default_value_t = false)]
    pub flipy: bool,

    /// Centrer horizontalement dans le terminal.
    #[arg(long, default_value_t = false)]
    pub center_x: bool,

    /// Centrer verticalement dans le terminal.
    #[arg(long, default_value_t = false)]
    pub center_y: bool,

    /// Centrer dans les deux directions.
    #[arg(long, default_value_t = false)]
    pub center: bool,

    /// Cadre autour de la grille.
    #[arg(short, long, default_value_t = false)]
    pub border: bool,

    /// Effacer l'écran avant le rendu.
    #[arg(long, default_value_t = false)]
    pub clear: bool,

    /// Largeur en colonnes.
    #[arg(long)]
    pub width: Option<u32>,

    /// Hauteur en lignes.
    #[arg(long)]
    pub height: Option<u32>,

    /// Taille exacte `LARGEURxHAUTEUR`.
    #[arg(long, conflicts_with_all = ["width", "height"])]
    pub size: Option<String>,

    /// Ajuster au terminal.
    #[arg(long, value_enum)]
    pub term_fit: Option<FitArg>,

    /// Largeur du terminal (détectée sinon).
    #[arg(long)]
    pub term_width: Option<u32>,

    /// Hauteur du terminal (détectée sinon).
    #[arg(long)]
    pub term_height: Option<u32>,

    /// Document HTML.
    #[arg(long, default_value_t = false, conflicts_with = "xhtml")]
    pub html: bool,

    /// Document XHTML.
    #[arg(long, default_value_t = false)]
    pub xhtml: bool,

    /// Fragment seul, sans en-tête ni pied de document.
    #[arg(long, default_value_t = false)]
    pub html_raw: bool,

    /// Titre du document.
    #[arg(long)]
    pub html_title: Option<String>,

    /// Taille de police du document, en points.
    #[arg(long)]
    pub html_fontsize: Option<u32>,

    /// Texte en gras.
    #[arg(long, default_value_t = false)]
    pub html_bold: bool,

    /// Fond sombre.
    #[arg(long, default_value_t = false)]
    pub html_dark: bool,

    /// Informations source/sortie et progression sur stderr.
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Niveau de log : error, warn, info, debug, trace.
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

/// `--term-fit` values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum FitArg {
    /// Hauteur du terminal, largeur bornée.
    Auto,
    /// Largeur du terminal.
    Width,
    /// Hauteur du terminal.
    Height,
}

impl From<FitArg> for FitMode {
    fn from(arg: FitArg) -> Self {
        match arg {
            FitArg::Auto => Self::Auto,
            FitArg::Width => Self::Width,
            FitArg::Height => Self::Height,
        }
    }
}

/// `--palette` values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum PaletteArg {
    /// 23 niveaux ASCII.
    Default,
    /// 10 niveaux ASCII.
    Compact,
    /// Blocs Unicode.
    Blocks,
}

impl PaletteArg {
    /// Glyphs of the built-in palette.
    #[must_use]
    pub fn glyphs(self) -> &'static str {
        match self {
            Self::Default => PALETTE_DEFAULT,
            Self::Compact => PALETTE_COMPACT,
            Self::Blocks => PALETTE_BLOCKS,
        }
    }
}

/// Parse `WxH`.
///
/// # Errors
/// Returns an error if the value is not two positive integers separated by `x`.
pub fn parse_size(value: &str) -> anyhow::Result<(u32, u32)> {
    let Some((w, h)) = value.split_once(['x', 'X']) else {
        anyhow::bail!("Taille invalide '{value}', format attendu : LARGEURxHAUTEUR");
    };
    let w: u32 = w.trim().parse()?;
    let h: u32 = h.trim().parse()?;
    if w == 0 || h == 0 {
        anyhow::bail!("Taille invalide '{value}' : dimensions nulles");
    }
    Ok((w, h))
}

/// Color depth advertised by the environment: truecolor through `COLORTERM`,
/// 256 colors through `TERM`, 16 colors otherwise.
#[must_use]
pub fn detect_color_depth(colorterm: Option<&str>, term: Option<&str>) -> ColorDepth {
    if colorterm.is_some_and(|c| c.contains("truecolor") || c.contains("24bit")) {
        ColorDepth::TrueColor
    } else if term.is_some_and(|t| t.contains("256")) {
        ColorDepth::Ansi8
    } else {
        ColorDepth::Ansi4
    }
}

impl Cli {
    /// Checks clap cannot express.
    ///
    /// # Errors
    /// Returns an error for a malformed `--size` or color depth.
    pub fn validate(&self) -> anyhow::Result<()> {
        if let Some(size) = self.size.as_deref() {
            parse_size(size)?;
        }
        if let Some(bits) = self.color_depth {
            ColorDepth::from_bits(bits)?;
        }
        if self.html_raw && !(self.html || self.xhtml) {
            log::warn!("--html-raw sans --html ou --xhtml, ignoré.");
        }
        Ok(())
    }

    /// Apply the command-line options on top of a file configuration.
    ///
    /// # Errors
    /// Returns an error for a malformed `--size` or color depth.
    pub fn apply_overrides(&self, config: &mut RenderConfig) -> anyhow::Result<()> {
        if let Some(ref chars) = self.chars {
            config.palette.clone_from(chars);
        } else if let Some(palette) = self.palette {
            config.palette = palette.glyphs().to_string();
        }
        config.invert |= self.invert;
        config.edges |= self.edges;
        config.edges_only |= self.edges_only;
        if let Some(t) = self.edge_threshold {
            config.edge_threshold = t;
        }
        config.fill |= self.fill;
        config.grayscale |= self.grayscale;
        if let Some(v) = self.red {
            config.luminance.red = v;
        }
        if let Some(v) = self.green {
            config.luminance.green = v;
        }
        if let Some(v) = self.blue {
            config.luminance.blue = v;
        }

        config.flip_x |= self.flipx;
        config.flip_y |= self.flipy;
        config.center_x |= self.center_x || self.center;
        config.center_y |= self.center_y || self.center;
        config.border |= self.border;
        config.clear_screen |= self.clear;

        if let Some(size) = self.size.as_deref() {
            let (w, h) = parse_size(size)?;
            config.width = Some(w);
            config.height = Some(h);
        }
        if self.width.is_some() || self.height.is_some() {
            config.width = self.width;
            config.height = self.height;
        }
        if let Some(fit) = self.term_fit {
            config.fit = fit.into();
        }
        if self.term_width.is_some() {
            config.term_width = self.term_width;
        }
        if self.term_height.is_some() {
            config.term_height = self.term_height;
        }

        if self.html {
            config.output = OutputMode::Html;
        } else if self.xhtml {
            config.output = OutputMode::Xhtml;
        }
        config.markup_raw |= self.html_raw;
        if let Some(ref title) = self.html_title {
            config.html.title.clone_from(title);
        }
        if let Some(size) = self.html_fontsize {
            config.html.font_size = size;
        }
        config.html.bold |= self.html_bold;
        config.html.dark_background |= self.html_dark;

        if let Some(bits) = self.color_depth {
            config.color_depth = ColorDepth::from_bits(bits)?;
        } else if self.colors {
            config.color_depth = if config.output.is_markup() {
                ColorDepth::TrueColor
            } else {
                detect_color_depth(
                    std::env::var("COLORTERM").ok().as_deref(),
                    std::env::var("TERM").ok().as_deref(),
                )
            };
        }
        config.verbose |= self.verbose;
        Ok(())
    }
}
