use std::collections::{BTreeMap, BTreeSet};

use crate::{
    document::model::{Document, FontName, LetterSpacing, LineHeight, NodeId, NodeKind},
    foundation::error::{ReframeError, ReframeResult},
};

/// Host capability that makes a font available for ranged text edits.
pub trait FontLoader {
    /// Load `font`; an error means ranged edits on text using it must be skipped.
    fn load_font(&mut self, font: &FontName) -> ReframeResult<()>;
}

/// Loader backed by a fixed set of installed fonts. `None` accepts every font.
#[derive(Clone, Debug, Default)]
pub struct StaticFontLoader {
    installed: Option<BTreeSet<FontName>>,
    calls: usize,
}

impl StaticFontLoader {
    /// Loader that accepts any font.
    pub fn accept_all() -> Self {
        Self::default()
    }

    /// Loader that only knows `fonts`.
    pub fn with_fonts(fonts: impl IntoIterator<Item = FontName>) -> Self {
        Self {
            installed: Some(fonts.into_iter().collect()),
            calls: 0,
        }
    }

    /// Number of `load_font` calls received.
    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl FontLoader for StaticFontLoader {
    fn load_font(&mut self, font: &FontName) -> ReframeResult<()> {
        self.calls += 1;
        match &self.installed {
            Some(set) if !set.contains(font) => Err(ReframeError::FontLoad {
                family: font.family.clone(),
                style: font.style.clone(),
                reason: "font is not installed".to_string(),
            }),
            _ => Ok(()),
        }
    }
}

/// Caller-owned memo of font load results, keyed by family + style.
#[derive(Clone, Debug, Default)]
pub struct FontCache {
    loaded: BTreeSet<FontName>,
    failed: BTreeMap<FontName, String>,
}

impl FontCache {
    /// Ensure `font` is loaded, asking `loader` at most once per font.
    pub fn ensure_loaded(
        &mut self,
        loader: &mut dyn FontLoader,
        font: &FontName,
    ) -> ReframeResult<()> {
        if self.loaded.contains(font) {
            return Ok(());
        }
        if let Some(reason) = self.failed.get(font) {
            return Err(ReframeError::FontLoad {
                family: font.family.clone(),
                style: font.style.clone(),
                reason: reason.clone(),
            });
        }
        match loader.load_font(font) {
            Ok(()) => {
                self.loaded.insert(font.clone());
                Ok(())
            }
            Err(e) => {
                tracing::warn!(family = %font.family, style = %font.style, "font load failed");
                self.failed.insert(font.clone(), e.to_string());
                Err(e)
            }
        }
    }

    /// `true` once `font` loaded successfully.
    pub fn is_loaded(&self, font: &FontName) -> bool {
        self.loaded.contains(font)
    }
}

/// Scale every ranged text property of `id` by `scale`.
///
/// Fonts used by the node are loaded first; nothing is edited if any of them fails.
pub fn scale_text_ranges(
    doc: &mut Document,
    id: NodeId,
    scale: f64,
    fonts: &mut FontCache,
    loader: &mut dyn FontLoader,
) -> ReframeResult<()> {
    let used: BTreeSet<FontName> = match &doc.node(id)?.kind {
        NodeKind::Text(text) => text.runs.iter().map(|r| r.font.clone()).collect(),
        _ => return Ok(()),
    };
    for font in &used {
        fonts.ensure_loaded(loader, font)?;
    }

    if let NodeKind::Text(text) = &mut doc.node_mut(id)?.kind {
        for run in &mut text.runs {
            run.font_size = (run.font_size * scale).max(1.0);
            if let LineHeight::Pixels(px) = run.line_height {
                run.line_height = LineHeight::Pixels((px * scale).max(1.0));
            }
            if let LetterSpacing::Pixels(px) = run.letter_spacing {
                run.letter_spacing = LetterSpacing::Pixels(px * scale);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/document/text.rs"]
mod tests;
