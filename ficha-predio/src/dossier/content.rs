//! Blocs de contenu du rapport, indépendants du moteur de rendu
//!
//! Les dimensions sont en points PDF (1/72 de pouce).

use super::images::EmbeddedImage;

/// Un centimètre en points
pub const CM: f32 = 72.0 / 2.54;

/// Un pouce en points
pub const INCH: f32 = 72.0;

/// Graisse et style d'un fragment de texte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextStyle {
    #[default]
    Regular,
    Bold,
    Italic,
    BoldItalic,
}

/// Fragment d'un paragraphe
#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    Text { text: String, style: TextStyle },
    LineBreak,
}

/// Style de paragraphe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParagraphStyle {
    /// Texte courant justifié
    Body,
    /// Ligne de liste, indentée de 1 cm
    ListItem,
    /// Chasse fixe, gris
    Code,
    /// Légende centrée, italique gris
    Caption,
    /// Note de bas de tableau
    Note,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Paragraph {
    pub style: ParagraphStyle,
    pub content: Vec<Inline>,
}

impl Paragraph {
    pub fn new(style: ParagraphStyle) -> Self {
        Self {
            style,
            content: Vec::new(),
        }
    }

    pub fn body() -> Self {
        Self::new(ParagraphStyle::Body)
    }

    pub fn text(self, text: impl Into<String>) -> Self {
        self.styled(text, TextStyle::Regular)
    }

    pub fn bold(self, text: impl Into<String>) -> Self {
        self.styled(text, TextStyle::Bold)
    }

    pub fn italic(self, text: impl Into<String>) -> Self {
        self.styled(text, TextStyle::Italic)
    }

    pub fn styled(mut self, text: impl Into<String>, style: TextStyle) -> Self {
        self.content.push(Inline::Text {
            text: text.into(),
            style,
        });
        self
    }

    pub fn line_break(mut self) -> Self {
        self.content.push(Inline::LineBreak);
        self
    }

    /// Texte brut, retours à la ligne compris
    pub fn plain_text(&self) -> String {
        self.content
            .iter()
            .map(|inline| match inline {
                Inline::Text { text, .. } => text.as_str(),
                Inline::LineBreak => "\n",
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingLevel {
    /// Titre du document
    Title,
    /// Section numérotée
    Section,
    /// Sous-section (lindero)
    Subsection,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Heading {
    pub level: HeadingLevel,
    pub text: String,
}

impl Heading {
    pub fn new(level: HeadingLevel, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
        }
    }
}

/// Tableau à en-tête unique
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Largeur de chaque colonne (points)
    pub column_widths: Vec<f32>,
}

impl Table {
    pub fn width(&self) -> f32 {
        self.column_widths.iter().sum()
    }
}

/// Image placée dans le flux, centrée
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBlock {
    pub image: EmbeddedImage,
    pub width: f32,
    pub height: f32,
}

/// Bloc du flux de contenu
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Heading(Heading),
    Paragraph(Paragraph),
    /// Espace vertical (points)
    Spacer(f32),
    Table(Table),
    Image(ImageBlock),
    PageBreak,
    /// Groupe à ne pas couper entre deux pages
    KeepTogether(Vec<Block>),
}

impl From<Heading> for Block {
    fn from(heading: Heading) -> Self {
        Block::Heading(heading)
    }
}

impl From<Paragraph> for Block {
    fn from(paragraph: Paragraph) -> Self {
        Block::Paragraph(paragraph)
    }
}

impl From<Table> for Block {
    fn from(table: Table) -> Self {
        Block::Table(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraph_builder() {
        let p = Paragraph::body()
            .bold("Elaborado por:")
            .line_break()
            .text("Cartography Hub");
        assert_eq!(p.content.len(), 3);
        assert_eq!(p.plain_text(), "Elaborado por:\nCartography Hub");
        assert_eq!(p.style, ParagraphStyle::Body);
    }

    #[test]
    fn test_units() {
        assert!((21.0 * CM - 595.2756).abs() < 1e-3);
        assert!((0.75 * INCH - 54.0).abs() < f32::EPSILON);
    }
}
