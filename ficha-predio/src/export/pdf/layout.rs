//! Mise en page : styles, coupure des lignes et pagination du flux de blocs
//!
//! Le flux est posé de haut en bas dans le cadre de la page (marges
//! déduites). Règles :
//! - `PageBreak` commence toujours une nouvelle page ;
//! - l'espace avant un bloc et les `Spacer` sont ignorés en haut de page ;
//! - un groupe `KeepTogether` passe à la page suivante s'il ne tient pas
//!   dans l'espace restant mais tient sur une page entière ;
//! - un tableau trop long est coupé par lignes, l'en-tête répété.

use super::canvas::{Canvas, Color};
use super::fonts::{Font, FontFamily};
use crate::dossier::content::{
    Block, Heading, HeadingLevel, ImageBlock, Inline, Paragraph, ParagraphStyle, Table, TextStyle,
    CM,
};

/// Hauteur d'une ligne de tableau (points)
pub const TABLE_ROW_HEIGHT: f32 = 18.0;

/// Corps du texte des cellules
const TABLE_FONT_SIZE: f32 = 10.0;

/// Tolérance des comparaisons de hauteurs
const EPSILON: f32 = 0.01;

/// Format de page et marges (points)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSetup {
    pub width: f32,
    pub height: f32,
    pub margin_left: f32,
    pub margin_right: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
}

impl PageSetup {
    /// Page carrée de 21 cm, marges 1,5 / 1,5 / 2,0 / 2,5 cm
    pub fn square_21cm() -> Self {
        Self {
            width: 21.0 * CM,
            height: 21.0 * CM,
            margin_left: 1.5 * CM,
            margin_right: 1.5 * CM,
            margin_top: 2.0 * CM,
            margin_bottom: 2.5 * CM,
        }
    }

    pub fn frame_width(&self) -> f32 {
        self.width - self.margin_left - self.margin_right
    }

    pub fn frame_height(&self) -> f32 {
        self.height - self.margin_top - self.margin_bottom
    }

    pub fn frame_top(&self) -> f32 {
        self.height - self.margin_top
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Justify,
}

/// Métriques d'un style de texte
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
    pub family: FontFamily,
    pub base_style: TextStyle,
    pub size: f32,
    pub leading: f32,
    pub color: Color,
    pub align: Align,
    pub indent: f32,
    pub space_before: f32,
    pub space_after: f32,
}

const BODY: TextMetrics = TextMetrics {
    family: FontFamily::Helvetica,
    base_style: TextStyle::Regular,
    size: 10.0,
    leading: 14.0,
    color: Color::BLACK,
    align: Align::Justify,
    indent: 0.0,
    space_before: 0.0,
    space_after: 6.0,
};

pub fn paragraph_metrics(style: ParagraphStyle) -> TextMetrics {
    match style {
        ParagraphStyle::Body => BODY,
        ParagraphStyle::ListItem => TextMetrics {
            indent: CM,
            space_after: 2.0,
            ..BODY
        },
        ParagraphStyle::Code => TextMetrics {
            family: FontFamily::Courier,
            size: 9.0,
            leading: 11.0,
            color: Color::GRAY,
            align: Align::Left,
            ..BODY
        },
        ParagraphStyle::Caption => TextMetrics {
            base_style: TextStyle::Italic,
            size: 9.0,
            leading: 12.0,
            color: Color::GRAY,
            align: Align::Center,
            space_after: 0.0,
            ..BODY
        },
        ParagraphStyle::Note => TextMetrics {
            size: 8.0,
            leading: 10.0,
            color: Color::GRAY,
            space_after: 0.0,
            ..BODY
        },
    }
}

pub fn heading_metrics(level: HeadingLevel) -> TextMetrics {
    let bold = TextMetrics {
        base_style: TextStyle::Bold,
        align: Align::Left,
        ..BODY
    };
    match level {
        HeadingLevel::Title => TextMetrics {
            size: 18.0,
            leading: 22.0,
            color: Color::NAVY,
            align: Align::Center,
            space_after: 14.0,
            ..bold
        },
        HeadingLevel::Section => TextMetrics {
            size: 14.0,
            leading: 18.0,
            color: Color::NAVY,
            space_before: 12.0,
            space_after: 6.0,
            ..bold
        },
        HeadingLevel::Subsection => TextMetrics {
            size: 11.0,
            leading: 14.0,
            space_before: 8.0,
            space_after: 4.0,
            ..bold
        },
    }
}

/// Style effectif d'un fragment dans un paragraphe de style `base`
fn combine(base: TextStyle, inline: TextStyle) -> TextStyle {
    let bold = matches!(base, TextStyle::Bold | TextStyle::BoldItalic)
        || matches!(inline, TextStyle::Bold | TextStyle::BoldItalic);
    let italic = matches!(base, TextStyle::Italic | TextStyle::BoldItalic)
        || matches!(inline, TextStyle::Italic | TextStyle::BoldItalic);
    match (bold, italic) {
        (false, false) => TextStyle::Regular,
        (true, false) => TextStyle::Bold,
        (false, true) => TextStyle::Italic,
        (true, true) => TextStyle::BoldItalic,
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Piece {
    text: String,
    font: Font,
    width: f32,
}

/// Mot insécable, éventuellement composé de fragments de styles différents
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Word {
    pieces: Vec<Piece>,
    width: f32,
}

impl Word {
    fn push_piece(&mut self, text: String, font: Font, size: f32) {
        if text.is_empty() {
            return;
        }
        let width = font.text_width(&text, size);
        self.width += width;
        self.pieces.push(Piece { text, font, width });
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn text(&self) -> String {
        self.pieces.iter().map(|p| p.text.as_str()).collect()
    }
}

enum Token {
    Word(Word),
    Break,
}

fn tokenize(content: &[Inline], metrics: &TextMetrics) -> Vec<Token> {
    fn flush(word: &mut Word, tokens: &mut Vec<Token>) {
        if !word.pieces.is_empty() {
            tokens.push(Token::Word(std::mem::take(word)));
        }
    }

    let mut tokens = Vec::new();
    let mut word = Word::default();

    for inline in content {
        match inline {
            Inline::LineBreak => {
                flush(&mut word, &mut tokens);
                tokens.push(Token::Break);
            }
            Inline::Text { text, style } => {
                let font = Font::select(metrics.family, combine(metrics.base_style, *style));
                let mut current = String::new();
                for c in text.chars() {
                    if c.is_whitespace() {
                        word.push_piece(std::mem::take(&mut current), font, metrics.size);
                        flush(&mut word, &mut tokens);
                    } else {
                        current.push(c);
                    }
                }
                word.push_piece(current, font, metrics.size);
            }
        }
    }
    flush(&mut word, &mut tokens);
    tokens
}

/// Ligne de texte posée
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub words: Vec<Word>,
    /// Largeur naturelle (espaces simples)
    pub width: f32,
    /// Dernière ligne du paragraphe ou suivie d'un retour forcé (non justifiée)
    pub last: bool,
}

fn space_width(metrics: &TextMetrics) -> f32 {
    Font::select(metrics.family, metrics.base_style).text_width(" ", metrics.size)
}

/// Coupe un contenu en lignes de largeur `max_width` au plus
///
/// Un mot plus large que la ligne occupe seul sa ligne.
pub fn break_lines(content: &[Inline], metrics: &TextMetrics, max_width: f32) -> Vec<Line> {
    let space = space_width(metrics);
    let mut lines = Vec::new();
    let mut words: Vec<Word> = Vec::new();
    let mut width = 0.0;

    for token in tokenize(content, metrics) {
        match token {
            Token::Break => {
                lines.push(Line {
                    words: std::mem::take(&mut words),
                    width,
                    last: true,
                });
                width = 0.0;
            }
            Token::Word(word) => {
                if words.is_empty() {
                    width = word.width;
                } else if width + space + word.width > max_width + EPSILON {
                    lines.push(Line {
                        words: std::mem::take(&mut words),
                        width,
                        last: false,
                    });
                    width = word.width;
                } else {
                    width += space + word.width;
                }
                words.push(word);
            }
        }
    }

    if !words.is_empty() {
        lines.push(Line {
            words,
            width,
            last: true,
        });
    }
    lines
}

/// Abscisse de départ de chaque mot d'une ligne
pub fn word_positions(line: &Line, metrics: &TextMetrics, x: f32, width: f32) -> Vec<f32> {
    let space = space_width(metrics);
    let n = line.words.len();
    let (start, gap) = match metrics.align {
        Align::Left => (x, space),
        Align::Center => (x + (width - line.width) / 2.0, space),
        Align::Justify if !line.last && n > 1 => {
            (x, space + (width - line.width).max(0.0) / (n - 1) as f32)
        }
        Align::Justify => (x, space),
    };

    let mut positions = Vec::with_capacity(n);
    let mut cursor = start;
    for word in &line.words {
        positions.push(cursor);
        cursor += word.width + gap;
    }
    positions
}

fn draw_line(canvas: &mut Canvas, line: &Line, metrics: &TextMetrics, x: f32, width: f32, top: f32) {
    let baseline = top - (metrics.leading + metrics.size) / 2.0;
    for (word, start) in line.words.iter().zip(word_positions(line, metrics, x, width)) {
        let mut cursor = start;
        for piece in &word.pieces {
            canvas.draw_text(cursor, baseline, piece.font, metrics.size, &piece.text);
            cursor += piece.width;
        }
    }
}

fn text_block(block: &Block) -> Option<(&[Inline], TextMetrics)> {
    match block {
        Block::Paragraph(Paragraph { style, content }) => {
            Some((content.as_slice(), paragraph_metrics(*style)))
        }
        _ => None,
    }
}

/// Hauteur d'un bloc posé sur une largeur donnée (espaces compris)
pub fn measure(block: &Block, width: f32) -> f32 {
    match block {
        Block::Spacer(height) => *height,
        Block::Heading(heading) => {
            let metrics = heading_metrics(heading.level);
            let lines = break_lines(&heading_content(heading), &metrics, width);
            metrics.space_before + lines.len() as f32 * metrics.leading + metrics.space_after
        }
        Block::Paragraph(_) => match text_block(block) {
            Some((content, metrics)) => {
                let lines = break_lines(content, &metrics, width - metrics.indent);
                metrics.space_before + lines.len() as f32 * metrics.leading + metrics.space_after
            }
            None => 0.0,
        },
        Block::Table(table) => (table.rows.len() + 1) as f32 * TABLE_ROW_HEIGHT,
        Block::Image(image) => image.height,
        Block::PageBreak => 0.0,
        Block::KeepTogether(children) => children.iter().map(|b| measure(b, width)).sum(),
    }
}

fn heading_content(heading: &Heading) -> Vec<Inline> {
    vec![Inline::Text {
        text: heading.text.clone(),
        style: TextStyle::Regular,
    }]
}

struct Paginator<'a> {
    setup: &'a PageSetup,
    pages: Vec<Canvas>,
    current: Canvas,
    y: f32,
    /// Rien n'a encore été posé sur la page courante
    fresh: bool,
}

impl<'a> Paginator<'a> {
    fn new(setup: &'a PageSetup) -> Self {
        Self {
            setup,
            pages: Vec::new(),
            current: Canvas::new(),
            y: setup.frame_top(),
            fresh: true,
        }
    }

    fn remaining(&self) -> f32 {
        self.y - self.setup.margin_bottom
    }

    fn new_page(&mut self) {
        self.pages.push(std::mem::take(&mut self.current));
        self.y = self.setup.frame_top();
        self.fresh = true;
    }

    /// Passe à la page suivante si `height` ne tient pas (sauf en haut de page)
    fn ensure_room(&mut self, height: f32) {
        if !self.fresh && height > self.remaining() + EPSILON {
            self.new_page();
        }
    }

    fn finish(mut self) -> Vec<Canvas> {
        // Pas de page vide finale, sauf document vide
        if !self.fresh || self.pages.is_empty() {
            self.pages.push(self.current);
        }
        self.pages
    }

    fn place(&mut self, block: &Block) {
        match block {
            Block::Spacer(height) => {
                if self.fresh {
                    return;
                }
                if *height > self.remaining() + EPSILON {
                    self.new_page();
                } else {
                    self.y -= height;
                }
            }
            Block::Heading(heading) => {
                let metrics = heading_metrics(heading.level);
                self.place_text(&heading_content(heading), &metrics, false);
            }
            Block::Paragraph(_) => {
                if let Some((content, metrics)) = text_block(block) {
                    self.place_text(content, &metrics, true);
                }
            }
            Block::Table(table) => self.place_table(table),
            Block::Image(image) => self.place_image(image),
            Block::PageBreak => self.new_page(),
            Block::KeepTogether(children) => {
                let width = self.setup.frame_width();
                let height: f32 = children.iter().map(|b| measure(b, width)).sum();
                if height <= self.setup.frame_height() + EPSILON {
                    self.ensure_room(height);
                }
                for child in children {
                    self.place(child);
                }
            }
        }
    }

    /// Pose un texte ; `splittable` autorise la coupure entre deux lignes
    fn place_text(&mut self, content: &[Inline], metrics: &TextMetrics, splittable: bool) {
        let x = self.setup.margin_left + metrics.indent;
        let width = self.setup.frame_width() - metrics.indent;
        let lines = break_lines(content, metrics, width);
        if lines.is_empty() {
            return;
        }

        let first_height = if splittable {
            metrics.leading
        } else {
            lines.len() as f32 * metrics.leading
        };
        if !self.fresh {
            if metrics.space_before + first_height > self.remaining() + EPSILON {
                self.new_page();
            } else {
                self.y -= metrics.space_before;
            }
        }

        self.current.set_fill_color(metrics.color);
        for line in &lines {
            if splittable && !self.fresh && metrics.leading > self.remaining() + EPSILON {
                self.new_page();
                self.current.set_fill_color(metrics.color);
            }
            draw_line(&mut self.current, line, metrics, x, width, self.y);
            self.y -= metrics.leading;
            self.fresh = false;
        }
        self.y -= metrics.space_after;
    }

    fn place_image(&mut self, image: &ImageBlock) {
        self.ensure_room(image.height);
        let x = self.setup.margin_left + (self.setup.frame_width() - image.width) / 2.0;
        self.current
            .draw_image(&image.image, x, self.y - image.height, image.width, image.height);
        self.y -= image.height;
        self.fresh = false;
    }

    fn place_table(&mut self, table: &Table) {
        let x = self.setup.margin_left + ((self.setup.frame_width() - table.width()) / 2.0).max(0.0);
        let whole = (table.rows.len() + 1) as f32 * TABLE_ROW_HEIGHT;
        if whole <= self.setup.frame_height() + EPSILON {
            self.ensure_room(whole);
        }

        let mut rows = table.rows.as_slice();
        loop {
            // En-tête + au moins une ligne
            self.ensure_room(2.0 * TABLE_ROW_HEIGHT);
            let capacity = ((self.remaining() + EPSILON) / TABLE_ROW_HEIGHT).floor() as usize;
            let take = capacity.saturating_sub(1).max(1).min(rows.len());
            let (chunk, rest) = rows.split_at(take);
            self.draw_table_chunk(table, chunk, x);
            rows = rest;
            if rows.is_empty() {
                break;
            }
            self.new_page();
        }
    }

    fn draw_table_chunk(&mut self, table: &Table, rows: &[Vec<String>], x: f32) {
        let canvas = &mut self.current;
        let top = self.y;
        let width = table.width();
        let height = (rows.len() + 1) as f32 * TABLE_ROW_HEIGHT;

        canvas.set_fill_color(Color::LIGHT_GRAY);
        canvas.fill_rect(x, top - TABLE_ROW_HEIGHT, width, TABLE_ROW_HEIGHT);

        canvas.set_fill_color(Color::BLACK);
        let all_rows = std::iter::once((Font::HelveticaBold, &table.header))
            .chain(rows.iter().map(|row| (Font::Helvetica, row)));
        for (r, (font, cells)) in all_rows.enumerate() {
            let baseline = top - r as f32 * TABLE_ROW_HEIGHT - TABLE_ROW_HEIGHT / 2.0
                - TABLE_FONT_SIZE * 0.35;
            let mut cell_x = x;
            for (cell, cell_width) in cells.iter().zip(&table.column_widths) {
                canvas.draw_centred_text(cell_x + cell_width / 2.0, baseline, font, TABLE_FONT_SIZE, cell);
                cell_x += cell_width;
            }
        }

        canvas.set_stroke_color(Color::BLACK);
        canvas.set_line_width(1.0);
        canvas.stroke_rect(x, top - height, width, height);
        for r in 1..=rows.len() {
            let y = top - r as f32 * TABLE_ROW_HEIGHT;
            canvas.line(x, y, x + width, y);
        }
        let mut cell_x = x;
        for cell_width in table.column_widths.iter().take(table.column_widths.len().saturating_sub(1)) {
            cell_x += cell_width;
            canvas.line(cell_x, top, cell_x, top - height);
        }

        self.y -= height;
        self.fresh = false;
    }
}

/// Répartit les blocs en pages
///
/// Chaque canvas ne contient que le flux ; les décorations (couverture,
/// pied de page) sont ajoutées au rendu.
pub fn paginate(blocks: &[Block], setup: &PageSetup) -> Vec<Canvas> {
    let mut paginator = Paginator::new(setup);
    for block in blocks {
        paginator.place(block);
    }
    paginator.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::Object;

    fn texts(canvas: &Canvas) -> Vec<String> {
        canvas
            .operations()
            .iter()
            .filter(|op| op.operator == "Tj")
            .filter_map(|op| match op.operands.first() {
                Some(Object::String(bytes, _)) => Some(String::from_utf8_lossy(bytes).into_owned()),
                _ => None,
            })
            .collect()
    }

    fn table(rows: usize) -> Table {
        Table {
            header: vec!["Punto".into(), "Este".into()],
            rows: (1..=rows).map(|i| vec![format!("V-{}", i), "1.00".into()]).collect(),
            column_widths: vec![1.5 * CM, 3.5 * CM],
        }
    }

    #[test]
    fn test_square_page() {
        let setup = PageSetup::square_21cm();
        assert!((setup.width - 595.2756).abs() < 1e-3);
        assert!((setup.frame_width() - 18.0 * CM).abs() < 1e-3);
        assert!((setup.frame_height() - 16.5 * CM).abs() < 1e-3);
    }

    #[test]
    fn test_break_lines_wraps_words() {
        let metrics = paragraph_metrics(ParagraphStyle::Body);
        let content = vec![Inline::Text {
            text: "uno dos tres cuatro cinco seis siete ocho nueve diez".into(),
            style: TextStyle::Regular,
        }];
        let lines = break_lines(&content, &metrics, 60.0);
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| l.width <= 60.0 + EPSILON));
        assert!(lines.last().unwrap().last);
        assert!(!lines[0].last);
    }

    #[test]
    fn test_line_break_forces_new_line() {
        let metrics = paragraph_metrics(ParagraphStyle::Body);
        let p = Paragraph::body().bold("Elaborado por:").line_break().text("Cartography Hub");
        let lines = break_lines(&p.content, &metrics, 500.0);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].last);
        assert_eq!(lines[1].words[1].text(), "Hub");
    }

    #[test]
    fn test_styles_glue_without_space() {
        let metrics = paragraph_metrics(ParagraphStyle::Body);
        let p = Paragraph::body().bold("Ciudad:").text(" Guayaquil");
        let lines = break_lines(&p.content, &metrics, 500.0);
        assert_eq!(lines[0].words.len(), 2);

        let p = Paragraph::body().text("(").bold("x").text(")");
        let lines = break_lines(&p.content, &metrics, 500.0);
        assert_eq!(lines[0].words.len(), 1);
        assert_eq!(lines[0].words[0].text(), "(x)");
    }

    #[test]
    fn test_justified_line_fills_width() {
        let metrics = paragraph_metrics(ParagraphStyle::Body);
        let content = vec![Inline::Text {
            text: "alfa beta gamma delta epsilon zeta eta theta iota kappa".into(),
            style: TextStyle::Regular,
        }];
        let lines = break_lines(&content, &metrics, 100.0);
        let first = &lines[0];
        let positions = word_positions(first, &metrics, 0.0, 100.0);
        let end = positions.last().unwrap() + first.words.last().unwrap().width();
        assert!((end - 100.0).abs() < 1e-3, "end={}", end);

        let last = lines.last().unwrap();
        let positions = word_positions(last, &metrics, 0.0, 100.0);
        let end = positions.last().unwrap() + last.words.last().unwrap().width();
        assert!((end - last.width).abs() < 1e-3);
    }

    #[test]
    fn test_leading_page_break_leaves_cover_empty() {
        let setup = PageSetup::square_21cm();
        let blocks = vec![Block::PageBreak, Paragraph::body().text("Contenido").into()];
        let pages = paginate(&blocks, &setup);
        assert_eq!(pages.len(), 2);
        assert!(pages[0].is_empty());
        assert_eq!(texts(&pages[1]), ["Contenido"]);
    }

    #[test]
    fn test_keep_together_moves_to_next_page() {
        let setup = PageSetup::square_21cm();
        let filler = setup.frame_height() - 3.0 * TABLE_ROW_HEIGHT;
        let blocks = vec![
            Paragraph::body().text("Inicio").into(),
            Block::Spacer(filler - 20.0),
            Block::KeepTogether(vec![table(4).into()]),
        ];
        let pages = paginate(&blocks, &setup);
        assert_eq!(pages.len(), 2);
        assert_eq!(texts(&pages[0]), ["Inicio"]);
        assert!(texts(&pages[1]).contains(&"V-4".to_string()));
    }

    #[test]
    fn test_long_table_repeats_header() {
        let setup = PageSetup::square_21cm();
        let blocks = vec![Block::KeepTogether(vec![table(60).into()])];
        let pages = paginate(&blocks, &setup);
        assert!(pages.len() >= 3, "pages={}", pages.len());
        for page in &pages {
            assert_eq!(texts(page)[0], "Punto");
        }
        let total: usize = pages
            .iter()
            .map(|p| texts(p).iter().filter(|t| t.starts_with("V-")).count())
            .sum();
        assert_eq!(total, 60);
    }

    #[test]
    fn test_spacer_ignored_at_page_top() {
        let setup = PageSetup::square_21cm();
        let blocks = vec![Block::Spacer(5000.0), Paragraph::body().text("A").into()];
        assert_eq!(paginate(&blocks, &setup).len(), 1);
    }

    #[test]
    fn test_measure_keeps_spaces() {
        let heading = Block::Heading(Heading::new(HeadingLevel::Section, "1. Identificación del Predio"));
        assert!((measure(&heading, 500.0) - (12.0 + 18.0 + 6.0)).abs() < 1e-3);
        assert!((measure(&table(3).into(), 500.0) - 4.0 * TABLE_ROW_HEIGHT).abs() < 1e-3);
    }
}
