//! Surface de dessin d'une page : opérateurs du flux de contenu PDF

use lopdf::content::Operation;
use lopdf::{Object, StringFormat};

use super::fonts::{encode_win_ansi, Font};
use crate::dossier::images::EmbeddedImage;

/// Couleur RGB (composantes 0 à 1)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const NAVY: Color = Color::rgb(0.0, 0.0, 0.502);
    pub const GRAY: Color = Color::rgb(0.502, 0.502, 0.502);
    /// Fond des en-têtes de tableau
    pub const LIGHT_GRAY: Color = Color::rgb(0.9, 0.9, 0.9);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    fn operands(self) -> Vec<Object> {
        vec![self.r.into(), self.g.into(), self.b.into()]
    }
}

/// Opérations d'une page et images référencées
#[derive(Debug, Default)]
pub struct Canvas {
    operations: Vec<Operation>,
    images: Vec<EmbeddedImage>,
}

impl Canvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Images utilisées, sans doublon de nom
    pub fn images(&self) -> &[EmbeddedImage] {
        &self.images
    }

    pub fn into_parts(self) -> (Vec<Operation>, Vec<EmbeddedImage>) {
        (self.operations, self.images)
    }

    /// Ajoute le contenu d'un autre canvas à la suite
    pub fn append(&mut self, other: Canvas) {
        let (operations, images) = other.into_parts();
        self.operations.extend(operations);
        for image in images {
            self.register_image(image);
        }
    }

    fn push(&mut self, operator: &str, operands: Vec<Object>) {
        self.operations.push(Operation::new(operator, operands));
    }

    pub fn save_state(&mut self) {
        self.push("q", vec![]);
    }

    pub fn restore_state(&mut self) {
        self.push("Q", vec![]);
    }

    pub fn set_stroke_color(&mut self, color: Color) {
        self.push("RG", color.operands());
    }

    pub fn set_fill_color(&mut self, color: Color) {
        self.push("rg", color.operands());
    }

    pub fn set_line_width(&mut self, width: f32) {
        self.push("w", vec![width.into()]);
    }

    pub fn stroke_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.push("re", vec![x.into(), y.into(), width.into(), height.into()]);
        self.push("S", vec![]);
    }

    pub fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.push("re", vec![x.into(), y.into(), width.into(), height.into()]);
        self.push("f", vec![]);
    }

    pub fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) {
        self.push("m", vec![x1.into(), y1.into()]);
        self.push("l", vec![x2.into(), y2.into()]);
        self.push("S", vec![]);
    }

    /// Texte dont la ligne de base commence en (x, y)
    pub fn draw_text(&mut self, x: f32, y: f32, font: Font, size: f32, text: &str) {
        if text.is_empty() {
            return;
        }
        self.push("BT", vec![]);
        self.push(
            "Tf",
            vec![Object::Name(font.resource_name().as_bytes().to_vec()), size.into()],
        );
        self.push("Td", vec![x.into(), y.into()]);
        self.push(
            "Tj",
            vec![Object::String(encode_win_ansi(text), StringFormat::Hexadecimal)],
        );
        self.push("ET", vec![]);
    }

    pub fn draw_centred_text(&mut self, center_x: f32, y: f32, font: Font, size: f32, text: &str) {
        let width = font.text_width(text, size);
        self.draw_text(center_x - width / 2.0, y, font, size, text);
    }

    pub fn draw_right_text(&mut self, right_x: f32, y: f32, font: Font, size: f32, text: &str) {
        let width = font.text_width(text, size);
        self.draw_text(right_x - width, y, font, size, text);
    }

    /// Image dans le rectangle (x, y, largeur, hauteur), coin bas gauche
    pub fn draw_image(&mut self, image: &EmbeddedImage, x: f32, y: f32, width: f32, height: f32) {
        self.save_state();
        self.push(
            "cm",
            vec![
                width.into(),
                Object::Integer(0),
                Object::Integer(0),
                height.into(),
                x.into(),
                y.into(),
            ],
        );
        self.push("Do", vec![Object::Name(image.name.as_bytes().to_vec())]);
        self.restore_state();
        self.register_image(image.clone());
    }

    fn register_image(&mut self, image: EmbeddedImage) {
        if !self.images.iter().any(|i| i.name == image.name) {
            self.images.push(image);
        }
    }
}
