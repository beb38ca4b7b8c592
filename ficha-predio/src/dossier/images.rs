//! Chargement des images optionnelles (logo, plan)
//!
//! Les images sont décodées avec `image`, aplaties sur fond blanc si elles ont
//! un canal alpha, puis réencodées en JPEG pour être intégrées telles quelles
//! (filtre DCTDecode).

use std::path::Path;
use std::sync::Arc;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ExtendedColorType, Rgb, RgbImage};
use tracing::debug;

/// Qualité JPEG des images intégrées
const JPEG_QUALITY: u8 = 90;

/// Image prête à être intégrée au PDF
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedImage {
    /// Nom de ressource (XObject), unique par image
    pub name: String,
    /// Flux JPEG
    pub data: Arc<Vec<u8>>,
    pub width_px: u32,
    pub height_px: u32,
}

impl EmbeddedImage {
    /// Rapport hauteur / largeur
    pub fn aspect_ratio(&self) -> f32 {
        self.height_px as f32 / self.width_px.max(1) as f32
    }
}

/// Résultat du chargement d'une image optionnelle
#[derive(Debug, Clone, PartialEq)]
pub enum ImageLoad {
    Loaded(EmbeddedImage),
    /// Aucun chemin, ou fichier inexistant
    Absent,
    /// Fichier présent mais illisible
    Failed(String),
}

/// Charge une image optionnelle
pub fn load_image(path: Option<&Path>, name: &str) -> ImageLoad {
    let Some(path) = path else {
        return ImageLoad::Absent;
    };
    if !path.exists() {
        debug!(path = %path.display(), "Image not found, omitted");
        return ImageLoad::Absent;
    }

    match image::open(path) {
        Ok(img) => match encode_jpeg(&img) {
            Ok(data) => {
                debug!(path = %path.display(), width = img.width(), height = img.height(), "Image loaded");
                ImageLoad::Loaded(EmbeddedImage {
                    name: name.to_string(),
                    data: Arc::new(data),
                    width_px: img.width(),
                    height_px: img.height(),
                })
            }
            Err(e) => ImageLoad::Failed(format!("{}: {}", path.display(), e)),
        },
        Err(e) => ImageLoad::Failed(format!("{}: {}", path.display(), e)),
    }
}

fn encode_jpeg(img: &DynamicImage) -> image::ImageResult<Vec<u8>> {
    let rgb = flatten_on_white(img);
    let mut data = Vec::new();
    JpegEncoder::new_with_quality(&mut data, JPEG_QUALITY).encode(
        rgb.as_raw(),
        rgb.width(),
        rgb.height(),
        ExtendedColorType::Rgb8,
    )?;
    Ok(data)
}

/// Supprime la transparence en composant l'image sur du blanc
fn flatten_on_white(img: &DynamicImage) -> RgbImage {
    if !img.color().has_alpha() {
        return img.to_rgb8();
    }

    let rgba = img.to_rgba8();
    let mut rgb = RgbImage::new(rgba.width(), rgba.height());
    for (x, y, pixel) in rgba.enumerate_pixels() {
        let alpha = pixel[3] as f32 / 255.0;
        let blend = |c: u8| (c as f32 * alpha + 255.0 * (1.0 - alpha)).round() as u8;
        rgb.put_pixel(x, y, Rgb([blend(pixel[0]), blend(pixel[1]), blend(pixel[2])]));
    }
    rgb
}

/// Dimensions d'affichage (points) à la largeur voulue, ratio conservé
///
/// Réduit encore l'image si sa hauteur dépasse `max_height`.
pub fn fit_to_width(image: &EmbeddedImage, width: f32, max_height: f32) -> (f32, f32) {
    let height = width * image.aspect_ratio();
    if height > max_height && height > 0.0 {
        let scale = max_height / height;
        (width * scale, max_height)
    } else {
        (width, height)
    }
}
