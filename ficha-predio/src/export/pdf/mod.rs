//! Rendu PDF du flux de blocs avec lopdf
//!
//! Polices standard Type1 (non intégrées), images JPEG en XObject
//! (DCTDecode), un flux de contenu par page. La première page reçoit la
//! décoration de couverture, les suivantes le pied de page.

pub mod canvas;
pub mod fonts;
pub mod layout;

pub use canvas::{Canvas, Color};
pub use fonts::Font;
pub use layout::{paginate, PageSetup};

use std::collections::BTreeMap;
use std::path::Path;

use chrono::NaiveDateTime;
use lopdf::content::Content;
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use thiserror::Error;
use tracing::{debug, warn};

use crate::dossier::content::Block;
use crate::dossier::images::EmbeddedImage;

/// Erreurs de rendu ou d'écriture du PDF
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("PDF encoding failed: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("Cannot write PDF file: {0}")]
    Io(#[from] std::io::Error),
}

/// Page en cours de décoration
#[derive(Debug, Clone, Copy)]
pub struct PageInfo {
    /// Numéro de page, à partir de 1
    pub number: usize,
    pub setup: PageSetup,
}

/// Dessin hors flux : couverture (page 1) et pages suivantes
pub trait PageDecoration {
    fn first_page(&self, canvas: &mut Canvas, page: &PageInfo);
    fn later_pages(&self, canvas: &mut Canvas, page: &PageInfo);
}

/// Métadonnées du dictionnaire /Info
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentInfo {
    pub title: String,
    pub author: String,
    pub subject: String,
    pub creator: String,
    pub creation_date: NaiveDateTime,
}

impl DocumentInfo {
    fn to_dictionary(&self) -> Dictionary {
        dictionary! {
            "Title" => text_string(&self.title),
            "Author" => text_string(&self.author),
            "Subject" => text_string(&self.subject),
            "Creator" => text_string(&self.creator),
            "Producer" => text_string(concat!("ficha-predio ", env!("CARGO_PKG_VERSION"))),
            "CreationDate" => Object::String(
                self.creation_date.format("D:%Y%m%d%H%M%S").to_string().into_bytes(),
                StringFormat::Literal,
            ),
        }
    }
}

/// Chaîne texte PDF en UTF-16BE avec BOM
fn text_string(text: &str) -> Object {
    let mut bytes = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

fn font_resources() -> Dictionary {
    let mut fonts = Dictionary::new();
    for font in Font::ALL {
        fonts.set(
            font.resource_name(),
            dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => font.base_font(),
                "Encoding" => "WinAnsiEncoding",
            },
        );
    }
    fonts
}

fn image_stream(image: &EmbeddedImage) -> Stream {
    Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => image.width_px as i64,
            "Height" => image.height_px as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "Filter" => "DCTDecode",
        },
        image.data.as_ref().clone(),
    )
    .with_compression(false)
}

/// Construit le document PDF en mémoire
pub fn render(
    blocks: &[Block],
    setup: &PageSetup,
    decoration: &dyn PageDecoration,
    info: &DocumentInfo,
) -> Result<Document, RenderError> {
    let pages = paginate(blocks, setup);

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let fonts_id = doc.add_object(font_resources());
    let mut xobjects: BTreeMap<String, ObjectId> = BTreeMap::new();
    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());

    for (index, content) in pages.into_iter().enumerate() {
        let page = PageInfo {
            number: index + 1,
            setup: *setup,
        };

        let mut canvas = Canvas::new();
        if index == 0 {
            decoration.first_page(&mut canvas, &page);
        } else {
            decoration.later_pages(&mut canvas, &page);
        }
        canvas.append(content);
        let (operations, images) = canvas.into_parts();

        let mut page_xobjects = Dictionary::new();
        for image in &images {
            let id = match xobjects.get(&image.name) {
                Some(id) => *id,
                None => {
                    let id = doc.add_object(image_stream(image));
                    xobjects.insert(image.name.clone(), id);
                    id
                }
            };
            page_xobjects.set(image.name.as_str(), id);
        }

        let content_id = doc.add_object(Stream::new(
            Dictionary::new(),
            Content { operations }.encode()?,
        ));

        let mut resources = dictionary! { "Font" => fonts_id };
        if !images.is_empty() {
            resources.set("XObject", page_xobjects);
        }

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                setup.width.into(),
                setup.height.into(),
            ],
            "Contents" => content_id,
            "Resources" => resources,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    let info_id = doc.add_object(info.to_dictionary());
    doc.trailer.set("Info", info_id);

    doc.compress();
    debug!(pages = count, images = xobjects.len(), "PDF document rendered");
    Ok(doc)
}

/// Rend et écrit le PDF ; retourne le nombre de pages
///
/// En cas d'échec d'écriture, le fichier partiel est supprimé.
pub fn write_pdf(
    path: &Path,
    blocks: &[Block],
    setup: &PageSetup,
    decoration: &dyn PageDecoration,
    info: &DocumentInfo,
) -> Result<usize, RenderError> {
    let mut doc = render(blocks, setup, decoration, info)?;
    let pages = doc.get_pages().len();

    if let Err(e) = doc.save(path) {
        if path.exists() {
            if let Err(remove_err) = std::fs::remove_file(path) {
                warn!(path = %path.display(), error = %remove_err, "Cannot remove partial PDF");
            }
        }
        return Err(e.into());
    }
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dossier::content::Paragraph;

    struct Frame;

    impl PageDecoration for Frame {
        fn first_page(&self, canvas: &mut Canvas, page: &PageInfo) {
            canvas.stroke_rect(10.0, 10.0, page.setup.width - 20.0, page.setup.height - 20.0);
        }

        fn later_pages(&self, canvas: &mut Canvas, page: &PageInfo) {
            canvas.draw_text(10.0, 10.0, Font::Helvetica, 9.0, &format!("Página {}", page.number));
        }
    }

    fn info() -> DocumentInfo {
        DocumentInfo {
            title: "Informe Técnico".into(),
            author: "Cartography Hub".into(),
            subject: "A1".into(),
            creator: "ficha-predio".into(),
            creation_date: chrono::NaiveDate::from_ymd_opt(2025, 7, 14)
                .unwrap()
                .and_hms_opt(10, 30, 0)
                .unwrap(),
        }
    }

    #[test]
    fn test_render_pages_and_info() {
        let blocks = vec![Block::PageBreak, Paragraph::body().text("Hola").into()];
        let doc = render(&blocks, &PageSetup::square_21cm(), &Frame, &info()).unwrap();
        assert_eq!(doc.get_pages().len(), 2);

        let info_ref = doc.trailer.get(b"Info").unwrap().as_reference().unwrap();
        let dict = doc.get_dictionary(info_ref).unwrap();
        match dict.get(b"CreationDate").unwrap() {
            Object::String(bytes, _) => assert_eq!(bytes.as_slice(), b"D:20250714103000"),
            other => panic!("Expected string, got {:?}", other),
        }
    }

    #[test]
    fn test_text_string_is_utf16() {
        match text_string("Á") {
            Object::String(bytes, StringFormat::Hexadecimal) => {
                assert_eq!(bytes, vec![0xFE, 0xFF, 0x00, 0xC1])
            }
            other => panic!("Unexpected object {:?}", other),
        }
    }

    #[test]
    fn test_write_pdf_to_file() {
        let path = std::env::temp_dir().join("ficha_pdf_writer_test.pdf");
        let blocks = vec![Paragraph::body().text("Hola").into()];
        let pages = write_pdf(&path, &blocks, &PageSetup::square_21cm(), &Frame, &info()).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(pages, 1);
        assert!(bytes.starts_with(b"%PDF-1.5"));
    }

    #[test]
    fn test_write_pdf_into_missing_directory_fails() {
        let path = std::env::temp_dir().join("ficha_no_such_dir").join("out.pdf");
        let blocks = vec![Paragraph::body().text("Hola").into()];
        let result = write_pdf(&path, &blocks, &PageSetup::square_21cm(), &Frame, &info());
        assert!(result.is_err());
        assert!(!path.exists());
    }
}
