//! Couverture et pied de page du rapport

use crate::dossier::content::{CM, INCH};
use crate::dossier::images::EmbeddedImage;
use crate::export::pdf::{Canvas, Color, Font, PageDecoration, PageInfo};

/// Données affichées sur la couverture
#[derive(Debug, Clone, PartialEq)]
pub struct CoverMetadata {
    pub code: String,
    /// Date déjà mise en forme
    pub date: String,
    pub organization: String,
    pub logo: Option<EmbeddedImage>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FooterMetadata {
    /// Texte en bas à gauche ("Informe Confidencial - ...")
    pub confidentiality: String,
}

/// Décorations du rapport : couverture en page 1, pied de page ensuite
#[derive(Debug, Clone, PartialEq)]
pub struct DossierDecoration {
    pub cover: CoverMetadata,
    pub footer: FooterMetadata,
}

impl PageDecoration for DossierDecoration {
    fn first_page(&self, canvas: &mut Canvas, page: &PageInfo) {
        draw_cover(canvas, &self.cover, page);
    }

    fn later_pages(&self, canvas: &mut Canvas, page: &PageInfo) {
        draw_footer(canvas, &self.footer, page);
    }
}

pub fn draw_cover(canvas: &mut Canvas, cover: &CoverMetadata, page: &PageInfo) {
    let width = page.setup.width;
    let height = page.setup.height;
    let margin = 2.0 * CM;
    let center = width / 2.0;

    canvas.save_state();

    // Double cadre
    canvas.set_stroke_color(Color::NAVY);
    canvas.set_line_width(3.0);
    canvas.stroke_rect(margin, margin, width - 2.0 * margin, height - 2.0 * margin);
    canvas.set_line_width(1.0);
    let inner = margin + 0.2 * CM;
    canvas.stroke_rect(inner, inner, width - 2.0 * inner, height - 2.0 * inner);

    canvas.set_fill_color(Color::NAVY);
    canvas.draw_centred_text(center, height * 0.65, Font::HelveticaBold, 24.0, "FICHA TÉCNICA CATASTRAL");
    canvas.draw_centred_text(
        center,
        height * 0.60,
        Font::Helvetica,
        16.0,
        "Informe Geométrico y Documental de Predio Urbano",
    );

    canvas.set_stroke_color(Color::GRAY);
    canvas.line(width * 0.3, height * 0.55, width * 0.7, height * 0.55);

    canvas.draw_centred_text(
        center,
        height * 0.45,
        Font::HelveticaOblique,
        12.0,
        "Referente al Predio con Código Catastral:",
    );
    canvas.set_fill_color(Color::BLACK);
    canvas.draw_centred_text(center, height * 0.40, Font::HelveticaBold, 20.0, &cover.code);

    canvas.draw_centred_text(center, margin + 2.0 * CM, Font::Helvetica, 12.0, "Elaborado por:");
    canvas.set_fill_color(Color::NAVY);
    canvas.draw_centred_text(center, margin + 1.5 * CM, Font::HelveticaBold, 14.0, &cover.organization);
    canvas.set_fill_color(Color::GRAY);
    canvas.draw_centred_text(center, margin + 0.5 * CM, Font::Helvetica, 10.0, &cover.date);

    if let Some(logo) = &cover.logo {
        let (logo_width, logo_height) = (4.0 * CM, 2.0 * CM);
        canvas.draw_image(
            logo,
            center - logo_width / 2.0,
            height - margin - logo_height - 0.5 * CM,
            logo_width,
            logo_height,
        );
    }

    canvas.restore_state();
}

pub fn draw_footer(canvas: &mut Canvas, footer: &FooterMetadata, page: &PageInfo) {
    let y = 0.75 * INCH;

    canvas.save_state();
    canvas.set_fill_color(Color::BLACK);
    canvas.draw_right_text(
        page.setup.width - 0.75 * INCH,
        y,
        Font::Helvetica,
        9.0,
        &format!("Página {}", page.number),
    );
    canvas.draw_text(0.75 * INCH, y, Font::Helvetica, 9.0, &footer.confidentiality);
    canvas.restore_state();
}
