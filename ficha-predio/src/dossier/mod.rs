//! Assemblage du rapport : attributs et cuadro de coordenadas vers blocs
//!
//! Le flux commence par un saut de page : la page 1 est entièrement dessinée
//! par la décoration de couverture. Le contenu suit en sept sections.
//! Les échecs du cuadro de coordenadas deviennent une mention dans le texte,
//! les images absentes sont simplement omises.

pub mod content;
pub mod decoration;
pub mod format;
pub mod images;

use catastro::{Crs, ParcelAttributes, Side};

use crate::export::pdf::PageSetup;
use crate::projector::{ProjectedParcel, ProjectionError};
use content::{Block, Heading, HeadingLevel, ImageBlock, Paragraph, ParagraphStyle, Table, CM};
use format::legal_amount;
use images::{fit_to_width, EmbeddedImage};

/// Libellés des colonnes du cuadro de coordenadas
pub const COORDINATE_HEADER: [&str; 5] = [
    "Punto",
    "Este (UTM)",
    "Norte (UTM)",
    "Longitud (°)",
    "Latitud (°)",
];

/// Largeurs des colonnes (cm)
const COORDINATE_WIDTHS_CM: [f32; 5] = [1.5, 3.5, 3.5, 3.5, 3.5];

/// Part de la largeur utile occupée par le plan
const MAP_WIDTH_RATIO: f32 = 0.95;

/// Tout ce qu'il faut pour écrire le corps du rapport
#[derive(Debug, Clone, Copy)]
pub struct DossierInput<'a> {
    pub attributes: &'a ParcelAttributes,
    /// Date déjà mise en forme
    pub date: &'a str,
    pub city: &'a str,
    pub author: &'a str,
    pub coordinates: &'a Result<ProjectedParcel, ProjectionError>,
    /// CRS du jeu de données source
    pub source_crs: Option<&'a Crs>,
    pub logo: Option<&'a EmbeddedImage>,
    pub map: Option<&'a EmbeddedImage>,
}

/// Construit la suite de blocs du rapport
pub fn assemble(input: &DossierInput<'_>, setup: &PageSetup) -> Vec<Block> {
    let attrs = input.attributes;
    let mut blocks = vec![Block::PageBreak];

    // En-tête
    if let Some(logo) = input.logo {
        blocks.push(Block::Image(ImageBlock {
            image: logo.clone(),
            width: 4.0 * CM,
            height: 2.0 * CM,
        }));
        blocks.push(Block::Spacer(0.5 * CM));
    }
    blocks.push(Heading::new(HeadingLevel::Title, "INFORME TÉCNICO DE PREDIO URBANO").into());
    blocks.push(Block::Spacer(0.5 * CM));
    blocks.push(labelled("Ciudad:", input.city));
    blocks.push(labelled("Fecha:", input.date));
    blocks.push(labelled("Código Catastral:", &attrs.code));
    blocks.push(Block::Spacer(0.7 * CM));

    section(&mut blocks, "1. Identificación del Predio");
    blocks.push(labelled("Código Catastral:", &attrs.code));
    blocks.push(labelled("Ubicación:", &format!("Frente a la Calle {}", attrs.street)));
    blocks.push(Block::Spacer(0.3 * CM));

    section(&mut blocks, "2. Características Generales");
    blocks.push(labelled("Uso Principal:", &attrs.land_use));
    blocks.push(labelled("Área según Escritura:", &area_text(attrs.deed_area)));
    blocks.push(Block::Spacer(0.3 * CM));

    section(&mut blocks, "3. Linderos y Dimensiones");
    blocks.push(
        Paragraph::body()
            .text("Se detallan los colindantes y las longitudes aproximadas de cada lindero:")
            .into(),
    );
    blocks.push(Block::Spacer(0.2 * CM));
    for boundary in &attrs.boundaries {
        blocks.push(
            Heading::new(
                HeadingLevel::Subsection,
                format!("Lindero {}:", side_name(boundary.side)),
            )
            .into(),
        );
        blocks.push(list_item(format!("Colinda con: {}", boundary.neighbour)));
        blocks.push(list_item(format!("Longitud: {:.2} metros", boundary.length)));
    }
    blocks.push(Block::Spacer(0.3 * CM));

    section(&mut blocks, "4. Cuadro de Coordenadas");
    blocks.push(
        Paragraph::body()
            .text(
                "A continuación se presentan las coordenadas de los vértices del predio. \
                 Las coordenadas geográficas (Latitud/Longitud) corresponden al sistema de \
                 origen de los datos, y las coordenadas proyectadas (Este/Norte) han sido \
                 calculadas en la zona UTM correspondiente.",
            )
            .into(),
    );
    blocks.push(Block::Spacer(0.5 * CM));
    blocks.extend(coordinate_blocks(input.coordinates));
    blocks.push(Block::Spacer(0.5 * CM));

    section(&mut blocks, "5. Información Geométrica (Calculada)");
    if let Some(map) = input.map {
        blocks.push(map_figure(map, setup));
        blocks.push(Block::Spacer(0.5 * CM));
    }
    blocks.push(labelled("Área Calculada (GIS):", &area_text(attrs.shape_area)));
    blocks.push(labelled(
        "Perímetro Calculado (GIS):",
        &format!("{:.2} metros", attrs.shape_length),
    ));
    blocks.push(
        Paragraph::new(ParagraphStyle::Code)
            .bold("Sistema de Coordenadas de Origen:")
            .text(format!(" {}", crs_description(input.source_crs)))
            .into(),
    );
    blocks.push(Block::Spacer(0.3 * CM));

    section(&mut blocks, "6. Observaciones");
    blocks.push(Paragraph::body().text(discrepancy_note(attrs)).into());
    blocks.push(Block::Spacer(0.3 * CM));

    section(&mut blocks, "7. Fuente de Datos");
    blocks.push(
        Paragraph::body()
            .text(format!(
                "Información extraída del registro con Código Catastral {}.",
                attrs.code
            ))
            .into(),
    );
    blocks.push(Block::Spacer(0.5 * CM));
    blocks.push(
        Paragraph::body()
            .bold("Elaborado por:")
            .line_break()
            .text(input.author)
            .into(),
    );

    blocks
}

/// Blocs du cuadro de coordenadas, ou mention d'échec
pub fn coordinate_blocks(coordinates: &Result<ProjectedParcel, ProjectionError>) -> Vec<Block> {
    let parcel = match coordinates {
        Ok(parcel) => parcel,
        Err(e) => return vec![failure_notice(e)],
    };

    if let Some(warning) = &parcel.warning {
        return vec![Paragraph::body().text(warning.clone()).into()];
    }
    if parcel.rows.is_empty() {
        return vec![failure_notice(&ProjectionError::EmptyGeometry)];
    }

    let table = Table {
        header: COORDINATE_HEADER.iter().map(|h| h.to_string()).collect(),
        rows: parcel
            .rows
            .iter()
            .map(|row| {
                vec![
                    row.label(),
                    format!("{:.2}", row.easting),
                    format!("{:.2}", row.northing),
                    format!("{:.6}", row.lon),
                    format!("{:.6}", row.lat),
                ]
            })
            .collect(),
        column_widths: COORDINATE_WIDTHS_CM.iter().map(|w| w * CM).collect(),
    };

    vec![
        Block::KeepTogether(vec![table.into()]),
        Block::Spacer(0.2 * CM),
        Paragraph::new(ParagraphStyle::Note)
            .bold("Nota:")
            .text(" Las coordenadas UTM fueron calculadas en el sistema ")
            .bold(format!("{} (EPSG:{})", parcel.target.name, parcel.target.epsg))
            .text(".")
            .into(),
    ]
}

fn failure_notice(error: &ProjectionError) -> Block {
    Paragraph::new(ParagraphStyle::Caption)
        .italic(format!(
            "No se pudo generar el cuadro de coordenadas. Error: {}",
            error
        ))
        .into()
}

/// "<nom> (EPSG:<code>)", ou "No definido"
pub fn crs_description(crs: Option<&Crs>) -> String {
    crs.map(Crs::to_string)
        .unwrap_or_else(|| "No definido".to_string())
}

/// Écart surface acte / surface SIG, émis même à surfaces égales
pub fn discrepancy_note(attrs: &ParcelAttributes) -> String {
    format!(
        "Se constata una diferencia entre el área registrada en la escritura ({:.2} m²) \
         y el área calculada ({:.2} m²). Esta discrepancia puede deberse a métodos de \
         medición históricos o actualizaciones catastrales. Se recomienda una verificación.",
        attrs.deed_area, attrs.shape_area
    )
}

fn area_text(area: f64) -> String {
    format!("{:.2} m² ({} metros cuadrados)", area, legal_amount(area))
}

fn side_name(side: Side) -> &'static str {
    match side {
        Side::North => "Norte",
        Side::South => "Sur",
        Side::East => "Este",
        Side::West => "Oeste",
    }
}

fn section(blocks: &mut Vec<Block>, title: &str) {
    blocks.push(Heading::new(HeadingLevel::Section, title).into());
}

fn labelled(label: &str, value: &str) -> Block {
    Paragraph::body()
        .bold(label)
        .text(format!(" {}", value))
        .into()
}

fn list_item(text: String) -> Block {
    Paragraph::new(ParagraphStyle::ListItem).text(text).into()
}

/// Plan centré avec sa légende, insécables
fn map_figure(map: &EmbeddedImage, setup: &PageSetup) -> Block {
    let caption_room = 0.7 * CM + 14.0;
    let (width, height) = fit_to_width(
        map,
        setup.frame_width() * MAP_WIDTH_RATIO,
        setup.frame_height() - caption_room,
    );
    Block::KeepTogether(vec![
        Block::Spacer(0.5 * CM),
        Block::Image(ImageBlock {
            image: map.clone(),
            width,
            height,
        }),
        Block::Spacer(0.2 * CM),
        Paragraph::new(ParagraphStyle::Caption)
            .italic("Figura 1: Representación gráfica del predio.")
            .into(),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projector::{CoordinateRow, Hemisphere, UtmZone};
    use catastro::{Boundary, ParcelRecord, Schema};
    use std::sync::Arc;

    fn attributes() -> ParcelAttributes {
        let mut attrs = Schema::default().extract(&ParcelRecord::default());
        attrs.code = "A1".into();
        attrs.deed_area = 250.0;
        attrs.shape_area = 248.756;
        attrs.boundaries[0] = Boundary {
            side: Side::North,
            neighbour: "Predio 09-01-002".into(),
            length: 12.5,
        };
        attrs
    }

    fn parcel() -> ProjectedParcel {
        let zone = UtmZone {
            number: 17,
            hemisphere: Hemisphere::South,
        };
        ProjectedParcel {
            zone,
            target: zone.crs(),
            rows: vec![CoordinateRow {
                index: 1,
                easting: 622320.384,
                northing: 9756787.616,
                lon: -79.9,
                lat: -2.2,
            }],
            warning: None,
        }
    }

    fn input<'a>(
        attrs: &'a ParcelAttributes,
        coordinates: &'a Result<ProjectedParcel, ProjectionError>,
        crs: Option<&'a Crs>,
    ) -> DossierInput<'a> {
        DossierInput {
            attributes: attrs,
            date: "14 de Julio de 2025",
            city: "Guayaquil",
            author: "Cartography Hub",
            coordinates,
            source_crs: crs,
            logo: None,
            map: None,
        }
    }

    fn paragraphs(blocks: &[Block]) -> Vec<String> {
        blocks
            .iter()
            .filter_map(|b| match b {
                Block::Paragraph(p) => Some(p.plain_text()),
                _ => None,
            })
            .collect()
    }

    fn headings(blocks: &[Block]) -> Vec<String> {
        blocks
            .iter()
            .filter_map(|b| match b {
                Block::Heading(h) => Some(h.text.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_document_skeleton() {
        let attrs = attributes();
        let coordinates = Ok(parcel());
        let wgs84 = Crs::wgs84();
        let blocks = assemble(&input(&attrs, &coordinates, Some(&wgs84)), &PageSetup::square_21cm());

        assert_eq!(blocks[0], Block::PageBreak);
        let headings = headings(&blocks);
        assert_eq!(headings[0], "INFORME TÉCNICO DE PREDIO URBANO");
        assert!(headings.contains(&"1. Identificación del Predio".to_string()));
        assert!(headings.contains(&"Lindero Oeste:".to_string()));
        assert_eq!(headings.last().unwrap(), "7. Fuente de Datos");

        let text = paragraphs(&blocks);
        assert!(text.contains(&"Ciudad: Guayaquil".to_string()));
        assert!(text.contains(&"Área según Escritura: 250.00 m² (250 con 00/100 metros cuadrados)".to_string()));
        assert!(text.contains(&"Área Calculada (GIS): 248.76 m² (248 con 76/100 metros cuadrados)".to_string()));
        assert!(text.contains(&"Colinda con: Predio 09-01-002".to_string()));
        assert!(text.contains(&"Longitud: 12.50 metros".to_string()));
        assert!(text.contains(&"Sistema de Coordenadas de Origen: WGS 84 (EPSG:4326)".to_string()));
        assert_eq!(text.last().unwrap(), "Elaborado por:\nCartography Hub");
    }

    #[test]
    fn test_coordinate_table() {
        let blocks = coordinate_blocks(&Ok(parcel()));
        let Block::KeepTogether(group) = &blocks[0] else {
            panic!("Expected a kept-together table, got {:?}", blocks[0]);
        };
        let Block::Table(table) = &group[0] else {
            panic!("Expected a table");
        };
        assert_eq!(table.header[0], "Punto");
        assert_eq!(
            table.rows[0],
            vec!["V-1", "622320.38", "9756787.62", "-79.900000", "-2.200000"]
        );
        assert!((table.width() - 15.5 * CM).abs() < 1e-3);

        let note = paragraphs(&blocks);
        assert_eq!(
            note[0],
            "Nota: Las coordenadas UTM fueron calculadas en el sistema WGS 84 / UTM zone 17S (EPSG:32717)."
        );
    }

    #[test]
    fn test_no_rows_gives_failure_notice() {
        let mut empty = parcel();
        empty.rows.clear();
        let blocks = coordinate_blocks(&Ok(empty));
        assert_eq!(blocks.len(), 1);
        assert_eq!(
            paragraphs(&blocks)[0],
            "No se pudo generar el cuadro de coordenadas. Error: La geometría del predio está vacía."
        );
    }

    #[test]
    fn test_coordinate_failure_notice() {
        let blocks = coordinate_blocks(&Err(ProjectionError::MissingCrs));
        assert_eq!(blocks.len(), 1);
        let text = paragraphs(&blocks);
        assert!(text[0].starts_with("No se pudo generar el cuadro de coordenadas. Error: El conjunto"));
    }

    #[test]
    fn test_unsupported_geometry_warning() {
        let mut parcel = parcel();
        parcel.rows.clear();
        parcel.warning = Some("Advertencia: Tipo de geometría no soportado (Point).".into());
        let blocks = coordinate_blocks(&Ok(parcel));
        assert_eq!(paragraphs(&blocks), vec!["Advertencia: Tipo de geometría no soportado (Point)."]);
    }

    #[test]
    fn test_discrepancy_note_with_equal_areas() {
        let mut attrs = attributes();
        attrs.shape_area = attrs.deed_area;
        let note = discrepancy_note(&attrs);
        assert!(note.contains("(250.00 m²) y el área calculada (250.00 m²)"));
    }

    #[test]
    fn test_crs_description() {
        assert_eq!(crs_description(None), "No definido");
        assert_eq!(
            crs_description(Some(&Crs::from_epsg(32717))),
            "WGS 84 / UTM zone 17S (EPSG:32717)"
        );
    }

    #[test]
    fn test_optional_images() {
        let image = EmbeddedImage {
            name: "Map".into(),
            data: Arc::new(vec![0xFF, 0xD8]),
            width_px: 400,
            height_px: 200,
        };
        let attrs = attributes();
        let coordinates = Err(ProjectionError::MissingCrs);
        let setup = PageSetup::square_21cm();
        let mut with_images = input(&attrs, &coordinates, None);
        with_images.logo = Some(&image);
        with_images.map = Some(&image);

        let count_images = |blocks: &[Block]| {
            blocks
                .iter()
                .map(|b| match b {
                    Block::Image(_) => 1,
                    Block::KeepTogether(group) => group
                        .iter()
                        .filter(|b| matches!(b, Block::Image(_)))
                        .count(),
                    _ => 0,
                })
                .sum::<usize>()
        };

        assert_eq!(count_images(&assemble(&with_images, &setup)), 2);
        assert_eq!(count_images(&assemble(&input(&attrs, &coordinates, None), &setup)), 0);

        let Block::KeepTogether(figure) = map_figure(&image, &setup) else {
            panic!("Expected a figure group");
        };
        let Block::Image(block) = &figure[1] else {
            panic!("Expected the map image");
        };
        assert!((block.width - setup.frame_width() * 0.95).abs() < 1e-3);
        assert!((block.height - block.width / 2.0).abs() < 1e-3);
    }
}
