//! Sélection d'une parcelle par code cadastral

use tracing::{debug, warn};

use crate::types::{AttributeValue, Dataset, ParcelRecord};
use crate::CatastroError;

/// Parcelle sélectionnée
#[derive(Debug, Clone, Copy)]
pub struct Selection<'a> {
    /// Première parcelle portant le code
    pub record: &'a ParcelRecord,

    /// Nombre total de parcelles portant ce code (>= 1)
    pub matches: usize,
}

impl Selection<'_> {
    /// Vrai si le code n'est pas unique dans le jeu de données
    pub fn is_ambiguous(&self) -> bool {
        self.matches > 1
    }
}

/// Recherche la parcelle dont `column` vaut exactement `code`
///
/// La comparaison est stricte (ni casse ni espaces normalisés) et ne porte
/// que sur les valeurs texte. En cas de doublons la première parcelle est
/// retenue.
///
/// # Errors
///
/// - `MissingColumn` si aucune parcelle ne porte la colonne
/// - `RecordNotFound` si aucune parcelle ne correspond
pub fn select_by_code<'a>(
    dataset: &'a Dataset,
    column: &str,
    code: &str,
) -> Result<Selection<'a>, CatastroError> {
    if !dataset.has_column(column) {
        return Err(CatastroError::MissingColumn(column.to_string()));
    }

    let mut found = dataset
        .records
        .iter()
        .filter(|r| matches_code(r.get(column), code));

    let record = found
        .next()
        .ok_or_else(|| CatastroError::RecordNotFound(code.to_string()))?;
    let matches = 1 + found.count();

    if matches > 1 {
        warn!(code, matches, "Cadastral code is not unique, using the first parcel");
    } else {
        debug!(code, "Parcel selected");
    }

    Ok(Selection { record, matches })
}

fn matches_code(value: Option<&AttributeValue>, code: &str) -> bool {
    matches!(value, Some(AttributeValue::Text(s)) if s == code)
}
