//! Mise en forme des valeurs : montants "legales" et dates longues

use std::str::FromStr;

use catastro::AttributeValue;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Texte d'un montant non numérique
pub const INVALID_AMOUNT: &str = "Valor inválido";

/// Écrit un nombre sous la forme "123 con 46/100"
///
/// La partie entière est tronquée, les centièmes arrondis (demi vers le
/// haut). 99,5 centièmes ou plus reportent une unité ("2 con 00/100" pour
/// 1,999). Le signe n'est écrit que pour une valeur non nulle.
pub fn legal_amount(value: f64) -> String {
    if !value.is_finite() {
        return INVALID_AMOUNT.to_string();
    }

    let magnitude = value.abs();
    let mut whole = magnitude.trunc();
    let mut hundredths = ((magnitude - whole) * 100.0).round();
    if hundredths >= 100.0 {
        whole += 1.0;
        hundredths = 0.0;
    }

    let sign = if value < 0.0 && (whole > 0.0 || hundredths > 0.0) {
        "-"
    } else {
        ""
    };
    format!("{}{:.0} con {:02.0}/100", sign, whole, hundredths)
}

/// `legal_amount` sur un attribut brut
pub fn legal_amount_of(value: &AttributeValue) -> String {
    value
        .as_f64()
        .map(legal_amount)
        .unwrap_or_else(|| INVALID_AMOUNT.to_string())
}

/// Langue des dates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Es,
    En,
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "es" => Ok(Self::Es),
            "en" => Ok(Self::En),
            other => Err(format!("Unsupported language '{}' (expected es or en)", other)),
        }
    }
}

const MONTHS_ES: [&str; 12] = [
    "Enero",
    "Febrero",
    "Marzo",
    "Abril",
    "Mayo",
    "Junio",
    "Julio",
    "Agosto",
    "Septiembre",
    "Octubre",
    "Noviembre",
    "Diciembre",
];

const MONTHS_EN: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Nom du mois (1 à 12), None hors plage
pub fn month_name(month: u32, language: Language) -> Option<&'static str> {
    let index = usize::try_from(month).ok()?.checked_sub(1)?;
    match language {
        Language::Es => MONTHS_ES.get(index).copied(),
        Language::En => MONTHS_EN.get(index).copied(),
    }
}

/// Date longue : "14 de Julio de 2025" / "14 July 2025"
pub fn long_date(date: NaiveDate, language: Language) -> String {
    let month = month_name(date.month(), language).unwrap_or_default();
    match language {
        Language::Es => format!("{:02} de {} de {}", date.day(), month, date.year()),
        Language::En => format!("{:02} {} {}", date.day(), month, date.year()),
    }
}

/// Date demandée pour le rapport
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ReportDate {
    /// Date du jour
    #[default]
    Today,
    /// Chaîne `YYYY-MM-DD`
    Iso(String),
    Date(NaiveDate),
}

impl ReportDate {
    /// Date effective et éventuel avertissement
    ///
    /// Une chaîne illisible retombe sur `today`.
    pub fn resolve(&self, today: NaiveDate) -> (NaiveDate, Option<String>) {
        match self {
            Self::Today => (today, None),
            Self::Date(date) => (*date, None),
            Self::Iso(s) => match NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d") {
                Ok(date) => (date, None),
                Err(_) => (
                    today,
                    Some(format!(
                        "Formato de fecha no reconocido '{}' (se esperaba YYYY-MM-DD). Usando fecha actual.",
                        s
                    )),
                ),
            },
        }
    }
}

impl From<NaiveDate> for ReportDate {
    fn from(date: NaiveDate) -> Self {
        Self::Date(date)
    }
}

impl From<Option<String>> for ReportDate {
    fn from(value: Option<String>) -> Self {
        value.map(Self::Iso).unwrap_or_default()
    }
}
