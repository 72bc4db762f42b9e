use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

/// Errors related to malformed cell payloads from the upstream source.
#[derive(Error, Debug)]
pub enum CellError {
    #[error("Malformed cell value '{value}': expected exactly one populated field")]
    MalformedValue { value: String },
}

/// Semantic kinds of number formats a cell can carry. Date and date-time
/// formats drive column type detection; every other kind marks a plain number.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NumberFormatKind {
    Text,
    Number,
    Percent,
    Currency,
    Date,
    Time,
    DateTime,
    Scientific,
}

/// A cell's number format as attached by the upstream source.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumberFormat {
    #[serde(rename = "type")]
    pub kind: NumberFormatKind,
    #[serde(default)]
    pub pattern: Option<String>,
}

/// The formatting attached to a cell; only the number format is of interest.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CellFormat {
    pub number_format: Option<NumberFormat>,
}

/// A cell's computed value as delivered on the wire: at most one of the
/// variant fields is populated in a well-formed payload.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtendedValue {
    pub string_value: Option<String>,
    pub number_value: Option<f64>,
    pub bool_value: Option<bool>,
}

/// The single payload carried by a well-formed effective value.
#[derive(Clone, Debug, PartialEq)]
pub enum Scalar {
    Text(String),
    Number(f64),
    Bool(bool),
}

impl ExtendedValue {
    /// Collapses the wire payload into its single populated variant. Zero or
    /// multiple populated fields mark a malformed upstream payload.
    pub fn scalar(&self) -> Result<Scalar, CellError> {
        match (&self.string_value, self.number_value, self.bool_value) {
            (Some(text), None, None) => Ok(Scalar::Text(text.to_owned())),
            (None, Some(number), None) => Ok(Scalar::Number(number)),
            (None, None, Some(value)) => Ok(Scalar::Bool(value)),
            _ => Err(CellError::MalformedValue {
                value: format!("{self:?}"),
            }),
        }
    }
}

/// Represents a single fetched cell: an optional computed value plus optional
/// formatting.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CellData {
    pub effective_value: Option<ExtendedValue>,
    pub effective_format: Option<CellFormat>,
}

impl CellData {
    /// The cell's number-format hint, when the upstream attached one.
    pub fn number_format(&self) -> Option<NumberFormatKind> {
        self.effective_format
            .as_ref()?
            .number_format
            .as_ref()
            .map(|format| format.kind)
    }
}
